mod api;
mod application;
mod cli;
mod domain;
mod utils;

use std::process;

use clap::Parser;
use tokio::signal;

use crate::api::ApiClient;
use crate::application::DownloadCoordinator;
use crate::cli::Options;
use crate::domain::{validate, AppError, ErrorKind};

async fn run(options: Options) -> Result<(), AppError> {
    let request = validate(&options.raw_request())?;
    log::debug!("converting with {:?}", request);

    let coordinator = DownloadCoordinator::new(ApiClient::new(options.api_config()));
    let saved = coordinator.run(&request).await?;

    for path in saved {
        println!("{}", path.display());
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    let log_filter = match verbosity {
        0 => "info",
        1 => "info,icon_convert=debug",
        2 => "info,icon_convert=trace",
        _ => "trace",
    };

    let log_env = env_logger::Env::default().default_filter_or(log_filter);

    env_logger::Builder::from_env(log_env)
        .format_module_path(false)
        .format_timestamp(None)
        // Indent following lines equal to the log level label, like `[ERROR] `
        .format_indent(Some(8))
        .init();
}

#[tokio::main]
async fn main() {
    let options = Options::parse();
    init_logging(options.verbosity);

    let result = tokio::select! {
        result = run(options) => result,
        _ = signal::ctrl_c() => Err(AppError::Interrupted),
    };

    if let Err(err) = result {
        match err.kind() {
            ErrorKind::Usage => eprintln!("{}", err),
            ErrorKind::Transport => log::error!("conversion failed: {}", err),
            ErrorKind::Interrupted => log::warn!("caught ctrl-c: {}", err),
        }
        process::exit(err.exit_code());
    }
}
