use std::path::PathBuf;

use clap::Parser;

use crate::api::models::DEFAULT_BASE_URL;
use crate::api::ApiConfig;
use crate::domain::RawRequest;

const EXAMPLES: &str = "\
Examples:
  $ icon-convert -t png32,png512 -f BrandIcon icon.svg    # creates files: ./BrandIcon_32x32.png, ./BrandIcon_512x512.png
  $ icon-convert --types icns,hqx --out icons NiceIcon.png  # creates files: icons/NiceIcon.icns, icons/NiceIcon.hqx";

#[derive(Debug, Parser)]
#[command(
    name = "icon-convert",
    about = env!("CARGO_PKG_DESCRIPTION"),
    override_usage = "icon-convert [OPTIONS] <FILE>",
    after_help = EXAMPLES
)]
pub struct Options {
    /// The image to convert. Exactly one is required.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// The output file types. One or more of: ico icns hqx png png16 png24
    /// png32 png48 png64 png96 png128 png256 png512.
    #[arg(short, long, value_delimiter = ',', default_value = "ico,icns")]
    pub types: Vec<String>,

    /// The sizes to render when the generic `png` type is requested. One or
    /// more of: 16 24 32 48 64 96 128 256 512.
    #[arg(short, long = "pngsizes", value_delimiter = ',', default_value = "32")]
    pub png_sizes: Vec<String>,

    /// The output directory.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// The output filename prefix. Defaults to the name of the input file
    /// without an extension.
    #[arg(short, long)]
    pub filename: Option<String>,

    /// Base URL of the conversion service.
    #[arg(
        long,
        env = "ICON_CONVERT_API_URL",
        default_value = DEFAULT_BASE_URL,
        hide = true
    )]
    pub api_url: String,

    /// Sets verbosity level. Can be specified multiple times to increase the verbosity
    /// of this program.
    #[arg(long = "verbose", short, action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Options {
    pub fn raw_request(&self) -> RawRequest {
        RawRequest {
            types: self.types.clone(),
            png_sizes: self.png_sizes.clone(),
            files: self.files.clone(),
            out: self.out.clone(),
            filename: self.filename.clone(),
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.clone(),
        }
    }
}
