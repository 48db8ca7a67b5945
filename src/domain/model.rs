use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// PNG sizes the conversion service can render.
pub const ALLOWED_PNG_SIZES: [u32; 9] = [16, 24, 32, 48, 64, 96, 128, 256, 512];

/// Non-PNG formats, in the order the service expects their flags.
pub const PLAIN_FORMATS: [&str; 3] = ["ico", "icns", "hqx"];

/// A single output the service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputType {
    Ico,
    Icns,
    Hqx,
    Png(u32),
}

impl OutputType {
    /// Every output type, in flag order: `ico icns hqx png16 ... png512`.
    pub fn all() -> Vec<OutputType> {
        let mut types = vec![OutputType::Ico, OutputType::Icns, OutputType::Hqx];
        types.extend(ALLOWED_PNG_SIZES.iter().map(|&size| OutputType::Png(size)));
        types
    }

    /// The `format` tag the service reports for files of this type.
    pub fn format(&self) -> &'static str {
        match self {
            OutputType::Ico => "ico",
            OutputType::Icns => "icns",
            OutputType::Hqx => "hqx",
            OutputType::Png(_) => "png",
        }
    }

    pub fn png_size(&self) -> Option<u32> {
        match self {
            OutputType::Png(size) => Some(*size),
            _ => None,
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Png(size) => write!(f, "png{}", size),
            other => f.write_str(other.format()),
        }
    }
}

impl FromStr for OutputType {
    type Err = ();

    /// Only the exact tokens listed by [`OutputType::all`] are accepted.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        OutputType::all()
            .into_iter()
            .find(|output| output.to_string() == token)
            .ok_or(())
    }
}

/// A validated conversion job. Only built by [`super::validate::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input_file: PathBuf,
    /// Sorted and deduplicated.
    pub requested: Vec<OutputType>,
    pub output_dir: PathBuf,
    pub output_prefix: String,
}

impl ConversionRequest {
    pub fn wants(&self, output: OutputType) -> bool {
        self.requested.contains(&output)
    }

    pub fn wants_format(&self, format: &str) -> bool {
        self.requested
            .iter()
            .any(|t| t.png_size().is_none() && t.format() == format)
    }

    pub fn wants_png_size(&self, size: u32) -> bool {
        self.wants(OutputType::Png(size))
    }
}
