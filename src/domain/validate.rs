use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::error::UsageError;
use super::model::{ConversionRequest, OutputType, ALLOWED_PNG_SIZES, PLAIN_FORMATS};
use crate::utils::default_prefix;

/// Generic token that expands to one `png<size>` per requested PNG size.
const GENERIC_PNG: &str = "png";

/// Raw, unchecked command line input.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub types: Vec<String>,
    pub png_sizes: Vec<String>,
    pub files: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub filename: Option<String>,
}

/// Type tokens accepted on the command line, as shown to the user.
pub fn allowed_type_tokens() -> Vec<String> {
    let mut tokens: Vec<String> = PLAIN_FORMATS.iter().map(|s| s.to_string()).collect();
    tokens.push(GENERIC_PNG.to_string());
    tokens.extend(ALLOWED_PNG_SIZES.iter().map(|size| format!("png{}", size)));
    tokens
}

fn allowed_size_tokens() -> Vec<String> {
    ALLOWED_PNG_SIZES.iter().map(|size| size.to_string()).collect()
}

/// Checks types, sizes, file count and file existence, in that order, and
/// builds the request every later stage works from.
pub fn validate(raw: &RawRequest) -> Result<ConversionRequest, UsageError> {
    let mut requested = BTreeSet::new();
    let mut invalid = Vec::new();
    let mut generic_png = false;

    for token in raw.types.iter().map(|t| t.trim()) {
        if token == GENERIC_PNG {
            generic_png = true;
        } else {
            match token.parse::<OutputType>() {
                Ok(output) => {
                    requested.insert(output);
                }
                Err(()) => invalid.push(token.to_string()),
            }
        }
    }

    if !invalid.is_empty() {
        return Err(UsageError::InvalidTypes {
            invalid,
            allowed: allowed_type_tokens(),
        });
    }

    if generic_png {
        let mut invalid = Vec::new();
        for token in raw.png_sizes.iter().map(|t| t.trim()) {
            match ALLOWED_PNG_SIZES.iter().find(|size| size.to_string() == token) {
                Some(&size) => {
                    requested.insert(OutputType::Png(size));
                }
                None => invalid.push(token.to_string()),
            }
        }

        if !invalid.is_empty() {
            return Err(UsageError::InvalidSizes {
                invalid,
                allowed: allowed_size_tokens(),
            });
        }
    }

    let file = match raw.files.as_slice() {
        [file] => file,
        files => return Err(UsageError::WrongFileCount(files.len())),
    };

    let input_file = resolve(file);
    if !input_file.exists() {
        return Err(UsageError::FileNotFound(input_file));
    }

    let output_dir = resolve(raw.out.as_deref().unwrap_or(Path::new(".")));
    let output_prefix = match &raw.filename {
        Some(prefix) => prefix.clone(),
        None => default_prefix(file),
    };

    Ok(ConversionRequest {
        input_file,
        requested: requested.into_iter().collect(),
        output_dir,
        output_prefix,
    })
}

fn resolve(file: &Path) -> PathBuf {
    std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf())
}
