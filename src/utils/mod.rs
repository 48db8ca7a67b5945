use std::path::Path;

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Input file name without its last extension. Names without an extension
/// are used whole.
pub fn default_prefix(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Local name for a produced file: every occurrence of the job id is
/// replaced by the prefix, and the result can't leave the output directory.
pub fn output_filename(produced: &str, job_id: &str, prefix: &str) -> String {
    let renamed = if job_id.is_empty() {
        produced.to_string()
    } else {
        produced.replace(job_id, prefix)
    };

    match sanitize_filename(&renamed).as_str() {
        "" | "." | ".." => "_".to_string(),
        name => name.to_string(),
    }
}
