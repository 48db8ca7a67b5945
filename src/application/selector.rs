use crate::api::ProducedFile;
use crate::domain::ConversionRequest;

/// PNG output format tag.
const PNG: &str = "png";

/// Whether a produced file was asked for. Non-PNG files match on format,
/// PNG files must also match one of the requested sizes.
pub fn is_selected(file: &ProducedFile, request: &ConversionRequest) -> bool {
    if file.format == PNG {
        file.square_size()
            .is_some_and(|size| request.wants_png_size(size))
    } else {
        request.wants_format(&file.format)
    }
}

/// Keeps the requested files, in the order the service listed them.
pub fn select_files(files: Vec<ProducedFile>, request: &ConversionRequest) -> Vec<ProducedFile> {
    files
        .into_iter()
        .filter(|file| is_selected(file, request))
        .collect()
}
