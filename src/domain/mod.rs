pub mod error;
pub mod model;
pub mod validate;

pub use error::{AppError, ErrorKind};
pub use model::{ConversionRequest, OutputType};
pub use validate::{validate, RawRequest};
