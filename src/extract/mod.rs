//! Raw text extraction from uploaded files

mod dispatcher;
mod pdf;

pub use dispatcher::{detect_encoding, RawTextExtractor};
pub use pdf::PdfExtractor;
