//! Business logic services.

pub mod archivos;
pub mod documento;
pub mod multipart;
pub mod pdf;
pub mod registros;
pub mod storage;

pub use multipart::{FormularioMultipart, leer_multipart};
pub use pdf::PdfRenderer;
pub use storage::Storage;
