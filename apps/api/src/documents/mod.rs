// Document collaborators around the keyword core:
// extraction (upload bytes → text) and export (highlighted text → file).

pub mod export;
pub mod extract;
pub mod handlers;

pub use extract::{FileTextExtractor, TextExtractor, UploadedDocument};
