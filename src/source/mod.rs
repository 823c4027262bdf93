// file: src/source/mod.rs
// description: source document discovery and loading
// reference: internal module structure

pub mod loader;
pub mod scanner;

pub use loader::DirectoryLoader;
pub use scanner::{FileScanner, ScannedFile};
