// Re-exporting models for easier access
pub mod blob;
pub mod metadata;
pub mod storage;
pub mod sui;

// Public exports
pub use {blob::*, metadata::*, storage::*, sui::*};
