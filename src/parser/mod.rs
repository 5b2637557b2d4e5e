// Format string parser module

pub mod format;

// Public API re-exports
pub use format::{parse_format, FormatSpec};
