//! Eliminación en sitio de la metadata identificable de archivos comunes.
//!
//! El punto de entrada es [`Sanitizer::sanitize`], que clasifica el archivo,
//! aplica la estrategia de su categoría sobre un temporal hermano y solo
//! entonces sustituye al original.

pub mod classifier;
pub mod config;
pub mod error;
pub mod sanitizer;

pub use classifier::{Category, classify, classify_path, supported_extensions};
pub use config::{ReplaceMode, SanitizerConfig};
pub use error::{FailureKind, SanitizeError, SanitizeResult};
pub use sanitizer::{CategoryHint, SanitizationResult, Sanitizer, sanitize};
