//! Core error type.
//!
//! Sub-crates define their own error enums; configuration and environment
//! failures surface as `CoreError` and are always fatal to the binaries.

use thiserror::Error;

/// The error type for `sp-core` configuration and environment checks.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `sp-core`.
pub type CoreResult<T> = Result<T, CoreError>;
