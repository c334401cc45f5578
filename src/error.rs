use miette::Diagnostic;
use thiserror::Error;

/// Main error type for mappack operations
#[derive(Error, Diagnostic, Debug)]
pub enum PackError {
    #[error("IO error: {0}")]
    #[diagnostic(code(mappack::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(mappack::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Archive error: {message}")]
    #[diagnostic(code(mappack::archive))]
    Archive { message: String },

    #[error("Image error with {path}: {message}")]
    #[diagnostic(code(mappack::image))]
    Image {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Config error: {message}")]
    #[diagnostic(code(mappack::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl From<zip::result::ZipError> for PackError {
    fn from(err: zip::result::ZipError) -> Self {
        PackError::Archive {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
