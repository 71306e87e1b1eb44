use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to decode image {path}: {source}")]
    DecodeError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode PNG for {path}: {source}")]
    EncodeError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write PNG to {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No matching targets found for alt image: {alt_image}")]
    NoTargetsFound { alt_image: PathBuf },

    #[error("Failed to remove stale file {path}: {source}")]
    StaleFileRemovalError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} -> {to}: {source}")]
    SecondaryCopyError {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove alt image {path}: {source}")]
    CleanupError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read staging directory {path}: {source}")]
    StagingDirError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Image,
    Matching,
    Configuration,
    Serialization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SwapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SwapError::IoError(_)
            | SwapError::WriteError { .. }
            | SwapError::StaleFileRemovalError { .. }
            | SwapError::SecondaryCopyError { .. }
            | SwapError::CleanupError { .. }
            | SwapError::StagingDirError { .. } => ErrorCategory::Io,
            SwapError::DecodeError { .. } | SwapError::EncodeError { .. } => ErrorCategory::Image,
            SwapError::NoTargetsFound { .. } => ErrorCategory::Matching,
            SwapError::SerializationError(_) => ErrorCategory::Serialization,
            SwapError::ConfigValidationError { .. }
            | SwapError::InvalidConfigValueError { .. }
            | SwapError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 嚴重程度只描述單張圖或整批的影響，不代表程序一定結束
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SwapError::NoTargetsFound { .. }
            | SwapError::StaleFileRemovalError { .. }
            | SwapError::SecondaryCopyError { .. }
            | SwapError::CleanupError { .. } => ErrorSeverity::Low,
            SwapError::DecodeError { .. }
            | SwapError::EncodeError { .. }
            | SwapError::WriteError { .. } => ErrorSeverity::Medium,
            SwapError::IoError(_) | SwapError::SerializationError(_) => ErrorSeverity::High,
            SwapError::StagingDirError { .. }
            | SwapError::ConfigValidationError { .. }
            | SwapError::InvalidConfigValueError { .. }
            | SwapError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SwapError::DecodeError { path, .. } => format!(
                "Check that {} is a valid PNG or JPEG file; it was left in place",
                path.display()
            ),
            SwapError::EncodeError { .. } => {
                "Check free disk space and write permissions on the cards directory".to_string()
            }
            SwapError::WriteError { path, .. } => format!(
                "Check that {} is writable; the previous file was kept",
                path.display()
            ),
            SwapError::NoTargetsFound { .. } => {
                "Rename the alt image so it contains a card code such as OP02-068".to_string()
            }
            SwapError::StaleFileRemovalError { .. }
            | SwapError::SecondaryCopyError { .. }
            | SwapError::CleanupError { .. } => {
                "Close the game or any viewer that may hold the file open and run again".to_string()
            }
            SwapError::StagingDirError { path, .. } => format!(
                "Create the staging directory {} and put alt images in it",
                path.display()
            ),
            SwapError::ConfigValidationError { field, .. }
            | SwapError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in the config file or command line", field)
            }
            SwapError::MissingConfigError { field } => format!(
                "Pass --{} or set it in the config file",
                field.replace('_', "-")
            ),
            SwapError::IoError(_) => "Check file permissions and paths".to_string(),
            SwapError::SerializationError(_) => "Re-run without --json".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Image => format!("Image conversion failed: {}", self),
            ErrorCategory::Matching => format!("Nothing to replace: {}", self),
            ErrorCategory::Io => format!("File system error: {}", self),
            ErrorCategory::Serialization => format!("Report output failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SwapError>;
