pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use config::{Overrides, Settings};
pub use crate::core::{engine::ReplaceEngine, replacer::Replacer, transcoder::PngTranscoder};
pub use domain::model::{BatchReport, ImageReport, ImageStatus};
pub use utils::error::{Result, SwapError};
