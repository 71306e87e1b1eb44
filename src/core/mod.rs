pub mod engine;
pub mod identifier;
pub mod locator;
pub mod normalizer;
pub mod prioritizer;
pub mod replacer;
pub mod transcoder;

pub use crate::domain::model::{AlternateImage, BatchReport, ImageReport, ReplacementPlan};
pub use crate::domain::ports::{ConfigProvider, ImageCodec};
pub use crate::utils::error::Result;
