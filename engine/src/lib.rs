pub mod batch;
pub mod config;
pub mod error;
pub mod image_api;
pub mod pipeline;
pub mod prompts;
pub mod retry;

#[cfg(test)]
mod mock_api;

pub use batch::{BatchSummary, run_batch};
pub use config::GeneratorConfig;
pub use error::{GenerationError, LoadError};
pub use image_api::{ImageApi, ModelScope};
pub use prompts::{PromptItem, load_prompts};

pub type ImageApiBox = Box<dyn ImageApi>;
