use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api-inference.modelscope.cn/v1";
pub const DEFAULT_MODEL: &str = "Qwen/Qwen-Image";
pub const DEFAULT_SIZE: &str = "1024x1024";

/// Everything the pipeline needs besides the credential.
///
/// Every field has a default, so a config file only has to name what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub size: String,
    /// images requested per prompt, only the first one is downloaded
    pub n: u32,
    /// connect and per-read timeout, also the total cap for submit and status calls
    pub request_timeout: Duration,
    pub submit: RetryPolicy,
    pub poll: PollConfig,
    pub download: RetryPolicy,
    /// prompt items processed concurrently, 1 means strictly sequential
    pub jobs: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            size: DEFAULT_SIZE.into(),
            n: 1,
            request_timeout: Duration::from_secs(30),
            submit: RetryPolicy::default(),
            poll: PollConfig::default(),
            download: RetryPolicy::default(),
            jobs: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
    /// retry for a single status query
    pub query: RetryPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(5),
            query: RetryPolicy::default(),
        }
    }
}
