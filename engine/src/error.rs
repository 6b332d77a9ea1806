use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Errors that abandon a single prompt item
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Submitting the task failed after {attempts} attempt(s): {detail}")]
    Submission { attempts: u32, detail: String },

    #[error("Malformed API response: {detail}")]
    MalformedResponse { detail: String },

    #[error("Task {task_id} failed: {detail}")]
    TaskFailed { task_id: String, detail: String },

    #[error("Querying task {task_id} failed after {attempts} attempt(s): {detail}")]
    StatusQuery {
        task_id: String,
        attempts: u32,
        detail: String,
    },

    #[error("Task {task_id} timed out: no result after {polls} polls ({waited:?})")]
    TaskTimeout {
        task_id: String,
        polls: u32,
        waited: Duration,
    },

    #[error("Downloading the image failed after {attempts} attempt(s): {detail}")]
    Download { attempts: u32, detail: String },
}

/// Errors while reading the prompts file. All of them are fatal for a batch.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Prompts file does not exist: {}", .0.display())]
    PromptsFileNotFound(PathBuf),

    #[error("Couldn't read prompts file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Couldn't parse prompts file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
