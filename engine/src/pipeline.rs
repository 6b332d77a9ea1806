//! The per-item workflow: submit, poll while the task runs, download.
//!
//! Each stage runs its remote call through [`retry`] with its own
//! [`RetryPolicy`] and turns an exhausted retry into the matching
//! [`GenerationError`].

use std::path::{Path, PathBuf};

use color_eyre::Report;
use log::{debug, info, warn};
use tokio::time::{Instant, sleep};

use crate::{
    config::{GeneratorConfig, PollConfig},
    error::GenerationError,
    image_api::{GenerationRequest, ImageApi, TaskHandle, TaskResult, TaskState},
    prompts::PromptItem,
    retry::{RetryExhausted, RetryPolicy, retry},
};

fn detail(e: &RetryExhausted<Report>) -> String {
    format!("{:#}", e.last_error)
}

/// Sends the generation request. Only a successfully delivered request is
/// interpreted, a malformed answer is not retried.
pub async fn submit_task(
    api: &dyn ImageApi,
    req: &GenerationRequest,
    policy: RetryPolicy,
) -> Result<TaskHandle, GenerationError> {
    let resp = retry(policy, "Submitting task", || api.submit(req))
        .await
        .map_err(|e| GenerationError::Submission {
            attempts: e.attempts,
            detail: detail(&e),
        })?;

    resp.into_handle()
}

/// Queries the task until it reaches a terminal state or the poll budget is used up.
pub async fn poll_task(
    api: &dyn ImageApi,
    task_id: &str,
    cfg: &PollConfig,
) -> Result<TaskResult, GenerationError> {
    let started = Instant::now();
    let max_polls = cfg.max_attempts.max(1);

    for poll in 1..=max_polls {
        let result = retry(cfg.query, "Querying task status", || api.task_status(task_id))
            .await
            .map_err(|e| GenerationError::StatusQuery {
                task_id: task_id.into(),
                attempts: e.attempts,
                detail: detail(&e),
            })?;

        match result.state() {
            TaskState::Succeeded => return Ok(result),
            TaskState::Failed => {
                return Err(GenerationError::TaskFailed {
                    task_id: task_id.into(),
                    detail: format!("{result:#?}"),
                });
            }
            TaskState::Pending => match result.known_status() {
                Some(status) => debug!("Task {task_id}: poll #{poll}, status {status}"),
                None => warn!(
                    "Task {task_id}: poll #{poll}, unknown status {:?}, still waiting",
                    result.task_status
                ),
            },
        }

        if poll < max_polls {
            sleep(cfg.interval).await;
        }
    }

    Err(GenerationError::TaskTimeout {
        task_id: task_id.into(),
        polls: max_polls,
        waited: started.elapsed(),
    })
}

pub async fn download_image(
    api: &dyn ImageApi,
    url: &str,
    dest: &Path,
    policy: RetryPolicy,
) -> Result<u64, GenerationError> {
    retry(policy, "Downloading image", || api.download(url, dest))
        .await
        .map_err(|e| GenerationError::Download {
            attempts: e.attempts,
            detail: detail(&e),
        })
}

/// Runs the whole workflow for one prompt and returns the path of the saved image.
pub async fn generate_item(
    api: &dyn ImageApi,
    cfg: &GeneratorConfig,
    item: &PromptItem,
    output_dir: &Path,
) -> Result<PathBuf, GenerationError> {
    let name = &item.name;
    info!("[{name}] prompt: {}", item.prompt);

    let req = GenerationRequest {
        model: cfg.model.clone(),
        prompt: item.prompt.clone(),
        size: cfg.size.clone(),
        n: cfg.n,
    };

    let url = match submit_task(api, &req, cfg.submit).await? {
        TaskHandle::ImageUrl(url) => {
            info!("[{name}] synchronous result");
            url
        }
        TaskHandle::TaskId(task_id) => {
            info!("[{name}] task id: {task_id}");
            let result = poll_task(api, &task_id, &cfg.poll).await?;
            result
                .image_url()
                .map(str::to_owned)
                .ok_or_else(|| GenerationError::MalformedResponse {
                    detail: format!("task {task_id} succeeded without output images:\n{result:#?}"),
                })?
        }
    };
    debug!("[{name}] image url: {url}");

    let dest = item.output_path(output_dir);
    let written = download_image(api, &url, &dest, cfg.download).await?;
    info!("[{name}] saved {} ({written} bytes)", dest.display());

    Ok(dest)
}
