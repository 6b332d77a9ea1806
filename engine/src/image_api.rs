use std::{path::Path, pin::Pin};

use color_eyre::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::GenerationError;

pub mod modelscope;
pub use modelscope::ModelScope;

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// A single attempt at each remote operation. Retrying, polling and
/// interpreting the responses happens in [`crate::pipeline`].
pub trait ImageApi: Send + Sync {
    fn submit<'a>(&'a self, req: &'a GenerationRequest) -> ApiFuture<'a, SubmitResponse>;

    fn task_status<'a>(&'a self, task_id: &'a str) -> ApiFuture<'a, TaskResult>;

    /// Writes the image behind `url` to `dest` and returns the number of bytes written
    fn download<'a>(&'a self, url: &'a str, dest: &'a Path) -> ApiFuture<'a, u64>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub n: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    /// inline results, only present in synchronous mode
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<ImageData>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
}

/// The vendor sends `null` for fields it has no value for yet
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskHandle {
    ImageUrl(String),
    TaskId(String),
}

impl SubmitResponse {
    pub fn into_handle(self) -> Result<TaskHandle, GenerationError> {
        if let Some(first) = self.data.first() {
            return match &first.url {
                Some(url) if !url.is_empty() => Ok(TaskHandle::ImageUrl(url.clone())),
                _ => Err(GenerationError::MalformedResponse {
                    detail: format!("inline result without an image url:\n{self:#?}"),
                }),
            };
        }

        match &self.task_id {
            Some(id) if !id.is_empty() => Ok(TaskHandle::TaskId(id.clone())),
            _ => Err(GenerationError::MalformedResponse {
                detail: format!("response contains neither data nor task_id:\n{self:#?}"),
            }),
        }
    }
}

/// Status strings the vendor is known to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorStatus {
    Pending,
    Running,
    Processing,
    Succeed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_images: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskResult {
    pub fn known_status(&self) -> Option<VendorStatus> {
        self.task_status.parse().ok()
    }

    /// Anything that is neither success nor failure counts as pending,
    /// including status strings we don't know.
    pub fn state(&self) -> TaskState {
        match self.known_status() {
            Some(VendorStatus::Succeed) => TaskState::Succeeded,
            Some(VendorStatus::Failed) => TaskState::Failed,
            _ => TaskState::Pending,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        self.output_images
            .first()
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn inline_data_becomes_image_url() {
        let resp: SubmitResponse = serde_json::from_str(indoc! {r#"
            {"created": 1, "data": [{"url": "https://img/a.png"}, {"url": "https://img/b.png"}]}
        "#})
        .unwrap();
        assert_eq!(
            resp.into_handle().unwrap(),
            TaskHandle::ImageUrl("https://img/a.png".into())
        );
    }

    #[test]
    fn task_id_becomes_task_handle() {
        let resp: SubmitResponse =
            serde_json::from_str(r#"{"task_id": "t-42", "request_id": "r"}"#).unwrap();
        assert_eq!(resp.into_handle().unwrap(), TaskHandle::TaskId("t-42".into()));
    }

    #[test]
    fn empty_response_is_malformed() {
        let resp: SubmitResponse = serde_json::from_str(r#"{"data": [], "foo": 1}"#).unwrap();
        let err = resp.into_handle().unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse { .. }));
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn status_mapping() {
        let result = |status: &str| TaskResult {
            task_status: status.into(),
            ..Default::default()
        };

        assert_eq!(result("SUCCEED").state(), TaskState::Succeeded);
        assert_eq!(result("FAILED").state(), TaskState::Failed);
        assert_eq!(result("RUNNING").state(), TaskState::Pending);
        assert_eq!(result("PENDING").known_status(), Some(VendorStatus::Pending));
        assert_eq!(result("QUEUED_SOMEWHERE").state(), TaskState::Pending);
        assert_eq!(result("QUEUED_SOMEWHERE").known_status(), None);
        assert_eq!(result("").state(), TaskState::Pending);
    }

    #[test]
    fn null_fields_mean_no_value_yet() {
        let pending: TaskResult = serde_json::from_str(
            r#"{"task_id":"t","task_status":"PENDING","output_images":null}"#,
        )
        .unwrap();
        assert_eq!(pending.state(), TaskState::Pending);
        assert_eq!(pending.image_url(), None);

        let no_status: TaskResult =
            serde_json::from_str(r#"{"task_id":"t","task_status":null}"#).unwrap();
        assert_eq!(no_status.state(), TaskState::Pending);

        let resp: SubmitResponse =
            serde_json::from_str(r#"{"data":null,"task_id":"t-7"}"#).unwrap();
        assert_eq!(resp.into_handle().unwrap(), TaskHandle::TaskId("t-7".into()));
    }

    #[test]
    fn task_result_keeps_unknown_fields() {
        let result: TaskResult = serde_json::from_str(indoc! {r#"
            {
                "task_id": "t-1",
                "task_status": "SUCCEED",
                "output_images": ["https://img/out.png"],
                "time_taken": 12.5
            }
        "#})
        .unwrap();
        assert_eq!(result.image_url(), Some("https://img/out.png"));
        assert_eq!(result.extra["time_taken"], 12.5);
    }
}
