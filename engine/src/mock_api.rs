//! Scripted in-memory [`ImageApi`] for pipeline and batch tests.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use color_eyre::{Result, eyre::eyre};

use crate::image_api::{
    ApiFuture, GenerationRequest, ImageApi, ImageData, SubmitResponse, TaskResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit(String),
    Status(String),
    Download(String, PathBuf),
}

type SubmitFn = Box<dyn Fn(&GenerationRequest) -> Result<SubmitResponse> + Send + Sync>;
/// task id and the 1-based number of status calls so far
type StatusFn = Box<dyn Fn(&str, usize) -> Result<TaskResult> + Send + Sync>;
/// url and the 1-based number of download calls so far
type DownloadFn = Box<dyn Fn(&str, usize) -> Result<Vec<u8>> + Send + Sync>;

pub struct MockApi {
    on_submit: SubmitFn,
    on_status: StatusFn,
    on_download: DownloadFn,
    calls: Mutex<Vec<Call>>,
}

impl MockApi {
    /// Synchronous results for every prompt and downloads that always work
    pub fn new() -> Self {
        Self {
            on_submit: Box::new(|req: &GenerationRequest| {
                Ok(sync_url(&format!("https://img/{}.png", req.prompt)))
            }),
            on_status: Box::new(|_: &str, _: usize| Ok(status("SUCCEED"))),
            on_download: Box::new(|url: &str, _: usize| Ok(url.as_bytes().to_vec())),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn on_submit(
        mut self,
        f: impl Fn(&GenerationRequest) -> Result<SubmitResponse> + Send + Sync + 'static,
    ) -> Self {
        self.on_submit = Box::new(f);
        self
    }

    pub fn on_status(
        mut self,
        f: impl Fn(&str, usize) -> Result<TaskResult> + Send + Sync + 'static,
    ) -> Self {
        self.on_status = Box::new(f);
        self
    }

    pub fn on_download(
        mut self,
        f: impl Fn(&str, usize) -> Result<Vec<u8>> + Send + Sync + 'static,
    ) -> Self {
        self.on_download = Box::new(f);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submitted_prompts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Submit(prompt) => Some(prompt),
                _ => None,
            })
            .collect()
    }

    pub fn status_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Status(_)))
    }

    pub fn download_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Download(..)))
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ImageApi for MockApi {
    fn submit<'a>(&'a self, req: &'a GenerationRequest) -> ApiFuture<'a, SubmitResponse> {
        self.record(Call::Submit(req.prompt.clone()));
        Box::pin(std::future::ready((self.on_submit)(req)))
    }

    fn task_status<'a>(&'a self, task_id: &'a str) -> ApiFuture<'a, TaskResult> {
        self.record(Call::Status(task_id.into()));
        let n = self.status_calls();
        Box::pin(std::future::ready((self.on_status)(task_id, n)))
    }

    fn download<'a>(&'a self, url: &'a str, dest: &'a Path) -> ApiFuture<'a, u64> {
        self.record(Call::Download(url.into(), dest.to_owned()));
        let n = self.download_calls();
        let res = (self.on_download)(url, n).and_then(|bytes| {
            fs::write(dest, &bytes)?;
            Ok(bytes.len() as u64)
        });
        Box::pin(std::future::ready(res))
    }
}

pub fn sync_url(url: &str) -> SubmitResponse {
    SubmitResponse {
        data: vec![ImageData {
            url: Some(url.into()),
        }],
        ..Default::default()
    }
}

pub fn task(id: &str) -> SubmitResponse {
    SubmitResponse {
        task_id: Some(id.into()),
        ..Default::default()
    }
}

pub fn status(status: &str) -> TaskResult {
    TaskResult {
        task_status: status.into(),
        output_images: match status {
            "SUCCEED" => vec!["https://img/async.png".into()],
            _ => vec![],
        },
        ..Default::default()
    }
}

pub fn fail<T>(msg: &str) -> Result<T> {
    Err(eyre!("{msg}"))
}
