use std::{fs::File as StdFile, path::Path, time::Duration};

use color_eyre::{Result, eyre::ensure};
use log::debug;
use reqwest::{Client, ClientBuilder, Response};
use tokio::{fs::File, io::AsyncWriteExt};
use tokio_stream::StreamExt;

use super::{ApiFuture, GenerationRequest, ImageApi, SubmitResponse, TaskResult};

/// Client for the ModelScope inference API (OpenAI style image generations)
#[derive(Clone)]
pub struct ModelScope {
    client: Client,
    api_key: String,
    base_url: String,
    /// total time for an API call, downloads are only bounded per read
    timeout: Duration,
}

impl ModelScope {
    pub fn new(api_key: String, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: client_builder(timeout).build()?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

fn client_builder(timeout: Duration) -> ClientBuilder {
    Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
}

impl ImageApi for ModelScope {
    fn submit<'a>(&'a self, req: &'a GenerationRequest) -> ApiFuture<'a, SubmitResponse> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.url("images/generations"))
                .timeout(self.timeout)
                .bearer_auth(&self.api_key)
                .header("X-ModelScope-Async-Mode", "true")
                .json(req)
                .send()
                .await?;

            let status = resp.status();
            let body = resp.text().await?;
            ensure!(status.is_success(), "Submission rejected: {status} - {body}");
            debug!("Submit response: {body}");

            Ok(serde_json::from_str(&body)?)
        })
    }

    fn task_status<'a>(&'a self, task_id: &'a str) -> ApiFuture<'a, TaskResult> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.url(&format!("tasks/{task_id}")))
                .timeout(self.timeout)
                .bearer_auth(&self.api_key)
                .header("X-ModelScope-Task-Type", "image_generation")
                .send()
                .await?;

            let status = resp.status();
            let body = resp.text().await?;
            ensure!(status.is_success(), "Status query rejected: {status} - {body}");
            debug!("Status response: {body}");

            Ok(serde_json::from_str(&body)?)
        })
    }

    /// Streams into a uniquely named temp file next to `dest` and moves it
    /// into place once complete. The temp file is removed on failure.
    fn download<'a>(&'a self, url: &'a str, dest: &'a Path) -> ApiFuture<'a, u64> {
        Box::pin(async move {
            let resp = self.client.get(url).send().await?.error_for_status()?;

            let dir = dest
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let part = tempfile::Builder::new()
                .prefix(".")
                .suffix(".part")
                .tempfile_in(dir)?;

            let written = stream_to_file(resp, part.reopen()?).await?;
            part.persist(dest)?;
            Ok(written)
        })
    }
}

async fn stream_to_file(resp: Response, file: StdFile) -> Result<u64> {
    let mut file = File::from_std(file);
    let mut stream = resp.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}
