use std::path::Path;

use futures::{StreamExt, stream};
use log::{error, info};

use crate::{
    config::GeneratorConfig, image_api::ImageApi, pipeline::generate_item, prompts::PromptItem,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub success_count: usize,
    /// in prompt order
    pub failed_names: Vec<String>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.success_count + self.failed_names.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_names.is_empty()
    }
}

/// Generates every item into `output_dir`. A failing item is logged and
/// recorded, it never stops the batch.
///
/// Up to `config.jobs` items are in flight at once. Results are collected in
/// prompt order either way.
pub async fn run_batch(
    api: &dyn ImageApi,
    config: &GeneratorConfig,
    items: &[PromptItem],
    output_dir: &Path,
) -> BatchSummary {
    let total = items.len();

    let outcomes: Vec<_> = stream::iter(items.iter().enumerate())
        .map(|(i, item)| async move {
            info!("Progress: {}/{total} [{}]", i + 1, item.name);
            let outcome = generate_item(api, config, item, output_dir).await;
            if let Err(e) = &outcome {
                error!("[{}] failed: {e}", item.name);
            }
            (item, outcome)
        })
        .buffered(config.jobs.max(1))
        .collect()
        .await;

    outcomes
        .into_iter()
        .fold(BatchSummary::default(), |mut summary, (item, outcome)| {
            match outcome {
                Ok(_) => summary.success_count += 1,
                Err(_) => summary.failed_names.push(item.name.clone()),
            }
            summary
        })
}
