use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{
    Result,
    eyre::{WrapErr as _, bail, eyre},
};
use imagegen_engine::{
    BatchSummary, GeneratorConfig, ImageApiBox, ModelScope, load_prompts, run_batch,
};
use log::info;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::cli::Cli;

pub mod cli;

const CONFIG_FILE_NAME: &str = "batch_imagegen.ron";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub generator: GeneratorConfig,
}

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)?;
    Ok(ron::from_str(&src)?)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join(CONFIG_FILE_NAME))
}

/// An explicitly given config file has to exist, the default one is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Option<Config>> {
    let path = match explicit {
        Some(path) => path.to_owned(),
        None => {
            let path = config_path()?;
            if !path.exists() {
                return Ok(None);
            }
            path
        }
    };

    info!("Loading config from {}", path.display());
    load_ron_file(&path)
        .with_context(|| format!("loading config file {}", path.display()))
        .map(Some)
}

/// Applies the command line on top of the config file
pub fn resolve(cli: &Cli, file: Option<Config>) -> Result<(String, GeneratorConfig)> {
    let Config {
        api_key,
        mut generator,
    } = file.unwrap_or_default();

    if let Some(model) = &cli.model {
        generator.model = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        generator.base_url = base_url.clone();
    }
    if let Some(size) = &cli.size {
        generator.size = size.clone();
    }
    if let Some(jobs) = cli.jobs {
        generator.jobs = jobs;
    }

    let Some(api_key) = cli.api_key.clone().or(api_key).filter(|k| !k.is_empty()) else {
        bail!(
            "No API key: pass --api-key, set MODELSCOPE_API_KEY or add api_key to {CONFIG_FILE_NAME}"
        );
    };

    Ok((api_key, generator))
}

/// Loads everything, generates every prompt and returns the tally.
///
/// The prompts file is read before the output directory is created, so a
/// missing file leaves no trace.
pub async fn run(cli: Cli) -> Result<BatchSummary> {
    let items = load_prompts(&cli.prompts)?;
    info!("Loaded {} prompts from {}", items.len(), cli.prompts.display());

    let (api_key, generator) = resolve(&cli, load_config(cli.config.as_deref())?)?;

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("creating output dir {}", cli.output.display()))?;

    let api: ImageApiBox = Box::new(ModelScope::new(
        api_key,
        generator.base_url.clone(),
        generator.request_timeout,
    )?);

    Ok(run_batch(api.as_ref(), &generator, &items, &cli.output).await)
}

pub fn format_summary(summary: &BatchSummary, output_dir: &Path) -> String {
    let mut out = format!(
        "{}\nDone!\n  succeeded: {}\n  failed: {}\n",
        "=".repeat(50),
        summary.success_count,
        summary.failed_names.len()
    );
    if !summary.all_succeeded() {
        out.push_str(&format!("  failed items: {}\n", summary.failed_names.join(", ")));
    }
    out.push_str(&format!("Output directory: {}", output_dir.display()));
    out
}
