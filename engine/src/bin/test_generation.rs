use std::path::Path;

use color_eyre::{Result, eyre::eyre};
use imagegen_engine::{GeneratorConfig, ModelScope, PromptItem, pipeline::generate_item};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();

    let mut args = std::env::args().skip(1);
    let api_key = args.next().ok_or(eyre!("Missing api key as first arg"))?;
    let prompt = args
        .next()
        .unwrap_or_else(|| "A futuristic city at sunset".into());

    let config = GeneratorConfig::default();
    let api = ModelScope::new(api_key, &config.base_url, config.request_timeout)?;
    let item = PromptItem::new("output", prompt);

    let path = generate_item(&api, &config, &item, Path::new(".")).await?;
    println!("Saved image to {}", path.display());

    Ok(())
}
