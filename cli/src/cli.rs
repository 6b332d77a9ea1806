use std::path::PathBuf;

/// Generate one image per prompt with the ModelScope inference API
#[derive(Debug, clap::Parser)]
#[command(version)]
pub struct Cli {
    /// JSON file with a list of {"name": .., "prompt": ..} objects
    #[arg(short, long, default_value = "prompts.json")]
    pub prompts: PathBuf,

    /// Directory the images are written to, created if missing
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Model name [default: Qwen/Qwen-Image]
    #[arg(short, long)]
    pub model: Option<String>,

    #[arg(short = 'k', long, env = "MODELSCOPE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// RON config file, defaults to batch_imagegen.ron in the local config dir
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Image size as WIDTHxHEIGHT [default: 1024x1024]
    #[arg(long)]
    pub size: Option<String>,

    /// Number of prompts generated at the same time [default: 1]
    #[arg(short, long)]
    pub jobs: Option<usize>,
}
