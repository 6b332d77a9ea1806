use batch_imagegen::{cli::Cli, format_summary, run};
use clap::Parser;
use color_eyre::Result;
use log::LevelFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let output = std::path::absolute(&cli.output).unwrap_or_else(|_| cli.output.clone());
    let summary = run(cli).await?;
    println!("{}", format_summary(&summary, &output));

    Ok(())
}
