//! Generate command - runs the pipeline once and saves the deck

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::domain::presentation::DEFAULT_SLIDES;
use crate::domain::{AspectRatio, PresentationRequest};
use crate::infrastructure::GeneratedDeck;

/// Client id the rate limiter sees for command line runs
const CLI_CLIENT_ID: &str = "cli";

/// Arguments for the generate command
#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    /// Presentation topic (3-100 characters)
    #[arg(long)]
    pub topic: String,

    /// Number of slides (1-20)
    #[arg(long, default_value_t = DEFAULT_SLIDES)]
    pub num_slides: u32,

    /// Slide aspect ratio: 16:9 or 4:3
    #[arg(long, default_value = "16:9")]
    pub aspect_ratio: AspectRatio,

    /// Output directory (overrides config)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Generate one deck and print where it was written
pub async fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let request = PresentationRequest::new(args.topic, args.num_slides, args.aspect_ratio)?;
    let pipeline = crate::create_pipeline(&config)?;

    let deck = pipeline.run(CLI_CLIENT_ID, &request).await?;

    let directory = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    let path = save_deck(&directory, &deck).await?;

    info!(
        path = %path.display(),
        slides = deck.slide_count,
        suggested_name = %deck.file_name,
        "Presentation saved"
    );
    println!("{}", path.display());

    Ok(())
}

/// Write the deck as `<directory>/<uuid>.pptx`, creating the directory
pub async fn save_deck(directory: &Path, deck: &GeneratedDeck) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(directory)
        .await
        .with_context(|| format!("failed to create {}", directory.display()))?;

    let path = directory.join(format!("{}.pptx", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, &deck.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path)
}
