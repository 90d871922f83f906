use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_caption_translator::cli::{self, Cli, Commands};
use image_caption_translator::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_caption_translator=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        None => cli::serve(config, None, None).await?,
        Some(Commands::Serve { host, port }) => cli::serve(config, host, port).await?,
        Some(Commands::Describe {
            image,
            translate,
            token,
        }) => cli::describe(config, image, translate, token).await?,
    }

    Ok(())
}
