//! unibottle - universal toolchain bottler CLI

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use unibottle::io::download::{BlobClient, DEFAULT_BLOB_URL};
use unibottle::registry::{RegistryClient, DEFAULT_REGISTRY_URL};
use unibottle::tools::SystemTools;
use unibottle::{select_targets, Builder, Layout};

#[derive(Parser)]
#[command(name = "unibottle")]
#[command(version = env!("UNIBOTTLE_VERSION"))]
#[command(about = "Builds universal macOS toolchain binaries from prebuilt bottles")]
struct Cli {
    /// Build root; artifacts/ and bin/ are created here
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Build only the named target(s); defaults to all
    #[arg(long = "target")]
    targets: Vec<String>,

    /// Formula registry base URL
    #[arg(long, hide = true, default_value = DEFAULT_REGISTRY_URL)]
    registry_url: String,

    /// Blob registry base URL
    #[arg(long, hide = true, default_value = DEFAULT_BLOB_URL)]
    blob_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let targets = select_targets(&cli.targets)?;

    let client = reqwest::Client::new();
    let builder = Builder::new(
        Layout::new(cli.root),
        RegistryClient::new(client.clone(), cli.registry_url),
        BlobClient::new(client, cli.blob_url),
        Box::new(SystemTools),
    );

    builder.run(&targets).await?;
    Ok(())
}
