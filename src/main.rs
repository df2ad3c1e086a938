use anyhow::Result;
use tgrelay::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
