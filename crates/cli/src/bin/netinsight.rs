use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    netinsight_cli::main_entry().await
}
