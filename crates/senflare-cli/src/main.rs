//! senflare - collect candidate edge endpoints, keep the reachable ones and rank them by region.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    senflare_cli::run().await
}
