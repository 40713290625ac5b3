//! Example: Query Bitcoin mainnet through BlockCypher.
//!
//! Run with: BLOCKCYPHER_TOKEN=... cargo run --example mainnet
//! Set RUST_LOG=blockcypher_client=debug to see each request.

use blockcypher_client::{BlockcypherClient, QueryParams, client::Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let token = std::env::var("BLOCKCYPHER_TOKEN").unwrap_or_default();
    let client = BlockcypherClient::bitcoin(token);

    println!("=== BlockCypher Bitcoin Mainnet ===\n");

    // 1. Chain info
    println!("1. Fetching chain info...");
    let chain = client.chain_info().await?;
    println!("   Name: {}", chain["name"]);
    println!("   Height: {}", chain["height"]);
    println!("   Latest hash: {}", chain["hash"]);
    println!("   Unconfirmed txs: {}", chain["unconfirmed_count"]);
    println!();

    // 2. Latest block, first few transactions only
    println!("2. Fetching latest block...");
    if let Some(height) = chain["height"].as_u64() {
        let params = QueryParams::new().limit(3);
        let block = client.block(height, Some(&params)).await?;
        println!("   Block hash: {}", block["hash"]);
        println!("   Transactions: {}", block["n_tx"]);
        println!("   Time: {}", block["time"]);
    }
    println!();

    // 3. Address balance
    println!("3. Fetching address balance...");
    let balance = client
        .address_balance("1DEP8i3QJCsomS4BSMY2RpU1upv62aGvhD", None)
        .await?;
    println!("   Balance: {} satoshis", balance["balance"]);
    println!("   Transactions: {}", balance["n_tx"]);

    // 4. A missing resource surfaces the API's error
    println!("\n4. Fetching an unknown webhook...");
    match client.webhook("does-not-exist").await {
        Ok(hook) => println!("   Unexpected hook: {hook}"),
        Err(err) => match err.api_error() {
            Some(api) => println!("   {} (not found: {})", api, api.is_not_found()),
            None => return Err(err),
        },
    }

    println!("\n=== Done! ===");
    Ok(())
}
