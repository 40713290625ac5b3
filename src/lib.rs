//! Async Rust client for the [BlockCypher](https://www.blockcypher.com/dev/) REST API.
//!
//! The client is a thin pass-through: one method per API endpoint, each building
//! the resource path, appending the API token and returning the response as
//! [`serde_json::Value`]. Nothing is validated, cached or retried locally.
//!
//! # Features
//!
//! - **`types` module** — [`Coin`] and [`Chain`] selectors, [`QueryParams`] and
//!   [`BlockRef`]. Available with no additional features.
//! - **`client` module** (enabled by default) — An async client built on `reqwest`.
//!
//! # Quick start
//!
//! ```no_run
//! use blockcypher_client::{BlockcypherClient, QueryParams};
//!
//! #[tokio::main]
//! async fn main() -> blockcypher_client::client::Result<()> {
//!     let client = BlockcypherClient::bitcoin("your-token");
//!     let chain = client.chain_info().await?;
//!     println!("Height: {}", chain["height"]);
//!
//!     let params = QueryParams::new().limit(5);
//!     let addr = client.address("1DEP8i3QJCsomS4BSMY2RpU1upv62aGvhD", Some(&params)).await?;
//!     println!("Transactions: {}", addr["n_tx"]);
//!     Ok(())
//! }
//! ```

mod query_helpers;
pub mod types;

pub use query_helpers::{BlockRef, QueryParams};

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "client")]
pub use client::{ApiError, BlockcypherClient, ClientConfig, Error};

pub use types::*;
