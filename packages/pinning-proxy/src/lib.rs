//! # Pinning Proxy
//!
//! Server-side half of the NFT minter. Forwards uploads to the Pinata
//! pinning API with a bearer credential that never reaches the browser.
//!
//! ## Quick Start
//! ```bash
//! PINATA_JWT=... cargo run --bin pinning-proxy
//! ```
//!
//! ## Endpoints
//! - `POST /api/pin/file` - Pin a multipart `file` field
//! - `POST /api/pin/json` - Pin a JSON metadata document
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus counters

pub mod config;
mod error;
mod handlers;
pub mod metrics;
mod middleware;
mod response;
mod router;
mod state;
pub mod upload;
pub mod upstream;

pub use crate::config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
