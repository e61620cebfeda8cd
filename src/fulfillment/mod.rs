//! Fulfillment integration
//!
//! Typed façade over the print-on-demand HTTP API. The trait in `traits` is
//! the seam the orchestrator and the tests program against; `client` is the
//! production implementation speaking the Printful v1 wire format.

pub mod client;
pub mod http_client;
pub mod models;
pub mod traits;

pub use client::PrintfulClient;
pub use http_client::RateLimitedClient;
pub use traits::{FulfillmentApi, FulfillmentError, FulfillmentResult};
