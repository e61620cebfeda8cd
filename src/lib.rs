//! Podbridge
//!
//! Order-preparation and mockup-polling workflow bridging a generative-image
//! pipeline to a print-on-demand fulfillment API. The crate hosts locally
//! held artwork at a public URL, drives the asynchronous mockup task to
//! completion, estimates costs and shipping in real time, and reconciles the
//! two-phase (draft -> confirm) order lifecycle, falling back to a fully
//! simulated track whenever the fulfillment service is unreachable.
//!
//! The binary in `main.rs` serves the authenticated proxy layer: the
//! fulfillment credential stays server-side and browsers only ever talk to
//! this service.

pub mod api;
pub mod config;
pub mod domain;
pub mod flow;
pub mod fulfillment;
pub mod hosting;
