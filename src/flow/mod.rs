//! Order orchestration
//!
//! Sequences the hosting bridge and the fulfillment client into the
//! user-facing two-phase order flow, including the simulated fallback track
//! and the mockup poll loop.

pub mod orchestrator;

pub use orchestrator::{
    poll_mockup_to_completion, ConnectionMode, FlowError, FlowState, MockupError, MockupPreview,
    OrderFlow, MAX_POLL_ATTEMPTS, POLL_INTERVAL,
};
