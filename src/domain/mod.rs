//! Domain models for the order workflow
//!
//! Typed records shared between the hosting bridge, the fulfillment client,
//! and the order orchestrator.

pub mod image;
pub mod order;
pub mod product;

pub use image::{ImageAsset, ImageData};
pub use order::{
    MockupStatus, MockupTask, Order, OrderCosts, Recipient, RecipientError, ShippingRate,
};
pub use product::{PlacementSpec, ProductKind};
