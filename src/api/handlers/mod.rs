//! HTTP request handlers

pub mod health;
pub mod hosting;
pub mod printful;
