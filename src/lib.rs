//! Storefront Payments - Razorpay order creation, checkout signature
//! verification and payment webhooks for the storefront.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
