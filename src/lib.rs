//! Order, product and user services plus the gateway that fronts them.
//!
//! Each service is a thin CRUD layer over a store; the gateway forwards
//! `/products`, `/auth` and `/orders` to the configured upstreams.

pub mod api;
pub mod config;
pub mod error;
pub mod persistence;
pub mod server;
pub mod types;
