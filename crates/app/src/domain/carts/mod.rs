//! Carts

pub mod data;
pub mod errors;
pub mod models;
pub mod reconcile;
mod repositories;
pub mod service;
pub mod store;
pub mod totals;

pub use errors::CartsServiceError;
pub use service::*;
