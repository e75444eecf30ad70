//! Cart reconciliation, pricing and checkout orchestration.

pub mod context;
pub mod database;
pub mod domain;
pub mod gateways;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;
