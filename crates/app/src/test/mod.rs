//! Test support for service and store tests.

mod context;
mod helpers;

pub(crate) use context::TestContext;
pub(crate) use db::TestDb;
pub(crate) use helpers::*;
pub(crate) use memory::MemoryCartStore;
