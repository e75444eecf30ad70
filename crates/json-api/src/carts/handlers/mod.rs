//! Cart Handlers

pub(crate) mod add_items;
pub(crate) mod remove;
pub(crate) mod upsert;
