//! Cart endpoints

pub(crate) mod errors;
pub(crate) mod handlers;
pub(crate) mod payloads;
pub(crate) mod responses;
