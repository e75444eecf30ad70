//! Order Service Domain Concerns

pub mod addresses;
pub mod carts;
pub mod shipping;
