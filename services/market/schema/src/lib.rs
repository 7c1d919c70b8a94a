//! sea-orm entities for the market service's tables.

pub mod cart_lines;
pub mod carts;
pub mod categories;
pub mod order_lines;
pub mod orders;
pub mod products;
pub mod revoked_tokens;
pub mod shipments;
pub mod upgrade_requests;
pub mod users;
