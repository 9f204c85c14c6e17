//! Application services (use cases).
//!
//! These services keep ledger data fresh for the pricing layer and the
//! portfolio view, coordinating the read ports behind explicit caches.

pub mod cache;
pub mod sync;
