//! Pricing engine module.
//!
//! Computes contract totals from the selected catalog items. The
//! calculators are pure; `services` wires them to the store and cache.

pub mod calculators;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{
    compute_total, round_money, round_to_nearest_hundred, PricingError, PricingPolicy,
    TotalBreakdown,
};
pub use routes::router;
pub use services::{contract_total, load_catalog, reprice};
