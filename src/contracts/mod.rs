//! Contract lifecycle module.

pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

pub use routes::router;
pub use services::{
    change_status, complete_past_events, create_contract, get_contract, update_selections,
    ContractUpdate, NewContract,
};
