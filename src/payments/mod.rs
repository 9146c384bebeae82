//! Payment ledger and payment schedule engine.
//!
//! `ledger` and `schedule` are pure; `services` runs them under the
//! contract lock and commits through the store.

pub mod ledger;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod schedule;
pub mod services;

pub use ledger::{amount_paid, balance_due, LedgerSummary, MIN_PAYMENT};
pub use routes::router;
pub use schedule::{build_custom_schedule, build_schedule, build_schedule_a, reconcile};
pub use services::{
    delete_payment, edit_installment, ledger_view, rebuild_schedule, record_payment,
    update_payment, NewPayment, PaymentUpdate,
};
