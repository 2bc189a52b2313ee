#![doc(test(attr(deny(warnings))))]

//! Family ledger: month-scoped household budgeting with envelopes, savings goals and JSON/CSV
//! interchange, plus a small command shell to drive it.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod interchange;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("family_ledger tracing initialized");
    });
}
