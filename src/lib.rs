#![doc(test(attr(deny(warnings))))]

//! Event Budget schedules the cost of a planned purchase across installments,
//! tracks the payments made against it and reports which installments are
//! covered, pending or overdue.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod schedule;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup log line.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("event budget tracing initialized");
    });
}
