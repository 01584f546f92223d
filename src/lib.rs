#![doc(test(attr(deny(warnings))))]

//! Job Ledger tracks jobs, the companies taking part in each job and the
//! transactions recorded between them, and derives income, expense,
//! receivable and payable summaries per company, per job and overall.
//!
//! The crate is organised in layers:
//!
//! - [`domain`] holds the plain records (jobs, companies, transactions) and
//!   the exported summary shapes.
//! - [`core`] classifies transactions, folds them into statistics and exposes
//!   the [`core::JobLedger`] façade that talks to a store.
//! - [`storage`] defines the [`storage::RecordStore`] contract together with an
//!   in-memory and a JSON file backend.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Job ledger tracing initialized.");
    });
}

/// Like [`init`], but filters events with the directive from `config`.
pub fn init_with_config(config: &config::Config) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing_with(&config.log_filter);
        tracing::info!(filter = %config.log_filter, "Job ledger tracing initialized.");
    });
}
