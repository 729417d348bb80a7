//! Route handlers beyond the operational probes (see `ops`).
//!
//! Handlers keep no state of their own; everything shared lives in `AppState`.

pub mod chaos;
pub mod docs;
pub mod info;
