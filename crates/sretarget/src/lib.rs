//! Top-level facade crate for sretarget.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use sretarget_core::*;
}

pub mod server {
    pub use sretarget_server::*;
}
