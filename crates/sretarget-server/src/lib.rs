//! sretarget server library entry.
//!
//! This crate wires the configuration, metrics registry, request pipeline and
//! route handlers into an axum service. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod obs;
pub mod ops;
pub mod pages;
pub mod router;
