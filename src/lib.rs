//! DCF77 web clock - cooperative HTTP status server
//!
//! Core library: a non-blocking single-connection HTTP engine, the
//! time-sample history it reports on, and the page that renders it.

pub mod config;
pub mod dcf77;
pub mod history;
pub mod http;
pub mod page;
pub mod receiver;
pub mod server;
