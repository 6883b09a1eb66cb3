//! Collaborators the request engine is driven through.
//!
//! The engine itself never touches a socket or a clock directly. It polls a
//! [`Listener`] for at most one [`Client`] at a time and measures idle time
//! with a [`TimeSource`]. The [`tcp`] and [`clock`] modules provide the host
//! implementations used by the binary.

pub mod clock;
pub mod listener;
pub mod tcp;

pub use clock::{MonotonicClock, TimeSource};
pub use listener::{Client, Listener};
pub use tcp::{TcpAcceptor, TcpClient};
