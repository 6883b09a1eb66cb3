//! HTTP protocol engine.
//!
//! A deliberately small HTTP/1.1 server: one connection at a time, `GET`
//! only, no keep-alive, driven by repeated non-blocking ticks.
//!
//! # Architecture
//!
//! - **`tokenizer`**: byte-at-a-time state machine recognizing the request line and header terminator
//! - **`connection`**: the connection lifecycle state machine ([`connection::HttpServer`])
//! - **`response`**: status codes and the tokenizer's rejection classes
//! - **`writer`**: status line and header serialization
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │    Idle     │ ← Poll for a new connection
//!        └──────┬──────┘
//!               │ Accepted (first bytes tokenized in the same tick)
//!               ▼
//!        ┌──────────────────┐
//!        │    Receiving     │ ← Feed up to READ_CHUNK bytes per tick
//!        └──────┬───────────┘
//!               ├─ Rejected → Error ──────────────────────┐
//!               ▼ Request complete                        │
//!        ┌──────────────────┐                             │
//!        │  ResponseStart   │ ← Status, headers, chunk 1  │
//!        └──────┬───────────┘                             │
//!               ▼ More chunks                             │
//!        ┌──────────────────┐                             │
//!        │  ResponseBody    │ ← One chunk per tick        │
//!        └──────┬───────────┘                             │
//!               ▼                                         │
//!        ┌──────────────────┐                             │
//!        │   ResponseEnd    │ ← Flush                     │
//!        └──────┬───────────┘                             │
//!               ▼                                         │
//!        ┌──────────────────┐                             │
//!        │    Cooldown      │ ◄───────────────────────────┘
//!        └──────┬───────────┘
//!               │ Grace period over → close → Idle
//! ```
//!
//! Outside `Idle`, a connection without recorded activity for longer than
//! the watchdog timeout is dropped without a response.

pub mod connection;
pub mod response;
pub mod tokenizer;
pub mod writer;
