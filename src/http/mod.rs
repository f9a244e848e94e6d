//! HTTP protocol implementation.
//!
//! This module implements just enough HTTP/1.1 for a responder with a fixed
//! resource table: framing, parsing, path canonicalization and reply
//! serialization, plus the per-connection loop tying them together.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection state machine
//! - **`parser`**: Frames raw bytes into messages and parses them
//! - **`path`**: Canonicalizes request paths before lookup
//! - **`request`**: Parsed request representation
//! - **`response`**: Status codes, reply heads and message pages
//! - **`writer`**: Serializes and writes replies to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for a complete message
//!        └──────┬──────┘
//!               │
//!        ┌──────┴───────────────────┐
//!        │ TRACE                    │ anything else
//!        ▼                          ▼
//!  ┌─────────────┐          ┌──────────────────┐
//!  │   Tracing   │          │   Processing     │ ← Resolve and dispatch
//!  └──────┬──────┘          └──────┬───────────┘
//!         │ echo sent              │ reply sent
//!         └─→ Reading              ├─ determinate length and HTTP/1.1 → Reading
//!                                  └─ otherwise → Closed
//! ```
//!
//! Framing errors (end of stream mid-message, oversized message, no request
//! line) are answered with an error page and close the connection.

pub mod connection;
pub mod parser;
pub mod path;
pub mod request;
pub mod response;
pub mod writer;
