//! Pinhole - a tiny HTTP/1.1 responder
//!
//! Serves a fixed table of resources, either files or programs, over one
//! connection per process. Nothing outside the table is ever reachable.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod resource;
pub mod server;
pub mod visit_log;
