//! `chaos-hostat` — client for the "simple" connectionless Chaosnet protocols.
//!
//! # Architecture
//!
//! ```text
//!  transport bytes ──▶ reply::read_reply ──▶ (source, payload)
//!                                                  │
//!                         records::decode(service) ▼
//!                                              Record ──▶ render::Renderer ──▶ text
//! ```
//!
//! Each module has a single responsibility:
//! - [`words`]   — 16-bit word and 32-bit long access over a payload
//! - [`reply`]   — request line, `ANS` header parsing, payload reassembly
//! - [`records`] — one decoder per service name plus the raw fallback
//! - [`render`]  — tables, interval phrasing, byte dumps
//! - [`network`] — the local stream endpoint and the exchange over it
//! - [`config`]  — per-invocation settings
//! - [`error`]   — the crate error type

pub mod config;
pub mod error;
pub mod network;
pub mod records;
pub mod render;
pub mod reply;
pub mod words;

pub use config::{Config, DisplayMode};
pub use error::{HostatError, Result};
pub use network::{connect, exchange, query};
pub use records::{decode, Record, Service};
pub use render::{seconds_as_interval, Renderer};
pub use reply::{read_reply, ReplyEnvelope, Request};
