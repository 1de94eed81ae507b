//! # nowpoll HTTP Source
//!
//! reqwest-based [`nowpoll_core::HistorySource`] that GETs a configured JSON
//! endpoint and decodes the optional-field history payload.
//!
//! ## Caching
//!
//! Some intermediaries cache the history document aggressively, so the
//! client can append a throwaway `dummy=<epoch-ms>` query parameter to every
//! request (on by default).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;

pub use client::{ClientError, HistoryClient, HistoryClientConfig};
