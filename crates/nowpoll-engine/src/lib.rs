//! # nowpoll Engine
//!
//! The polling engine: one task that fetches the remote history on a fixed
//! interval, runs change detection, and fans the result out to registered
//! observers.
//!
//! ## Model
//!
//! The engine owns all mutable state (snapshot store, change detector,
//! observer registry) inside a single task; consumers talk to it through a
//! cloneable [`EngineHandle`] backed by a command channel. Fetches are
//! strictly serialized: the next poll is only armed after the previous one
//! has completed and its notifications have been delivered.
//!
//! Polling starts lazily with the first observer registration and keeps
//! running, failures included, until every handle has been dropped.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod poller;

pub use poller::{EngineConfig, EngineError, EngineHandle, PollEngine};
