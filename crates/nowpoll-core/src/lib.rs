//! # nowpoll Core
//!
//! Core model for the now-playing polling engine.
//!
//! This crate provides:
//! - The wire payload shape and its normalized [`HistorySnapshot`] form
//! - [`ChangeDetector`] with a monotonic change marker
//! - [`SnapshotStore`] holding the single current snapshot
//! - [`ObserverRegistry`] with arena-style stable observer ids
//! - The [`HistorySource`] seam abstracting the remote fetch

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod detector;
pub mod registry;
pub mod snapshot;
pub mod source;

pub use detector::{ChangeDetector, ChangeMarker};
pub use registry::{ObserverCallback, ObserverFailure, ObserverId, ObserverRegistry};
pub use snapshot::{HistoryEntry, HistorySnapshot, RawHistoryPayload, SnapshotStore};
pub use source::{FetchError, HistorySource};
