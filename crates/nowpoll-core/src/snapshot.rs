//! History payload shape, normalization, and the snapshot store.
//!
//! The remote endpoint reports a rolling history of recently played tracks.
//! Every field of the wire payload is optional; [`RawHistoryPayload::normalize`]
//! fills the documented defaults and produces the fully-populated
//! [`HistorySnapshot`] that observers see.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One played track as reported by the remote source.
///
/// Fields beyond `artist` and `title` are carried through opaquely so that
/// consumers can read source-specific extras without this crate knowing
/// about them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Artist name, empty when the source omits it
    #[serde(default)]
    pub artist: String,
    /// Track title, empty when the source omits it
    #[serde(default)]
    pub title: String,
    /// Any additional fields from the source, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryEntry {
    /// Create an entry from artist and title, with no extra fields.
    #[must_use]
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }
}

/// The normalized, fully-populated view of the remote history.
///
/// Entries are chronological with the most recent track last.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySnapshot {
    /// Recently played tracks, most recent last
    pub entries: Vec<HistoryEntry>,
    /// Whether a track is currently playing
    pub is_playing: bool,
    /// Duration of the current track in seconds
    pub current_duration: f64,
}

impl HistorySnapshot {
    /// The most recently played track, if any.
    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// The track played before the current one, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&HistoryEntry> {
        self.entries.len().checked_sub(2).map(|i| &self.entries[i])
    }
}

/// The optional-field payload as decoded from the remote endpoint.
///
/// Any field may be absent (or `null` for `history`); absence triggers the
/// defaults applied by [`Self::normalize`]. Unknown top-level fields are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHistoryPayload {
    /// Monotonic change marker supplied by the source
    #[serde(default)]
    pub last_history_change: Option<u64>,
    /// Rolling track history, most recent last
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
    /// Duration of the current track in seconds
    #[serde(default)]
    pub current_duration: Option<f64>,
    /// Whether a track is currently playing
    #[serde(default)]
    pub is_playing: Option<bool>,
}

impl RawHistoryPayload {
    /// Fill defaults for absent fields and produce the normalized snapshot.
    ///
    /// Defaults: `entries = []`, `is_playing = false`, `current_duration = 0`.
    #[must_use]
    pub fn normalize(self) -> HistorySnapshot {
        HistorySnapshot {
            entries: self.history.unwrap_or_default(),
            is_playing: self.is_playing.unwrap_or(false),
            current_duration: self.current_duration.unwrap_or(0.0),
        }
    }
}

/// Holds exactly one current [`HistorySnapshot`].
///
/// Created empty at startup and replaced wholesale on each accepted update;
/// there is never partial visibility of a half-applied payload. The store is
/// only written through [`crate::ChangeDetector::accept`].
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: HistorySnapshot,
}

impl SnapshotStore {
    /// Create a store holding the empty-default snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    #[must_use]
    pub fn get(&self) -> &HistorySnapshot {
        &self.current
    }

    /// Swap in a new snapshot.
    pub fn replace(&mut self, snapshot: HistorySnapshot) {
        self.current = snapshot;
    }
}
