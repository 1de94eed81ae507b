//! Console now-playing view.
//!
//! A small observer that mirrors what a station widget would show: the
//! currently playing track plus the one before it. When nothing is playing
//! the most recent track is shown as the last played one instead.

use nowpoll_core::{HistoryEntry, HistorySnapshot};

/// Tracks the current and previous entries and renders them on change.
#[derive(Debug, Default)]
pub struct NowPlayingView {
    current: Option<HistoryEntry>,
    previous: Option<HistoryEntry>,
    is_playing: bool,
}

impl NowPlayingView {
    /// Create an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one poll notification, re-rendering only when it changed.
    pub fn update(&mut self, changed: bool, snapshot: &HistorySnapshot) {
        self.current = snapshot.current().cloned();
        self.previous = snapshot.previous().cloned();
        self.is_playing = snapshot.is_playing;

        if changed {
            self.render();
        }
    }

    /// What to display: the playing track (if any) and the last played one.
    fn display_pair(&self) -> (Option<&HistoryEntry>, Option<&HistoryEntry>) {
        if self.is_playing {
            (self.current.as_ref(), self.previous.as_ref())
        } else {
            (None, self.current.as_ref())
        }
    }

    fn render(&self) {
        let (now, last) = self.display_pair();

        match now {
            Some(entry) => {
                tracing::info!(artist = %entry.artist, title = %entry.title, "Now playing");
            }
            None => tracing::info!("Nothing playing"),
        }

        if let Some(entry) = last {
            tracing::info!(artist = %entry.artist, title = %entry.title, "Previously played");
        }
    }
}
