//! The fetch/decide/notify/reschedule loop.

use nowpoll_core::{
    ChangeDetector, HistorySnapshot, HistorySource, ObserverCallback, ObserverFailure, ObserverId,
    ObserverRegistry, SnapshotStore,
};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay between the completion of one poll and the start of the next
    pub poll_interval: Duration,
    /// Command channel capacity
    pub command_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            command_capacity: 16,
        }
    }
}

enum Command {
    Register(ObserverCallback, oneshot::Sender<ObserverId>),
    Deregister(ObserverId, oneshot::Sender<bool>),
    Snapshot(oneshot::Sender<HistorySnapshot>),
}

/// Cloneable handle to a running [`PollEngine`].
///
/// Registration and deregistration are the engine's whole public surface;
/// transport failures never propagate out of these calls.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
}

impl EngineHandle {
    /// Register an observer, lazily starting the poll loop on first interest.
    ///
    /// The callback is invoked exactly once per poll cycle with the change
    /// flag and the current snapshot. Ids are issued in registration order
    /// and never reused.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Stopped`] if the engine task is gone.
    pub async fn register<F>(&self, callback: F) -> Result<ObserverId, EngineError>
    where
        F: FnMut(bool, &HistorySnapshot) -> Result<(), ObserverFailure> + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Register(Box::new(callback), reply))
            .await
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)
    }

    /// Deregister an observer.
    ///
    /// Returns `true` if the observer was present, `false` if it had already
    /// been removed (a repeated deregistration is a harmless no-op).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Stopped`] if the engine task is gone.
    pub async fn deregister(&self, id: ObserverId) -> Result<bool, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Deregister(id, reply))
            .await
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)
    }

    /// Read the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Stopped`] if the engine task is gone.
    pub async fn snapshot(&self) -> Result<HistorySnapshot, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(reply))
            .await
            .map_err(|_| EngineError::Stopped)?;
        response.await.map_err(|_| EngineError::Stopped)
    }
}

/// The polling engine task.
///
/// Construct with [`PollEngine::new`], then drive it with
/// `tokio::spawn(engine.run())` and interact through the returned
/// [`EngineHandle`].
pub struct PollEngine<S> {
    source: S,
    interval: Duration,
    store: SnapshotStore,
    detector: ChangeDetector,
    registry: ObserverRegistry,
    commands: mpsc::Receiver<Command>,
}

impl<S: HistorySource> PollEngine<S> {
    /// Create an engine over `source` plus the handle to talk to it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInterval`] if the poll interval is zero.
    pub fn new(source: S, config: EngineConfig) -> Result<(Self, EngineHandle), EngineError> {
        if config.poll_interval.is_zero() {
            return Err(EngineError::InvalidInterval);
        }

        let (tx, rx) = mpsc::channel(config.command_capacity.max(1));

        let engine = Self {
            source,
            interval: config.poll_interval,
            store: SnapshotStore::new(),
            detector: ChangeDetector::new(),
            registry: ObserverRegistry::new(),
            commands: rx,
        };

        Ok((engine, EngineHandle { commands: tx }))
    }

    /// Run the engine until every handle has been dropped.
    ///
    /// Polling is armed by the first registration (an immediate fetch), then
    /// re-armed after each completion, success or failure alike. Commands
    /// keep being serviced while the interval timer runs; a fetch is never
    /// issued while another is in flight.
    pub async fn run(mut self) {
        tracing::debug!(interval = ?self.interval, "Poll engine waiting for first observer");

        // Lazy start: nothing is fetched until somebody is listening.
        loop {
            let Some(command) = self.commands.recv().await else {
                tracing::debug!("All engine handles dropped before polling started");
                return;
            };
            self.handle_command(command);
            if !self.registry.is_empty() {
                break;
            }
        }

        tracing::info!(interval = ?self.interval, "Poll loop started");

        loop {
            self.poll_once().await;

            let pause = time::sleep(self.interval);
            tokio::pin!(pause);
            loop {
                tokio::select! {
                    () = &mut pause => break,
                    command = self.commands.recv() => match command {
                        Some(command) => self.handle_command(command),
                        None => {
                            tracing::info!("All engine handles dropped, stopping poll loop");
                            return;
                        }
                    },
                }
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Register(callback, reply) => {
                let id = self.registry.register(callback);
                let _ = reply.send(id);
            }
            Command::Deregister(id, reply) => {
                let removed = self.registry.deregister(id);
                let _ = reply.send(removed);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.store.get().clone());
            }
        }
    }

    /// One poll cycle: fetch, decide, notify.
    ///
    /// A transport failure degrades to a `changed = false` notification with
    /// the prior snapshot untouched; it never escapes the loop.
    async fn poll_once(&mut self) {
        let changed = match self.source.fetch_history().await {
            Ok(payload) => self.detector.accept(payload, &mut self.store),
            Err(err) => {
                tracing::warn!(error = %err, "History fetch failed");
                false
            }
        };

        let notified = self.registry.notify_all(changed, self.store.get());
        tracing::debug!(changed, notified, "Poll cycle complete");
    }
}

/// Errors that can occur constructing or talking to the engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// Poll interval must be greater than zero
    #[error("poll interval must be greater than zero")]
    InvalidInterval,
    /// The engine task has stopped
    #[error("poll engine stopped")]
    Stopped,
}
