//! Serialized execution context for a [`SessionController`].
//!
//! One task owns the controller. Commands from the presentation side, events
//! from capture workers and timer ticks are all processed on that task, one
//! at a time, so the controller never sees concurrent mutation.

use crate::{
    CoreResult, SessionError,
    session::{
        CaptureCollaborator, CaptureMode, FrameInfo, SessionConfig, SessionController,
        SessionEvent, SessionPhase, SessionSnapshot,
    },
};

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        oneshot, watch,
    },
    time::{self, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, error, info, instrument, trace, warn};

/// Default number of queued commands before senders see backpressure.
pub const DEFAULT_INBOX_CAPACITY: usize = 64;

#[derive(Debug)]
pub(crate) enum SessionCommand {
    Start {
        capture_mode: CaptureMode,
        reply: oneshot::Sender<CoreResult<()>>,
    },
    Event(SessionEvent),
    Shutdown,
}

/// The serialized queue feeding a session runtime.
///
/// Created first so capture collaborators can be handed an [`EventSender`]
/// before the runtime that owns them exists.
pub struct SessionInbox {
    tx: mpsc::Sender<SessionCommand>,
    rx: mpsc::Receiver<SessionCommand>,
}

impl SessionInbox {
    /// Creates an inbox holding at most `capacity` pending commands.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self { tx, rx }
    }

    /// Sender for capture workers and other foreign execution contexts.
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }
}

impl Default for SessionInbox {
    fn default() -> Self {
        Self::new(DEFAULT_INBOX_CAPACITY)
    }
}

/// Posts typed events into a session inbox without blocking.
///
/// Safe to use from any thread, including high-rate frame callbacks.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<SessionCommand>,
}

impl EventSender {
    /// Queues `event` for the controller.
    ///
    /// # Errors
    ///
    /// `ChannelSendFailed` if the inbox is full or the runtime has stopped.
    #[track_caller]
    pub fn post(&self, event: SessionEvent) -> CoreResult<()> {
        self.tx
            .try_send(SessionCommand::Event(event))
            .map_err(|e| SessionError::ChannelSendFailed {
                message: match e {
                    TrySendError::Full(_) => "session inbox full".to_string(),
                    TrySendError::Closed(_) => "session runtime stopped".to_string(),
                },
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Queues a detector verdict.
    ///
    /// # Errors
    ///
    /// `ChannelSendFailed` if the inbox is full or the runtime has stopped.
    #[track_caller]
    pub fn post_detection(&self, detected: bool) -> CoreResult<()> {
        self.post(SessionEvent::DetectionUpdated(detected))
    }

    /// Queues a frame notification, dropping it if the inbox is full.
    ///
    /// Returns `false` when the frame was dropped.
    pub fn post_frame(&self, frame: FrameInfo) -> bool {
        match self.tx.try_send(SessionCommand::Event(SessionEvent::FrameArrived(frame))) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!(sequence = frame.sequence, "Inbox full, late frame dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Reports the file written for a finished movie capture.
    ///
    /// # Errors
    ///
    /// `ChannelSendFailed` if the inbox is full or the runtime has stopped.
    #[track_caller]
    pub fn post_recording_finished(&self, path: PathBuf) -> CoreResult<()> {
        self.post(SessionEvent::RecordingFinished(path))
    }

    /// Reports a device failure outside of a controller call.
    ///
    /// # Errors
    ///
    /// `ChannelSendFailed` if the inbox is full or the runtime has stopped.
    #[track_caller]
    pub fn post_capture_failed(&self, reason: impl Into<String>) -> CoreResult<()> {
        self.post(SessionEvent::CaptureFailed {
            reason: reason.into(),
        })
    }

    /// Whether the runtime has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Presentation-side handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<Option<SessionSnapshot>>,
}

impl SessionHandle {
    /// Starts a session and waits for the controller's verdict.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` / `SessionActive` from the controller.
    /// - `ChannelSendFailed` / `RuntimeStopped` if the runtime is gone.
    #[instrument(skip(self))]
    pub async fn start(&self, capture_mode: CaptureMode) -> CoreResult<()> {
        let (reply, response) = oneshot::channel();

        self.commands
            .send(SessionCommand::Start {
                capture_mode,
                reply,
            })
            .await
            .map_err(|e| SessionError::ChannelSendFailed {
                message: format!("Failed to send Start: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        response.await.map_err(|_| SessionError::RuntimeStopped {
            location: ErrorLocation::from(Location::caller()),
        })?
    }

    /// Forwards a detector verdict. Does not wait for it to be processed.
    ///
    /// # Errors
    ///
    /// `ChannelSendFailed` if the runtime has stopped.
    pub async fn report_person_detected(&self, detected: bool) -> CoreResult<()> {
        self.send(SessionCommand::Event(SessionEvent::DetectionUpdated(detected)))
            .await
    }

    /// Requests cancellation. Takes effect on the runtime's next turn.
    ///
    /// # Errors
    ///
    /// `ChannelSendFailed` if the runtime has stopped.
    pub async fn cancel(&self) -> CoreResult<()> {
        self.send(SessionCommand::Event(SessionEvent::Cancel)).await
    }

    /// Asks the runtime to release capture resources and exit.
    ///
    /// # Errors
    ///
    /// `ChannelSendFailed` if the runtime has already stopped.
    pub async fn shutdown(&self) -> CoreResult<()> {
        self.send(SessionCommand::Shutdown).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionSnapshot>> {
        self.snapshots.clone()
    }

    /// Waits until the published phase satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// `RuntimeStopped` if the runtime exits first.
    pub async fn wait_for_phase<F>(&self, mut predicate: F) -> CoreResult<SessionSnapshot>
    where
        F: FnMut(SessionPhase) -> bool,
    {
        let mut snapshots = self.snapshots.clone();

        let snapshot = snapshots
            .wait_for(|snapshot| {
                snapshot
                    .as_ref()
                    .is_some_and(|snapshot| predicate(snapshot.phase))
            })
            .await
            .map_err(|_| SessionError::RuntimeStopped {
                location: ErrorLocation::from(Location::caller()),
            })?;

        snapshot
            .as_ref()
            .cloned()
            .ok_or_else(|| SessionError::RuntimeStopped {
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn send(&self, command: SessionCommand) -> CoreResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|e| SessionError::ChannelSendFailed {
                message: format!("Failed to send command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

struct Ticker {
    generation: u64,
    interval: Interval,
}

/// Owns a [`SessionController`] and drives it from its inbox and timers.
pub struct SessionRuntime {
    controller: SessionController,
    commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<Option<SessionSnapshot>>,
}

impl SessionRuntime {
    /// Builds the runtime and the handle used to talk to it.
    ///
    /// The runtime stops when [`SessionHandle::shutdown`] is called or when
    /// every handle and [`EventSender`] has been dropped.
    pub fn new(
        config: SessionConfig,
        capture: Box<dyn CaptureCollaborator>,
        inbox: SessionInbox,
    ) -> (Self, SessionHandle) {
        let SessionInbox { tx, rx } = inbox;
        let (snapshot_tx, snapshot_rx) = watch::channel(None);

        let runtime = Self {
            controller: SessionController::new(config, capture),
            commands: rx,
            snapshots: snapshot_tx,
        };

        let handle = SessionHandle {
            commands: tx,
            snapshots: snapshot_rx,
        };

        (runtime, handle)
    }

    /// Registers a phase observer. Observers run on the runtime task.
    pub fn on_phase_change<F>(&mut self, observer: F)
    where
        F: FnMut(&SessionSnapshot) + Send + 'static,
    {
        self.controller.on_phase_change(observer);
    }

    /// Processes commands, events and ticks until shutdown.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> CoreResult<()> {
        info!("Session runtime started");

        let mut ticker: Option<Ticker> = None;

        loop {
            self.sync_ticker(&mut ticker);

            // Ticks first: a busy inbox must not delay the countdown. A tick
            // already due when a cancel arrives is processed before it; later
            // ticks carry a stale generation.
            tokio::select! {
                biased;

                generation = next_tick(&mut ticker) => {
                    self.dispatch(SessionEvent::Tick { generation });
                }

                command = self.commands.recv() => {
                    match command {
                        Some(SessionCommand::Start { capture_mode, reply }) => {
                            let result = self.controller.start(capture_mode);
                            if let Err(e) = &result {
                                warn!(error = %e, "Session start rejected");
                            }
                            if reply.send(result).is_err() {
                                debug!("Start requester went away before the reply");
                            }
                        }
                        Some(SessionCommand::Event(event)) => self.dispatch(event),
                        Some(SessionCommand::Shutdown) => {
                            info!("Session runtime shutdown requested");
                            break;
                        }
                        None => {
                            info!("All session senders dropped, shutting down");
                            break;
                        }
                    }
                }
            }

            self.publish();
        }

        self.controller.teardown();
        self.publish();

        info!("Session runtime stopped");

        Ok(())
    }

    fn dispatch(&mut self, event: SessionEvent) {
        if let Err(e) = self.controller.handle(event) {
            error!(error = %e, "Session event ended the session");
        }
    }

    fn publish(&self) {
        let latest = self.controller.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == latest {
                false
            } else {
                *current = latest;
                true
            }
        });
    }

    /// Keeps the interval in step with the controller's armed timer.
    fn sync_ticker(&self, ticker: &mut Option<Ticker>) {
        let armed = self.controller.armed_timer();

        match (armed, ticker.as_ref()) {
            (Some(armed), Some(current)) if armed.generation == current.generation => {}
            (Some(armed), _) => {
                let period = self.controller.tick_interval();
                let mut interval = time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

                debug!(kind = ?armed.kind, generation = armed.generation, "Timer armed");

                *ticker = Some(Ticker {
                    generation: armed.generation,
                    interval,
                });
            }
            (None, Some(current)) => {
                debug!(generation = current.generation, "Timer disarmed");
                *ticker = None;
            }
            (None, None) => {}
        }
    }
}

async fn next_tick(ticker: &mut Option<Ticker>) -> u64 {
    match ticker {
        Some(ticker) => {
            ticker.interval.tick().await;
            ticker.generation
        }
        None => std::future::pending().await,
    }
}
