//! Background event reporter.

use std::sync::Mutex;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::SolarError;

/// Untyped event payload.
pub type Event = serde_json::Value;

/// Consumer of reported events, run on the reporter's task.
pub type EventHandler = Box<dyn FnMut(Event) + Send>;

/// Default handler: logs every event.
pub fn log_event(event: Event) {
    match event.get("type").and_then(|t| t.as_str()) {
        Some(kind) => tracing::info!(kind, %event, "Event"),
        None => tracing::info!(%event, "Event"),
    }
}

/// Events are processed one at a time, in the order they were reported.
///
/// [`Reporter::shutdown`] stops intake and drains what is already queued.
pub struct Reporter {
    sender: mpsc::UnboundedSender<Event>,
    cancel: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<usize>>>,
}

impl Reporter {
    /// Spawn the drain task on the current tokio runtime.
    pub fn start(handler: impl FnMut(Event) + Send + 'static) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (cancel, cancelled) = watch::channel(false);

        let task = tokio::spawn(drain(receiver, cancelled, handler));
        tracing::debug!("Event reporter started");

        Self {
            sender,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    /// Queue an event. Never blocks.
    pub fn report(&self, event: impl Into<Event>) -> Result<(), SolarError> {
        self.sender
            .send(event.into())
            .map_err(|_| SolarError::ReporterClosed)
    }

    /// Stop accepting events, process the queued ones, and wait for the task.
    ///
    /// Returns the number of events processed over the reporter's lifetime, or
    /// 0 if it was already shut down.
    pub async fn shutdown(&self) -> usize {
        let _ = self.cancel.send(true);

        let task = self
            .task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        let Some(task) = task else {
            return 0;
        };

        match task.await {
            Ok(processed) => {
                tracing::debug!(processed, "Event reporter stopped");
                processed
            }
            Err(e) => {
                tracing::error!(error = %e, "Event reporter task failed");
                0
            }
        }
    }
}

async fn drain(
    mut receiver: mpsc::UnboundedReceiver<Event>,
    mut cancelled: watch::Receiver<bool>,
    mut handler: impl FnMut(Event),
) -> usize {
    let mut processed = 0;

    loop {
        tokio::select! {
            biased;
            event = receiver.recv() => match event {
                Some(event) => {
                    handler(event);
                    processed += 1;
                }
                None => break,
            },
            _ = cancelled.changed() => {
                receiver.close();
                while let Some(event) = receiver.recv().await {
                    handler(event);
                    processed += 1;
                }
                break;
            }
        }
    }

    processed
}
