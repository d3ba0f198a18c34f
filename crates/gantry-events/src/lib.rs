/// Change-notification types for the module host.
///
/// This crate provides the foundational types for observing module
/// lifecycle transitions, allowing UI and debug tooling to subscribe
/// without depending on the kernel crate.
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// The lifecycle transition a notice reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// A load was requested for the module key.
    Load,
    /// The module was enabled.
    Enable,
    /// The module was disabled.
    Disable,
}

/// One lifecycle transition, delivered synchronously after the
/// transition has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub operation: Operation,
    pub key: String,
}

impl ChangeNotice {
    pub fn new(operation: Operation, key: impl Into<String>) -> Self {
        Self {
            operation,
            key: key.into(),
        }
    }
}

/// Trait for components that observe lifecycle transitions.
///
/// Listeners run on the host's thread of control; they see registry
/// state as it is *after* the transition.
pub trait ChangeListener: Send + 'static {
    fn on_change(&mut self, notice: &ChangeNotice);
}

/// Listener that logs every transition.
pub struct LoggingListener;

impl ChangeListener for LoggingListener {
    fn on_change(&mut self, notice: &ChangeNotice) {
        match notice.operation {
            Operation::Load => {
                tracing::debug!(target: "events", "load requested: {}", notice.key);
            }
            Operation::Enable => {
                tracing::info!(target: "events", "enabled: {}", notice.key);
            }
            Operation::Disable => {
                tracing::info!(target: "events", "disabled: {}", notice.key);
            }
        }
    }
}

/// Listener that fans a notice out to multiple listeners in order.
pub struct CompositeListener {
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl CompositeListener {
    pub fn new(listeners: Vec<Box<dyn ChangeListener>>) -> Self {
        Self { listeners }
    }

    pub fn with_listener(mut self, listener: Box<dyn ChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl ChangeListener for CompositeListener {
    fn on_change(&mut self, notice: &ChangeNotice) {
        for listener in &mut self.listeners {
            listener.on_change(notice);
        }
    }
}

/// Broadcast bus that distributes notices to any number of subscribers.
///
/// Subscribers receive notices over a channel and so observe them
/// asynchronously; tooling that needs the synchronous ordering
/// guarantee should register a [`ChangeListener`] directly instead.
#[derive(Debug, Clone)]
pub struct NoticeBus {
    sender: broadcast::Sender<ChangeNotice>,
}

impl NoticeBus {
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<ChangeNotice>) {
        let (sender, receiver) = broadcast::channel(capacity);
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// A listener that forwards every notice onto this bus.
    pub fn listener(&self) -> BusListener {
        BusListener {
            sender: self.sender.clone(),
        }
    }
}

/// Forwards notices from the host onto a [`NoticeBus`].
pub struct BusListener {
    sender: broadcast::Sender<ChangeNotice>,
}

impl ChangeListener for BusListener {
    fn on_change(&mut self, notice: &ChangeNotice) {
        // No subscribers is fine; the bus drops the notice.
        let _ = self.sender.send(notice.clone());
    }
}
