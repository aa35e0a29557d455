//! Observable viewer events.

use tokio::sync::broadcast;

/// Events emitted by the viewer, consumable by hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    /// A model load completed and its scene nodes were attached. Fires once
    /// per successful, non-superseded load.
    ModelProcessed,
    /// Every mesh discovered for the current generation has completed.
    /// Fires at most once per generation.
    GeometryLoaded,
}

/// Default capacity of the event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Creates the viewer's event channel.
pub fn channel() -> (broadcast::Sender<ViewerEvent>, broadcast::Receiver<ViewerEvent>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}
