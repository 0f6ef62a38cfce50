use crate::core::geo::{LatLng, Point};
use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Events an engine reports to its subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The camera changed (center, zoom, or size)
    Move,
    /// Primary click on the map surface. `lng_lat` is the coordinate under
    /// `point` at the moment of the click.
    Click { point: Point, lng_lat: LatLng },
}

impl MapEvent {
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::Move => MapEventKind::Move,
            MapEvent::Click { .. } => MapEventKind::Click,
        }
    }
}

/// Event names accepted by [`crate::engine::MapEngine::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    Move,
    Click,
}

impl MapEventKind {
    /// Name the hosted SDK uses for this event
    pub fn as_str(&self) -> &'static str {
        match self {
            MapEventKind::Move => "move",
            MapEventKind::Click => "click",
        }
    }
}

/// Sending half handed to an engine when registering for an event kind.
///
/// Several listeners may feed the same [`Subscription`]; events then arrive
/// in the order the engine emitted them, whatever their kind.
#[derive(Debug, Clone)]
pub struct Listener {
    sender: Sender<MapEvent>,
}

impl Listener {
    /// Queues `event`; false once the subscription is gone
    pub fn send(&self, event: MapEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Receiving end of an event queue.
///
/// Dropping it detaches every listener created from it; emitters prune them
/// on the next emit.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<MapEvent>,
    sender: Sender<MapEvent>,
}

impl Subscription {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { receiver, sender }
    }

    /// A listener that feeds this queue
    pub fn listener(&self) -> Listener {
        Listener {
            sender: self.sender.clone(),
        }
    }

    /// Takes the next queued event, if any
    pub fn try_next(&self) -> Option<MapEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drains everything queued so far, oldest first
    pub fn drain(&self) -> Vec<MapEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

/// Fan-out of engine events to registered listeners
#[derive(Debug, Default)]
pub struct EventEmitter {
    listeners: Vec<(MapEventKind, Listener)>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for events of `kind`
    pub fn register(&mut self, kind: MapEventKind, listener: Listener) {
        self.listeners.push((kind, listener));
    }

    /// Delivers `event` to every listener of its kind, dropping listeners that went away
    pub fn emit(&mut self, event: MapEvent) {
        let kind = event.kind();
        self.listeners.retain(|(listener_kind, listener)| {
            if *listener_kind != kind {
                return true;
            }
            listener.send(event.clone())
        });
    }
}

#[cfg(test)]
impl EventEmitter {
    fn subscribe(&mut self, kind: MapEventKind) -> Subscription {
        let subscription = Subscription::new();
        self.register(kind, subscription.listener());
        subscription
    }

    fn len(&self) -> usize {
        self.listeners.len()
    }
}
