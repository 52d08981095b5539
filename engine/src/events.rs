//! Lifecycle event subscriptions.

use std::collections::HashMap;
use std::fmt;

use wopr_types::{DecryptEvent, EventKind};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&DecryptEvent)>;

/// Per-kind handler lists, invoked in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&DecryptEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Unknown ids are ignored; returns whether one was removed.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        let Some(list) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        before != list.len()
    }

    pub fn emit(&mut self, event: &DecryptEvent) {
        if let Some(list) = self.handlers.get_mut(&event.kind()) {
            for (_, handler) in list.iter_mut() {
                handler(event);
            }
        }
    }

    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(&str, usize)> = EventKind::ALL
            .iter()
            .map(|kind| (kind.as_str(), self.subscriber_count(*kind)))
            .filter(|(_, count)| *count > 0)
            .collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .finish_non_exhaustive()
    }
}
