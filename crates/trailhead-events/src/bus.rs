//! The listener bus: registration-ordered, synchronous fan-out.

use std::collections::BTreeMap;

use tracing::trace;
use trailhead_types::{CampaignState, Channel, Notification};

/// A registered notification handler.
///
/// Handlers receive the payload and a reference to the current campaign
/// state. They must not attempt to reenter the state machine that emitted
/// the notification.
pub type Handler = Box<dyn Fn(&Notification, &CampaignState) + Send + Sync>;

/// Identifies one registration on the bus.
///
/// [`ListenerBus::on`] hands it back, and [`ListenerBus::off`] consumes it
/// to remove exactly that handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Named-channel pub/sub with synchronous, registration-ordered delivery.
#[derive(Default)]
pub struct ListenerBus {
    channels: BTreeMap<Channel, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl core::fmt::Debug for ListenerBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (channel, handlers) in &self.channels {
            map.entry(&channel.to_string(), &handlers.len());
        }
        map.finish()
    }
}

impl ListenerBus {
    /// Create an empty bus.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            channels: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Register a handler on a channel.
    ///
    /// Handlers for a channel are invoked in registration order. The
    /// returned id unsubscribes this handler via [`ListenerBus::off`].
    pub fn on(&mut self, channel: Channel, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.channels.entry(channel).or_default().push((id, handler));
        id
    }

    /// Remove a specific handler from a channel.
    ///
    /// Unknown ids are ignored.
    pub fn off(&mut self, channel: Channel, id: SubscriptionId) {
        if let Some(handlers) = self.channels.get_mut(&channel) {
            handlers.retain(|(registered, _)| *registered != id);
        }
    }

    /// Return how many handlers are registered on a channel.
    #[must_use]
    pub fn handler_count(&self, channel: Channel) -> usize {
        self.channels.get(&channel).map_or(0, Vec::len)
    }

    /// Synchronously deliver a notification to every handler on its channel.
    ///
    /// All handlers are invoked, in registration order, before this method
    /// returns. Channels with no handlers are a silent no-op.
    pub fn emit(&self, notification: &Notification, state: &CampaignState) {
        let channel = notification.channel();
        let Some(handlers) = self.channels.get(&channel) else {
            return;
        };
        trace!(%channel, handlers = handlers.len(), "delivering notification");
        for (_, handler) in handlers {
            handler(notification, state);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use trailhead_types::Timeline;

    use super::*;

    fn blank_state() -> CampaignState {
        CampaignState {
            role: None,
            team_name: String::new(),
            teammates: Vec::new(),
            budget: 800,
            goodwill: 100,
            morale: 70,
            engagement: "filling".to_owned(),
            pace: "steady".to_owned(),
            campuses_reached: 0,
            current_campus_index: 0,
            timeline: Timeline {
                year: 2025,
                month: 1,
                day: 1,
            },
            staff: Vec::new(),
            travel_log: Vec::new(),
            users: 0,
            progress_visits: 0,
        }
    }

    #[test]
    fn emit_invokes_registered_handler_with_payload_and_state() {
        let mut bus = ListenerBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        bus.on(
            Channel::BudgetChanged,
            Box::new(move |notification, state| {
                if let Notification::BudgetChanged { budget } = notification {
                    sink.lock().unwrap().push((*budget, state.morale));
                }
            }),
        );

        bus.emit(&Notification::BudgetChanged { budget: 760 }, &blank_state());
        assert_eq!(seen.lock().unwrap().as_slice(), &[(760, 70)]);
    }

    #[test]
    fn emit_on_channel_without_handlers_is_noop() {
        let bus = ListenerBus::new();
        bus.emit(&Notification::StateReset, &blank_state());
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let mut bus = ListenerBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let sink = Arc::clone(&order);
            bus.on(
                Channel::StateReset,
                Box::new(move |_, _| sink.lock().unwrap().push(tag)),
            );
        }

        bus.emit(&Notification::StateReset, &blank_state());
        assert_eq!(
            order.lock().unwrap().as_slice(),
            &["first", "second", "third"]
        );
    }

    #[test]
    fn off_removes_only_the_named_handler() {
        let mut bus = ListenerBus::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let keep_calls = Arc::clone(&calls);
        bus.on(
            Channel::MoraleChanged,
            Box::new(move |_, _| {
                keep_calls.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let drop_calls = Arc::clone(&calls);
        let to_remove = bus.on(
            Channel::MoraleChanged,
            Box::new(move |_, _| {
                drop_calls.fetch_add(10, Ordering::SeqCst);
            }),
        );

        bus.off(Channel::MoraleChanged, to_remove);
        assert_eq!(bus.handler_count(Channel::MoraleChanged), 1);

        bus.emit(&Notification::MoraleChanged { morale: 66 }, &blank_state());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn off_with_unknown_id_is_ignored() {
        let mut bus = ListenerBus::new();
        let id = bus.on(Channel::PaceChanged, Box::new(|_, _| {}));
        // Removing from the wrong channel leaves the handler in place.
        bus.off(Channel::BudgetChanged, id);
        assert_eq!(bus.handler_count(Channel::PaceChanged), 1);
    }

    #[test]
    fn separate_buses_do_not_share_handlers() {
        let mut a = ListenerBus::new();
        let b = ListenerBus::new();
        a.on(Channel::StateReset, Box::new(|_, _| {}));
        assert_eq!(a.handler_count(Channel::StateReset), 1);
        assert_eq!(b.handler_count(Channel::StateReset), 0);
    }
}
