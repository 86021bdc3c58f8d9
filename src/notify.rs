//! Change notification
//!
//! A typed publish/subscribe channel carrying the cart's total item count to
//! any number of independent UI observers (a navigation badge, a drawer, a
//! checkout summary) without those observers polling the store or holding
//! references to each other. This replaces an untyped broadcast-event scheme
//! with a contract the type system can enforce: payload shape, delivery
//! order and unsubscribe semantics.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

type Handler = Box<dyn FnMut(u32)>;

struct Slot {
    id: u64,
    // Taken out of the slot for the duration of its own invocation, so the
    // registry is not borrowed while a handler runs.
    handler: Option<Handler>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    slots: Vec<Slot>,
}

impl Registry {
    fn insert(&mut self, handler: Handler) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            handler: Some(handler),
        });
        id
    }

    fn detach(&mut self, id: u64) {
        self.slots.retain(|slot| slot.id != id);
    }
}

/// Publisher side of the cart change channel.
///
/// Cloning is cheap and clones share the subscriber list. The notifier holds
/// no state beyond that list; a new process starts with zero subscribers.
///
/// Delivery is synchronous and single-threaded: a slow handler delays the
/// handlers after it, and a panicking handler propagates to the publisher
/// (subscribers are not isolated from one another).
#[derive(Clone, Default)]
pub struct Notifier {
    registry: Rc<RefCell<Registry>>,
}

impl Notifier {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for subsequent publishes.
    ///
    /// The returned [`Subscription`] detaches the handler when dropped or
    /// when [`Subscription::unsubscribe`] is called. A handler registered
    /// while a publish is being delivered sees only later events.
    pub fn subscribe(&self, handler: impl FnMut(u32) + 'static) -> Subscription {
        let id = self.registry.borrow_mut().insert(Box::new(handler));

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver a new total item count to every registered handler, in
    /// registration order.
    ///
    /// A handler that unsubscribes during its own invocation is not called
    /// again, but the in-flight call completes normally.
    pub fn publish(&self, total_item_count: u32) {
        let ids: Vec<u64> = self
            .registry
            .borrow()
            .slots
            .iter()
            .map(|slot| slot.id)
            .collect();

        for id in ids {
            let taken = self
                .registry
                .borrow_mut()
                .slots
                .iter_mut()
                .find(|slot| slot.id == id)
                .and_then(|slot| slot.handler.take());

            let Some(mut handler) = taken else {
                // Unsubscribed by an earlier handler of this same event.
                continue;
            };

            handler(total_item_count);

            // Hand the closure back unless the handler detached itself.
            let mut registry = self.registry.borrow_mut();
            if let Some(slot) = registry.slots.iter_mut().find(|slot| slot.id == id) {
                slot.handler = Some(handler);
            }
        }
    }

    /// Number of currently registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().slots.len()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Detach token for a registered handler.
///
/// Dropping the token detaches the handler, so an observer that goes away
/// always releases its registration. Detaching is idempotent and safe after
/// the notifier itself has been dropped.
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Detach the handler. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().detach(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<u32>>>, impl FnMut(u32) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |count| sink.borrow_mut().push(count))
    }

    #[test]
    fn publish_delivers_to_all_subscribers_in_registration_order() {
        let notifier = Notifier::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        let _a = notifier.subscribe(move |count| first.borrow_mut().push(("a", count)));

        let second = Rc::clone(&order);
        let _b = notifier.subscribe(move |count| second.borrow_mut().push(("b", count)));

        notifier.publish(5);

        assert_eq!(*order.borrow(), [("a", 5), ("b", 5)]);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let notifier = Notifier::new();
        let (seen, handler) = recorder();

        let token = notifier.subscribe(handler);
        notifier.publish(1);
        drop(token);
        notifier.publish(2);

        assert_eq!(*seen.borrow(), [1]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let notifier = Notifier::new();
        let (seen, handler) = recorder();

        let token = notifier.subscribe(handler);
        token.unsubscribe();
        token.unsubscribe();
        notifier.publish(1);

        assert!(seen.borrow().is_empty());
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_after_notifier_dropped_is_safe() {
        let notifier = Notifier::new();
        let (_seen, handler) = recorder();

        let token = notifier.subscribe(handler);
        drop(notifier);

        token.unsubscribe();
    }

    #[test]
    fn handler_unsubscribing_itself_receives_exactly_one_notification() {
        let notifier = Notifier::new();
        let calls = Rc::new(RefCell::new(0_u32));
        let token: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let counted = Rc::clone(&calls);
        let own_token = Rc::clone(&token);
        let subscription = notifier.subscribe(move |_| {
            *counted.borrow_mut() += 1;
            if let Some(taken) = own_token.borrow_mut().take() {
                taken.unsubscribe();
            }
        });
        *token.borrow_mut() = Some(subscription);

        notifier.publish(1);
        notifier.publish(2);

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn handler_subscribed_during_delivery_sees_only_later_events() {
        let notifier = Notifier::new();
        let late_counts = Rc::new(RefCell::new(Vec::new()));
        let late_token = Rc::new(RefCell::new(None));

        let inner_notifier = notifier.clone();
        let inner_counts = Rc::clone(&late_counts);
        let inner_token = Rc::clone(&late_token);
        let _a = notifier.subscribe(move |_| {
            if inner_token.borrow().is_none() {
                let sink = Rc::clone(&inner_counts);
                let sub = inner_notifier.subscribe(move |count| sink.borrow_mut().push(count));
                *inner_token.borrow_mut() = Some(sub);
            }
        });

        notifier.publish(1);
        assert!(late_counts.borrow().is_empty());

        notifier.publish(2);
        assert_eq!(*late_counts.borrow(), [2]);
    }

    #[test]
    fn earlier_handler_can_detach_a_later_one_mid_event() {
        let notifier = Notifier::new();
        let (seen, handler) = recorder();

        let victim_token: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let shared = Rc::clone(&victim_token);
        let _assassin = notifier.subscribe(move |_| {
            if let Some(taken) = shared.borrow_mut().take() {
                taken.unsubscribe();
            }
        });

        *victim_token.borrow_mut() = Some(notifier.subscribe(handler));

        notifier.publish(7);

        assert!(seen.borrow().is_empty());
    }
}
