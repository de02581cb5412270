// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

// Shared by every bus so a handle never matches a subscription it did not create.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of one subscription, returned by the `subscribe*` calls.
///
/// Handles increase monotonically and are never reused within the process,
/// so a stale handle, or one issued by another bus, can only ever resolve to
/// "no such subscription".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Returns the raw numeric value of the handle.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Identity of the object on whose behalf a method subscription was made.
///
/// It is the owner's address: for an owner kept in an `Arc<O>`,
/// `OwnerId::of(&*arc)` is equal to `OwnerId::of(self)` taken inside `O`'s
/// methods or its `Drop` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(usize);

impl OwnerId {
    /// Returns the identity of `owner`.
    pub fn of<O: ?Sized>(owner: &O) -> Self {
        Self(owner as *const O as *const () as usize)
    }
}

/// Returns `true` if the callback actually ran.
type Callback = Box<dyn Fn(&dyn Any) -> bool + Send + Sync>;

struct Listener {
    handle: SubscriptionHandle,
    owner: Option<(OwnerId, Weak<dyn Any + Send + Sync>)>,
    active: AtomicBool,
    callback: Callback,
}

impl Listener {
    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn owner_id(&self) -> Option<OwnerId> {
        self.owner.as_ref().map(|(id, _)| *id)
    }

    /// Not removed, and its owner (if any) still alive.
    fn is_live(&self) -> bool {
        self.is_active()
            && self
                .owner
                .as_ref()
                .is_none_or(|(_, weak)| weak.strong_count() > 0)
    }
}

#[derive(Default)]
struct Listeners {
    by_event: HashMap<TypeId, Vec<Arc<Listener>>>,
}

impl Listeners {
    /// Takes out the listeners of `E` whose owner has been dropped.
    fn prune<E: 'static>(&mut self) -> Vec<Arc<Listener>> {
        match self.by_event.get_mut(&TypeId::of::<E>()) {
            Some(list) => take_where(list, |listener| !listener.is_live()),
            None => Vec::new(),
        }
    }
}

/// A synchronous, typed publish/subscribe dispatcher.
///
/// Callbacks are grouped by the exact event type they observe and are invoked
/// in registration order. Two subscription styles share one listener list:
///
/// * [`subscribe`](EventBus::subscribe): any callable, removed through its
///   [`SubscriptionHandle`];
/// * [`subscribe_method`](EventBus::subscribe_method): one method of an owner
///   held in an `Arc`, removable in bulk with
///   [`unsubscribe_owner`](EventBus::unsubscribe_owner).
///
/// `publish` snapshots the listener list before iterating and checks every
/// listener is still active at its turn. The internal lock is never held while
/// a callback runs, so callbacks may subscribe, unsubscribe or publish
/// re-entrantly.
pub struct EventBus {
    listeners: Mutex<Listeners>,
}

impl EventBus {
    /// Creates a bus with no subscriptions.
    pub fn new() -> Self {
        log::info!("EventBus initialized.");
        Self {
            listeners: Mutex::new(Listeners::default()),
        }
    }

    /// Registers `callback` for every published `E`.
    ///
    /// ## Returns
    /// The handle to pass to [`unsubscribe`](EventBus::unsubscribe).
    pub fn subscribe<E, F>(&self, callback: F) -> SubscriptionHandle
    where
        E: 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.insert::<E>(Box::new(move |event: &dyn Any| {
            event
                .downcast_ref::<E>()
                .map(|event| callback(event))
                .is_some()
        }))
    }

    /// Binds `method` of `owner` to `E`.
    ///
    /// The bus only keeps a weak reference to the owner: once the owner is
    /// dropped the subscription is never invoked again and is discarded on the
    /// next `publish` or `subscribe*` for that event type, even if the owner
    /// never unsubscribed. An owner has at most one method subscription per event
    /// type; subscribing again replaces the previous one.
    pub fn subscribe_method<E, O>(&self, owner: &Arc<O>, method: fn(&O, &E)) -> SubscriptionHandle
    where
        E: 'static,
        O: Send + Sync + 'static,
    {
        let owner_id = OwnerId::of(owner.as_ref());
        let weak = Arc::downgrade(owner);
        let liveness: Weak<dyn Any + Send + Sync> = weak.clone();

        let mut listeners = self.lock();
        let pruned = listeners.prune::<E>();
        let replaced = match listeners.by_event.get_mut(&TypeId::of::<E>()) {
            Some(list) => take_where(list, |listener| listener.owner_id() == Some(owner_id)),
            None => Vec::new(),
        };
        for listener in &replaced {
            log::debug!(
                "Replacing method subscription {:?} of {} for {}",
                listener.handle,
                type_name::<O>(),
                type_name::<E>()
            );
        }

        let handle = Self::insert_locked::<E>(
            &mut listeners,
            Some((owner_id, liveness)),
            Box::new(move |event: &dyn Any| {
                match (weak.upgrade(), event.downcast_ref::<E>()) {
                    (Some(owner), Some(event)) => {
                        method(&owner, event);
                        true
                    }
                    _ => false,
                }
            }),
        );
        drop(listeners);
        drop(pruned);
        drop(replaced);
        handle
    }

    /// Synchronously delivers `event` to every current subscriber of `E`, in
    /// registration order.
    ///
    /// A listener removed before its turn is skipped, and so is a method
    /// subscription whose owner has been dropped. Listeners added while the
    /// publish is in progress only see later publishes. A panicking callback
    /// unwinds through this call and the remaining subscribers are not invoked.
    ///
    /// ## Returns
    /// The number of callbacks invoked.
    pub fn publish<E: 'static>(&self, event: &E) -> usize {
        let (snapshot, pruned) = {
            let mut listeners = self.lock();
            let pruned = listeners.prune::<E>();
            let snapshot: Vec<Arc<Listener>> = listeners
                .by_event
                .get(&TypeId::of::<E>())
                .cloned()
                .unwrap_or_default();
            (snapshot, pruned)
        };
        if !pruned.is_empty() {
            log::debug!(
                "Discarded {} subscription(s) of dropped owners for {}.",
                pruned.len(),
                type_name::<E>()
            );
        }
        drop(pruned);
        if snapshot.is_empty() {
            return 0;
        }

        log::trace!(
            "Publishing {} to {} subscriber(s).",
            type_name::<E>(),
            snapshot.len()
        );

        let mut delivered = 0;
        for listener in &snapshot {
            if listener.is_active() && (listener.callback)(event) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Removes the subscription identified by `handle`, whatever its event
    /// type.
    ///
    /// ## Returns
    /// `false` if the handle was already removed or never issued by this bus.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let removed = {
            let mut listeners = self.lock();
            let removed = listeners
                .by_event
                .values_mut()
                .find_map(|list| take_where(list, |listener| listener.handle == handle).pop());
            removed
        };
        match removed {
            Some(_) => {
                log::trace!("Unsubscribed {handle:?}.");
                true
            }
            None => false,
        }
    }

    /// Removes every method subscription recorded for `owner`.
    ///
    /// ## Returns
    /// The number of subscriptions removed.
    pub fn unsubscribe_owner(&self, owner: OwnerId) -> usize {
        let removed: Vec<Arc<Listener>> = {
            let mut listeners = self.lock();
            let removed = listeners
                .by_event
                .values_mut()
                .flat_map(|list| take_where(list, |listener| listener.owner_id() == Some(owner)))
                .collect();
            removed
        };
        if !removed.is_empty() {
            log::debug!(
                "Removed {} subscription(s) of owner {owner:?}.",
                removed.len()
            );
        }
        removed.len()
    }

    /// Removes all subscriptions of all event types.
    pub fn clear(&self) {
        let removed: Vec<Arc<Listener>> = {
            let mut listeners = self.lock();
            let removed = listeners
                .by_event
                .drain()
                .flat_map(|(_, list)| list)
                .inspect(|listener| listener.deactivate())
                .collect();
            removed
        };
        if !removed.is_empty() {
            log::debug!("Cleared {} subscription(s).", removed.len());
        }
    }

    /// Returns the number of live subscriptions to `E`.
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.lock()
            .by_event
            .get(&TypeId::of::<E>())
            .map_or(0, |list| count_live(list))
    }

    /// Returns the total number of live subscriptions.
    pub fn len(&self) -> usize {
        self.lock()
            .by_event
            .values()
            .map(|list| count_live(list))
            .sum()
    }

    /// Returns `true` if there are no live subscriptions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert<E: 'static>(&self, callback: Callback) -> SubscriptionHandle {
        let mut listeners = self.lock();
        let pruned = listeners.prune::<E>();
        let handle = Self::insert_locked::<E>(&mut listeners, None, callback);
        drop(listeners);
        drop(pruned);
        handle
    }

    fn insert_locked<E: 'static>(
        listeners: &mut Listeners,
        owner: Option<(OwnerId, Weak<dyn Any + Send + Sync>)>,
        callback: Callback,
    ) -> SubscriptionHandle {
        let handle = SubscriptionHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));

        listeners
            .by_event
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Arc::new(Listener {
                handle,
                owner,
                active: AtomicBool::new(true),
                callback,
            }));
        log::trace!("Subscribed {handle:?} to {}.", type_name::<E>());
        handle
    }

    // Callbacks never run under the lock: poisoning leaves the lists coherent.
    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn count_live(list: &[Arc<Listener>]) -> usize {
    list.iter().filter(|listener| listener.is_live()).count()
}

/// Moves the listeners matching `predicate` out of `list` and deactivates them.
///
/// The returned listeners must be dropped after the bus lock is released: a
/// callback may own values whose destructor calls back into the bus.
fn take_where(
    list: &mut Vec<Arc<Listener>>,
    predicate: impl Fn(&Listener) -> bool,
) -> Vec<Arc<Listener>> {
    let mut taken = Vec::new();
    let mut index = 0;
    while index < list.len() {
        if predicate(&list[index]) {
            let listener = list.remove(index);
            listener.deactivate();
            taken.push(listener);
        } else {
            index += 1;
        }
    }
    taken
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Tick {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Other;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recorder(log: &Log, name: &'static str) -> impl Fn(&Tick) + Send + Sync + 'static {
        let log = log.clone();
        move |tick: &Tick| log.lock().unwrap().push(format!("{name}({})", tick.value))
    }

    struct Watcher {
        name: &'static str,
        log: Log,
    }

    impl Watcher {
        fn on_tick(&self, tick: &Tick) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, tick.value));
        }

        fn on_other(&self, _: &Other) {
            self.log.lock().unwrap().push(format!("{}:other", self.name));
        }
    }

    #[test]
    fn event_bus_creation() {
        let bus = EventBus::new();
        assert!(bus.is_empty());
        assert_eq!(bus.publish(&Tick { value: 1 }), 0);
    }

    #[test]
    fn publish_in_registration_order() {
        let bus = EventBus::new();
        let log: Log = Arc::default();
        bus.subscribe(recorder(&log, "A"));
        bus.subscribe(recorder(&log, "B"));
        bus.subscribe(recorder(&log, "C"));

        assert_eq!(bus.publish(&Tick { value: 1 }), 3);
        assert_eq!(*log.lock().unwrap(), vec!["A(1)", "B(1)", "C(1)"]);
    }

    #[test]
    fn publish_only_reaches_exact_type() {
        let bus = EventBus::new();
        let log: Log = Arc::default();
        bus.subscribe(recorder(&log, "A"));

        assert_eq!(bus.publish(&Other), 0);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(bus.subscriber_count::<Tick>(), 1);
        assert_eq!(bus.subscriber_count::<Other>(), 0);
    }

    #[test]
    fn handles_are_unique_and_increasing() {
        let bus = EventBus::new();
        let first = bus.subscribe(|_: &Tick| {});
        let second = bus.subscribe(|_: &Other| {});
        bus.unsubscribe(first);
        let third = bus.subscribe(|_: &Tick| {});

        assert!(first < second && second < third);
    }

    #[test]
    fn handle_from_another_bus_never_matches() {
        let first_bus = EventBus::new();
        let second_bus = EventBus::new();
        let hits = Arc::new(AtomicU64::new(0));

        let stale = first_bus.subscribe(|_: &Tick| {});
        assert!(first_bus.unsubscribe(stale));
        let hits_in_cb = hits.clone();
        let live = second_bus.subscribe(move |_: &Tick| {
            hits_in_cb.fetch_add(1, Ordering::Relaxed);
        });

        assert_ne!(stale, live);
        assert!(!second_bus.unsubscribe(stale));
        assert_eq!(second_bus.len(), 1);
        assert_eq!(second_bus.publish(&Tick { value: 1 }), 1);
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unsubscribe_removes_exactly_one() {
        let bus = EventBus::new();
        let log: Log = Arc::default();
        let a = bus.subscribe(recorder(&log, "A"));
        bus.subscribe(recorder(&log, "B"));

        assert!(bus.unsubscribe(a));
        bus.publish(&Tick { value: 2 });
        assert_eq!(*log.lock().unwrap(), vec!["B(2)"]);
    }

    #[test]
    fn unsubscribe_stale_or_unknown_handle_is_noop() {
        let bus = EventBus::new();
        let handle = bus.subscribe(|_: &Tick| {});

        assert!(bus.unsubscribe(handle));
        assert!(!bus.unsubscribe(handle));
        assert!(!bus.unsubscribe(SubscriptionHandle(999)));
        assert!(bus.is_empty());
    }

    #[test]
    fn unsubscribe_owner_spans_event_types() {
        let bus = EventBus::new();
        let log: Log = Arc::default();
        let first = Arc::new(Watcher {
            name: "first",
            log: log.clone(),
        });
        let second = Arc::new(Watcher {
            name: "second",
            log: log.clone(),
        });
        bus.subscribe_method(&first, Watcher::on_tick);
        bus.subscribe_method(&first, Watcher::on_other);
        bus.subscribe_method(&second, Watcher::on_tick);

        assert_eq!(bus.unsubscribe_owner(OwnerId::of(first.as_ref())), 2);
        bus.publish(&Tick { value: 3 });
        bus.publish(&Other);
        assert_eq!(*log.lock().unwrap(), vec!["second:3"]);
    }

    #[test]
    fn method_resubscription_replaces() {
        let bus = EventBus::new();
        let log: Log = Arc::default();
        let watcher = Arc::new(Watcher {
            name: "w",
            log: log.clone(),
        });
        let old = bus.subscribe_method(&watcher, Watcher::on_tick);
        let new = bus.subscribe_method(&watcher, Watcher::on_tick);

        assert_ne!(old, new);
        assert_eq!(bus.subscriber_count::<Tick>(), 1);
        assert!(!bus.unsubscribe(old));
        bus.publish(&Tick { value: 4 });
        assert_eq!(*log.lock().unwrap(), vec!["w:4"]);
    }

    #[test]
    fn dropped_owner_is_never_invoked() {
        let bus = EventBus::new();
        let log: Log = Arc::default();
        let watcher = Arc::new(Watcher {
            name: "gone",
            log: log.clone(),
        });
        bus.subscribe_method(&watcher, Watcher::on_tick);
        drop(watcher);

        assert_eq!(bus.subscriber_count::<Tick>(), 0);
        assert_eq!(bus.publish(&Tick { value: 5 }), 0);
        assert!(log.lock().unwrap().is_empty());
        assert!(bus.is_empty());
    }

    #[test]
    fn dropped_owners_do_not_accumulate() {
        let bus = EventBus::new();
        let log: Log = Arc::default();
        for _ in 0..1000 {
            let watcher = Arc::new(Watcher {
                name: "short-lived",
                log: log.clone(),
            });
            bus.subscribe_method(&watcher, Watcher::on_tick);
        }
        let survivor = Arc::new(Watcher {
            name: "survivor",
            log: log.clone(),
        });
        bus.subscribe_method(&survivor, Watcher::on_tick);

        assert_eq!(bus.len(), 1);
        assert_eq!(bus.publish(&Tick { value: 10 }), 1);
        assert_eq!(bus.lock().by_event[&TypeId::of::<Tick>()].len(), 1);
        assert_eq!(*log.lock().unwrap(), vec!["survivor:10"]);
    }

    #[test]
    fn removal_during_publish_skips_later_listener() {
        let bus = Arc::new(EventBus::new());
        let log: Log = Arc::default();
        let victim: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::default();

        let bus_in_cb = bus.clone();
        let victim_in_cb = victim.clone();
        bus.subscribe(move |_: &Tick| {
            if let Some(handle) = victim_in_cb.lock().unwrap().take() {
                bus_in_cb.unsubscribe(handle);
            }
        });
        let handle = bus.subscribe(recorder(&log, "B"));
        *victim.lock().unwrap() = Some(handle);

        assert_eq!(bus.publish(&Tick { value: 6 }), 1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn subscription_during_publish_waits_for_next_publish() {
        let bus = Arc::new(EventBus::new());
        let log: Log = Arc::default();

        let bus_in_cb = bus.clone();
        let log_in_cb = log.clone();
        bus.subscribe(move |_: &Tick| {
            bus_in_cb.subscribe(recorder(&log_in_cb, "late"));
        });

        assert_eq!(bus.publish(&Tick { value: 1 }), 1);
        assert!(log.lock().unwrap().is_empty());
        bus.publish(&Tick { value: 2 });
        assert_eq!(*log.lock().unwrap(), vec!["late(2)"]);
    }

    #[test]
    fn clear_removes_everything() {
        let bus = EventBus::new();
        let log: Log = Arc::default();
        bus.subscribe(recorder(&log, "A"));
        bus.subscribe(|_: &Other| {});

        bus.clear();
        bus.clear();
        assert!(bus.is_empty());
        assert_eq!(bus.publish(&Tick { value: 7 }), 0);
    }

    #[test]
    fn panicking_subscriber_aborts_delivery_but_bus_survives() {
        let bus = Arc::new(EventBus::new());
        let log: Log = Arc::default();
        bus.subscribe(|_: &Tick| panic!("subscriber failure"));
        bus.subscribe(recorder(&log, "B"));

        let bus_clone = bus.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            bus_clone.publish(&Tick { value: 8 });
        }));
        assert!(result.is_err());
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(bus.subscriber_count::<Tick>(), 2);
    }

    #[test]
    fn publish_from_thread() {
        let bus = Arc::new(EventBus::new());
        let log: Log = Arc::default();
        bus.subscribe(recorder(&log, "T"));

        let bus_clone = bus.clone();
        std::thread::spawn(move || {
            bus_clone.publish(&Tick { value: 9 });
        })
        .join()
        .expect("Thread join failed");

        assert_eq!(*log.lock().unwrap(), vec!["T(9)"]);
    }
}
