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

//! A type-indexed service locator for long-lived engine subsystems.
//!
//! The [`SubsystemRegistry`] owns exactly one instance per concrete type
//! (window manager, renderer, UI overlay, event bus...) and lets any component
//! that holds the registry look another one up by type.
//!
//! # Design
//!
//! Lookup goes through a `TypeId`-keyed map, while the **registration order**
//! is recorded separately in a list. Only that list drives teardown:
//! subsystems are destroyed in strict reverse registration order, so a
//! subsystem that depends on an earlier one is always dropped first.
//!
//! The registry is an explicit object passed down the call chain rather than
//! hidden process-wide state, which keeps wiring substitutable in tests.
//!
//! Misuse (duplicate registration, lookup of a missing type, use outside the
//! [`SubsystemStatus::Running`] state) is a startup-ordering bug in the host
//! application and panics immediately.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle state of a [`SubsystemRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubsystemStatus {
    /// Constructed, not yet initialized.
    #[default]
    Idle,
    /// Accepting registrations and lookups.
    Running,
    /// Torn down. Terminal.
    Disposed,
}

struct Entry {
    name: &'static str,
    instance: Box<dyn Any>,
}

/// A heterogeneous container holding one owned instance per subsystem type.
///
/// # Example
///
/// ```rust
/// use hearth_core::subsystem::SubsystemRegistry;
///
/// struct WindowManager { width: u32 }
///
/// let mut registry = SubsystemRegistry::new();
/// registry.initialize();
/// registry.register(WindowManager { width: 1280 });
///
/// assert_eq!(registry.get::<WindowManager>().width, 1280);
/// registry.teardown();
/// ```
#[derive(Default)]
pub struct SubsystemRegistry {
    status: SubsystemStatus,
    subsystems: HashMap<TypeId, Entry>,
    order: Vec<TypeId>,
}

impl SubsystemRegistry {
    /// Creates an empty registry in the [`SubsystemStatus::Idle`] state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: SubsystemStatus::Idle,
            subsystems: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Moves the registry into the [`SubsystemStatus::Running`] state.
    ///
    /// # Panics
    /// Panics if the registry was already torn down.
    pub fn initialize(&mut self) {
        match self.status {
            SubsystemStatus::Idle => {
                log::info!("Subsystem registry initialized.");
                self.status = SubsystemStatus::Running;
            }
            SubsystemStatus::Running => {}
            SubsystemStatus::Disposed => {
                panic!("Subsystem registry cannot be re-initialized after teardown")
            }
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SubsystemStatus {
        self.status
    }

    /// Returns `true` while the registry accepts registrations and lookups.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == SubsystemStatus::Running
    }

    /// Stores `instance` as the single subsystem of type `T`.
    ///
    /// # Panics
    /// Panics if the registry is not running or if `T` is already registered.
    pub fn register<T: 'static>(&mut self, instance: T) -> &mut T {
        self.expect_running::<T>("register");
        self.expect_absent::<T>();
        self.insert(instance)
    }

    /// Builds and registers a subsystem of type `T`.
    ///
    /// The constructor receives the registry, so it can look up the subsystems
    /// registered before it (e.g. to subscribe to the event bus).
    ///
    /// # Panics
    /// Same conditions as [`register`](Self::register).
    pub fn register_with<T: 'static>(&mut self, build: impl FnOnce(&mut Self) -> T) -> &mut T {
        self.expect_running::<T>("register");
        self.expect_absent::<T>();
        let instance = build(self);
        self.expect_absent::<T>();
        self.insert(instance)
    }

    /// Fallible variant of [`register_with`](Self::register_with).
    ///
    /// Nothing is registered when the constructor fails; its error is returned
    /// unchanged.
    pub fn try_register_with<T: 'static, E>(
        &mut self,
        build: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<&mut T, E> {
        self.expect_running::<T>("register");
        self.expect_absent::<T>();
        let instance = build(self)?;
        self.expect_absent::<T>();
        Ok(self.insert(instance))
    }

    /// Returns the registered subsystem of type `T`.
    ///
    /// # Panics
    /// Panics if the registry is not running or `T` is not registered.
    #[must_use]
    pub fn get<T: 'static>(&self) -> &T {
        self.expect_running::<T>("get");
        match self.try_get::<T>() {
            Some(instance) => instance,
            None => panic!("Subsystem not found: {}", type_name::<T>()),
        }
    }

    /// Mutable variant of [`get`](Self::get).
    #[must_use]
    pub fn get_mut<T: 'static>(&mut self) -> &mut T {
        self.expect_running::<T>("get");
        match self.try_get_mut::<T>() {
            Some(instance) => instance,
            None => panic!("Subsystem not found: {}", type_name::<T>()),
        }
    }

    /// Returns the subsystem of type `T`, or `None` if it is missing or the
    /// registry is not running.
    #[must_use]
    pub fn try_get<T: 'static>(&self) -> Option<&T> {
        if !self.is_running() {
            return None;
        }
        self.subsystems
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.instance.downcast_ref::<T>())
    }

    /// Mutable variant of [`try_get`](Self::try_get).
    #[must_use]
    pub fn try_get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        if !self.is_running() {
            return None;
        }
        self.subsystems
            .get_mut(&TypeId::of::<T>())
            .and_then(|entry| entry.instance.downcast_mut::<T>())
    }

    /// Destroys the subsystem of type `T` immediately.
    ///
    /// Returns `false` (and does nothing) if `T` is not registered or the
    /// registry is not running.
    pub fn remove<T: 'static>(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let id = TypeId::of::<T>();
        match self.subsystems.remove(&id) {
            Some(entry) => {
                self.order.retain(|registered| *registered != id);
                log::debug!("Removing subsystem {}", entry.name);
                drop(entry);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the registry is running and `T` is registered.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.is_running() && self.subsystems.contains_key(&TypeId::of::<T>())
    }

    /// Returns `true` if every type of the tuple `S` is registered.
    ///
    /// ```rust
    /// # use hearth_core::subsystem::SubsystemRegistry;
    /// # struct A; struct B;
    /// let mut registry = SubsystemRegistry::new();
    /// registry.initialize();
    /// registry.register(A);
    /// assert!(registry.contains_all::<(A,)>());
    /// assert!(!registry.contains_all::<(A, B)>());
    /// ```
    #[must_use]
    pub fn contains_all<S: SubsystemSet>(&self) -> bool {
        self.is_running() && S::all_registered(self)
    }

    /// Destroys every subsystem in reverse registration order and moves the
    /// registry into the terminal [`SubsystemStatus::Disposed`] state.
    ///
    /// Calling it again is a no-op.
    pub fn teardown(&mut self) {
        if self.status == SubsystemStatus::Disposed {
            return;
        }

        log::info!("Tearing down {} subsystem(s)...", self.order.len());
        while let Some(id) = self.order.pop() {
            if let Some(entry) = self.subsystems.remove(&id) {
                log::debug!("Disposing subsystem {}", entry.name);
                drop(entry);
            }
        }
        debug_assert!(
            self.subsystems.is_empty(),
            "registration order and storage went out of sync"
        );
        self.subsystems.clear();
        self.status = SubsystemStatus::Disposed;
        log::info!("Subsystem registry disposed.");
    }

    /// Returns the number of registered subsystems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subsystems.len()
    }

    /// Returns `true` if no subsystems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subsystems.is_empty()
    }

    /// Type names of the registered subsystems, oldest first.
    #[must_use]
    pub fn registration_order(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .filter_map(|id| self.subsystems.get(id).map(|entry| entry.name))
            .collect()
    }

    fn insert<T: 'static>(&mut self, instance: T) -> &mut T {
        let id = TypeId::of::<T>();
        let name = type_name::<T>();
        log::debug!("Registering subsystem {name}");

        self.order.push(id);
        self.subsystems.insert(
            id,
            Entry {
                name,
                instance: Box::new(instance),
            },
        );
        self.get_mut::<T>()
    }

    fn expect_running<T: 'static>(&self, operation: &str) {
        assert!(
            self.is_running(),
            "Subsystem registry must be running to {operation} {} (status: {:?})",
            type_name::<T>(),
            self.status
        );
    }

    fn expect_absent<T: 'static>(&self) {
        assert!(
            !self.subsystems.contains_key(&TypeId::of::<T>()),
            "Subsystem already exists: {}",
            type_name::<T>()
        );
    }
}

impl Drop for SubsystemRegistry {
    fn drop(&mut self) {
        if self.status == SubsystemStatus::Running {
            self.teardown();
        }
    }
}

impl fmt::Debug for SubsystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubsystemRegistry")
            .field("status", &self.status)
            .field("subsystems", &self.registration_order())
            .finish()
    }
}

/// A tuple of subsystem types that can be checked in one call with
/// [`SubsystemRegistry::contains_all`].
pub trait SubsystemSet {
    /// Returns `true` if every member type is registered in `registry`.
    fn all_registered(registry: &SubsystemRegistry) -> bool;
}

macro_rules! impl_subsystem_set {
    ($($member:ident),+) => {
        impl<$($member: 'static),+> SubsystemSet for ($($member,)+) {
            fn all_registered(registry: &SubsystemRegistry) -> bool {
                $(registry.contains::<$member>())&&+
            }
        }
    };
}

impl_subsystem_set!(A);
impl_subsystem_set!(A, B);
impl_subsystem_set!(A, B, C);
impl_subsystem_set!(A, B, C, D);
impl_subsystem_set!(A, B, C, D, E);
impl_subsystem_set!(A, B, C, D, E, F);
impl_subsystem_set!(A, B, C, D, E, F, G);
impl_subsystem_set!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct FakeDevice {
        name: String,
    }

    struct FakeRenderer {}

    /// Records its label into a shared log when dropped.
    struct DropRecorder<const N: usize> {
        log: Arc<Mutex<Vec<usize>>>,
    }

    impl<const N: usize> Drop for DropRecorder<N> {
        fn drop(&mut self) {
            self.log.lock().unwrap().push(N);
        }
    }

    fn running() -> SubsystemRegistry {
        let mut registry = SubsystemRegistry::new();
        registry.initialize();
        registry
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = running();
        registry.register(FakeDevice {
            name: "GPU-0".to_string(),
        });

        assert_eq!(registry.get::<FakeDevice>().name, "GPU-0");
    }

    #[test]
    fn test_get_mut_modifies_in_place() {
        let mut registry = running();
        registry.register(FakeDevice {
            name: "old".to_string(),
        });
        registry.get_mut::<FakeDevice>().name = "new".to_string();

        assert_eq!(registry.get::<FakeDevice>().name, "new");
    }

    #[test]
    fn test_try_get_missing_returns_none() {
        let registry = running();
        assert!(registry.try_get::<FakeDevice>().is_none());
    }

    #[test]
    #[should_panic(expected = "Subsystem not found")]
    fn test_get_missing_panics() {
        let registry = running();
        let _ = registry.get::<FakeDevice>();
    }

    #[test]
    #[should_panic(expected = "Subsystem already exists")]
    fn test_duplicate_registration_panics() {
        let mut registry = running();
        registry.register(FakeRenderer {});
        registry.register(FakeRenderer {});
    }

    #[test]
    #[should_panic(expected = "must be running")]
    fn test_register_before_initialize_panics() {
        let mut registry = SubsystemRegistry::new();
        registry.register(FakeRenderer {});
    }

    #[test]
    #[should_panic(expected = "must be running")]
    fn test_get_after_teardown_panics() {
        let mut registry = running();
        registry.register(FakeRenderer {});
        registry.teardown();
        let _ = registry.get::<FakeRenderer>();
    }

    #[test]
    #[should_panic(expected = "re-initialized")]
    fn test_initialize_after_teardown_panics() {
        let mut registry = running();
        registry.teardown();
        registry.initialize();
    }

    #[test]
    fn test_status_transitions() {
        let mut registry = SubsystemRegistry::new();
        assert_eq!(registry.status(), SubsystemStatus::Idle);
        registry.initialize();
        assert_eq!(registry.status(), SubsystemStatus::Running);
        registry.teardown();
        assert_eq!(registry.status(), SubsystemStatus::Disposed);
        assert!(!registry.is_running());
        assert!(!registry.contains::<FakeRenderer>());
    }

    #[test]
    fn test_multiple_subsystems() {
        let mut registry = running();
        registry.register(FakeDevice {
            name: "GPU".to_string(),
        });
        registry.register(FakeRenderer {});

        assert_eq!(registry.len(), 2);
        assert!(registry.contains::<FakeDevice>());
        assert!(registry.contains::<FakeRenderer>());
        assert!(registry.contains_all::<(FakeDevice, FakeRenderer)>());
        assert!(!registry.contains_all::<(FakeDevice, FakeRenderer, String)>());
    }

    #[test]
    fn test_remove_then_get_is_missing() {
        let mut registry = running();
        registry.register(FakeRenderer {});

        assert!(registry.remove::<FakeRenderer>());
        assert!(!registry.contains::<FakeRenderer>());
        assert!(registry.try_get::<FakeRenderer>().is_none());
        assert!(registry.registration_order().is_empty());
        assert!(!registry.remove::<FakeRenderer>());
    }

    #[test]
    #[should_panic(expected = "Subsystem not found")]
    fn test_get_after_remove_panics() {
        let mut registry = running();
        registry.register(FakeRenderer {});
        registry.remove::<FakeRenderer>();

        let _ = registry.get::<FakeRenderer>();
    }

    #[test]
    fn test_remove_drops_immediately() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = running();
        registry.register(DropRecorder::<7> { log: log.clone() });

        registry.remove::<DropRecorder<7>>();
        assert_eq!(*log.lock().unwrap(), vec![7]);
    }

    #[test]
    fn test_teardown_reverse_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = running();
        registry.register(DropRecorder::<1> { log: log.clone() });
        registry.register(DropRecorder::<2> { log: log.clone() });
        registry.register(DropRecorder::<3> { log: log.clone() });
        registry.register(DropRecorder::<4> { log: log.clone() });
        registry.remove::<DropRecorder<2>>();

        registry.teardown();
        assert_eq!(*log.lock().unwrap(), vec![2, 4, 3, 1]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_teardown_twice_is_noop() {
        let mut registry = running();
        registry.register(FakeRenderer {});
        registry.teardown();
        registry.teardown();
        assert!(registry.is_empty());
        assert_eq!(registry.status(), SubsystemStatus::Disposed);
    }

    #[test]
    fn test_drop_tears_down_in_reverse_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let mut registry = running();
            registry.register(DropRecorder::<1> { log: log.clone() });
            registry.register(DropRecorder::<2> { log: log.clone() });
        }
        assert_eq!(*log.lock().unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_register_with_sees_earlier_subsystems() {
        let mut registry = running();
        registry.register(FakeDevice {
            name: "GPU-1".to_string(),
        });
        let label = registry
            .register_with(|registry| registry.get::<FakeDevice>().name.clone())
            .clone();

        assert_eq!(label, "GPU-1");
        assert_eq!(
            registry.registration_order(),
            vec![type_name::<FakeDevice>(), type_name::<String>()]
        );
    }

    #[test]
    fn test_try_register_with_error_registers_nothing() {
        let mut registry = running();
        let result = registry.try_register_with::<FakeRenderer, _>(|_| Err("no adapter"));

        assert_eq!(result.err(), Some("no adapter"));
        assert!(registry.is_empty());
    }
}
