use std::any::TypeId;
use std::cell::{Ref, RefCell, RefMut};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::rc::{Rc, Weak};

use log::{trace, warn};

use crate::messages::message::Message;
use crate::messages::message_buffer::MessageBuffer;
use crate::messages::message_container::MessageContainer;
use crate::messages::message_handler::MessageHandler;
use crate::system::{DynSystem, System, SystemHost};

/// Default bound on both of [`Dispatcher::update`]'s drain loops
pub const DEFAULT_CASCADE_LIMIT: usize = 100;

struct DispatcherShared {
    systems: Box<[Box<dyn DynSystem>]>,
    deferred_messages: RefCell<MessageBuffer>,
    error_hooks: RefCell<Vec<Box<dyn Fn(&str)>>>,
    cascade_limit: usize,
}

/// The orchestrator: owns the fixed sequence of systems and the deferred
/// message buffer, and implements the three delivery channels.
///
/// Cheap to clone; clones share the same engine. Listeners receive a
/// `&Dispatcher` and may re-enter [`Dispatcher::send_message`],
/// [`Dispatcher::send_message_deferred`], and [`Dispatcher::get_system`]
/// (for systems other than their own) freely. [`Dispatcher::update`] itself
/// must not be re-entered from a listener.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Rc<DispatcherShared>,
}

/// Back-reference handle held by each system. Weak: the dispatcher owns its
/// systems, so a strong back-edge would leak the cycle.
pub(crate) struct WeakDispatcher(Weak<DispatcherShared>);

impl WeakDispatcher {
    pub(crate) fn upgrade(&self) -> Option<Dispatcher> {
        self.0.upgrade().map(|shared| Dispatcher { shared })
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub(crate) fn downgrade(&self) -> WeakDispatcher {
        WeakDispatcher(Rc::downgrade(&self.shared))
    }

    /// Per-system queued dispatch: offers the message to every system in
    /// fixed order, to be picked up whenever each interested system next
    /// drains its backlog. Nothing is delivered synchronously.
    pub fn send_message<M: Message>(&self, message: M) {
        let message = MessageContainer::from_message(message);
        for system in self.shared.systems.iter() {
            system.queue_message(&message);
        }
    }

    /// Global deferred dispatch: delivery is postponed until the next
    /// [`Dispatcher::update`] call drains the dispatcher's own buffer.
    pub fn send_message_deferred<M: Message>(&self, message: M) {
        let message = MessageContainer::from_message(message);
        trace!("Deferring message {:?}", message.name());
        self.shared
            .deferred_messages
            .borrow_mut()
            .queue_message(message);
    }

    /// Runs one update pass.
    ///
    /// Queues `message` as deferred (behind any messages already pending),
    /// drains the deferred buffer, direct-dispatching each message to every
    /// system in order, and then repeatedly drains every system's queued
    /// backlog until no system reports progress. Both loops are bounded by
    /// the cascade limit; tripping a bound stops the pass early and notifies
    /// the error hooks rather than aborting.
    pub fn update<M: Message>(&self, message: M) {
        self.send_message_deferred(message);
        self.drain_deferred_messages();
        self.drain_queued_messages();
    }

    fn drain_deferred_messages(&self) {
        let mut iterations = 0;
        loop {
            // Pop under a scoped borrow: handlers may defer more messages
            // while this one is being delivered.
            let next = self.shared.deferred_messages.borrow_mut().pop_next();
            let Some(message) = next else {
                break;
            };
            self.dispatch_to_systems(&message);
            iterations += 1;
            if iterations >= self.shared.cascade_limit {
                if !self.shared.deferred_messages.borrow().is_empty() {
                    self.raise_error(&format!(
                        "{}+ deferred messages processed. Probably infinite recursion!",
                        self.shared.cascade_limit
                    ));
                }
                break;
            }
        }
    }

    fn drain_queued_messages(&self) {
        let mut passes = 0;
        while self.process_outstanding_queued_messages() {
            passes += 1;
            if passes >= self.shared.cascade_limit {
                if self
                    .shared
                    .systems
                    .iter()
                    .any(|system| system.has_queued_messages())
                {
                    self.raise_error(&format!(
                        "{}+ queued message passes processed. Probably infinite recursion!",
                        self.shared.cascade_limit
                    ));
                }
                break;
            }
        }
    }

    fn process_outstanding_queued_messages(&self) -> bool {
        let mut any_processed = false;
        for system in self.shared.systems.iter() {
            // non-short-circuiting: every system drains on every pass
            any_processed |= system.handle_queued_messages();
        }
        any_processed
    }

    /// Direct dispatch: for each system in fixed order, flush its queued
    /// backlog, then deliver `message`. Queued messages are never stale when
    /// a direct-dispatch message arrives.
    fn dispatch_to_systems(&self, message: &MessageContainer) {
        for system in self.shared.systems.iter() {
            system.handle_queued_messages();
            system.handle_message(message);
        }
    }

    /// Returns a borrow of the first system whose state type is `S`, or
    /// `None` if no such system was registered
    pub fn get_system<S: System>(&self) -> Option<SystemRef<'_, S>> {
        let target = TypeId::of::<S>();
        for system in self.shared.systems.iter() {
            if system.state_type_id() == target {
                let state = Ref::filter_map(system.state_ref(), |state| {
                    state.downcast_ref::<S>()
                })
                .ok()?;
                return Some(SystemRef { state });
            }
        }
        None
    }

    /// Mutable variant of [`Dispatcher::get_system`]
    pub fn get_system_mut<S: System>(&self) -> Option<SystemRefMut<'_, S>> {
        let target = TypeId::of::<S>();
        for system in self.shared.systems.iter() {
            if system.state_type_id() == target {
                let state = RefMut::filter_map(system.state_mut(), |state| {
                    state.downcast_mut::<S>()
                })
                .ok()?;
                return Some(SystemRefMut { state });
            }
        }
        None
    }

    /// Subscribes an error hook. Hooks fire only when one of `update`'s
    /// cascade guards trips; there is no other trigger.
    pub fn on_error(&self, hook: impl Fn(&str) + 'static) {
        self.shared.error_hooks.borrow_mut().push(Box::new(hook));
    }

    fn raise_error(&self, description: &str) {
        warn!("{}", description);
        for hook in self.shared.error_hooks.borrow().iter() {
            hook(description);
        }
    }

    pub fn system_count(&self) -> usize {
        self.shared.systems.len()
    }

    /// Short type names of the registered systems, in fixed order
    pub fn system_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.shared.systems.iter().map(|system| system.type_name())
    }

    pub fn cascade_limit(&self) -> usize {
        self.shared.cascade_limit
    }
}

impl MessageHandler for Dispatcher {
    /// Channel-3 direct dispatch of one message to every system in order
    fn handle_message(&mut self, message: &MessageContainer) {
        self.dispatch_to_systems(message);
    }
}

/// Shared borrow of a system's state, resolved by concrete type
pub struct SystemRef<'a, S: System> {
    state: Ref<'a, S>,
}

impl<S: System> Deref for SystemRef<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.state
    }
}

/// Exclusive borrow of a system's state, resolved by concrete type
pub struct SystemRefMut<'a, S: System> {
    state: RefMut<'a, S>,
}

impl<S: System> Deref for SystemRefMut<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.state
    }
}

impl<S: System> DerefMut for SystemRefMut<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

/// Accumulates systems in order and finalizes them into a [`Dispatcher`].
///
/// The system sequence is fixed at `build` time (no systems can be added or
/// removed afterward) and each system is initialized exactly once, in order.
pub struct DispatcherBuilder {
    systems: Vec<Box<dyn DynSystem>>,
    cascade_limit: usize,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            systems: Vec::new(),
            cascade_limit: DEFAULT_CASCADE_LIMIT,
        }
    }
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a system; fan-out order is append order
    pub fn add_system<S: System>(&mut self, state: S) -> &mut Self {
        self.systems.push(Box::new(SystemHost::new(state)));
        self
    }

    /// Overrides the default bound of 100 on both `update` drain loops
    pub fn cascade_limit(&mut self, limit: usize) -> &mut Self {
        self.cascade_limit = limit;
        self
    }

    pub fn build(&mut self) -> Dispatcher {
        let builder = mem::take(self);
        let dispatcher = Dispatcher {
            shared: Rc::new(DispatcherShared {
                systems: builder.systems.into_boxed_slice(),
                deferred_messages: RefCell::new(MessageBuffer::new()),
                error_hooks: RefCell::new(Vec::new()),
                cascade_limit: builder.cascade_limit,
            }),
        };
        for system in dispatcher.shared.systems.iter() {
            system.initialize(&dispatcher);
        }
        dispatcher
    }
}
