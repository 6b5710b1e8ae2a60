use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};

use log::trace;

use crate::dispatcher::{Dispatcher, WeakDispatcher};
use crate::messages::listeners::MessageListeners;
use crate::messages::message_buffer::MessageBuffer;
use crate::messages::message_container::{short_type_name, MessageContainer};

/// A unit of behavior reacting to messages through registered listeners.
///
/// `register` runs once, when the system is handed to a dispatcher; the
/// listener set (and with it the catch-all capability) is fixed from then
/// on. Listeners receive the system state, the owning dispatcher, and the
/// message, so they can post follow-up messages re-entrantly.
pub trait System: Any + Sized {
    fn register(listeners: &mut MessageListeners<Self>);
}

/// The system-facing contract the dispatcher drives.
///
/// Object-safe so the dispatcher can hold systems of different concrete
/// types in one fixed-order sequence; implemented by [`SystemHost`].
pub trait DynSystem {
    /// Binds the back-reference to the owning dispatcher. Called exactly once
    /// during dispatcher construction; must not be called again.
    fn initialize(&self, dispatcher: &Dispatcher);

    /// Queues a message into this system's private buffer. No-op if neither
    /// a typed listener for the message's kind nor a catch-all exists, so
    /// uninteresting types never accumulate.
    fn queue_message(&self, message: &MessageContainer);

    /// Drains the private buffer until truly empty, including messages
    /// queued transitively while the drain runs, delivering each through
    /// [`DynSystem::handle_message`]. Reports whether at least one message
    /// was processed.
    fn handle_queued_messages(&self) -> bool;

    /// Direct dispatch: invokes the typed listeners for the message's kind,
    /// then the catch-all (if any) regardless of whether a typed listener
    /// matched.
    fn handle_message(&self, message: &MessageContainer);

    /// Whether the private buffer currently holds undelivered messages
    fn has_queued_messages(&self) -> bool;

    fn state_type_id(&self) -> TypeId;
    fn state_ref(&self) -> Ref<'_, dyn Any>;
    fn state_mut(&self) -> RefMut<'_, dyn Any>;
    fn type_name(&self) -> &'static str;
}

/// Hosts one user system: its state, its listener set, its lazily created
/// private message buffer, and the one-shot back-reference to the owning
/// dispatcher.
///
/// State, buffer, and back-reference sit behind separate cells, and no
/// borrow spans a listener invocation, so listeners are free to call back
/// into the dispatcher (and thereby into this system's own buffer) while
/// they run.
pub struct SystemHost<S: System> {
    state: RefCell<S>,
    listeners: MessageListeners<S>,
    queued_messages: RefCell<Option<MessageBuffer>>,
    dispatcher: RefCell<Option<WeakDispatcher>>,
}

impl<S: System> SystemHost<S> {
    pub fn new(state: S) -> Self {
        let mut listeners = MessageListeners::new();
        S::register(&mut listeners);
        Self {
            state: RefCell::new(state),
            listeners,
            queued_messages: RefCell::new(None),
            dispatcher: RefCell::new(None),
        }
    }

    fn dispatcher(&self) -> Dispatcher {
        self.dispatcher
            .borrow()
            .as_ref()
            .and_then(WeakDispatcher::upgrade)
            .expect("system has not been initialized by a dispatcher")
    }
}

impl<S: System> DynSystem for SystemHost<S> {
    fn initialize(&self, dispatcher: &Dispatcher) {
        let mut slot = self.dispatcher.borrow_mut();
        debug_assert!(
            slot.is_none(),
            "initialize must be called exactly once per system"
        );
        if slot.is_none() {
            *slot = Some(dispatcher.downgrade());
        }
    }

    fn queue_message(&self, message: &MessageContainer) {
        if !self.listeners.wants(message.kind()) {
            trace!(
                "{}: no listener for {:?}, message dropped",
                self.type_name(),
                message.name()
            );
            return;
        }
        self.queued_messages
            .borrow_mut()
            .get_or_insert_with(MessageBuffer::new)
            .queue_message(message.clone());
    }

    fn handle_queued_messages(&self) -> bool {
        let mut any_processed = false;
        loop {
            // Pop under a scoped borrow: the listener handling this message
            // may queue more messages to this same system.
            let next = match self.queued_messages.borrow_mut().as_mut() {
                Some(buffer) => buffer.pop_next(),
                None => None,
            };
            let Some(message) = next else {
                break;
            };
            self.handle_message(&message);
            any_processed = true;
        }
        any_processed
    }

    fn handle_message(&self, message: &MessageContainer) {
        let dispatcher = self.dispatcher();
        let mut state = self.state.borrow_mut();
        self.listeners.invoke(&mut state, &dispatcher, message);
        self.listeners
            .invoke_catch_all(&mut state, &dispatcher, message);
    }

    fn has_queued_messages(&self) -> bool {
        match self.queued_messages.borrow().as_ref() {
            Some(buffer) => !buffer.is_empty(),
            None => false,
        }
    }

    fn state_type_id(&self) -> TypeId {
        TypeId::of::<S>()
    }

    fn state_ref(&self) -> Ref<'_, dyn Any> {
        Ref::map(self.state.borrow(), |state| state as &dyn Any)
    }

    fn state_mut(&self) -> RefMut<'_, dyn Any> {
        RefMut::map(self.state.borrow_mut(), |state| state as &mut dyn Any)
    }

    fn type_name(&self) -> &'static str {
        short_type_name::<S>()
    }
}
