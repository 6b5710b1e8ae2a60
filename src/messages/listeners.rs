use crate::dispatcher::Dispatcher;
use crate::messages::message::{Message, MessageKind};
use crate::messages::message_container::MessageContainer;

type ErasedListener<S> = Box<dyn Fn(&mut S, &Dispatcher, &MessageContainer)>;

struct ListenerEntry<S> {
    kind: MessageKind,
    invoke: ErasedListener<S>,
}

/// Per-system listener registry.
///
/// Typed callbacks are kept in one flat list so registration order is
/// preserved, with an optional catch-all slot on the side. The system state
/// `S` is threaded through each invocation rather than captured, which keeps
/// the registry and the state disjointly borrowable while listeners run.
pub struct MessageListeners<S> {
    listeners: Vec<ListenerEntry<S>>,
    catch_all: Option<ErasedListener<S>>,
}

impl<S: 'static> MessageListeners<S> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            catch_all: None,
        }
    }

    /// Registers a typed callback for messages of type `M`. Multiple
    /// callbacks for the same type are allowed and all fire, in registration
    /// order.
    pub fn add<M: Message>(&mut self, listener: impl Fn(&mut S, &Dispatcher, &M) + 'static) {
        self.listeners.push(ListenerEntry {
            kind: MessageKind::of::<M>(),
            invoke: Box::new(move |state, dispatcher, message| {
                if let Some(payload) = message.downcast_ref::<M>() {
                    listener(state, dispatcher, payload);
                }
            }),
        });
    }

    /// Installs the catch-all callback, which receives every delivered
    /// message regardless of typed registration
    pub fn set_catch_all(
        &mut self,
        listener: impl Fn(&mut S, &Dispatcher, &MessageContainer) + 'static,
    ) {
        self.catch_all = Some(Box::new(listener));
    }

    /// Calls every typed callback whose kind matches, in registration order
    pub fn invoke(&self, state: &mut S, dispatcher: &Dispatcher, message: &MessageContainer) {
        for entry in &self.listeners {
            if entry.kind == message.kind() {
                (entry.invoke)(state, dispatcher, message);
            }
        }
    }

    /// Calls the catch-all if one is installed
    pub fn invoke_catch_all(
        &self,
        state: &mut S,
        dispatcher: &Dispatcher,
        message: &MessageContainer,
    ) {
        if let Some(catch_all) = &self.catch_all {
            catch_all(state, dispatcher, message);
        }
    }

    pub fn has_listener_for(&self, kind: MessageKind) -> bool {
        self.listeners.iter().any(|entry| entry.kind == kind)
    }

    pub fn has_catch_all(&self) -> bool {
        self.catch_all.is_some()
    }

    /// Whether queuing a message of `kind` would ever reach a callback
    pub fn wants(&self, kind: MessageKind) -> bool {
        self.has_catch_all() || self.has_listener_for(kind)
    }
}

impl<S: 'static> Default for MessageListeners<S> {
    fn default() -> Self {
        Self::new()
    }
}
