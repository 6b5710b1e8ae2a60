use std::any::{type_name, Any};
use std::fmt;
use std::rc::Rc;

use crate::messages::error::MessageContainerError;
use crate::messages::message::{Message, MessageKind};
use crate::messages::message_queue::{ErasedMessageQueue, TypedMessageQueue};

/// A type-erased handle to one immutable message.
///
/// One container is created at the send site and then shared across every
/// fan-out target; cloning shares the payload rather than copying it. The
/// container also carries the monomorphized constructor for its type's
/// [`TypedMessageQueue`], so a buffer can lazily create typed storage for
/// kinds it has never seen.
#[derive(Clone)]
pub struct MessageContainer {
    kind: MessageKind,
    name: &'static str,
    message: Rc<dyn Any>,
    new_queue: fn() -> Box<dyn ErasedMessageQueue>,
}

impl MessageContainer {
    pub fn from_message<M: Message>(message: M) -> Self {
        Self::from_shared(Rc::new(message))
    }

    pub(crate) fn from_shared<M: Message>(message: Rc<M>) -> Self {
        Self {
            kind: MessageKind::of::<M>(),
            name: short_type_name::<M>(),
            message,
            new_queue: new_typed_queue::<M>,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Short type name of the contained message, for diagnostics
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.message.downcast_ref::<M>()
    }

    /// Shares the payload as its concrete type (fallible version)
    pub(crate) fn try_clone_shared<M: Message>(&self) -> Result<Rc<M>, MessageContainerError> {
        self.message
            .clone()
            .downcast::<M>()
            .map_err(|_| MessageContainerError::KindMismatch { name: self.name })
    }

    /// Creates an empty typed queue for this message's kind
    pub(crate) fn make_queue(&self) -> Box<dyn ErasedMessageQueue> {
        (self.new_queue)()
    }
}

impl fmt::Debug for MessageContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageContainer")
            .field("name", &self.name)
            .finish()
    }
}

fn new_typed_queue<M: Message>() -> Box<dyn ErasedMessageQueue> {
    Box::new(TypedMessageQueue::<M>::new())
}

/// Trims the module path off a type name: `demo::messages::Tick` -> `Tick`
pub(crate) fn short_type_name<T>() -> &'static str {
    let name = type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
