use std::any::{Any, TypeId};

/// Marker trait for values that can be dispatched as messages.
///
/// Messages are immutable values; the engine treats them as opaque payloads
/// keyed by type, so any `'static` value type qualifies:
///
/// ```
/// use tannoy::Message;
///
/// struct EntitySpawned {
///     id: u64,
/// }
/// impl Message for EntitySpawned {}
/// # let _ = EntitySpawned { id: 1 };
/// ```
pub trait Message: Any {}

/// Runtime type tag identifying a message type.
///
/// Open-ended: every [`Message`] type has a kind, no registration step
/// required. All heterogeneous storage in the engine is keyed by kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MessageKind(TypeId);

impl MessageKind {
    pub fn of<M: Message>() -> Self {
        Self(TypeId::of::<M>())
    }
}
