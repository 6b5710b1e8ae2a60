use thiserror::Error;

/// Errors that can occur popping from a typed message queue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageQueueError {
    /// Queue is empty
    #[error("Cannot pop from an empty message queue. Callers must go through the owning buffer's bookkeeping, which never pops an empty queue")]
    EmptyQueue,
}

/// Errors that can occur during message buffer bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageBufferError {
    /// Order list references a kind with no backing queue
    #[error("Upcoming message order references a kind with no backing queue. This indicates an internal bookkeeping error")]
    MissingQueue,
}

/// Errors that can occur handling a type-erased message payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageContainerError {
    /// Payload type does not match the requested message type
    #[error("Message {name:?} does not match the requested message type. The kind lookup that routed it here is inconsistent")]
    KindMismatch { name: &'static str },
}
