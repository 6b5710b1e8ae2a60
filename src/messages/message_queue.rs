use std::collections::VecDeque;
use std::rc::Rc;

use crate::messages::error::MessageQueueError;
use crate::messages::message::Message;
use crate::messages::message_container::MessageContainer;

/// Homogeneous FIFO store for messages of one type.
pub struct TypedMessageQueue<M: Message> {
    messages: VecDeque<Rc<M>>,
}

impl<M: Message> TypedMessageQueue<M> {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
        }
    }

    /// Appends a message at the tail
    pub fn enqueue(&mut self, message: Rc<M>) {
        self.messages.push_back(message);
    }

    /// Removes and returns the oldest message (fallible version)
    pub fn try_pop_oldest(&mut self) -> Result<Rc<M>, MessageQueueError> {
        self.messages
            .pop_front()
            .ok_or(MessageQueueError::EmptyQueue)
    }

    /// Removes and returns the oldest message.
    ///
    /// Panics if the queue is empty. Every engine pop goes through the owning
    /// buffer's order list, which guarantees a pending message; an empty pop
    /// is a defect and is never silently ignored.
    pub fn pop_oldest(&mut self) -> Rc<M> {
        self.try_pop_oldest()
            .unwrap_or_else(|e| panic!("TypedMessageQueue error: {}", e))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<M: Message> Default for TypedMessageQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Object-safe facade over [`TypedMessageQueue`] so one buffer can hold
/// queues for arbitrary message types discovered at runtime.
pub(crate) trait ErasedMessageQueue {
    fn enqueue_erased(&mut self, message: &MessageContainer);
    fn pop_oldest_erased(&mut self) -> MessageContainer;
}

impl<M: Message> ErasedMessageQueue for TypedMessageQueue<M> {
    fn enqueue_erased(&mut self, message: &MessageContainer) {
        // The buffer routed this container here by kind, so the payload type
        // always matches.
        let payload = message
            .try_clone_shared::<M>()
            .unwrap_or_else(|e| panic!("TypedMessageQueue error: {}", e));
        self.enqueue(payload);
    }

    fn pop_oldest_erased(&mut self) -> MessageContainer {
        MessageContainer::from_shared(self.pop_oldest())
    }
}
