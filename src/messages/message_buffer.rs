use std::collections::{HashMap, VecDeque};

use crate::messages::error::MessageBufferError;
use crate::messages::message::MessageKind;
use crate::messages::message_container::MessageContainer;
use crate::messages::message_handler::MessageHandler;
use crate::messages::message_queue::ErasedMessageQueue;

/// Heterogeneous message queue.
///
/// Routes each enqueue to the typed queue for the message's kind, while a
/// separate order list records which kind to pop next, so dequeue order
/// equals enqueue order across all message types sharing the buffer, not
/// merely within each type. Enqueue and dequeue are O(1) amortized.
pub struct MessageBuffer {
    queues_by_kind: HashMap<MessageKind, Box<dyn ErasedMessageQueue>>,
    upcoming_kinds: VecDeque<MessageKind>,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self {
            queues_by_kind: HashMap::new(),
            upcoming_kinds: VecDeque::new(),
        }
    }

    /// Appends the message to its kind's queue, creating the queue on first
    /// use, and records the kind in the global pop order.
    pub fn queue_message(&mut self, message: MessageContainer) {
        let queue = self
            .queues_by_kind
            .entry(message.kind())
            .or_insert_with(|| message.make_queue());
        queue.enqueue_erased(&message);
        self.upcoming_kinds.push_back(message.kind());
    }

    /// Removes and returns the globally oldest message (fallible version).
    ///
    /// `Ok(None)` means the buffer is empty. An order entry with no backing
    /// queue is an internal bookkeeping defect.
    pub fn try_pop_next(&mut self) -> Result<Option<MessageContainer>, MessageBufferError> {
        let Some(kind) = self.upcoming_kinds.pop_front() else {
            return Ok(None);
        };
        let queue = self
            .queues_by_kind
            .get_mut(&kind)
            .ok_or(MessageBufferError::MissingQueue)?;
        Ok(Some(queue.pop_oldest_erased()))
    }

    /// Removes and returns the globally oldest message, or `None` if empty
    pub fn pop_next(&mut self) -> Option<MessageContainer> {
        self.try_pop_next()
            .unwrap_or_else(|e| panic!("MessageBuffer error: {}", e))
    }

    /// Pops the next message and delivers it to `handler`; returns whether a
    /// message was delivered. Pick-next and deliver are coupled from the
    /// caller's perspective: no message can be observed without being
    /// handled.
    pub fn pop_and_dispatch_next(&mut self, handler: &mut dyn MessageHandler) -> bool {
        match self.pop_next() {
            Some(message) => {
                handler.handle_message(&message);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.upcoming_kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming_kinds.is_empty()
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}
