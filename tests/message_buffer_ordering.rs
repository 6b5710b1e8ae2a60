use std::rc::Rc;

use proptest::prelude::*;

use tannoy::{
    Message, MessageBuffer, MessageContainer, MessageHandler, MessageKind, TypedMessageQueue,
};

// Test message types
pub struct Moved {
    distance: u32,
}
impl Message for Moved {}

pub struct Collided {
    other: u32,
}
impl Message for Collided {}

#[derive(Default)]
struct RecordingHandler {
    seen: Vec<(&'static str, u32)>,
}

impl MessageHandler for RecordingHandler {
    fn handle_message(&mut self, message: &MessageContainer) {
        if let Some(moved) = message.downcast_ref::<Moved>() {
            self.seen.push(("Moved", moved.distance));
        } else if let Some(collided) = message.downcast_ref::<Collided>() {
            self.seen.push(("Collided", collided.other));
        } else {
            panic!("Unexpected message kind");
        }
    }
}

#[test]
fn cross_type_order_matches_enqueue_order() {
    let mut buffer = MessageBuffer::new();
    buffer.queue_message(MessageContainer::from_message(Moved { distance: 1 }));
    buffer.queue_message(MessageContainer::from_message(Collided { other: 2 }));
    buffer.queue_message(MessageContainer::from_message(Moved { distance: 3 }));

    let mut handler = RecordingHandler::default();
    while buffer.pop_and_dispatch_next(&mut handler) {}

    assert_eq!(
        handler.seen,
        vec![("Moved", 1), ("Collided", 2), ("Moved", 3)]
    );
}

#[test]
fn pop_and_dispatch_reports_emptiness() {
    let mut buffer = MessageBuffer::new();
    let mut handler = RecordingHandler::default();

    assert!(!buffer.pop_and_dispatch_next(&mut handler));

    buffer.queue_message(MessageContainer::from_message(Moved { distance: 7 }));
    assert!(buffer.pop_and_dispatch_next(&mut handler));
    assert!(!buffer.pop_and_dispatch_next(&mut handler));

    assert_eq!(handler.seen, vec![("Moved", 7)]);
}

#[test]
fn len_tracks_messages_across_kinds() {
    let mut buffer = MessageBuffer::new();
    assert!(buffer.is_empty());

    buffer.queue_message(MessageContainer::from_message(Moved { distance: 1 }));
    buffer.queue_message(MessageContainer::from_message(Collided { other: 2 }));
    assert_eq!(buffer.len(), 2);

    let popped = buffer.pop_next();
    assert!(popped.is_some());
    assert_eq!(buffer.len(), 1);

    let popped = buffer.pop_next();
    assert!(popped.is_some());
    assert!(buffer.is_empty());
}

#[test]
fn container_carries_kind_and_short_name() {
    let message = MessageContainer::from_message(Moved { distance: 0 });

    assert_eq!(message.name(), "Moved");
    assert_eq!(message.kind(), MessageKind::of::<Moved>());
    assert_ne!(message.kind(), MessageKind::of::<Collided>());
}

#[test]
fn typed_queue_is_fifo() {
    let mut queue = TypedMessageQueue::new();
    queue.enqueue(Rc::new(Moved { distance: 1 }));
    queue.enqueue(Rc::new(Moved { distance: 2 }));
    assert_eq!(queue.len(), 2);

    assert_eq!(queue.pop_oldest().distance, 1);
    assert_eq!(queue.pop_oldest().distance, 2);
    assert!(queue.is_empty());
}

proptest! {
    // Any interleaving of two message kinds drains in exact enqueue order
    #[test]
    fn interleaved_kinds_preserve_global_fifo(choices in proptest::collection::vec(any::<bool>(), 0..64)) {
        let mut buffer = MessageBuffer::new();
        for (index, pick_moved) in choices.iter().enumerate() {
            let index = index as u32;
            if *pick_moved {
                buffer.queue_message(MessageContainer::from_message(Moved { distance: index }));
            } else {
                buffer.queue_message(MessageContainer::from_message(Collided { other: index }));
            }
        }

        let mut handler = RecordingHandler::default();
        while buffer.pop_and_dispatch_next(&mut handler) {}

        prop_assert_eq!(handler.seen.len(), choices.len());
        for (index, (name, value)) in handler.seen.iter().enumerate() {
            let expected = if choices[index] { "Moved" } else { "Collided" };
            prop_assert_eq!(*name, expected);
            prop_assert_eq!(*value, index as u32);
        }
    }
}
