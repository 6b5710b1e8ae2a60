use crate::messages::message_container::MessageContainer;

/// Receives messages popped out of a
/// [`MessageBuffer`](crate::MessageBuffer).
pub trait MessageHandler {
    fn handle_message(&mut self, message: &MessageContainer);
}
