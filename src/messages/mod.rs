pub mod error;
pub mod listeners;
pub mod message;
pub mod message_buffer;
pub mod message_container;
pub mod message_handler;
pub mod message_queue;
