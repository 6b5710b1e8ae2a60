//! # Tannoy
//! A typed, in-process message dispatch engine for entity/component update
//! loops. A fixed set of systems communicate by posting typed messages
//! rather than calling each other directly, with deterministic ordering,
//! isolation of immediate vs. deferred effects, and detection of runaway
//! message cascades.
//!
//! ```
//! use tannoy::{Dispatcher, Message, MessageListeners, System};
//!
//! struct Damage {
//!     amount: u32,
//! }
//! impl Message for Damage {}
//!
//! struct Health {
//!     current: u32,
//! }
//! impl System for Health {
//!     fn register(listeners: &mut MessageListeners<Self>) {
//!         listeners.add::<Damage>(|health, _dispatcher, damage| {
//!             health.current = health.current.saturating_sub(damage.amount);
//!         });
//!     }
//! }
//!
//! let mut builder = Dispatcher::builder();
//! builder.add_system(Health { current: 10 });
//! let dispatcher = builder.build();
//!
//! dispatcher.update(Damage { amount: 3 });
//! assert_eq!(dispatcher.get_system::<Health>().unwrap().current, 7);
//! ```

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod dispatcher;
mod messages;
mod system;

pub use dispatcher::{
    Dispatcher, DispatcherBuilder, SystemRef, SystemRefMut, DEFAULT_CASCADE_LIMIT,
};
pub use messages::{
    error::{MessageBufferError, MessageContainerError, MessageQueueError},
    listeners::MessageListeners,
    message::{Message, MessageKind},
    message_buffer::MessageBuffer,
    message_container::MessageContainer,
    message_handler::MessageHandler,
    message_queue::TypedMessageQueue,
};
pub use system::{DynSystem, System, SystemHost};
