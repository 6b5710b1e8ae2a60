use tannoy::{
    Dispatcher, Message, MessageBuffer, MessageContainer, MessageHandler, MessageListeners, System,
};

// Test message types
pub struct Tick;
impl Message for Tick {}

pub struct Reset;
impl Message for Reset {}

// Appends the type name of every message it sees
struct Logger {
    entries: Vec<String>,
}
impl System for Logger {
    fn register(listeners: &mut MessageListeners<Self>) {
        listeners.set_catch_all(|state, _dispatcher, message| {
            state.entries.push(message.name().to_string());
        });
    }
}

// Counts Ticks; every third one posts a Reset through the queued channel
struct Counter {
    count: usize,
}
impl System for Counter {
    fn register(listeners: &mut MessageListeners<Self>) {
        listeners.add::<Tick>(|state, dispatcher, _tick| {
            state.count += 1;
            if state.count == 3 {
                dispatcher.send_message(Reset);
            }
        });
        listeners.add::<Reset>(|state, _dispatcher, _reset| {
            state.count = 0;
        });
    }
}

#[test]
fn tick_reset_round_trip() {
    let mut builder = Dispatcher::builder();
    builder
        .add_system(Logger {
            entries: Vec::new(),
        })
        .add_system(Counter { count: 0 });
    let dispatcher = builder.build();

    dispatcher.update(Tick);
    assert_eq!(dispatcher.get_system::<Counter>().unwrap().count, 1);

    dispatcher.update(Tick);
    assert_eq!(dispatcher.get_system::<Counter>().unwrap().count, 2);

    // The third Tick posts Reset, which the same update's queued drain
    // delivers back to the Counter.
    dispatcher.update(Tick);
    assert_eq!(dispatcher.get_system::<Counter>().unwrap().count, 0);

    let logger = dispatcher.get_system::<Logger>().unwrap();
    assert_eq!(logger.entries, vec!["Tick", "Tick", "Tick", "Reset"]);
}

#[test]
fn pending_deferred_messages_run_before_the_update_message() {
    let mut builder = Dispatcher::builder();
    builder.add_system(Logger {
        entries: Vec::new(),
    });
    let dispatcher = builder.build();

    dispatcher.send_message_deferred(Tick);
    dispatcher.send_message_deferred(Tick);
    dispatcher.update(Reset);

    let logger = dispatcher.get_system::<Logger>().unwrap();
    assert_eq!(logger.entries, vec!["Tick", "Tick", "Reset"]);
}

#[test]
fn update_without_listeners_is_harmless() {
    struct Inert;
    impl System for Inert {
        fn register(_listeners: &mut MessageListeners<Self>) {}
    }

    let mut builder = Dispatcher::builder();
    builder.add_system(Inert);
    let dispatcher = builder.build();

    dispatcher.update(Tick);
    dispatcher.update(Reset);

    assert!(dispatcher.get_system::<Inert>().is_some());
}

#[test]
fn cloned_dispatchers_share_the_engine() {
    let mut builder = Dispatcher::builder();
    builder.add_system(Counter { count: 0 });
    let dispatcher = builder.build();
    let alias = dispatcher.clone();

    alias.update(Tick);

    assert_eq!(dispatcher.get_system::<Counter>().unwrap().count, 1);
}

// Listeners may look up other systems mid-delivery
struct Snooper {
    observed_count: Option<usize>,
}
impl System for Snooper {
    fn register(listeners: &mut MessageListeners<Self>) {
        listeners.add::<Tick>(|state, dispatcher, _tick| {
            state.observed_count = dispatcher
                .get_system::<Counter>()
                .map(|counter| counter.count);
        });
    }
}

#[test]
fn listener_can_query_other_systems() {
    let mut builder = Dispatcher::builder();
    builder
        .add_system(Counter { count: 0 })
        .add_system(Snooper {
            observed_count: None,
        });
    let dispatcher = builder.build();

    dispatcher.update(Tick);

    // Counter runs first in fan-out order, so the Snooper sees the
    // incremented value.
    let snooper = dispatcher.get_system::<Snooper>().unwrap();
    assert_eq!(snooper.observed_count, Some(1));
}

#[test]
fn dispatcher_serves_as_direct_dispatch_handler() {
    let mut builder = Dispatcher::builder();
    builder.add_system(Logger {
        entries: Vec::new(),
    });
    let dispatcher = builder.build();

    // Channel-3 direct dispatch, driven by hand through a standalone buffer
    let mut buffer = MessageBuffer::new();
    buffer.queue_message(MessageContainer::from_message(Tick));

    let mut handler = dispatcher.clone();
    assert!(buffer.pop_and_dispatch_next(&mut handler));
    assert!(!buffer.pop_and_dispatch_next(&mut handler));

    let logger = dispatcher.get_system::<Logger>().unwrap();
    assert_eq!(logger.entries, vec!["Tick"]);
}
