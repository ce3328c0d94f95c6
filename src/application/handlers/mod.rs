pub mod outbox_dispatcher;
