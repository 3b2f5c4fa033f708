//! A small pub-sub channel for engine events.
//!
//! An [`EventHandler`] owns one callback and the receiving end of a bounded channel; publishers hold an
//! [`EventProducer`]. Each event runs the callback in its own task, so a slow or failing subscriber only ever holds up
//! itself. Handlers see the event and nothing else.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinSet},
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    receiver: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Dispatches events until every producer is gone, then waits for the handlers still in flight.
    pub async fn start_handler(self) {
        let Self { mut receiver, sender, handler } = self;
        drop(sender);
        let mut in_flight = JoinSet::new();
        debug!("📬️ Event handler listening");
        loop {
            tokio::select! {
                event = receiver.recv() => match event {
                    Some(event) => {
                        trace!("📬️ Dispatching event");
                        in_flight.spawn(handler(event));
                    },
                    None => break,
                },
                Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => report(finished),
            }
        }
        if !in_flight.is_empty() {
            debug!("📬️ All producers are gone. Draining {} handlers", in_flight.len());
        }
        while let Some(finished) = in_flight.join_next().await {
            report(finished);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn report(finished: Result<(), JoinError>) {
    if let Err(e) = finished {
        error!("📬️ An event handler did not complete. {e}");
    }
}

pub struct EventProducer<E> {
    sender: mpsc::Sender<E>,
}

impl<E> Clone for EventProducer<E> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Hands the event to the subscriber. Delivery failures are logged and otherwise ignored.
    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}
