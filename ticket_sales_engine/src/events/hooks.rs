use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, TicketsIssuedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub tickets_issued_producer: Vec<EventProducer<TicketsIssuedEvent>>,
}

pub struct EventHandlers {
    pub on_tickets_issued: Option<EventHandler<TicketsIssuedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_tickets_issued = hooks.on_tickets_issued.map(|f| EventHandler::new(buffer_size, f));
        Self { on_tickets_issued }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_tickets_issued {
            result.tickets_issued_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_tickets_issued {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_tickets_issued: Option<Handler<TicketsIssuedEvent>>,
}

impl EventHooks {
    pub fn on_tickets_issued<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TicketsIssuedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_tickets_issued = Some(Arc::new(f));
        self
    }
}
