mod setups;
mod ticket_world;

pub use ticket_world::TicketWorld;
