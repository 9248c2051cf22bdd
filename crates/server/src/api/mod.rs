pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod scans;
pub mod status;
pub mod tickets;
pub mod ws;

pub use routes::create_router;
pub use ws::{WsBroadcaster, WsMessage};
