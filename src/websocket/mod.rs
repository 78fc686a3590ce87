pub mod client;
pub mod connection;
pub mod tracker;
pub mod types;

pub use client::{
    Backoff,
    ChannelClient,
};
pub use connection::handle_socket;
pub use tracker::{
    ConnectionTracker,
    SharedTracker,
    TrackerStats,
};
pub use types::{
    ClientMessage,
    ServerMessage,
};
