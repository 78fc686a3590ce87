pub mod config;
pub mod core;
pub mod display;
pub mod logging;
pub mod openf1;
pub mod persistence;
pub mod server;
pub mod websocket;
