//! Channel abstraction for activity I/O.

pub mod activity;
pub mod channel;
pub mod cli;
pub mod http;
pub mod manager;

pub use activity::*;
pub use channel::*;
pub use cli::CliChannel;
pub use http::bot_routes;
pub use manager::ChannelManager;
