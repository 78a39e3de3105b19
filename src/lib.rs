//! Task Module Bot — a stack-based dialog engine with a Teams task-module demo on top.

pub mod bot;
pub mod channels;
pub mod config;
pub mod dialogs;
pub mod error;
pub mod store;
