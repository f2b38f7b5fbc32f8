//! Terminal client for the CryptoDesk task API.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod task;
pub mod task_board;
pub mod ui;
