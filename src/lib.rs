//! Library crate for millionaire-bot: question sources, per-user state stores
//! and the game rules, exposed for the binary and integration tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
