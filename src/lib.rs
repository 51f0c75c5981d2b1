//! HTTP CRUD service for notes.
//!
//! The crate is split the same way the binary wires it together:
//! [`db::Database`] owns the SQLite connection, [`api::create_router`] maps
//! routes onto it, and [`config::Config`] supplies the runtime settings.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
