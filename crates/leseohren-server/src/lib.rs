//! Leseohren server library: configuration loading and wiring of the
//! registry services onto one SurrealDB connection.

pub mod app;
pub mod config;
