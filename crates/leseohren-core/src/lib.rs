//! Leseohren Core: domain models, repository traits and error types
//! shared by every crate of the volunteer registry.

pub mod error;
pub mod events;
pub mod models;
pub mod repository;
pub mod storage;
mod validate;
