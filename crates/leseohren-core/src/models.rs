//! Domain models for the Leseohren registry.
//!
//! Each entity comes with typed `Create*` / `Update*` commands. Commands
//! are validated at the boundary (see `validate()` on each) before any
//! repository is called.

pub mod category;
pub mod document;
pub mod event;
pub mod organization;
pub mod person;
