//! Domain layer
//!
//! Configuration records and their validation rules; no I/O.

pub mod models;
