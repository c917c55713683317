//! Configuration models read at startup.

pub mod config;
