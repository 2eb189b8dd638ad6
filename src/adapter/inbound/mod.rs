//! Inbound adapters: everything that feeds instances and commands in.

pub mod cli;
pub mod instance;

pub use instance::{parse_instance, read_instance, InstanceFormat};
