//! Event logging

pub mod logger;

pub use logger::EventLogger;
