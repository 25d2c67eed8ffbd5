pub mod call;
pub mod config;
pub mod error;
pub mod request;
pub mod request_registry;
pub mod writer_priority;
