pub mod error;
pub mod modules;
pub mod utilities;
