pub mod debug;
pub mod direction;
pub mod elevator_status;
pub mod events;
pub mod requests;
