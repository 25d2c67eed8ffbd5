use shared_resources::error::RequestError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("elevator {id} is stopped")]
    Stopped { id: u8 },

    #[error("no elevator with id {id}")]
    UnknownUnit { id: u8 },

    #[error("every elevator is stopped")]
    NoRunningUnit,

    #[error(transparent)]
    Request(#[from] RequestError),
}
