use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no value at {0}")]
    MissingSlot(String),
    #[error("expected an object at {0}")]
    NotAnObject(String),
    #[error("expected an array at {0}")]
    NotAnArray(String),
    #[error("index {index} out of range for array of length {len} at {pointer}")]
    IndexOutOfRange {
        pointer: String,
        index: usize,
        len: usize,
    },
}
