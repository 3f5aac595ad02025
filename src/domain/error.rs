use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("could not find type {0}")]
    UnknownType(String),
    #[error("type {0} is defined more than once")]
    DuplicateType(String),
    #[error("union {0} declares no alternatives")]
    EmptyUnion(String),
    #[error("type {0} contains itself outside of an array")]
    CyclicType(String),
    #[error("invalid pattern for {context}: {message}")]
    InvalidPattern { context: String, message: String },
    #[error("{value} is not an instance of any alternative of {union}")]
    NoMatchingAlternative { union: String, value: String },
    #[error("invalid type definition: {0}")]
    InvalidDefinition(String),
}
