use thiserror::Error;

#[derive(Debug, Error)]
pub enum BencodeError {
    /// Wrong or missing tag byte, or a missing `:` / `e` delimiter.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    #[error("string length {declared} exceeds the {available} bytes available")]
    LengthMismatch { declared: usize, available: usize },

    #[error("values of type {0} can not be encoded")]
    UnsupportedType(&'static str),

    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("duplicate dictionary key: {0}")]
    DuplicateKey(String),

    #[error("nesting too deep")]
    NestingTooDeep,

    #[error("input of {len} bytes exceeds the {max} byte limit")]
    InputTooLarge { len: usize, max: usize },

    #[error("trailing data after value")]
    TrailingData,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
