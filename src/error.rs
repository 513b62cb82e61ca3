use std::fs::File;
use std::io::BufReader;

/// Error types that can occur while building, running or training a network
///
/// # Variants
///
/// - `InvalidDimension` - Indicates a zero layer size, adjacent layers whose sizes do not chain, or a class count that does not match the output layer
/// - `ShapeMismatch` - Indicates an input, target or gradient matrix whose shape is incompatible with the stored parameters
/// - `EmptyInput` - Indicates that an operation received zero samples
/// - `UnrecognizedActivation` - Indicates an activation name that is not one of identity, relu or softmax
/// - `InputValidationError` - Indicates any other argument that does not meet the expected format or validation rules
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    InvalidDimension(String),
    ShapeMismatch(String),
    EmptyInput(String),
    UnrecognizedActivation(String),
    InputValidationError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidDimension(msg) => write!(f, "Invalid dimension: {}", msg),
            ModelError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
            ModelError::EmptyInput(msg) => write!(f, "Empty input: {}", msg),
            ModelError::UnrecognizedActivation(name) => {
                write!(
                    f,
                    "Unrecognized activation '{}'. Expected one of: identity, relu, softmax",
                    name
                )
            }
            ModelError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// Input/Output error types that can occur while loading datasets from disk
///
/// # Variants
///
/// - `StdIoError` - Wraps standard I/O errors from file system operations (opening, reading)
/// - `ParseError` - Indicates a malformed CSV body: non-numeric cells, invalid labels, ragged rows or no data rows
#[derive(Debug)]
pub enum IoError {
    StdIoError(std::io::Error),
    ParseError(String),
}

impl IoError {
    pub fn load_in_buf_reader(path: &str) -> Result<BufReader<File>, IoError> {
        let file = File::open(path).map_err(IoError::StdIoError)?;
        Ok(BufReader::new(file))
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::StdIoError(e) => write!(f, "IO error: {}", e),
            IoError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for IoError {}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::StdIoError(e)
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        let message = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(io_error) => IoError::StdIoError(io_error),
            _ => IoError::ParseError(message),
        }
    }
}
