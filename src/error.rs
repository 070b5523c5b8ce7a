/// Result type alias for the scanning core
pub type Result<T> = std::result::Result<T, Error>;

/// Stable token prefixed to duplicate operation identifier failures
pub const DUPLICATE_OPERATION_ID_CODE: &str = "OAPI07950";

/// Error types for the scanning core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A type signature in the index could not be parsed
    InvalidTypeSignature { signature: String, message: String },
    /// No JAX-RS namespace was detected and none was configured
    FrameworkNotDetected,
    /// Two operations resolved to the same operation identifier (state inconsistency)
    DuplicateOperationId {
        id: String,
        first: String,
        second: String,
    },
    /// A `$ref` in the assembled document does not resolve to a component
    DanglingReference(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidTypeSignature { signature, message } => {
                write!(f, "Invalid type signature `{}`: {}", signature, message)
            }
            Error::FrameworkNotDetected => {
                write!(f, "No javax.ws.rs or jakarta.ws.rs annotations found in the index")
            }
            Error::DuplicateOperationId { id, first, second } => write!(
                f,
                "{}: Duplicate operationId: {} produced by {} and {}",
                DUPLICATE_OPERATION_ID_CODE, id, first, second
            ),
            Error::DanglingReference(reference) => {
                write!(f, "Dangling reference in generated document: {}", reference)
            }
        }
    }
}

impl std::error::Error for Error {}
