use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Prefix shared by every parse and validation failure, so callers can match on it alone.
pub const PARSE_FAILURE_PREFIX: &str = "Failed to parse OpenAPI schema: ";

/// Errors that can occur while turning an OpenAPI document into type declarations
#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    /// The document decoded neither as YAML nor as JSON
    #[error("Failed to parse OpenAPI schema: could not decode document as YAML ({yaml}) or JSON ({json})")]
    #[diagnostic(
        code(openapi::parse_error),
        help("Check that the document is well-formed YAML or JSON")
    )]
    Parse {
        /// Message from the YAML decoder
        yaml: String,
        /// Message from the JSON decoder
        json: String,
    },

    /// The document decoded but the validator rejected it
    #[error("Failed to parse OpenAPI schema: {0}")]
    #[diagnostic(
        code(openapi::validation),
        help("The document must be an OpenAPI 3.x or Swagger 2.0 description")
    )]
    Validation(#[from] ValidationError),

    /// Unknown target framework identifier
    #[error("Unsupported framework: {name}")]
    #[diagnostic(
        code(openapi::unsupported_framework),
        help("Supported frameworks are `hono` and `elysia`")
    )]
    UnsupportedFramework {
        /// The identifier that was passed in
        name: String,
    },
}

impl GenerateError {
    /// Create a parse error from both decoder failures
    pub fn parse(yaml: impl ToString, json: impl ToString) -> Self {
        Self::Parse {
            yaml: yaml.to_string(),
            json: json.to_string(),
        }
    }

    /// Create an unsupported framework error
    pub fn unsupported_framework(name: impl Into<String>) -> Self {
        Self::UnsupportedFramework { name: name.into() }
    }
}

/// Rejection produced by a [`DocumentValidator`](crate::validate::DocumentValidator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// What is wrong with the document
    pub message: String,
    /// JSON pointer to the offending location, if known
    pub pointer: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pointer: None,
        }
    }

    /// Create a validation error anchored at a JSON pointer
    pub fn at(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pointer: Some(pointer.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(pointer) = &self.pointer {
            write!(f, " (at {pointer})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerateError>;
