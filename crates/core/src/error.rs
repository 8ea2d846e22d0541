use std::fmt;

use thiserror::Error;

/// Pipeline stage an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Generating the coin name, symbol and description
    Identity,

    /// Generating the tokenomics parameters
    Tokenomics,

    /// Rendering, compiling and deploying the contract
    Deployment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Identity => write!(f, "coin identity generation"),
            Stage::Tokenomics => write!(f, "tokenomics generation"),
            Stage::Deployment => write!(f, "contract deployment"),
        }
    }
}

/// Reason a model response was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// No `{...}` object could be found in the response text
    #[error("response contains no JSON object")]
    NoJsonObject,

    /// The extracted object is not valid JSON
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// A required field is absent or empty
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A field has the wrong JSON type
    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("invalid coin name format: '{0}'")]
    InvalidName(String),

    #[error("invalid symbol format: '{0}'")]
    InvalidSymbol(String),

    #[error("description is {0} characters, must be under 100")]
    DescriptionTooLong(usize),

    /// A numeric field is outside its allowed range
    #[error("{field} {value} out of valid range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Failures raised while turning contract source into an artifact
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// The compiler reported diagnostics of error severity
    #[error("Compilation errors:\n{}", .0.join("\n"))]
    Diagnostics(Vec<String>),

    /// An `import` could not be read from the dependency directory
    #[error("Error loading import {0}: file not found")]
    UnresolvedImport(String),

    /// The compiler process itself failed
    #[error("Compiler failure: {0}")]
    Compiler(String),

    /// Compilation succeeded but produced nothing deployable
    #[error("No deployable contract in {0}")]
    MissingContract(String),
}

/// Error type for the meme coin pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Completion service unreachable at the self-check
    #[error("Failed to connect to completion service: {0}")]
    Connectivity(String),

    /// A completion request failed outside the self-check
    #[error("Completion request failed: {0}")]
    Completion(String),

    /// Model output broke its shape or range contract
    #[error("Generated output rejected: {0}")]
    Generation(Violation),

    #[error("Template error: {0}")]
    Template(String),

    #[error(transparent)]
    Compilation(#[from] CompilationError),

    /// Connected chain is not the configured one
    #[error("Wrong network. Expected chain id {expected}, got {actual}")]
    NetworkIdentity { expected: u64, actual: u64 },

    /// Error when talking to the chain
    #[error("Chain error: {0}")]
    Chain(String),

    /// Deployment failed at any of its stages
    #[error("Deployment error: {0}")]
    Deployment(Box<Error>),

    /// Writing a deployment record failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A creation attempt aborted in the given stage
    #[error("Error creating meme coin during {stage}: {cause}")]
    Stage { stage: Stage, cause: Box<Error> },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new connectivity error
    pub fn connectivity<S: Into<String>>(msg: S) -> Self {
        Error::Connectivity(msg.into())
    }

    /// Create a new completion error
    pub fn completion<S: Into<String>>(msg: S) -> Self {
        Error::Completion(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Error::Template(msg.into())
    }

    /// Create a new chain error
    pub fn chain<S: Into<String>>(msg: S) -> Self {
        Error::Chain(msg.into())
    }

    /// Create a new persistence error
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Error::Persistence(msg.into())
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Error::Serialization(msg.into())
    }

    /// Wrap an error as a deployment failure
    pub fn deployment(cause: Error) -> Self {
        Error::Deployment(Box::new(cause))
    }

    /// Attach the pipeline stage to an error
    pub fn in_stage(self, stage: Stage) -> Self {
        Error::Stage {
            stage,
            cause: Box::new(self),
        }
    }

    /// The innermost error beneath deployment and stage wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Deployment(inner) => inner.root_cause(),
            Error::Stage { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// Stage the error was raised in, if it was wrapped with one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

// Wrapper messages embed their cause; no variant reports a `source()`.
impl From<Violation> for Error {
    fn from(violation: Violation) -> Self {
        Error::Generation(violation)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON serialization error: {}", err))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
