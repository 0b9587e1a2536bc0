use thiserror::Error;

/// Errors that can occur during invoice construction, document generation
/// or detracción augmentation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FacturaError {
    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// A regulated document is missing data it must carry.
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Unexpected failure while constructing augmentation blocks.
    #[error("augmentation build error: {0}")]
    Build(String),

    /// Augmentation configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),
}

/// Which linked address a precondition failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressSide {
    Origin,
    Destination,
}

impl AddressSide {
    /// Field name on [`Invoice`](super::Invoice) holding this side.
    pub fn field(self) -> &'static str {
        match self {
            AddressSide::Origin => "origin_address",
            AddressSide::Destination => "destination_address",
        }
    }
}

impl std::fmt::Display for AddressSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressSide::Origin => f.write_str("origin"),
            AddressSide::Destination => f.write_str("destination"),
        }
    }
}

/// Missing or unusable data on a regulated invoice.
///
/// Raised before any document mutation; never relaxed by best-effort mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PreconditionError {
    /// The linked origin or destination address is absent.
    #[error("{side} address is required for operation type {operation_type}")]
    MissingLink {
        side: AddressSide,
        operation_type: String,
    },

    /// No administrative code (ubigeo) could be found on the address.
    #[error(
        "{side} address has no administrative code (district code, ubigeo or 6-digit postal code)"
    )]
    MissingCode { side: AddressSide },

    /// A code was present but rejected by the configured strictness.
    #[error("{side} address administrative code {value:?} is not a valid ubigeo")]
    InvalidCode { side: AddressSide, value: String },
}

impl PreconditionError {
    /// The address side this error refers to.
    pub fn side(&self) -> AddressSide {
        match self {
            PreconditionError::MissingLink { side, .. }
            | PreconditionError::MissingCode { side }
            | PreconditionError::InvalidCode { side, .. } => *side,
        }
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "origin_address.ubigeo").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// SUNAT rule or catalogue reference if applicable.
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

impl From<PreconditionError> for ValidationError {
    fn from(err: PreconditionError) -> Self {
        let field = match &err {
            PreconditionError::MissingLink { side, .. } => side.field().to_string(),
            PreconditionError::MissingCode { side }
            | PreconditionError::InvalidCode { side, .. } => format!("{}.ubigeo", side.field()),
        };
        ValidationError::with_rule(field, err.to_string(), "detraccion")
    }
}
