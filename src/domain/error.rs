use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
    #[error("domain invariant violated: {message}")]
    Invariant { message: String },
}

impl DomainError {
    pub fn missing_fields(fields: Vec<&'static str>) -> Self {
        Self::MissingFields { fields }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}
