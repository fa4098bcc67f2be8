use crate::domain::error::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("backend error: {0}")]
    Api(#[source] Box<dyn std::error::Error + Send + Sync>),
}
