use super::domain::{CreatorId, Quiz, QuizId};

/// Storage abstraction so the service can be exercised in isolation.
///
/// Implementations must keep both `id` and `slug` unique; `insert` and
/// `update` report a clash as [`RepositoryError::Conflict`].
pub trait QuizRepository: Send + Sync {
    fn insert(&self, quiz: Quiz) -> Result<Quiz, RepositoryError>;
    fn update(&self, quiz: Quiz) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &QuizId) -> Result<Option<Quiz>, RepositoryError>;
    fn fetch_by_slug(&self, slug: &str) -> Result<Option<Quiz>, RepositoryError>;
    fn list_by_creator(&self, creator: &CreatorId) -> Result<Vec<Quiz>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
