//! Quiz authoring, publication and the respondent delivery flow around the
//! scoring engine.

pub mod catalog;
pub mod domain;
pub mod draft;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::ResultCatalog;
pub use domain::{
    CreatorId, Quiz, QuizDefinition, QuizId, QuizStatus, ResultType, ShareSettings,
};
pub use draft::{AcceptedDraft, DraftError, DraftQuestion, DraftResult, QuizDraft};
pub use import::{QuestionCsvImporter, QuestionImportError};
pub use repository::{QuizRepository, RepositoryError};
pub use router::{quiz_router, CREATOR_HEADER};
pub use service::{
    BasicSettings, QuestionCopy, QuizService, QuizServiceError, ResultTypeCopy,
};
pub use validation::{validate_definition, DefinitionIssue};
pub use views::{
    AttemptResult, AxisResultView, PriorityLabel, PublicQuizView, QuizSummaryView,
    RecommendationView,
};
