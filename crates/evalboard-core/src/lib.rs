pub mod category;
pub mod model;
pub mod performance;
pub mod query;
pub mod results;
pub mod service;
pub mod storage;

pub use model::{ErrorBody, Evaluation, EvaluationRow, EvaluationStatus, NewEvaluation, RunAccepted};
pub use service::EvaluationService;
