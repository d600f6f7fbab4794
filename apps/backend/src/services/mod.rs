pub mod challenge;
pub mod evaluator;
pub mod learning;
pub mod notifier;
pub mod reports;
pub mod repetition;

pub use evaluator::AnswerEvaluator;
pub use learning::LearningService;
pub use notifier::{ActivityLogger, ActivityNotifier, ActivityObserver};
