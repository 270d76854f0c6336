pub mod loaders;
pub mod matrix;
pub mod question;

pub use loaders::{load_exam_matrix, resolve_exam_matrix};
pub use matrix::{default_exam_matrix, DifficultyDistribution, ExamMatrixEntry};
pub use question::{Difficulty, Question, QuestionBatch, RawQuestion, RejectReason, TopicCategory};
