pub mod params;
pub mod question;
pub mod subject;

pub use params::{
    Choice, CognitiveLevel, Difficulty, Grade, MathSubTopic, QuestionParams, MAX_QUESTION_COUNT,
};
pub use question::{validate_batch, OptionKey, Question, QuestionOption};
pub use subject::Subject;
