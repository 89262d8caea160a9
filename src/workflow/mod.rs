pub mod controller;
pub mod session;

pub use controller::{CredentialStatus, QuizController};
pub use session::{ReviewItem, Session, SessionPhase};
