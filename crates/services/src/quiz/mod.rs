mod driver;
mod timer;
mod view;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use driver::{DriverExit, DriverInput, QuizDriver, QuizUpdate};
pub use timer::{AdvanceTimer, TimerFired};
pub use view::{QuestionView, RunReport};
pub use workflow::{AdvanceOutcome, AnswerOutcome, QuizService};
