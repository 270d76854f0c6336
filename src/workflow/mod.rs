pub mod countdown;
pub mod exam_assembler;
pub mod exam_session;

pub use countdown::{Countdown, TICK_PERIOD};
pub use exam_assembler::ExamAssembler;
pub use exam_session::{ExamIntent, ExamPhase, ExamSession, SessionEffect};
