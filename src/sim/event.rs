/// Events emitted by engine operations.
/// The presentation layer consumes these for messages and sound.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizEvent {
    AnswerAccepted,
    AnswerRejected,
    StarsAwarded { amount: u32, total: u32 },
    ModuleUnlocked { index: usize },
}
