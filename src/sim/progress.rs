/// ProgressionState: where the player is and what they have earned.
///
/// Mutated only through `ProgressionEngine`. Nothing here is persisted;
/// a new state starts every run.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressionState {
    /// Index into the catalog, `None` while no module is selected.
    pub current_module: Option<usize>,
    /// Index into the current module's activities. May run one past the end,
    /// which is how an exhausted module is observed.
    pub current_activity: usize,
    /// Monotonic; there is no spending.
    pub total_stars: u32,
}

impl ProgressionState {
    pub fn new() -> Self {
        Self::default()
    }
}
