/// ProgressionEngine: the only code that touches `ProgressionState`.
///
/// State machine over `(module, activity)` index pairs. "No current
/// activity" is a normal outcome (`None`): either no module is selected or
/// the selected module has been walked past its last activity. The engine
/// never navigates on its own; callers check `current_activity()` after
/// `advance_activity()` and decide what to show next.
///
/// ## Hints
///   `HintMode::Random`:   uniform pick, with replacement.
///   `HintMode::Shuffled`: every hint once in random order, then reshuffle.
///   The shuffled deck belongs to one activity and is rebuilt on change.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::config::HintMode;
use crate::domain::activity::Activity;
use crate::domain::catalog::Catalog;
use crate::domain::module::{is_unlocked, Module};
use crate::sim::event::QuizEvent;
use crate::sim::progress::ProgressionState;

/// Returned by `hint()` when there is nothing to show.
pub const NO_HINTS: &str = "No hints available";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("no module at index {index} (catalog has {module_count})")]
    InvalidReference { index: usize, module_count: usize },
}

pub struct ProgressionEngine {
    catalog: Catalog,
    state: ProgressionState,
    hint_mode: HintMode,
    stars_per_answer: u32,
    // ── Shuffled hint deck ──
    hint_deck: Vec<usize>,
    deck_owner: Option<(usize, usize)>,
}

// ── Construction ──

impl ProgressionEngine {
    pub fn new(catalog: Catalog) -> Self {
        ProgressionEngine {
            catalog,
            state: ProgressionState::new(),
            hint_mode: HintMode::Random,
            stars_per_answer: 1,
            hint_deck: vec![],
            deck_owner: None,
        }
    }

    pub fn with_hint_mode(mut self, mode: HintMode) -> Self {
        self.hint_mode = mode;
        self
    }

    pub fn with_stars_per_answer(mut self, stars: u32) -> Self {
        self.stars_per_answer = stars;
        self
    }
}

// ── Queries ──

impl ProgressionEngine {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn total_stars(&self) -> u32 {
        self.state.total_stars
    }

    pub fn current_module_index(&self) -> Option<usize> {
        self.state.current_module
    }

    pub fn current_activity_index(&self) -> usize {
        self.state.current_activity
    }

    pub fn current_module(&self) -> Option<&Module> {
        self.state.current_module.and_then(|m| self.catalog.get(m))
    }

    pub fn current_activity(&self) -> Option<&Activity> {
        self.current_module()
            .and_then(|m| m.activity(self.state.current_activity))
    }

    /// Unlock status of one module. Unknown indices are locked.
    pub fn is_unlocked(&self, idx: usize) -> bool {
        self.catalog
            .get(idx)
            .map_or(false, |m| is_unlocked(m, self.state.total_stars))
    }

    /// Unlock status of every module, in catalog order.
    pub fn unlock_status(&self) -> Vec<bool> {
        self.catalog
            .modules()
            .iter()
            .map(|m| is_unlocked(m, self.state.total_stars))
            .collect()
    }

    /// `(module, activity)` of the current activity, if there is one.
    fn current_key(&self) -> Option<(usize, usize)> {
        let m = self.state.current_module?;
        let a = self.state.current_activity;
        self.catalog.get(m)?.activity(a)?;
        Some((m, a))
    }
}

// ── Navigation ──

impl ProgressionEngine {
    /// Make `idx` the current module and rewind to its first activity.
    /// Unlock status is not checked here; the caller gates selection.
    pub fn select_module(&mut self, idx: usize) -> Result<(), ProgressError> {
        if idx >= self.catalog.len() {
            return Err(ProgressError::InvalidReference {
                index: idx,
                module_count: self.catalog.len(),
            });
        }
        self.state.current_module = Some(idx);
        self.state.current_activity = 0;
        debug!("selected module {idx}");
        Ok(())
    }

    /// Back to "no module selected".
    pub fn leave_module(&mut self) {
        self.state.current_module = None;
        self.state.current_activity = 0;
    }

    pub fn advance_activity(&mut self) {
        self.state.current_activity = self.state.current_activity.saturating_add(1);
        debug!(
            "advanced to activity {} of module {:?}",
            self.state.current_activity, self.state.current_module
        );
    }

    pub fn previous_activity(&mut self) {
        self.state.current_activity = self.state.current_activity.saturating_sub(1);
    }
}

// ── Answers, hints, stars ──

impl ProgressionEngine {
    /// Trimmed, case-insensitive comparison with the current activity's answer.
    /// No current activity → `false`.
    pub fn check_answer(&self, submitted: &str) -> bool {
        self.current_activity()
            .map_or(false, |a| a.accepts(submitted))
    }

    /// Check the answer and award stars when correct.
    pub fn submit_answer(&mut self, submitted: &str) -> Vec<QuizEvent> {
        if !self.check_answer(submitted) {
            debug!("answer rejected");
            return vec![QuizEvent::AnswerRejected];
        }
        let mut events = vec![QuizEvent::AnswerAccepted];
        events.extend(self.add_stars(self.stars_per_answer));
        events
    }

    /// Add stars, then recompute every module's unlock status.
    /// Modules that flipped to unlocked are reported as events.
    pub fn add_stars(&mut self, amount: u32) -> Vec<QuizEvent> {
        let before = self.unlock_status();
        self.state.total_stars = self.state.total_stars.saturating_add(amount);
        let after = self.unlock_status();

        let mut events = vec![QuizEvent::StarsAwarded {
            amount,
            total: self.state.total_stars,
        }];
        for (index, (was, now)) in before.iter().zip(&after).enumerate() {
            if !was && *now {
                info!("module {index} unlocked at {} stars", self.state.total_stars);
                events.push(QuizEvent::ModuleUnlocked { index });
            }
        }
        events
    }

    /// Hint for the current activity using the thread-local RNG.
    pub fn hint(&mut self) -> &str {
        let mut rng = rand::rng();
        self.hint_with(&mut rng)
    }

    /// Hint for the current activity drawn from `rng`.
    /// Returns `NO_HINTS` when there is no activity or it has no hints.
    pub fn hint_with<R: Rng>(&mut self, rng: &mut R) -> &str {
        let Some((m, a)) = self.current_key() else {
            return NO_HINTS;
        };
        let count = self.catalog.modules()[m].activities[a].hints.len();
        if count == 0 {
            return NO_HINTS;
        }

        let pick = match self.hint_mode {
            HintMode::Random => rng.random_range(0..count),
            HintMode::Shuffled => self.draw_from_deck((m, a), count, rng),
        };
        &self.catalog.modules()[m].activities[a].hints[pick]
    }

    fn draw_from_deck<R: Rng>(&mut self, key: (usize, usize), count: usize, rng: &mut R) -> usize {
        if self.deck_owner != Some(key) || self.hint_deck.is_empty() {
            self.hint_deck = (0..count).collect();
            self.hint_deck.shuffle(rng);
            self.deck_owner = Some(key);
        }
        self.hint_deck.pop().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::ActivityKind;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn activity(answer: &str, hints: &[&str]) -> Activity {
        Activity {
            question: format!("Answer is {answer}"),
            kind: ActivityKind::FillInTheBlank,
            options: vec![],
            correct_answer: answer.into(),
            hints: hints.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn module(title: &str, stars_required: u32, activities: Vec<Activity>) -> Module {
        Module {
            title: title.into(),
            description: String::new(),
            introduction: String::new(),
            example_code: vec![],
            activities,
            stars_required,
        }
    }

    /// Module A (open, 2 activities) and Module B (2 stars, 1 activity).
    fn two_module_engine() -> ProgressionEngine {
        let catalog = Catalog::from_modules(vec![
            module("A", 0, vec![
                activity("int", &["Whole numbers", "Not float"]),
                activity("John", &[]),
            ]),
            module("B", 2, vec![activity("==", &["Two symbols"])]),
        ])
        .unwrap();
        ProgressionEngine::new(catalog)
    }

    #[test]
    fn starts_with_nothing_selected() {
        let e = two_module_engine();
        assert!(e.current_module().is_none());
        assert!(e.current_activity().is_none());
        assert_eq!(e.total_stars(), 0);
        assert!(!e.check_answer("int"));
    }

    #[test]
    fn unlock_scenario() {
        let mut e = two_module_engine();
        assert_eq!(e.unlock_status(), vec![true, false]);

        e.select_module(0).unwrap();
        assert!(e.check_answer("int"));
        e.add_stars(1);
        assert!(!e.is_unlocked(1));
        let events = e.add_stars(1);
        assert_eq!(e.total_stars(), 2);
        assert!(e.is_unlocked(1));
        assert!(events.contains(&QuizEvent::ModuleUnlocked { index: 1 }));
    }

    #[test]
    fn invalid_reference_leaves_state_alone() {
        let mut e = two_module_engine();
        e.select_module(0).unwrap();
        e.advance_activity();
        let before = e.state().clone();

        let err = e.select_module(7).unwrap_err();
        assert_eq!(err, ProgressError::InvalidReference { index: 7, module_count: 2 });
        assert_eq!(e.state(), &before);
    }

    #[test]
    fn select_rewinds_to_first_activity() {
        let mut e = two_module_engine();
        e.select_module(0).unwrap();
        e.advance_activity();
        e.select_module(0).unwrap();
        assert_eq!(e.current_activity_index(), 0);
    }

    #[test]
    fn advancing_past_last_activity_is_absent() {
        let mut e = two_module_engine();
        e.select_module(0).unwrap();
        let len = e.current_module().unwrap().activities.len();
        for _ in 0..len {
            assert!(e.current_activity().is_some());
            e.advance_activity();
        }
        assert!(e.current_activity().is_none());
        assert!(e.current_module().is_some());
        assert!(!e.check_answer("int"));
        assert_eq!(e.hint(), NO_HINTS);
    }

    #[test]
    fn previous_saturates_at_zero() {
        let mut e = two_module_engine();
        e.select_module(0).unwrap();
        e.previous_activity();
        assert_eq!(e.current_activity_index(), 0);
        e.advance_activity();
        e.previous_activity();
        assert_eq!(e.current_activity().unwrap().correct_answer, "int");
    }

    #[test]
    fn check_answer_ignores_case_and_padding() {
        let mut e = two_module_engine();
        e.select_module(0).unwrap();
        e.advance_activity();
        assert_eq!(e.check_answer("  John "), e.check_answer("john"));
        assert!(e.check_answer("  John "));
    }

    #[test]
    fn submit_awards_one_star_on_success_only() {
        let mut e = two_module_engine();
        e.select_module(0).unwrap();
        assert_eq!(e.submit_answer("float"), vec![QuizEvent::AnswerRejected]);
        assert_eq!(e.total_stars(), 0);

        let events = e.submit_answer(" INT ");
        assert_eq!(events[0], QuizEvent::AnswerAccepted);
        assert_eq!(events[1], QuizEvent::StarsAwarded { amount: 1, total: 1 });
        assert_eq!(e.total_stars(), 1);
    }

    #[test]
    fn stars_per_answer_is_configurable() {
        let mut e = two_module_engine().with_stars_per_answer(2);
        e.select_module(0).unwrap();
        let events = e.submit_answer("int");
        assert!(events.contains(&QuizEvent::ModuleUnlocked { index: 1 }));
    }

    #[test]
    fn add_zero_stars_changes_nothing() {
        let mut e = two_module_engine();
        e.add_stars(1);
        let events = e.add_stars(0);
        assert_eq!(e.total_stars(), 1);
        assert_eq!(events, vec![QuizEvent::StarsAwarded { amount: 0, total: 1 }]);
        assert_eq!(e.unlock_status(), vec![true, false]);
    }

    #[test]
    fn hint_is_always_a_member() {
        let mut e = two_module_engine();
        e.select_module(0).unwrap();
        let hints = e.current_activity().unwrap().hints.clone();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let h = e.hint_with(&mut rng).to_string();
            assert!(hints.contains(&h), "unexpected hint {h:?}");
        }
    }

    #[test]
    fn hint_sentinel_without_hints_or_activity() {
        let mut e = two_module_engine();
        assert_eq!(e.hint(), NO_HINTS);
        e.select_module(0).unwrap();
        e.advance_activity();
        assert_eq!(e.hint(), NO_HINTS);
    }

    #[test]
    fn shuffled_hints_cover_all_before_repeating() {
        let mut e = two_module_engine().with_hint_mode(HintMode::Shuffled);
        e.select_module(0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..3 {
            let mut seen: Vec<String> = (0..2).map(|_| e.hint_with(&mut rng).to_string()).collect();
            seen.sort();
            assert_eq!(seen, vec!["Not float".to_string(), "Whole numbers".to_string()]);
        }
    }

    #[test]
    fn shuffled_deck_resets_on_new_activity() {
        let mut e = two_module_engine().with_hint_mode(HintMode::Shuffled);
        let mut rng = StdRng::seed_from_u64(1);
        e.select_module(0).unwrap();
        e.hint_with(&mut rng);
        e.select_module(1).unwrap();
        assert_eq!(e.hint_with(&mut rng), "Two symbols");
        assert_eq!(e.hint_with(&mut rng), "Two symbols");
    }

    #[test]
    fn leave_module_clears_selection() {
        let mut e = two_module_engine();
        e.select_module(1).unwrap();
        e.leave_module();
        assert!(e.current_module_index().is_none());
        assert!(!e.is_unlocked(9));
    }

    proptest! {
        #[test]
        fn stars_never_decrease(amounts in proptest::collection::vec(0u32..10, 0..20)) {
            let mut e = two_module_engine();
            let mut last = e.total_stars();
            for n in amounts {
                e.add_stars(n);
                prop_assert!(e.total_stars() >= last);
                last = e.total_stars();
            }
        }
    }
}
