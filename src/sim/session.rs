/// Session: presentation-side state for one run of the quiz.
///
/// Owns the `ProgressionEngine` and everything the screens need that is not
/// progression data: which screen is up, the typed answer, the last hint and
/// result, the module cursor and the message bar. User input arrives as
/// `Action`s, one at a time; every progression change goes through the engine.
///
/// ## Screen flow:
///   Title → ModuleSelect → ModuleIntro → Activity → Result
///   Result (correct) → next Activity, or ModuleSelect once the module is done
///   Result (wrong)   → same Activity, input cleared

use log::debug;

use crate::sim::engine::ProgressionEngine;
use crate::sim::event::QuizEvent;

/// Ticks a message stays on the bar.
const MESSAGE_TICKS: u32 = 60;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Title,
    ModuleSelect,
    ModuleIntro,
    Activity,
    Result { correct: bool },
}

/// Input already mapped from keys. Meaning depends on the screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Confirm,
    Back,
    Up,
    Down,
    Previous,
    Hint,
    Char(char),
    Backspace,
    Quit,
}

pub struct Session {
    pub engine: ProgressionEngine,
    pub screen: Screen,
    pub select_cursor: usize,
    /// Highlighted option on the current activity, if one was picked.
    pub option_cursor: Option<usize>,
    pub input: String,
    pub hint: String,
    /// Stars awarded by the last accepted answer.
    pub last_award: u32,
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
    pub quit: bool,
}

impl Session {
    pub fn new(engine: ProgressionEngine) -> Self {
        Session {
            engine,
            screen: Screen::Title,
            select_cursor: 0,
            option_cursor: None,
            input: String::new(),
            hint: String::new(),
            last_award: 0,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
            quit: false,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Advance timers. Called once per frame tick.
    pub fn tick(&mut self) {
        self.anim_tick = self.anim_tick.wrapping_add(1);
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    /// Apply one user action. Returns the engine events it produced.
    pub fn apply(&mut self, action: Action) -> Vec<QuizEvent> {
        if action == Action::Quit {
            self.quit = true;
            return vec![];
        }
        match self.screen {
            Screen::Title => self.on_title(action),
            Screen::ModuleSelect => self.on_module_select(action),
            Screen::ModuleIntro => self.on_intro(action),
            Screen::Activity => return self.on_activity(action),
            Screen::Result { correct } => self.on_result(action, correct),
        }
        vec![]
    }

    // ── Screen handlers ──

    fn on_title(&mut self, action: Action) {
        match action {
            Action::Confirm => self.show_module_select(),
            Action::Back | Action::Char('q') | Action::Char('Q') => self.quit = true,
            _ => {}
        }
    }

    fn on_module_select(&mut self, action: Action) {
        let total = self.engine.catalog().len();
        match action {
            Action::Up => self.select_cursor = self.select_cursor.saturating_sub(1),
            Action::Down => {
                if self.select_cursor + 1 < total {
                    self.select_cursor += 1;
                }
            }
            Action::Confirm => self.select_module(self.select_cursor),
            Action::Back => self.screen = Screen::Title,
            _ => {}
        }
    }

    fn on_intro(&mut self, action: Action) {
        match action {
            Action::Confirm => self.show_activity(),
            Action::Back => self.leave_module(),
            _ => {}
        }
    }

    fn on_activity(&mut self, action: Action) -> Vec<QuizEvent> {
        match action {
            Action::Confirm => return self.submit_answer(),
            Action::Hint => self.request_hint(),
            Action::Up => self.move_option_cursor(-1),
            Action::Down => self.move_option_cursor(1),
            Action::Char(c) => {
                self.option_cursor = None;
                self.input.push(c);
            }
            Action::Backspace => {
                self.option_cursor = None;
                self.input.pop();
            }
            Action::Previous => {
                self.engine.previous_activity();
                self.show_activity();
            }
            Action::Back => self.leave_module(),
            _ => {}
        }
        vec![]
    }

    fn on_result(&mut self, action: Action, correct: bool) {
        match (action, correct) {
            (Action::Confirm, true) => self.next_activity(),
            (Action::Confirm, false) | (Action::Back, false) => self.retry_activity(),
            (Action::Back, true) => self.leave_module(),
            _ => {}
        }
    }

    // ── Operations forwarded to the engine ──

    /// Select a module if it is unlocked. Locked or unknown modules leave a message.
    pub fn select_module(&mut self, idx: usize) {
        if let Some(m) = self.engine.catalog().get(idx) {
            if !m.is_unlocked(self.engine.total_stars()) {
                let msg = format!("Locked: needs {} stars", m.stars_required);
                self.set_message(&msg, MESSAGE_TICKS);
                return;
            }
        }
        match self.engine.select_module(idx) {
            Ok(()) => {
                self.clear_activity_ui();
                self.screen = Screen::ModuleIntro;
            }
            Err(e) => self.set_message(&e.to_string(), MESSAGE_TICKS),
        }
    }

    pub fn submit_answer(&mut self) -> Vec<QuizEvent> {
        if self.input.trim().is_empty() {
            return vec![];
        }
        let events = self.engine.submit_answer(&self.input);
        let correct = events.contains(&QuizEvent::AnswerAccepted);
        self.last_award = 0;
        for ev in &events {
            match *ev {
                QuizEvent::StarsAwarded { amount, .. } => self.last_award = amount,
                QuizEvent::ModuleUnlocked { index } => {
                    if let Some(m) = self.engine.catalog().get(index) {
                        let msg = format!("Unlocked: {}", m.title);
                        self.set_message(&msg, MESSAGE_TICKS);
                    }
                }
                _ => {}
            }
        }
        self.screen = Screen::Result { correct };
        events
    }

    pub fn request_hint(&mut self) {
        self.hint = self.engine.hint().to_string();
    }

    /// Move on after a correct answer. An exhausted module returns to selection.
    pub fn next_activity(&mut self) {
        self.engine.advance_activity();
        if self.engine.current_activity().is_some() {
            self.show_activity();
        } else {
            let title = self.engine.current_module().map(|m| m.title.clone()).unwrap_or_default();
            debug!("module {title:?} finished");
            self.set_message(&format!("Module complete: {title}"), MESSAGE_TICKS);
            self.leave_module();
        }
    }

    /// Clear the typed answer and result, stay on the same activity.
    pub fn retry_activity(&mut self) {
        self.input.clear();
        self.option_cursor = None;
        self.screen = Screen::Activity;
    }

    // ── Helpers ──

    /// Step through the options; the highlighted option becomes the answer.
    /// Typed characters are never reinterpreted as option picks.
    fn move_option_cursor(&mut self, delta: isize) {
        let Some(a) = self.engine.current_activity() else { return };
        let count = if a.kind.takes_options() { a.options.len() } else { 0 };
        if count == 0 {
            return;
        }
        let next = match self.option_cursor {
            None => 0,
            Some(i) => i.saturating_add_signed(delta).min(count - 1),
        };
        if let Some(text) = a.option(next) {
            self.input = text.to_string();
            self.option_cursor = Some(next);
        }
    }

    fn show_module_select(&mut self) {
        let total = self.engine.catalog().len();
        self.select_cursor = self.select_cursor.min(total.saturating_sub(1));
        self.screen = Screen::ModuleSelect;
    }

    fn show_activity(&mut self) {
        self.clear_activity_ui();
        self.screen = if self.engine.current_activity().is_some() {
            Screen::Activity
        } else {
            Screen::ModuleSelect
        };
    }

    fn leave_module(&mut self) {
        self.engine.leave_module();
        self.clear_activity_ui();
        self.show_module_select();
    }

    fn clear_activity_ui(&mut self) {
        self.input.clear();
        self.option_cursor = None;
        self.hint.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;
    use crate::sim::engine::NO_HINTS;

    fn session() -> Session {
        Session::new(ProgressionEngine::new(Catalog::builtin()))
    }

    fn type_str(s: &mut Session, text: &str) {
        for c in text.chars() {
            s.apply(Action::Char(c));
        }
    }

    #[test]
    fn title_to_module_select_and_quit() {
        let mut s = session();
        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::ModuleSelect);
        s.apply(Action::Back);
        assert_eq!(s.screen, Screen::Title);
        s.apply(Action::Char('q'));
        assert!(s.quit);
    }

    #[test]
    fn locked_module_is_not_entered() {
        let mut s = session();
        s.apply(Action::Confirm);
        s.apply(Action::Down);
        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::ModuleSelect);
        assert!(s.engine.current_module().is_none());
        assert!(s.message.contains("Locked"));
    }

    #[test]
    fn full_module_unlocks_the_next() {
        let mut s = session();
        s.apply(Action::Confirm); // title
        s.apply(Action::Confirm); // module 0
        assert_eq!(s.screen, Screen::ModuleIntro);
        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::Activity);

        // Multiple choice: first Down highlights "int"
        s.apply(Action::Down);
        assert_eq!(s.input, "int");
        assert_eq!(s.option_cursor, Some(0));
        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::Result { correct: true });
        assert_eq!(s.engine.total_stars(), 1);
        assert_eq!(s.last_award, 1);

        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::Activity);
        type_str(&mut s, " john ");
        let events = s.apply(Action::Confirm);
        assert!(events.contains(&QuizEvent::ModuleUnlocked { index: 1 }));
        assert_eq!(s.message, "Unlocked: Control Flow");

        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::ModuleSelect);
        assert!(s.engine.current_module().is_none());
        assert!(s.engine.is_unlocked(1));
    }

    #[test]
    fn wrong_answer_then_retry_clears_input() {
        let mut s = session();
        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        type_str(&mut s, "float");
        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::Result { correct: false });
        assert_eq!(s.engine.total_stars(), 0);

        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::Activity);
        assert!(s.input.is_empty());
        assert_eq!(s.engine.current_activity_index(), 0);
    }

    const NUMERIC: &str = r#"
        [[modules]]
        title = "Numbers"
        description = ""
        introduction = ""

        [[modules.activities]]
        question = "What is 3 % 2?"
        kind = "multiple_choice"
        options = ["0", "1", "2"]
        correct_answer = "1"
    "#;

    fn at_first_activity(catalog: Catalog) -> Session {
        let mut s = Session::new(ProgressionEngine::new(catalog));
        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::Activity);
        s
    }

    #[test]
    fn digits_are_typed_literally_on_numeric_options() {
        let mut s = at_first_activity(Catalog::from_toml_str(NUMERIC).unwrap());
        s.apply(Action::Char('1'));
        assert_eq!(s.input, "1");
        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::Result { correct: true });

        let mut s = at_first_activity(Catalog::from_toml_str(NUMERIC).unwrap());
        type_str(&mut s, "20");
        assert_eq!(s.input, "20");
        assert_eq!(s.apply(Action::Confirm), vec![QuizEvent::AnswerRejected]);
    }

    #[test]
    fn option_cursor_steps_and_clamps() {
        let mut s = at_first_activity(Catalog::from_toml_str(NUMERIC).unwrap());
        s.apply(Action::Up);
        assert_eq!(s.input, "0");
        s.apply(Action::Down);
        s.apply(Action::Down);
        s.apply(Action::Down);
        assert_eq!(s.input, "2");
        assert_eq!(s.option_cursor, Some(2));
        s.apply(Action::Up);
        assert_eq!(s.input, "1");

        s.apply(Action::Backspace);
        assert_eq!(s.option_cursor, None);
        assert!(s.input.is_empty());
    }

    #[test]
    fn option_cursor_ignored_on_fill_in() {
        let mut s = at_first_activity(Catalog::builtin());
        s.engine.advance_activity();
        s.apply(Action::Down);
        assert!(s.input.is_empty());
        assert_eq!(s.option_cursor, None);
    }

    #[test]
    fn no_award_recorded_when_stars_per_answer_is_zero() {
        let engine = ProgressionEngine::new(Catalog::builtin()).with_stars_per_answer(0);
        let mut s = Session::new(engine);
        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        type_str(&mut s, "int");
        s.apply(Action::Confirm);
        assert_eq!(s.screen, Screen::Result { correct: true });
        assert_eq!(s.last_award, 0);
    }

    #[test]
    fn unknown_module_reports_invalid_reference() {
        let mut s = session();
        s.select_module(7);
        assert_eq!(s.screen, Screen::Title);
        assert!(s.engine.current_module().is_none());
        assert!(!s.message.contains("Locked"));
        let expected = s.engine.select_module(7).unwrap_err().to_string();
        assert_eq!(s.message, expected);
    }

    #[test]
    fn empty_answer_is_not_submitted() {
        let mut s = session();
        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        s.apply(Action::Char(' '));
        assert!(s.apply(Action::Confirm).is_empty());
        assert_eq!(s.screen, Screen::Activity);
    }

    #[test]
    fn hint_comes_from_current_activity() {
        let mut s = session();
        s.request_hint();
        assert_eq!(s.hint, NO_HINTS);

        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        s.apply(Action::Confirm);
        s.apply(Action::Hint);
        let hints = &s.engine.current_activity().unwrap().hints;
        assert!(hints.contains(&s.hint));
    }

    #[test]
    fn message_expires() {
        let mut s = session();
        s.set_message("hello", 2);
        s.tick();
        assert_eq!(s.message, "hello");
        s.tick();
        assert!(s.message.is_empty());
    }
}
