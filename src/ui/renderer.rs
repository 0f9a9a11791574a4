/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Reads the session; never mutates it.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::activity::Activity;
use crate::sim::session::{Screen, Session};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 18, g: 22, b: 38 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell, so every position is diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::Black, bg));
        }
    }
}

// ── Palette ──

const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 230, b: 120 };
const RED: Color = Color::Rgb { r: 255, g: 90, b: 90 };
const CYAN: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const DIM: Color = Color::DarkGrey;
const CURSOR_BG: Color = Color::Rgb { r: 30, g: 60, b: 40 };
const BAR_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

const LEFT: usize = 4;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, s: &Session) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }

        if self.last_screen != Some(s.screen) {
            self.invalidate()?;
            self.last_screen = Some(s.screen);
        }

        self.front.clear();
        self.compose_header(s);
        match s.screen {
            Screen::Title => self.compose_title(),
            Screen::ModuleSelect => self.compose_module_select(s),
            Screen::ModuleIntro => self.compose_intro(s),
            Screen::Activity => self.compose_activity(s),
            Screen::Result { correct } => {
                self.compose_activity(s);
                self.compose_result(correct, s.last_award);
            }
        }
        self.compose_message(s);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x = 0;
        let mut last_y = 0;

        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_header(&mut self, s: &Session) {
        let stars = format!("Stars: {}", s.engine.total_stars());
        self.front.put_str(LEFT, 0, "CodeUp", GOLD, Color::Reset);
        let sx = self.front.width.saturating_sub(stars.len() + LEFT);
        self.front.put_str(sx, 0, &stars, GOLD, Color::Reset);
    }

    fn compose_title(&mut self) {
        let title = [
            r"   ___           _        _   _       ",
            r"  / __| ___   __| | ___  | | | | _ __ ",
            r" | (__ / _ \ / _` |/ -_) | |_| || '_ \",
            r"  \___|\___/ \__,_|\___|  \___/ | .__/",
            r"                                |_|   ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(LEFT, 2 + i, line, GOLD, Color::Reset);
        }
        self.front.put_str(LEFT, 8, "Learn to code, one star at a time.", GREEN, Color::Reset);
        self.front.put_str(LEFT + 4, 11, "ENTER   Start", GREEN, Color::Reset);
        self.front.put_str(LEFT + 4, 12, "  Q     Quit", Color::White, Color::Reset);
    }

    fn compose_module_select(&mut self, s: &Session) {
        self.front.put_str(LEFT, 2, "SELECT A MODULE", GOLD, Color::Reset);

        let stars = s.engine.total_stars();
        let list_top = 4;
        for (idx, m) in s.engine.catalog().modules().iter().enumerate() {
            let row = list_top + idx * 2;
            if row + 1 >= self.front.height { break; }

            let unlocked = m.is_unlocked(stars);
            let selected = idx == s.select_cursor;
            let bg = if selected { CURSOR_BG } else { Color::Reset };
            if selected {
                for x in 0..self.front.width.min(64) {
                    self.front.set(x, row, Cell::new(' ', Color::White, CURSOR_BG));
                }
                let blink = (s.anim_tick / 8) % 2 == 0;
                self.front.put_str(LEFT - 2, row, if blink { ">" } else { " " }, GREEN, bg);
            }

            let (fg, tag) = if unlocked {
                (Color::White, String::new())
            } else {
                (DIM, format!("  [locked: {} stars]", m.stars_required))
            };
            let line = format!("{}. {}{}", idx + 1, m.title, tag);
            self.front.put_str(LEFT, row, &line, fg, bg);
            self.front.put_str(LEFT + 3, row + 1, &m.description, DIM, Color::Reset);
        }

        let footer = self.front.height.saturating_sub(3);
        self.front.put_str(LEFT, footer, "ENTER: Open   Up/Down: Select   ESC: Back", DIM, Color::Reset);
    }

    fn compose_intro(&mut self, s: &Session) {
        let Some(m) = s.engine.current_module() else { return };
        self.front.put_str(LEFT, 2, &m.title, GOLD, Color::Reset);

        let width = self.front.width.saturating_sub(LEFT * 2).max(20);
        let mut row = 4;
        for line in wrap(&m.introduction, width) {
            self.front.put_str(LEFT, row, &line, Color::White, Color::Reset);
            row += 1;
        }
        if !m.example_code.is_empty() {
            row += 1;
            for line in &m.example_code {
                self.front.put_str(LEFT + 2, row, line, CYAN, Color::Reset);
                row += 1;
            }
        }
        let count = format!("{} activities", m.activities.len());
        self.front.put_str(LEFT, row + 1, &count, DIM, Color::Reset);

        let footer = self.front.height.saturating_sub(3);
        self.front.put_str(LEFT, footer, "ENTER: Begin   ESC: Back", DIM, Color::Reset);
    }

    fn compose_activity(&mut self, s: &Session) {
        let (Some(m), Some(a)) = (s.engine.current_module(), s.engine.current_activity()) else {
            return;
        };
        let progress = format!(
            "{}  -  {} of {}  ({})",
            m.title,
            s.engine.current_activity_index() + 1,
            m.activities.len(),
            a.kind.label()
        );
        self.front.put_str(LEFT, 2, &progress, DIM, Color::Reset);

        let width = self.front.width.saturating_sub(LEFT * 2).max(20);
        let mut row = 4;
        for line in wrap(&a.question, width) {
            self.front.put_str(LEFT, row, &line, Color::White, Color::Reset);
            row += 1;
        }
        row = self.compose_options(a, s.option_cursor, row + 1);

        let answer = format!("Answer: {}_", s.input);
        self.front.put_str(LEFT, row + 1, &answer, GREEN, Color::Reset);

        if !s.hint.is_empty() {
            let hint = format!("Hint: {}", s.hint);
            self.front.put_str(LEFT, row + 3, &hint, CYAN, Color::Reset);
        }

        let footer = self.front.height.saturating_sub(3);
        self.front.put_str(
            LEFT, footer,
            "ENTER: Submit   Up/Down: Option   TAB: Hint   PgUp: Previous   ESC: Modules",
            DIM, Color::Reset,
        );
    }

    fn compose_options(&mut self, a: &Activity, cursor: Option<usize>, mut row: usize) -> usize {
        for (i, opt) in a.options.iter().enumerate() {
            let picked = cursor == Some(i);
            let (mark, bg) = if picked { (">", CURSOR_BG) } else { (" ", Color::Reset) };
            let line = format!("{mark} {opt}");
            self.front.put_str(LEFT + 1, row, &line, Color::White, bg);
            row += 1;
        }
        row
    }

    fn compose_result(&mut self, correct: bool, award: u32) {
        let row = self.front.height.saturating_sub(6);
        let (text, fg, keys) = if correct {
            (result_text(award), GREEN, "ENTER: Next   ESC: Modules")
        } else {
            ("Try again!".to_string(), RED, "ENTER: Retry")
        };
        self.front.put_str(LEFT, row, &text, fg, Color::Reset);
        self.front.put_str(LEFT, row + 1, keys, DIM, Color::Reset);
    }

    fn compose_message(&mut self, s: &Session) {
        if s.message.is_empty() { return; }
        let row = self.front.height.saturating_sub(1);
        self.front.fill_row(row, BAR_BG);
        let msg = format!(" * {} ", s.message);
        self.front.put_str(0, row, &msg, Color::Black, BAR_BG);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn result_text(award: u32) -> String {
    match award {
        0 => "Correct!".to_string(),
        1 => "Correct! +1 star".to_string(),
        n => format!("Correct! +{n} stars"),
    }
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = vec![];
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
