use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::event::{Event, KeyEvent, poll, read};
use crossterm::style::Attribute;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use log::{debug, warn};

use crate::config::GameConfig;
use crate::surface::{Audio, Color, Cue, Font, ScoreDisplay, Surface};

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

/// Characters per board cell; terminal cells are about twice as tall as wide.
const CELL_CHARS: i32 = 2;
const BELL: char = '\x07';
/// Fonts at least this large are drawn bold.
const LARGE_FONT_PX: u16 = 24;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Cell {
    glyph: [char; 2],
    fg: Color,
    bg: Color,
    bold: bool,
}

impl Cell {
    fn blank(color: Color) -> Self {
        Cell { glyph: [' ', ' '], fg: color, bg: color, bold: false }
    }
}

/// A crossterm frontend: draws the board into a cell buffer, shows the score
/// on a status line under it and rings the bell for one-shot cues.
///
/// Nothing reaches the terminal until `present` is called, and then only
/// the cells that changed since the last call.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    origin: Coords,
    cols: i32,
    rows: i32,
    unit: i32,
    cells: Vec<Cell>,
    shown: Vec<Option<Cell>>,
    fill: Color,
    stroke: Color,
    font: Font,
    score: String,
    hint: String,
    bell: bool,
    showing_msg: bool,
}

impl TermManager {
    pub fn new(config: &GameConfig, bell: bool) -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        Self::with_size(config, width, height, bell)
    }

    fn with_size(config: &GameConfig, width: TermInt, height: TermInt, bell: bool) -> Result<Self> {
        config.validate()?;

        let frame_w = config.cols * CELL_CHARS + 2;
        let frame_h = config.rows + 3;
        ensure!(
            frame_w <= width as i32 && frame_h <= height as i32,
            "a {}x{} board needs a terminal of at least {}x{}, this one is {}x{}",
            config.cols, config.rows, frame_w, frame_h, width, height
        );

        let origin = (((width as i32 - frame_w) / 2) as TermInt, ((height as i32 - frame_h) / 2) as TermInt);
        let n = (config.cols * config.rows) as usize;

        Ok(TermManager {
            width,
            height,
            stdout: stdout(),
            origin,
            cols: config.cols,
            rows: config.rows,
            unit: config.unit,
            cells: vec![Cell::blank(Color::Black); n],
            shown: vec![None; n],
            fill: Color::Black,
            stroke: Color::Black,
            font: Font { size_px: 10, bold: false },
            score: String::new(),
            hint: String::new(),
            bell,
            showing_msg: false,
        })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error setting raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("Error hiding cursor")?;
        Ok(())
    }

    /// Undoes `setup`. Every step is attempted even if an earlier one fails,
    /// so this is also safe after a `setup` that stopped part-way.
    pub fn restore(&mut self) -> Result<()> {
        let raw = terminal::disable_raw_mode().context("Error leaving raw mode");
        let screen = execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Error leaving alt screen");
        raw.and(screen)
    }

    pub fn read_key_blocking(&self) -> io::Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    /// Waits up to `timeout` for input, then drains whatever else is already queued.
    pub fn read_key_events(&self, timeout: Duration) -> io::Result<Vec<KeyEvent>> {
        let mut events = vec![];

        if !poll(timeout)? {
            return Ok(events);
        }

        while poll(Duration::ZERO)? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    pub fn set_hint(&mut self, hint: &str) {
        self.hint = hint.to_string();
    }

    /// Wipes the screen, draws the frame and forces a full repaint on the next `present`.
    pub fn clear(&mut self) -> io::Result<()> {
        queue!(self.stdout, style::ResetColor, terminal::Clear(ClearType::All))?;
        self.draw_borders()?;
        self.shown.iter_mut().for_each(|c| *c = None);
        self.stdout.flush()
    }

    pub fn present(&mut self) -> io::Result<()> {
        let (ox, oy) = self.origin;

        for (i, cell) in self.cells.iter().enumerate() {
            if self.shown[i] == Some(*cell) {
                continue;
            }

            let col = (i as i32 % self.cols) as TermInt;
            let row = (i as i32 / self.cols) as TermInt;
            let attr = if cell.bold { Attribute::Bold } else { Attribute::NormalIntensity };
            let glyph: String = cell.glyph.iter().collect();

            queue!(
                self.stdout,
                cursor::MoveTo(ox + 1 + col * CELL_CHARS as TermInt, oy + 1 + row),
                style::SetForegroundColor(term_color(cell.fg)),
                style::SetBackgroundColor(term_color(cell.bg)),
                style::SetAttribute(attr),
                style::Print(glyph)
            )?;
            self.shown[i] = Some(*cell);
        }

        let frame_w = (self.cols * CELL_CHARS + 2) as usize;
        let status = format!("{}  {}", self.score, self.hint);
        queue!(
            self.stdout,
            style::ResetColor,
            style::SetAttribute(Attribute::Reset),
            cursor::MoveTo(ox, oy + self.rows as TermInt + 2),
            style::Print(format!("{status:<width$}", status = status, width = frame_w))
        )?;

        self.stdout.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> io::Result<()> {
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        queue!(self.stdout, style::ResetColor, style::SetAttribute(Attribute::Reset))?;

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1] {
            queue!(self.stdout, cursor::MoveTo(top_left.0, y), style::Print(" ".repeat(msg_width as usize)))?;
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            queue!(self.stdout, cursor::MoveTo(top_left.0, y), style::Print(padded_line))?;
        }

        self.showing_msg = true;
        self.stdout.flush()
    }

    /// The board underneath is repainted from the buffer on the next `present`.
    pub fn hide_message(&mut self) -> io::Result<()> {
        if std::mem::take(&mut self.showing_msg) {
            self.clear()?;
        }
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_borders(&mut self) -> io::Result<()> {
        let (ox, oy) = self.origin;
        let width = (self.cols * CELL_CHARS + 2) as TermInt;
        let height = self.rows as TermInt + 2;

        let horizontal = format!("+{}+", "-".repeat(width as usize - 2));
        queue!(self.stdout, cursor::MoveTo(ox, oy), style::Print(&horizontal))?;
        queue!(self.stdout, cursor::MoveTo(ox, oy + height - 1), style::Print(&horizontal))?;

        for y in 1..height - 1 {
            queue!(self.stdout, cursor::MoveTo(ox, oy + y), style::Print('|'))?;
            queue!(self.stdout, cursor::MoveTo(ox + width - 1, oy + y), style::Print('|'))?;
        }

        Ok(())
    }

    /// Board cells covered by a rectangle in board units, clipped to the board.
    fn covered(&self, x: i32, y: i32, w: i32, h: i32) -> (std::ops::Range<i32>, std::ops::Range<i32>) {
        let u = self.unit;
        let c0 = x.div_euclid(u).max(0);
        let c1 = (x + w + u - 1).div_euclid(u).min(self.cols);
        let r0 = y.div_euclid(u).max(0);
        let r1 = (y + h + u - 1).div_euclid(u).min(self.rows);
        (c0..c1.max(c0), r0..r1.max(r0))
    }

    fn cell_mut(&mut self, col: i32, row: i32) -> &mut Cell {
        &mut self.cells[(row * self.cols + col) as usize]
    }
}

impl Surface for TermManager {
    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let (cols, rows) = self.covered(x, y, w, h);
        let fill = self.fill;
        for row in rows {
            for col in cols.clone() {
                *self.cell_mut(col, row) = Cell::blank(fill);
            }
        }
    }

    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let (cols, rows) = self.covered(x, y, w, h);
        let stroke = self.stroke;
        for row in rows.clone() {
            for col in cols.clone() {
                let edge = row == rows.start || row == rows.end - 1 || col == cols.start || col == cols.end - 1;
                if edge {
                    let cell = self.cell_mut(col, row);
                    cell.glyph = ['[', ']'];
                    cell.fg = stroke;
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32) {
        let row = y.div_euclid(self.unit);
        if !(0..self.rows).contains(&row) {
            return;
        }

        // Rounded, so a centre that was already truncated to whole units
        // (odd board widths) still lands on the middle character.
        let centre = (2 * x * CELL_CHARS + self.unit).div_euclid(2 * self.unit);
        let len = text.chars().count() as i32;
        let start = centre - len / 2;
        let fill = self.fill;
        let bold = self.font.bold || self.font.size_px >= LARGE_FONT_PX;

        for (i, ch) in text.chars().enumerate() {
            let pos = start + i as i32;
            let col = pos.div_euclid(CELL_CHARS);
            if !(0..self.cols).contains(&col) {
                continue;
            }
            let cell = self.cell_mut(col, row);
            cell.glyph[pos.rem_euclid(CELL_CHARS) as usize] = ch;
            cell.fg = fill;
            cell.bold = bold;
        }
    }
}

impl ScoreDisplay for TermManager {
    fn set_text(&mut self, text: &str) {
        self.score = text.to_string();
    }
}

impl Audio for TermManager {
    fn play(&mut self, cue: Cue) {
        match cue {
            Cue::Background => debug!("background track on"),
            Cue::Eat | Cue::Die if self.bell => {
                if let Err(e) = queue!(self.stdout, style::Print(BELL)) {
                    warn!("could not ring the bell: {}", e);
                }
            }
            Cue::Eat | Cue::Die => {}
        }
    }

    fn pause(&mut self, cue: Cue) {
        if cue == Cue::Background {
            debug!("background track off");
        }
    }

    fn set_volume(&mut self, cue: Cue, volume: f32) {
        debug!("volume of {:?} set to {}", cue, volume);
    }
}

fn term_color(color: Color) -> style::Color {
    match color {
        Color::Yellow => style::Color::DarkYellow,
        Color::Black => style::Color::Black,
        Color::White => style::Color::White,
        Color::Green => style::Color::Green,
    }
}
