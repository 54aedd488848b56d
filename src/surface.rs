//! The sinks the engine draws, scores and plays sounds into.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Color {
    Yellow,
    Black,
    White,
    Green,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Font {
    pub size_px: u16,
    pub bold: bool,
}

/// A 2D drawing surface addressed in board units.
pub trait Surface {
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_font(&mut self, font: Font);
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32);
    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32);
    /// Draws `text` horizontally centred on `x`.
    fn fill_text(&mut self, text: &str, x: i32, y: i32);
}

pub trait ScoreDisplay {
    fn set_text(&mut self, text: &str);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cue {
    Background,
    Eat,
    Die,
}

/// Fire-and-forget sound cues.
pub trait Audio {
    fn play(&mut self, cue: Cue);
    fn pause(&mut self, cue: Cue);
    fn set_volume(&mut self, cue: Cue, volume: f32);
}

pub trait Frontend: Surface + ScoreDisplay + Audio {}

impl<T: Surface + ScoreDisplay + Audio> Frontend for T {}
