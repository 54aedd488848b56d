use anyhow::{ensure, Result};

/// Largest board side, in cells. Keeps every board and terminal coordinate
/// well inside `i32` and `u16`.
pub const MAX_BOARD_CELLS: i32 = 1000;
/// Largest unit size; with `MAX_BOARD_CELLS` the board stays under `i32::MAX` units.
pub const MAX_UNIT: i32 = 1 << 16;

/// Board geometry and pacing for one game.
///
/// Positions on the board are measured in board units: every cell is
/// `unit` units wide and tall, and the board is `cols * unit` by
/// `rows * unit` units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub cols: i32,
    pub rows: i32,
    pub unit: i32,
    pub tick_ms: u64,
    pub food_reward: u32,
    pub initial_length: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            cols: 20,
            rows: 20,
            unit: 25,
            tick_ms: 80,
            food_reward: 5,
            initial_length: 5,
        }
    }
}

impl GameConfig {
    pub fn new(cols: i32, rows: i32) -> Self {
        GameConfig { cols, rows, ..Default::default() }
    }

    pub fn board_width(&self) -> i32 {
        self.cols * self.unit
    }

    pub fn board_height(&self) -> i32 {
        self.rows * self.unit
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.unit > 0 && self.unit <= MAX_UNIT,
            "unit size must be between 1 and {}, got {}", MAX_UNIT, self.unit
        );
        ensure!(self.cols > 0 && self.rows > 0, "board must be at least 1x1, got {}x{}", self.cols, self.rows);
        ensure!(
            self.cols <= MAX_BOARD_CELLS && self.rows <= MAX_BOARD_CELLS,
            "board can be at most {}x{} cells, got {}x{}",
            MAX_BOARD_CELLS, MAX_BOARD_CELLS, self.cols, self.rows
        );
        ensure!(self.tick_ms > 0, "tick interval must be positive");
        ensure!(self.initial_length > 0, "snake needs at least one segment");
        ensure!(
            self.initial_length as i32 <= self.cols,
            "a {}-segment snake does not fit on a board {} cells wide",
            self.initial_length, self.cols
        );
        Ok(())
    }
}
