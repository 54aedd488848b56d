use log::{debug, info};
use rand::Rng;

use crate::config::GameConfig;
use crate::snake::{Direction, Position, Snake, Velocity};
use crate::surface::{Color, Cue, Font, Frontend};

const BOARD_BACKGROUND: Color = Color::Yellow;
const SNAKE_COLOR: Color = Color::Black;
const SNAKE_BORDER: Color = Color::White;
const FOOD_COLOR: Color = Color::Green;
const TEXT_COLOR: Color = Color::Black;
const GAME_OVER_FONT: Font = Font { size_px: 50, bold: true };
const GAME_OVER_TEXT: &str = "GAME OVER!";
const BACKGROUND_VOLUME: f32 = 0.1;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Running,
    GameOver,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfBite,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine was not running; nothing happened.
    Idle,
    Moved,
    Ate,
    GameOver(Collision),
}

/// Owns the whole game state and talks to the frontend.
///
/// A tick is one `&mut self` call, so input handled between ticks can never
/// observe a half-applied step.
pub struct GameEngine<F: Frontend, R: Rng> {
    config: GameConfig,
    frontend: F,
    rng: R,
    snake: Snake,
    velocity: Velocity,
    food: Position,
    score: u32,
    phase: Phase,
}

impl<F: Frontend, R: Rng> GameEngine<F, R> {
    pub fn new(config: GameConfig, frontend: F, rng: R) -> Self {
        let snake = Snake::new(config.initial_length, config.unit);
        let velocity = Velocity::towards(Direction::Right, config.unit);
        let food = Position::new(0, 0);
        GameEngine { config, frontend, rng, snake, velocity, food, score: 0, phase: Phase::Ready }
    }

    /// Ready -> Running. Does nothing if a game is already running.
    pub fn start(&mut self) {
        if self.phase == Phase::Running {
            return;
        }

        self.phase = Phase::Running;
        self.frontend.pause(Cue::Die);
        self.frontend.play(Cue::Background);
        self.frontend.set_volume(Cue::Background, BACKGROUND_VOLUME);
        self.show_score();
        self.food = self.spawn_food();
        self.draw_food();

        info!("game started, food at ({}, {})", self.food.x, self.food.y);
    }

    /// Runs one step: clear, draw food, advance, draw snake, check collisions.
    /// The game-over presentation happens on the tick that ends the game and never again.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Idle;
        }

        self.clear_board();
        self.draw_food();
        let ate = self.advance();
        self.draw_snake();

        if let Some(cause) = self.check_game_over() {
            self.phase = Phase::GameOver;
            info!("game over ({:?}), score {}, length {}", cause, self.score, self.snake.len());
            self.display_game_over();
            return TickOutcome::GameOver(cause);
        }

        if ate { TickOutcome::Ate } else { TickOutcome::Moved }
    }

    /// Turns towards `direction` unless that would reverse the current heading.
    /// Returns whether the request was honoured.
    pub fn change_direction(&mut self, direction: Direction) -> bool {
        let heading = self.velocity.direction();
        if direction.is_opposite(heading) {
            debug!("ignoring reversal from {:?} to {:?}", heading, direction);
            return false;
        }

        self.velocity = Velocity::towards(direction, self.config.unit);
        true
    }

    /// Restores start-of-game state and starts again, from any phase.
    pub fn reset(&mut self) {
        info!("reset after {:?} with score {}", self.phase, self.score);

        self.score = 0;
        self.velocity = Velocity::towards(Direction::Right, self.config.unit);
        self.snake = Snake::new(self.config.initial_length, self.config.unit);
        self.phase = Phase::Ready;
        self.start();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    ///////////////////////////////////////////////////////////////////////////

    fn advance(&mut self) -> bool {
        let step = self.snake.advance(self.velocity, self.food);
        if !step.grew() {
            return false;
        }

        self.score += self.config.food_reward;
        self.show_score();
        self.frontend.play(Cue::Eat);
        self.food = self.spawn_food();
        debug!("ate food at ({}, {}), score {}", step.new_head.x, step.new_head.y, self.score);
        true
    }

    fn check_game_over(&self) -> Option<Collision> {
        if self.snake.out_of_bounds(self.config.board_width(), self.config.board_height()) {
            Some(Collision::Wall)
        } else if self.snake.bites_itself() {
            Some(Collision::SelfBite)
        } else {
            None
        }
    }

    /// Uniform over grid cells. The snake's own cells are not excluded.
    fn spawn_food(&mut self) -> Position {
        let unit = self.config.unit;
        let x = self.rng.gen_range(0..self.config.cols) * unit;
        let y = self.rng.gen_range(0..self.config.rows) * unit;
        Position::new(x, y)
    }

    fn show_score(&mut self) {
        let text = format!("Score: {}", self.score);
        self.frontend.set_text(&text);
    }

    fn clear_board(&mut self) {
        let (w, h) = (self.config.board_width(), self.config.board_height());
        self.frontend.set_fill_color(BOARD_BACKGROUND);
        self.frontend.fill_rect(0, 0, w, h);
    }

    fn draw_food(&mut self) {
        let unit = self.config.unit;
        self.frontend.set_fill_color(FOOD_COLOR);
        self.frontend.fill_rect(self.food.x, self.food.y, unit, unit);
    }

    fn draw_snake(&mut self) {
        let unit = self.config.unit;
        self.frontend.set_fill_color(SNAKE_COLOR);
        self.frontend.set_stroke_color(SNAKE_BORDER);
        for pos in self.snake.body() {
            self.frontend.fill_rect(pos.x, pos.y, unit, unit);
            self.frontend.stroke_rect(pos.x, pos.y, unit, unit);
        }
    }

    fn display_game_over(&mut self) {
        self.frontend.pause(Cue::Background);
        self.frontend.play(Cue::Die);
        self.frontend.set_font(GAME_OVER_FONT);
        self.frontend.set_fill_color(TEXT_COLOR);
        let (w, h) = (self.config.board_width(), self.config.board_height());
        self.frontend.fill_text(GAME_OVER_TEXT, w / 2, h / 2);
    }

    #[cfg(test)]
    fn place_food(&mut self, food: Position) {
        self.food = food;
    }

    #[cfg(test)]
    fn place_snake(&mut self, segments: &[Position], direction: Direction) {
        self.snake = Snake::from_segments(segments);
        self.velocity = Velocity::towards(direction, self.config.unit);
    }
}
