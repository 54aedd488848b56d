use std::collections::VecDeque;

use Direction::*;

/// One grid cell, in board units. Both coordinates are multiples of the unit size.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn offset(self, velocity: Velocity) -> Self {
        Position { x: self.x + velocity.dx, y: self.y + velocity.dy }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    /// Conventional keyboard codes: 37 left, 38 up, 39 right, 40 down.
    #[cfg(test)]
    fn from_key_code(code: u32) -> Option<Direction> {
        match code {
            37 => Some(Left),
            38 => Some(Up),
            39 => Some(Right),
            40 => Some(Down),
            _ => None,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Left, Right) | (Right, Left))
    }
}

/// Per-tick displacement. Exactly one component is nonzero and its magnitude is one unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Velocity {
    pub dx: i32,
    pub dy: i32,
}

impl Velocity {
    pub fn towards(direction: Direction, unit: i32) -> Self {
        let (dx, dy) = match direction {
            Left => (-unit, 0),
            Up => (0, -unit),
            Right => (unit, 0),
            Down => (0, unit),
        };
        Velocity { dx, dy }
    }

    pub fn direction(self) -> Direction {
        match (self.dx.signum(), self.dy.signum()) {
            (-1, 0) => Left,
            (1, 0) => Right,
            (0, -1) => Up,
            _ => Down,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MoveResult {
    pub new_head: Position,
    /// `None` when the snake grew this step.
    pub old_tail: Option<Position>,
}

impl MoveResult {
    pub fn grew(&self) -> bool {
        self.old_tail.is_none()
    }
}

/// Segments are stored head-first.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// A horizontal line along the top row, head on the right: `(len-1)*unit, 0` down to `0, 0`.
    pub fn new(len: usize, unit: i32) -> Self {
        let body = (0..len as i32).rev()
            .map(|i| Position::new(i * unit, 0))
            .collect();
        Snake { body }
    }

    #[cfg(test)]
    pub fn from_segments(segments: &[Position]) -> Self {
        assert!(!segments.is_empty(), "a snake needs at least one segment");
        Snake { body: segments.iter().copied().collect() }
    }

    pub fn body(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Prepends the next head and keeps the tail only when that head lands on `food`.
    /// Bounds and self-intersection are not checked here.
    pub fn advance(&mut self, velocity: Velocity, food: Position) -> MoveResult {
        let new_head = self.head().offset(velocity);
        self.body.push_front(new_head);

        let old_tail = if new_head == food { None } else { self.body.pop_back() };
        MoveResult { new_head, old_tail }
    }

    pub fn out_of_bounds(&self, width: i32, height: i32) -> bool {
        let head = self.head();
        head.x < 0 || head.x >= width || head.y < 0 || head.y >= height
    }

    pub fn bites_itself(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|pos| *pos == head)
    }
}
