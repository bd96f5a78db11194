//! Bounded 2D grid shared by the terrain and ownership layers.

use comm_core::{Direction, Position};
use serde::{Deserialize, Serialize};

/// A fixed-size, non-wrapping 2D grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    pub width: i32,
    pub height: i32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![fill; size],
        }
    }
}

impl<T> Grid<T> {
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    /// Get the cell at a position, `None` when off the grid
    pub fn get(&self, pos: Position) -> Option<&T> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    /// Set the cell at a position; returns false when off the grid
    pub fn set(&mut self, pos: Position, value: T) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Whether the position lies on the outermost ring
    pub fn is_perimeter(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0 || pos.y == 0 || pos.x == self.width - 1 || pos.y == self.height - 1)
    }

    /// The in-bounds members of the 8-neighbourhood of `pos`
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::all()
            .into_iter()
            .map(move |d| pos.step(d))
            .filter(move |p| self.in_bounds(*p))
    }

    /// The in-bounds members of the 3x3 block centred on `pos`, including `pos`
    pub fn neighborhood(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        (-1..=1)
            .flat_map(move |dy| (-1..=1).map(move |dx| pos.add(dx, dy)))
            .filter(move |p| self.in_bounds(*p))
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }

    /// Iterator over all positions, row-major
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), cell))
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
