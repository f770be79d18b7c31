//! Arena geometry: grid-aligned bounds, the home perimeter and the interior.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A grid-aligned position, in arena units
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance in arena units
    #[inline]
    pub fn manhattan(&self, other: &Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance in arena units
    #[inline]
    pub fn euclidean(&self, other: &Cell) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Cardinal movement direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Uniformly random cardinal direction
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Unit offset; y grows downwards
    #[inline]
    pub fn unit(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// Axis-aligned arena. The perimeter is home; everything else is interior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub step: i32,
}

impl Bounds {
    pub const fn new(left: i32, right: i32, top: i32, bottom: i32, step: i32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
            step,
        }
    }

    /// Check the geometric invariants
    pub fn check(&self) -> Result<(), String> {
        if self.step <= 0 {
            return Err("step must be positive".to_string());
        }
        if self.right <= self.left || self.bottom <= self.top {
            return Err("right must exceed left and bottom must exceed top".to_string());
        }
        if (self.right - self.left) % self.step != 0 || (self.bottom - self.top) % self.step != 0 {
            return Err("width and height must be multiples of step".to_string());
        }
        Ok(())
    }

    /// Number of grid columns, perimeter included
    #[inline]
    pub fn columns(&self) -> usize {
        ((self.right - self.left) / self.step + 1) as usize
    }

    /// Number of grid rows, perimeter included
    #[inline]
    pub fn rows(&self) -> usize {
        ((self.bottom - self.top) / self.step + 1) as usize
    }

    /// Number of non-home cells
    pub fn interior_count(&self) -> usize {
        self.columns().saturating_sub(2) * self.rows().saturating_sub(2)
    }

    /// Whether the cell lies on the home perimeter
    #[inline]
    pub fn is_home(&self, cell: Cell) -> bool {
        cell.x == self.left || cell.x == self.right || cell.y == self.top || cell.y == self.bottom
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        (self.left..=self.right).contains(&cell.x) && (self.top..=self.bottom).contains(&cell.y)
    }

    /// Clamp raw coordinates into the arena
    #[inline]
    pub fn clamp(&self, x: i32, y: i32) -> Cell {
        Cell::new(x.clamp(self.left, self.right), y.clamp(self.top, self.bottom))
    }

    /// Snap a position back onto the grid (floor towards left/top)
    #[inline]
    pub fn align(&self, cell: Cell) -> Cell {
        let x = self.left + (cell.x - self.left).div_euclid(self.step) * self.step;
        let y = self.top + (cell.y - self.top).div_euclid(self.step) * self.step;
        self.clamp(x, y)
    }

    /// Move by `(dx, dy)` grid steps, clamped and re-aligned
    #[inline]
    pub fn offset(&self, from: Cell, dx: i32, dy: i32) -> Cell {
        self.align(self.clamp(from.x + dx * self.step, from.y + dy * self.step))
    }

    /// Manhattan distance measured in grid cells
    #[inline]
    pub fn cell_distance(&self, a: Cell, b: Cell) -> u32 {
        (a.manhattan(&b) / self.step) as u32
    }

    /// Random position on the home perimeter: pick a side, then a cell on it
    pub fn random_border_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
        match rng.gen_range(0..4) {
            0 => Cell::new(self.left, self.top + rng.gen_range(0..self.rows() as i32) * self.step),
            1 => Cell::new(self.right, self.top + rng.gen_range(0..self.rows() as i32) * self.step),
            2 => Cell::new(self.left + rng.gen_range(0..self.columns() as i32) * self.step, self.top),
            _ => Cell::new(
                self.left + rng.gen_range(0..self.columns() as i32) * self.step,
                self.bottom,
            ),
        }
    }

    /// All interior cells, column-major
    pub fn interior_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let step = self.step as usize;
        (self.left + self.step..self.right)
            .step_by(step)
            .flat_map(move |x| {
                (self.top + self.step..self.bottom)
                    .step_by(step)
                    .map(move |y| Cell::new(x, y))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn bounds() -> Bounds {
        Bounds::new(0, 100, 0, 80, 20)
    }

    #[test]
    fn test_dimensions() {
        let b = bounds();
        assert!(b.check().is_ok());
        assert_eq!(b.columns(), 6);
        assert_eq!(b.rows(), 5);
        assert_eq!(b.interior_count(), 12);
        assert_eq!(b.interior_cells().count(), 12);
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(Bounds::new(0, 0, 0, 80, 20).check().is_err());
        assert!(Bounds::new(0, 100, 0, 90, 20).check().is_err());
        assert!(Bounds::new(0, 100, 0, 80, 0).check().is_err());
    }

    #[test]
    fn test_home_perimeter() {
        let b = bounds();
        assert!(b.is_home(Cell::new(0, 40)));
        assert!(b.is_home(Cell::new(100, 40)));
        assert!(b.is_home(Cell::new(40, 0)));
        assert!(b.is_home(Cell::new(40, 80)));
        assert!(!b.is_home(Cell::new(40, 40)));
        assert!(b.interior_cells().all(|c| !b.is_home(c)));
    }

    #[test]
    fn test_clamp_and_align() {
        let b = bounds();
        assert_eq!(b.clamp(-20, 100), Cell::new(0, 80));
        assert_eq!(b.align(Cell::new(47, 33)), Cell::new(40, 20));
        assert_eq!(b.offset(Cell::new(0, 0), -1, 0), Cell::new(0, 0));
        assert_eq!(b.offset(Cell::new(20, 20), 1, 0), Cell::new(40, 20));
    }

    #[test]
    fn test_random_border_cell_on_perimeter() {
        let b = bounds();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let cell = b.random_border_cell(&mut rng);
            assert!(b.contains(cell));
            assert!(b.is_home(cell));
            assert_eq!(b.align(cell), cell);
        }
    }

    #[test]
    fn test_distances() {
        let b = bounds();
        let a = Cell::new(20, 20);
        let c = Cell::new(60, 40);
        assert_eq!(a.manhattan(&c), 60);
        assert_eq!(b.cell_distance(a, c), 3);
        assert!((Cell::new(0, 0).euclidean(&Cell::new(30, 40)) - 50.0).abs() < 1e-4);
    }
}
