//! Daily food field.

use crate::arena::{Bounds, Cell};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of interior cells holding one unit of food each
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FoodField {
    cells: BTreeSet<Cell>,
    /// Cells placed when the field was generated
    placed: usize,
}

impl FoodField {
    /// Number of food cells for a given coverage, capped at the interior size
    pub fn target_count(bounds: &Bounds, percent: u32) -> usize {
        let interior = bounds.interior_count();
        let wanted = (interior as f64 * percent as f64 / 100.0).round() as usize;
        wanted.min(interior)
    }

    /// Sample a fresh field with no memory of earlier layouts
    pub fn generate<R: Rng + ?Sized>(bounds: &Bounds, percent: u32, rng: &mut R) -> Self {
        let candidates: Vec<Cell> = bounds.interior_cells().collect();
        let count = Self::target_count(bounds, percent);
        let cells: BTreeSet<Cell> = candidates.choose_multiple(rng, count).copied().collect();

        Self {
            placed: cells.len(),
            cells,
        }
    }

    /// Field with an explicit layout
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        Self {
            placed: cells.len(),
            cells,
        }
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Remove food from a cell; false if there was none
    #[inline]
    pub fn consume(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    /// Remaining food cells
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Food placed at generation time
    #[inline]
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Remaining food cells in sorted order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
}
