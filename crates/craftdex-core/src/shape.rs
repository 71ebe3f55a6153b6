//! Crafting grids and shape normalization.
//!
//! This module provides:
//! - The fixed 3x3 `Grid` used for raw item-id grids and rendered shapes
//! - Grid intake from flat cell lists and ragged row lists
//! - `NormalizedShape`, the tight bounding box of a grid's non-empty cells
//! - `normalize`, which trims all-empty border rows and columns

use craftdex_common::{CraftdexError, CraftdexResult, ItemId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rows and columns in a crafting grid.
pub const GRID_SIZE: usize = 3;

/// Cells in a crafting grid.
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

// ============================================================================
// Grid
// ============================================================================

/// Fixed 3x3 grid, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid<T> {
    rows: [[T; GRID_SIZE]; GRID_SIZE],
}

impl<T> Grid<T> {
    /// Borrow the rows.
    #[must_use]
    pub const fn rows(&self) -> &[[T; GRID_SIZE]; GRID_SIZE] {
        &self.rows
    }

    /// Get the cell at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterate cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().flatten()
    }

    /// Build a new grid by applying `f` to every cell.
    pub fn map<U, F>(&self, mut f: F) -> Grid<U>
    where
        F: FnMut(&T) -> U,
    {
        Grid {
            rows: std::array::from_fn(|r| std::array::from_fn(|c| f(&self.rows[r][c]))),
        }
    }
}

impl Grid<ItemId> {
    /// A grid with every slot empty.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            rows: [[ItemId::EMPTY; GRID_SIZE]; GRID_SIZE],
        }
    }

    /// Build a grid from a flat, row-major list of raw item ids.
    ///
    /// Lists of 3 or 6 cells are padded with empty slots. Anything that
    /// cannot form at most three rows of three is rejected.
    pub fn from_flat(cells: &[u32]) -> Result<Self, ValidationError> {
        if cells.is_empty() {
            return Err(ValidationError::MissingQuery);
        }
        if cells.len() % GRID_SIZE != 0 || cells.len() > GRID_CELLS {
            return Err(ValidationError::MalformedGrid { len: cells.len() });
        }

        let mut grid = Self::empty();
        for (idx, &raw) in cells.iter().enumerate() {
            grid.rows[idx / GRID_SIZE][idx % GRID_SIZE] = ItemId::new(raw);
        }
        Ok(grid)
    }

    /// Build a grid from ragged rows of at most 3x3, padding missing cells
    /// with empty slots.
    pub fn from_rows(rows: &[Vec<u32>]) -> CraftdexResult<Self> {
        if rows.len() > GRID_SIZE || rows.iter().any(|r| r.len() > GRID_SIZE) {
            return Err(CraftdexError::Invariant(format!(
                "shape with {} rows exceeds {GRID_SIZE}x{GRID_SIZE}",
                rows.len()
            )));
        }

        let mut grid = Self::empty();
        for (r, row) in rows.iter().enumerate() {
            for (c, &raw) in row.iter().enumerate() {
                grid.rows[r][c] = ItemId::new(raw);
            }
        }
        Ok(grid)
    }

    /// Check if every slot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().all(|id| id.is_empty())
    }

    /// Flatten into raw ids, row-major.
    #[must_use]
    pub fn to_flat(&self) -> [u32; GRID_CELLS] {
        std::array::from_fn(|idx| self.rows[idx / GRID_SIZE][idx % GRID_SIZE].raw())
    }
}

impl Default for Grid<ItemId> {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Normalized shapes
// ============================================================================

/// A rectangular matrix of item ids trimmed to its non-empty bounding box.
///
/// An all-empty input normalizes to the single cell `[[0]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedShape {
    width: u8,
    height: u8,
    /// Cells in row-major order.
    cells: Vec<ItemId>,
}

impl NormalizedShape {
    /// The `[[0]]` shape produced by an empty grid.
    #[must_use]
    pub fn degenerate() -> Self {
        Self {
            width: 1,
            height: 1,
            cells: vec![ItemId::EMPTY],
        }
    }

    /// Shape width in columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    /// Shape height in rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    /// Get the cell at `(row, col)`. Out-of-range cells read as empty.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> ItemId {
        if row < self.height() && col < self.width() {
            self.cells[row * self.width() + col]
        } else {
            ItemId::EMPTY
        }
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[ItemId]> {
        self.cells.chunks(self.width())
    }

    /// Check if this is the `[[0]]` shape.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.cells.len() == 1 && self.cells[0].is_empty()
    }

    /// Copy out as nested rows of item ids.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<ItemId>> {
        self.rows().map(<[ItemId]>::to_vec).collect()
    }
}

impl fmt::Display for NormalizedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                f.write_str(";")?;
            }
            for (c, id) in row.iter().enumerate() {
                if c > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{id}")?;
            }
        }
        Ok(())
    }
}

/// Trim a 3x3 grid to the bounding box of its non-empty cells.
#[must_use]
pub fn normalize(grid: &Grid<ItemId>) -> NormalizedShape {
    trim(GRID_SIZE, GRID_SIZE, |r, c| grid.rows[r][c])
}

/// Trim an arbitrary rectangular matrix to the bounding box of its non-empty
/// cells.
///
/// Non-rectangular input breaks the caller contract and is rejected.
pub fn normalize_rows(rows: &[Vec<ItemId>]) -> CraftdexResult<NormalizedShape> {
    let width = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().position(|r| r.len() != width) {
        return Err(CraftdexError::Invariant(format!(
            "row {bad} has {} cells, expected {width}",
            rows[bad].len()
        )));
    }
    if rows.len() > usize::from(u8::MAX) || width > usize::from(u8::MAX) {
        return Err(CraftdexError::Invariant(format!(
            "shape of {}x{width} is too large",
            rows.len()
        )));
    }
    Ok(trim(rows.len(), width, |r, c| rows[r][c]))
}

fn trim<F>(height: usize, width: usize, cell: F) -> NormalizedShape
where
    F: Fn(usize, usize) -> ItemId,
{
    let row_empty = |r: usize| (0..width).all(|c| cell(r, c).is_empty());

    let mut top = 0;
    let mut bottom = height;
    while top < bottom && row_empty(top) {
        top += 1;
    }
    while top < bottom && row_empty(bottom - 1) {
        bottom -= 1;
    }

    let col_empty = |c: usize| (top..bottom).all(|r| cell(r, c).is_empty());

    let mut left = 0;
    let mut right = width;
    while left < right && col_empty(left) {
        left += 1;
    }
    while left < right && col_empty(right - 1) {
        right -= 1;
    }

    if top >= bottom || left >= right {
        return NormalizedShape::degenerate();
    }

    let mut cells = Vec::with_capacity((bottom - top) * (right - left));
    for r in top..bottom {
        for c in left..right {
            cells.push(cell(r, c));
        }
    }

    NormalizedShape {
        width: (right - left) as u8,
        height: (bottom - top) as u8,
        cells,
    }
}
