use crate::color::Rgb;

pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

/// Grid coordinates of a piece's top-left cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub col: i32,
    pub row: i32,
}

impl Position {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn offset(self, dcol: i32, drow: i32) -> Self {
        Self::new(self.col + dcol, self.row + drow)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(Rgb),
}

impl CellState {
    pub fn is_filled(&self) -> bool {
        matches!(self, CellState::Filled(_))
    }
}

/// Settled cells, stored column-major: `cells[column][row]`, row 0 on top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    cells: [[CellState; GRID_HEIGHT]; GRID_WIDTH],
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: [[CellState::Empty; GRID_HEIGHT]; GRID_WIDTH],
        }
    }

    pub fn width(&self) -> usize {
        GRID_WIDTH
    }

    pub fn height(&self) -> usize {
        GRID_HEIGHT
    }

    fn in_bounds(col: i32, row: i32) -> bool {
        (0..GRID_WIDTH as i32).contains(&col) && (0..GRID_HEIGHT as i32).contains(&row)
    }

    /// `None` outside the grid.
    pub fn get(&self, col: i32, row: i32) -> Option<CellState> {
        Self::in_bounds(col, row).then(|| self.cells[col as usize][row as usize])
    }

    /// Returns false (and writes nothing) outside the grid.
    pub fn set(&mut self, col: i32, row: i32, cell: CellState) -> bool {
        if !Self::in_bounds(col, row) {
            return false;
        }
        self.cells[col as usize][row as usize] = cell;
        true
    }

    pub fn is_occupied(&self, col: i32, row: i32) -> bool {
        self.get(col, row).is_some_and(|cell| cell.is_filled())
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        row < GRID_HEIGHT && self.cells.iter().all(|column| column[row].is_filled())
    }

    pub fn filled_count_in_row(&self, row: usize) -> usize {
        if row >= GRID_HEIGHT {
            return 0;
        }
        self.cells.iter().filter(|column| column[row].is_filled()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_filled()).count()
    }

    /// Every full row, top to bottom, found in a single pass over the
    /// current contents.
    pub fn full_rows(&self) -> Vec<usize> {
        (0..GRID_HEIGHT).filter(|&row| self.is_row_full(row)).collect()
    }

    /// Removes `row` and drops every row above it by one. Row 0 becomes empty.
    pub fn collapse_row(&mut self, row: usize) {
        if row >= GRID_HEIGHT {
            return;
        }
        for column in self.cells.iter_mut() {
            for k in (1..=row).rev() {
                column[k] = column[k - 1];
            }
            column[0] = CellState::Empty;
        }
    }

    /// Detects all full rows first, then collapses them top to bottom.
    /// Collapsing a row only touches rows above it, so the remaining
    /// detected rows keep their indices. Returns the number cleared.
    pub fn clear_full_rows(&mut self) -> usize {
        let full = self.full_rows();
        for &row in &full {
            self.collapse_row(row);
        }
        full.len()
    }

    /// Row-major copy, `rows[row][col]`, for renderers.
    pub fn to_rows(&self) -> Vec<Vec<CellState>> {
        (0..GRID_HEIGHT)
            .map(|row| self.cells.iter().map(|column| column[row]).collect())
            .collect()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
