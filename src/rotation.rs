//! Orientation transforms.
//!
//! Every orientation is computed fresh from the unrotated template, so
//! repeated rotation never accumulates drift. Patterns are kept in a
//! canonical ragged form: trailing empty cells are trimmed from each row,
//! but no row is ever shorter than one cell.

use crate::shapes::Template;

/// A computed occupancy pattern, rows top to bottom.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        Self { rows }
    }

    pub fn from_template(template: &Template) -> Self {
        Self::from_rows(template.rows.iter().map(|row| row.to_vec()).collect())
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the bounding box, i.e. the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_solid(&self, dc: usize, dr: usize) -> bool {
        self.rows
            .get(dr)
            .and_then(|row| row.get(dc))
            .copied()
            .unwrap_or(false)
    }

    /// Relative `(column, row)` offsets of every solid cell.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dr, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, solid)| **solid)
                .map(move |(dc, _)| (dc, dr))
        })
    }

    /// Offset of the first solid cell in a row, scanning from the left.
    pub fn leftmost_in_row(&self, dr: usize) -> Option<usize> {
        self.rows.get(dr)?.iter().position(|solid| *solid)
    }

    /// Offset of the last solid cell in a row.
    pub fn rightmost_in_row(&self, dr: usize) -> Option<usize> {
        self.rows.get(dr)?.iter().rposition(|solid| *solid)
    }
}

fn trim_trailing(row: &mut Vec<bool>) {
    while row.len() > 1 && row.last() == Some(&false) {
        row.pop();
    }
}

/// One clockwise quarter turn: column `j` of the input, read bottom to top,
/// becomes row `j` of the output.
pub fn quarter_turn(shape: &Shape) -> Shape {
    let height = shape.height();
    let width = shape.width();
    let mut rows = vec![vec![false; height]; width];
    for (i, row) in shape.rows.iter().enumerate() {
        for (j, new_row) in rows.iter_mut().enumerate() {
            new_row[height - i - 1] = row.get(j).copied().unwrap_or(false);
        }
    }
    rows.iter_mut().for_each(trim_trailing);
    Shape::from_rows(rows)
}

/// Half turn: reverse row order, right-align each row to the bounding box
/// and mirror it.
pub fn half_turn(shape: &Shape) -> Shape {
    let width = shape.width();
    let rows = shape
        .rows
        .iter()
        .rev()
        .map(|row| {
            let mut padded = row.clone();
            padded.resize(width, false);
            padded.reverse();
            trim_trailing(&mut padded);
            padded
        })
        .collect();
    Shape::from_rows(rows)
}

/// Pattern of `template` at `orientation` quarter turns clockwise.
/// The orientation is reduced modulo 4.
pub fn rotate(template: &Template, orientation: usize) -> Shape {
    let base = Shape::from_template(template);
    match orientation % 4 {
        1 => quarter_turn(&base),
        2 => half_turn(&base),
        3 => half_turn(&quarter_turn(&base)),
        _ => base,
    }
}
