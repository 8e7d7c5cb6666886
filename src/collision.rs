//! Placement tests. Occupancy ([`is_blocked`]) and geometric bounds are kept
//! apart so the same occupancy test serves spawn, descent, shifting and
//! rotation.

use crate::grid::{Grid, Position};
use crate::rotation::Shape;

/// True when any solid cell of `shape` at `pos` lands on a locked cell.
/// Cells outside the grid are ignored here; callers check bounds.
pub fn is_blocked(grid: &Grid, shape: &Shape, pos: Position) -> bool {
    shape
        .cells()
        .any(|(dc, dr)| grid.is_occupied(pos.col + dc as i32, pos.row + dr as i32))
}

/// True when the shape's bottom edge at `pos` lies below the last row.
pub fn exceeds_floor(grid: &Grid, shape: &Shape, pos: Position) -> bool {
    pos.row + shape.height() as i32 > grid.height() as i32
}

/// How many columns the shape sticks out past the right wall at `pos`.
pub fn right_overflow(grid: &Grid, shape: &Shape, pos: Position) -> i32 {
    (pos.col + shape.width() as i32 - grid.width() as i32).max(0)
}

/// Whether a one-column shift in direction `delta` (-1 left, 1 right) is
/// stopped by a wall or by a locked cell in front of a row's leading edge.
pub fn is_horizontal_move_blocked(grid: &Grid, shape: &Shape, pos: Position, delta: i32) -> bool {
    let at_wall = if delta < 0 {
        pos.col <= 0
    } else {
        pos.col + shape.width() as i32 >= grid.width() as i32
    };
    if at_wall {
        return true;
    }

    (0..shape.height()).any(|dr| {
        let edge = if delta < 0 {
            shape.leftmost_in_row(dr)
        } else {
            shape.rightmost_in_row(dr)
        };
        edge.is_some_and(|dc| grid.is_occupied(pos.col + dc as i32 + delta, pos.row + dr as i32))
    })
}
