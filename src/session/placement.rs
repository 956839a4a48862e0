//! Random placement service: free-cell selection and shuffles.

use rand::Rng;

/// A position on an integer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i16,
    pub y: i16,
}

/// Pick a uniformly random cell in `[0, width) x [0, height)` for which
/// `is_occupied` is false.
///
/// Returns `None` when no free cell exists — callers must treat that as an
/// explicit terminal condition, never unreachable. Enumerating candidates
/// (rather than rejection sampling) is what makes exhaustion representable.
pub fn random_free_cell<R, F>(rng: &mut R, width: i16, height: i16, is_occupied: F) -> Option<Cell>
where
    R: Rng,
    F: Fn(Cell) -> bool,
{
    let mut free = Vec::with_capacity((width as usize) * (height as usize));
    for y in 0..height {
        for x in 0..width {
            let cell = Cell { x, y };
            if !is_occupied(cell) {
                free.push(cell);
            }
        }
    }
    if free.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..free.len());
    Some(free[index])
}

/// In-place Fisher-Yates shuffle.
pub fn shuffle<T, R: Rng>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
