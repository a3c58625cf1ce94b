#![no_std]

/// Hex adjacency offsets `(dr, dc)` on a rhombus board stored in rows and columns.
///
/// Cell `(r, c)` touches `(r-1, c)`, `(r-1, c+1)`, `(r, c+1)`, `(r+1, c)`,
/// `(r+1, c-1)` and `(r, c-1)`.
pub const HEX_OFFSETS: [(i32, i32); 6] = [(-1, 0), (-1, 1), (0, 1), (1, 0), (1, -1), (0, -1)];

/// Largest palette `multiset_overlap` can count.
pub const MAX_PALETTE: usize = 16;

/// Converts a (row, col) pair into an index into a row-major flat slice
#[inline]
pub fn flat_index(row: usize, col: usize, width: usize) -> usize {
    row * width + col
}

/// Iterator over the in-bounds hex neighbours of a cell on a `size`×`size` board
#[derive(Debug, Clone)]
pub struct HexNeighbors {
    row: i32,
    col: i32,
    size: i32,
    next: usize,
}

impl Iterator for HexNeighbors {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < HEX_OFFSETS.len() {
            let (dr, dc) = HEX_OFFSETS[self.next];
            self.next += 1;
            let r = self.row + dr;
            let c = self.col + dc;
            if r >= 0 && c >= 0 && r < self.size && c < self.size {
                return Some((r as usize, c as usize));
            }
        }
        None
    }
}

/// Returns the hex neighbours of `(row, col)`, clipped to the board
///
/// # Arguments
/// * `row` - Row of the cell
/// * `col` - Column of the cell
/// * `size` - Side length of the square board
pub fn hex_neighbors(row: usize, col: usize, size: usize) -> HexNeighbors {
    HexNeighbors {
        row: row as i32,
        col: col as i32,
        size: size as i32,
        next: 0,
    }
}

/// Counts positions where both sequences hold the same symbol
pub fn exact_matches(guess: &[usize], secret: &[usize]) -> usize {
    guess.iter().zip(secret).filter(|(g, s)| g == s).count()
}

/// Size of the multiset intersection of two symbol sequences
///
/// Equals `sum over symbols of min(count in a, count in b)`. Symbols must be
/// below [`MAX_PALETTE`]; larger symbols are ignored.
pub fn multiset_overlap(a: &[usize], b: &[usize]) -> usize {
    let mut counts_a = [0usize; MAX_PALETTE];
    let mut counts_b = [0usize; MAX_PALETTE];
    for &s in a.iter().filter(|&&s| s < MAX_PALETTE) {
        counts_a[s] += 1;
    }
    for &s in b.iter().filter(|&&s| s < MAX_PALETTE) {
        counts_b[s] += 1;
    }
    counts_a
        .iter()
        .zip(counts_b.iter())
        .map(|(x, y)| if x < y { *x } else { *y })
        .sum()
}
