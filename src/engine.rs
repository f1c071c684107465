use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Every direction, in button order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Lowercase name, as used by button triggers and `--script`.
    pub fn name(self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction '{0}' (expected up, down, left or right)")]
pub struct ParseMoveError(String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Move::Up),
            "down" => Ok(Move::Down),
            "left" => Ok(Move::Left),
            "right" => Ok(Move::Right),
            _ => Err(ParseMoveError(s.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({row}, {col}) holds {value}, which is neither 0 nor a power of two >= 2")]
    NotPowerOfTwo { row: usize, col: usize, value: u32 },
    #[error("cell ({row}, {col}) holds {value}, above the largest tile 32768")]
    TooLarge { row: usize, col: usize, value: u32 },
}

/// Cells per row and per column.
pub const SIDE: usize = 2;
/// Cells on the grid.
pub const CELLS: usize = SIDE * SIDE;
/// Probability that a spawned tile is a 4 instead of a 2.
pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.1;

const LINE_TABLE_SIZE: usize = 0x100; // 256 possible 8-bit lines
const MAX_EXPONENT: Exponent = 0xf;
/// Largest tile a nibble can hold.
pub const MAX_TILE: u32 = 1 << MAX_EXPONENT;

type GridRaw = u16;
type Line = u8;
type Exponent = u8;

#[derive(Clone, Copy, Default)]
struct LineShift {
    line: Line,
    merges: u8,
}

struct Stores {
    shift_left: Box<[LineShift]>,
    shift_right: Box<[LineShift]>,
}

static STORES: OnceLock<Stores> = OnceLock::new();

/// Packed 2x2 grid as 4 exponent nibbles in a `u16`, row-major,
/// first cell in the high nibble. Nibble `0` is empty, `k` is the tile `2^k`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Grid(GridRaw);

/// Outcome of sliding a grid in one direction, before any spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    pub grid: Grid,
    pub merges: u32,
}

/// A tile placed into a previously empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub value: u32,
}

impl Grid {
    /// A constant empty grid (all zeros).
    pub const EMPTY: Grid = Grid(0);

    /// Construct a `Grid` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: GridRaw) -> Self {
        Grid(raw)
    }

    /// Consume this `Grid`, returning the raw packed `u16`.
    #[inline]
    pub fn into_raw(self) -> GridRaw {
        self.0
    }

    /// Borrow the raw packed `u16` for this `Grid`.
    #[inline]
    pub fn raw(&self) -> GridRaw {
        self.0
    }

    /// Build a grid from tile values, rejecting anything that is not `0` or a power of two >= 2.
    ///
    /// ```
    /// use lite_2048::engine::Grid;
    /// let g = Grid::from_rows([[2, 0], [0, 4]]).unwrap();
    /// assert_eq!(g.rows(), [[2, 0], [0, 4]]);
    /// assert!(Grid::from_rows([[3, 0], [0, 0]]).is_err());
    /// ```
    pub fn from_rows(rows: [[u32; SIDE]; SIDE]) -> Result<Self, GridError> {
        let mut raw: GridRaw = 0;
        for (row, line) in rows.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                let exponent = exponent_for(row, col, value)?;
                raw |= GridRaw::from(exponent) << nibble_shift(row * SIDE + col);
            }
        }
        Ok(Grid(raw))
    }

    /// Tile values as a row-major matrix.
    pub fn rows(self) -> [[u32; SIDE]; SIDE] {
        let mut rows = [[0; SIDE]; SIDE];
        for (idx, value) in self.tiles().enumerate() {
            rows[idx / SIDE][idx % SIDE] = value;
        }
        rows
    }

    /// Tile values in row-major order.
    pub fn tiles(self) -> impl Iterator<Item = u32> {
        (0..CELLS).map(move |idx| self.tile_value(idx))
    }

    /// Value at `(row, col)`; `0` when empty.
    #[inline]
    pub fn get(self, row: usize, col: usize) -> u32 {
        self.tile_value(row * SIDE + col)
    }

    /// Get the actual value at index (2^exponent stored at nibble).
    ///
    /// Index runs 0..4 row-major.
    #[inline]
    pub fn tile_value(self, idx: usize) -> u32 {
        match self.exponent(idx) {
            0 => 0,
            e => 1 << e,
        }
    }

    #[inline]
    fn exponent(self, idx: usize) -> Exponent {
        ((self.0 >> nibble_shift(idx)) & 0xf) as Exponent
    }

    /// Slide and merge every line toward `dir`, reporting how many merges happened.
    /// No randomness.
    ///
    /// ```
    /// use lite_2048::engine::{Grid, Move};
    /// let g = Grid::from_rows([[2, 2], [0, 4]]).unwrap();
    /// let s = g.slide(Move::Left);
    /// assert_eq!(s.grid.rows(), [[4, 0], [4, 0]]);
    /// assert_eq!(s.merges, 1);
    /// ```
    pub fn slide(self, dir: Move) -> Slide {
        let s = stores();
        match dir {
            Move::Left => shift_rows(self.0, &s.shift_left),
            Move::Right => shift_rows(self.0, &s.shift_right),
            Move::Up => shift_cols(self.0, &s.shift_left),
            Move::Down => shift_cols(self.0, &s.shift_right),
        }
    }

    /// Return the grid resulting from sliding/merging tiles in `dir` (no random insert).
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        self.slide(dir).grid
    }

    /// Place a tile in a uniformly chosen empty cell: a 4 with probability
    /// `four_probability`, otherwise a 2.
    ///
    /// A full grid is returned unchanged with `None`. Probabilities outside
    /// `[0, 1]` fall back to [`DEFAULT_FOUR_PROBABILITY`].
    pub fn spawn_tile<R: Rng + ?Sized>(self, rng: &mut R, four_probability: f64) -> (Self, Option<Spawn>) {
        let empty = self.count_empty();
        if empty == 0 {
            return (self, None);
        }
        let mut index = rng.gen_range(0..empty);
        let exponent = generate_random_tile(rng, four_probability);
        for idx in 0..CELLS {
            if self.exponent(idx) != 0 {
                continue;
            }
            if index == 0 {
                let grid = Grid(self.0 | GridRaw::from(exponent) << nibble_shift(idx));
                let spawn = Spawn { row: idx / SIDE, col: idx % SIDE, value: 1 << exponent };
                return (grid, Some(spawn));
            }
            index -= 1;
        }
        (self, None)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using the provided RNG.
    ///
    /// ```
    /// use lite_2048::engine::Grid;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let g = Grid::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(g.count_empty(), 2);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        self.spawn_tile(rng, DEFAULT_FOUR_PROBABILITY).0
    }

    /// Perform a move then insert a random tile if the move changed the grid, using the provided RNG.
    ///
    /// ```
    /// use lite_2048::engine::{Grid, Move};
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let g = Grid::from_rows([[2, 4], [4, 2]]).unwrap();
    /// assert_eq!(g.make_move(Move::Left, &mut rng), g);
    /// ```
    #[inline]
    pub fn make_move<R: Rng + ?Sized>(self, dir: Move, rng: &mut R) -> Self {
        let moved = self.shift(dir);
        if moved != self { moved.with_random_tile(rng) } else { self }
    }

    /// True if sliding toward `dir` changes at least one cell.
    #[inline]
    pub fn can_move(self, dir: Move) -> bool {
        self.shift(dir) != self
    }

    /// Directions that would change the grid.
    pub fn legal_moves(self) -> impl Iterator<Item = Move> {
        Move::ALL.into_iter().filter(move |&dir| self.can_move(dir))
    }

    /// True when the grid is full and no direction changes it.
    ///
    /// ```
    /// use lite_2048::engine::Grid;
    /// assert!(Grid::from_rows([[2, 4], [4, 2]]).unwrap().is_stuck());
    /// assert!(!Grid::EMPTY.is_stuck());
    /// ```
    pub fn is_stuck(self) -> bool {
        self.count_empty() == 0 && Move::ALL.iter().all(|&dir| !self.can_move(dir))
    }

    /// Count the number of empty cells on the grid.
    #[inline]
    pub fn count_empty(self) -> usize {
        CELLS - self.count_tiles()
    }

    /// Count the number of occupied cells on the grid.
    #[inline]
    pub fn count_tiles(self) -> usize {
        let mut raw = self.0;
        raw |= raw >> 1;
        raw |= raw >> 2;
        raw &= 0x1111;
        raw.count_ones() as usize
    }

    /// Return the highest tile value present on the grid (0 when empty).
    pub fn highest_tile(self) -> u32 {
        self.tiles().max().unwrap_or(0)
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({:#06x})", self.0)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        for (r, row) in rows.iter().enumerate() {
            if r > 0 {
                writeln!(f, "---------------")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl From<GridRaw> for Grid {
    fn from(v: GridRaw) -> Self {
        Grid::from_raw(v)
    }
}

impl From<Grid> for GridRaw {
    fn from(g: Grid) -> Self {
        g.into_raw()
    }
}

impl TryFrom<[[u32; SIDE]; SIDE]> for Grid {
    type Error = GridError;

    fn try_from(rows: [[u32; SIDE]; SIDE]) -> Result<Self, Self::Error> {
        Grid::from_rows(rows)
    }
}

#[inline(always)]
fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    let mut shift_left = vec![LineShift::default(); LINE_TABLE_SIZE];
    let mut shift_right = vec![LineShift::default(); LINE_TABLE_SIZE];
    for (val, (left, right)) in shift_left.iter_mut().zip(shift_right.iter_mut()).enumerate() {
        let line = val as Line;
        *left = shift_line(line, false);
        *right = shift_line(line, true);
    }
    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
    }
}

#[inline]
fn nibble_shift(idx: usize) -> u32 {
    (4 * (CELLS - 1 - idx)) as u32
}

#[inline]
fn line_shift(line_idx: usize) -> u32 {
    (8 * (SIDE - 1 - line_idx)) as u32
}

#[inline]
fn extract_line(raw: GridRaw, line_idx: usize) -> Line {
    (raw >> line_shift(line_idx)) as Line
}

// Swap the two off-diagonal cells.
#[inline]
fn transpose(x: GridRaw) -> GridRaw {
    (x & 0xF00F) | ((x & 0x0F00) >> 4) | ((x & 0x00F0) << 4)
}

fn shift_rows(raw: GridRaw, table: &[LineShift]) -> Slide {
    (0..SIDE).fold(Slide { grid: Grid::EMPTY, merges: 0 }, |acc, row_idx| {
        let entry = table[extract_line(raw, row_idx) as usize];
        Slide {
            grid: Grid(acc.grid.0 | GridRaw::from(entry.line) << line_shift(row_idx)),
            merges: acc.merges + u32::from(entry.merges),
        }
    })
}

fn shift_cols(raw: GridRaw, table: &[LineShift]) -> Slide {
    let slid = shift_rows(transpose(raw), table);
    Slide { grid: Grid(transpose(slid.grid.0)), merges: slid.merges }
}

fn shift_line(line: Line, reversed: bool) -> LineShift {
    let mut tiles = line_to_tiles(line);
    if reversed {
        tiles.reverse();
    }
    let (mut tiles, merges) = collapse(tiles);
    if reversed {
        tiles.reverse();
    }
    LineShift { line: tiles_to_line(tiles), merges }
}

/// Compact non-zero exponents toward the front, merging equal neighbours.
/// A merged cell takes no part in a second merge.
fn collapse(tiles: [Exponent; SIDE]) -> ([Exponent; SIDE], u8) {
    let mut out = [0; SIDE];
    let mut merged = [false; SIDE];
    let mut len: usize = 0;
    let mut merges = 0;
    for tile in tiles.into_iter().filter(|&t| t != 0) {
        let last = len.checked_sub(1);
        match last {
            Some(i) if out[i] == tile && !merged[i] && tile < MAX_EXPONENT => {
                out[i] += 1;
                merged[i] = true;
                merges += 1;
            }
            _ => {
                out[len] = tile;
                len += 1;
            }
        }
    }
    (out, merges)
}

fn line_to_tiles(line: Line) -> [Exponent; SIDE] {
    [line >> 4, line & 0xf]
}

fn tiles_to_line(tiles: [Exponent; SIDE]) -> Line {
    tiles[0] << 4 | tiles[1]
}

fn exponent_for(row: usize, col: usize, value: u32) -> Result<Exponent, GridError> {
    if value == 0 {
        return Ok(0);
    }
    if value < 2 || !value.is_power_of_two() {
        return Err(GridError::NotPowerOfTwo { row, col, value });
    }
    if value > MAX_TILE {
        return Err(GridError::TooLarge { row, col, value });
    }
    Ok(value.trailing_zeros() as Exponent)
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R, four_probability: f64) -> Exponent {
    let p = if (0.0..=1.0).contains(&four_probability) { four_probability } else { DEFAULT_FOUR_PROBABILITY };
    if rng.gen_bool(p) { 2 } else { 1 }
}

fn format_val(value: u32) -> String {
    match value {
        0 => " ".repeat(7),
        v => format!("{:^7}", v),
    }
}
