//! Core types module - shared data structures and constants
//!
//! Everything here is plain data with no external dependencies, so the same types can be
//! used by the matrix engine, the battle layer and any presentation code.
//!
//! # Matrix Dimensions
//!
//! The matrix stores more than the visible playfield:
//!
//! | Region | Rows | Columns |
//! |--------|------|---------|
//! | Headroom (above the skyline) | 0..4 | 2..12 |
//! | Visible playfield | 4..24 | 2..12 |
//! | Floor border | 24..26 | all |
//! | Side borders | all | 0..2 and 12..14 |
//!
//! Border cells are written once at construction and never change. Rows are counted from
//! the top, so "down" means an increasing row index.
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `LOCK_DELAY_MS` | 450 | Time before a grounded piece locks |
//! | `SOFT_DROP_MULTIPLIER` | 10 | Soft drop is 10x faster than gravity |
//! | `DROP_INTERVALS` | 1000..160 | Gravity per level, then `DROP_INTERVAL_FLOOR_MS` |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{Cell, PieceKind, Position, Rotation, VISIBLE_COLS};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.code(), 3);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Position::new(3, 5).down(), Position::new(4, 5));
//!
//! assert!(Cell::Bomb.is_passable());
//! assert!(!Cell::Solid.is_passable());
//! assert_eq!(VISIBLE_COLS, 10);
//! ```

/// Visible playfield width (10 columns)
pub const VISIBLE_COLS: usize = 10;

/// Border padding on each side of the playfield
pub const PAD_COLS: usize = 2;

/// Total matrix width including both paddings
pub const MATRIX_COLS: usize = VISIBLE_COLS + 2 * PAD_COLS;

/// First visible column index in matrix coordinates
pub const FIRST_COL: usize = PAD_COLS;

/// One past the last visible column
pub const END_COL: usize = PAD_COLS + VISIBLE_COLS;

/// Rows of headroom above the skyline
pub const HEADROOM_ROWS: usize = 4;

/// Visible playfield height (20 rows)
pub const VISIBLE_ROWS: usize = 20;

/// Border rows under the playfield
pub const FLOOR_ROWS: usize = 2;

/// Rows that can hold piece or garbage cells (headroom + visible)
pub const PLAYABLE_ROWS: usize = HEADROOM_ROWS + VISIBLE_ROWS;

/// Total matrix height including the floor border
pub const MATRIX_ROWS: usize = PLAYABLE_ROWS + FLOOR_ROWS;

/// First visible row. Cells with a smaller row index are above the skyline.
pub const SKYLINE_ROW: usize = HEADROOM_ROWS;

/// Anchor row for freshly spawned pieces (just above the skyline)
pub const SPAWN_ROW: i8 = (SKYLINE_ROW - 2) as i8;

/// Anchor column for freshly spawned pieces
pub const SPAWN_COL: i8 = (FIRST_COL + 3) as i8;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Lock delay when piece is grounded
pub const LOCK_DELAY_MS: u32 = 450;

/// Soft drop speed multiplier (10x normal speed)
pub const SOFT_DROP_MULTIPLIER: u32 = 10;

/// Drop intervals by level (milliseconds per row)
///
/// Index 0 = level 1. Levels past the table use `DROP_INTERVAL_FLOOR_MS`.
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Gravity floor after the table runs out
pub const DROP_INTERVAL_FLOOR_MS: u32 = 120;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Default number of next pieces shown
pub const PREVIEW_COUNT: usize = 5;

/// Largest lookahead the bag generator can serve without touching its RNG
pub const MAX_PREVIEW: usize = 7;

/// The seven tetromino piece kinds
///
/// The numeric code (1..=7) is what the matrix stores for committed cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in code order (one bag)
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Numeric piece code (1..=7)
    pub fn code(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    /// Inverse of [`PieceKind::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=7 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }
}

/// Offset added to a piece code for its ghost variant in [`Cell::code`]
pub const GHOST_OFFSET: u8 = 10;

/// A single matrix cell
///
/// - `Empty` and `Bomb` are passable for collision checks.
/// - `Border` is written at construction and never changes.
/// - `Solid` and `Bomb` make up received garbage rows; the `Bomb` is the weak point.
/// - `Ghost` only ever appears in the live view, never in the committed board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Border,
    Solid,
    Bomb,
    Piece(PieceKind),
    Ghost(PieceKind),
}

impl Cell {
    /// Whether a piece may occupy this cell
    #[inline]
    pub fn is_passable(self) -> bool {
        matches!(self, Cell::Empty | Cell::Bomb)
    }

    /// Whether this cell counts as occupied for T-Spin corner checks
    #[inline]
    pub fn is_occupied(self) -> bool {
        !self.is_passable()
    }

    /// Whether this cell fills its slot in a line (anything but `Empty`/`Bomb`)
    #[inline]
    pub fn is_filled(self) -> bool {
        !self.is_passable()
    }

    pub fn is_ghost(self) -> bool {
        matches!(self, Cell::Ghost(_))
    }

    /// Compact code for renderers and hashing
    ///
    /// `0` empty, `1..=7` pieces, `8` solid, `9` bomb, `11..=17` ghosts, `255` border.
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Piece(kind) => kind.code(),
            Cell::Solid => 8,
            Cell::Bomb => 9,
            Cell::Ghost(kind) => kind.code() + GHOST_OFFSET,
            Cell::Border => 255,
        }
    }
}

/// Rotation states, clockwise from spawn orientation
///
/// - **North**: Spawn orientation (0°)
/// - **East**: 90° clockwise
/// - **South**: 180°
/// - **West**: 270° clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Angle index into the shape tables (0..4)
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Inverse of [`Rotation::index`]; wraps modulo 4
    pub fn from_index(index: usize) -> Self {
        match index % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    /// Parse rotation from string
    ///
    /// Accepts full names or single letters (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Some(Rotation::North),
            "east" | "e" => Some(Rotation::East),
            "south" | "s" => Some(Rotation::South),
            "west" | "w" => Some(Rotation::West),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Absolute matrix coordinate of a piece anchor (top-left of its shape template)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Standard spawn anchor
    pub const fn spawn() -> Self {
        Self::new(SPAWN_ROW, SPAWN_COL)
    }

    #[inline]
    pub fn offset(self, d_row: i8, d_col: i8) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }

    #[inline]
    pub fn down(self) -> Self {
        self.offset(1, 0)
    }

    #[inline]
    pub fn up(self) -> Self {
        self.offset(-1, 0)
    }

    #[inline]
    pub fn left(self) -> Self {
        self.offset(0, -1)
    }

    #[inline]
    pub fn right(self) -> Self {
        self.offset(0, 1)
    }
}

/// The kind of move that last changed the active piece
///
/// Only a lock whose last move was `Rotate` is eligible for T-Spin detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveKind {
    #[default]
    None,
    Shift,
    Rotate,
    Drop,
}

/// Game actions that can be applied to modify game state
///
/// These actions are used by both human input and scripted control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Drop piece one cell down (with soft drop scoring)
    SoftDrop,
    /// Snap piece to its landing row and lock it
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Swap the active piece with the hold slot
    Hold,
    /// Toggle pause state
    Pause,
    /// Restart the match
    Restart,
}

impl GameAction {
    /// Parse action from string (camelCase, case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "pause" => Some(GameAction::Pause),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}

/// T-Spin detection result
///
/// - **None**: Not a T-spin
/// - **Mini**: one front corner and both back corners occupied
/// - **Full**: both front corners and at least one back corner occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TSpinKind {
    #[default]
    None,
    Mini,
    Full,
}

impl TSpinKind {
    /// Returns `None` for `TSpinKind::None`, `Some("mini")` / `Some("full")` otherwise.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TSpinKind::None => None,
            TSpinKind::Mini => Some("mini"),
            TSpinKind::Full => Some("full"),
        }
    }

    pub fn is_spin(&self) -> bool {
        !matches!(self, TSpinKind::None)
    }
}

/// Bonus classification of a score event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComboKind {
    #[default]
    None,
    Combo,
    B2BTetris,
    B2BTSpin,
}

/// Move-description tags for text panes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveTag {
    Single,
    Double,
    Triple,
    Tetris,
    TSpin,
    TSpinMini,
    PerfectClear,
    Combo,
    BackToBack,
}

impl MoveTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveTag::Single => "single",
            MoveTag::Double => "double",
            MoveTag::Triple => "triple",
            MoveTag::Tetris => "tetris",
            MoveTag::TSpin => "t-spin",
            MoveTag::TSpinMini => "t-spin mini",
            MoveTag::PerfectClear => "perfect clear",
            MoveTag::Combo => "combo",
            MoveTag::BackToBack => "back-to-back",
        }
    }

    /// Tag naming a plain clear of `lines` rows
    pub fn for_lines(lines: usize) -> Option<Self> {
        match lines {
            1 => Some(MoveTag::Single),
            2 => Some(MoveTag::Double),
            3 => Some(MoveTag::Triple),
            4 => Some(MoveTag::Tetris),
            _ => None,
        }
    }
}

/// Line clear base scores by lines cleared (index 0..=4)
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Full T-Spin base scores by lines cleared (index 0..=3)
pub const TSPIN_SCORES: [u32; 4] = [400, 800, 1200, 1600];

/// T-Spin Mini base scores by lines cleared (index 0..=3)
pub const TSPIN_MINI_SCORES: [u32; 4] = [100, 200, 400, 400];

/// Bonus for a back-to-back Tetris
pub const B2B_TETRIS_BONUS: u32 = 400;

/// Bonus for a back-to-back full T-Spin by lines cleared (index 0..=3)
pub const B2B_TSPIN_BONUS: [u32; 4] = [0, 400, 600, 800];

/// Points per combo step past the first clear
pub const COMBO_STEP: u32 = 50;

/// Points per cell of soft drop
pub const SOFT_DROP_POINTS: u32 = 1;

/// Points per cell of hard drop
pub const HARD_DROP_POINTS: u32 = 2;
