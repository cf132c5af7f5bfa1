//! Sprite module - the active piece and its fall state machine
//!
//! ```text
//! Generated --generate--> Falling <--> OnFloor --lock--> Commited
//!     |                                   |
//!     +--> GameOver / KO (spawn blocked)  +--> GameOver / KO (locked above the skyline)
//! ```
//!
//! Every move is checked against the committed grid and silently ignored when it does not
//! fit. Rotations never kick: the new orientation either fits at the current anchor or the
//! rotation is rejected.
//!
//! Timing is injected. [`Sprite::tick`] receives the elapsed milliseconds and a [`Gravity`]
//! describing the current drop interval and lock delay; the sprite never reads a clock.

use log::{debug, info};

use crate::matrix::{CommitOutcome, Matrix};
use crate::shapes::{get_shape, PieceShape};
use crate::types::{MoveKind, PieceKind, Position, Rotation};

/// Fall state of the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteState {
    Generated,
    Falling,
    OnFloor,
    Commited,
    GameOver,
    KO,
}

impl SpriteState {
    /// `GameOver` or `KO`
    pub fn is_terminal(self) -> bool {
        matches!(self, SpriteState::GameOver | SpriteState::KO)
    }

    /// Whether the piece accepts moves and gravity
    pub fn is_in_play(self) -> bool {
        matches!(self, SpriteState::Falling | SpriteState::OnFloor)
    }
}

/// Timing thresholds for one tick, supplied by the level policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gravity {
    /// Milliseconds per row of descent
    pub drop_interval_ms: u32,
    /// Milliseconds on the floor before the piece locks
    pub lock_delay_ms: u32,
}

/// The active falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    kind: PieceKind,
    rotation: Rotation,
    position: Position,
    state: SpriteState,
    last_move: MoveKind,
    drop_ms: u32,
    lock_ms: u32,
    hard_dropped: bool,
    got_lines: bool,
}

impl Sprite {
    /// A piece waiting to be placed at its spawn anchor
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            position: Position::spawn(),
            state: SpriteState::Generated,
            last_move: MoveKind::None,
            drop_ms: 0,
            lock_ms: 0,
            hard_dropped: false,
            got_lines: false,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn state(&self) -> SpriteState {
        self.state
    }

    pub fn last_move(&self) -> MoveKind {
        self.last_move
    }

    /// Time spent on the floor so far
    pub fn lock_ms(&self) -> u32 {
        self.lock_ms
    }

    pub fn drop_ms(&self) -> u32 {
        self.drop_ms
    }

    /// Whether garbage arrived right before this piece spawned
    pub fn got_lines(&self) -> bool {
        self.got_lines
    }

    /// Shape for the current rotation
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Landing position of a hard drop from here
    pub fn ghost_position(&self, matrix: &Matrix) -> Position {
        matrix.drop_position(self.position, &self.shape())
    }

    /// Put the piece into play at the spawn anchor.
    ///
    /// A blocked spawn ends the game: `KO` when garbage was just received, `GameOver`
    /// otherwise.
    pub fn generate(&mut self, matrix: &mut Matrix, got_lines: bool) -> SpriteState {
        self.rotation = Rotation::North;
        self.position = Position::spawn();
        self.last_move = MoveKind::None;
        self.drop_ms = 0;
        self.lock_ms = 0;
        self.hard_dropped = false;
        self.got_lines = got_lines;

        if !matrix.is_valid(self.position, &self.shape()) {
            self.state = if got_lines {
                SpriteState::KO
            } else {
                SpriteState::GameOver
            };
            info!("spawn of {:?} blocked: {:?}", self.kind, self.state);
            return self.state;
        }

        self.state = SpriteState::Falling;
        self.refresh(matrix);
        debug!("spawned {:?}", self.kind);
        self.state
    }

    /// Redraw the live view: committed cells, then the ghost, then the piece
    pub fn refresh(&self, matrix: &mut Matrix) {
        matrix.refresh_live();
        if !self.state.is_in_play() {
            return;
        }
        let shape = self.shape();
        let ghost = matrix.drop_position(self.position, &shape);
        matrix.insert(ghost, self.kind, &shape, true);
        matrix.insert(self.position, self.kind, &shape, false);
    }

    fn try_shift(&mut self, matrix: &mut Matrix, d_row: i8, d_col: i8, kind: MoveKind) -> bool {
        if !self.state.is_in_play() {
            return false;
        }
        let target = self.position.offset(d_row, d_col);
        if !matrix.is_valid(target, &self.shape()) {
            return false;
        }
        self.position = target;
        self.last_move = kind;
        self.refresh(matrix);
        true
    }

    fn try_rotate(&mut self, matrix: &mut Matrix, rotation: Rotation) -> bool {
        // O piece doesn't rotate
        if !self.state.is_in_play() || self.kind == PieceKind::O {
            return false;
        }
        if !matrix.is_valid(self.position, &get_shape(self.kind, rotation)) {
            return false;
        }
        self.rotation = rotation;
        self.last_move = MoveKind::Rotate;
        self.refresh(matrix);
        true
    }

    pub fn left(&mut self, matrix: &mut Matrix) -> bool {
        self.try_shift(matrix, 0, -1, MoveKind::Shift)
    }

    pub fn right(&mut self, matrix: &mut Matrix) -> bool {
        self.try_shift(matrix, 0, 1, MoveKind::Shift)
    }

    pub fn rotate_cw(&mut self, matrix: &mut Matrix) -> bool {
        self.try_rotate(matrix, self.rotation.rotate_cw())
    }

    pub fn rotate_ccw(&mut self, matrix: &mut Matrix) -> bool {
        self.try_rotate(matrix, self.rotation.rotate_ccw())
    }

    /// Move down one row; returns whether it moved
    pub fn soft_drop(&mut self, matrix: &mut Matrix) -> bool {
        self.try_shift(matrix, 1, 0, MoveKind::Drop)
    }

    /// Snap to the landing row and mark the piece for locking on the next tick.
    ///
    /// Returns the number of rows travelled.
    pub fn hard_drop(&mut self, matrix: &mut Matrix) -> u32 {
        if !self.state.is_in_play() {
            return 0;
        }
        let landing = self.ghost_position(matrix);
        let distance = (landing.row - self.position.row) as u32;
        if distance > 0 {
            self.position = landing;
            self.last_move = MoveKind::Drop;
        }
        self.hard_dropped = true;
        self.state = SpriteState::OnFloor;
        self.refresh(matrix);
        distance
    }

    /// Advance gravity and lock delay by `elapsed_ms`.
    ///
    /// Returns the commit outcome when the piece locks on this tick.
    pub fn tick(&mut self, matrix: &mut Matrix, elapsed_ms: u32, gravity: Gravity) -> Option<CommitOutcome> {
        if !self.state.is_in_play() {
            return None;
        }
        if self.hard_dropped {
            return Some(self.lock(matrix));
        }

        let shape = self.shape();
        if matrix.is_valid(self.position.down(), &shape) {
            if self.state == SpriteState::OnFloor {
                // Shifted off a ledge: fall again
                self.state = SpriteState::Falling;
                self.lock_ms = 0;
            }

            self.drop_ms = self.drop_ms.saturating_add(elapsed_ms);
            if self.drop_ms >= gravity.drop_interval_ms {
                self.drop_ms = 0;
                self.position = self.position.down();
                self.last_move = MoveKind::Drop;
                self.refresh(matrix);
            }
            return None;
        }

        if self.state == SpriteState::Falling {
            self.state = SpriteState::OnFloor;
            self.drop_ms = 0;
            self.lock_ms = 0;
        }

        self.lock_ms = self.lock_ms.saturating_add(elapsed_ms);
        if self.lock_ms >= gravity.lock_delay_ms {
            return Some(self.lock(matrix));
        }
        None
    }

    /// Commit the piece into the matrix and settle the final state
    pub fn lock(&mut self, matrix: &mut Matrix) -> CommitOutcome {
        let shape = self.shape();
        let locked_out = matrix.is_above_skyline(self.position, &shape);
        let outcome = matrix.commit(self.kind, self.rotation, self.last_move, self.position);

        self.state = if !locked_out {
            SpriteState::Commited
        } else if self.got_lines {
            SpriteState::KO
        } else {
            SpriteState::GameOver
        };
        if locked_out {
            info!("{:?} locked above the skyline: {:?}", self.kind, self.state);
        }
        outcome
    }

    /// Lift the piece out of any committed cells after the board shifted under it
    pub fn resettle(&mut self, matrix: &mut Matrix) {
        if !self.state.is_in_play() {
            return;
        }
        let shape = self.shape();
        while !matrix.is_valid(self.position, &shape) && self.position.row > 0 {
            self.position = self.position.up();
        }
        self.refresh(matrix);
    }
}
