use std::time::Duration;

use crate::clock::{Clock, TimerHandle, TimerQueue};
use crate::collision::{exceeds_floor, is_blocked, is_horizontal_move_blocked, right_overflow};
use crate::grid::{CellState, Grid, Position, GRID_WIDTH};
use crate::highscore::{Highscores, MemoryStore, ScoreStore};
use crate::input::CheatDetector;
use crate::rotation::{rotate, Shape};
use crate::scoring::{drop_interval, fast_drop_interval, level_for_lines, lock_points};
use crate::shapes::ShapeKind;

// ============================================================================
// Configuration
// ============================================================================

pub const SPAWN_POSITION: Position = Position::new(4, 0);
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub const CHEAT_LINES: u32 = 1000;
pub const CHEAT_BONUS: u64 = 1_000_000_000;

// ============================================================================
// Pieces
// ============================================================================

/// A kind at an orientation with its pattern computed from the template.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OrientedPiece {
    pub kind: ShapeKind,
    pub orientation: usize,
    pub shape: Shape,
}

impl OrientedPiece {
    pub fn new(kind: ShapeKind, orientation: usize) -> Self {
        let orientation = orientation % 4;
        Self {
            kind,
            orientation,
            shape: rotate(kind.template(), orientation),
        }
    }
}

/// The falling piece.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: ShapeKind,
    pub orientation: usize,
    pub shape: Shape,
    pub position: Position,
}

impl Piece {
    pub fn new(kind: ShapeKind, orientation: usize) -> Self {
        Self::new_at(kind, orientation, SPAWN_POSITION.col, SPAWN_POSITION.row)
    }

    pub fn new_at(kind: ShapeKind, orientation: usize, col: i32, row: i32) -> Self {
        Self::place(OrientedPiece::new(kind, orientation), Position::new(col, row))
    }

    fn place(oriented: OrientedPiece, position: Position) -> Self {
        Self {
            kind: oriented.kind,
            orientation: oriented.orientation,
            shape: oriented.shape,
            position,
        }
    }

    /// Absolute grid cells covered by the piece.
    pub fn blocks(&self) -> Vec<Position> {
        self.shape
            .cells()
            .map(|(dc, dr)| self.position.offset(dc as i32, dr as i32))
            .collect()
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    /// Kind and initial orientation of the next piece.
    fn next_piece(&mut self) -> (ShapeKind, usize);
}

pub struct RandomPieceProvider<R = rand::rngs::ThreadRng> {
    rng: R,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: rand::Rng> RandomPieceProvider<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: rand::Rng> PieceProvider for RandomPieceProvider<R> {
    fn next_piece(&mut self) -> (ShapeKind, usize) {
        let kind = ShapeKind::random(&mut self.rng);
        (kind, self.rng.gen_range(0..4))
    }
}

/// Cycles through a fixed list; used for deterministic play.
pub struct SequencePieceProvider {
    pieces: Vec<(ShapeKind, usize)>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<(ShapeKind, usize)>) -> Self {
        Self { pieces, index: 0 }
    }

    /// Every kind at orientation 0.
    pub fn upright(kinds: &[ShapeKind]) -> Self {
        Self::new(kinds.iter().map(|kind| (*kind, 0)).collect())
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> (ShapeKind, usize) {
        if self.pieces.is_empty() {
            return (ShapeKind::O, 0);
        }
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Falling,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    NewBest(u64),
    CheatActivated,
    GameRestarted,
    GameOver,
}

/// Everything that belongs to one game. Retry replaces it wholesale.
#[derive(Clone, Debug)]
pub struct Session {
    pub grid: Grid,
    pub current_piece: Piece,
    pub next_piece: OrientedPiece,
    pub score: u64,
    pub lines_cleared: u32,
    pub level: u32,
    pub fast_drop: bool,
    pub state: GameState,
    pub cheat_used: bool,
    drop_timer: Option<TimerHandle>,
    frame_timer: Option<TimerHandle>,
}

impl Session {
    fn new(grid: Grid, current_piece: Piece, next_piece: OrientedPiece) -> Self {
        Self {
            grid,
            current_piece,
            next_piece,
            score: 0,
            lines_cleared: 0,
            level: 0,
            fast_drop: false,
            state: GameState::Falling,
            cheat_used: false,
            drop_timer: None,
            frame_timer: None,
        }
    }

    fn draw(provider: &mut dyn PieceProvider) -> OrientedPiece {
        let (kind, orientation) = provider.next_piece();
        OrientedPiece::new(kind, orientation)
    }

    /// Primes current and next from the provider, in that order.
    fn start(provider: &mut dyn PieceProvider) -> Self {
        let current = Piece::place(Self::draw(provider), SPAWN_POSITION);
        let next = Self::draw(provider);
        Self::new(Grid::new(), current, next)
    }

    pub fn drop_interval(&self) -> Duration {
        if self.fast_drop {
            fast_drop_interval(self.level)
        } else {
            drop_interval(self.level)
        }
    }
}

// ============================================================================
// Game
// ============================================================================

/// Which task a fired timer belonged to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Wake {
    Descended,
    Render,
    Stale,
}

/// Read-only view handed to renderers.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub piece: &'a Piece,
    pub next: &'a OrientedPiece,
    pub score: u64,
    pub lines_cleared: u32,
    pub level: u32,
    pub highscores: Highscores,
}

pub struct Game<C = TimerQueue, S = MemoryStore> {
    session: Session,
    clock: C,
    store: S,
    highscores: Highscores,
    piece_provider: Box<dyn PieceProvider>,
    pub(crate) cheat_keys: CheatDetector,
    events: Vec<GameEvent>,
}

impl<C: Clock, S: ScoreStore> Game<C, S> {
    pub fn new(clock: C, store: S) -> Self {
        Self::with_provider(clock, store, Box::new(RandomPieceProvider::new()))
    }

    pub fn with_provider(clock: C, store: S, mut provider: Box<dyn PieceProvider>) -> Self {
        let session = Session::start(provider.as_mut());
        Self::with_session(clock, store, provider, session)
    }

    fn with_session(clock: C, store: S, provider: Box<dyn PieceProvider>, session: Session) -> Self {
        let highscores = Highscores::load(&store);
        let mut game = Self {
            session,
            clock,
            store,
            highscores,
            piece_provider: provider,
            cheat_keys: CheatDetector::new(),
            events: Vec::new(),
        };
        game.begin();
        game
    }

    fn begin(&mut self) {
        self.update_highscores();
        self.schedule_frame();
        self.schedule_drop();
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn grid(&self) -> &Grid {
        &self.session.grid
    }

    pub fn current_piece(&self) -> &Piece {
        &self.session.current_piece
    }

    pub fn next_piece(&self) -> &OrientedPiece {
        &self.session.next_piece
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.session.lines_cleared
    }

    pub fn level(&self) -> u32 {
        self.session.level
    }

    pub fn state(&self) -> GameState {
        self.session.state
    }

    pub fn is_game_over(&self) -> bool {
        self.session.state == GameState::GameOver
    }

    pub fn is_fast(&self) -> bool {
        self.session.fast_drop
    }

    pub fn highscores(&self) -> Highscores {
        self.highscores
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn drop_timer(&self) -> Option<TimerHandle> {
        self.session.drop_timer
    }

    pub fn frame_timer(&self) -> Option<TimerHandle> {
        self.session.frame_timer
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid: &self.session.grid,
            piece: &self.session.current_piece,
            next: &self.session.next_piece,
            score: self.session.score,
            lines_cleared: self.session.lines_cleared,
            level: self.session.level,
            highscores: self.highscores,
        }
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------------

    /// At most one drop timer is outstanding: any prior one is cancelled.
    fn schedule_drop(&mut self) {
        if let Some(handle) = self.session.drop_timer.take() {
            self.clock.cancel(handle);
        }
        if self.is_game_over() {
            return;
        }
        let interval = self.session.drop_interval();
        self.session.drop_timer = Some(self.clock.schedule_after(interval));
    }

    fn schedule_frame(&mut self) {
        if let Some(handle) = self.session.frame_timer.take() {
            self.clock.cancel(handle);
        }
        if self.is_game_over() {
            return;
        }
        self.session.frame_timer = Some(self.clock.schedule_after(FRAME_INTERVAL));
    }

    fn halt_timers(&mut self) {
        for handle in [self.session.drop_timer.take(), self.session.frame_timer.take()]
            .into_iter()
            .flatten()
        {
            self.clock.cancel(handle);
        }
    }

    /// Dispatches a fired timer. Handles that are no longer current are
    /// ignored.
    pub fn on_timer(&mut self, handle: TimerHandle) -> Wake {
        if self.session.drop_timer == Some(handle) {
            self.session.drop_timer = None;
            self.tick();
            Wake::Descended
        } else if self.session.frame_timer == Some(handle) {
            self.session.frame_timer = None;
            self.schedule_frame();
            Wake::Render
        } else {
            Wake::Stale
        }
    }

    // ------------------------------------------------------------------------
    // Descent and locking
    // ------------------------------------------------------------------------

    /// One gravity step: move down a row, or lock when the floor or a
    /// settled cell is in the way. Always reschedules the drop clock.
    pub fn tick(&mut self) {
        if self.is_game_over() {
            return;
        }
        let piece = &self.session.current_piece;
        let below = piece.position.offset(0, 1);
        let grid = &self.session.grid;
        if exceeds_floor(grid, &piece.shape, below) || is_blocked(grid, &piece.shape, below) {
            self.lock_and_spawn();
        } else {
            self.session.current_piece.position = below;
            self.events.push(GameEvent::PieceMoved);
        }
        self.schedule_drop();
    }

    fn lock_piece(&mut self) {
        let piece = &self.session.current_piece;
        let cell = CellState::Filled(piece.kind.color().locked());
        for block in piece.blocks() {
            self.session.grid.set(block.col, block.row, cell);
        }
        self.events.push(GameEvent::PieceLocked);
    }

    /// Clears every full row and returns how many went.
    pub fn clear_lines(&mut self) -> u32 {
        let cleared = self.session.grid.clear_full_rows() as u32;
        if cleared > 0 {
            self.session.lines_cleared += cleared;
            self.events.push(GameEvent::LinesCleared(cleared));
        }
        cleared
    }

    fn update_level(&mut self) {
        let level = level_for_lines(self.session.lines_cleared);
        if level > self.session.level {
            self.events.push(GameEvent::LevelUp(level));
        }
        self.session.level = level;
    }

    fn lock_and_spawn(&mut self) {
        let rows_fallen = (self.session.current_piece.position.row - SPAWN_POSITION.row).max(0) as u32;
        let level_before = self.session.level;
        self.lock_piece();
        let cleared = self.clear_lines();
        self.session.score += lock_points(rows_fallen, cleared as usize, level_before);
        self.update_level();
        self.update_highscores();
        self.spawn();
    }

    /// Promotes the queued piece. A collision at the spawn point ends the game;
    /// otherwise a fresh next piece is drawn.
    pub fn spawn(&mut self) {
        if self.is_game_over() {
            return;
        }
        let current = Piece::place(self.session.next_piece.clone(), SPAWN_POSITION);
        let blocked = is_blocked(&self.session.grid, &current.shape, current.position);
        self.session.current_piece = current;
        if blocked {
            self.game_over();
            return;
        }
        self.session.next_piece = Session::draw(self.piece_provider.as_mut());
    }

    fn game_over(&mut self) {
        self.session.state = GameState::GameOver;
        self.halt_timers();
        self.events.push(GameEvent::GameOver);
    }

    fn update_highscores(&mut self) {
        if self.session.cheat_used {
            return;
        }
        let (score, level) = (self.session.score, self.session.level);
        if self.highscores.record(score, level, &mut self.store) {
            self.events.push(GameEvent::NewBest(score));
        }
    }

    // ------------------------------------------------------------------------
    // Player actions
    // ------------------------------------------------------------------------

    /// Shifts one column; `delta` is -1 for left, 1 for right.
    pub fn move_horizontal(&mut self, delta: i32) -> bool {
        if self.is_game_over() || delta == 0 {
            return false;
        }
        let delta = delta.signum();
        let piece = &self.session.current_piece;
        if is_horizontal_move_blocked(&self.session.grid, &piece.shape, piece.position, delta) {
            return false;
        }
        let target = piece.position.offset(delta, 0);
        self.session.current_piece.position = target;
        self.events.push(GameEvent::PieceMoved);
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.move_horizontal(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_horizontal(1)
    }

    /// Rotates a quarter turn clockwise from the template. A shape that
    /// would poke through the right wall is nudged left by the overflow;
    /// no other correction is tried.
    pub fn rotate(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        let piece = &self.session.current_piece;
        let candidate = OrientedPiece::new(piece.kind, piece.orientation + 1);
        let grid = &self.session.grid;
        let overflow = right_overflow(grid, &candidate.shape, piece.position);
        let corrected = piece.position.offset(-overflow, 0);
        if exceeds_floor(grid, &candidate.shape, corrected)
            || is_blocked(grid, &candidate.shape, corrected)
        {
            return false;
        }
        self.session.current_piece = Piece::place(candidate, corrected);
        self.events.push(GameEvent::PieceRotated);
        true
    }

    pub fn soft_drop_start(&mut self) {
        if self.is_game_over() || self.session.fast_drop {
            return;
        }
        self.session.fast_drop = true;
        self.tick();
    }

    pub fn soft_drop_stop(&mut self) {
        self.session.fast_drop = false;
    }

    /// Jumps far ahead in lines and score. Works once per session and turns
    /// highscore tracking off for the rest of it.
    pub fn activate_cheat(&mut self) -> bool {
        if self.is_game_over() || self.session.cheat_used {
            return false;
        }
        self.session.cheat_used = true;
        self.session.lines_cleared = CHEAT_LINES;
        self.session.score += CHEAT_BONUS;
        self.update_level();
        self.events.push(GameEvent::CheatActivated);
        self.tick();
        true
    }

    /// Throws the session away and starts a new one on an empty grid.
    pub fn retry(&mut self) {
        self.halt_timers();
        self.session = Session::start(self.piece_provider.as_mut());
        self.events.clear();
        self.events.push(GameEvent::GameRestarted);
        self.begin();
    }
}

impl Game<TimerQueue, MemoryStore> {
    /// Game on a prepared grid with a manual clock and in-memory store.
    pub fn with_grid(grid: Grid, current_piece: Piece) -> Self {
        let provider = Box::new(RandomPieceProvider::new());
        Self::with_grid_and_provider(grid, current_piece, provider)
    }

    pub fn with_grid_and_provider(
        grid: Grid,
        current_piece: Piece,
        mut provider: Box<dyn PieceProvider>,
    ) -> Self {
        let next = Session::draw(provider.as_mut());
        let session = Session::new(grid, current_piece, next);
        Self::with_session(TimerQueue::new(), MemoryStore::new(), provider, session)
    }
}

impl Default for Game<TimerQueue, MemoryStore> {
    fn default() -> Self {
        Self::new(TimerQueue::new(), MemoryStore::new())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::color::Rgb;

    pub const FILL: CellState = CellState::Filled(Rgb::new(0x80, 0x80, 0x80));

    pub fn empty_grid() -> Grid {
        Grid::new()
    }

    pub fn fill_row(grid: &mut Grid, row: usize) {
        for col in 0..GRID_WIDTH {
            grid.set(col as i32, row as i32, FILL);
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, row: usize, gap_col: usize) {
        for col in 0..GRID_WIDTH {
            if col != gap_col {
                grid.set(col as i32, row as i32, FILL);
            }
        }
    }
}
