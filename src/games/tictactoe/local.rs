//! Single-device game: both players share one client, no server involved.

use super::rules::{RuleError, apply_move, check_winner, is_draw, winning_line};
use super::types::{Board, Mark, Winner};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Wins per mark across rounds of a local game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Score {
    x: u32,
    o: u32,
}

impl Score {
    /// Records a win for `mark`.
    pub fn record(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x += 1,
            Mark::O => self.o += 1,
        }
    }

    /// Wins for `mark`.
    pub fn wins(&self, mark: Mark) -> u32 {
        match mark {
            Mark::X => self.x,
            Mark::O => self.o,
        }
    }

    /// Highest win count of either mark; this is what gets reported to the
    /// chat platform's score board.
    pub fn best(&self) -> u32 {
        self.x.max(self.o)
    }
}

/// What happened after a local move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalOutcome {
    /// Round continues, `next` to move.
    Continue {
        /// Mark to play next.
        next: Mark,
    },
    /// `mark` completed `line`.
    Won {
        /// Winning mark.
        mark: Mark,
        /// Cells to highlight.
        line: [usize; 3],
    },
    /// Board full, no line.
    Draw,
}

/// Hot-seat game state.
#[derive(Debug, Clone, Getters)]
pub struct LocalGame {
    board: Board,
    current_player: Mark,
    active: bool,
    winner: Option<Winner>,
    score: Score,
}

impl LocalGame {
    /// Creates a fresh game with X to move.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Mark::X,
            active: true,
            winner: None,
            score: Score::default(),
        }
    }

    /// Plays the current mark at `index`.
    ///
    /// Moves after the round ended are ignored and reported as the recorded
    /// result again, mirroring a board that no longer accepts clicks.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] for an out-of-range or occupied cell.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn play(&mut self, index: usize) -> Result<LocalOutcome, RuleError> {
        if !self.active {
            debug!("Round already over, ignoring move");
            return Ok(self.finished_outcome());
        }

        let mark = self.current_player;
        self.board = apply_move(&self.board, index, mark)?;

        if check_winner(&self.board, mark) {
            self.active = false;
            self.winner = Some(Winner::from(mark));
            self.score.record(mark);
            info!(%mark, "Local round won");
            return Ok(self.finished_outcome());
        }

        if is_draw(&self.board) {
            self.active = false;
            self.winner = Some(Winner::Draw);
            info!("Local round drawn");
            return Ok(LocalOutcome::Draw);
        }

        self.current_player = mark.opponent();
        Ok(LocalOutcome::Continue {
            next: self.current_player,
        })
    }

    /// Clears the board for another round, keeping the score.
    #[instrument(skip(self))]
    pub fn new_round(&mut self) {
        info!("Starting new local round");
        self.board = Board::new();
        self.current_player = Mark::X;
        self.active = true;
        self.winner = None;
    }

    fn finished_outcome(&self) -> LocalOutcome {
        match self.winner.and_then(Winner::mark) {
            Some(mark) => LocalOutcome::Won {
                mark,
                line: winning_line(&self.board, mark).unwrap_or_default(),
            },
            None if self.winner == Some(Winner::Draw) => LocalOutcome::Draw,
            None => LocalOutcome::Continue {
                next: self.current_player,
            },
        }
    }
}

impl Default for LocalGame {
    fn default() -> Self {
        Self::new()
    }
}
