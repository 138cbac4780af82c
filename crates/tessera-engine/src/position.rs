//! Thin adapter over the `shakmaty` rules library.
//!
//! The search and evaluator never touch `shakmaty` types beyond what this
//! module re-exports: a [`Game`] bundles the position with the move that
//! produced it (consumed by the countermove and recapture ordering
//! heuristics) and the number of plies played since the root was set up.
//!
//! `Game` has value semantics: [`make_move`](Game::make_move) and
//! [`make_null`](Game::make_null) return a fresh `Game`, so every "push"
//! is undone by dropping the child. The repetition hash stack lives in the
//! search context, not here.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Board, CastlingMode, Chess, Color, EnPassantMode, Move, MoveList, Position};

/// Errors raised while building a position from UCI text.
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    /// The FEN string could not be parsed or describes an illegal setup.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The offending FEN string.
        fen: String,
    },

    /// A move was not legal in the position it was applied to.
    #[error("illegal move: {uci_move}")]
    IllegalMove {
        /// The offending UCI move string.
        uci_move: String,
    },
}

/// A chess position plus the context the search wants alongside it.
#[derive(Debug, Clone)]
pub struct Game {
    pos: Chess,
    last_move: Option<Move>,
    plies: u32,
}

impl Game {
    /// The standard starting position.
    pub fn starting_position() -> Self {
        Self {
            pos: Chess::default(),
            last_move: None,
            plies: 0,
        }
    }

    /// Build a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let parsed: Fen = fen.parse().map_err(|_| PositionError::InvalidFen {
            fen: fen.to_string(),
        })?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|_| PositionError::InvalidFen {
                fen: fen.to_string(),
            })?;
        Ok(Self {
            pos,
            last_move: None,
            plies: 0,
        })
    }

    /// Apply a move given in long algebraic UCI text (`e2e4`, `e7e8q`).
    pub fn play_uci(&self, uci: &str) -> Result<Self, PositionError> {
        let parsed: UciMove = uci.parse().map_err(|_| PositionError::IllegalMove {
            uci_move: uci.to_string(),
        })?;
        let mv = parsed
            .to_move(&self.pos)
            .map_err(|_| PositionError::IllegalMove {
                uci_move: uci.to_string(),
            })?;
        Ok(self.make_move(&mv))
    }

    /// The position after `mv`. The move must be legal.
    pub fn make_move(&self, mv: &Move) -> Self {
        let mut pos = self.pos.clone();
        pos.play_unchecked(mv);
        Self {
            pos,
            last_move: Some(mv.clone()),
            plies: self.plies + 1,
        }
    }

    /// The position after ceding the turn, or `None` when passing is not
    /// possible (the side to move is in check).
    pub fn make_null(&self) -> Option<Self> {
        let pos = self.pos.clone().swap_turn().ok()?;
        Some(Self {
            pos,
            last_move: None,
            plies: self.plies + 1,
        })
    }

    /// All legal moves in this position.
    pub fn legal_moves(&self) -> MoveList {
        self.pos.legal_moves()
    }

    /// Whether `mv` is legal here. Used when replaying moves out of the
    /// transposition table, which may hold a move from a hash collision.
    pub fn is_legal(&self, mv: &Move) -> bool {
        self.pos.legal_moves().contains(mv)
    }

    /// Whether playing `mv` leaves the opponent in check.
    pub fn gives_check(&self, mv: &Move) -> bool {
        let mut pos = self.pos.clone();
        pos.play_unchecked(mv);
        pos.is_check()
    }

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    /// Whether the side to move is checkmated.
    pub fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    /// Whether the side to move is stalemated.
    pub fn is_stalemate(&self) -> bool {
        self.pos.is_stalemate()
    }

    /// Whether neither side can force mate with the remaining material.
    pub fn is_insufficient_material(&self) -> bool {
        self.pos.is_insufficient_material()
    }

    /// Whether the game has ended (no legal moves, or a dead position).
    pub fn is_game_over(&self) -> bool {
        self.pos.is_game_over()
    }

    /// Halfmoves since the last capture or pawn move. Bounds how far
    /// back a repetition of this position can possibly occur.
    pub fn halfmoves(&self) -> u32 {
        self.pos.halfmoves()
    }

    /// 64-bit Zobrist hash of the position.
    pub fn hash(&self) -> u64 {
        self.pos.zobrist_hash::<Zobrist64>(EnPassantMode::Legal).0
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.pos.turn()
    }

    /// Piece placement.
    pub fn board(&self) -> &Board {
        self.pos.board()
    }

    /// The move that produced this position, if one is known. Reset by
    /// null moves so the recapture heuristic cannot chase a phantom.
    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    /// Plies played since this game was set up from FEN or startpos.
    pub fn plies(&self) -> u32 {
        self.plies
    }
}

/// Long algebraic UCI text for a move (`e2e4`, `e7e8q`).
pub fn move_to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}
