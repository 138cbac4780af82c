//! Search: iterative deepening driver, negamax core, and support
//! tables.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tt;

use shakmaty::Move;
use tracing::debug;

use crate::eval::evaluate;
use crate::eval::phase::game_phase;
use crate::position::Game;
use heuristics::Heuristics;
use negamax::{SearchContext, alpha_beta};
use ordering::{LmrTable, sorted_moves};
use tt::TranspositionTable;

pub use control::SearchControl;
pub use negamax::{CHECKMATE, MAX_DEPTH, MAX_PLY, is_mate_score};

/// First depth searched by iterative deepening.
const STARTING_DEPTH: i32 = 1;

/// Half-width of the initial aspiration window in centipawns.
const ASPIRATION_WINDOW_DEFAULT: i32 = 100;

/// Factor applied to the failing side of the window on a re-search.
const ASPIRATION_INCREASE_EXPONENT: i32 = 4;

/// Aspiration windows are only used at this depth or deeper.
const ASPIRATION_WINDOW_DEPTH: i32 = 5;

/// Snapshot of one completed iteration, handed to the driver's
/// callback so the front-end can print an `info` line.
pub struct Iteration<'a> {
    /// Completed search depth.
    pub depth: i32,
    /// Deepest quiescence ply reached so far.
    pub seldepth: usize,
    /// Score in centipawns (or a mate score) for the side to move.
    pub score: i32,
    /// Nodes visited so far this search.
    pub nodes: u64,
    /// Transposition table occupancy in permille.
    pub hashfull: u64,
    /// Principal variation from the root.
    pub pv: &'a [Move],
}

/// Result of a completed (or cancelled) search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move of the last completed depth, or the top-ordered legal
    /// move if no depth completed. `None` only when the root has no
    /// legal moves.
    pub best_move: Option<Move>,
    /// Principal variation of the last completed depth.
    pub pv: Vec<Move>,
    /// Score of the last completed depth, side-to-move perspective.
    pub score: i32,
    /// Total nodes visited.
    pub nodes: u64,
    /// Last fully completed depth (0 if none).
    pub depth: i32,
    /// Deepest quiescence ply reached.
    pub seldepth: usize,
}

/// Iterative-deepening searcher owning the transposition table.
pub struct Searcher {
    tt: TranspositionTable,
}

impl Searcher {
    /// Create a searcher with an empty transposition table.
    pub fn new() -> Self {
        Self {
            tt: TranspositionTable::new(),
        }
    }

    /// Search `root` to at most `depth_limit` plies.
    ///
    /// `history` holds the Zobrist hashes of the positions that led to
    /// `root`, oldest first, for repetition detection across the game.
    /// `on_iter` fires after every completed depth. The search stops on
    /// the control's stop flag or deadline, when the depth limit is
    /// reached, or as soon as a completed depth proves a forced mate.
    pub fn search<F>(
        &mut self,
        root: &Game,
        history: &[u64],
        depth_limit: i32,
        control: &SearchControl,
        mut on_iter: F,
    ) -> SearchResult
    where
        F: FnMut(&Iteration<'_>),
    {
        self.tt.clear();

        let mut ctx = SearchContext {
            nodes: 0,
            seldepth: 0,
            tt: &mut self.tt,
            control,
            heuristics: Heuristics::new(),
            lmr: LmrTable::new(),
            repetitions: history.to_vec(),
        };

        let depth_limit = depth_limit.clamp(STARTING_DEPTH, MAX_DEPTH - 1);

        // First aspiration guess, before any depth has been searched.
        let mut gamma = evaluate(root);

        let mut best_move: Option<Move> = None;
        let mut best_pv: Vec<Move> = Vec::new();
        let mut best_score = -CHECKMATE;
        let mut completed_depth = 0;

        let mut depth = STARTING_DEPTH;
        while depth <= depth_limit && !control.halted(ctx.nodes) {
            let iteration_score = if depth < ASPIRATION_WINDOW_DEPTH {
                alpha_beta(root, 0, depth, -CHECKMATE, CHECKMATE, true, &mut ctx)
            } else {
                aspiration_search(root, depth, &mut gamma, &mut ctx)
            };

            // An aborted iteration is discarded; the previous depth
            // remains authoritative.
            let Some(score) = iteration_score else { break };

            gamma = score;

            let pv = extract_pv(root, ctx.tt);
            if let Some(first) = pv.first() {
                best_move = Some(first.clone());
            }
            best_pv = pv;
            best_score = score;
            completed_depth = depth;

            on_iter(&Iteration {
                depth,
                seldepth: ctx.seldepth,
                score,
                nodes: ctx.nodes,
                hashfull: ctx.tt.hashfull(),
                pv: &best_pv,
            });

            // A found mate cannot improve with more depth.
            if is_mate_score(score) {
                break;
            }

            depth += 1;
        }

        // Aborted before depth 1 completed: fall back to the move the
        // ordering likes best, so a bestmove is always available.
        if best_move.is_none() {
            let phase = game_phase(root.board());
            best_move = sorted_moves(root, 0, phase, None, &ctx.heuristics)
                .first()
                .cloned();
        }

        SearchResult {
            best_move,
            pv: best_pv,
            score: best_score,
            nodes: ctx.nodes,
            depth: completed_depth,
            seldepth: ctx.seldepth,
        }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher").field("tt", &self.tt).finish()
    }
}

/// Search one depth inside an aspiration window around `gamma`,
/// widening the failing side by [`ASPIRATION_INCREASE_EXPONENT`] until
/// the score fits or the window covers the full range.
fn aspiration_search(
    root: &Game,
    depth: i32,
    gamma: &mut i32,
    ctx: &mut SearchContext<'_>,
) -> Option<i32> {
    let mut lower = -ASPIRATION_WINDOW_DEFAULT;
    let mut higher = ASPIRATION_WINDOW_DEFAULT;

    loop {
        let alpha = (*gamma + lower).max(-CHECKMATE);
        let beta = (*gamma + higher).min(CHECKMATE);

        let score = alpha_beta(root, 0, depth, alpha, beta, true, ctx)?;
        *gamma = score;

        if score <= alpha && alpha > -CHECKMATE {
            debug!(depth, score, "aspiration fail low");
            lower = lower.saturating_mul(ASPIRATION_INCREASE_EXPONENT);
        } else if score >= beta && beta < CHECKMATE {
            debug!(depth, score, "aspiration fail high");
            higher = higher.saturating_mul(ASPIRATION_INCREASE_EXPONENT);
        } else {
            return Some(score);
        }
    }
}

/// Rebuild the principal variation by walking best-move pointers
/// through the transposition table, guarding against cycles with the
/// set of visited hashes.
fn extract_pv(root: &Game, tt: &TranspositionTable) -> Vec<Move> {
    let mut pv = Vec::new();
    let mut game = root.clone();
    let mut seen: Vec<u64> = Vec::new();

    while pv.len() < MAX_PLY {
        let hash = game.hash();
        if seen.contains(&hash) {
            break;
        }
        let Some(entry) = tt.get(hash) else { break };
        let Some(mv) = entry.best_move.clone() else {
            break;
        };
        if !game.is_legal(&mv) {
            break;
        }
        seen.push(hash);
        pv.push(mv.clone());
        game = game.make_move(&mv);
    }

    pv
}
