//! Negamax alpha-beta search with quiescence, PVS, LMR, null-move and
//! futility pruning.
//!
//! Cancellation is a value, not an exception: [`alpha_beta`] returns
//! `None` the moment the stop flag or deadline fires, and every caller
//! propagates it with `?` before touching any table. An aborted frame
//! therefore never stores a half-searched result.

use shakmaty::Move;

use crate::eval::evaluate;
use crate::eval::phase::game_phase;
use crate::position::Game;
use crate::search::control::SearchControl;
use crate::search::heuristics::Heuristics;
use crate::search::ordering::{
    LMR_LEAF_DISTANCE, LMR_MOVES, LmrTable, is_quiet_move, sort_moves,
};
use crate::search::tt::{Bound, TranspositionTable, TtEntry};

/// Score of delivering checkmate at the root. Far above any reachable
/// static evaluation.
pub const CHECKMATE: i32 = 100_000;

/// Width of the reserved band under [`CHECKMATE`] that encodes
/// ply-to-mate information.
const MATE_RANGE: i32 = 1_000;

/// Iterative deepening never exceeds this depth.
pub const MAX_DEPTH: i32 = 128;

/// Hard ply ceiling for table sizing and runaway quiescence lines.
pub const MAX_PLY: usize = 250;

/// Forward futility margins indexed by remaining depth.
const FUTILITY_MARGINS: [i32; 6] = [0, 100, 200, 300, 400, 500];

/// Maximum remaining depth for forward futility pruning.
const FUTILITY_DEPTH: i32 = 5;

/// Reverse futility margins indexed by remaining depth.
const REVERSE_FUTILITY_MARGINS: [i32; 8] = [0, 70, 150, 240, 340, 450, 580, 720];

/// Maximum remaining depth for reverse futility pruning.
const REVERSE_FUTILITY_DEPTH: i32 = 7;

/// Whether a score encodes a forced mate rather than an evaluation.
pub fn is_mate_score(score: i32) -> bool {
    score.abs() + MATE_RANGE >= CHECKMATE
}

/// Mutable search state threaded through the recursion.
pub(super) struct SearchContext<'a> {
    /// Nodes visited so far.
    pub nodes: u64,
    /// Deepest quiescence ply reached.
    pub seldepth: usize,
    /// Transposition table, cleared by the driver per search.
    pub tt: &'a mut TranspositionTable,
    /// Stop flag and deadline.
    pub control: &'a SearchControl,
    /// Killer, countermove, and history tables.
    pub heuristics: Heuristics,
    /// Late-move reduction table.
    pub lmr: LmrTable,
    /// Hashes of every position on the path here: game history first,
    /// then the search path. Pushed by the parent around each recursive
    /// call, so aborts can never unbalance it.
    pub repetitions: Vec<u64>,
}

/// Negamax alpha-beta. `current_depth` counts down from the root,
/// `max_depth` is this iteration's horizon, and the score returned is
/// from the side to move's perspective. `None` means the search was
/// halted and the value must be discarded.
pub(super) fn alpha_beta(
    game: &Game,
    current_depth: i32,
    max_depth: i32,
    mut alpha: i32,
    mut beta: i32,
    can_null_move: bool,
    ctx: &mut SearchContext<'_>,
) -> Option<i32> {
    if ctx.control.halted(ctx.nodes) {
        return None;
    }

    ctx.nodes += 1;
    let alpha_orig = alpha;

    let ply = current_depth as usize;
    if ply >= MAX_PLY {
        return Some(evaluate(game));
    }

    let hash = game.hash();

    // A position repeated anywhere on the path here is a draw. Only the
    // last `halfmoves` plies can contain a repetition.
    if current_depth != 0 {
        let lookback = (game.halfmoves() as usize).min(ctx.repetitions.len());
        if ctx.repetitions[ctx.repetitions.len() - lookback..].contains(&hash) {
            return Some(0);
        }
    }

    // Mate distance pruning: even a forced mate here cannot beat one
    // already found closer to the root.
    if current_depth != 0 {
        alpha = alpha.max(-CHECKMATE + current_depth);
        beta = beta.min(CHECKMATE - current_depth - 1);
        if alpha >= beta {
            return Some(alpha);
        }
    }

    let pv_node = beta - alpha > 1;
    let remaining = max_depth - current_depth;

    let mut hash_move: Option<Move> = None;
    let mut tt_score: Option<i32> = None;

    if let Some(entry) = ctx.tt.get(hash) {
        if !pv_node && entry.leaf_distance as i32 >= remaining {
            match entry.flag {
                Bound::Lower if entry.value >= beta => return Some(beta),
                Bound::Upper if entry.value <= alpha => return Some(alpha),
                Bound::Exact => return Some(entry.value),
                _ => {}
            }
        }
        hash_move = entry.best_move.clone();
        tt_score = Some(entry.value);
    }

    if current_depth >= max_depth {
        return quiescence(game, max_depth, max_depth, alpha, beta, ctx);
    }

    let moves = game.legal_moves();
    let in_check = game.is_check();
    let game_over = moves.is_empty() || game.is_insufficient_material();
    let phase = game_phase(game.board());

    let mut futility_prunable = false;
    let mut static_score = tt_score;

    if !pv_node && !in_check && !game_over {
        // Null move reduction: if passing still fails high, the real
        // moves will too.
        if can_null_move && current_depth != 0 && remaining >= 3 {
            let s = *static_score.get_or_insert_with(|| evaluate(game));
            let reduction = 3 + remaining / 3 + ((s - beta).div_euclid(200)).min(3);
            if reduction > 0
                && let Some(null_game) = game.make_null()
            {
                ctx.repetitions.push(hash);
                let result = alpha_beta(
                    &null_game,
                    current_depth + reduction,
                    max_depth,
                    -beta,
                    -beta + 1,
                    false,
                    ctx,
                );
                ctx.repetitions.pop();
                let score = -result?;
                if score >= beta && !is_mate_score(score) {
                    return Some(beta);
                }
            }
        }

        // Futility: hopeless nodes only get to try loud moves.
        if remaining <= FUTILITY_DEPTH {
            let s = *static_score.get_or_insert_with(|| evaluate(game));
            if s + FUTILITY_MARGINS[remaining as usize] < alpha {
                futility_prunable = true;
            }
        }

        // Reverse futility: a node this far above beta will not sink.
        if remaining <= REVERSE_FUTILITY_DEPTH {
            let s = *static_score.get_or_insert_with(|| evaluate(game));
            if s - REVERSE_FUTILITY_MARGINS[remaining as usize] > beta {
                return Some(s);
            }
        }
    }

    if game_over {
        let score = if moves.is_empty() && in_check {
            -CHECKMATE + current_depth
        } else {
            0
        };
        ctx.tt.put(
            hash,
            TtEntry {
                flag: Bound::Exact,
                leaf_distance: remaining.clamp(0, u8::MAX as i32) as u8,
                value: score,
                best_move: None,
            },
        );
        return Some(score);
    }

    let mut moves = moves;
    sort_moves(
        game,
        &mut moves,
        ply,
        phase,
        hash_move.as_ref(),
        &ctx.heuristics,
    );

    let mut best_move: Option<Move> = None;
    let mut move_count = 0usize;

    for mv in &moves {
        move_count += 1;
        let quiet = is_quiet_move(game, mv, 0);

        if futility_prunable && quiet && !is_mate_score(alpha) && !is_mate_score(beta) {
            continue;
        }

        // Late move reduction: quiet moves sorted far down the list get
        // a shallower first look.
        let mut reduction = 0;
        if move_count >= LMR_MOVES + 2 * pv_node as usize
            && quiet
            && !in_check
            && remaining >= LMR_LEAF_DISTANCE
            && !game.gives_check(mv)
        {
            reduction = ctx.lmr.reduction(remaining, move_count);
        }

        let child = game.make_move(mv);

        // PVS: probe with a null window at the (possibly reduced)
        // depth, and only pay for a full-window re-search on surprise.
        ctx.repetitions.push(hash);
        let probe = alpha_beta(
            &child,
            current_depth + 1 + reduction,
            max_depth,
            -alpha - 1,
            -alpha,
            true,
            ctx,
        );
        ctx.repetitions.pop();
        let mut score = -probe?;

        if score > alpha && score < beta {
            ctx.repetitions.push(hash);
            let full = alpha_beta(&child, current_depth + 1, max_depth, -beta, -alpha, true, ctx);
            ctx.repetitions.pop();
            score = -full?;
        }

        if score >= beta {
            if quiet {
                ctx.heuristics.killers.store(ply, mv.clone());
                if let Some(from) = mv.from() {
                    ctx.heuristics.history.bump(
                        game.turn(),
                        from as usize,
                        mv.to() as usize,
                        remaining,
                    );
                }
                if game.plies() >= 2
                    && let Some(prev) = game.last_move()
                {
                    ctx.heuristics.counters.store(prev, mv.clone());
                }
            }
            ctx.tt.put(
                hash,
                TtEntry {
                    flag: Bound::Lower,
                    leaf_distance: remaining as u8,
                    value: beta,
                    best_move: Some(mv.clone()),
                },
            );
            return Some(beta);
        }

        if score > alpha {
            alpha = score;
            best_move = Some(mv.clone());
        }
    }

    let flag = if alpha <= alpha_orig {
        Bound::Upper
    } else {
        Bound::Exact
    };
    ctx.tt.put(
        hash,
        TtEntry {
            flag,
            leaf_distance: remaining as u8,
            value: alpha,
            best_move,
        },
    );

    Some(alpha)
}

/// Quiescence search: play out captures, promotions, evasions, and
/// shallow checks until the position is calm enough to trust the static
/// evaluation.
///
/// Quiescence never aborts on its own; its lines are bounded by
/// loudness, so cancellation latency stays one full-width node.
pub(super) fn quiescence(
    game: &Game,
    current_depth: i32,
    max_depth: i32,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext<'_>,
) -> Option<i32> {
    ctx.nodes += 1;
    ctx.seldepth = ctx.seldepth.max(current_depth as usize);

    if current_depth as usize >= MAX_PLY {
        return Some(evaluate(game));
    }

    // Stand pat: the side to move may decline all tactics.
    let stand_pat = evaluate(game);
    if stand_pat >= beta {
        return Some(beta);
    }
    alpha = alpha.max(stand_pat);

    let qs_depth = current_depth - max_depth;
    let phase = game_phase(game.board());

    let mut loud: Vec<Move> = game
        .legal_moves()
        .into_iter()
        .filter(|mv| !is_quiet_move(game, mv, qs_depth))
        .collect();
    sort_moves(
        game,
        &mut loud,
        current_depth as usize,
        phase,
        None,
        &ctx.heuristics,
    );

    for mv in &loud {
        let child = game.make_move(mv);
        let score = -quiescence(&child, current_depth + 1, max_depth, -beta, -alpha, ctx)?;

        if score >= beta {
            return Some(beta);
        }
        alpha = alpha.max(score);
    }

    Some(alpha)
}
