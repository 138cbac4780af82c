//! Static evaluation: material, piece-square tables, mobility, pawn
//! structure, and bishop pair, tapered between midgame and endgame.

pub mod material;
pub mod mobility;
pub mod pawns;
pub mod phase;
pub mod pst;

use shakmaty::{ByColor, Color, Role};

use crate::position::Game;
use material::{bishop_pair_bonus, piece_value, tempo_bonus};
use mobility::mobility_bonus;
use pawns::pawn_structure;
use phase::game_phase;
use pst::{advance_bonus, pov_square, psqt_value};

/// Sign for accumulating white-perspective terms: +1 for White, -1 for
/// Black.
pub fn color_mod(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Score a position in centipawns from the side to move's perspective.
///
/// Drawn positions (stalemate, insufficient material) score 0. Otherwise
/// every piece contributes its phased value, piece-square bonus, advance
/// bonus, and mobility bonus; pawn structure and the bishop pair are
/// scored per side; and the side to move receives a phased tempo bonus
/// after the perspective flip.
pub fn evaluate(game: &Game) -> i32 {
    if game.is_insufficient_material() || game.is_stalemate() {
        return 0;
    }

    let board = game.board();
    let phase = game_phase(board);

    let mut score = 0;
    let mut bishops = ByColor { white: 0, black: 0 };
    let mut pawn_files = ByColor {
        white: [0i32; 8],
        black: [0i32; 8],
    };

    for sq in board.occupied() {
        let Some(piece) = board.piece_at(sq) else {
            continue;
        };
        let pov = pov_square(piece.color, sq);
        let sign = color_mod(piece.color);

        score += psqt_value(piece.role, pov, phase) * sign;
        score += advance_bonus(pov) * sign;
        score += piece_value(piece.role, phase) * sign;
        score += mobility_bonus(piece.role, board.attacks_from(sq).count(), phase) * sign;

        match (piece.role, piece.color) {
            (Role::Bishop, Color::White) => bishops.white += 1,
            (Role::Bishop, Color::Black) => bishops.black += 1,
            (Role::Pawn, Color::White) => pawn_files.white[sq.file() as usize] += 1,
            (Role::Pawn, Color::Black) => pawn_files.black[sq.file() as usize] += 1,
            _ => {}
        }
    }

    if bishops.white == 2 {
        score += bishop_pair_bonus(phase);
    }
    if bishops.black == 2 {
        score -= bishop_pair_bonus(phase);
    }

    score += pawn_structure(&pawn_files, phase);

    // Negamax wants the score from the mover's point of view.
    score *= color_mod(game.turn());

    score + tempo_bonus(phase)
}
