//! Check-safety filtering
//!
//! All the checks here are done on a scratch copy of the board. The live board is never touched.

use crate::attack::{self, KingThreats};
use crate::board::Board;
use crate::movegen::{self, MoveList};
use crate::types::Square;

/// Returns `true` if the king on `king_src` would not be attacked after stepping onto `dst`
///
/// Only the king is relocated on the scratch board, so whatever stands on `dst` is considered
/// captured. Passing `dst == king_src` checks whether the king is attacked where it stands.
pub fn is_king_safe_at(b: &Board, king_src: Square, dst: Square) -> bool {
    let color = match b.piece(king_src).color() {
        Some(c) => c,
        None => return false,
    };
    let mut scratch = b.clone();
    scratch.relocate(king_src, dst);
    !attack::is_attacked(&scratch, dst, color.inv())
}

/// Returns `true` if moving the piece from `src` to `dst` leaves the mover's own king in check
///
/// The move is fully applied on the scratch board, so en passant removal and castling rook
/// relocation are taken into account. Opposing kings are not treated as attackers.
///
/// A move onto the opposing king's square is never simulated, since the board doesn't model king
/// capture. Such a destination only exists when the opponent is already in check.
pub fn leaves_king_in_check(b: &Board, src: Square, dst: Square) -> bool {
    let color = match b.piece(src).color() {
        Some(c) => c,
        None => return false,
    };
    if dst == b.king_square(color.inv()) {
        return false;
    }
    let mut scratch = b.clone();
    scratch.move_piece(src, dst);
    attack::attack_map(&scratch, color.inv(), KingThreats::Exclude).has(scratch.king_square(color))
}

/// Removes the destinations in `moves` which leave the king of the piece on `src` in check
///
/// King destinations are kept as is, since king move generation already rejects unsafe squares.
pub fn filter(b: &Board, src: Square, moves: &mut MoveList) {
    if b.piece(src).is_king() {
        return;
    }
    moves.retain(|dst| !leaves_king_in_check(b, src, *dst));
}

/// Returns legal destinations of the piece on `src`
pub fn legal_moves(b: &Board, src: Square) -> MoveList {
    let mut moves = movegen::pseudo_legal(b, src);
    filter(b, src, &mut moves);
    moves
}
