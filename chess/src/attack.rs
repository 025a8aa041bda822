//! Attack tables and attack maps

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::movegen;
use crate::piece::Kind;
use crate::types::{Color, Square};

#[inline]
const fn bb(val: u64) -> Bitboard {
    Bitboard::from_raw(val)
}

include!(concat!(env!("OUT_DIR"), "/near_attacks.rs"));

/// Squares adjacent to `sq`
#[inline]
pub fn king(sq: Square) -> Bitboard {
    unsafe { *KING_ATTACKS.get_unchecked(sq.index()) }
}

/// Squares a knight on `sq` jumps to
#[inline]
pub fn knight(sq: Square) -> Bitboard {
    unsafe { *KNIGHT_ATTACKS.get_unchecked(sq.index()) }
}

/// Squares threatened by a pawn of color `color` standing on `sq`
///
/// Only the two forward diagonals are included: a pawn never threatens the square in front of it.
#[inline]
pub fn pawn(color: Color, sq: Square) -> Bitboard {
    match color {
        Color::White => unsafe { *WHITE_PAWN_ATTACKS.get_unchecked(sq.index()) },
        Color::Black => unsafe { *BLACK_PAWN_ATTACKS.get_unchecked(sq.index()) },
    }
}

/// Whether the opposing king should contribute its adjacent squares to an attack map
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KingThreats {
    Include,
    Exclude,
}

/// Returns all the squares attacked by the pieces of color `by`
///
/// Pawns contribute their diagonals, whatever stands there. Other non-king pieces contribute
/// their pseudo-legal destinations, so a square holding a piece of color `by.inv()` is attacked
/// if it can be captured. Kings are taken from the precomputed table and never go through king
/// move generation, which itself depends on attack maps.
pub fn attack_map(b: &Board, by: Color, kings: KingThreats) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for sq in Square::iter() {
        let p = b.piece(sq);
        if p.color() != Some(by) {
            continue;
        }
        match p.kind() {
            Kind::Empty => {}
            Kind::Pawn { .. } => res |= pawn(by, sq),
            Kind::King { .. } => {
                if kings == KingThreats::Include {
                    res |= king(sq);
                }
            }
            Kind::Knight | Kind::Bishop | Kind::Rook { .. } | Kind::Queen => {
                res |= movegen::pseudo_legal(b, sq).iter().copied().collect::<Bitboard>();
            }
        }
    }
    res
}

/// Returns `true` if `sq` is attacked by the pieces of color `by`
#[inline]
pub fn is_attacked(b: &Board, sq: Square, by: Color) -> bool {
    attack_map(b, by, KingThreats::Include).has(sq)
}
