//! Pseudo-legal move generation
//!
//! Generators here look only at the piece's movement rule and at the occupancy of the board. They
//! don't care whether the move leaves the mover's own king in check, with one exception: kings
//! never step onto an attacked square and never castle through one.

use crate::attack;
use crate::board::Board;
use crate::castling::CastlingSide;
use crate::geometry;
use crate::legal;
use crate::piece::{Kind, Piece};
use crate::types::{Color, Square};

use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

/// Destinations of a single piece
///
/// No piece ever has more than 27 destinations (a queen in the center of an empty board), so the
/// list is stored inline and cloning it never allocates.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash)]
pub struct MoveList(ArrayVec<Square, 32>);

impl Deref for MoveList {
    type Target = ArrayVec<Square, 32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Square;
    type IntoIter = slice::Iter<'a, Square>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Square> for MoveList {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        MoveList(iter.into_iter().collect())
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }

    pub fn has(&self, sq: Square) -> bool {
        self.0.contains(&sq)
    }
}

/// Pushes `dst` if it is empty or holds an enemy of `p`
fn push_step(b: &Board, p: &Piece, dst: Square, res: &mut MoveList) {
    let target = b.piece(dst);
    if target.is_empty() || p.is_enemy_of(target) {
        res.push(dst);
    }
}

fn gen_rays(b: &Board, p: &Piece, dirs: &[(isize, isize)], res: &mut MoveList) {
    for &(d_row, d_col) in dirs {
        let mut cur = p.square();
        while let Some(dst) = cur.try_shift(d_row, d_col) {
            let target = b.piece(dst);
            if target.is_empty() {
                res.push(dst);
                cur = dst;
                continue;
            }
            if p.is_enemy_of(target) {
                res.push(dst);
            }
            break;
        }
    }
}

fn gen_knight(b: &Board, p: &Piece, res: &mut MoveList) {
    for dst in attack::knight(p.square()) {
        push_step(b, p, dst, res);
    }
}

fn gen_pawn(b: &Board, p: &Piece, color: Color, res: &mut MoveList) {
    let src = p.square();
    let fwd = geometry::pawn_forward_delta(color);

    if let Some(one) = src.try_shift(fwd, 0) {
        if b.piece(one).is_empty() {
            res.push(one);
            if src.rank() == geometry::pawn_start_rank(color) {
                if let Some(two) = one.try_shift(fwd, 0) {
                    if b.piece(two).is_empty() {
                        res.push(two);
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        let dst = match src.try_shift(fwd, d_col) {
            Some(dst) => dst,
            None => continue,
        };
        let target = b.piece(dst);
        if p.is_enemy_of(target) {
            res.push(dst);
            continue;
        }
        if target.is_empty() {
            // En passant: the captured pawn stands beside the mover, not on the destination
            let beside = b.piece(Square::new(src.row(), dst.col()));
            if p.is_enemy_of(beside) && beside.is_double_stepped_pawn() {
                res.push(dst);
            }
        }
    }
}

fn gen_castling(b: &Board, p: &Piece, color: Color, res: &mut MoveList) {
    let src = p.square();
    if !p.is_unmoved() || src != CastlingSide::king_src(color) {
        return;
    }
    for side in CastlingSide::iter() {
        let rook = b.piece(side.rook_src(color));
        if rook.color() != Some(color) || rook.kind() != (Kind::Rook { moved: false }) {
            continue;
        }
        if side
            .between(color)
            .into_iter()
            .any(|sq| !b.piece(sq).is_empty())
        {
            continue;
        }
        if side
            .king_path(color)
            .iter()
            .all(|&sq| legal::is_king_safe_at(b, src, sq))
        {
            res.push(side.king_dst(color));
        }
    }
}

fn gen_king(b: &Board, p: &Piece, color: Color, res: &mut MoveList) {
    for dst in attack::king(p.square()) {
        if b.piece(dst).color() == Some(color) {
            continue;
        }
        if legal::is_king_safe_at(b, p.square(), dst) {
            res.push(dst);
        }
    }
    gen_castling(b, p, color, res);
}

/// Returns the pseudo-legal destinations of the piece on `src`
///
/// Empty squares have no destinations. King destinations are already safe (see the module docs).
/// The board is never modified.
pub fn pseudo_legal(b: &Board, src: Square) -> MoveList {
    let p = b.piece(src);
    let mut res = MoveList::new();
    let color = match p.color() {
        Some(c) => c,
        None => return res,
    };
    match p.kind() {
        Kind::Empty => {}
        Kind::Pawn { .. } => gen_pawn(b, p, color, &mut res),
        Kind::Knight => gen_knight(b, p, &mut res),
        Kind::Bishop => gen_rays(b, p, &geometry::DIAG_DIRECTIONS, &mut res),
        Kind::Rook { .. } => gen_rays(b, p, &geometry::LINE_DIRECTIONS, &mut res),
        Kind::Queen => {
            gen_rays(b, p, &geometry::LINE_DIRECTIONS, &mut res);
            gen_rays(b, p, &geometry::DIAG_DIRECTIONS, &mut res);
        }
        Kind::King { .. } => gen_king(b, p, color, &mut res),
    }
    res
}
