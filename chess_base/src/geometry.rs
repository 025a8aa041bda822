use crate::types::{Color, File, Rank};

/// Row delta of a single pawn step forward
pub const fn pawn_forward_delta(c: Color) -> isize {
    match c {
        Color::White => -1,
        Color::Black => 1,
    }
}

/// Rank where the pawns of color `c` start and may double-step from
pub const fn pawn_start_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

/// Farthest rank for the pawns of color `c`
pub const fn promote_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

pub const fn castling_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

pub const KING_HOME_FILE: File = File::E;
pub const KINGSIDE_ROOK_FILE: File = File::H;
pub const QUEENSIDE_ROOK_FILE: File = File::A;

pub const KINGSIDE_KING_DST: File = File::G;
pub const KINGSIDE_ROOK_DST: File = File::F;
pub const QUEENSIDE_KING_DST: File = File::C;
pub const QUEENSIDE_ROOK_DST: File = File::D;

pub const KING_DELTAS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub const KNIGHT_DELTAS: [(isize, isize); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub const LINE_DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
pub const DIAG_DIRECTIONS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
