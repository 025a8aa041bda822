use crate::bitboard::Bitboard;
use crate::geometry;
use crate::types::{Color, File, Square};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    Queen,
    King,
}

impl CastlingSide {
    pub fn iter() -> impl Iterator<Item = Self> {
        [CastlingSide::King, CastlingSide::Queen].into_iter()
    }

    /// Detects castling by the file the king lands on
    pub fn from_king_dst(file: File) -> Option<CastlingSide> {
        match file {
            geometry::KINGSIDE_KING_DST => Some(CastlingSide::King),
            geometry::QUEENSIDE_KING_DST => Some(CastlingSide::Queen),
            _ => None,
        }
    }

    pub fn king_src(color: Color) -> Square {
        Square::from_parts(geometry::KING_HOME_FILE, geometry::castling_rank(color))
    }

    pub fn king_dst(&self, color: Color) -> Square {
        let file = match self {
            CastlingSide::King => geometry::KINGSIDE_KING_DST,
            CastlingSide::Queen => geometry::QUEENSIDE_KING_DST,
        };
        Square::from_parts(file, geometry::castling_rank(color))
    }

    pub fn rook_src(&self, color: Color) -> Square {
        let file = match self {
            CastlingSide::King => geometry::KINGSIDE_ROOK_FILE,
            CastlingSide::Queen => geometry::QUEENSIDE_ROOK_FILE,
        };
        Square::from_parts(file, geometry::castling_rank(color))
    }

    pub fn rook_dst(&self, color: Color) -> Square {
        let file = match self {
            CastlingSide::King => geometry::KINGSIDE_ROOK_DST,
            CastlingSide::Queen => geometry::QUEENSIDE_ROOK_DST,
        };
        Square::from_parts(file, geometry::castling_rank(color))
    }

    /// Squares strictly between the king and the rook, which must be empty
    pub fn between(&self, color: Color) -> Bitboard {
        let files: &[File] = match self {
            CastlingSide::King => &[File::F, File::G],
            CastlingSide::Queen => &[File::B, File::C, File::D],
        };
        let rank = geometry::castling_rank(color);
        files.iter().map(|&f| Square::from_parts(f, rank)).collect()
    }

    /// Squares the king stands on or passes through, which must not be attacked
    pub fn king_path(&self, color: Color) -> [Square; 3] {
        let rank = geometry::castling_rank(color);
        let transit = match self {
            CastlingSide::King => File::F,
            CastlingSide::Queen => File::D,
        };
        [
            Self::king_src(color),
            Square::from_parts(transit, rank),
            self.king_dst(color),
        ]
    }
}
