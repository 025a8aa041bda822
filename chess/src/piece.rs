//! Pieces and their per-kind state

use crate::geometry;
use crate::movegen::MoveList;
use crate::types::{Cell, Color, PieceKind, Square};

/// Kind of the piece together with the flags this kind needs
///
/// Castling eligibility is tracked on kings and rooks via `moved`. Pawns remember whether they
/// still stand on their starting square, and whether their last move was a double step (which
/// makes them capturable en passant until their side moves again).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Empty,
    Pawn { initial: bool, double_stepped: bool },
    Knight,
    Bishop,
    Rook { moved: bool },
    Queen,
    King { moved: bool },
}

impl Kind {
    /// Returns the kind as it stands in the initial position
    pub const fn fresh(kind: PieceKind) -> Kind {
        match kind {
            PieceKind::Pawn => Kind::Pawn {
                initial: true,
                double_stepped: false,
            },
            PieceKind::King => Kind::King { moved: false },
            PieceKind::Knight => Kind::Knight,
            PieceKind::Bishop => Kind::Bishop,
            PieceKind::Rook => Kind::Rook { moved: false },
            PieceKind::Queen => Kind::Queen,
        }
    }

    pub const fn piece_kind(&self) -> Option<PieceKind> {
        match *self {
            Kind::Empty => None,
            Kind::Pawn { .. } => Some(PieceKind::Pawn),
            Kind::Knight => Some(PieceKind::Knight),
            Kind::Bishop => Some(PieceKind::Bishop),
            Kind::Rook { .. } => Some(PieceKind::Rook),
            Kind::Queen => Some(PieceKind::Queen),
            Kind::King { .. } => Some(PieceKind::King),
        }
    }
}

/// A single board slot
///
/// Every square of the board holds a `Piece`, empty squares included. A piece knows its own
/// square and color, whether it is selected, and caches the destinations computed for it by the
/// last call to [`Board::update_valid_moves()`](crate::Board::update_valid_moves). This cache
/// goes stale as soon as the board changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    square: Square,
    color: Option<Color>,
    kind: Kind,
    pub(crate) selected: bool,
    pub(crate) valid_moves: MoveList,
}

impl Piece {
    /// Returns an empty slot at `square`
    pub fn empty(square: Square) -> Piece {
        Piece {
            square,
            color: None,
            kind: Kind::Empty,
            selected: false,
            valid_moves: MoveList::new(),
        }
    }

    /// Returns a piece as it stands in the initial position
    pub fn new(square: Square, color: Color, kind: PieceKind) -> Piece {
        Self::with_kind(square, color, Kind::fresh(kind))
    }

    /// Returns a piece with the given flags
    ///
    /// Passing [`Kind::Empty`] yields an empty slot, whatever the color is.
    pub fn with_kind(square: Square, color: Color, kind: Kind) -> Piece {
        if kind == Kind::Empty {
            return Self::empty(square);
        }
        Piece {
            square,
            color: Some(color),
            kind,
            selected: false,
            valid_moves: MoveList::new(),
        }
    }

    pub fn square(&self) -> Square {
        self.square
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn piece_kind(&self) -> Option<PieceKind> {
        self.kind.piece_kind()
    }

    pub fn is_empty(&self) -> bool {
        self.kind == Kind::Empty
    }

    pub fn is_king(&self) -> bool {
        matches!(self.kind, Kind::King { .. })
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Returns the destinations computed by the last recompute
    ///
    /// The list is only meaningful right after [`Board::update_valid_moves()`](crate::Board::update_valid_moves)
    /// (and optionally [`Board::filter_valid_moves()`](crate::Board::filter_valid_moves)).
    pub fn valid_moves(&self) -> &MoveList {
        &self.valid_moves
    }

    /// Static relative value of the piece, zero for empty squares
    pub fn strength(&self) -> u32 {
        self.piece_kind().map_or(0, |k| k.strength())
    }

    /// Returns `true` if this is a pawn that double-stepped on its side's last move
    pub fn is_double_stepped_pawn(&self) -> bool {
        matches!(
            self.kind,
            Kind::Pawn {
                double_stepped: true,
                ..
            }
        )
    }

    /// Returns `true` if this piece is a king or rook that has never moved
    pub fn is_unmoved(&self) -> bool {
        matches!(
            self.kind,
            Kind::King { moved: false } | Kind::Rook { moved: false }
        )
    }

    /// Read-only snapshot of the slot
    pub fn cell(&self) -> Cell {
        match (self.color, self.piece_kind()) {
            (Some(c), Some(k)) => Cell::from_parts(c, k),
            _ => Cell::EMPTY,
        }
    }

    /// Returns `true` if `other` holds a piece of the opposite color
    pub(crate) fn is_enemy_of(&self, other: &Piece) -> bool {
        match (self.color, other.color) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }

    pub(crate) fn set_double_stepped(&mut self, value: bool) {
        if let Kind::Pawn { double_stepped, .. } = &mut self.kind {
            *double_stepped = value;
        }
    }

    /// Updates the piece after it was relocated to `dst`
    pub(crate) fn on_move(&mut self, dst: Square) {
        self.square = dst;
        self.selected = false;
        self.valid_moves.clear();
        match &mut self.kind {
            Kind::Pawn { initial, .. } => *initial = false,
            Kind::Rook { moved } | Kind::King { moved } => *moved = true,
            Kind::Empty | Kind::Knight | Kind::Bishop | Kind::Queen => {}
        }
    }

    /// Builds a piece from a raw cell, deriving the flags from its square
    ///
    /// Pawns on their start rank are considered unmoved, as are kings and rooks on their home
    /// squares. Nobody has just double-stepped.
    pub(crate) fn from_cell(square: Square, cell: Cell) -> Piece {
        let (color, kind) = match (cell.color(), cell.kind()) {
            (Some(c), Some(k)) => (c, k),
            _ => return Self::empty(square),
        };
        let home_rank = geometry::castling_rank(color);
        let kind = match kind {
            PieceKind::Pawn => Kind::Pawn {
                initial: square.rank() == geometry::pawn_start_rank(color),
                double_stepped: false,
            },
            PieceKind::King => Kind::King {
                moved: square != Square::from_parts(geometry::KING_HOME_FILE, home_rank),
            },
            PieceKind::Rook => Kind::Rook {
                moved: square != Square::from_parts(geometry::KINGSIDE_ROOK_FILE, home_rank)
                    && square != Square::from_parts(geometry::QUEENSIDE_ROOK_FILE, home_rank),
            },
            k => Kind::fresh(k),
        };
        Self::with_kind(square, color, kind)
    }
}
