//! Board and related things

use crate::castling::CastlingSide;
use crate::movegen::{self, MoveList};
use crate::piece::{Kind, Piece};
use crate::types::{ByColor, Cell, Color, File, PieceKind, Rank, Square};
use crate::{geometry, legal, zobrist};

use std::fmt::{self, Display};
use std::mem;
use std::str::FromStr;

use thiserror::Error;

/// Board validation error
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the 1st or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Square),
    /// Cached king square doesn't point to the king of this color
    #[error("king square of color {0:?} is out of sync")]
    KingMismatch(Color),
    /// Piece stored in the slot thinks it stands on another square
    #[error("piece in slot {0} has a wrong square")]
    SquareMismatch(Square),
}

/// Error parsing [`RawBoard`] from a diagram
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum DiagramParseError {
    /// Diagram doesn't have exactly 8 rows
    #[error("expected 8 rows, found {0}")]
    RowCount(usize),
    /// Row doesn't have exactly 8 cells
    #[error("row {row} has {len} cells instead of 8")]
    RowLength { row: usize, len: usize },
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error returned by [`Board::play()`]
///
/// The position stays unchanged if this error is returned.
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    #[error("no piece on {0}")]
    EmptySquare(Square),
    #[error("piece on {0} doesn't belong to the side to move")]
    NotYourTurn(Square),
    #[error("illegal move {from}{to}")]
    IllegalMove { from: Square, to: Square },
}

/// Raw chess board
///
/// Raw board contains only the occupant of each square and the side to move. Unlike [`Board`],
/// it is not validated and may contain an invalid position.
///
/// Raw board can be used to set up a position programmatically. After filling the cells, it must
/// be converted to [`Board`] via [`Board::try_from()`].
///
/// # Example
///
/// ```
/// # use pawnsmith::{RawBoard, Board, Color, PieceKind, Cell, Square};
/// #
/// let mut raw = RawBoard::empty();
/// raw.put(Square::new(6, 1), Cell::from_parts(Color::White, PieceKind::King));
/// raw.put(Square::new(3, 3), Cell::from_parts(Color::Black, PieceKind::King));
///
/// let board: Board = raw.try_into().unwrap();
/// assert_eq!(board.king_square(Color::Black), Square::new(3, 3));
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawBoard {
    /// Contents of the board
    ///
    /// The indices in this array are the indices of squares. You might probably want to use
    /// the functions like [`RawBoard::get()`] or [`RawBoard::put()`] instead of indexing this array
    /// directly.
    pub cells: [Cell; 64],
    /// Side to move
    pub side: Color,
}

impl RawBoard {
    /// Returns an empty `RawBoard` with White to move
    #[inline]
    pub const fn empty() -> RawBoard {
        RawBoard {
            cells: [Cell::EMPTY; 64],
            side: Color::White,
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> RawBoard {
        let mut res = RawBoard::empty();
        for file in File::iter() {
            res.put2(file, Rank::R2, Cell::from_parts(Color::White, PieceKind::Pawn));
            res.put2(file, Rank::R7, Cell::from_parts(Color::Black, PieceKind::Pawn));
        }
        for (color, rank) in [(Color::White, Rank::R1), (Color::Black, Rank::R8)] {
            res.put2(File::A, rank, Cell::from_parts(color, PieceKind::Rook));
            res.put2(File::B, rank, Cell::from_parts(color, PieceKind::Knight));
            res.put2(File::C, rank, Cell::from_parts(color, PieceKind::Bishop));
            res.put2(File::D, rank, Cell::from_parts(color, PieceKind::Queen));
            res.put2(File::E, rank, Cell::from_parts(color, PieceKind::King));
            res.put2(File::F, rank, Cell::from_parts(color, PieceKind::Bishop));
            res.put2(File::G, rank, Cell::from_parts(color, PieceKind::Knight));
            res.put2(File::H, rank, Cell::from_parts(color, PieceKind::Rook));
        }
        res
    }

    /// Parses the cells from a diagram
    ///
    /// The diagram consists of 8 rows of 8 cells each, starting from row 0. Each cell is a letter
    /// from `PKNBRQ` (upper case for White, lower case for Black) or `.` for an empty square.
    /// Leading and trailing whitespace on each line is ignored, as are blank lines. The side to
    /// move is set to White.
    pub fn from_diagram(s: &str) -> Result<RawBoard, DiagramParseError> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != 8 {
            return Err(DiagramParseError::RowCount(rows.len()));
        }
        let mut res = RawBoard::empty();
        for (row, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != 8 {
                return Err(DiagramParseError::RowLength { row, len });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::from_char(ch).ok_or(DiagramParseError::UnexpectedChar(ch))?;
                res.put(Square::new(row, col), cell);
            }
        }
        Ok(res)
    }

    /// Returns the contents of the square `sq`
    #[inline]
    pub fn get(&self, sq: Square) -> Cell {
        unsafe { *self.cells.get_unchecked(sq.index()) }
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Square::from_parts(file, rank))
    }

    /// Puts `cell` to the square `sq`
    #[inline]
    pub fn put(&mut self, sq: Square, cell: Cell) {
        unsafe {
            *self.cells.get_unchecked_mut(sq.index()) = cell;
        }
    }

    /// Puts `cell` to the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Square::from_parts(file, rank), cell);
    }

    /// Returns Zobrist hash of the board
    ///
    /// Only the occupancy and the side to move are hashed. Per-piece flags (castling
    /// eligibility, en passant) are not part of the hash.
    pub fn zobrist_hash(&self) -> u64 {
        let mut hash = if self.side == Color::White {
            zobrist::MOVE_SIDE
        } else {
            0
        };
        for sq in Square::iter() {
            hash ^= zobrist::pieces(self.get(sq), sq);
        }
        hash
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use pawnsmith::{RawBoard, board::PrettyStyle};
    /// #
    /// let r = RawBoard::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    /// W|abcdefgh
    /// "#;
    /// assert_eq!(r.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty {
        Pretty { raw: *self, style }
    }
}

impl Default for RawBoard {
    #[inline]
    fn default() -> RawBoard {
        RawBoard::empty()
    }
}

impl FromStr for RawBoard {
    type Err = DiagramParseError;

    fn from_str(s: &str) -> Result<RawBoard, Self::Err> {
        RawBoard::from_diagram(s)
    }
}

/// Formats the board as a diagram accepted by [`RawBoard::from_diagram()`]
impl Display for RawBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter() {
            for file in File::iter() {
                write!(f, "{}", self.get2(file, rank))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Board that contains a valid position
///
/// The board holds 64 [`Piece`] slots (empty squares included), the side to move and the squares
/// of both kings. Each piece keeps its own flags (whether it has moved, whether it has just made
/// a double step) and a cache of valid destinations.
///
/// The cache is only filled on demand, by [`Board::update_valid_moves()`],
/// [`Board::filter_valid_moves()`] and [`Board::is_move_valid()`]. Any change to the position
/// makes it stale.
///
/// What-if checks are done on clones of the board. Cloning is a deep copy and never allocates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pieces: [Piece; 64],
    side: Color,
    kings: ByColor<Square>,
}

impl Board {
    /// Returns a board with the initial position
    pub fn initial() -> Board {
        Board::assemble(
            &RawBoard::initial(),
            ByColor::new_with(CastlingSide::king_src),
        )
    }

    fn assemble(raw: &RawBoard, kings: ByColor<Square>) -> Board {
        Board {
            pieces: std::array::from_fn(|i| {
                let sq = Square::from_index(i);
                Piece::from_cell(sq, raw.get(sq))
            }),
            side: raw.side,
            kings,
        }
    }

    /// Returns a snapshot of the occupancy and the side to move
    pub fn raw(&self) -> RawBoard {
        let mut res = RawBoard::empty();
        for p in &self.pieces {
            res.put(p.square(), p.cell());
        }
        res.side = self.side;
        res
    }

    /// Returns the contents of the square `sq`
    #[inline]
    pub fn get(&self, sq: Square) -> Cell {
        self.pieces[sq.index()].cell()
    }

    /// Returns the piece slot on the square `sq`
    #[inline]
    pub fn piece(&self, sq: Square) -> &Piece {
        &self.pieces[sq.index()]
    }

    /// Returns the side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    /// Returns the square of the king of color `c`
    #[inline]
    pub fn king_square(&self, c: Color) -> Square {
        *self.kings.get(c)
    }

    /// Returns the selected piece, if any
    pub fn selected(&self) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.is_selected())
    }

    /// Returns Zobrist hash of the board
    ///
    /// See [`RawBoard::zobrist_hash()`] for details.
    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.raw().zobrist_hash()
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// See [`RawBoard::pretty()`] for more details.
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty {
        Pretty {
            raw: self.raw(),
            style,
        }
    }

    /// Selects the piece on `sq`
    ///
    /// Only a piece of the side to move can be selected. Selecting another piece drops the previous
    /// selection. If `sq` is empty or holds an opponent's piece, nothing changes.
    pub fn select(&mut self, sq: Square) {
        let p = &self.pieces[sq.index()];
        if p.is_empty() || p.color() != Some(self.side) {
            return;
        }
        self.cancel();
        self.pieces[sq.index()].selected = true;
    }

    /// Drops the selection
    pub fn cancel(&mut self) {
        for p in &mut self.pieces {
            p.selected = false;
        }
    }

    /// Returns `true` if the piece on `src` is selected and can legally move to `dst`
    ///
    /// Legal destinations of `src` are always recomputed against the current position, and the
    /// result is stored in the piece's cache.
    pub fn is_move_valid(&mut self, src: Square, dst: Square) -> bool {
        if !self.pieces[src.index()].is_selected() {
            return false;
        }
        let moves = legal::legal_moves(self, src);
        let res = moves.has(dst);
        self.pieces[src.index()].valid_moves = moves;
        res
    }

    /// Moves the piece from `src` to `dst`
    ///
    /// The move is not validated, use [`Board::is_move_valid()`] first. Special moves are applied
    /// here as well: castling moves the rook, en passant removes the captured pawn, and a pawn
    /// reaching the far rank turns into a queen. The side to move is not changed, see
    /// [`Board::advance_turn()`].
    ///
    /// Moving from an empty square or onto the same square does nothing.
    pub fn move_piece(&mut self, src: Square, dst: Square) {
        if src == dst {
            return;
        }
        let mover = &self.pieces[src.index()];
        let (color, kind) = match mover.color() {
            Some(c) => (c, mover.kind()),
            None => return,
        };

        for p in &mut self.pieces {
            if p.color() == Some(color) {
                p.set_double_stepped(false);
            }
        }

        match kind {
            Kind::King { moved: false } if src == CastlingSide::king_src(color) => {
                if let Some(side) = CastlingSide::from_king_dst(dst.file()) {
                    let rook_src = side.rook_src(color);
                    let rook = &self.pieces[rook_src.index()];
                    if dst == side.king_dst(color)
                        && rook.color() == Some(color)
                        && rook.kind() == (Kind::Rook { moved: false })
                    {
                        self.relocate(rook_src, side.rook_dst(color));
                    }
                }
            }
            Kind::Pawn { .. } => {
                if src.col() != dst.col() && self.pieces[dst.index()].is_empty() {
                    let beside = Square::new(src.row(), dst.col());
                    let victim = &self.pieces[beside.index()];
                    if victim.color() == Some(color.inv()) && victim.is_double_stepped_pawn() {
                        self.pieces[beside.index()] = Piece::empty(beside);
                    }
                }
                if src.row().abs_diff(dst.row()) == 2 {
                    self.pieces[src.index()].set_double_stepped(true);
                }
            }
            _ => {}
        }

        self.relocate(src, dst);

        if matches!(kind, Kind::Pawn { .. }) && dst.rank() == geometry::promote_rank(color) {
            self.pieces[dst.index()] = Piece::new(dst, color, PieceKind::Queen);
        }

        #[cfg(feature = "selftest")]
        if let Err(e) = self.validate() {
            panic!("board broken after {}{}: {}", src, dst, e);
        }
    }

    /// Puts the piece from `src` onto `dst`, leaving `src` empty
    ///
    /// Whatever stood on `dst` is lost. No special moves are handled.
    pub(crate) fn relocate(&mut self, src: Square, dst: Square) {
        if src == dst {
            return;
        }
        let mut p = mem::replace(&mut self.pieces[src.index()], Piece::empty(src));
        p.on_move(dst);
        if let (true, Some(c)) = (p.is_king(), p.color()) {
            *self.kings.get_mut(c) = dst;
        }
        self.pieces[dst.index()] = p;
    }

    /// Passes the move to the other side
    pub fn advance_turn(&mut self) {
        self.side = self.side.inv();
    }

    /// Makes a full turn: selects the piece on `src`, validates and applies the move, then passes
    /// the move to the other side
    ///
    /// The selection is dropped in any case.
    pub fn play(&mut self, src: Square, dst: Square) -> Result<(), MoveError> {
        let p = &self.pieces[src.index()];
        if p.is_empty() {
            return Err(MoveError::EmptySquare(src));
        }
        if p.color() != Some(self.side) {
            return Err(MoveError::NotYourTurn(src));
        }
        self.select(src);
        if !self.is_move_valid(src, dst) {
            self.cancel();
            return Err(MoveError::IllegalMove { from: src, to: dst });
        }
        self.move_piece(src, dst);
        self.advance_turn();
        self.cancel();
        Ok(())
    }

    /// Recomputes pseudo-legal destinations of every piece on the board
    pub fn update_valid_moves(&mut self) {
        for sq in Square::iter() {
            let moves = movegen::pseudo_legal(self, sq);
            self.pieces[sq.index()].valid_moves = moves;
        }
    }

    /// Removes the cached destinations that leave the mover's own king in check
    ///
    /// Works on whatever is cached, so it is meant to be called after
    /// [`Board::update_valid_moves()`]. Kings are skipped, their destinations are already safe.
    /// Only the mover's own king matters: moves that give check to the opposing king are kept.
    pub fn filter_valid_moves(&mut self) {
        for sq in Square::iter() {
            let mut moves = self.pieces[sq.index()].valid_moves.clone();
            legal::filter(self, sq, &mut moves);
            self.pieces[sq.index()].valid_moves = moves;
        }
    }

    /// Reports for each color whether its king is in check
    ///
    /// Recomputes the destinations of all the pieces first. Kings are never counted as attackers.
    pub fn is_in_check(&mut self) -> ByColor<bool> {
        self.update_valid_moves();
        ByColor::new_with(|color| {
            let king = self.king_square(color);
            self.pieces
                .iter()
                .any(|p| p.color() == Some(color.inv()) && !p.is_king() && p.valid_moves.has(king))
        })
    }

    /// Returns legal destinations of the piece on `sq`
    ///
    /// Unlike [`Board::is_move_valid()`], this doesn't care about selection or the side to move,
    /// and doesn't touch the cache.
    pub fn legal_moves(&self, sq: Square) -> MoveList {
        legal::legal_moves(self, sq)
    }

    /// Verifies the internal consistency of the board
    pub fn validate(&self) -> Result<(), ValidateError> {
        for (i, p) in self.pieces.iter().enumerate() {
            if p.square().index() != i {
                return Err(ValidateError::SquareMismatch(Square::from_index(i)));
            }
        }
        let fresh = Board::try_from(self.raw())?;
        for color in Color::iter() {
            if fresh.king_square(color) != self.king_square(color) {
                return Err(ValidateError::KingMismatch(color));
            }
        }
        Ok(())
    }
}

impl TryFrom<RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: RawBoard) -> Result<Board, ValidateError> {
        let mut kings: ByColor<Option<Square>> = ByColor::default();
        for sq in Square::iter() {
            let cell = raw.get(sq);
            let color = match cell.color() {
                Some(c) => c,
                None => continue,
            };
            match cell.kind() {
                Some(PieceKind::King) => {
                    let king = kings.get_mut(color);
                    if king.is_some() {
                        return Err(ValidateError::TooManyKings(color));
                    }
                    *king = Some(sq);
                }
                Some(PieceKind::Pawn) if sq.rank() == Rank::R1 || sq.rank() == Rank::R8 => {
                    return Err(ValidateError::InvalidPawn(sq));
                }
                _ => {}
            }
        }
        let kings = ByColor {
            white: kings.white.ok_or(ValidateError::NoKing(Color::White))?,
            black: kings.black.ok_or(ValidateError::NoKing(Color::Black))?,
        };
        Ok(Board::assemble(&raw, kings))
    }
}

impl TryFrom<&RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: &RawBoard) -> Result<Board, ValidateError> {
        (*raw).try_into()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.raw().fmt(f)
    }
}

/// Style for [`RawBoard::pretty()`] and [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`RawBoard::pretty()`] for more details.
pub struct Pretty {
    raw: RawBoard,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const WHITE_INDICATOR: char;
    const BLACK_INDICATOR: char;

    fn cell(c: Cell) -> char;

    fn indicator(c: Color) -> char {
        match c {
            Color::White => Self::WHITE_INDICATOR,
            Color::Black => Self::BLACK_INDICATOR,
        }
    }

    fn fmt(r: &RawBoard, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                write!(f, "{}", Self::cell(r.get2(file, rank)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{}{}", Self::indicator(r.side), Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const WHITE_INDICATOR: char = 'W';
    const BLACK_INDICATOR: char = 'B';

    fn cell(c: Cell) -> char {
        c.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const WHITE_INDICATOR: char = '○';
    const BLACK_INDICATOR: char = '●';

    fn cell(c: Cell) -> char {
        c.as_utf8_char()
    }
}

impl Display for Pretty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(&self.raw, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(&self.raw, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn board(diagram: &str, side: Color) -> Board {
        let mut raw = RawBoard::from_diagram(diagram).unwrap();
        raw.side = side;
        raw.try_into().unwrap()
    }

    fn sq(row: usize, col: usize) -> Square {
        Square::new(row, col)
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        assert_eq!(Board::try_from(RawBoard::initial()), Ok(b.clone()));
        assert_eq!(b.raw(), RawBoard::initial());
        assert_eq!(b.side(), Color::White);
        assert_eq!(b.king_square(Color::White), sq(7, 4));
        assert_eq!(b.king_square(Color::Black), sq(0, 4));
        assert_eq!(b.validate(), Ok(()));
        assert_eq!(
            b.get(sq(0, 3)),
            Cell::from_parts(Color::Black, PieceKind::Queen)
        );
        assert_eq!(b.piece(sq(7, 0)).kind(), Kind::Rook { moved: false });
        assert_eq!(b.selected(), None);
        assert_eq!(
            b.to_string(),
            "rnbqkbnr\npppppppp\n........\n........\n........\n........\nPPPPPPPP\nRNBQKBNR\n"
        );
    }

    #[test]
    fn test_opening_moves() {
        let mut b = Board::initial();
        b.update_valid_moves();
        b.filter_valid_moves();
        let mut total = 0;
        for sq in Square::iter() {
            let p = b.piece(sq);
            let expected = match p.piece_kind() {
                Some(PieceKind::Pawn) | Some(PieceKind::Knight) => 2,
                _ => 0,
            };
            assert_eq!(p.valid_moves().len(), expected, "{}", sq);
            total += p.valid_moves().len();
        }
        assert_eq!(total, 40);
        assert_eq!(b.is_in_check(), ByColor::new_with(|_| false));
    }

    #[test]
    fn test_diagram() {
        const DIAGRAM: &str = "
            r...k..r
            ppp..ppp
            ........
            ...Pp...
            ........
            .....N..
            PPPP.PPP
            R...K..R
        ";
        let raw = RawBoard::from_diagram(DIAGRAM).unwrap();
        assert_eq!(raw.get(sq(3, 3)), Cell::from_parts(Color::White, PieceKind::Pawn));
        assert_eq!(raw.get(sq(5, 5)), Cell::from_parts(Color::White, PieceKind::Knight));
        assert_eq!(raw.get(sq(4, 4)), Cell::EMPTY);
        assert_eq!(RawBoard::from_str(&raw.to_string()), Ok(raw));

        assert_eq!(
            RawBoard::from_diagram("........\n........"),
            Err(DiagramParseError::RowCount(2))
        );
        assert_eq!(
            RawBoard::from_diagram(&"........\n".repeat(7)),
            Err(DiagramParseError::RowCount(7))
        );
        let mut rows = "........\n".repeat(8);
        rows.push_str("........\n");
        assert_eq!(
            RawBoard::from_diagram(&rows),
            Err(DiagramParseError::RowCount(9))
        );
        let rows = format!("....k...\n{}", ".......\n".repeat(7));
        assert_eq!(
            RawBoard::from_diagram(&rows),
            Err(DiagramParseError::RowLength { row: 1, len: 7 })
        );
        let rows = format!("....x...\n{}", "........\n".repeat(7));
        assert_eq!(
            RawBoard::from_diagram(&rows),
            Err(DiagramParseError::UnexpectedChar('x'))
        );
    }

    #[test]
    fn test_validate() {
        let raw = RawBoard::from_diagram(
            "
            ....k...
            ........
            ........
            ........
            ........
            ........
            ........
            ........
            ",
        )
        .unwrap();
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::NoKing(Color::White))
        );

        let raw = RawBoard::from_diagram(
            "
            ....k...
            ........
            ........
            ....k...
            ........
            ........
            ........
            ....K...
            ",
        )
        .unwrap();
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::TooManyKings(Color::Black))
        );

        let raw = RawBoard::from_diagram(
            "
            ....k...
            ........
            ........
            ........
            ........
            ........
            ........
            P...K...
            ",
        )
        .unwrap();
        assert_eq!(
            Board::try_from(raw),
            Err(ValidateError::InvalidPawn(sq(7, 0)))
        );
    }

    #[test]
    fn test_derived_flags() {
        let b = board(
            "
            r...k...
            .p......
            ........
            ........
            ......P.
            ........
            ........
            .R.K...R
            ",
            Color::White,
        );
        assert_eq!(
            b.piece(sq(1, 1)).kind(),
            Kind::Pawn {
                initial: true,
                double_stepped: false
            }
        );
        assert_eq!(
            b.piece(sq(4, 6)).kind(),
            Kind::Pawn {
                initial: false,
                double_stepped: false
            }
        );
        assert_eq!(b.piece(sq(0, 0)).kind(), Kind::Rook { moved: false });
        assert_eq!(b.piece(sq(7, 1)).kind(), Kind::Rook { moved: true });
        assert_eq!(b.piece(sq(7, 7)).kind(), Kind::Rook { moved: false });
        assert_eq!(b.piece(sq(7, 3)).kind(), Kind::King { moved: true });
        assert_eq!(b.piece(sq(0, 4)).kind(), Kind::King { moved: false });
    }

    #[test]
    fn test_select() {
        let mut b = Board::initial();
        b.select(sq(4, 4));
        assert_eq!(b.selected(), None);
        b.select(sq(1, 4));
        assert_eq!(b.selected(), None);

        b.select(sq(6, 4));
        assert_eq!(b.selected().map(|p| p.square()), Some(sq(6, 4)));
        b.select(sq(7, 6));
        assert_eq!(b.selected().map(|p| p.square()), Some(sq(7, 6)));
        assert!(!b.piece(sq(6, 4)).is_selected());
        // Failed selection keeps the previous one
        b.select(sq(0, 6));
        assert_eq!(b.selected().map(|p| p.square()), Some(sq(7, 6)));

        b.cancel();
        assert_eq!(b.selected(), None);
    }

    #[test]
    fn test_is_move_valid() {
        let mut b = Board::initial();
        assert!(!b.is_move_valid(sq(6, 4), sq(4, 4)));
        b.select(sq(6, 4));
        assert!(b.is_move_valid(sq(6, 4), sq(4, 4)));
        assert!(b.is_move_valid(sq(6, 4), sq(5, 4)));
        assert!(!b.is_move_valid(sq(6, 4), sq(3, 4)));
        assert!(!b.is_move_valid(sq(6, 4), sq(6, 4)));
        assert_eq!(b.piece(sq(6, 4)).valid_moves().len(), 2);
        assert!(!b.is_move_valid(sq(6, 3), sq(4, 3)));
    }

    #[test]
    fn test_play_errors() {
        let mut b = Board::initial();
        assert_eq!(
            b.play(sq(4, 4), sq(3, 4)),
            Err(MoveError::EmptySquare(sq(4, 4)))
        );
        assert_eq!(
            b.play(sq(1, 0), sq(2, 0)),
            Err(MoveError::NotYourTurn(sq(1, 0)))
        );
        assert_eq!(
            b.play(sq(6, 0), sq(3, 0)),
            Err(MoveError::IllegalMove {
                from: sq(6, 0),
                to: sq(3, 0)
            })
        );
        assert_eq!(b.raw(), RawBoard::initial());
        assert_eq!(b.side(), Color::White);
        assert_eq!(b.selected(), None);

        assert_eq!(b.play(sq(6, 0), sq(4, 0)), Ok(()));
        assert_eq!(b.side(), Color::Black);
        assert_eq!(b.selected(), None);
        assert_eq!(
            b.play(sq(4, 0), sq(3, 0)),
            Err(MoveError::NotYourTurn(sq(4, 0)))
        );
    }

    #[test]
    fn test_noop_moves() {
        let mut b = Board::initial();
        b.move_piece(sq(6, 4), sq(6, 4));
        b.move_piece(sq(4, 4), sq(3, 4));
        assert_eq!(b, Board::initial());
    }

    #[test]
    fn test_round_trip() {
        let initial = Board::initial();
        let mut b = initial.clone();
        b.play(sq(7, 6), sq(5, 5)).unwrap();
        assert_ne!(b.zobrist_hash(), initial.zobrist_hash());
        b.play(sq(0, 6), sq(2, 5)).unwrap();
        b.play(sq(5, 5), sq(7, 6)).unwrap();
        b.play(sq(2, 5), sq(0, 6)).unwrap();
        assert_eq!(b.raw(), initial.raw());
        assert_eq!(b.zobrist_hash(), initial.zobrist_hash());
        assert_eq!(b.zobrist_hash(), RawBoard::initial().zobrist_hash());

        let mut b = board(
            "
            ....k...
            ........
            ........
            ........
            ........
            ........
            ........
            ....K..R
            ",
            Color::White,
        );
        let before = b.raw();
        b.move_piece(sq(7, 7), sq(5, 7));
        b.move_piece(sq(5, 7), sq(7, 7));
        b.move_piece(sq(7, 4), sq(7, 3));
        b.move_piece(sq(7, 3), sq(7, 4));
        assert_eq!(b.raw(), before);
        assert_eq!(b.piece(sq(7, 7)).kind(), Kind::Rook { moved: true });
        assert_eq!(b.piece(sq(7, 4)).kind(), Kind::King { moved: true });
        assert_eq!(b.king_square(Color::White), sq(7, 4));
        // Neither may castle anymore
        assert!(!b.legal_moves(sq(7, 4)).has(sq(7, 6)));
    }

    const EN_PASSANT: &str = "
        ....k...
        ........
        ........
        ........
        ...p....
        ........
        ....P...
        ....K...
    ";

    #[test]
    fn test_en_passant() {
        let mut b = board(EN_PASSANT, Color::White);
        b.play(sq(6, 4), sq(4, 4)).unwrap();
        assert!(b.piece(sq(4, 4)).is_double_stepped_pawn());

        let mut moves = b.legal_moves(sq(4, 3));
        moves.sort();
        assert_eq!(moves.to_vec(), vec![sq(5, 3), sq(5, 4)]);

        b.play(sq(4, 3), sq(5, 4)).unwrap();
        assert_eq!(b.get(sq(4, 4)), Cell::EMPTY);
        assert_eq!(b.get(sq(4, 3)), Cell::EMPTY);
        assert_eq!(
            b.get(sq(5, 4)),
            Cell::from_parts(Color::Black, PieceKind::Pawn)
        );
        assert_eq!(b.validate(), Ok(()));
    }

    #[test]
    fn test_en_passant_expires() {
        let mut b = board(EN_PASSANT, Color::White);
        b.play(sq(6, 4), sq(4, 4)).unwrap();
        b.play(sq(0, 4), sq(0, 3)).unwrap();
        assert!(b.piece(sq(4, 4)).is_double_stepped_pawn());
        b.play(sq(7, 4), sq(7, 3)).unwrap();
        assert!(!b.piece(sq(4, 4)).is_double_stepped_pawn());
        assert_eq!(b.legal_moves(sq(4, 3)).to_vec(), vec![sq(5, 3)]);
    }

    #[test]
    fn test_single_step_is_not_en_passant() {
        let mut b = board(
            "
            ....k...
            ........
            ........
            ........
            ...p....
            ....P...
            ........
            ....K...
            ",
            Color::White,
        );
        b.play(sq(5, 4), sq(4, 4)).unwrap();
        assert!(!b.piece(sq(4, 4)).is_double_stepped_pawn());
        assert_eq!(b.legal_moves(sq(4, 3)).to_vec(), vec![sq(5, 3)]);
    }

    #[test]
    fn test_castling() {
        let mut b = board(
            "
            r...k..r
            ........
            ........
            ........
            ........
            ........
            ........
            R...K..R
            ",
            Color::White,
        );
        b.play(sq(7, 4), sq(7, 6)).unwrap();
        assert_eq!(
            b.get(sq(7, 6)),
            Cell::from_parts(Color::White, PieceKind::King)
        );
        assert_eq!(
            b.get(sq(7, 5)),
            Cell::from_parts(Color::White, PieceKind::Rook)
        );
        assert_eq!(b.get(sq(7, 7)), Cell::EMPTY);
        assert_eq!(b.get(sq(7, 4)), Cell::EMPTY);
        assert_eq!(b.piece(sq(7, 5)).kind(), Kind::Rook { moved: true });
        assert_eq!(b.king_square(Color::White), sq(7, 6));

        // The white rook on f1 now covers f8, so Black cannot castle kingside
        let moves = b.legal_moves(sq(0, 4));
        assert!(!moves.has(sq(0, 6)));
        assert!(moves.has(sq(0, 2)));

        b.play(sq(0, 4), sq(0, 2)).unwrap();
        assert_eq!(
            b.get(sq(0, 2)),
            Cell::from_parts(Color::Black, PieceKind::King)
        );
        assert_eq!(
            b.get(sq(0, 3)),
            Cell::from_parts(Color::Black, PieceKind::Rook)
        );
        assert_eq!(b.get(sq(0, 0)), Cell::EMPTY);
        assert_eq!(b.king_square(Color::Black), sq(0, 2));
        assert_eq!(b.validate(), Ok(()));
    }

    #[test]
    fn test_promotion() {
        let mut b = board(
            "
            ....k..n
            P.....P.
            ........
            ........
            ........
            ........
            p.......
            ....K...
            ",
            Color::White,
        );
        b.play(sq(1, 0), sq(0, 0)).unwrap();
        assert_eq!(
            b.get(sq(0, 0)),
            Cell::from_parts(Color::White, PieceKind::Queen)
        );
        assert!(b.is_in_check().black);

        b.play(sq(0, 4), sq(1, 4)).unwrap();
        b.play(sq(1, 6), sq(0, 7)).unwrap();
        assert_eq!(
            b.get(sq(0, 7)),
            Cell::from_parts(Color::White, PieceKind::Queen)
        );

        b.play(sq(6, 0), sq(7, 0)).unwrap();
        assert_eq!(
            b.get(sq(7, 0)),
            Cell::from_parts(Color::Black, PieceKind::Queen)
        );
        assert!(b.is_in_check().white);
        assert_eq!(b.validate(), Ok(()));
    }

    #[test]
    fn test_check_and_block() {
        let mut b = board(
            "
            ....k...
            r.......
            ........
            ........
            ........
            ........
            ........
            ....KB..
            ",
            Color::Black,
        );
        assert_eq!(b.is_in_check(), ByColor::new_with(|_| false));
        b.play(sq(1, 0), sq(1, 4)).unwrap();
        assert_eq!(
            b.is_in_check(),
            ByColor {
                white: true,
                black: false
            }
        );
        assert_eq!(b.legal_moves(sq(7, 5)).to_vec(), vec![sq(6, 4)]);
        assert_eq!(
            b.play(sq(7, 5), sq(5, 3)),
            Err(MoveError::IllegalMove {
                from: sq(7, 5),
                to: sq(5, 3)
            })
        );
        b.play(sq(7, 5), sq(6, 4)).unwrap();
        assert_eq!(b.is_in_check(), ByColor::new_with(|_| false));
    }

    #[test]
    fn test_check_cleared_by_removal() {
        let mut raw = RawBoard::from_diagram(
            "
            k.......
            ........
            ........
            ....r...
            ........
            ........
            ........
            ....K...
            ",
        )
        .unwrap();
        let mut b: Board = raw.try_into().unwrap();
        assert!(b.is_in_check().white);
        assert!(!b.is_in_check().black);

        raw.put(sq(3, 4), Cell::EMPTY);
        let mut b: Board = raw.try_into().unwrap();
        assert_eq!(b.is_in_check(), ByColor::new_with(|_| false));
    }

    #[test]
    fn test_filter_with_side_in_check() {
        let mut b = board(
            "
            ....k...
            ....r...
            ........
            ........
            ........
            ........
            ........
            ...QK...
            ",
            Color::White,
        );
        b.update_valid_moves();
        b.filter_valid_moves();
        assert_eq!(b.piece(sq(7, 3)).valid_moves().to_vec(), vec![sq(6, 4)]);
        assert!(b.piece(sq(1, 4)).valid_moves().has(sq(7, 4)));
        assert!(b.is_in_check().white);
        assert_eq!(b.validate(), Ok(()));
    }

    #[cfg(feature = "selftest")]
    #[test]
    #[should_panic(expected = "no king of color Black")]
    fn test_selftest_catches_lost_king() {
        let mut b = board(
            "
            ....k...
            ........
            ........
            ........
            ........
            ........
            ........
            ....RK..
            ",
            Color::White,
        );
        b.move_piece(sq(7, 4), sq(0, 4));
    }

    #[test]
    fn test_pin() {
        let mut b = board(
            "
            ....k...
            ....r...
            ........
            ........
            ........
            ........
            ....B...
            ....K...
            ",
            Color::White,
        );
        b.update_valid_moves();
        assert_eq!(b.piece(sq(6, 4)).valid_moves().len(), 9);
        b.filter_valid_moves();
        assert!(b.piece(sq(6, 4)).valid_moves().is_empty());
        assert_eq!(b.piece(sq(7, 4)).valid_moves().len(), 4);

        b.select(sq(6, 4));
        assert!(!b.is_move_valid(sq(6, 4), sq(5, 3)));

        let mut b = board(
            "
            ....k...
            ....r...
            ........
            ........
            ........
            ........
            ....Q...
            ....K...
            ",
            Color::White,
        );
        b.select(sq(6, 4));
        assert!(b.is_move_valid(sq(6, 4), sq(1, 4)));
        assert!(!b.is_move_valid(sq(6, 4), sq(5, 5)));
    }

    #[test]
    fn test_kings_keep_distance() {
        let mut b = board(
            "
            ........
            ........
            ....k...
            ........
            ....K...
            ........
            ........
            ........
            ",
            Color::White,
        );
        assert_eq!(
            b.play(sq(4, 4), sq(3, 4)),
            Err(MoveError::IllegalMove {
                from: sq(4, 4),
                to: sq(3, 4)
            })
        );
        assert_eq!(b.legal_moves(sq(4, 4)).len(), 5);
    }

    #[test]
    fn test_pretty() {
        let mut b = Board::initial();
        b.play(sq(6, 4), sq(4, 4)).unwrap();
        let res = r#"
8|rnbqkbnr
7|pppppppp
6|........
5|........
4|....P...
3|........
2|PPPP.PPP
1|RNBQKBNR
-+--------
B|abcdefgh
"#;
        assert_eq!(
            b.pretty(PrettyStyle::Ascii).to_string().trim(),
            res.trim()
        );

        let res = r#"
8│♜♞♝♛♚♝♞♜
7│♟♟♟♟♟♟♟♟
6│........
5│........
4│........
3│........
2│♙♙♙♙♙♙♙♙
1│♖♘♗♕♔♗♘♖
─┼────────
○│abcdefgh
"#;
        assert_eq!(
            Board::initial()
                .pretty(PrettyStyle::Utf8)
                .to_string()
                .trim(),
            res.trim()
        );
    }

    #[test]
    fn test_random_playouts() {
        let mut rng = StdRng::seed_from_u64(0x0B5E_55ED);
        for _ in 0..4 {
            let mut b = Board::initial();
            for _ in 0..80 {
                let side = b.side();
                let moves: Vec<(Square, Square)> = Square::iter()
                    .filter(|&src| b.piece(src).color() == Some(side))
                    .flat_map(|src| {
                        b.legal_moves(src)
                            .iter()
                            .map(|&dst| (src, dst))
                            .collect::<Vec<_>>()
                    })
                    .collect();
                let (src, dst) = match moves.choose(&mut rng) {
                    Some(&m) => m,
                    None => break,
                };
                assert_eq!(b.play(src, dst), Ok(()));
                assert_eq!(b.validate(), Ok(()));
                assert_eq!(b.side(), side.inv());
                assert!(!*b.is_in_check().get(side), "{}", b);
            }
        }
    }
}
