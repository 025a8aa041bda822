//! Mailbox chess rules engine
//!
//! The board is a plain array of 64 [`Piece`] slots. Each piece knows its own movement rule and
//! flags, and the [`Board`] glues them together: it validates moves against the current
//! position, applies them together with the special moves (castling, en passant, promotion) and
//! tells whether a king is in check.
//!
//! # Example
//!
//! ```
//! # use pawnsmith::{Board, Color, Square};
//! #
//! let mut b = Board::initial();
//! b.play(Square::new(6, 4), Square::new(4, 4)).unwrap();
//! b.play(Square::new(1, 4), Square::new(3, 4)).unwrap();
//! assert_eq!(b.side(), Color::White);
//! assert!(!b.is_in_check().white);
//! ```
//!
//! Squares are addressed as `(row, col)`: row 0 is the rank where Black starts, column 0 is the
//! `a` file.

pub mod attack;
pub mod board;
pub mod castling;
pub mod legal;
pub mod movegen;
pub mod piece;

mod zobrist;

pub use pawnsmith_base::{bitboard, geometry, types};

pub use bitboard::Bitboard;
pub use board::{Board, MoveError, RawBoard, ValidateError};
pub use castling::CastlingSide;
pub use movegen::MoveList;
pub use piece::{Kind, Piece};
pub use types::{ByColor, Cell, Color, File, PieceKind, Rank, Square};
