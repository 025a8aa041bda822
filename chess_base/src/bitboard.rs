use crate::types::Square;
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::fmt;
use std::iter::IntoIterator;

/// Set of squares, one bit per square index
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub const fn from_raw(val: u64) -> Bitboard {
        Bitboard(val)
    }

    pub const fn from_square(sq: Square) -> Bitboard {
        Bitboard(1_u64 << sq.index())
    }

    pub const fn with(self, sq: Square) -> Bitboard {
        Bitboard(self.0 | (1_u64 << sq.index()))
    }

    pub const fn without(self, sq: Square) -> Bitboard {
        Bitboard(self.0 & !(1_u64 << sq.index()))
    }

    pub fn set(&mut self, sq: Square) {
        *self = self.with(sq);
    }

    pub fn unset(&mut self, sq: Square) {
        *self = self.without(sq);
    }

    pub const fn has(&self, sq: Square) -> bool {
        ((self.0 >> sq.index()) & 1) != 0
    }

    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }
}

impl From<Bitboard> for u64 {
    fn from(b: Bitboard) -> u64 {
        b.0
    }
}

impl From<u64> for Bitboard {
    fn from(u: u64) -> Bitboard {
        Bitboard(u)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut res = Bitboard::EMPTY;
        for sq in iter {
            res.set(sq);
        }
        res
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({})", self)
    }
}

/// Formats the board row by row from the top, `1` marking squares in the set
impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for row in 0..8 {
            if row != 0 {
                write!(f, "/")?;
            }
            write!(f, "{:08b}", ((self.0 >> (row * 8)) as u8).reverse_bits())?;
        }
        Ok(())
    }
}

pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u64);
        unsafe { Some(Square::from_index_unchecked(bit as usize)) }
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter() {
        let bb = Bitboard::EMPTY
            .with(Square::new(4, 0))
            .with(Square::new(6, 4))
            .with(Square::new(5, 5));
        assert_eq!(
            bb.into_iter().collect::<Vec<_>>(),
            vec![Square::new(4, 0), Square::new(5, 5), Square::new(6, 4)],
        );
    }

    #[test]
    fn test_bitops() {
        let ca = Square::new(4, 0);
        let cb = Square::new(6, 4);
        let cc = Square::new(5, 5);

        let bb1 = Bitboard::EMPTY.with(ca).with(cb);
        let bb2 = Bitboard::EMPTY.with(cb).with(cc);
        assert_eq!(bb1 & bb2, Bitboard::EMPTY.with(cb));
        assert_eq!(bb1 | bb2, Bitboard::EMPTY.with(ca).with(cb).with(cc));
        assert_eq!(bb1 ^ bb2, Bitboard::EMPTY.with(ca).with(cc));

        assert_eq!((!bb1).into_iter().count(), 62);
        assert_eq!((!bb1).len(), 62);
        assert_eq!([ca, cb].into_iter().collect::<Bitboard>(), bb1);
    }

    #[test]
    fn test_format() {
        let bb = Bitboard::EMPTY
            .with(Square::new(0, 7))
            .with(Square::new(4, 0))
            .with(Square::new(6, 4));
        assert_eq!(
            bb.to_string(),
            "00000001/00000000/00000000/00000000/10000000/00000000/00001000/00000000"
        );
    }
}
