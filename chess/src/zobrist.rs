use crate::types::{Cell, Square};

include!(concat!(env!("OUT_DIR"), "/zobrist.rs"));

pub fn pieces(cell: Cell, sq: Square) -> u64 {
    unsafe { *PIECES.get_unchecked(cell.index()).get_unchecked(sq.index()) }
}
