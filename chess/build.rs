use std::path::Path;
use std::{env, io};

use rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub fn default_gen() -> impl RngCore {
    Xoshiro256PlusPlus::seed_from_u64(0x5EED_CAFE_B0A2_D001_u64)
}

mod zobrist {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use pawnsmith_base::types::Cell;
    use rand_core::RngCore;

    struct Zobrist {
        pieces: [[u64; 64]; Cell::COUNT],
        move_side: u64,
    }

    impl Zobrist {
        fn generate<R: RngCore>(gen: &mut R) -> Zobrist {
            let mut pieces = [[0_u64; 64]; Cell::COUNT];
            // Empty cells keep zero keys, so they never affect the hash
            for sub in pieces.iter_mut().skip(1) {
                for x in sub {
                    *x = gen.next_u64();
                }
            }
            Zobrist {
                pieces,
                move_side: gen.next_u64(),
            }
        }

        fn generate_default() -> Zobrist {
            Self::generate(&mut super::default_gen())
        }

        fn output<W: Write>(&self, w: &mut W) -> io::Result<()> {
            writeln!(w, "const PIECES: [[u64; 64]; Cell::COUNT] = [")?;
            for (i, sub) in self.pieces.iter().enumerate() {
                writeln!(w, "    /*{:2}*/ [", i)?;
                for (i, hsh) in sub.iter().enumerate() {
                    writeln!(w, "        /*{:2}*/ {:#x},", i, hsh)?;
                }
                writeln!(w, "    ],")?;
            }
            writeln!(w, "];\n")?;

            writeln!(w, "pub const MOVE_SIDE: u64 = {:#x};", self.move_side)?;
            Ok(())
        }
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        Zobrist::generate_default().output(&mut BufWriter::new(&fs::File::create(out_path)?))?;
        Ok(())
    }
}

mod near_attacks {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use pawnsmith_base::bitboard::Bitboard;
    use pawnsmith_base::geometry;
    use pawnsmith_base::types::Square;

    fn generate_directed(deltas: &[(isize, isize)]) -> [Bitboard; 64] {
        let mut res = [Bitboard::EMPTY; 64];
        for sq in Square::iter() {
            let mut bb = Bitboard::EMPTY;
            for &(d_row, d_col) in deltas {
                if let Some(dst) = sq.try_shift(d_row, d_col) {
                    bb.set(dst);
                }
            }
            res[sq.index()] = bb;
        }
        res
    }

    fn print_bitboards<W: Write>(w: &mut W, name: &str, bs: [Bitboard; 64]) -> io::Result<()> {
        writeln!(w, "const {}: [Bitboard; 64] = [", name)?;
        for (i, b) in bs.iter().enumerate() {
            writeln!(w, "    /*{:2}*/ bb(0x{:016x}),", i, b.as_raw())?;
        }
        writeln!(w, "];")?;
        Ok(())
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);
        print_bitboards(
            &mut w,
            "KING_ATTACKS",
            generate_directed(&geometry::KING_DELTAS),
        )?;
        writeln!(&mut w)?;
        print_bitboards(
            &mut w,
            "KNIGHT_ATTACKS",
            generate_directed(&geometry::KNIGHT_DELTAS),
        )?;
        writeln!(&mut w)?;
        print_bitboards(
            &mut w,
            "WHITE_PAWN_ATTACKS",
            generate_directed(&[(-1, -1), (-1, 1)]),
        )?;
        writeln!(&mut w)?;
        print_bitboards(
            &mut w,
            "BLACK_PAWN_ATTACKS",
            generate_directed(&[(1, -1), (1, 1)]),
        )?;
        Ok(())
    }
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    let out_dir = env::var("OUT_DIR").unwrap();
    zobrist::gen(&Path::new(&out_dir).join("zobrist.rs"))?;
    near_attacks::gen(&Path::new(&out_dir).join("near_attacks.rs"))?;
    Ok(())
}
