// Simple command-line application to play chess
//
// Moves are entered as two squares, e.g. `e2 e4`. Castling is entered as the king move
// (`e1 g1`), promotion always yields a queen.

use pawnsmith::{board::PrettyStyle, Board, Color, Square};
use std::io::{self, BufRead, Write};

fn parse_move(s: &str) -> Result<(Square, Square), String> {
    let mut parts = s.split_whitespace();
    let (src, dst) = match (parts.next(), parts.next(), parts.next()) {
        (Some(src), Some(dst), None) => (src, dst),
        _ => return Err("expected two squares, like \"e2 e4\"".to_string()),
    };
    let src = src.parse::<Square>().map_err(|e| e.to_string())?;
    let dst = dst.parse::<Square>().map_err(|e| e.to_string())?;
    Ok((src, dst))
}

fn main() {
    let mut stdin = io::stdin().lock();

    let mut board = Board::initial();

    loop {
        println!("{}", board.pretty(PrettyStyle::Ascii));
        let check = board.is_in_check();
        for color in Color::iter() {
            if *check.get(color) {
                println!("{} king is in check!", color.name());
            }
        }

        print!("{} move: ", board.side().name());
        io::stdout().flush().unwrap();
        let mut s = String::new();
        if stdin.read_line(&mut s).unwrap() == 0 {
            break;
        }
        let s = s.trim();
        if s.is_empty() {
            continue;
        }

        let (src, dst) = match parse_move(s) {
            Ok(mv) => mv,
            Err(e) => {
                println!("Bad move: {}", e);
                println!();
                continue;
            }
        };

        if let Err(e) = board.play(src, dst) {
            println!("Bad move: {}", e);
        }
        println!();
    }
}
