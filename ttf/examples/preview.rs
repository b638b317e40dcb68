//! Prints a glyph as an 80×40 grid of `X`s.
//!
//! Usage: `cargo run --example preview -- <font.ttf> [hex code point]`

use std::env;
use std::error::Error;
use std::fs;

use ttf::{AspectMapping, FontFile};

const COLUMNS: u32 = 80;
const ROWS: u32 = 40;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: preview <font.ttf> [hex code point]")?;
    let codepoint = match args.next() {
        Some(hex) => u32::from_str_radix(hex.trim_start_matches("0x"), 16)?,
        None => u32::from('A'),
    };

    let data = fs::read(&path)?;
    let font = FontFile::from_slice(&data)?;
    let glyph = font.glyph(codepoint)?;
    let mapping = AspectMapping::new(glyph.bounding_box, COLUMNS, ROWS);

    for row in 0..ROWS {
        let line = (0..COLUMNS)
            .map(|column| {
                let (x, y) = mapping.sample_point(column as f32, row as f32);
                if glyph.winding_number(x, y, false).0 > 0 {
                    'X'
                } else {
                    ' '
                }
            })
            .collect::<String>();
        println!("{}", line);
    }

    Ok(())
}
