use std::io;

use crate::Tag;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("Unsupported scaler type {0:#010x}")]
    UnsupportedScaler(u32),
    #[error("{0} table missing")]
    MissingTable(Tag),
    #[error("Font does not contain any supported unicode CMAP")]
    NoUsableCmap,
    #[error("CMAP subtable format {0} is not supported")]
    UnsupportedCmapFormat(u16),
    #[error("No glyph mapped for code point U+{0:04X}")]
    GlyphMissing(u32),
    #[error("Composite glyph {0} anchors a component by matching points")]
    UnsupportedComponentAnchoring(u32),
    #[error("Composite glyphs nested deeper than {0} levels")]
    ComponentDepthExceeded(usize),
    #[error("Corrupt font: {0}")]
    CorruptFont(&'static str),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::CorruptFont("unexpected end of table data"),
            _ => Error::CorruptFont("unreadable table data"),
        }
    }
}
