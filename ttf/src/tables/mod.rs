pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod loca;
pub mod maxp;

use crate::Error;

/// A table decoded from its slice of the font data. `Dep` carries the already decoded tables
/// it depends on (e.g. `loca` needs the format from `head`).
pub trait FontTable<'a>: Sized {
    type Dep;
    fn unpack(data: &'a [u8], dep: Self::Dep) -> Result<Self, Error>;
}
