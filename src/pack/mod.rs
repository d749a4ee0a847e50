pub mod compress;
pub mod header;
pub mod internal_type;
pub mod read;
pub mod write;

pub use self::header::Kind;
pub use self::write::Writer;

// pack format is:
//
//      4 byte magic number ('P', 'A', 'C', 'K')
//      4 byte version number (2)
//      4 byte object count (N)
//      N objects: header, 20 byte base id for ref-deltas, zlib payload
//      20 byte checksum of everything above

pub const MAGIC: &[u8; 4] = b"PACK";
pub const VERSION: u32 = 2;
pub const PREAMBLE_LEN: usize = 12;
pub const TRAILER_LEN: usize = 20;
