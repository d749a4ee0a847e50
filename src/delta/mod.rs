// delta format is:
//
//      varint base size
//      varint result size
//      instructions, until the delta is exhausted:
//
//      1xxxxxxx: copy. low 4 bits say which offset bytes follow (little
//                endian), the next 3 bits which size bytes follow. a size of
//                zero means 0x10000.
//      0nnnnnnn: insert the next n literal bytes (n > 0).
//      00000000: reserved.
//
// varints are little endian, 7 bits per byte, high bit set on all but the
// last byte.

pub mod decoder;
pub mod encoder;

pub use self::decoder::DeltaDecoder;
pub use self::encoder::encode;

pub const REF_DELTA: u8 = 7;

pub(crate) const COPY: u8 = 0x80;
pub(crate) const MAX_INSERT: usize = 0x7f;
pub(crate) const MAX_COPY: usize = 0x10000;

pub(crate) fn write_size(output: &mut Vec<u8>, mut size: u64) {
    while size >= 0x80 {
        output.push((size as u8 & 0x7f) | 0x80);
        size >>= 7;
    }
    output.push(size as u8);
}

pub(crate) fn read_size(input: &[u8], idx: &mut usize) -> Option<u64> {
    let mut size = 0u64;
    let mut shift = 0;
    loop {
        let byte = *input.get(*idx)?;
        *idx += 1;
        if shift > 63 {
            return None
        }
        size |= u64::from(byte & 0x7f) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Some(size)
        }
    }
}
