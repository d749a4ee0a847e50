use std::io::Read;

use crate::errors::{ Result, ErrorKind };
use crate::delta::REF_DELTA;

pub const BLOB: u8 = 3;

// the widest header a u64 size can need: 4 bits in the first byte, 7 after
pub const MAX_HEADER_LEN: usize = 10;

/// The object kinds this crate writes into a pack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Blob,
    RefDelta
}

impl Kind {
    pub fn as_u8(self) -> u8 {
        match self {
            Kind::Blob => BLOB,
            Kind::RefDelta => REF_DELTA
        }
    }

    pub fn from_u8(t: u8) -> Result<Kind> {
        match t {
            BLOB => Ok(Kind::Blob),
            REF_DELTA => Ok(Kind::RefDelta),
            _ => Err(ErrorKind::BadObjectType(t).into())
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Blob => "blob",
            Kind::RefDelta => "ref-delta"
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Header {
    bytes: [u8; MAX_HEADER_LEN],
    len: usize
}

impl Header {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

// header format is:
//
//      1 bit continuation, 3 bits type, low 4 bits of size
//      while continuing: 1 bit continuation, next 7 bits of size
pub fn encode_header(kind: Kind, size: u64) -> Header {
    let mut bytes = [0u8; MAX_HEADER_LEN];
    let mut len = 0;

    let mut byte = (kind.as_u8() << 4) | (size & 0xf) as u8;
    let mut size = size >> 4;
    while size > 0 {
        bytes[len] = byte | 0x80;
        len += 1;
        byte = (size & 0x7f) as u8;
        size >>= 7;
    }
    bytes[len] = byte;

    Header {
        bytes,
        len: len + 1
    }
}

/// Reads an object header, returning the raw type bits and the size.
pub fn read_header<R: Read>(input: &mut R) -> Result<(u8, u64)> {
    let mut byte = [0u8; 1];
    input.read_exact(&mut byte)?;

    let obj_type = (byte[0] & 0x70) >> 4;
    let mut size = u64::from(byte[0] & 0xf);
    let mut count = 0;
    let mut continuation = byte[0] & 0x80;
    while continuation > 0 {
        if count >= MAX_HEADER_LEN - 1 {
            return Err(ErrorKind::CorruptedPackfile.into())
        }

        input.read_exact(&mut byte)?;
        continuation = byte[0] & 0x80;

        size |= u64::from(byte[0] & 0x7f) << (4 + 7 * count);
        count += 1;
    }

    Ok((obj_type, size))
}
