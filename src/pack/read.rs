use byteorder::{ BigEndian, ByteOrder };
use crypto::{ sha1::Sha1, digest::Digest };
use crc::{ Crc, CRC_32_ISO_HDLC };
use std::collections::HashMap;
use std::convert::TryFrom;

use crate::errors::{ Result, ErrorKind };
use crate::pack::header::{ read_header, Kind };
use crate::pack::internal_type::PackfileType;
use crate::pack::compress::decompress;
use crate::pack::{ MAGIC, VERSION, PREAMBLE_LEN, TRAILER_LEN };
use crate::objects::Blob;
use crate::delta::DeltaDecoder;
use crate::id::Id;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Checks magic and version, returning the object count.
pub fn read_preamble(bytes: &[u8]) -> Result<u32> {
    if bytes.len() < PREAMBLE_LEN || &bytes[0..4] != MAGIC {
        return Err(ErrorKind::InvalidPackfile.into())
    }

    let version = BigEndian::read_u32(&bytes[4..8]);
    if version != VERSION {
        return Err(ErrorKind::UnsupportedPackfileVersion(version).into())
    }

    Ok(BigEndian::read_u32(&bytes[8..12]))
}

#[derive(Debug)]
pub struct Entry {
    offset: u64,
    packed_len: usize,
    crc32: u32,
    size: u64,
    object: PackfileType
}

impl Entry {
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes the record occupies in the pack, header included.
    pub fn packed_len(&self) -> usize {
        self.packed_len
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn kind(&self) -> Kind {
        match self.object {
            PackfileType::Plain(_) => Kind::Blob,
            PackfileType::RefDelta(_) => Kind::RefDelta
        }
    }

    pub fn object(&self) -> &PackfileType {
        &self.object
    }

    pub fn into_object(self) -> PackfileType {
        self.object
    }
}

/// Walks the object records of a complete packfile held in memory.
pub struct Entries<'a> {
    body: &'a [u8],
    offset: usize,
    remaining: u32
}

impl<'a> Entries<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let count = read_preamble(bytes)?;
        if bytes.len() < PREAMBLE_LEN + TRAILER_LEN {
            return Err(ErrorKind::CorruptedPackfile.into())
        }

        Ok(Entries {
            body: &bytes[..bytes.len() - TRAILER_LEN],
            offset: PREAMBLE_LEN,
            remaining: count
        })
    }

    fn read_entry(&mut self) -> Result<Entry> {
        let start = self.offset;
        let mut cursor = &self.body[start..];
        let (obj_type, size) = read_header(&mut cursor)?;
        let kind = Kind::from_u8(obj_type)?;
        let mut idx = self.body.len() - cursor.len();

        let base = match kind {
            Kind::Blob => None,
            Kind::RefDelta => {
                let id = self.body.get(idx..idx + 20)
                    .and_then(Id::from_bytes)
                    .ok_or(ErrorKind::CorruptedPackfile)?;
                idx += 20;
                Some(id)
            }
        };

        let size_hint = usize::try_from(size).map_err(|_| ErrorKind::CorruptedPackfile)?;
        let (data, used) = decompress(&self.body[idx..], size_hint)?;
        idx += used;
        self.offset = idx;

        let object = match base {
            Some(id) => PackfileType::RefDelta((id, data)),
            None => PackfileType::Plain(data)
        };

        Ok(Entry {
            offset: start as u64,
            packed_len: idx - start,
            crc32: CRC32.checksum(&self.body[start..idx]),
            size,
            object
        })
    }

    /// True once every record the count promised has been read and nothing
    /// but the trailer is left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0 && self.offset == self.body.len()
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None
        }

        self.remaining -= 1;
        let entry = self.read_entry();
        if entry.is_err() {
            self.remaining = 0;
        }
        Some(entry)
    }
}

/// Checks the trailing checksum and that the count matches the records
/// actually present. Returns the checksum.
pub fn verify(bytes: &[u8]) -> Result<Id> {
    let count = read_preamble(bytes)?;
    if bytes.len() < PREAMBLE_LEN + TRAILER_LEN {
        return Err(ErrorKind::CorruptedPackfile.into())
    }

    let split = bytes.len() - TRAILER_LEN;
    let mut shasum = Sha1::new();
    shasum.input(&bytes[..split]);
    let checksum = Id::digest(&mut shasum);
    if &checksum.bytes()[..] != &bytes[split..] {
        return Err(ErrorKind::ChecksumMismatch.into())
    }

    let mut entries = Entries::new(bytes)?;
    let mut found = 0;
    for entry in &mut entries {
        entry?;
        found += 1;
    }

    if found != count || !entries.is_exhausted() {
        return Err(ErrorKind::CountMismatch(count, found).into())
    }

    Ok(checksum)
}

/// Inflates every object in the pack, resolving ref-deltas against the
/// objects already seen by id.
pub fn unpack(bytes: &[u8]) -> Result<Vec<(Id, Vec<u8>)>> {
    let mut objects: Vec<(Id, Vec<u8>)> = Vec::new();
    let mut by_id: HashMap<Id, usize> = HashMap::new();

    for entry in Entries::new(bytes)? {
        let contents = match entry?.into_object() {
            PackfileType::Plain(data) => data,
            PackfileType::RefDelta((base_id, instructions)) => {
                let base = match by_id.get(&base_id) {
                    Some(&idx) => &objects[idx].1,
                    None => return Err(ErrorKind::MissingDeltaBase(base_id.to_string()).into())
                };
                DeltaDecoder::new(&instructions, base)?.into_vec()
            }
        };

        let id = Blob::id_of(&contents);
        by_id.insert(id, objects.len());
        objects.push((id, contents));
    }

    Ok(objects)
}
