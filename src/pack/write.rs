use byteorder::{ BigEndian, ByteOrder };
use crypto::{ sha1::Sha1, digest::Digest };
use std::io::{ Read, Seek, SeekFrom, Write };

use crate::errors::{ Result, ResultExt };
use crate::pack::header::{ encode_header, Kind };
use crate::pack::{ MAGIC, VERSION };
use crate::id::Id;

const CHUNK_SIZE: usize = 128 * 1024;

/// Appends object records to a new packfile.
///
/// The preamble goes out with a zero object count. `finish` is the only
/// step that seeks or reads the file back: it patches the count in place
/// and appends the SHA-1 of everything before it.
#[derive(Debug)]
pub struct Writer<F> {
    file: F,
    object_count: u32
}

impl<F: Read + Write + Seek> Writer<F> {
    pub fn new(mut file: F) -> Result<Self> {
        file.write_all(MAGIC).chain_err(|| "Can't write pack magic")?;

        let mut version = [0u8; 4];
        BigEndian::write_u32(&mut version, VERSION);
        file.write_all(&version).chain_err(|| "Can't write pack version")?;
        file.write_all(&[0u8; 4]).chain_err(|| "Can't write 0 object count")?;

        Ok(Writer {
            file,
            object_count: 0
        })
    }

    pub fn object_count(&self) -> u32 {
        self.object_count
    }

    /// Writes one record. `size` is the uncompressed payload length, `base`
    /// names the object a ref-delta applies to.
    pub fn write_object(&mut self, kind: Kind, size: u64, base: Option<&Id>, compressed: &[u8]) -> Result<()> {
        let header = encode_header(kind, size);
        self.file.write_all(header.as_bytes()).chain_err(|| "Can't write object header")?;

        if let Some(base) = base {
            self.file.write_all(base.bytes()).chain_err(|| "Can't write object base")?;
        }

        self.file.write_all(compressed).chain_err(|| "Failed writing compressed data")?;
        self.object_count += 1;
        Ok(())
    }

    /// Patches the object count, appends the trailing checksum and hands back
    /// the file along with that checksum.
    pub fn finish(mut self) -> Result<(F, Id)> {
        self.file.flush().chain_err(|| "Failed flushing pack")?;
        self.file.seek(SeekFrom::Start(0)).chain_err(|| "Failed seeking to start")?;

        let mut shasum = Sha1::new();
        let mut preamble = [0u8; 8];
        self.file.read_exact(&mut preamble).chain_err(|| "Failed reading header")?;
        shasum.input(&preamble);

        info!("{} objects", self.object_count);
        let mut count = [0u8; 4];
        BigEndian::write_u32(&mut count, self.object_count);
        shasum.input(&count);
        self.file.write_all(&count).chain_err(|| "Failed writing object count")?;

        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let read = match self.file.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).chain_err(|| "Failed reading pack contents")
            };
            shasum.input(&buf[..read]);
        }

        let checksum = Id::digest(&mut shasum);
        self.file.write_all(checksum.bytes()).chain_err(|| "Failed writing pack checksum")?;
        self.file.flush().chain_err(|| "Failed flushing pack")?;

        Ok((self.file, checksum))
    }
}
