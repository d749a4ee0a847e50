use flate2::Compression;
use std::io::{ Read, Seek, Write };

use crate::errors::{ Result, ResultExt };
use crate::pack::compress::compress;
use crate::pack::{ Kind, Writer };
use crate::stream::BlobStream;
use crate::objects::Blob;
use crate::delta;
use crate::id::Id;

pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Longest run of deltas allowed before a blob is stored whole again.
    pub max_depth: usize,
    pub compression: Compression
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_depth: DEFAULT_MAX_DEPTH,
            compression: Compression::default()
        }
    }
}

/// The blob most recently written and how many deltas in a row led up to it.
#[derive(Debug, Default)]
pub struct ChainState {
    previous: Option<(Id, Vec<u8>)>,
    depth: usize
}

impl ChainState {
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The base the next blob may be deltified against, if the chain still
    /// has room.
    pub fn base(&self, max_depth: usize) -> Option<(&Id, &[u8])> {
        if self.depth >= max_depth {
            return None
        }

        self.previous.as_ref().map(|(id, contents)| (id, &contents[..]))
    }

    fn advance(&mut self, id: Id, contents: Vec<u8>, deltified: bool) {
        self.depth = if deltified { self.depth + 1 } else { 0 };
        self.previous = Some((id, contents));
    }
}

pub struct Importer<F> {
    writer: Writer<F>,
    chain: ChainState,
    options: Options
}

impl<F: Read + Write + Seek> Importer<F> {
    pub fn new(file: F, options: Options) -> Result<Self> {
        Ok(Importer {
            writer: Writer::new(file)?,
            chain: ChainState::default(),
            options
        })
    }

    pub fn chain(&self) -> &ChainState {
        &self.chain
    }

    pub fn object_count(&self) -> u32 {
        self.writer.object_count()
    }

    /// Writes one blob, as a delta against the previous blob when the chain
    /// allows it, and returns the blob's id.
    pub fn import(&mut self, blob: Blob) -> Result<Id> {
        let id = blob.id();

        let deltified = match self.chain.base(self.options.max_depth) {
            Some((base_id, base)) => {
                let instructions = delta::encode(base, blob.contents());
                let compressed = compress(&instructions, self.options.compression)?;
                trace!("{} delta against {}: {} -> {} bytes", id, base_id, blob.len(), instructions.len());
                self.writer.write_object(Kind::RefDelta, instructions.len() as u64, Some(base_id), &compressed)?;
                true
            },
            None => {
                let compressed = compress(blob.contents(), self.options.compression)?;
                trace!("{} stored whole: {} bytes", id, blob.len());
                self.writer.write_object(Kind::Blob, blob.len() as u64, None, &compressed)?;
                false
            }
        };

        self.chain.advance(id, blob.into_contents(), deltified);
        Ok(id)
    }

    pub fn finish(self) -> Result<(F, Id)> {
        debug!("finishing pack, chain depth {}", self.chain.depth());
        self.writer.finish()
    }
}

/// Imports every blob from `input` into `pack`, printing each id to `output`
/// as soon as it is written. Returns the pack checksum.
pub fn run<R, F, W>(input: R, pack: F, output: &mut W, options: Options) -> Result<(F, Id)>
    where R: Read,
          F: Read + Write + Seek,
          W: Write {

    let mut importer = Importer::new(pack, options)?;
    for blob in BlobStream::new(input) {
        let id = importer.import(blob?)?;
        writeln!(output, "{}", id).chain_err(|| "Failed writing object id")?;
        output.flush().chain_err(|| "Failed flushing object id")?;
    }

    importer.finish()
}
