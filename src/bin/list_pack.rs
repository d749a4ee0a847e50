extern crate git_pack_import;

use std::collections::HashMap;
use std::io::{ self, Write };
use std::path::PathBuf;
use std::fs::File;
use memmap::MmapOptions;
use clap::Parser;
use error_chain::ChainedError;

use git_pack_import::errors::{ Result, ResultExt, ErrorKind };
use git_pack_import::pack::internal_type::PackfileType;
use git_pack_import::pack::read::{ verify, Entries };
use git_pack_import::delta::DeltaDecoder;
use git_pack_import::objects::Blob;
use git_pack_import::id::Id;

/// Verifies a packfile and lists its objects, one per line:
/// id, type, size, size in pack, offset, crc32 and the delta base if any.
#[derive(Parser)]
struct Args {
    pack: PathBuf,
}

fn run(args: &Args) -> Result<()> {
    let f = File::open(&args.pack)
        .chain_err(|| format!("Can't open pack file {}", args.pack.display()))?;
    let mmap = unsafe { MmapOptions::new().map(&f) }
        .chain_err(|| format!("Can't map pack file {}", args.pack.display()))?;

    let checksum = verify(&mmap[..])?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let mut seen: HashMap<Id, Vec<u8>> = HashMap::new();
    let mut deltas = 0;

    for entry in Entries::new(&mmap[..])? {
        let entry = entry?;
        let (kind, size, packed_len, offset, crc32) = (
            entry.kind(),
            entry.size(),
            entry.packed_len(),
            entry.offset(),
            entry.crc32()
        );

        let (contents, base) = match entry.into_object() {
            PackfileType::Plain(data) => (data, None),
            PackfileType::RefDelta((base_id, instructions)) => {
                deltas += 1;
                let base = match seen.get(&base_id) {
                    Some(xs) => xs,
                    None => return Err(ErrorKind::MissingDeltaBase(base_id.to_string()).into())
                };
                (DeltaDecoder::new(&instructions, base)?.into_vec(), Some(base_id))
            }
        };

        let id = Blob::id_of(&contents);
        match base {
            Some(base_id) => writeln!(stdout, "{} {:9} {} {} {} {:08x} {}", id, kind.as_str(), size, packed_len, offset, crc32, base_id)?,
            None => writeln!(stdout, "{} {:9} {} {} {} {:08x}", id, kind.as_str(), size, packed_len, offset, crc32)?
        };

        seen.insert(id, contents);
    }

    writeln!(stdout, "deltas: {}", deltas)?;
    writeln!(stdout, "{}: ok", checksum)?;
    Ok(())
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprint!("{}", e.display_chain());
        std::process::exit(128);
    }
}
