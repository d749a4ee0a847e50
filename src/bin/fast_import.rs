extern crate git_pack_import;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::io;
use clap::Parser;
use error_chain::ChainedError;
use log::debug;

use git_pack_import::errors::{ Result, ResultExt };
use git_pack_import::import::{ self, Options };

/// Reads length-prefixed blobs from stdin into a new packfile, printing the
/// id of each blob as it is written.
#[derive(Parser)]
struct Args {
    /// Packfile to create (truncated if it exists)
    pack: PathBuf,
}

fn run(args: &Args) -> Result<()> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&args.pack)
        .chain_err(|| format!("Can't create pack file {}", args.pack.display()))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    let (_, checksum) = import::run(stdin.lock(), file, &mut output, Options::default())?;
    debug!("pack checksum {}", checksum);
    Ok(())
}

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprint!("{}", e.display_chain());
        std::process::exit(128);
    }
}
