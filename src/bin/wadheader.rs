// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "wadheader", about = "Print header and entry table of RW WAD archives")]
struct Args {
    /// WAD files to inspect
    #[arg(value_name = "FILES", required = true)]
    files: Vec<String>,

    /// List every entry of the table
    #[arg(long)]
    entries: bool,
}

fn show(path: &str, list_entries: bool) -> Result<()> {
    let wad = rwad::read_archive(path).with_context(|| format!("could not read WAD `{}`", path))?;

    println!("  version: {}.{}", wad.major_version(), wad.minor_version());
    println!("  # of entries: {}", wad.len());
    println!("  checksum: {:016x}", wad.checksum());
    println!("  redirections: {}", wad.redirections().count());

    if list_entries {
        for e in wad.entries() {
            print!(
                "  {:016x} {:>12} offset {:>10} size {:>10} -> {:>10}",
                e.hash, e.kind, e.data_offset, e.compressed_size, e.uncompressed_size
            );
            if e.is_duplicated {
                print!(" dup");
            }
            if let Some(target) = &e.file_redirection {
                print!(" => {}", target);
            }
            println!();
        }
    }
    Ok(())
}

pub fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut failed = false;
    for f in &args.files {
        println!("WAD file: {}", f);
        if let Err(err) = show(f, args.entries) {
            println!("  {:#}", err);
            failed = true;
        }
    }
    if failed {
        process::exit(1);
    }
}
