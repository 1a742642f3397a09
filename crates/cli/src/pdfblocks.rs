//! pdfblocks - extract positioned text blocks from a single-page PDF and
//! print them as JSON.

use clap::Parser;
use folio_core::extract_text_blocks_from_bytes;
use memmap2::Mmap;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfblocks", about = "Extract positioned text blocks from a single-page PDF")]
struct Args {
    /// PDF file to read
    file: PathBuf,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let file = File::open(&args.file)?;
    // Safety: the mapping is read-only and dropped before exit.
    let mmap = unsafe { Mmap::map(&file)? };

    let blocks = extract_text_blocks_from_bytes(&mmap)?;

    let out = if args.pretty {
        serde_json::to_string_pretty(&blocks)?
    } else {
        serde_json::to_string(&blocks)?
    };
    println!("{out}");
    Ok(())
}
