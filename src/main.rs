mod util;

use anyhow::{bail, Context, Result};
use blockpatch::{apply, ApplySummary, BlockSource, DiscardBlockSource, MemoryBlockSource};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "blockpatch", about = "Apply and verify block/literal patch streams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild a file from base data and a patch
    Apply {
        /// Path to the base (original) file
        #[arg(long)]
        base: PathBuf,
        /// Path to the patch file (raw or zstd-compressed)
        #[arg(long, short)]
        patch: PathBuf,
        /// Output path for the reconstructed file
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Check the integrity of one or more patch streams
    Verify {
        /// Patch files to check
        #[arg(long, short, required = true, num_args = 1..)]
        patch: Vec<PathBuf>,
        /// Base file to resolve block copies against; without it block
        /// records are only range-checked
        #[arg(long)]
        base: Option<PathBuf>,
    },
}

/// Apply `patch` to `base`, writing `output`.
///
/// The result is staged in a temporary file next to `output` and renamed over
/// it only on success, so a failed run leaves no output behind and `output`
/// may name the base file itself.
fn apply_file(base: &Path, patch: &Path, output: &Path) -> Result<ApplySummary> {
    let base_map = util::mmap_file(base)?;
    let input = util::open_patch(patch)?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    let mut target = BufWriter::with_capacity(256 * 1024, staged);

    let summary = apply(MemoryBlockSource::new(&base_map[..]), input, &mut target)
        .with_context(|| format!("Failed to apply patch: {}", patch.display()))?;
    let staged = target
        .into_inner()
        .map_err(|e| e.into_error())
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;

    // Windows refuses to replace a file that is still mapped (os error 1224).
    drop(base_map);
    staged
        .persist(output)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;
    Ok(summary)
}

fn verify_file(patch: &Path, base: Option<&Path>) -> Result<ApplySummary> {
    let input = util::open_patch(patch)?;
    let base_map = base.map(util::mmap_file).transpose()?;
    let blocks: Box<dyn BlockSource + '_> = match &base_map {
        Some(map) => Box::new(MemoryBlockSource::new(&map[..])),
        None => Box::new(DiscardBlockSource),
    };
    apply(blocks, input, io::sink()).with_context(|| format!("Patch is invalid: {}", patch.display()))
}

/// `bytes_label` names the byte total: written for real output, described
/// when block copies were only range-checked.
fn print_summary(summary: &ApplySummary, bytes_label: &str) {
    println!("  Checksum: {}", summary.algorithm);
    println!("  Block size: {}", summary.block_size);
    println!("  Blocks copied: {}", summary.blocks_copied);
    println!("  Data records: {}", summary.data_records);
    println!("  {}: {}", bytes_label, summary.bytes_written);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply { base, patch, output } => {
            println!("Applying patch...");
            println!("  Base: {}", base.display());
            println!("  Patch: {}", patch.display());
            println!("  Output: {}", output.display());

            let start = Instant::now();
            let summary =
                tokio::task::spawn_blocking(move || apply_file(&base, &patch, &output)).await??;
            let elapsed = start.elapsed();

            println!("\nPatch applied successfully!");
            print_summary(&summary, "Bytes written");
            println!("  Time elapsed: {:.3}s", elapsed.as_secs_f64());
        }
        Commands::Verify { patch, base } => {
            println!("Verifying {} patch(es)...", patch.len());

            let bytes_label = if base.is_some() {
                "Bytes reconstructed"
            } else {
                "Bytes described"
            };

            let start = Instant::now();
            let results = tokio::task::spawn_blocking(move || {
                patch
                    .par_iter()
                    .map(|p| (p.clone(), verify_file(p, base.as_deref())))
                    .collect::<Vec<_>>()
            })
            .await?;
            let elapsed = start.elapsed();

            let mut failed = 0usize;
            for (path, result) in &results {
                match result {
                    Ok(summary) => {
                        println!("\nOK: {}", path.display());
                        print_summary(summary, bytes_label);
                    }
                    Err(e) => {
                        failed += 1;
                        println!("\nFAILED: {}", path.display());
                        println!("  {:#}", e);
                    }
                }
            }
            println!("\n  Time elapsed: {:.3}s", elapsed.as_secs_f64());

            if failed > 0 {
                bail!("{} of {} patch(es) failed verification", failed, results.len());
            }
        }
    }

    Ok(())
}
