use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// First four bytes of every zstd frame.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Memory-map a file for read-only access.
///
/// # Safety
/// The mapping is read-only. Callers must not concurrently truncate or replace
/// the underlying file while the `Mmap` is live.
pub fn mmap_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    // SAFETY: We only read from this mapping; no concurrent modification of these files.
    unsafe {
        Mmap::map(&file)
            .with_context(|| format!("Failed to memory-map file: {}", path.display()))
    }
}

/// Open a patch file for streaming, decompressing it if it is a zstd frame.
///
/// A raw patch starts with the length of an ASCII algorithm name, so it can
/// never begin with the zstd magic.
pub fn open_patch(path: &Path) -> Result<Box<dyn Read + Send>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open patch: {}", path.display()))?;
    let mut reader = BufReader::with_capacity(256 * 1024, file);

    let compressed = reader
        .fill_buf()
        .with_context(|| format!("Failed to read patch: {}", path.display()))?
        .starts_with(&ZSTD_MAGIC);
    if compressed {
        log::debug!("{} is zstd-compressed", path.display());
        let decoder = zstd::Decoder::with_buffer(reader).context("Failed to create zstd decoder")?;
        Ok(Box::new(decoder))
    } else {
        Ok(Box::new(reader))
    }
}
