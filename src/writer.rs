use std::io::Write;

use crate::checksum::{ChecksumAlgorithm, RunningDigest};
use crate::error::{PatchError, Result};
use crate::patch_format::{self, Op};

/// Serialises opcode records into a patch stream.
///
/// This is only the encoder: it does no block matching. Callers decide which
/// records to emit, in order.
pub struct PatchWriter<W: Write> {
    out: W,
    digest: RunningDigest,
    block_size: usize,
}

impl<W: Write> PatchWriter<W> {
    /// Write the header: identifier (outside the digest), then the block size.
    pub fn new(mut out: W, algorithm: ChecksumAlgorithm, block_size: i32) -> Result<Self> {
        let checked =
            patch_format::checked_block_size(block_size).ok_or(PatchError::InvalidBlockSize(block_size))?;

        let name = algorithm.name().as_bytes();
        out.write_all(&[name.len() as u8])?;
        out.write_all(name)?;

        let mut writer = Self {
            out,
            digest: algorithm.running_digest(),
            block_size: checked,
        };
        writer.put(&block_size.to_be_bytes())?;
        Ok(writer)
    }

    pub fn write_block(&mut self, block_number: i32) -> Result<()> {
        if patch_format::block_offset(block_number, self.block_size).is_none() {
            return Err(PatchError::NoSuchBlock(block_number));
        }
        let op = Op::Block { number: block_number };
        self.put(&[op.code()])?;
        self.put(&block_number.to_be_bytes())
    }

    /// Emit `data` as literal records of at most `block_size` bytes each.
    pub fn write_data(&mut self, data: &[u8]) -> Result<()> {
        for chunk in data.chunks(self.block_size) {
            let len = chunk.len() as i32;
            self.put(&[Op::Data { len }.code()])?;
            self.put(&len.to_be_bytes())?;
            self.put(chunk)?;
        }
        Ok(())
    }

    /// Terminate the stream with `End` and the digest, returning the sink.
    pub fn finish(mut self) -> Result<W> {
        self.put(&[Op::End.code()])?;
        let digest = self.digest.finalize();
        self.out.write_all(&digest)?;
        Ok(self.out)
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.digest.update(bytes);
        self.out.write_all(bytes)?;
        Ok(())
    }
}
