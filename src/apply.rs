use std::io::{Read, Write};

use crate::block_source::BlockSource;
use crate::error::{PatchError, Result};
use crate::patch_format::{self, ApplySummary, Op, OP_BLOCK, OP_DATA, OP_END};
use crate::reader::ChecksumReader;

/// Rebuild the target by replaying `patch` against `blocks`, writing to `target`.
///
/// Consumes the patch up to and including its trailing digest. On error the
/// target may hold a partial result; the caller is expected to discard it.
/// Flushing and closing `target` is left to the caller.
pub fn apply<B, R, W>(blocks: B, patch: R, target: W) -> Result<ApplySummary>
where
    B: BlockSource,
    R: Read,
    W: Write,
{
    PatchApplier::new(blocks, patch, target)?.run()
}

struct PatchApplier<B, R, W> {
    input: ChecksumReader<R>,
    blocks: B,
    target: W,
    block_size: usize,
    data_buf: Vec<u8>,
    summary: ApplySummary,
}

impl<B: BlockSource, R: Read, W: Write> PatchApplier<B, R, W> {
    fn new(blocks: B, patch: R, target: W) -> Result<Self> {
        let mut input = ChecksumReader::from_patch(patch)?;
        let declared = input.read_i32()?;
        let block_size =
            patch_format::checked_block_size(declared).ok_or(PatchError::InvalidBlockSize(declared))?;

        log::debug!(
            "Patch header: checksum {}, block size {}",
            input.algorithm(),
            block_size
        );

        let summary = ApplySummary {
            algorithm: input.algorithm(),
            block_size,
            blocks_copied: 0,
            data_records: 0,
            bytes_written: 0,
        };

        Ok(Self {
            input,
            blocks,
            target,
            block_size,
            data_buf: vec![0u8; block_size],
            summary,
        })
    }

    fn run(mut self) -> Result<ApplySummary> {
        loop {
            let op = self.read_op()?;
            log::trace!("op {:?} at byte {}", op, self.input.bytes_consumed());
            match op {
                Op::Block { number } => self.process_block(number)?,
                Op::Data { len } => self.process_data(len)?,
                Op::End => break,
            }
        }
        self.verify()
    }

    fn read_op(&mut self) -> Result<Op> {
        match self.input.read_u8()? {
            OP_BLOCK => Ok(Op::Block {
                number: self.input.read_i32()?,
            }),
            OP_DATA => Ok(Op::Data {
                len: self.input.read_i32()?,
            }),
            OP_END => Ok(Op::End),
            code => Err(PatchError::UnknownOp(code)),
        }
    }

    fn process_block(&mut self, number: i32) -> Result<()> {
        let offset = patch_format::block_offset(number, self.block_size)
            .ok_or(PatchError::NoSuchBlock(number))?;
        self.blocks
            .copy_block(offset, self.block_size, &mut self.target)
            .map_err(|source| PatchError::BlockSourceFailure {
                offset,
                length: self.block_size,
                source,
            })?;
        self.summary.blocks_copied += 1;
        self.summary.bytes_written += self.block_size as u64;
        Ok(())
    }

    fn process_data(&mut self, len: i32) -> Result<()> {
        if len <= 0 || len as usize > self.block_size {
            return Err(PatchError::InvalidDataBlockLength(len));
        }
        let buf = &mut self.data_buf[..len as usize];
        self.input.read_bytes(buf)?;
        self.target.write_all(buf)?;
        self.summary.data_records += 1;
        self.summary.bytes_written += len as u64;
        Ok(())
    }

    fn verify(self) -> Result<ApplySummary> {
        let (computed, mut trailer) = self.input.finalize_digest();
        let mut in_patch = vec![0u8; computed.len()];
        trailer.read_fully_without_updating_checksum(&mut in_patch)?;
        if in_patch != computed {
            return Err(PatchError::ChecksumMismatch {
                expected: in_patch,
                actual: computed,
            });
        }

        log::debug!(
            "Patch applied: {} blocks, {} data records, {} bytes, {} patch bytes read",
            self.summary.blocks_copied,
            self.summary.data_records,
            self.summary.bytes_written,
            trailer.bytes_consumed()
        );
        Ok(self.summary)
    }
}
