use crate::checksum::ChecksumAlgorithm;

/// Largest block size a patch may declare (10 MiB). Also bounds the literal buffer.
pub const MAX_BLOCK_SIZE: i32 = 10 * 1024 * 1024;

/// Opcode wire values shared with the encoder.
pub const OP_BLOCK: u8 = 0x00;
pub const OP_DATA: u8 = 0x01;
pub const OP_END: u8 = 0xff;

/// One decoded opcode record, before any payload is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Copy base-data block `number`
    Block { number: i32 },
    /// `len` literal bytes follow in the stream
    Data { len: i32 },
    End,
}

impl Op {
    pub fn code(&self) -> u8 {
        match self {
            Op::Block { .. } => OP_BLOCK,
            Op::Data { .. } => OP_DATA,
            Op::End => OP_END,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplySummary {
    pub algorithm: ChecksumAlgorithm,
    pub block_size: usize,
    pub blocks_copied: usize,
    pub data_records: usize,
    pub bytes_written: u64,
}

/// Validate a declared block size and convert it to a buffer length.
pub fn checked_block_size(block_size: i32) -> Option<usize> {
    if block_size <= 0 || block_size > MAX_BLOCK_SIZE {
        None
    } else {
        Some(block_size as usize)
    }
}

/// Byte offset of `block_number`, or `None` if the block cannot exist.
///
/// The last byte of the block, `start + block_size - 1`, must also be
/// addressable.
pub fn block_offset(block_number: i32, block_size: usize) -> Option<u64> {
    if block_number < 0 {
        return None;
    }
    let start = i64::from(block_number).checked_mul(block_size as i64)?;
    let last = start.checked_add(block_size as i64 - 1)?;
    if last < 0 {
        return None;
    }
    Some(start as u64)
}
