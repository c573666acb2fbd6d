//! Apply rsync-style patch streams.
//!
//! A patch is a checksummed sequence of instructions that either copy a
//! fixed-size block of the base data or insert literal bytes:
//!
//! ```text
//! [name_len: u8][algorithm name]      not digested
//! [block size: i32 BE]                digested from here...
//! ([0x00][block: i32 BE] | [0x01][len: i32 BE][len bytes])*
//! [0xFF]                              ...to here
//! [digest]
//! ```
//!
//! [`apply`] replays a patch against a [`BlockSource`] and fails if the
//! trailing digest does not match. [`PatchWriter`] produces the same format.
//!
//! ```
//! use blockpatch::{apply, ChecksumAlgorithm, MemoryBlockSource, PatchWriter};
//!
//! let mut writer = PatchWriter::new(Vec::new(), ChecksumAlgorithm::Crc32, 4)?;
//! writer.write_block(0)?;
//! writer.write_data(b"hi")?;
//! let patch = writer.finish()?;
//!
//! let mut out = Vec::new();
//! apply(MemoryBlockSource::new(&b"abcdefgh"[..]), &patch[..], &mut out)?;
//! assert_eq!(out, b"abcdhi");
//! # Ok::<(), blockpatch::PatchError>(())
//! ```

pub mod apply;
pub mod block_source;
pub mod checksum;
pub mod error;
pub mod patch_format;
pub mod reader;
pub mod writer;

pub use apply::apply;
pub use block_source::{BlockSource, DiscardBlockSource, MemoryBlockSource, ReaderBlockSource};
pub use checksum::ChecksumAlgorithm;
pub use error::{PatchError, Result};
pub use patch_format::{ApplySummary, MAX_BLOCK_SIZE};
pub use writer::PatchWriter;
