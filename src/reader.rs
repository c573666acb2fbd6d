use std::io::Read;

use crate::checksum::{ChecksumAlgorithm, RunningDigest};
use crate::error::{PatchError, Result};

/// Read the checksum algorithm identifier from the very start of a patch.
///
/// The identifier is a length byte followed by that many ASCII bytes. It is
/// read straight off the raw source, before any digest exists, so it is never
/// part of the checksummed region.
pub fn read_checksum_algorithm<R: Read>(source: &mut R) -> Result<ChecksumAlgorithm> {
    let mut len = [0u8; 1];
    source.read_exact(&mut len).map_err(PatchError::from_read)?;
    let mut name = vec![0u8; len[0] as usize];
    source.read_exact(&mut name).map_err(PatchError::from_read)?;

    let name = String::from_utf8_lossy(&name);
    ChecksumAlgorithm::from_name(&name)
        .ok_or_else(|| PatchError::UnsupportedChecksumAlgorithm(name.into_owned()))
}

/// Typed reads over a patch stream that feed every consumed byte into a
/// running digest.
///
/// Nothing is read ahead: the digest covers exactly the bytes the caller has
/// asked for, in order.
pub struct ChecksumReader<R> {
    inner: R,
    algorithm: ChecksumAlgorithm,
    digest: RunningDigest,
    consumed: u64,
}

impl<R: Read> ChecksumReader<R> {
    pub fn new(inner: R, algorithm: ChecksumAlgorithm) -> Self {
        Self {
            inner,
            algorithm,
            digest: algorithm.running_digest(),
            consumed: 0,
        }
    }

    /// Read the identifier off `inner` and wrap the rest of the stream.
    pub fn from_patch(mut inner: R) -> Result<Self> {
        let algorithm = read_checksum_algorithm(&mut inner)?;
        Ok(Self::new(inner, algorithm))
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Bytes consumed since the identifier, digested or not.
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_bytes(&mut buf)?;
        Ok(buf[0])
    }

    /// Big-endian signed 32-bit integer.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_bytes(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_fully_without_updating_checksum(buf)?;
        self.digest.update(buf);
        Ok(())
    }

    pub fn read_fully_without_updating_checksum(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(PatchError::from_read)?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    /// Finish the digest. The remaining stream can only be read unchecksummed.
    pub fn finalize_digest(self) -> (Vec<u8>, TrailerReader<R>) {
        let digest = self.digest.finalize();
        let trailer = TrailerReader {
            inner: self.inner,
            consumed: self.consumed,
        };
        (digest, trailer)
    }
}

/// What is left of a patch stream once its digest has been finalized.
pub struct TrailerReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> TrailerReader<R> {
    pub fn read_fully_without_updating_checksum(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(PatchError::from_read)?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }
}
