use md5::{Digest, Md5};
use sha1::Sha1;

/// Checksum algorithms a patch stream may declare in its header.
///
/// The wire name is what the encoder writes into the identifier field; it is
/// matched exactly (case-sensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Crc32,
    Blake3,
}

impl ChecksumAlgorithm {
    pub const ALL: [ChecksumAlgorithm; 4] = [
        ChecksumAlgorithm::Md5,
        ChecksumAlgorithm::Sha1,
        ChecksumAlgorithm::Crc32,
        ChecksumAlgorithm::Blake3,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "MD5",
            ChecksumAlgorithm::Sha1 => "SHA-1",
            ChecksumAlgorithm::Crc32 => "CRC32",
            ChecksumAlgorithm::Blake3 => "BLAKE3",
        }
    }

    /// Length in bytes of the finalized digest, and so of the patch trailer.
    pub fn digest_len(self) -> usize {
        match self {
            ChecksumAlgorithm::Md5 => 16,
            ChecksumAlgorithm::Sha1 => 20,
            ChecksumAlgorithm::Crc32 => 4,
            ChecksumAlgorithm::Blake3 => blake3::OUT_LEN,
        }
    }

    pub fn running_digest(self) -> RunningDigest {
        match self {
            ChecksumAlgorithm::Md5 => RunningDigest::Md5(Md5::new()),
            ChecksumAlgorithm::Sha1 => RunningDigest::Sha1(Sha1::new()),
            ChecksumAlgorithm::Crc32 => RunningDigest::Crc32(crc32fast::Hasher::new()),
            ChecksumAlgorithm::Blake3 => RunningDigest::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Incremental digest over the bytes of one patch stream.
///
/// `finalize` takes `self`, so a digest cannot be finalized twice or updated
/// after it has been read out.
pub enum RunningDigest {
    Md5(Md5),
    Sha1(Sha1),
    Crc32(crc32fast::Hasher),
    Blake3(Box<blake3::Hasher>),
}

impl RunningDigest {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            RunningDigest::Md5(h) => h.update(data),
            RunningDigest::Sha1(h) => h.update(data),
            RunningDigest::Crc32(h) => h.update(data),
            RunningDigest::Blake3(h) => {
                h.update(data);
            }
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self {
            RunningDigest::Md5(h) => h.finalize().to_vec(),
            RunningDigest::Sha1(h) => h.finalize().to_vec(),
            // CRC32 goes on the wire big-endian, like every other integer in the stream.
            RunningDigest::Crc32(h) => h.finalize().to_be_bytes().to_vec(),
            RunningDigest::Blake3(h) => h.finalize().as_bytes().to_vec(),
        }
    }
}
