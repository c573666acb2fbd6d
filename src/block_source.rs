use std::io::{self, Read, Seek, SeekFrom, Write};

/// Delivers base-data byte ranges for `Block` records.
///
/// Implementations must write exactly `length` bytes starting at `offset` into
/// `target`, or fail. A range that runs past the end of the base data is an
/// error, never a short copy.
pub trait BlockSource {
    fn copy_block(&mut self, offset: u64, length: usize, target: &mut dyn Write) -> io::Result<()>;
}

impl<S: BlockSource + ?Sized> BlockSource for &mut S {
    fn copy_block(&mut self, offset: u64, length: usize, target: &mut dyn Write) -> io::Result<()> {
        (**self).copy_block(offset, length, target)
    }
}

impl<S: BlockSource + ?Sized> BlockSource for Box<S> {
    fn copy_block(&mut self, offset: u64, length: usize, target: &mut dyn Write) -> io::Result<()> {
        (**self).copy_block(offset, length, target)
    }
}

fn out_of_range(offset: u64, length: usize, available: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("block range {offset}+{length} exceeds base data of {available} bytes"),
    )
}

/// Base data held in memory: a `Vec<u8>`, a slice, or a memory-mapped file.
#[derive(Debug, Clone)]
pub struct MemoryBlockSource<T> {
    data: T,
}

impl<T: AsRef<[u8]>> MemoryBlockSource<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T: AsRef<[u8]>> BlockSource for MemoryBlockSource<T> {
    fn copy_block(&mut self, offset: u64, length: usize, target: &mut dyn Write) -> io::Result<()> {
        let data = self.data.as_ref();
        let range = usize::try_from(offset)
            .ok()
            .and_then(|start| Some(start..start.checked_add(length)?))
            .filter(|range| range.end <= data.len())
            .ok_or_else(|| out_of_range(offset, length, data.len() as u64))?;
        target.write_all(&data[range])
    }
}

/// Base data behind a seekable reader, typically a `File`.
///
/// Each block is a seek followed by a bounded copy; nothing is cached.
pub struct ReaderBlockSource<R> {
    inner: R,
}

impl<R: Read + Seek> ReaderBlockSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> BlockSource for ReaderBlockSource<R> {
    fn copy_block(&mut self, offset: u64, length: usize, target: &mut dyn Write) -> io::Result<()> {
        let end = self.inner.seek(SeekFrom::End(0))?;
        let in_range = offset.checked_add(length as u64).is_some_and(|stop| stop <= end);
        if !in_range {
            return Err(out_of_range(offset, length, end));
        }
        self.inner.seek(SeekFrom::Start(offset))?;
        let copied = io::copy(&mut (&mut self.inner).take(length as u64), target)?;
        if copied != length as u64 {
            return Err(out_of_range(offset, length, offset + copied));
        }
        Ok(())
    }
}

/// Accepts every block request and writes nothing.
///
/// Used to check a patch stream's integrity without the base data at hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardBlockSource;

impl BlockSource for DiscardBlockSource {
    fn copy_block(&mut self, _offset: u64, _length: usize, _target: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_memory_copy() {
        let mut source = MemoryBlockSource::new(b"abcdefgh".to_vec());
        let mut out = Vec::new();
        source.copy_block(4, 4, &mut out).unwrap();
        source.copy_block(0, 2, &mut out).unwrap();
        assert_eq!(out, b"efghab");
    }

    #[test]
    fn test_memory_out_of_range() {
        let mut source = MemoryBlockSource::new(&b"abcdefgh"[..]);
        let mut out = Vec::new();
        let err = source.copy_block(6, 4, &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(out.is_empty(), "no partial block should be written");

        assert!(source.copy_block(u64::MAX, 1, &mut out).is_err());
    }

    #[test]
    fn test_reader_copy() {
        let mut source = ReaderBlockSource::new(Cursor::new(b"0123456789".to_vec()));
        let mut out = Vec::new();
        source.copy_block(5, 5, &mut out).unwrap();
        source.copy_block(0, 3, &mut out).unwrap();
        assert_eq!(out, b"56789012");
    }

    #[test]
    fn test_reader_out_of_range() {
        let mut source = ReaderBlockSource::new(Cursor::new(b"0123456789".to_vec()));
        let mut out = Vec::new();
        let err = source.copy_block(8, 4, &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(out.is_empty());
    }

    #[test]
    fn test_discard_writes_nothing() {
        let mut out = Vec::new();
        DiscardBlockSource.copy_block(1 << 40, 4096, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_forwarding_sources() {
        fn fetch<S: BlockSource>(mut source: S, offset: u64, length: usize) -> Vec<u8> {
            let mut out = Vec::new();
            source.copy_block(offset, length, &mut out).unwrap();
            out
        }
        let mut source = MemoryBlockSource::new(vec![1u8, 2, 3]);
        assert_eq!(fetch(&mut source, 1, 2), vec![2, 3]);
        assert_eq!(source.into_inner(), vec![1, 2, 3]);

        let boxed: Box<dyn BlockSource> = Box::new(MemoryBlockSource::new(vec![9u8, 8]));
        assert_eq!(fetch(boxed, 1, 1), vec![8]);
    }
}
