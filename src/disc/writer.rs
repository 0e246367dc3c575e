//! Forward-only sector writer with gap insertion

use std::io::{self, Read, Seek, SeekFrom, Write};

/// How the zero gap before the path tables is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapFill {
    /// Seek past the gap and let the filesystem leave a hole
    #[default]
    Sparse,
    /// Write explicit zero sectors, for sinks without hole support
    Zeroed,
}

/// Writes sectors to a seekable sink, only ever moving forward
pub struct SectorWriter<W> {
    inner: W,
    sector_size: usize,
    /// Bytes logically written, holes included
    position: u64,
    /// Set while the sink ends in a hole that nothing has been written over
    trailing_hole: bool,
}

impl<W: Write + Seek> SectorWriter<W> {
    pub fn new(inner: W, sector_size: usize) -> Self {
        Self {
            inner,
            sector_size,
            position: 0,
            trailing_hole: false,
        }
    }

    /// Write one sector verbatim
    pub fn write_sector(&mut self, sector: &[u8]) -> Result<(), io::Error> {
        debug_assert_eq!(sector.len(), self.sector_size);
        self.write_bytes(sector)
    }

    /// Write `count` zero-filled sectors
    pub fn write_zero_sectors(&mut self, count: u64) -> Result<(), io::Error> {
        let zeros = vec![0u8; self.sector_size];
        for _ in 0..count {
            self.write_bytes(&zeros)?;
        }
        Ok(())
    }

    /// Insert `count` zero sectors at the current position
    pub fn insert_gap(&mut self, count: u64, fill: GapFill) -> Result<(), io::Error> {
        if count == 0 {
            return Ok(());
        }

        match fill {
            GapFill::Zeroed => self.write_zero_sectors(count),
            GapFill::Sparse => {
                let bytes = count
                    .checked_mul(self.sector_size as u64)
                    .and_then(|b| i64::try_from(b).ok())
                    .ok_or_else(|| {
                        io::Error::new(io::ErrorKind::InvalidInput, "gap too large to seek over")
                    })?;
                self.inner.seek(SeekFrom::Current(bytes))?;
                self.position += bytes as u64;
                self.trailing_hole = true;
                Ok(())
            }
        }
    }

    /// Copy everything left in `reader` to the sink
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of bytes copied
    pub fn copy_tail<R: Read>(&mut self, reader: &mut R) -> Result<u64, io::Error> {
        let copied = io::copy(reader, &mut self.inner)?;
        if copied > 0 {
            self.position += copied;
            self.trailing_hole = false;
        }
        Ok(copied)
    }

    /// Flush the sink and hand it back
    ///
    /// A hole at the very end of the output would not extend the file on its
    /// own, so its last byte is written out.
    pub fn finish(mut self) -> Result<W, io::Error> {
        if self.trailing_hole {
            self.inner.seek(SeekFrom::Current(-1))?;
            self.inner.write_all(&[0])?;
            self.trailing_hole = false;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Logical output length so far
    pub fn position(&self) -> u64 {
        self.position
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), io::Error> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        self.trailing_hole = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_zero_sectors() {
        let mut writer = SectorWriter::new(Cursor::new(Vec::new()), 4);
        writer.write_zero_sectors(3).unwrap();
        writer.write_sector(b"abcd").unwrap();
        assert_eq!(writer.position(), 16);

        let out = writer.finish().unwrap().into_inner();
        assert_eq!(&out[..12], &[0u8; 12]);
        assert_eq!(&out[12..], b"abcd");
    }

    #[test]
    fn test_sparse_and_zeroed_gaps_match() {
        let mut results = Vec::new();
        for fill in [GapFill::Sparse, GapFill::Zeroed] {
            let mut writer = SectorWriter::new(Cursor::new(Vec::new()), 4);
            writer.write_sector(b"head").unwrap();
            writer.insert_gap(2, fill).unwrap();
            writer.copy_tail(&mut Cursor::new(b"tail".to_vec())).unwrap();
            results.push(writer.finish().unwrap().into_inner());
        }

        assert_eq!(results[0], results[1]);
        assert_eq!(results[0], b"head\0\0\0\0\0\0\0\0tail");
    }

    #[test]
    fn test_trailing_hole_is_materialized() {
        let mut writer = SectorWriter::new(Cursor::new(Vec::new()), 4);
        writer.write_sector(b"head").unwrap();
        writer.insert_gap(2, GapFill::Sparse).unwrap();
        let copied = writer.copy_tail(&mut io::empty()).unwrap();
        assert_eq!(copied, 0);
        assert_eq!(writer.position(), 12);

        let out = writer.finish().unwrap().into_inner();
        assert_eq!(out.len(), 12);
        assert_eq!(&out[4..], &[0u8; 8]);
    }

    #[test]
    fn test_empty_gap_is_noop() {
        let mut writer = SectorWriter::new(Cursor::new(Vec::new()), 4);
        writer.insert_gap(0, GapFill::Sparse).unwrap();
        assert_eq!(writer.position(), 0);
        assert!(writer.finish().unwrap().into_inner().is_empty());
    }
}
