//! Forward-only sector reader
//!
//! Pulls fixed-size sectors off any byte stream. There is no seeking: the
//! image is consumed once, front to back.

use std::io::{self, ErrorKind, Read};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while repairing a disc image
#[derive(Error, Debug)]
pub enum DiscError {
    #[error("Input file does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),

    #[error("Invalid sector size: {0} bytes")]
    InvalidSectorSize(usize),

    #[error("Input ended inside the lead-in after {sectors_read} of 16 sectors")]
    TruncatedLeadIn { sectors_read: u64 },

    /// A partial sector at the end of the input counts as the end, so a
    /// truncated terminator sector is reported here as well
    #[error("Input ended at sector {sector} before a complete volume descriptor set terminator")]
    MissingTerminator { sector: u64 },

    #[error("No path table located in the volume descriptors")]
    NoPathTable,

    #[error("Inconsistent path table geometry: path table {first_path_table} < sector {sector}")]
    InconsistentGeometry { first_path_table: u32, sector: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Reads whole sectors from a byte stream and counts them
pub struct SectorReader<R> {
    inner: R,
    sector_size: usize,
    sectors_read: u64,
}

impl<R: Read> SectorReader<R> {
    pub fn new(inner: R, sector_size: usize) -> Self {
        Self {
            inner,
            sector_size,
            sectors_read: 0,
        }
    }

    /// Read the next sector into `buffer`
    ///
    /// `buffer` must be exactly one sector long.
    ///
    /// # Returns
    /// * `Ok(true)` - A full sector was read
    /// * `Ok(false)` - The stream ended; a trailing partial sector counts as the end
    /// * `Err(io::Error)` - The underlying read failed
    pub fn read_sector(&mut self, buffer: &mut [u8]) -> Result<bool, io::Error> {
        debug_assert_eq!(buffer.len(), self.sector_size);

        let mut filled = 0;
        while filled < buffer.len() {
            match self.inner.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if filled < buffer.len() {
            if filled > 0 {
                log::debug!(
                    "Partial sector of {} bytes at sector {}",
                    filled,
                    self.sectors_read
                );
            }
            return Ok(false);
        }

        self.sectors_read += 1;
        Ok(true)
    }

    /// Number of full sectors consumed so far
    pub fn sectors_read(&self) -> u64 {
        self.sectors_read
    }

    /// The underlying stream, positioned right after the last sector read
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}
