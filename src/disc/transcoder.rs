//! Multisession image transcoder
//!
//! Single forward pass over a disc image:
//! 1. Lead-in: the 16 system area sectors are replaced with zeros
//! 2. Descriptors: volume descriptors are copied verbatim while their path
//!    table locations are collected
//! 3. Copy: after the terminator, a zero gap moves the rest of the image so
//!    the first path table lands on the sector its descriptors point to
//!
//! The original lead-in is not preserved because keeping it breaks the HFS
//! session of ISO9660/HFS hybrids. Only the ISO 9660 part of the disc is
//! expected to survive.

use std::io::{Read, Seek, Write};

use super::iso9660::{
    DescriptorType, VolumeDescriptor, LEAD_IN_SECTORS, MIN_DESCRIPTOR_LEN, SECTOR_SIZE,
};
use super::path_table::PathTableLocations;
use super::reader::{DiscError, SectorReader};
use super::writer::{GapFill, SectorWriter};

/// Transcoding settings
#[derive(Debug, Clone)]
pub struct TranscodeOptions {
    /// Sector size in bytes. Anything other than 2048 is outside what ISO 9660
    /// images are known to use and is not exposed on the command line.
    pub sector_size: usize,
    /// How the gap before the path tables is written
    pub gap_fill: GapFill,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            sector_size: SECTOR_SIZE,
            gap_fill: GapFill::Sparse,
        }
    }
}

/// A volume descriptor copied to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorSummary {
    /// Sector index in the input image
    pub sector: u64,
    pub descriptor_type: DescriptorType,
}

/// Result of a transcode run
#[derive(Debug, Clone)]
pub struct TranscodeReport {
    /// Descriptors before the terminator, in disc order
    pub descriptors: Vec<DescriptorSummary>,
    /// Path table locations with the unused sentinel removed
    pub path_tables: PathTableLocations,
    /// Sector of the first path table
    pub first_path_table: u32,
    /// Sector index of the volume descriptor set terminator
    pub terminator_sector: u64,
    /// Zero sectors inserted after the terminator
    pub gap_sectors: u64,
    /// Bytes copied after the gap
    pub tail_bytes: u64,
    /// Total output length in bytes
    pub output_len: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    LeadIn,
    Descriptor,
    Copy,
    Done,
}

/// Transcoding context for one pass over an image
pub struct Transcoder<R, W> {
    reader: SectorReader<R>,
    writer: SectorWriter<W>,
    gap_fill: GapFill,
    state: State,
    sector: Vec<u8>,
    path_tables: PathTableLocations,
    descriptors: Vec<DescriptorSummary>,
    terminator_sector: u64,
    first_path_table: u32,
    gap_sectors: u64,
    tail_bytes: u64,
}

impl<R: Read, W: Write + Seek> Transcoder<R, W> {
    /// Create a transcoder over an input stream and an empty output stream
    ///
    /// # Returns
    /// * `Err(DiscError::InvalidSectorSize)` - The sector cannot hold a volume descriptor
    pub fn new(input: R, output: W, options: &TranscodeOptions) -> Result<Self, DiscError> {
        if options.sector_size < MIN_DESCRIPTOR_LEN {
            return Err(DiscError::InvalidSectorSize(options.sector_size));
        }

        Ok(Self {
            reader: SectorReader::new(input, options.sector_size),
            writer: SectorWriter::new(output, options.sector_size),
            gap_fill: options.gap_fill,
            state: State::LeadIn,
            sector: vec![0u8; options.sector_size],
            path_tables: PathTableLocations::new(),
            descriptors: Vec::new(),
            terminator_sector: 0,
            first_path_table: 0,
            gap_sectors: 0,
            tail_bytes: 0,
        })
    }

    /// Run the pass to completion and return the output stream
    pub fn run(mut self) -> Result<(TranscodeReport, W), DiscError> {
        while self.state != State::Done {
            self.state = match self.state {
                State::LeadIn => self.lead_in()?,
                State::Descriptor => self.descriptor()?,
                State::Copy => self.copy()?,
                State::Done => State::Done,
            };
        }

        let report = TranscodeReport {
            descriptors: self.descriptors,
            path_tables: self.path_tables,
            first_path_table: self.first_path_table,
            terminator_sector: self.terminator_sector,
            gap_sectors: self.gap_sectors,
            tail_bytes: self.tail_bytes,
            output_len: self.writer.position(),
        };
        let output = self.writer.finish()?;

        Ok((report, output))
    }

    fn lead_in(&mut self) -> Result<State, DiscError> {
        for _ in 0..LEAD_IN_SECTORS {
            if !self.reader.read_sector(&mut self.sector)? {
                return Err(DiscError::TruncatedLeadIn {
                    sectors_read: self.reader.sectors_read(),
                });
            }
        }
        self.writer.write_zero_sectors(LEAD_IN_SECTORS)?;

        log::debug!("Zeroed {} lead-in sectors", LEAD_IN_SECTORS);
        Ok(State::Descriptor)
    }

    fn descriptor(&mut self) -> Result<State, DiscError> {
        let index = self.reader.sectors_read();
        if !self.reader.read_sector(&mut self.sector)? {
            return Err(DiscError::MissingTerminator { sector: index });
        }

        // Unreachable once `new` has checked the sector size against MIN_DESCRIPTOR_LEN
        let Some(vd) = VolumeDescriptor::new(&self.sector) else {
            return Err(DiscError::InvalidSectorSize(self.sector.len()));
        };
        let descriptor_type = vd.descriptor_type();

        if !vd.has_standard_identifier() {
            log::warn!(
                "Sector {} has no CD001 identifier, treating it as a volume descriptor anyway",
                index
            );
        }

        if vd.is_terminator() {
            self.terminator_sector = index;
            self.insert_gap()?;
            return Ok(State::Copy);
        }

        let locations = vd.path_table_locations();
        log::debug!(
            "{} at sector {}: path tables {:?}",
            descriptor_type.display_name(),
            index,
            locations
        );
        self.path_tables.extend(locations);
        self.descriptors.push(DescriptorSummary {
            sector: index,
            descriptor_type,
        });
        self.writer.write_sector(&self.sector)?;

        Ok(State::Descriptor)
    }

    /// Work out the gap, then write the terminator (still in the buffer) and the gap
    fn insert_gap(&mut self) -> Result<(), DiscError> {
        self.path_tables.remove_unused();
        let first = self.path_tables.first().ok_or(DiscError::NoPathTable)?;

        // The body resumes on the sector right after the terminator
        let sector = self.terminator_sector + 1;
        let gap = i64::from(first) - sector as i64;
        if gap < 0 {
            return Err(DiscError::InconsistentGeometry {
                first_path_table: first,
                sector,
            });
        }

        self.first_path_table = first;
        self.gap_sectors = gap as u64;

        log::info!(
            "First path table at sector {}, body starts at sector {}: inserting {} sectors",
            first,
            sector,
            self.gap_sectors
        );

        self.writer.write_sector(&self.sector)?;
        self.writer.insert_gap(self.gap_sectors, self.gap_fill)?;
        Ok(())
    }

    fn copy(&mut self) -> Result<State, DiscError> {
        self.tail_bytes = self.writer.copy_tail(self.reader.get_mut())?;
        log::debug!("Copied {} bytes after the gap", self.tail_bytes);
        Ok(State::Done)
    }
}

/// Transcode `input` into `output` in one pass
///
/// `output` must be empty and positioned at its start.
pub fn transcode<R: Read, W: Write + Seek>(
    input: R,
    output: W,
    options: &TranscodeOptions,
) -> Result<TranscodeReport, DiscError> {
    let (report, _) = Transcoder::new(input, output, options)?.run()?;
    Ok(report)
}
