//! Disc image handling module
//!
//! Provides the sector-level pieces for rewriting multisession ISO 9660 images:
//! volume descriptor parsing, path table tracking and the single-pass transcoder.

mod iso9660;
mod path_table;
mod reader;
mod transcoder;
mod writer;

pub use iso9660::{DescriptorType, VolumeDescriptor, LEAD_IN_SECTORS, SECTOR_SIZE};
pub use path_table::PathTableLocations;
pub use reader::{DiscError, SectorReader};
pub use transcoder::{transcode, DescriptorSummary, TranscodeOptions, TranscodeReport, Transcoder};
pub use writer::{GapFill, SectorWriter};
