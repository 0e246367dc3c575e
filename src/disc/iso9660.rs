//! ISO 9660 volume descriptor parsing
//!
//! Reads the parts of a volume descriptor needed to realign a multisession
//! image: the descriptor type code and the four path table location fields.
//! The volume descriptor set starts at sector 16 (offset 32768 bytes).

/// ISO 9660 sector size in bytes
pub const SECTOR_SIZE: usize = 2048;

/// Number of sectors before the volume descriptor set (the system area)
pub const LEAD_IN_SECTORS: u64 = 16;

/// Standard identifier for ISO 9660 volume descriptors
const ISO9660_IDENTIFIER: &[u8; 5] = b"CD001";

/// Type L path table location (little-endian)
const TYPE_L_PATH_TABLE_OFFSET: usize = 140;
/// Optional type L path table location (little-endian)
const OPT_TYPE_L_PATH_TABLE_OFFSET: usize = 144;
/// Type M path table location (big-endian)
const TYPE_M_PATH_TABLE_OFFSET: usize = 148;
/// Optional type M path table location (big-endian)
const OPT_TYPE_M_PATH_TABLE_OFFSET: usize = 152;

/// Smallest sector that still holds every field read from a descriptor
pub const MIN_DESCRIPTOR_LEN: usize = OPT_TYPE_M_PATH_TABLE_OFFSET + 4;

/// Volume descriptor type code (byte 0 of the sector)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorType {
    BootRecord,
    Primary,
    Supplementary,
    Partition,
    /// Volume Descriptor Set Terminator (255)
    Terminator,
    Unknown(u8),
}

impl DescriptorType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::BootRecord,
            1 => Self::Primary,
            2 => Self::Supplementary,
            3 => Self::Partition,
            255 => Self::Terminator,
            other => Self::Unknown(other),
        }
    }

    /// Get the display name for this descriptor type
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BootRecord => "Boot Record",
            Self::Primary => "Primary Volume Descriptor",
            Self::Supplementary => "Supplementary Volume Descriptor",
            Self::Partition => "Volume Partition Descriptor",
            Self::Terminator => "Volume Descriptor Set Terminator",
            Self::Unknown(_) => "Unknown Volume Descriptor",
        }
    }
}

/// Borrowed view over one volume descriptor sector
#[derive(Debug, Clone, Copy)]
pub struct VolumeDescriptor<'a> {
    sector: &'a [u8],
}

impl<'a> VolumeDescriptor<'a> {
    /// Wrap raw sector data
    ///
    /// # Returns
    /// * `Some(VolumeDescriptor)` - The sector is long enough to hold the path table fields
    /// * `None` - The sector is shorter than [`MIN_DESCRIPTOR_LEN`]
    pub fn new(sector: &'a [u8]) -> Option<Self> {
        if sector.len() < MIN_DESCRIPTOR_LEN {
            return None;
        }
        Some(Self { sector })
    }

    pub fn type_code(&self) -> u8 {
        self.sector[0]
    }

    pub fn descriptor_type(&self) -> DescriptorType {
        DescriptorType::from_code(self.type_code())
    }

    pub fn is_terminator(&self) -> bool {
        self.descriptor_type() == DescriptorType::Terminator
    }

    /// Check the standard identifier (bytes 1-5)
    pub fn has_standard_identifier(&self) -> bool {
        &self.sector[1..6] == ISO9660_IDENTIFIER
    }

    /// The four path table locations, in on-disc field order
    ///
    /// Layout according to ECMA-119:
    /// Offset 140-143: Type L path table (little-endian)
    /// Offset 144-147: Optional type L path table (little-endian)
    /// Offset 148-151: Type M path table (big-endian)
    /// Offset 152-155: Optional type M path table (big-endian)
    ///
    /// A value of 0 means the field is unused.
    pub fn path_table_locations(&self) -> [u32; 4] {
        [
            self.read_u32_le(TYPE_L_PATH_TABLE_OFFSET),
            self.read_u32_le(OPT_TYPE_L_PATH_TABLE_OFFSET),
            self.read_u32_be(TYPE_M_PATH_TABLE_OFFSET),
            self.read_u32_be(OPT_TYPE_M_PATH_TABLE_OFFSET),
        ]
    }

    fn read_u32_le(&self, offset: usize) -> u32 {
        let b = &self.sector[offset..offset + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    fn read_u32_be(&self, offset: usize) -> u32 {
        let b = &self.sector[offset..offset + 4];
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    }
}
