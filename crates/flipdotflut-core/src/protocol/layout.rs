pub const PACKET_LEN: usize = 2;

pub const CMDH_OFFSET: usize = 0;
pub const CMDL_OFFSET: usize = 1;

pub const MARKER_BIT: u8 = 0x80;
pub const COLUMN_MASK: u8 = 0x7F;

pub const RESERVED_MASK: u8 = 0xE0;
pub const POLARITY_BIT: u8 = 0x10;
pub const ROW_MASK: u8 = 0x0F;
