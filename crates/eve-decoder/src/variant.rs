//! Chip generation selection and the per-generation bit-layout constants.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::symbols::{SymbolSet, BT82X_SYMBOLS, FT81X_SYMBOLS};

/// EVE chip generations with distinct SPI framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ChipFamily {
    /// FT81x/BT81x: 3-byte header, 22-bit addresses.
    #[default]
    Ft81x,
    /// BT82x: 4-byte header, 31-bit addresses, sync-byte reads.
    Bt82x,
}

impl ChipFamily {
    /// Every supported generation, earlier first.
    pub const ALL: [Self; 2] = [Self::Ft81x, Self::Bt82x];

    /// Returns the framing constants and tables for this generation.
    #[must_use]
    pub const fn layout(self) -> &'static VariantLayout {
        match self {
            Self::Ft81x => &FT81X_LAYOUT,
            Self::Bt82x => &BT82X_LAYOUT,
        }
    }

    /// Canonical lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ft81x => "ft81x",
            Self::Bt82x => "bt82x",
        }
    }
}

impl fmt::Display for ChipFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a chip family name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown chip family `{0}` (expected ft81x, bt81x, eve, bt82x or eve5)")]
pub struct UnknownChipFamily(pub String);

impl FromStr for ChipFamily {
    type Err = UnknownChipFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ft81x" | "bt81x" | "eve" => Ok(Self::Ft81x),
            "bt82x" | "eve5" => Ok(Self::Bt82x),
            _ => Err(UnknownChipFamily(s.to_string())),
        }
    }
}

/// Shape of a host command transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCommandFrame {
    /// Any transaction of exactly `len` bytes; the opcode is byte 0.
    ExactLength {
        /// Transaction length.
        len: usize,
    },
    /// `len` bytes starting with `prefix`, opcode in byte 1 with a fixed high
    /// nibble. An all-zero transaction of the same length is the `ACTIVE`
    /// heartbeat.
    Escaped {
        /// Transaction length.
        len: usize,
        /// Required first byte.
        prefix: u8,
        /// Required high nibble of the opcode byte.
        opcode_high_nibble: u8,
    },
}

/// How a read transaction's return value is located in the inbound bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadStrategy {
    /// Skip a fixed prefix (address header plus dummy byte), take up to 4 bytes.
    FixedOffset {
        /// Inbound bytes to skip.
        skip: usize,
    },
    /// Take the bytes after the first occurrence of `marker`, longest of 4/2/1.
    SyncByte {
        /// Sync marker value.
        marker: u8,
    },
}

/// How a write transaction's payload is located in the outbound bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WritePayload {
    /// Up to 4 bytes following the header; shorter payloads keep their width.
    Truncating,
    /// Exactly one 4-byte word at the header offset, or nothing.
    FullWord,
}

/// Per-generation framing constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantLayout {
    /// Generation this layout describes.
    pub family: ChipFamily,
    /// Address header length in bytes.
    pub header_len: usize,
    /// Mask applied to the first header byte before assembling the address.
    pub address_mask: u8,
    /// Hex digits used when rendering an address in output templates.
    pub address_digits: usize,
    /// How host commands are told apart from memory accesses.
    pub host_command: HostCommandFrame,
    /// Minimum outbound length of a register/memory access.
    pub min_access_len: usize,
    /// Inclusive display-list RAM window.
    pub ram_dl: (u32, u32),
    /// Outbound byte whose top two bits mark vertex instructions.
    pub vertex_probe_offset: usize,
    /// Write payload extraction rule.
    pub write_payload: WritePayload,
    /// Read payload extraction rule.
    pub read_strategy: ReadStrategy,
    /// Symbol tables.
    pub symbols: SymbolSet,
}

impl VariantLayout {
    /// Returns `true` when `address` lies in display-list RAM.
    #[must_use]
    pub const fn in_ram_dl(&self, address: u32) -> bool {
        address >= self.ram_dl.0 && address <= self.ram_dl.1
    }
}

/// FT81x/BT81x framing.
pub const FT81X_LAYOUT: VariantLayout = VariantLayout {
    family: ChipFamily::Ft81x,
    header_len: 3,
    address_mask: 0x3F,
    address_digits: 6,
    host_command: HostCommandFrame::ExactLength { len: 3 },
    min_access_len: 4,
    ram_dl: (0x0030_0000, 0x0030_1FFF),
    vertex_probe_offset: 6,
    write_payload: WritePayload::Truncating,
    read_strategy: ReadStrategy::FixedOffset { skip: 4 },
    symbols: FT81X_SYMBOLS,
};

/// BT82x framing.
pub const BT82X_LAYOUT: VariantLayout = VariantLayout {
    family: ChipFamily::Bt82x,
    header_len: 4,
    address_mask: 0x7F,
    address_digits: 8,
    host_command: HostCommandFrame::Escaped {
        len: 5,
        prefix: 0xFF,
        opcode_high_nibble: 0xE0,
    },
    min_access_len: 4,
    ram_dl: (0x7F00_8000, 0x7F00_BFFF),
    vertex_probe_offset: 7,
    write_payload: WritePayload::FullWord,
    read_strategy: ReadStrategy::SyncByte { marker: 0x01 },
    symbols: BT82X_SYMBOLS,
};

/// Top-level decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecoderConfig {
    /// Chip generation on the bus.
    pub family: ChipFamily,
}

impl DecoderConfig {
    /// Configuration for the given generation.
    #[must_use]
    pub const fn new(family: ChipFamily) -> Self {
        Self { family }
    }

    /// Framing constants of the configured generation.
    #[must_use]
    pub const fn layout(&self) -> &'static VariantLayout {
        self.family.layout()
    }
}
