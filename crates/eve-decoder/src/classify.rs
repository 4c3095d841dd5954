//! Transaction classification by header bytes, and address labelling.

use std::fmt;

use crate::variant::{HostCommandFrame, VariantLayout};

/// Bit 7 of the first header byte marks a write.
const WRITE_FLAG: u8 = 0x80;

/// What a completed transaction was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Power/clock/reset host command.
    HostCommand {
        /// Host command opcode.
        opcode: u8,
    },
    /// BT82x all-zero heartbeat.
    Active,
    /// Register or memory read.
    Read {
        /// Target address.
        address: u32,
    },
    /// Register or memory write.
    Write {
        /// Target address.
        address: u32,
    },
}

/// Classifies an outbound byte sequence.
///
/// Returns `None` when the sequence matches no frame shape of the generation.
#[must_use]
pub fn classify(layout: &VariantLayout, mosi: &[u8]) -> Option<TransactionKind> {
    match layout.host_command {
        HostCommandFrame::ExactLength { len } => {
            if mosi.len() == len {
                return Some(TransactionKind::HostCommand { opcode: mosi[0] });
            }
        }
        HostCommandFrame::Escaped {
            len,
            prefix,
            opcode_high_nibble,
        } => {
            if mosi.len() == len {
                if mosi.iter().all(|byte| *byte == 0) {
                    return Some(TransactionKind::Active);
                }
                if mosi[0] == prefix && (mosi[1] & 0xF0) == opcode_high_nibble {
                    return Some(TransactionKind::HostCommand { opcode: mosi[1] });
                }
            }
        }
    }

    if mosi.len() < layout.min_access_len.max(layout.header_len) {
        return None;
    }

    let address = header_address(layout, mosi);
    if (mosi[0] & WRITE_FLAG) == 0 {
        Some(TransactionKind::Read { address })
    } else {
        Some(TransactionKind::Write { address })
    }
}

/// Assembles the big-endian address carried by the header bytes.
fn header_address(layout: &VariantLayout, mosi: &[u8]) -> u32 {
    mosi[1..layout.header_len]
        .iter()
        .fold(u32::from(mosi[0] & layout.address_mask), |address, byte| {
            (address << 8) | u32::from(*byte)
        })
}

/// Host command name, or the `UNKNOWN_CMD` fallback.
#[must_use]
pub fn host_command_label(layout: &VariantLayout, opcode: u8) -> String {
    layout
        .symbols
        .host_commands
        .lookup(u32::from(opcode))
        .map_or_else(|| format!("UNKNOWN_CMD (0x{opcode:02X})"), str::to_string)
}

/// Symbolic name for a target address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressLabel {
    /// Inside display-list RAM, at `offset` from the window base.
    RamDl {
        /// Offset from the display-list RAM base.
        offset: u32,
    },
    /// A named register.
    Register(&'static str),
    /// Anything else.
    Unmapped(u32),
}

/// Register that feeds the coprocessor command FIFO directly.
pub const COMMAND_BUFFER_REGISTER: &str = "REG_CMDB_WRITE";
/// BT82x boot progress register.
pub const BOOT_STATUS_REGISTER: &str = "REG_BOOT_STATUS";

impl AddressLabel {
    /// Resolves `address` against the generation's RAM window and register map.
    #[must_use]
    pub fn resolve(layout: &VariantLayout, address: u32) -> Self {
        if layout.in_ram_dl(address) {
            return Self::RamDl {
                offset: address - layout.ram_dl.0,
            };
        }
        layout
            .symbols
            .registers
            .lookup(address)
            .map_or(Self::Unmapped(address), Self::Register)
    }

    /// Returns `true` for targets whose payload is a display-list or
    /// coprocessor instruction.
    #[must_use]
    pub fn carries_instructions(self) -> bool {
        match self {
            Self::RamDl { .. } => true,
            Self::Register(name) => name == COMMAND_BUFFER_REGISTER,
            Self::Unmapped(_) => false,
        }
    }

    /// Returns `true` for the boot-status register.
    #[must_use]
    pub fn is_boot_status(self) -> bool {
        matches!(self, Self::Register(name) if name == BOOT_STATUS_REGISTER)
    }
}

impl fmt::Display for AddressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RamDl { offset } => write!(f, "RAM-DL+0x{offset:04X}"),
            Self::Register(name) => f.write_str(name),
            Self::Unmapped(address) => write!(f, "0x{address:08X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, host_command_label, AddressLabel, TransactionKind};
    use crate::variant::{BT82X_LAYOUT, FT81X_LAYOUT};

    #[test]
    fn ft81x_three_bytes_is_host_command() {
        assert_eq!(
            classify(&FT81X_LAYOUT, &[0x68, 0x00, 0x00]),
            Some(TransactionKind::HostCommand { opcode: 0x68 })
        );
        assert_eq!(host_command_label(&FT81X_LAYOUT, 0x68), "RST_PULSE");
        assert_eq!(host_command_label(&FT81X_LAYOUT, 0x99), "UNKNOWN_CMD (0x99)");
    }

    #[test]
    fn ft81x_address_uses_22_bits() {
        assert_eq!(
            classify(&FT81X_LAYOUT, &[0x00, 0x30, 0x20, 0x00]),
            Some(TransactionKind::Read { address: 0x0030_2000 })
        );
        assert_eq!(
            classify(&FT81X_LAYOUT, &[0xF0, 0x20, 0x00, 0x12, 0x34]),
            Some(TransactionKind::Write { address: 0x0030_2000 })
        );
    }

    #[test]
    fn bt82x_heartbeat_and_host_command() {
        assert_eq!(
            classify(&BT82X_LAYOUT, &[0; 5]),
            Some(TransactionKind::Active)
        );
        assert_eq!(
            classify(&BT82X_LAYOUT, &[0xFF, 0xE7, 0x00, 0x00, 0x00]),
            Some(TransactionKind::HostCommand { opcode: 0xE7 })
        );
        assert_eq!(host_command_label(&BT82X_LAYOUT, 0xE7), "RESET_PULSE");
    }

    #[test]
    fn bt82x_escape_without_e_nibble_is_an_access() {
        assert_eq!(
            classify(&BT82X_LAYOUT, &[0xFF, 0x12, 0x34, 0x56, 0x00]),
            Some(TransactionKind::Write { address: 0x7F12_3456 })
        );
    }

    #[test]
    fn bt82x_address_uses_31_bits() {
        assert_eq!(
            classify(&BT82X_LAYOUT, &[0x7F, 0x80, 0x04, 0x4C]),
            Some(TransactionKind::Read { address: 0x7F80_044C })
        );
        assert_eq!(classify(&BT82X_LAYOUT, &[0x7F, 0x80, 0x04]), None);
    }

    #[test]
    fn labels_render_per_category() {
        assert_eq!(
            AddressLabel::resolve(&FT81X_LAYOUT, 0x0030_0010).to_string(),
            "RAM-DL+0x0010"
        );
        assert_eq!(
            AddressLabel::resolve(&FT81X_LAYOUT, 0x0030_2000).to_string(),
            "REG_ID"
        );
        assert_eq!(
            AddressLabel::resolve(&FT81X_LAYOUT, 0x0000_1234).to_string(),
            "0x00001234"
        );
        assert_eq!(
            AddressLabel::resolve(&BT82X_LAYOUT, 0x7F00_BFFC).to_string(),
            "RAM-DL+0x3FFC"
        );
    }

    #[test]
    fn instruction_targets() {
        assert!(AddressLabel::resolve(&FT81X_LAYOUT, 0x0030_0000).carries_instructions());
        assert!(AddressLabel::resolve(&FT81X_LAYOUT, 0x0030_2578).carries_instructions());
        assert!(AddressLabel::resolve(&BT82X_LAYOUT, 0x7F01_0000).carries_instructions());
        assert!(!AddressLabel::resolve(&BT82X_LAYOUT, 0x7F00_6000).carries_instructions());
        assert!(AddressLabel::resolve(&BT82X_LAYOUT, 0x7F80_044C).is_boot_status());
    }
}
