//! Payload extraction for read and write transactions.
//!
//! Both generations carry little-endian values on the wire. FT81x reads use a
//! fixed header-plus-dummy prefix; BT82x reads wait for a sync byte first.

use std::fmt;

use crate::variant::{ReadStrategy, VariantLayout, WritePayload};

/// Largest payload decoded from one transaction.
pub const WORD_BYTES: usize = 4;

/// A numeric payload together with the number of bytes it was built from.
///
/// The width is kept so that formatting reproduces the captured length: a
/// two-byte read renders as `0x1234`, never `0x00001234`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedValue {
    value: u32,
    width: usize,
}

impl DecodedValue {
    /// Builds a value from 1 to 4 little-endian bytes.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > WORD_BYTES {
            return None;
        }
        let value = bytes
            .iter()
            .rev()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
        Some(Self {
            value,
            width: bytes.len(),
        })
    }

    /// A full 32-bit word.
    #[must_use]
    pub const fn word(value: u32) -> Self {
        Self {
            value,
            width: WORD_BYTES,
        }
    }

    /// Numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.value
    }

    /// Number of payload bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        self.width
    }

    /// Returns `true` for a full 32-bit word.
    #[must_use]
    pub const fn is_full_word(self) -> bool {
        self.width == WORD_BYTES
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:0digits$X}", self.value, digits = self.width * 2)
    }
}

/// Decodes the first payload word of a write from the outbound bytes.
#[must_use]
pub fn decode_write(layout: &VariantLayout, mosi: &[u8]) -> Option<DecodedValue> {
    let data = mosi.get(layout.header_len..)?;
    match layout.write_payload {
        WritePayload::Truncating => {
            DecodedValue::from_le_bytes(&data[..data.len().min(WORD_BYTES)])
        }
        WritePayload::FullWord => DecodedValue::from_le_bytes(data.get(..WORD_BYTES)?),
    }
}

/// Decodes the return value of a read from the inbound bytes.
#[must_use]
pub fn decode_read(layout: &VariantLayout, miso: &[u8]) -> Option<DecodedValue> {
    match layout.read_strategy {
        ReadStrategy::FixedOffset { skip } => {
            let data = miso.get(skip..)?;
            DecodedValue::from_le_bytes(&data[..data.len().min(WORD_BYTES)])
        }
        ReadStrategy::SyncByte { marker } => {
            let sync = miso.iter().position(|byte| *byte == marker)?;
            let data = &miso[sync + 1..];
            let len = [4, 2, 1].into_iter().find(|len| data.len() >= *len)?;
            DecodedValue::from_le_bytes(&data[..len])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_read, decode_write, DecodedValue};
    use crate::variant::{BT82X_LAYOUT, FT81X_LAYOUT};

    #[test]
    fn formatting_keeps_captured_width() {
        assert_eq!(DecodedValue::from_le_bytes(&[0x7C]).unwrap().to_string(), "0x7C");
        assert_eq!(
            DecodedValue::from_le_bytes(&[0x34, 0x12]).unwrap().to_string(),
            "0x1234"
        );
        assert_eq!(DecodedValue::word(0).to_string(), "0x00000000");
        assert!(DecodedValue::from_le_bytes(&[]).is_none());
        assert!(DecodedValue::from_le_bytes(&[0; 5]).is_none());
    }

    #[test]
    fn ft81x_write_truncates_to_available_bytes() {
        let value = decode_write(&FT81X_LAYOUT, &[0xB0, 0x20, 0x54, 0x01]).unwrap();
        assert_eq!(value.to_string(), "0x01");

        let value =
            decode_write(&FT81X_LAYOUT, &[0xB0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1D, 0xAA])
                .unwrap();
        assert_eq!(value, DecodedValue::word(0x1D00_0000));
    }

    #[test]
    fn bt82x_write_needs_a_full_word() {
        assert_eq!(
            decode_write(&BT82X_LAYOUT, &[0xFF, 0x00, 0x80, 0x00, 0x01, 0x02, 0x03]),
            None
        );
        assert_eq!(
            decode_write(
                &BT82X_LAYOUT,
                &[0xFF, 0x00, 0x80, 0x00, 0x78, 0x56, 0x34, 0x12, 0x99]
            ),
            Some(DecodedValue::word(0x1234_5678))
        );
    }

    #[test]
    fn ft81x_read_skips_header_and_dummy() {
        assert_eq!(decode_read(&FT81X_LAYOUT, &[0, 0, 0, 0]), None);
        assert_eq!(
            decode_read(&FT81X_LAYOUT, &[0, 0, 0, 0, 0x7C]).unwrap().to_string(),
            "0x7C"
        );
        assert_eq!(
            decode_read(&FT81X_LAYOUT, &[0, 0, 0, 0, 0x08, 0x03, 0x02, 0x01, 0xEE]),
            Some(DecodedValue::word(0x0102_0308))
        );
    }

    #[test]
    fn bt82x_read_follows_the_sync_byte() {
        assert_eq!(decode_read(&BT82X_LAYOUT, &[0, 0, 0, 0, 0, 0]), None);
        assert_eq!(decode_read(&BT82X_LAYOUT, &[0, 0, 0, 0, 0x01]), None);
        assert_eq!(
            decode_read(&BT82X_LAYOUT, &[0, 0, 0, 0, 0x01, 0x2E, 0x2E, 0x2E, 0x49]),
            Some(DecodedValue::word(0x492E_2E2E))
        );
        assert_eq!(
            decode_read(&BT82X_LAYOUT, &[0, 0, 0x01, 0x34, 0x12, 0x56])
                .unwrap()
                .to_string(),
            "0x1234"
        );
        assert_eq!(
            decode_read(&BT82X_LAYOUT, &[0x01, 0xAB]).unwrap().to_string(),
            "0xAB"
        );
    }
}
