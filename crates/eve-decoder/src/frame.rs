//! Annotated output frames handed back to the capture host.

use std::collections::BTreeMap;

use crate::accumulator::Timestamp;
use crate::variant::ChipFamily;

/// Key of the decoded payload in [`DecodedFrame::fields`].
pub const DATA_FIELD: &str = "data";

/// Result type of a frame, matching the host's declared result types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum FrameType {
    /// Host command.
    Command,
    /// BT82x heartbeat.
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

/// One annotated transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedFrame {
    /// Primary annotation text.
    pub label: String,
    /// Start of the transaction.
    pub start_time: Timestamp,
    /// End of the transaction.
    pub end_time: Timestamp,
    /// Result type.
    pub frame_type: FrameType,
    /// Auxiliary values, currently only [`DATA_FIELD`].
    pub fields: BTreeMap<String, String>,
}

impl DecodedFrame {
    /// A frame without auxiliary fields.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        start_time: Timestamp,
        end_time: Timestamp,
        frame_type: FrameType,
    ) -> Self {
        Self {
            label: label.into(),
            start_time,
            end_time,
            frame_type,
            fields: BTreeMap::new(),
        }
    }

    /// Attaches the rendered payload.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.fields.insert(DATA_FIELD.to_string(), data.into());
        self
    }

    /// The rendered payload, if any.
    #[must_use]
    pub fn data(&self) -> Option<&str> {
        self.fields.get(DATA_FIELD).map(String::as_str)
    }

    /// Renders the frame with the host display template for its type.
    ///
    /// Addresses are padded to the generation's address width: six digits
    /// for FT81x, eight for BT82x.
    #[must_use]
    pub fn render(&self, family: ChipFamily) -> String {
        let digits = family.layout().address_digits;
        let data = self.data().unwrap_or_default();
        match self.frame_type {
            FrameType::Command | FrameType::Active => self.label.clone(),
            FrameType::Read { address } => {
                format!("{} from 0x{address:0digits$X} = {data}", self.label)
            }
            FrameType::Write { address } => {
                format!("{} to 0x{address:0digits$X} = {data}", self.label)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodedFrame, FrameType};
    use crate::variant::ChipFamily;

    #[test]
    fn command_renders_label_only() {
        let frame = DecodedFrame::new("RST_PULSE", 0, 10, FrameType::Command);
        assert_eq!(frame.data(), None);
        assert_eq!(frame.render(ChipFamily::Ft81x), "RST_PULSE");
    }

    #[test]
    fn read_and_write_templates_pad_to_address_width() {
        let read = DecodedFrame::new(
            "READ REG_ID",
            0,
            10,
            FrameType::Read {
                address: 0x0030_2000,
            },
        )
        .with_data("0x7C");
        assert_eq!(
            read.render(ChipFamily::Ft81x),
            "READ REG_ID from 0x302000 = 0x7C"
        );

        let write = DecodedFrame::new(
            "WRITE RAM-DL+0x0000",
            0,
            10,
            FrameType::Write {
                address: 0x7F00_8000,
            },
        )
        .with_data("CMD_DLSTART");
        assert_eq!(
            write.render(ChipFamily::Bt82x),
            "WRITE RAM-DL+0x0000 to 0x7F008000 = CMD_DLSTART"
        );
    }
}
