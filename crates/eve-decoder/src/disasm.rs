//! Symbol resolution for decoded payloads.
//!
//! Writes into display-list RAM or the command buffer register are rendered
//! as instructions: a coprocessor command, a display-list opcode with its
//! 24-bit operand, or one of the two vertex encodings that only the top two
//! bits of the word identify. BT82x boot-status reads map to text.

use std::fmt;

use crate::classify::AddressLabel;
use crate::payload::DecodedValue;
use crate::variant::VariantLayout;

const DL_OPCODE_MASK: u32 = 0xFF00_0000;
const DL_OPERAND_MASK: u32 = 0x00FF_FFFF;
const VERTEX_OPERAND_MASK: u32 = 0x3FFF_FFFF;
const VERTEX_TAG_MASK: u8 = 0xC0;

/// Vertex instructions, identified by the top two bits of the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexForm {
    /// `01`: fixed-point vertex.
    Vertex2f,
    /// `10`: integer vertex with handle and cell.
    Vertex2ii,
}

impl VertexForm {
    /// Inspects the most significant byte of an instruction word.
    #[must_use]
    pub const fn from_top_byte(byte: u8) -> Option<Self> {
        match byte & VERTEX_TAG_MASK {
            0x40 => Some(Self::Vertex2f),
            0x80 => Some(Self::Vertex2ii),
            _ => None,
        }
    }

    /// Instruction name as shown in output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex2f => "DL_VERTEX2F",
            Self::Vertex2ii => "DL_VERTEX2II",
        }
    }
}

/// Rendered data of a write transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteData {
    /// No payload word could be decoded.
    Missing,
    /// Plain number.
    Raw(DecodedValue),
    /// Coprocessor command.
    Coprocessor(&'static str),
    /// Display-list opcode and its 24-bit operand.
    DisplayList {
        /// Opcode name.
        name: &'static str,
        /// Low 24 bits of the word.
        operand: u32,
    },
    /// Vertex instruction and its 30-bit operand.
    Vertex {
        /// Which vertex encoding.
        form: VertexForm,
        /// Low 30 bits of the word.
        operand: u32,
    },
}

impl fmt::Display for WriteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("WRITE_ERROR"),
            Self::Raw(value) => write!(f, "{value}"),
            Self::Coprocessor(name) => f.write_str(name),
            Self::DisplayList { name, operand } => write!(f, "{name} + 0x{operand:06X}"),
            Self::Vertex { form, operand } => write!(f, "'{}' + 0x{operand:08X}", form.name()),
        }
    }
}

/// Rendered data of a read transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadData {
    /// No return value could be located.
    Missing,
    /// Plain number.
    Raw(DecodedValue),
    /// BT82x boot progress text.
    BootStatus(&'static str),
}

impl fmt::Display for ReadData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("READ_ERROR"),
            Self::Raw(value) => write!(f, "{value}"),
            Self::BootStatus(text) => f.write_str(text),
        }
    }
}

/// Disassembles one 32-bit instruction word.
///
/// `top_byte` is the raw outbound byte holding the word's most significant
/// byte; the vertex check reads it rather than the word.
#[must_use]
pub fn disassemble(layout: &VariantLayout, word: u32, top_byte: Option<u8>) -> WriteData {
    if let Some(name) = layout.symbols.copro_commands.lookup(word) {
        return WriteData::Coprocessor(name);
    }

    let vertex = top_byte.and_then(VertexForm::from_top_byte);
    if let Some(form) = vertex {
        return WriteData::Vertex {
            form,
            operand: word & VERTEX_OPERAND_MASK,
        };
    }

    layout
        .symbols
        .dl_opcodes
        .lookup(word & DL_OPCODE_MASK)
        .map_or(WriteData::Raw(DecodedValue::word(word)), |name| {
            WriteData::DisplayList {
                name,
                operand: word & DL_OPERAND_MASK,
            }
        })
}

/// Resolves the data shown for a write.
///
/// Only full words written to an instruction target are disassembled; every
/// other payload is shown as a number.
#[must_use]
pub fn resolve_write(
    layout: &VariantLayout,
    label: AddressLabel,
    value: Option<DecodedValue>,
    mosi: &[u8],
) -> WriteData {
    let Some(value) = value else {
        return WriteData::Missing;
    };
    if !label.carries_instructions() || !value.is_full_word() {
        return WriteData::Raw(value);
    }
    disassemble(
        layout,
        value.value(),
        mosi.get(layout.vertex_probe_offset).copied(),
    )
}

/// Resolves the data shown for a read.
#[must_use]
pub fn resolve_read(
    layout: &VariantLayout,
    label: AddressLabel,
    value: Option<DecodedValue>,
) -> ReadData {
    let Some(value) = value else {
        return ReadData::Missing;
    };
    if label.is_boot_status() && value.is_full_word() {
        if let Some(text) = layout.symbols.boot_status.lookup(value.value()) {
            return ReadData::BootStatus(text);
        }
    }
    ReadData::Raw(value)
}
