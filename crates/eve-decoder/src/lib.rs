//! SPI transaction decoder for Bridgetek EVE graphics controllers.
//!
//! Turns chip-select-framed byte captures into annotated frames: host
//! commands, register and memory reads and writes, and display-list or
//! coprocessor instructions written to the command paths. FT81x/BT81x and
//! BT82x are supported through one pipeline parameterized by
//! [`VariantLayout`].

/// Per-window byte buffering.
pub mod accumulator;
pub use accumulator::{ByteAccumulator, ByteEvent, Timestamp, Transaction};

/// Static symbol tables per chip generation.
pub mod symbols;
pub use symbols::{SymbolSet, SymbolTable, BT82X_SYMBOLS, FT81X_SYMBOLS};

/// Chip generation selection and framing constants.
pub mod variant;
pub use variant::{
    ChipFamily, DecoderConfig, HostCommandFrame, ReadStrategy, UnknownChipFamily, VariantLayout,
    WritePayload, BT82X_LAYOUT, FT81X_LAYOUT,
};

/// Transaction classification and address labelling.
pub mod classify;
pub use classify::{
    classify, host_command_label, AddressLabel, TransactionKind, BOOT_STATUS_REGISTER,
    COMMAND_BUFFER_REGISTER,
};

/// Read and write payload extraction.
pub mod payload;
pub use payload::{decode_read, decode_write, DecodedValue, WORD_BYTES};

/// Payload symbol resolution and instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble, resolve_read, resolve_write, ReadData, VertexForm, WriteData};

/// Annotated output frames.
pub mod frame;
pub use frame::{DecodedFrame, FrameType, DATA_FIELD};

/// Capture-host events and listing parser.
pub mod capture;
pub use capture::{parse_capture, parse_line, CaptureError, CaptureErrorKind, CaptureEvent};

/// Host-driven decode pipeline.
pub mod decoder;
pub use decoder::{HighLevelAnalyzer, SpiDecoder};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
