//! The transaction decode pipeline.
//!
//! A [`SpiDecoder`] is driven by the capture host through
//! [`HighLevelAnalyzer`]: window open, one call per byte pair, window close.
//! All decoding happens on close as a straight pipeline: classify, extract
//! payload, resolve symbols, emit one frame or nothing.

use log::{debug, trace};

use crate::accumulator::{ByteAccumulator, Timestamp, Transaction};
use crate::capture::CaptureEvent;
use crate::classify::{classify, host_command_label, AddressLabel, TransactionKind};
use crate::disasm::{resolve_read, resolve_write};
use crate::frame::{DecodedFrame, FrameType};
use crate::payload::{decode_read, decode_write};
use crate::variant::{ChipFamily, DecoderConfig, VariantLayout};

/// Callback surface a capture host drives, one transaction at a time.
pub trait HighLevelAnalyzer {
    /// Chip select asserted at `time`. Discards any partial window.
    fn window_open(&mut self, time: Timestamp);

    /// One byte clocked in each direction. A missing byte on either wire
    /// drops the cycle.
    fn byte_transferred(
        &mut self,
        start: Timestamp,
        end: Timestamp,
        mosi: Option<u8>,
        miso: Option<u8>,
    );

    /// Chip select released. Returns the annotation for the window, if any.
    fn window_close(&mut self) -> Option<DecodedFrame>;

    /// Dispatches one host event to the matching callback.
    fn decode(&mut self, event: &CaptureEvent) -> Option<DecodedFrame> {
        match *event {
            CaptureEvent::Enable { time } => {
                self.window_open(time);
                None
            }
            CaptureEvent::Result {
                start,
                end,
                mosi,
                miso,
            } => {
                self.byte_transferred(start, end, mosi, miso);
                None
            }
            CaptureEvent::Disable { .. } => self.window_close(),
        }
    }
}

/// Decoder for one EVE chip generation.
#[derive(Debug, Clone)]
pub struct SpiDecoder {
    layout: &'static VariantLayout,
    accumulator: ByteAccumulator,
}

impl Default for SpiDecoder {
    fn default() -> Self {
        Self::with_config(&DecoderConfig::default())
    }
}

impl SpiDecoder {
    /// Creates a decoder for `family`.
    #[must_use]
    pub fn new(family: ChipFamily) -> Self {
        Self::with_config(&DecoderConfig::new(family))
    }

    /// Creates a decoder from a configuration.
    #[must_use]
    pub fn with_config(config: &DecoderConfig) -> Self {
        Self {
            layout: config.layout(),
            accumulator: ByteAccumulator::new(),
        }
    }

    /// Chip generation being decoded.
    #[must_use]
    pub const fn family(&self) -> ChipFamily {
        self.layout.family
    }

    /// Feeds every event in order and collects the emitted frames.
    pub fn decode_all<'a, I>(&mut self, events: I) -> Vec<DecodedFrame>
    where
        I: IntoIterator<Item = &'a CaptureEvent>,
    {
        events
            .into_iter()
            .filter_map(|event| self.decode(event))
            .collect()
    }

    /// Decodes a completed window.
    #[must_use]
    pub fn decode_transaction(&self, transaction: &Transaction) -> Option<DecodedFrame> {
        if transaction.is_too_short() {
            debug!(
                "dropping {}-byte transaction: too short to classify",
                transaction.mosi.len()
            );
            return None;
        }
        let (start, end) = (transaction.start_time()?, transaction.end_time()?);
        let mosi = transaction.mosi_bytes();
        let layout = self.layout;

        let Some(kind) = classify(layout, &mosi) else {
            debug!("dropping unclassifiable transaction {mosi:02X?}");
            return None;
        };

        let frame = match kind {
            TransactionKind::HostCommand { opcode } => DecodedFrame::new(
                host_command_label(layout, opcode),
                start,
                end,
                FrameType::Command,
            ),
            TransactionKind::Active => DecodedFrame::new("ACTIVE", start, end, FrameType::Active),
            TransactionKind::Read { address } => {
                let label = AddressLabel::resolve(layout, address);
                let value = decode_read(layout, &transaction.miso_bytes());
                let data = resolve_read(layout, label, value);
                DecodedFrame::new(
                    format!("READ {label}"),
                    start,
                    end,
                    FrameType::Read { address },
                )
                .with_data(data.to_string())
            }
            TransactionKind::Write { address } => {
                let label = AddressLabel::resolve(layout, address);
                let value = decode_write(layout, &mosi);
                let data = resolve_write(layout, label, value, &mosi);
                DecodedFrame::new(
                    format!("WRITE {label}"),
                    start,
                    end,
                    FrameType::Write { address },
                )
                .with_data(data.to_string())
            }
        };

        trace!("{}", frame.render(layout.family));
        Some(frame)
    }
}

impl HighLevelAnalyzer for SpiDecoder {
    fn window_open(&mut self, time: Timestamp) {
        trace!("window open at {time}");
        self.accumulator.open(time);
    }

    fn byte_transferred(
        &mut self,
        start: Timestamp,
        end: Timestamp,
        mosi: Option<u8>,
        miso: Option<u8>,
    ) {
        if !self.accumulator.push(start, end, mosi, miso) {
            debug!("ignoring unpaired byte cycle at {start}");
        }
    }

    fn window_close(&mut self) -> Option<DecodedFrame> {
        let transaction = self.accumulator.close();
        trace!("window close with {} byte pairs", transaction.mosi.len());
        self.decode_transaction(&transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::{HighLevelAnalyzer, SpiDecoder};
    use crate::frame::FrameType;
    use crate::variant::ChipFamily;

    fn run(decoder: &mut SpiDecoder, mosi: &[u8], miso: &[u8]) -> Option<crate::DecodedFrame> {
        decoder.window_open(0);
        for (index, (out, inb)) in mosi.iter().zip(miso).enumerate() {
            let t = u64::try_from(index).expect("index fits") * 10;
            decoder.byte_transferred(t, t + 10, Some(*out), Some(*inb));
        }
        decoder.window_close()
    }

    #[test]
    fn host_command_frame() {
        let mut decoder = SpiDecoder::new(ChipFamily::Ft81x);
        let frame = run(&mut decoder, &[0x68, 0, 0], &[0, 0, 0]).expect("frame");
        assert_eq!(frame.label, "RST_PULSE");
        assert_eq!(frame.frame_type, FrameType::Command);
        assert_eq!(frame.data(), None);
        assert_eq!((frame.start_time, frame.end_time), (0, 30));
    }

    #[test]
    fn two_byte_window_emits_nothing() {
        let mut decoder = SpiDecoder::default();
        assert!(run(&mut decoder, &[0x68, 0], &[0, 0]).is_none());
    }

    #[test]
    fn bt82x_write_without_full_word_still_emits() {
        let mut decoder = SpiDecoder::new(ChipFamily::Bt82x);
        let frame = run(&mut decoder, &[0xFF, 0x00, 0x80, 0x00, 0x01], &[0; 5]).expect("frame");
        assert_eq!(frame.label, "WRITE RAM-DL+0x0000");
        assert_eq!(frame.data(), Some("WRITE_ERROR"));
    }

    #[test]
    fn state_does_not_leak_between_windows() {
        let mut decoder = SpiDecoder::new(ChipFamily::Ft81x);
        decoder.window_open(0);
        decoder.byte_transferred(0, 1, Some(0x80), Some(0));
        decoder.byte_transferred(1, 2, Some(0x00), Some(0));
        let frame = run(&mut decoder, &[0x44, 0, 0], &[0, 0, 0]).expect("frame");
        assert_eq!(frame.label, "CLKEXT");
    }
}
