//! Per-window byte buffering.
//!
//! The accumulator holds the outbound (MOSI) and inbound (MISO) bytes of the
//! chip-select window currently open. Nothing survives a window boundary.

/// Capture-host time, in ticks (sample index or nanoseconds).
pub type Timestamp = u64;

/// A single byte clocked on one wire, with the span it occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ByteEvent {
    /// Start of the byte's clock span.
    pub start: Timestamp,
    /// End of the byte's clock span.
    pub end: Timestamp,
    /// Byte value.
    pub value: u8,
}

/// A completed chip-select window.
///
/// `mosi` and `miso` always have the same length: bytes are only appended in
/// pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    /// Time the window opened, when a window-open was observed.
    pub opened_at: Option<Timestamp>,
    /// Host to chip bytes.
    pub mosi: Vec<ByteEvent>,
    /// Chip to host bytes.
    pub miso: Vec<ByteEvent>,
}

impl Transaction {
    /// Minimum outbound length for any recognized frame shape.
    pub const MIN_CLASSIFIABLE_LEN: usize = 3;

    /// Outbound byte values.
    #[must_use]
    pub fn mosi_bytes(&self) -> Vec<u8> {
        self.mosi.iter().map(|event| event.value).collect()
    }

    /// Inbound byte values.
    #[must_use]
    pub fn miso_bytes(&self) -> Vec<u8> {
        self.miso.iter().map(|event| event.value).collect()
    }

    /// Returns `true` when the window is too short to classify.
    #[must_use]
    pub fn is_too_short(&self) -> bool {
        self.mosi.len() < Self::MIN_CLASSIFIABLE_LEN
    }

    /// Frame start: the window-open time, else the first outbound byte's start.
    #[must_use]
    pub fn start_time(&self) -> Option<Timestamp> {
        self.opened_at
            .or_else(|| self.mosi.first().map(|event| event.start))
    }

    /// Frame end: the last outbound byte's end.
    #[must_use]
    pub fn end_time(&self) -> Option<Timestamp> {
        self.mosi.last().map(|event| event.end)
    }
}

/// Buffers the bytes of the window currently open.
#[derive(Debug, Clone, Default)]
pub struct ByteAccumulator {
    current: Transaction,
}

impl ByteAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards anything buffered and starts a window at `time`.
    pub fn open(&mut self, time: Timestamp) {
        self.current = Transaction {
            opened_at: Some(time),
            ..Transaction::default()
        };
    }

    /// Appends one byte pair.
    ///
    /// Returns `false`, buffering nothing, when either wire has no byte for
    /// this cycle.
    pub fn push(
        &mut self,
        start: Timestamp,
        end: Timestamp,
        mosi: Option<u8>,
        miso: Option<u8>,
    ) -> bool {
        let (Some(mosi), Some(miso)) = (mosi, miso) else {
            return false;
        };

        self.current.mosi.push(ByteEvent {
            start,
            end,
            value: mosi,
        });
        self.current.miso.push(ByteEvent {
            start,
            end,
            value: miso,
        });
        true
    }

    /// Ends the window, handing back its bytes and leaving the buffer empty.
    pub fn close(&mut self) -> Transaction {
        std::mem::take(&mut self.current)
    }

    /// Number of byte pairs buffered in the open window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.mosi.len()
    }

    /// Returns `true` when no byte pair is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.mosi.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteAccumulator, Transaction};

    #[test]
    fn open_resets_previous_partial_window() {
        let mut acc = ByteAccumulator::new();
        acc.open(10);
        assert!(acc.push(11, 12, Some(0xAA), Some(0x00)));
        acc.open(20);
        assert!(acc.is_empty());

        let txn = acc.close();
        assert_eq!(txn.opened_at, Some(20));
        assert!(txn.mosi.is_empty());
    }

    #[test]
    fn unpaired_cycle_is_ignored() {
        let mut acc = ByteAccumulator::new();
        acc.open(0);
        assert!(!acc.push(1, 2, Some(0x01), None));
        assert!(!acc.push(3, 4, None, Some(0x02)));
        assert!(acc.push(5, 6, Some(0x03), Some(0x04)));
        assert_eq!(acc.len(), 1);

        let txn = acc.close();
        assert_eq!(txn.mosi_bytes(), vec![0x03]);
        assert_eq!(txn.miso_bytes(), vec![0x04]);
        assert_eq!(txn.mosi.len(), txn.miso.len());
    }

    #[test]
    fn close_leaves_buffer_empty() {
        let mut acc = ByteAccumulator::new();
        acc.open(0);
        acc.push(1, 2, Some(0x68), Some(0x00));
        let first = acc.close();
        assert_eq!(first.mosi.len(), 1);

        let second = acc.close();
        assert_eq!(second, Transaction::default());
    }

    #[test]
    fn times_fall_back_to_byte_spans() {
        let mut acc = ByteAccumulator::new();
        acc.push(100, 110, Some(0x00), Some(0x00));
        acc.push(110, 120, Some(0x00), Some(0x00));
        let txn = acc.close();
        assert_eq!(txn.opened_at, None);
        assert_eq!(txn.start_time(), Some(100));
        assert_eq!(txn.end_time(), Some(120));
    }

    #[test]
    fn short_windows_are_flagged() {
        let mut acc = ByteAccumulator::new();
        acc.open(0);
        acc.push(1, 2, Some(0x68), Some(0x00));
        acc.push(2, 3, Some(0x00), Some(0x00));
        assert!(acc.close().is_too_short());
    }
}
