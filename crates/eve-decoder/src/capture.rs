//! Capture-host events and the textual capture listing format.
//!
//! A listing has one event per line, comma separated:
//!
//! ```text
//! # RST_PULSE
//! enable,1000
//! result,1010,1020,0x68,0x00
//! result,1020,1030,00,00
//! result,1030,1040,00,
//! disable,1050
//! ```
//!
//! An empty byte field means the host could not capture that wire for the
//! cycle. Blank lines and `#` comments are ignored.

use thiserror::Error;

use crate::accumulator::Timestamp;

/// One notification from the capture host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CaptureEvent {
    /// Chip select asserted.
    Enable {
        /// Assertion time.
        time: Timestamp,
    },
    /// One byte clocked in each direction.
    Result {
        /// Start of the byte.
        start: Timestamp,
        /// End of the byte.
        end: Timestamp,
        /// Host to chip byte, when captured.
        mosi: Option<u8>,
        /// Chip to host byte, when captured.
        miso: Option<u8>,
    },
    /// Chip select released.
    Disable {
        /// Release time.
        time: Timestamp,
    },
}

/// Why a listing line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureErrorKind {
    /// First field is not `enable`, `result` or `disable`.
    #[error("unknown event type `{0}`")]
    UnknownEvent(String),
    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// A timestamp is not an unsigned integer.
    #[error("invalid timestamp `{0}`")]
    InvalidTimestamp(String),
    /// A byte is not one or two hex digits.
    #[error("invalid byte `{0}`")]
    InvalidByte(String),
    /// More fields than the event takes.
    #[error("unexpected trailing field `{0}`")]
    TrailingField(String),
}

/// A listing parse failure with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct CaptureError {
    /// 1-based line number.
    pub line: usize,
    /// Failure detail.
    pub kind: CaptureErrorKind,
}

/// Parses a full capture listing.
///
/// # Errors
///
/// Returns the first malformed line as a [`CaptureError`].
pub fn parse_capture(text: &str) -> Result<Vec<CaptureEvent>, CaptureError> {
    let mut events = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let event = parse_line(line).map_err(|kind| CaptureError {
            line: index + 1,
            kind,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Parses a single non-empty listing line.
///
/// # Errors
///
/// Returns the reason the line is malformed.
pub fn parse_line(line: &str) -> Result<CaptureEvent, CaptureErrorKind> {
    let mut fields = line.split(',').map(str::trim);
    let kind = fields.next().unwrap_or_default();

    let event = match kind.to_ascii_lowercase().as_str() {
        "enable" => CaptureEvent::Enable {
            time: parse_timestamp(fields.next(), "time")?,
        },
        "disable" => CaptureEvent::Disable {
            time: parse_timestamp(fields.next(), "time")?,
        },
        "result" => CaptureEvent::Result {
            start: parse_timestamp(fields.next(), "start")?,
            end: parse_timestamp(fields.next(), "end")?,
            mosi: parse_byte(fields.next(), "mosi")?,
            miso: parse_byte(fields.next(), "miso")?,
        },
        _ => return Err(CaptureErrorKind::UnknownEvent(kind.to_string())),
    };

    if let Some(extra) = fields.find(|field| !field.is_empty()) {
        return Err(CaptureErrorKind::TrailingField(extra.to_string()));
    }
    Ok(event)
}

fn parse_timestamp(
    field: Option<&str>,
    name: &'static str,
) -> Result<Timestamp, CaptureErrorKind> {
    let field = field
        .filter(|field| !field.is_empty())
        .ok_or(CaptureErrorKind::MissingField(name))?;
    field
        .parse()
        .map_err(|_| CaptureErrorKind::InvalidTimestamp(field.to_string()))
}

fn parse_byte(field: Option<&str>, name: &'static str) -> Result<Option<u8>, CaptureErrorKind> {
    let field = field.ok_or(CaptureErrorKind::MissingField(name))?;
    if field.is_empty() {
        return Ok(None);
    }
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    if digits.is_empty() || digits.len() > 2 {
        return Err(CaptureErrorKind::InvalidByte(field.to_string()));
    }
    u8::from_str_radix(digits, 16)
        .map(Some)
        .map_err(|_| CaptureErrorKind::InvalidByte(field.to_string()))
}
