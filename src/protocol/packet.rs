use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{CalendarFields, Timestamp};

/// Leading bytes of a current-format packet
pub const CURRENT_SIGNATURE: [u8; 5] = [0xFE, b'T', b'I', b'M', b'E'];

/// Leading bytes of a legacy-format packet
pub const LEGACY_SIGNATURE: [u8; 3] = *b"tim";

/// Reasons a received payload is not turned into a time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Leading bytes do not match the configured format, or the payload is too short
    #[error("invalid signature")]
    InvalidSignature,

    /// A field is outside its calendar range (strict validation only)
    #[error("{field} out of range: {value}")]
    OutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// Value as received
        value: i64,
    },
}

impl DecodeError {
    /// Creates a new out-of-range error
    pub fn out_of_range(field: &'static str, value: impl Into<i64>) -> Self {
        DecodeError::OutOfRange {
            field,
            value: value.into(),
        }
    }
}

/// Layout of the time payload
///
/// The two layouts are not wire compatible; a node listens for exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireFormat {
    /// `0xFE "TIME"`, little-endian year, six calendar bytes, weekday; 32-byte payload
    #[default]
    Current,
    /// `"tim"`, big-endian year, five calendar bytes; 10-byte payload
    Legacy,
}

impl WireFormat {
    /// Signature bytes every packet of this format starts with
    pub fn signature(&self) -> &'static [u8] {
        match self {
            WireFormat::Current => &CURRENT_SIGNATURE,
            WireFormat::Legacy => &LEGACY_SIGNATURE,
        }
    }

    /// Payload size the transmitter sends
    pub fn payload_len(&self) -> usize {
        match self {
            WireFormat::Current => 32,
            WireFormat::Legacy => 10,
        }
    }

    /// Number of leading bytes that carry meaning
    pub fn min_len(&self) -> usize {
        match self {
            WireFormat::Current => 13,
            WireFormat::Legacy => 10,
        }
    }
}

/// How decoded calendar fields are checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValidation {
    /// Accept any byte values and let the calendar conversion carry overflow
    #[default]
    Permissive,
    /// Reject fields outside their calendar range
    Strict,
}

/// Maps the raw weekday byte onto 1..=7
pub fn weekday_from_raw(raw: u8) -> u8 {
    raw % 7 + 1
}

/// A decoded time packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePacket {
    /// Date and time fields
    pub fields: CalendarFields,
    /// Weekday 1..=7 (current format only), never checked against the date
    pub weekday: Option<u8>,
}

impl TimePacket {
    /// Creates a packet without weekday
    pub fn new(fields: CalendarFields) -> Self {
        TimePacket {
            fields,
            weekday: None,
        }
    }

    /// Creates a packet for the given instant, weekday counted from Sunday = 1
    pub fn from_datetime(datetime: &DateTime<Utc>) -> Self {
        TimePacket {
            fields: CalendarFields::from_datetime(datetime),
            weekday: Some(datetime.weekday().number_from_sunday() as u8),
        }
    }

    /// Decodes a payload, accepting any field values
    pub fn decode(format: WireFormat, buf: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with(format, buf, FieldValidation::Permissive)
    }

    /// Decodes a payload with the given field validation
    pub fn decode_with(
        format: WireFormat,
        buf: &[u8],
        validation: FieldValidation,
    ) -> Result<Self, DecodeError> {
        let signature = format.signature();
        if buf.len() < format.min_len() || !buf.starts_with(signature) {
            return Err(DecodeError::InvalidSignature);
        }

        let mut body = &buf[signature.len()..];
        let year = match format {
            WireFormat::Current => body.get_u16_le(),
            WireFormat::Legacy => body.get_u16(),
        };
        let fields = CalendarFields {
            year,
            month: body.get_u8(),
            day: body.get_u8(),
            hour: body.get_u8(),
            minute: body.get_u8(),
            second: body.get_u8(),
        };
        let weekday = match format {
            WireFormat::Current => Some(weekday_from_raw(body.get_u8())),
            WireFormat::Legacy => None,
        };

        if validation == FieldValidation::Strict {
            fields.validate()?;
        }

        Ok(TimePacket { fields, weekday })
    }

    /// Seconds since the epoch for the carried fields
    pub fn timestamp(&self) -> Result<Timestamp, DecodeError> {
        self.fields.to_timestamp()
    }

    /// Encodes the packet, zero-padded to the format's payload size
    pub fn encode(&self, format: WireFormat) -> Bytes {
        let mut dst = BytesMut::with_capacity(format.payload_len());
        self.encode_into(format, &mut dst);
        dst.freeze()
    }

    /// Appends the encoded packet to `dst`
    ///
    /// A missing weekday is sent as raw 0, which a receiver reads as 1.
    pub fn encode_into(&self, format: WireFormat, dst: &mut BytesMut) {
        let start = dst.len();
        dst.put_slice(format.signature());
        match format {
            WireFormat::Current => dst.put_u16_le(self.fields.year),
            WireFormat::Legacy => dst.put_u16(self.fields.year),
        }
        dst.put_u8(self.fields.month);
        dst.put_u8(self.fields.day);
        dst.put_u8(self.fields.hour);
        dst.put_u8(self.fields.minute);
        dst.put_u8(self.fields.second);
        if format == WireFormat::Current {
            let raw = self.weekday.map_or(0, |w| w.wrapping_sub(1));
            dst.put_u8(raw);
        }

        let written = dst.len() - start;
        dst.put_bytes(0, format.payload_len() - written);
    }
}
