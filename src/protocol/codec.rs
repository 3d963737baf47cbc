use bytes::{Buf, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use super::packet::{FieldValidation, TimePacket, WireFormat};

/// Codec framing fixed-size time packets on a byte stream
///
/// Used where the radio payloads arrive through a serial bridge rather than
/// one packet at a time. Bytes that do not start a valid frame are skipped
/// until the next signature.
#[derive(Clone, Debug, Default)]
pub struct PacketCodec {
    format: WireFormat,
    validation: FieldValidation,
}

impl PacketCodec {
    /// Creates a new packet codec
    pub fn new(format: WireFormat, validation: FieldValidation) -> Self {
        PacketCodec { format, validation }
    }

    /// Wire format framed by this codec
    pub fn format(&self) -> WireFormat {
        self.format
    }
}

impl Decoder for PacketCodec {
    type Item = TimePacket;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame_len = self.format.payload_len();
        let signature = self.format.signature();

        loop {
            if src.len() < frame_len {
                // Need more data to read a full frame
                return Ok(None);
            }

            if src.starts_with(signature) {
                let frame = src.split_to(frame_len);
                match TimePacket::decode_with(self.format, &frame, self.validation) {
                    Ok(packet) => return Ok(Some(packet)),
                    Err(e) => {
                        debug!(error = %e, "dropping time frame");
                        continue;
                    }
                }
            }

            let skip = src[1..]
                .iter()
                .position(|&b| b == signature[0])
                .map_or(src.len(), |pos| pos + 1);
            debug!(skipped = skip, "resynchronizing on signature");
            src.advance(skip);
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(packet) => Ok(Some(packet)),
            None => {
                if !src.is_empty() {
                    debug!(remaining = src.len(), "discarding partial frame at end of stream");
                    src.clear();
                }
                Ok(None)
            }
        }
    }
}

impl Encoder<TimePacket> for PacketCodec {
    type Error = io::Error;

    fn encode(&mut self, item: TimePacket, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(self.format.payload_len());
        item.encode_into(self.format, dst);
        Ok(())
    }
}
