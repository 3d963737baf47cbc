//! Protocol implementation module
//!
//! This module defines the time packet wire formats, their encoding/decoding,
//! the stream codec and the client-side sync state machine.

pub mod codec;
pub mod packet;
pub mod state;

pub use self::codec::PacketCodec;
pub use self::packet::{
    weekday_from_raw, DecodeError, FieldValidation, TimePacket, WireFormat, CURRENT_SIGNATURE,
    LEGACY_SIGNATURE,
};
pub use self::state::{SyncState, TimeSync};
