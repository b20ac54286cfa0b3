//! Teddy Message Codec
//!
//! This crate encodes and decodes the short binary messages exchanged between
//! a teddy sensor device and its host application. Datagrams are complete
//! in-memory buffers; framing, retransmission and addressing belong to the
//! transport, not to this crate.
//!
//! # Protocol Overview
//!
//! Every message starts with a one-byte identifier. Messages are either:
//!
//! - **Downlink requests** (host → device): `*_REQ_DL_MSG` identifiers
//! - **Uplink confirmations and indications** (device → host):
//!   `*_CNF_UL_MSG` / `*_IND_UL_MSG` identifiers
//!
//! All multi-byte fields are big-endian. Uplink input is untrusted: every
//! read is bounds-checked and malformed input is reported as a
//! [`CodecError`], never a panic.
//!
//! # Example
//!
//! ```rust,ignore
//! use teddy_codec::{Cursor, DeviceCodec, MessageCodec, UplinkMessage};
//!
//! let codec = MessageCodec::new();
//!
//! // Build a request
//! let mut buf = vec![0u8; codec.max_datagram_size() as usize];
//! let len = codec.encode_reporting_interval_set(30, &mut buf)?;
//! transport.send(&buf[..len]);
//!
//! // Parse what came back
//! let datagram = transport.recv();
//! match codec.decode_message(&mut Cursor::new(&datagram))? {
//!     UplinkMessage::ReportingIntervalSetCnf(cnf) => { /* ... */ }
//!     other => log::debug!("unexpected {:?}", other),
//! }
//! ```

mod codec;
mod constants;
mod cursor;
mod downlink;
mod error;
mod registry;
mod sensors;
mod sizing;
mod trace;
mod types;
mod uplink;

pub use codec::*;
pub use constants::*;
pub use cursor::*;
pub use downlink::*;
pub use error::*;
pub use registry::*;
pub use sensors::*;
pub use sizing::*;
pub use trace::*;
pub use types::*;
pub use uplink::*;
