//! # Link Packet
//!
//! Fixed-format link packets carrying API messages.
//!
//! Responsibilities:
//! - Split a message into sequence/channel tagged fragments
//! - Serialize and parse the 8-byte packet header
//! - Reassemble fragments back into messages on the receiving side
//!
//! ## Wire Format
//!
//! ```text
//! 0        1         2               4                               8
//! +--------+---------+---------------+-------------------------------+----------
//! | flags  | channel | fragment (BE) | sequence number (BE)          | payload
//! +--------+---------+---------------+-------------------------------+----------
//! flags bit 7: more fragments follow
//! ```

mod packet;
mod reassembler;
mod splitter;

pub use packet::{BlocksatPacket, HEADER_LEN, MAX_PACKET_LEN, MAX_PAYLOAD_LEN};
pub use reassembler::Reassembler;
pub use splitter::PacketSplitter;
