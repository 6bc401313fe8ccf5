//! BlocksatPacket - header layout and (de)serialization

use bytes::{Buf, BufMut, Bytes, BytesMut};
use contracts::{ContractError, LinkPacket};

/// Header length in bytes
pub const HEADER_LEN: usize = 8;

/// Largest packet that fits one UDP datagram on a 1500-byte MTU
pub const MAX_PACKET_LEN: usize = 1472;

/// Largest payload carried by one packet
pub const MAX_PAYLOAD_LEN: usize = MAX_PACKET_LEN - HEADER_LEN;

const MORE_FRAGS_FLAG: u8 = 0x80;

/// One fragment of an API message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocksatPacket {
    /// Transmission sequence number of the message
    pub seq_num: u32,
    /// Fragment index within the message
    pub frag_num: u16,
    /// Whether more fragments follow this one
    pub more_frags: bool,
    /// API channel
    pub channel: u8,
    /// Fragment payload
    pub payload: Bytes,
}

impl BlocksatPacket {
    /// Parse a packet from raw datagram bytes
    ///
    /// # Errors
    /// Returns `PacketParse` if the datagram is shorter than the header or
    /// longer than a packet may be.
    pub fn unpack(mut data: Bytes) -> Result<Self, ContractError> {
        if data.len() < HEADER_LEN {
            return Err(ContractError::PacketParse {
                message: format!("datagram of {} bytes shorter than header", data.len()),
            });
        }
        if data.len() > MAX_PACKET_LEN {
            return Err(ContractError::PacketParse {
                message: format!(
                    "datagram of {} bytes exceeds max packet length {}",
                    data.len(),
                    MAX_PACKET_LEN
                ),
            });
        }

        let flags = data.get_u8();
        let channel = data.get_u8();
        let frag_num = data.get_u16();
        let seq_num = data.get_u32();

        Ok(Self {
            seq_num,
            frag_num,
            more_frags: flags & MORE_FRAGS_FLAG != 0,
            channel,
            payload: data,
        })
    }
}

impl LinkPacket for BlocksatPacket {
    fn len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());
        buf.put_u8(if self.more_frags { MORE_FRAGS_FLAG } else { 0 });
        buf.put_u8(self.channel);
        buf.put_u16(self.frag_num);
        buf.put_u32(self.seq_num);
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let pkt = BlocksatPacket {
            seq_num: 0x0102_0304,
            frag_num: 0x0506,
            more_frags: true,
            channel: 7,
            payload: Bytes::from_static(b"hi"),
        };
        let raw = pkt.pack();
        assert_eq!(raw.len(), pkt.len());
        assert_eq!(&raw[..HEADER_LEN], &[0x80, 7, 0x05, 0x06, 0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&raw[HEADER_LEN..], b"hi");

        let parsed = BlocksatPacket::unpack(raw).unwrap();
        assert_eq!(parsed, pkt);
    }

    #[test]
    fn test_unpack_rejects_short_datagram() {
        let result = BlocksatPacket::unpack(Bytes::from_static(&[0, 1, 2]));
        assert!(matches!(result, Err(ContractError::PacketParse { .. })));
    }

    #[test]
    fn test_unpack_rejects_oversized_datagram() {
        let result = BlocksatPacket::unpack(Bytes::from(vec![0u8; MAX_PACKET_LEN + 1]));
        assert!(result.is_err());
    }
}
