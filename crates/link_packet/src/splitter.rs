//! PacketSplitter - message fragmentation

use bytes::Bytes;
use contracts::{ContractError, Fragmenter};
use tracing::trace;

use crate::packet::{BlocksatPacket, MAX_PAYLOAD_LEN};

/// Splits API messages into [`BlocksatPacket`]s
#[derive(Debug, Clone, Copy)]
pub struct PacketSplitter {
    max_payload: usize,
}

impl PacketSplitter {
    /// Splitter producing full-size packets
    pub fn new() -> Self {
        Self {
            max_payload: MAX_PAYLOAD_LEN,
        }
    }

    /// Splitter with a smaller payload limit (clamped to `1..=MAX_PAYLOAD_LEN`)
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            max_payload: max_payload.clamp(1, MAX_PAYLOAD_LEN),
        }
    }

    /// Payload bytes carried per packet
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }
}

impl Default for PacketSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fragmenter for PacketSplitter {
    type Packet = BlocksatPacket;

    fn split(
        &self,
        data: &[u8],
        seq_num: u32,
        channel: u8,
    ) -> Result<Vec<BlocksatPacket>, ContractError> {
        let n_frags = data.len().div_ceil(self.max_payload);
        if n_frags > usize::from(u16::MAX) + 1 {
            return Err(ContractError::fragmentation(
                seq_num,
                format!(
                    "{} bytes need {} fragments, at most {} allowed",
                    data.len(),
                    n_frags,
                    usize::from(u16::MAX) + 1
                ),
            ));
        }

        let payload = Bytes::copy_from_slice(data);
        let packets: Vec<_> = (0..n_frags)
            .map(|i| {
                let start = i * self.max_payload;
                let end = (start + self.max_payload).min(payload.len());
                BlocksatPacket {
                    seq_num,
                    // bounded by the fragment-count check above
                    frag_num: i as u16,
                    more_frags: i + 1 < n_frags,
                    channel,
                    payload: payload.slice(start..end),
                }
            })
            .collect();

        trace!(seq_num, channel, fragments = packets.len(), "message split");
        Ok(packets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::LinkPacket;

    #[test]
    fn test_split_tags_every_fragment() {
        let splitter = PacketSplitter::with_max_payload(4);
        let packets = splitter.split(b"0123456789", 42, 3).unwrap();

        assert_eq!(packets.len(), 3);
        assert!(packets.iter().all(|p| p.seq_num == 42 && p.channel == 3));
        assert_eq!(
            packets.iter().map(|p| p.frag_num).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(
            packets.iter().map(|p| p.more_frags).collect::<Vec<_>>(),
            vec![true, true, false]
        );
        assert_eq!(&packets[2].payload[..], b"89");
        assert_eq!(packets[2].len(), 8 + 2);
    }

    #[test]
    fn test_split_exact_multiple() {
        let splitter = PacketSplitter::new();
        let data = vec![0xAB; MAX_PAYLOAD_LEN * 2];
        let packets = splitter.split(&data, 1, 1).unwrap();
        assert_eq!(packets.len(), 2);
        assert!(!packets[1].more_frags);
        assert_eq!(packets[1].payload.len(), MAX_PAYLOAD_LEN);
    }

    #[test]
    fn test_split_empty_payload_yields_nothing() {
        let packets = PacketSplitter::new().split(&[], 1, 1).unwrap();
        assert!(packets.is_empty());
    }

    #[test]
    fn test_split_rejects_too_many_fragments() {
        let splitter = PacketSplitter::with_max_payload(1);
        let data = vec![0u8; usize::from(u16::MAX) + 2];
        assert!(matches!(
            splitter.split(&data, 9, 1),
            Err(ContractError::Fragmentation { seq_num: 9, .. })
        ));
    }
}
