//! Reassembler - receive-side fragment collection

use std::collections::{BTreeMap, HashMap};

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::packet::BlocksatPacket;

const DEFAULT_MAX_PENDING: usize = 64;

#[derive(Debug, Default)]
struct PartialMessage {
    frags: BTreeMap<u16, Bytes>,
    last_frag: Option<u16>,
}

impl PartialMessage {
    fn is_complete(&self) -> bool {
        match self.last_frag {
            Some(last) => self.frags.len() == usize::from(last) + 1,
            None => false,
        }
    }

    fn assemble(self) -> Bytes {
        let size = self.frags.values().map(Bytes::len).sum();
        let mut buf = BytesMut::with_capacity(size);
        for frag in self.frags.into_values() {
            buf.extend_from_slice(&frag);
        }
        buf.freeze()
    }
}

/// Collects fragments per sequence number until a message is complete
#[derive(Debug)]
pub struct Reassembler {
    channel: Option<u8>,
    pending: HashMap<u32, PartialMessage>,
    max_pending: usize,
}

impl Reassembler {
    /// Reassembler accepting any channel
    pub fn new() -> Self {
        Self {
            channel: None,
            pending: HashMap::new(),
            max_pending: DEFAULT_MAX_PENDING,
        }
    }

    /// Only accept packets of `channel`
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Limit the number of incomplete messages kept around
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending.max(1);
        self
    }

    /// Incomplete messages currently held
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Feed one packet
    ///
    /// Returns `(seq_num, message)` once every fragment of that message has
    /// been seen.
    pub fn push(&mut self, packet: BlocksatPacket) -> Option<(u32, Bytes)> {
        if self.channel.is_some_and(|ch| ch != packet.channel) {
            debug!(
                channel = packet.channel,
                seq_num = packet.seq_num,
                "packet from other channel ignored"
            );
            return None;
        }

        let seq_num = packet.seq_num;
        if !self.pending.contains_key(&seq_num) && self.pending.len() >= self.max_pending {
            self.evict_oldest();
        }

        let partial = self.pending.entry(seq_num).or_default();
        if !packet.more_frags {
            partial.last_frag = Some(packet.frag_num);
        }
        partial.frags.insert(packet.frag_num, packet.payload);

        if partial.is_complete() {
            let message = self.pending.remove(&seq_num)?.assemble();
            debug!(seq_num, bytes = message.len(), "message reassembled");
            return Some((seq_num, message));
        }
        None
    }

    fn evict_oldest(&mut self) {
        if let Some(&oldest) = self.pending.keys().min() {
            warn!(seq_num = oldest, "dropping incomplete message");
            self.pending.remove(&oldest);
        }
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PacketSplitter;
    use contracts::{Fragmenter, LinkPacket};

    #[test]
    fn test_reassemble_out_of_order() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let mut packets = PacketSplitter::with_max_payload(8)
            .split(data, 11, 1)
            .unwrap();
        packets.reverse();

        let mut reassembler = Reassembler::new();
        let mut result = None;
        for pkt in packets {
            let wire = BlocksatPacket::unpack(pkt.pack()).unwrap();
            if let Some(done) = reassembler.push(wire) {
                result = Some(done);
            }
        }

        let (seq_num, message) = result.expect("message should complete");
        assert_eq!(seq_num, 11);
        assert_eq!(&message[..], &data[..]);
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn test_interleaved_messages() {
        let splitter = PacketSplitter::with_max_payload(2);
        let a = splitter.split(b"aaaa", 1, 1).unwrap();
        let b = splitter.split(b"bbbb", 2, 1).unwrap();

        let mut reassembler = Reassembler::new();
        assert!(reassembler.push(a[0].clone()).is_none());
        assert!(reassembler.push(b[0].clone()).is_none());
        assert_eq!(reassembler.pending(), 2);
        assert_eq!(
            reassembler.push(b[1].clone()),
            Some((2, Bytes::from_static(b"bbbb")))
        );
        assert_eq!(
            reassembler.push(a[1].clone()),
            Some((1, Bytes::from_static(b"aaaa")))
        );
    }

    #[test]
    fn test_channel_filter() {
        let packets = PacketSplitter::new().split(b"x", 5, 4).unwrap();
        let mut reassembler = Reassembler::new().with_channel(1);
        assert!(reassembler.push(packets[0].clone()).is_none());
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn test_eviction_bounds_pending() {
        let splitter = PacketSplitter::with_max_payload(1);
        let mut reassembler = Reassembler::new().with_max_pending(2);
        for seq in 0..3 {
            let first = splitter.split(b"ab", seq, 1).unwrap().remove(0);
            reassembler.push(first);
        }
        assert_eq!(reassembler.pending(), 2);
    }
}
