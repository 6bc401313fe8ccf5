//! Link packet contracts - fragmentation collaborator interface

use bytes::Bytes;

use crate::ContractError;

/// One fragment of a payload, ready for the wire
pub trait LinkPacket {
    /// Serialized length in bytes (header included)
    fn len(&self) -> usize;

    /// Whether the serialized form is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize to raw bytes
    fn pack(&self) -> Bytes;
}

/// Splits a payload into ordered link packets
pub trait Fragmenter {
    /// Packet type produced
    type Packet: LinkPacket + Send + Sync;

    /// Split `data` into packets tagged with `seq_num` and `channel`
    ///
    /// # Errors
    /// Returns an error if the payload cannot be represented in the format
    fn split(
        &self,
        data: &[u8],
        seq_num: u32,
        channel: u8,
    ) -> Result<Vec<Self::Packet>, ContractError>;
}
