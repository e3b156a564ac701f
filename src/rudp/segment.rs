use std::time::Instant;

use bytes::{Buf, BufMut};

use crate::Error;

use super::ACK_TIMEOUT;

/// Bytes of framing in front of every payload: `seq` then `ack`.
pub const HEADER_LEN: usize = 16;

/*
   Wire layout, exactly one segment per datagram:

    0               8               16
    +---------------+---------------+------------------+
    |      seq      |      ack      |     payload      |
    |   u64, big-   |   u64, big-   |  0..=MSS opaque  |
    |    endian     |    endian     |      bytes       |
    +---------------+---------------+------------------+

   `seq` is the stream offset of the first payload byte. `ack` is
   cumulative: every byte below it has been handed to the peer's
   application layer. A zero-length payload is a pure acknowledgment.
*/
#[derive(Debug, Clone)]
pub struct Segment {
    pub seq: u64,
    pub ack: u64,
    pub payload: Vec<u8>,
    /// Local send timestamp driving retransmission. Never serialized.
    sent_at: Instant,
}

impl Segment {
    pub fn new(seq: u64, ack: u64, payload: Vec<u8>) -> Self {
        Segment {
            seq,
            ack,
            payload,
            sent_at: Instant::now(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());

        buf.put_u64(self.seq);
        buf.put_u64(self.ack);
        buf.put_slice(&self.payload);

        buf
    }

    pub fn decode(mut buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < HEADER_LEN {
            return Err(Error::Truncated(buf.len()));
        }

        let seq = buf.get_u64();
        let ack = buf.get_u64();

        Ok(Segment::new(seq, ack, buf.to_vec()))
    }

    /// Whether this segment has waited on an acknowledgment for longer
    /// than the retransmission timer allows.
    pub(crate) fn expired(&self) -> bool {
        self.sent_at.elapsed() > ACK_TIMEOUT
    }

    pub(crate) fn restamp(&mut self) {
        self.sent_at = Instant::now();
    }

    #[cfg(test)]
    pub(crate) fn backdate(&mut self, by: std::time::Duration) {
        self.sent_at -= by;
    }
}
