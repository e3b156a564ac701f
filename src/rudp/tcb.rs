use std::cmp;
use std::collections::{BTreeMap, VecDeque};

use super::segment::Segment;
use super::WINDOW_SIZE;

/*
            sent and acknowledged | in flight | not yet sent
      ----------------------------|-----------|--------------
                            confirmed        sent

   Counters only grow. `confirmed <= sent` always holds, and every byte
   below `received` has already been appended to `incoming`.
*/
#[derive(Debug, Default)]
pub(crate) struct Tcb {
    /// Payload bytes handed to the datagram layer at least once.
    pub(crate) sent: u64,
    /// Highest cumulative acknowledgment seen from the peer.
    pub(crate) confirmed: u64,
    /// In-order payload bytes moved into the read buffer so far.
    pub(crate) received: u64,
    /// Sent segments still waiting on acknowledgment, keyed by `seq`.
    pub(crate) send_window: BTreeMap<u64, Segment>,
    /// Inbound segments beyond `received`, keyed by `seq`.
    pub(crate) recv_window: BTreeMap<u64, Segment>,
    /// In-order bytes not yet handed to the application.
    pub(crate) incoming: VecDeque<u8>,
    /// Expired segments that have been resent.
    pub(crate) retransmits: u64,
}

impl Tcb {
    pub(crate) fn new() -> Self {
        Tcb::default()
    }

    pub(crate) fn in_flight(&self) -> u64 {
        self.sent - self.confirmed
    }

    /// Equality still counts as room: the window check deliberately lets
    /// one more segment out once in-flight bytes reach `WINDOW_SIZE`.
    pub(crate) fn window_is_full(&self) -> bool {
        self.in_flight() > WINDOW_SIZE
    }

    pub(crate) fn has_unacked(&self) -> bool {
        self.confirmed < self.sent
    }

    /// Books a segment the datagram layer accepted `accepted` payload
    /// bytes of. First transmissions advance `sent`; anything that still
    /// carries payload is (re)stamped and parked until acknowledged, so
    /// pure acks never enter the send window.
    pub(crate) fn record_send(&mut self, mut segment: Segment, accepted: usize) {
        if segment.seq == self.sent {
            self.sent += accepted as u64;
        }

        if accepted > 0 {
            segment.payload.truncate(accepted);
            segment.restamp();
            self.send_window.insert(segment.seq, segment);
        }
    }

    /// Parks an inbound data segment and drains whatever became
    /// contiguous.
    pub(crate) fn buffer_inbound(&mut self, segment: Segment) {
        self.recv_window.insert(segment.seq, segment);
        self.reassemble();
    }

    fn reassemble(&mut self) {
        while let Some(entry) = self.recv_window.first_entry() {
            let seq = *entry.key();

            if seq == self.received {
                let segment = entry.remove();

                self.received += segment.payload.len() as u64;
                self.incoming.extend(segment.payload);
            } else if seq > self.received {
                // Gapped; wait for the missing segment.
                break;
            } else {
                // Stale duplicate of data already delivered.
                entry.remove();
            }
        }
    }

    /// Folds a cumulative acknowledgment in and eagerly prunes the send
    /// window. The counter is clamped monotone, and a peer cannot confirm
    /// bytes that were never sent.
    pub(crate) fn confirm(&mut self, ack: u64) {
        self.confirmed = cmp::max(self.confirmed, cmp::min(ack, self.sent));
        self.send_window = self.send_window.split_off(&self.confirmed);
    }

    /// Pops the oldest unacknowledged segment if its retransmission timer
    /// has run out.
    pub(crate) fn pop_expired(&mut self) -> Option<Segment> {
        let entry = self.send_window.first_entry()?;

        if entry.get().expired() {
            self.retransmits += 1;
            Some(entry.remove())
        } else {
            None
        }
    }

    /// Hands out up to `n` in-order bytes from the read buffer.
    pub(crate) fn take(&mut self, n: usize) -> Vec<u8> {
        let n = cmp::min(n, self.incoming.len());

        self.incoming.drain(..n).collect()
    }
}
