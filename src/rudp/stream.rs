use std::cmp;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, trace};

use crate::udp::UdpChannel;
use crate::Error;

use super::segment::{Segment, HEADER_LEN};
use super::tcb::Tcb;
use super::{ACK_CRIT_LAG, ACK_TIMEOUT, MSS};

/// A reliable, ordered, bidirectional byte stream over a [`UdpChannel`].
///
/// One caller thread drives one stream: `send` and `recv` service the
/// wire inline, so the peer must be running one of them for this endpoint
/// to make progress.
#[derive(Debug)]
pub struct RudpStream {
    channel: UdpChannel,
    tcb: Tcb,
}

impl RudpStream {
    /// Binds `local` and fixes `peer` as the remote endpoint. There is no
    /// handshake: the peer has to exist before any data is written, since
    /// datagrams sent to an unbound port are simply lost.
    pub fn connect(local: SocketAddr, peer: SocketAddr) -> Result<Self, Error> {
        Ok(Self::from_channel(UdpChannel::bind(local, peer)?))
    }

    pub fn from_channel(channel: UdpChannel) -> Self {
        RudpStream {
            channel,
            tcb: Tcb::new(),
        }
    }

    /// Writes `data` to the peer. Returns the number of bytes from this
    /// call that were placed on the wire at least once, not necessarily
    /// acknowledged yet.
    ///
    /// The call keeps the pipe full while the window has room and
    /// otherwise collects acknowledgments, one bounded receive per
    /// iteration; the oldest unacknowledged segment is resent whenever it
    /// outlives [`ACK_TIMEOUT`]. It returns once everything is emitted
    /// and acknowledged, or after [`ACK_CRIT_LAG`] consecutive empty
    /// receive attempts.
    pub fn send(&mut self, data: &[u8]) -> Result<usize, Error> {
        let mut data = data;
        let mut written = 0;
        let mut lag = 0;

        while (!data.is_empty() || self.tcb.has_unacked()) && lag < ACK_CRIT_LAG {
            if !self.tcb.window_is_full() && !data.is_empty() {
                let len = cmp::min(MSS, data.len());
                let segment = Segment::new(self.tcb.sent, self.tcb.received, data[..len].to_vec());

                let accepted = self.send_segment(segment)?;
                data = &data[accepted..];
                written += accepted;
            } else if self.receive_segment(Some(ACK_TIMEOUT))? {
                lag = 0;
            } else {
                lag += 1;
            }

            self.retransmit_expired()?;
        }

        if self.tcb.has_unacked() {
            debug!(
                in_flight = self.tcb.in_flight(),
                "send returning with unacknowledged bytes"
            );
        }

        Ok(written)
    }

    /// Reads up to `n` bytes, serving the read buffer first and then
    /// blocking on the wire until `n` bytes are on hand or a receive
    /// attempt fails, in which case whatever was collected is returned.
    pub fn recv(&mut self, n: usize) -> Vec<u8> {
        let mut data = self.tcb.take(n);

        while data.len() < n {
            match self.receive_segment(None) {
                Ok(true) => data.extend(self.tcb.take(n - data.len())),
                Ok(false) | Err(_) => break,
            }
        }

        data
    }

    /// Hands the socket back to the operating system. No teardown traffic
    /// is exchanged and unacknowledged in-flight bytes are abandoned.
    pub fn close(self) {
        drop(self.channel);
    }

    /// Total payload bytes handed to the datagram layer at least once.
    pub fn sent_bytes(&self) -> u64 {
        self.tcb.sent
    }

    /// Highest cumulative acknowledgment received from the peer.
    pub fn confirmed_bytes(&self) -> u64 {
        self.tcb.confirmed
    }

    /// In-order bytes delivered to the read buffer so far, including
    /// bytes already handed out by `recv`.
    pub fn received_bytes(&self) -> u64 {
        self.tcb.received
    }

    pub fn in_flight(&self) -> u64 {
        self.tcb.in_flight()
    }

    /// Expired segments that have been resent over this stream's
    /// lifetime.
    pub fn retransmits(&self) -> u64 {
        self.tcb.retransmits
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        self.channel.local_addr()
    }

    /// Encodes and ships one segment. The datagram layer reports how many
    /// bytes it took including the header; only the payload portion is
    /// booked. First transmissions advance the stream offset, and any
    /// segment that still carries payload is parked for retransmission.
    fn send_segment(&mut self, segment: Segment) -> Result<usize, Error> {
        let total = self.channel.send(&segment.encode())?;
        let accepted = total.saturating_sub(HEADER_LEN);

        trace!(
            seq = segment.seq,
            ack = segment.ack,
            len = accepted,
            "segment written"
        );

        self.tcb.record_send(segment, accepted);

        Ok(accepted)
    }

    /// Attempts one receive, bounded by `timeout` (`None` blocks). Data
    /// segments are parked for reassembly and answered with a pure ack;
    /// every inbound segment folds its cumulative ack into the send
    /// window. `Ok(false)` means nothing usable arrived this tick.
    fn receive_segment(&mut self, timeout: Option<Duration>) -> Result<bool, Error> {
        let mut buf = [0u8; MSS + HEADER_LEN];

        let n = match self.channel.recv(&mut buf, timeout) {
            Ok(n) => n,
            Err(_) => return Ok(false),
        };

        let Ok(segment) = Segment::decode(&buf[..n]) else {
            return Ok(false);
        };

        trace!(
            seq = segment.seq,
            ack = segment.ack,
            len = segment.payload.len(),
            "segment received"
        );

        let ack = segment.ack;

        if !segment.payload.is_empty() {
            self.tcb.buffer_inbound(segment);

            let pure_ack = Segment::new(self.tcb.sent, self.tcb.received, Vec::new());
            self.send_segment(pure_ack)?;
        }

        self.tcb.confirm(ack);

        Ok(true)
    }

    /// Resends the oldest unacknowledged segment if it has expired. At
    /// most one segment per call; there is no backoff and no fast
    /// retransmit.
    fn retransmit_expired(&mut self) -> Result<(), Error> {
        if let Some(segment) = self.tcb.pop_expired() {
            debug!(
                seq = segment.seq,
                len = segment.payload.len(),
                "resending expired segment"
            );

            self.send_segment(segment)?;
        }

        Ok(())
    }
}

impl Read for RudpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.recv(buf.len());

        buf[..data.len()].copy_from_slice(&data);

        Ok(data.len())
    }
}

impl Write for RudpStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.send(buf)?)
    }

    /// Drives one self-bounded pass of the send loop with no new data,
    /// failing with `TimedOut` if in-flight bytes remain unacknowledged.
    fn flush(&mut self) -> io::Result<()> {
        self.send(&[])?;

        if self.tcb.has_unacked() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "in-flight bytes were not acknowledged",
            ));
        }

        Ok(())
    }
}
