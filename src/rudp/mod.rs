//! A reliable, ordered byte stream over unreliable datagrams.
//!
//! One datagram carries one [`Segment`]: a 16-byte header (cumulative
//! sequence and acknowledgment counters) followed by up to [`MSS`] payload
//! bytes. The sender keeps a sliding window of unacknowledged segments and
//! resends the oldest one whenever it outlives [`ACK_TIMEOUT`]; the
//! receiver reorders gapped segments and acknowledges cumulatively. There
//! is no handshake, no teardown and no congestion control: both endpoints
//! must exist before either one writes, and must agree on [`MSS`].

use std::time::Duration;

mod segment;
mod stream;
mod tcb;

pub use segment::{Segment, HEADER_LEN};
pub use stream::RudpStream;

// TODO: make these per-stream tunables instead of crate constants.

/// Largest payload carried by a single datagram.
pub const MSS: usize = 1500;

/// Payload bytes allowed in flight before the sender stalls for acks.
pub const WINDOW_SIZE: u64 = 12 * MSS as u64;

/// How long an unacknowledged segment may wait before it is resent. Also
/// the bounded wait used for each receive attempt inside `send`.
pub const ACK_TIMEOUT: Duration = Duration::from_millis(10);

/// Consecutive empty receive attempts tolerated before `send` returns
/// with data still unacknowledged.
pub const ACK_CRIT_LAG: u32 = 20;
