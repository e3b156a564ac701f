mod err;
pub use err::*;

mod udp;
pub use udp::UdpChannel;

mod rudp;
pub use rudp::{RudpStream, Segment, ACK_CRIT_LAG, ACK_TIMEOUT, HEADER_LEN, MSS, WINDOW_SIZE};
