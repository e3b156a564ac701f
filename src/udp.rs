use std::net::{SocketAddr, UdpSocket};
use std::os::fd::AsRawFd;
use std::time::Duration;

use nix::poll::{poll, PollFd, PollFlags};

use crate::Error;

/// A datagram channel pinned to a single peer. Everything above it speaks
/// whole datagrams; reliability and ordering live in [`crate::RudpStream`].
#[derive(Debug)]
pub struct UdpChannel {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpChannel {
    pub fn bind(local: SocketAddr, peer: SocketAddr) -> Result<Self, Error> {
        Self::from_socket(UdpSocket::bind(local)?, peer)
    }

    /// Adopts an already-bound socket and fixes its peer.
    pub fn from_socket(socket: UdpSocket, peer: SocketAddr) -> Result<Self, Error> {
        socket.connect(peer)?;

        Ok(UdpChannel { socket, peer })
    }

    /// Ships one datagram to the peer. This path never suspends.
    pub fn send(&self, datagram: &[u8]) -> Result<usize, Error> {
        Ok(self.socket.send(datagram)?)
    }

    /// Pulls one datagram of up to `buf.len()` bytes. `None` blocks until
    /// something arrives; `Some(t)` waits at most `t` and reports
    /// [`Error::RecvTimeout`] if the socket never became readable.
    pub fn recv(&self, buf: &mut [u8], timeout: Option<Duration>) -> Result<usize, Error> {
        if let Some(timeout) = timeout {
            let millis = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);

            let mut pfd = [PollFd::new(self.socket.as_raw_fd(), PollFlags::POLLIN)];
            if poll(&mut pfd[..], millis)? == 0 {
                return Err(Error::RecvTimeout);
            }
        }

        Ok(self.socket.recv(buf)?)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.socket.local_addr()?)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}
