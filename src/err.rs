use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("socket error: {0}")]
    Socket(#[from] io::Error),

    #[error("poll error: {0}")]
    Poll(#[from] nix::Error),

    #[error("no datagram arrived within the receive timeout")]
    RecvTimeout,

    #[error("datagram of {0} bytes is shorter than a segment header")]
    Truncated(usize),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Socket(inner) => inner,
            Error::RecvTimeout => io::Error::new(io::ErrorKind::TimedOut, Error::RecvTimeout),
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}
