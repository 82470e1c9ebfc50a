//! UDP datagram transport. One datagram carries one frame.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use super::{decode_frame, Frame, FrameSource, Poll};
use crate::constants::UDP_RECV_BUFFER_SIZE;

pub struct UdpSource {
    socket: UdpSocket,
    local_addr: SocketAddr,
    buf: [u8; UDP_RECV_BUFFER_SIZE],
}

impl UdpSource {
    /// Bind the listening socket.
    pub fn bind(addr: &str, poll_interval: Duration) -> Result<Self> {
        let socket =
            UdpSocket::bind(addr).with_context(|| format!("Failed to bind UDP socket to {addr}"))?;
        socket
            .set_read_timeout(Some(poll_interval))
            .context("Failed to set UDP read timeout")?;
        let local_addr = socket.local_addr()?;
        Ok(Self {
            socket,
            local_addr,
            buf: [0; UDP_RECV_BUFFER_SIZE],
        })
    }

    /// Address the socket is actually bound to, useful when binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl FrameSource for UdpSource {
    fn poll_frame(&mut self) -> Result<Poll> {
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, peer)) => match decode_frame(&self.buf[..len]) {
                Some(text) => Ok(Poll::Frame(Frame {
                    text,
                    peer: Some(peer),
                })),
                None => {
                    debug!("Dropping undecodable {len} byte datagram from {peer}");
                    Ok(Poll::Undecodable)
                }
            },
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(Poll::Idle)
            }
            Err(e) => Err(e).context("Failed to receive UDP datagram"),
        }
    }

    fn describe(&self) -> String {
        format!("UDP {}", self.local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind_loopback() -> UdpSource {
        UdpSource::bind("127.0.0.1:0", Duration::from_millis(50)).expect("bind failed")
    }

    fn poll_until_ready(source: &mut UdpSource) -> Poll {
        for _ in 0..100 {
            match source.poll_frame().expect("poll failed") {
                Poll::Idle => continue,
                other => return other,
            }
        }
        panic!("no datagram arrived");
    }

    #[test]
    fn test_datagram_becomes_frame_with_peer() {
        let mut source = bind_loopback();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender
            .send_to(b"Angle: 45.0\n", source.local_addr())
            .unwrap();

        assert_eq!(
            poll_until_ready(&mut source),
            Poll::Frame(Frame {
                text: "Angle: 45.0".to_string(),
                peer: Some(sender.local_addr().unwrap()),
            })
        );
    }

    #[test]
    fn test_undecodable_datagram() {
        let mut source = bind_loopback();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(&[0xc3, 0x28], source.local_addr()).unwrap();
        assert_eq!(poll_until_ready(&mut source), Poll::Undecodable);
    }

    #[test]
    fn test_idle_without_traffic() {
        let mut source = bind_loopback();
        assert_eq!(source.poll_frame().unwrap(), Poll::Idle);
    }

    #[test]
    fn test_bind_conflict_is_fatal() {
        let source = bind_loopback();
        let addr = source.local_addr().to_string();
        let err = UdpSource::bind(&addr, Duration::from_millis(50))
            .err()
            .expect("second bind should fail");
        assert!(err.to_string().contains("Failed to bind UDP socket"));
    }

    #[test]
    fn test_describe() {
        let source = bind_loopback();
        assert_eq!(
            source.describe(),
            format!("UDP 127.0.0.1:{}", source.local_addr().port())
        );
    }
}
