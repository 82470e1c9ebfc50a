//! Newline-delimited frames over any buffered reader.
//!
//! Used directly for replaying captured transcripts and wrapped by
//! [`super::SerialSource`] for live ports.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use tracing::debug;

use super::{decode_frame, Frame, FrameSource, Poll};

pub struct LineSource<R> {
    reader: R,
    name: String,
    // Bytes of a line whose newline has not arrived yet. Kept across polls
    // because a read timeout can split a line.
    partial: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            partial: Vec::new(),
        }
    }

    fn take_frame(&mut self) -> Poll {
        let bytes = std::mem::take(&mut self.partial);
        match decode_frame(&bytes) {
            Some(text) => Poll::Frame(Frame { text, peer: None }),
            None => {
                debug!("Dropping {} undecodable bytes from {}", bytes.len(), self.name);
                Poll::Undecodable
            }
        }
    }
}

impl<R: BufRead> FrameSource for LineSource<R> {
    fn poll_frame(&mut self) -> Result<Poll> {
        match self.reader.read_until(b'\n', &mut self.partial) {
            Ok(0) if self.partial.is_empty() => Ok(Poll::Closed),
            // Either a full line, or the last unterminated line before EOF.
            Ok(_) => Ok(self.take_frame()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(Poll::Idle)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read from {}", self.name)),
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    fn poll_all<S: FrameSource>(source: &mut S) -> Vec<Poll> {
        let mut polls = Vec::new();
        loop {
            let poll = source.poll_frame().expect("poll failed");
            if poll == Poll::Closed {
                break;
            }
            polls.push(poll);
        }
        polls
    }

    fn frame(text: &str) -> Poll {
        Poll::Frame(Frame {
            text: text.to_string(),
            peer: None,
        })
    }

    #[test]
    fn test_reads_lines_until_eof() {
        let mut source = LineSource::new(Cursor::new("Angle: 1.0\r\nnoise\nAngle: 2.0"), "test");
        assert_eq!(
            poll_all(&mut source),
            vec![frame("Angle: 1.0"), frame("noise"), frame("Angle: 2.0")]
        );
        assert_eq!(source.poll_frame().unwrap(), Poll::Closed);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let input: &[u8] = b"Angle: 1.0\n\xff\xfe\nAngle: 2.0\n";
        let mut source = LineSource::new(Cursor::new(input), "test");
        assert_eq!(
            poll_all(&mut source),
            vec![frame("Angle: 1.0"), Poll::Undecodable, frame("Angle: 2.0")]
        );
    }

    /// Reader that returns a timeout between each chunk, like a serial port
    /// with a short read timeout.
    struct Chunked {
        chunks: Vec<&'static [u8]>,
        timed_out: bool,
    }

    impl Read for Chunked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            if !self.timed_out {
                self.timed_out = true;
                return Err(io::Error::new(io::ErrorKind::TimedOut, "timeout"));
            }
            self.timed_out = false;
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_timeout_keeps_partial_line() {
        let reader = Chunked {
            chunks: vec![b"Ang", b"le: 4", b"2.5\n"],
            timed_out: false,
        };
        let mut source = LineSource::new(BufReader::new(reader), "chunked");
        let polls = poll_all(&mut source);
        let frames: Vec<_> = polls.iter().filter(|p| **p != Poll::Idle).collect();
        assert_eq!(frames, vec![&frame("Angle: 42.5")]);
        assert!(polls.contains(&Poll::Idle));
    }
}
