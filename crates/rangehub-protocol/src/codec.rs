//! Tokio codec for LF-delimited ASCII lines.
//!
//! [`LineCodec`] integrates the line protocol with Tokio's `Framed` streams:
//!
//! - [`Decoder`]: yields one `String` per LF-terminated line, with any
//!   trailing CR stripped. Bytes that are not valid UTF-8 are replaced
//!   lossily rather than failing the stream — the inbound protocol is
//!   best-effort and a garbled line is just an unrecognized line.
//! - [`Encoder<Command>`]: writes the command word followed by a single LF.
//!
//! # DoS protection
//!
//! A peer that streams bytes without ever sending a line terminator would
//! otherwise grow the read buffer without bound. Once the buffered partial
//! line exceeds [`MAX_LINE_LENGTH`] the decoder reports
//! [`Error::LineTooLong`], which ends that session.
//!
//! # Usage
//!
//! ```no_run
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//! use futures::{SinkExt, StreamExt};
//! use rangehub_protocol::{Command, LineCodec};
//!
//! # async fn example() -> rangehub_core::Result<()> {
//! let stream = TcpStream::connect("192.168.10.223:1234").await?;
//! let mut framed = Framed::new(stream, LineCodec::new());
//! framed.send(Command::ping()).await?;
//! # Ok(())
//! # }
//! ```

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use rangehub_core::Error;
use rangehub_core::constants::{CMD_OFF, CMD_PING, MAX_LINE_LENGTH};

/// An outbound command word, written to the device as `<word>\n`.
///
/// The bridge itself only ever sends [`Command::ping`] and [`Command::off`];
/// arbitrary operator-supplied strings relayed by the status collaborator go
/// through [`Command::new`] and are treated opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(String);

impl Command {
    /// Wrap an arbitrary command string. The vocabulary is not validated;
    /// the device decides what it understands.
    pub fn new(word: impl Into<String>) -> Self {
        Self(word.into())
    }

    /// Liveness probe.
    pub fn ping() -> Self {
        Self(CMD_PING.to_string())
    }

    /// Off command issued by the pulse machine.
    pub fn off() -> Self {
        Self(CMD_OFF.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Command {
    fn from(word: &str) -> Self {
        Self::new(word)
    }
}

/// Codec for LF-delimited ASCII lines with a bounded line length.
#[derive(Debug)]
pub struct LineCodec {
    /// Maximum allowed length of a single line, in bytes.
    max_line_length: usize,

    /// Scan position within the buffer, so repeated `decode` calls on a
    /// growing partial line do not rescan bytes already searched.
    next_index: usize,
}

impl LineCodec {
    /// Create a codec with the default [`MAX_LINE_LENGTH`] limit.
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom line length limit.
    pub fn with_max_length(max_line_length: usize) -> Self {
        Self {
            max_line_length,
            next_index: 0,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Error> {
        match buf[self.next_index..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let newline_index = self.next_index + offset;
                if newline_index > self.max_line_length {
                    return Err(Error::LineTooLong {
                        max: self.max_line_length,
                    });
                }

                let mut line = buf.split_to(newline_index);
                buf.advance(1); // consume the LF
                self.next_index = 0;

                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }

                Ok(Some(String::from_utf8_lossy(&line).into_owned()))
            }
            None => {
                if buf.len() > self.max_line_length {
                    return Err(Error::LineTooLong {
                        max: self.max_line_length,
                    });
                }
                self.next_index = buf.len();
                Ok(None)
            }
        }
    }
}

impl Encoder<Command> for LineCodec {
    type Error = Error;

    fn encode(&mut self, command: Command, buf: &mut BytesMut) -> Result<(), Error> {
        let word = command.as_str();
        buf.reserve(word.len() + 1);
        buf.put_slice(word.as_bytes());
        buf.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(Some(line)) = codec.decode(buf) {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn decodes_lf_delimited_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("distance:1500\nalert:1\n");

        assert_eq!(
            decode_all(&mut codec, &mut buf),
            vec!["distance:1500".to_string(), "alert:1".to_string()]
        );
    }

    #[test]
    fn strips_trailing_cr() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("distance:42\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("distance:42".to_string()));
    }

    #[test]
    fn holds_partial_line_until_terminator() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("dista");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"nce:7\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("distance:7".to_string()));
    }

    #[test]
    fn blank_lines_decode_as_empty_strings() {
        // The session layer discards them; the codec just reports them.
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("\n  \n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(String::new()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("  ".to_string()));
    }

    #[test]
    fn oversized_line_is_rejected() {
        let mut codec = LineCodec::with_max_length(8);
        let mut buf = BytesMut::from(&b"0123456789abcdef"[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(Error::LineTooLong { max: 8 })
        ));
    }

    #[test]
    fn encodes_command_with_lf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(Command::ping(), &mut buf).unwrap();
        codec.encode(Command::new("X"), &mut buf).unwrap();

        assert_eq!(&buf[..], b"PING\nX\n");
    }

    #[test]
    fn command_constructors() {
        assert_eq!(Command::ping().as_str(), "PING");
        assert_eq!(Command::off().as_str(), "OFF");
        assert_eq!(Command::from("REBOOT").as_str(), "REBOOT");
    }
}
