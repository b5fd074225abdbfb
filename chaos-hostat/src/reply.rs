//! Request line and reply framing for the stream transport.
//!
//! A simple-protocol exchange is one text line each way plus a payload:
//!
//! ```text
//!  → RFC [timeout=<secs>] <host> <contact>\r\n
//!  ← ANS <source:octal> <length:decimal>\n
//!  ← <length> raw payload bytes
//! ```
//!
//! The payload may arrive in any number of partial reads; [`read_reply`]
//! keeps reading until the declared length is satisfied.

use std::fmt;
use std::io::{BufRead, ErrorKind, Read};

use crate::error::{HostatError, Result};

/// Marker that opens every answer header.
pub const ANS_MARKER: &str = "ANS ";

/// Longest header line accepted before giving up on finding a newline.
pub const MAX_HEADER_LEN: usize = 512;

/// A request for a simple connectionless service on a remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub host: String,
    pub contact: String,
    /// Hint for the transport endpoint, in seconds.
    pub timeout: Option<u32>,
}

impl Request {
    pub fn new(host: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            contact: contact.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<u32>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bytes to write to the stream, including the CRLF terminator.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.timeout {
            Some(t) if t > 0 => write!(f, "RFC [timeout={}] {} {}\r\n", t, self.host, self.contact),
            _ => write!(f, "RFC {} {}\r\n", self.host, self.contact),
        }
    }
}

/// Parsed `ANS` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyHeader {
    pub source: u16,
    pub length: usize,
}

impl ReplyHeader {
    /// Parse a header line with its line terminator already removed.
    pub fn parse(line: &str) -> Result<Self> {
        let rest = line
            .strip_prefix(ANS_MARKER)
            .ok_or_else(|| HostatError::Protocol(line.to_string()))?;
        let mut fields = rest.split_whitespace();

        let source = fields
            .next()
            .and_then(|f| u16::from_str_radix(f, 8).ok())
            .ok_or_else(|| HostatError::Parse {
                field: "source address",
                line: line.to_string(),
            })?;
        let length = fields
            .next()
            .and_then(|f| f.parse::<usize>().ok())
            .ok_or_else(|| HostatError::Parse {
                field: "length",
                line: line.to_string(),
            })?;

        Ok(Self { source, length })
    }
}

/// A complete answer: who sent it and exactly the declared payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyEnvelope {
    pub source: u16,
    pub declared_length: usize,
    pub payload: Vec<u8>,
}

/// Read one header line and the payload it announces.
///
/// `max_record_size` bounds the declared length before anything is
/// allocated for the payload.
pub fn read_reply<R: BufRead>(reader: &mut R, max_record_size: usize) -> Result<ReplyEnvelope> {
    let line = read_header_line(reader)?;
    let header = ReplyHeader::parse(&line)?;
    log::debug!(
        "ANS from {:#o}, {} bytes declared",
        header.source,
        header.length
    );

    if header.length > max_record_size {
        return Err(HostatError::PayloadTooLarge {
            declared: header.length,
            max: max_record_size,
        });
    }

    let payload = read_payload(reader, header.length)?;
    Ok(ReplyEnvelope {
        source: header.source,
        declared_length: header.length,
        payload,
    })
}

/// Read up to and including `\n`; return the line without `\r\n`.
fn read_header_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut raw = Vec::new();
    let limit = MAX_HEADER_LEN as u64;
    let n = loop {
        match reader.by_ref().take(limit).read_until(b'\n', &mut raw) {
            Ok(n) => break n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(HostatError::Transport(e)),
        }
    };

    if n == 0 {
        return Err(HostatError::Protocol("connection closed before reply".into()));
    }
    if raw.last() != Some(&b'\n') {
        let shown = String::from_utf8_lossy(&raw).into_owned();
        return Err(HostatError::Protocol(format!("unterminated header: {}", shown)));
    }
    raw.pop();
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Pull exactly `length` bytes, issuing as many reads as it takes.
fn read_payload<R: Read>(reader: &mut R, length: usize) -> Result<Vec<u8>> {
    let mut payload = vec![0u8; length];
    let mut received = 0;
    while received < length {
        match reader.read(&mut payload[received..]) {
            Ok(0) => {
                return Err(HostatError::TruncatedPayload {
                    expected: length,
                    received,
                })
            }
            Ok(n) => {
                received += n;
                log::debug!("payload chunk {} bytes ({}/{})", n, received, length);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(HostatError::Transport(e)),
        }
    }
    Ok(payload)
}
