//! Reply framing under partial deliveries.
//!
//! The endpoint may hand the reply over in any number of reads. These tests
//! feed the framer through a reader that returns fixed-size chunks and check
//! that the payload is reassembled byte for byte.

use std::io::{self, BufReader, Read};

use chaos_hostat::{read_reply, HostatError};
use rand::Rng;

/// Returns at most `chunk` bytes per read.
struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ChunkedReader {
    fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self { data, pos: 0, chunk }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Fails with `Interrupted` on every other call.
struct InterruptingReader {
    inner: ChunkedReader,
    interrupt: bool,
}

impl Read for InterruptingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
        }
        self.inner.read(buf)
    }
}

/// Hands over the header, then fails.
struct BrokenReader {
    header: Option<Vec<u8>>,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.header.take() {
            Some(h) => {
                buf[..h.len()].copy_from_slice(&h);
                Ok(h.len())
            }
            None => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        }
    }
}

fn reply_bytes(source: u16, payload: &[u8]) -> Vec<u8> {
    let mut v = format!("ANS {:o} {}\n", source, payload.len()).into_bytes();
    v.extend_from_slice(payload);
    v
}

#[test]
fn reassembles_for_every_chunk_size() {
    let payload: Vec<u8> = (0..200u8).collect();
    let wire = reply_bytes(0o3040, &payload);
    for chunk in 1..=payload.len() {
        // Capacity 1 keeps BufReader from hiding the chunking.
        let mut r = BufReader::with_capacity(1, ChunkedReader::new(wire.clone(), chunk));
        let env = read_reply(&mut r, 488).unwrap();
        assert_eq!(env.source, 0o3040, "chunk {}", chunk);
        assert_eq!(env.declared_length, payload.len());
        assert_eq!(env.payload, payload, "chunk {}", chunk);
    }
}

#[test]
fn reassembles_random_payloads() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let len = rng.random_range(0..=488usize);
        let payload: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        let chunk = rng.random_range(1..=len.max(1));
        let mut r = BufReader::with_capacity(
            rng.random_range(1..64),
            ChunkedReader::new(reply_bytes(0o401, &payload), chunk),
        );
        let env = read_reply(&mut r, 488).unwrap();
        assert_eq!(env.payload.len(), len);
        assert_eq!(env.payload, payload);
    }
}

#[test]
fn interrupted_reads_are_retried() {
    let payload = b"interrupted but whole".to_vec();
    let inner = ChunkedReader::new(reply_bytes(0o17, &payload), 3);
    let mut r = BufReader::with_capacity(
        4,
        InterruptingReader {
            inner,
            interrupt: false,
        },
    );
    let env = read_reply(&mut r, 488).unwrap();
    assert_eq!(env.payload, payload);
}

#[test]
fn read_error_mid_payload_is_transport_error() {
    let mut r = BufReader::new(BrokenReader {
        header: Some(b"ANS 401 10\nabc".to_vec()),
    });
    assert!(matches!(
        read_reply(&mut r, 488),
        Err(HostatError::Transport(_))
    ));
}

#[test]
fn early_end_of_stream_is_truncated_payload() {
    let mut wire = reply_bytes(0o401, &[7u8; 40]);
    wire.truncate(wire.len() - 15);
    let mut r = BufReader::new(ChunkedReader::new(wire, 4));
    assert!(matches!(
        read_reply(&mut r, 488),
        Err(HostatError::TruncatedPayload {
            expected: 40,
            received: 25
        })
    ));
}

#[test]
fn declared_length_checked_before_payload_read() {
    // No payload bytes at all: the size check must fire first.
    let mut r = BufReader::new(ChunkedReader::new(b"ANS 401 489\n".to_vec(), 2));
    assert!(matches!(
        read_reply(&mut r, 488),
        Err(HostatError::PayloadTooLarge { declared: 489, .. })
    ));
}

#[test]
fn max_record_size_is_inclusive() {
    let payload = vec![1u8; 488];
    let mut r = BufReader::new(ChunkedReader::new(reply_bytes(1, &payload), 100));
    assert_eq!(read_reply(&mut r, 488).unwrap().payload.len(), 488);
}

#[test]
fn non_ans_reply_is_protocol_error() {
    let mut r = BufReader::new(ChunkedReader::new(
        b"LOS Host not responding\n".to_vec(),
        5,
    ));
    match read_reply(&mut r, 488) {
        Err(HostatError::Protocol(line)) => assert_eq!(line, "LOS Host not responding"),
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[test]
fn bad_header_fields_are_parse_errors() {
    for line in ["ANS xyz 4\n", "ANS 401 four\n", "ANS \n"] {
        let mut r = BufReader::new(ChunkedReader::new(line.as_bytes().to_vec(), 64));
        assert!(
            matches!(read_reply(&mut r, 488), Err(HostatError::Parse { .. })),
            "{:?}",
            line
        );
    }
}
