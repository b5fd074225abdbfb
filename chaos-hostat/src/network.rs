//! Transport backend: the local stream endpoint and the single exchange.
//!
//! The endpoint is a Unix-domain stream socket owned by the Chaosnet NCP.
//! It accepts one request line and answers with an `ANS` reply.

use std::io::{BufReader, Read, Write};
use std::os::unix::net::UnixStream;

use crate::config::Config;
use crate::error::Result;
use crate::reply::{read_reply, ReplyEnvelope, Request};

/// Open the stream endpoint named by `config`.
pub fn connect(config: &Config) -> Result<UnixStream> {
    let path = config.stream_socket_path();
    log::debug!("connecting to {}", path.display());
    Ok(UnixStream::connect(&path)?)
}

/// Send `request` on `stream` and frame the reply.
///
/// Reads block until the peer answers; any timeout is the endpoint's job.
pub fn exchange<S: Read + Write>(
    stream: S,
    request: &Request,
    max_record_size: usize,
) -> Result<ReplyEnvelope> {
    let mut reader = BufReader::new(stream);
    let line = request.to_line();
    log::debug!("> {}", line.trim_end());
    {
        let stream = reader.get_mut();
        stream.write_all(line.as_bytes())?;
        stream.flush()?;
    }
    read_reply(&mut reader, max_record_size)
}

/// Connect, send, and return the framed reply.
pub fn query(config: &Config, request: &Request) -> Result<ReplyEnvelope> {
    let stream = connect(config)?;
    exchange(stream, request, config.max_record_size)
}
