//! Record decoders for the simple connectionless services.
//!
//! Nothing in a payload says what it is: the contact name of the request
//! picks the decoder. Each decoder takes the payload sliced to its declared
//! length and either returns a [`Record`] or a [`HostatError::Format`].

use std::fmt;
use std::str::FromStr;

use crate::config::DisplayMode;
use crate::error::{HostatError, Result};
use crate::words::{word_from, WordCursor, WORD_LEN};

/// Seconds between 1900-01-01 and 1970-01-01 (RFC 868).
pub const EPOCH_OFFSET: u32 = 2_208_988_800;

/// STATUS subnet codes are offset by this value.
pub const SUBNET_CODE_OFFSET: u16 = 0o400;

/// Bytes of host name at the start of a STATUS payload.
pub const STATUS_NAME_LEN: usize = 32;

/// Minimum words in one LASTCN entry.
pub const LASTCN_MIN_WORDS: u16 = 7;

/// Separates FINGER fields (Lisp Machine newline).
pub const FINGER_DELIMITER: u8 = 0o215;

/// ------------------------------------------------------------
/// Services
/// ------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Service {
    Status,
    Time,
    Uptime,
    DumpRoutingTable,
    LastCn,
    Finger,
    Load,
    /// Any contact name without a dedicated decoder.
    Other(String),
}

impl Service {
    /// Case-insensitive lookup; never fails.
    pub fn from_name(name: &str) -> Self {
        match name.to_uppercase().as_str() {
            "STATUS" => Service::Status,
            "TIME" => Service::Time,
            "UPTIME" => Service::Uptime,
            "DUMP-ROUTING-TABLE" => Service::DumpRoutingTable,
            "LASTCN" => Service::LastCn,
            "FINGER" => Service::Finger,
            "LOAD" => Service::Load,
            _ => Service::Other(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Service::Status => "STATUS",
            Service::Time => "TIME",
            Service::Uptime => "UPTIME",
            Service::DumpRoutingTable => "DUMP-ROUTING-TABLE",
            Service::LastCn => "LASTCN",
            Service::Finger => "FINGER",
            Service::Load => "LOAD",
            Service::Other(n) => n,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Service::Other(_))
    }
}

impl FromStr for Service {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Service::from_name(s))
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// ------------------------------------------------------------
/// Records
/// ------------------------------------------------------------

/// Counters for one subnet in a STATUS reply.
///
/// The extended counters are `Some` only for the 16- and 20-word variants;
/// `rejected` only for the 20-word variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusEntry {
    pub subnet: u16,
    pub entry_words: u16,
    pub input: u32,
    pub output: u32,
    pub aborted: Option<u32>,
    pub lost: Option<u32>,
    pub crc_errors: Option<u32>,
    pub crc_errors_post: Option<u32>,
    pub bad_length: Option<u32>,
    pub rejected: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub host_name: String,
    pub entries: Vec<StatusEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingEntry {
    pub subnet: u16,
    /// Below 0o400 an interface number, otherwise the forwarding host.
    pub method: u16,
    pub cost: u16,
}

impl RoutingEntry {
    pub fn is_interface(&self) -> bool {
        self.method < 0o400
    }
}

/// An absolute time, already moved to the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeValue {
    pub raw: u32,
    pub unix_seconds: i64,
}

impl TimeValue {
    pub fn from_raw(raw: u32) -> Result<Self> {
        if raw <= EPOCH_OFFSET {
            return Err(HostatError::InvalidTime(raw));
        }
        Ok(Self {
            raw,
            unix_seconds: i64::from(raw - EPOCH_OFFSET),
        })
    }
}

/// Time since the host came up.
///
/// The count is taken as plain seconds. Some hosts report 60ths of a
/// second instead; those values are shown unscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeValue {
    pub seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastConnectionEntry {
    pub declared_words: u16,
    pub peer: u16,
    pub input: u32,
    pub last_seen_via: u16,
    pub age_seconds: u32,
    pub flow_control: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FingerRecord {
    pub user_id: String,
    pub location: String,
    pub idle: String,
    pub personal_name: String,
    pub affiliation: String,
}

/// A decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Status(StatusReport),
    Time(TimeValue),
    Uptime(UptimeValue),
    RoutingTable(Vec<RoutingEntry>),
    LastConnections(Vec<LastConnectionEntry>),
    Finger(FingerRecord),
    Text(String),
    Raw(Vec<u8>),
}

/// Pick the decoder for `service` under `mode` and run it.
pub fn decode(service: &Service, mode: DisplayMode, payload: &[u8]) -> Result<Record> {
    if mode == DisplayMode::Raw {
        return Ok(Record::Raw(payload.to_vec()));
    }
    log::debug!("decoding {} bytes as {}", payload.len(), service);
    Ok(match service {
        Service::Status => Record::Status(decode_status(payload)?),
        Service::Time => Record::Time(decode_time(payload)?),
        Service::Uptime => Record::Uptime(decode_uptime(payload)?),
        Service::DumpRoutingTable => Record::RoutingTable(decode_routing_table(payload)?),
        Service::LastCn => Record::LastConnections(decode_last_connections(payload)?),
        Service::Finger => Record::Finger(decode_finger(payload)),
        Service::Load => Record::Text(decode_text(payload)),
        Service::Other(_) if mode == DisplayMode::Ascii => Record::Text(decode_text(payload)),
        Service::Other(_) => Record::Raw(payload.to_vec()),
    })
}

/* ============================
STATUS
============================ */

pub fn decode_status(payload: &[u8]) -> Result<StatusReport> {
    let mut cursor = WordCursor::new(payload);
    let name = cursor.read_bytes(STATUS_NAME_LEN).map_err(|_| {
        HostatError::Format(format!(
            "STATUS payload of {} bytes has no room for the host name",
            payload.len()
        ))
    })?;
    let host_name = padded_name(name);

    let mut entries = Vec::new();
    while !cursor.is_empty() {
        entries.push(decode_status_entry(&mut cursor)?);
    }
    Ok(StatusReport { host_name, entries })
}

fn decode_status_entry(cursor: &mut WordCursor<'_>) -> Result<StatusEntry> {
    let code = cursor.read_word()?;
    let subnet = code.checked_sub(SUBNET_CODE_OFFSET).ok_or_else(|| {
        HostatError::Format(format!("Unexpected format of subnet: {:#o} ({:#x})", code, code))
    })?;
    let entry_words = cursor.read_word()?;
    // The tag is the entry's length in words, whatever the variant reads.
    let start = cursor.position();

    let mut entry = StatusEntry {
        subnet,
        entry_words,
        input: cursor.read_long()?,
        output: cursor.read_long()?,
        ..StatusEntry::default()
    };
    match entry_words {
        // TOPS-20 only reports the two packet counters.
        4 => {}
        16 | 20 => {
            entry.aborted = Some(cursor.read_long()?);
            entry.lost = Some(cursor.read_long()?);
            entry.crc_errors = Some(cursor.read_long()?);
            entry.crc_errors_post = Some(cursor.read_long()?);
            entry.bad_length = Some(cursor.read_long()?);
            if entry_words == 20 {
                entry.rejected = Some(cursor.read_long()?);
            }
        }
        other => {
            return Err(HostatError::Format(format!(
                "Unexpected STATUS entry length {} for subnet {:#o}",
                other, subnet
            )))
        }
    }
    cursor.seek(start + usize::from(entry_words) * WORD_LEN)?;
    Ok(entry)
}

/// Host name up to the first NUL, with padding removed.
fn padded_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

/* ============================
DUMP-ROUTING-TABLE
============================ */

/// One (method, cost) slot per subnet; unused slots have method 0.
pub fn decode_routing_table(payload: &[u8]) -> Result<Vec<RoutingEntry>> {
    let slots = payload.chunks_exact(4);
    if !slots.remainder().is_empty() {
        log::warn!(
            "routing table: ignoring {} trailing bytes",
            slots.remainder().len()
        );
    }
    let mut table = Vec::new();
    for (index, slot) in slots.enumerate() {
        let method = word_from([slot[0], slot[1]]);
        if method == 0 {
            continue;
        }
        let subnet = u16::try_from(index).map_err(|_| {
            HostatError::Format(format!("routing table slot {} is past the last subnet", index))
        })?;
        table.push(RoutingEntry {
            subnet,
            method,
            cost: word_from([slot[2], slot[3]]),
        });
    }
    Ok(table)
}

/* ============================
TIME / UPTIME
============================ */

fn read_four_byte_long(payload: &[u8], what: &str) -> Result<u32> {
    if payload.len() != 4 {
        return Err(HostatError::Format(format!(
            "Bad {} length {} (expected 4)",
            what,
            payload.len()
        )));
    }
    WordCursor::new(payload).read_long()
}

pub fn decode_time(payload: &[u8]) -> Result<TimeValue> {
    TimeValue::from_raw(read_four_byte_long(payload, "time")?)
}

pub fn decode_uptime(payload: &[u8]) -> Result<UptimeValue> {
    Ok(UptimeValue {
        seconds: read_four_byte_long(payload, "uptime")?,
    })
}

/* ============================
LASTCN
============================ */

/// Walk the self-describing entries.
///
/// Each entry is skipped by its declared word count, not by what was read
/// from it, so longer entries from newer hosts still line up.
pub fn decode_last_connections(payload: &[u8]) -> Result<Vec<LastConnectionEntry>> {
    let words = payload.len() / WORD_LEN;
    let mut cursor = WordCursor::new(payload);
    let mut entries = Vec::new();
    let mut word = 0usize;

    while word < words {
        cursor.seek(word * WORD_LEN)?;
        let declared_words = cursor.read_word()?;
        if declared_words < LASTCN_MIN_WORDS {
            return Err(HostatError::Format(format!(
                "Unexpected WPE of LASTCN: {} should be >= {}",
                declared_words, LASTCN_MIN_WORDS
            )));
        }
        let peer = cursor.read_word()?;
        let input = cursor.read_long()?;
        let last_seen_via = cursor.read_word()?;
        let age_seconds = cursor.read_long()?;
        let flow_control = if declared_words > LASTCN_MIN_WORDS {
            Some(cursor.read_word()?)
        } else {
            None
        };
        entries.push(LastConnectionEntry {
            declared_words,
            peer,
            input,
            last_seen_via,
            age_seconds,
            flow_control,
        });
        word += usize::from(declared_words);
    }
    Ok(entries)
}

/* ============================
FINGER / LOAD
============================ */

/// Split on the delimiter into at most five fields; missing ones are empty.
pub fn decode_finger(payload: &[u8]) -> FingerRecord {
    let mut fields = payload
        .splitn(5, |&b| b == FINGER_DELIMITER)
        .map(finger_field);
    let mut next = || fields.next().unwrap_or_default();
    FingerRecord {
        user_id: next(),
        location: next(),
        idle: next(),
        personal_name: next(),
        affiliation: next(),
    }
}

fn finger_field(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Text up to the first NUL, never past the declared length.
pub fn decode_text(payload: &[u8]) -> String {
    let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
    String::from_utf8_lossy(&payload[..end]).into_owned()
}
