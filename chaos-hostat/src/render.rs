//! Human-readable output for decoded records.
//!
//! Addresses are printed the way Chaosnet people read them: octal with a
//! leading zero.

use std::fmt;

use chrono::{Local, TimeZone};

use crate::records::{
    FingerRecord, LastConnectionEntry, Record, RoutingEntry, StatusReport, TimeValue,
};
use crate::words::swap_word_bytes;

const MINUTE: u32 = 60;
const HOUR: u32 = 60 * MINUTE;
const DAY: u32 = 24 * HOUR;
const WEEK: u32 = 7 * DAY;
const YEAR: u32 = 365 * DAY;

/// Bytes per row of a raw dump.
const DUMP_ROW: usize = 8;

/// Octal with a leading `0`, like C's `%#o`.
pub fn octal(value: u16) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("0{:o}", value)
    }
}

/// Render a number of seconds as an interval, largest units first.
///
/// Units with a zero count are left out; `0` is `"now"`.
pub fn seconds_as_interval(seconds: u32) -> String {
    if seconds == 0 {
        return "now".to_string();
    }
    let mut t = seconds;
    let mut parts = Vec::new();
    for (unit, name) in [(YEAR, "year"), (WEEK, "week"), (DAY, "day"), (HOUR, "hour")] {
        let n = t / unit;
        if n > 0 {
            parts.push(format!("{} {}{}", n, name, if n == 1 { "" } else { "s" }));
            t %= unit;
        }
    }
    if t >= MINUTE {
        parts.push(format!("{}m {}s", t / MINUTE, t % MINUTE));
    } else if t > 0 || parts.is_empty() {
        parts.push(format!("{} s", t));
    }
    parts.join(" ")
}

/// Printable form of one byte: `^X` for controls, hex above 126.
pub fn char_label(b: u8) -> String {
    match b {
        0..=31 => format!("^{}", (b + 64) as char),
        127 => "^?".to_string(),
        32..=126 => (b as char).to_string(),
        _ => format!("{:2x}", b),
    }
}

/// Bytes shown in rows of eight: hex words, characters, byte-swapped characters.
pub struct ByteDump<'a>(pub &'a [u8]);

impl fmt::Display for ByteDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Read {} bytes:", self.0.len())?;
        for row in self.0.chunks(DUMP_ROW) {
            for pair in row.chunks(2) {
                write!(f, "  ")?;
                for b in pair {
                    write!(f, "{:02x}", b)?;
                }
            }
            writeln!(f, " (hex)")?;

            write_char_pairs(f, row)?;
            writeln!(f, " (chars)")?;

            write_char_pairs(f, &swap_word_bytes(row))?;
            writeln!(f, " (11-chars)")?;
        }
        Ok(())
    }
}

fn write_char_pairs(f: &mut fmt::Formatter, bytes: &[u8]) -> fmt::Result {
    for pair in bytes.chunks(2) {
        write!(f, "  ")?;
        for &b in pair {
            write!(f, "{:>2}", char_label(b))?;
        }
    }
    Ok(())
}

pub fn dump_bytes(bytes: &[u8]) -> String {
    ByteDump(bytes).to_string()
}

/// Format an absolute time in `tz`, optionally with its offset from `now`.
pub fn format_time_in<Tz: TimeZone>(value: &TimeValue, tz: &Tz, now: i64, verbose: bool) -> String
where
    Tz::Offset: fmt::Display,
{
    // In a DST fold both readings are valid; show the first.
    let stamp = match tz.timestamp_opt(value.unix_seconds, 0).earliest() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("@{}", value.unix_seconds),
    };
    if !verbose {
        return stamp;
    }
    let diff = value.unix_seconds - now;
    let shown = match diff {
        0 => "none".to_string(),
        d => {
            let sign = if d > 0 { "+" } else { "-" };
            let magnitude = u32::try_from(d.unsigned_abs()).unwrap_or(u32::MAX);
            format!("{}{}", sign, seconds_as_interval(magnitude))
        }
    };
    format!("{} (diff {})", stamp, shown)
}

/// Turns records into text for one reply.
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Address the reply came from.
    pub source: u16,
    /// Host name as given in the request.
    pub host: String,
    pub verbose: bool,
}

/// A record paired with the reply context it is shown in.
pub struct Rendered<'a> {
    renderer: &'a Renderer,
    record: &'a Record,
}

impl Renderer {
    pub fn new(source: u16, host: impl Into<String>, verbose: bool) -> Self {
        Self {
            source,
            host: host.into(),
            verbose,
        }
    }

    pub fn display<'a>(&'a self, record: &'a Record) -> Rendered<'a> {
        Rendered {
            renderer: self,
            record,
        }
    }

    pub fn render(&self, record: &Record) -> String {
        self.display(record).to_string()
    }

    fn status(&self, f: &mut fmt::Formatter, report: &StatusReport) -> fmt::Result {
        writeln!(
            f,
            "Hostat for host {} ({})",
            report.host_name,
            octal(self.source)
        )?;
        writeln!(
            f,
            "{} \t{:<8} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8}",
            "Net", "In", "Out", "Abort", "Lost", "crcerr", "ram", "Badlen", "Rejected"
        )?;
        for e in &report.entries {
            match e.aborted {
                None => writeln!(f, "{} \t{:<8} {:<8}", octal(e.subnet), e.input, e.output)?,
                Some(aborted) => writeln!(
                    f,
                    "{} \t{:<8} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8}",
                    octal(e.subnet),
                    e.input,
                    e.output,
                    aborted,
                    e.lost.unwrap_or(0),
                    e.crc_errors.unwrap_or(0),
                    e.crc_errors_post.unwrap_or(0),
                    e.bad_length.unwrap_or(0),
                    e.rejected.unwrap_or(0)
                )?,
            }
        }
        Ok(())
    }

    fn routing_table(&self, f: &mut fmt::Formatter, table: &[RoutingEntry]) -> fmt::Result {
        writeln!(f, "Routing table received from host {}", octal(self.source))?;
        writeln!(f, "{:<8} {:<8} {}", "Subnet", "Method", "Cost")?;
        for r in table {
            writeln!(
                f,
                "{:<8} {:<8} {:<8}",
                octal(r.subnet),
                octal(r.method),
                r.cost
            )?;
        }
        Ok(())
    }

    fn last_connections(
        &self,
        f: &mut fmt::Formatter,
        entries: &[LastConnectionEntry],
    ) -> fmt::Result {
        writeln!(f, "Last seen at host {}:", octal(self.source))?;
        writeln!(
            f,
            "{:<8} {:>8} {:<8} {:<4} {}",
            "Host", "#in", "Via", "FC", "Age(s)"
        )?;
        for e in entries {
            let fc = e.flow_control.map(|v| v.to_string()).unwrap_or_default();
            writeln!(
                f,
                "{:<8} {:>8} {:<8} {:<4} {}",
                octal(e.peer),
                e.input,
                octal(e.last_seen_via),
                fc,
                seconds_as_interval(e.age_seconds)
            )?;
        }
        Ok(())
    }

    fn finger(&self, f: &mut fmt::Formatter, rec: &FingerRecord) -> fmt::Result {
        let who = format!("User at {}", octal(self.source));
        write!(
            f,
            "{:<15} {:.1} {:<22} {:<10} {:>5}    {}\n\
             {:<15.15} {:.1} {:<22.22} {:<10.10} {:>5.5}    {}\n",
            who,
            " ",
            "Name",
            "Host",
            "Idle",
            "Location",
            rec.user_id,
            rec.affiliation,
            rec.personal_name,
            self.host,
            rec.idle,
            rec.location
        )
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let r = self.renderer;
        match self.record {
            Record::Status(s) => r.status(f, s),
            Record::Time(t) => {
                let now = Local::now().timestamp();
                writeln!(f, "{}", format_time_in(t, &Local, now, r.verbose))
            }
            Record::Uptime(u) => writeln!(
                f,
                "Host {} uptime: {}",
                octal(r.source),
                seconds_as_interval(u.seconds)
            ),
            Record::RoutingTable(t) => r.routing_table(f, t),
            Record::LastConnections(l) => r.last_connections(f, l),
            Record::Finger(rec) => r.finger(f, rec),
            Record::Text(t) => writeln!(f, "{}", t),
            Record::Raw(b) => write!(f, "{}", ByteDump(b)),
        }
    }
}
