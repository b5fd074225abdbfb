//! 16-bit word access over a reply payload.
//!
//! Chaosnet payloads are laid out in 16-bit words with the low byte first.
//! A 32-bit value occupies two consecutive words: the first word is the low
//! half and the second is the high half, i.e. `low | (high << 16)`.
//!
//! That convention is applied uniformly by every decoder. Peers have been
//! known to disagree about it, so it lives here and nowhere else.

use crate::error::{HostatError, Result};

/// Byte width of one protocol word.
pub const WORD_LEN: usize = 2;

/// Read the word at byte offset `offset`.
pub fn word_at(buf: &[u8], offset: usize) -> Result<u16> {
    let end = offset
        .checked_add(WORD_LEN)
        .ok_or_else(|| HostatError::Format("word offset overflow".into()))?;
    let bytes = buf.get(offset..end).ok_or_else(|| {
        HostatError::Format(format!(
            "word at byte {} past end of {}-byte payload",
            offset,
            buf.len()
        ))
    })?;
    Ok(word_from([bytes[0], bytes[1]]))
}

/// Interpret two payload bytes as one word.
pub fn word_from(pair: [u8; 2]) -> u16 {
    u16::from_le_bytes(pair)
}

/// Read the 32-bit value held in the two words starting at `offset`.
pub fn long_at(buf: &[u8], offset: usize) -> Result<u32> {
    let low = word_at(buf, offset)?;
    let high = word_at(buf, offset + WORD_LEN)?;
    Ok(combine(low, high))
}

/// Combine two words, first word low.
pub fn combine(low: u16, high: u16) -> u32 {
    u32::from(low) | (u32::from(high) << 16)
}

/// Cursor over a payload, checked before every access.
///
/// The cursor never moves past the end of the buffer it was built over;
/// callers slice the payload to its declared length first.
#[derive(Debug, Clone)]
pub struct WordCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WordCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of the payload.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_word(&mut self) -> Result<u16> {
        let w = word_at(self.buf, self.pos)?;
        self.pos += WORD_LEN;
        Ok(w)
    }

    pub fn read_long(&mut self) -> Result<u32> {
        let v = long_at(self.buf, self.pos)?;
        self.pos += 2 * WORD_LEN;
        Ok(v)
    }

    /// Take the next `len` bytes verbatim.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                HostatError::Format(format!(
                    "{} bytes at byte {} past end of {}-byte payload",
                    len,
                    self.pos,
                    self.buf.len()
                ))
            })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Move to byte offset `pos`, which may equal the payload length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(HostatError::Format(format!(
                "seek to byte {} past end of {}-byte payload",
                pos,
                self.buf.len()
            )));
        }
        self.pos = pos;
        Ok(())
    }
}

/// Swap the bytes of every word, PDP-11 string style.
///
/// An odd-length input is padded with a zero byte so the last character,
/// which sits in the low byte of the final word, is not lost.
pub fn swap_word_bytes(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + 1);
    for pair in input.chunks(2) {
        match *pair {
            [a, b] => out.extend_from_slice(&[b, a]),
            [a] => out.extend_from_slice(&[0, a]),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_is_low_byte_first() {
        assert_eq!(word_at(&[0x34, 0x12], 0).unwrap(), 0x1234);
    }

    #[test]
    fn long_is_first_word_low() {
        // low word 0x5678, high word 0x1234
        let buf = [0x78, 0x56, 0x34, 0x12];
        assert_eq!(long_at(&buf, 0).unwrap(), 0x1234_5678);
    }

    #[test]
    fn combine_orders_halves() {
        assert_eq!(combine(1, 0), 1);
        assert_eq!(combine(0, 1), 0x1_0000);
    }

    #[test]
    fn word_past_end_is_format_error() {
        assert!(matches!(word_at(&[1], 0), Err(HostatError::Format(_))));
        assert!(matches!(word_at(&[1, 2], 1), Err(HostatError::Format(_))));
        assert!(matches!(word_at(&[], usize::MAX), Err(HostatError::Format(_))));
    }

    #[test]
    fn long_needs_four_bytes() {
        assert!(long_at(&[1, 2, 3], 0).is_err());
    }

    #[test]
    fn cursor_advances_and_stops_at_end() {
        let buf = [1, 0, 2, 0, 3, 0, 0, 0];
        let mut c = WordCursor::new(&buf);
        assert_eq!(c.read_word().unwrap(), 1);
        assert_eq!(c.read_long().unwrap(), 2 | (3 << 16));
        assert_eq!(c.remaining(), 2);
        assert_eq!(c.read_word().unwrap(), 0);
        assert!(c.is_empty());
        assert!(c.read_word().is_err());
        assert_eq!(c.position(), 8);
    }

    #[test]
    fn failed_read_does_not_move_cursor() {
        let buf = [1, 0, 2];
        let mut c = WordCursor::new(&buf);
        c.read_word().unwrap();
        assert!(c.read_long().is_err());
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn read_bytes_bounds() {
        let buf = b"abcdef";
        let mut c = WordCursor::new(buf);
        assert_eq!(c.read_bytes(4).unwrap(), b"abcd");
        assert!(c.read_bytes(3).is_err());
        assert_eq!(c.read_bytes(2).unwrap(), b"ef");
    }

    #[test]
    fn seek_to_end_allowed_past_end_rejected() {
        let buf = [0u8; 4];
        let mut c = WordCursor::new(&buf);
        c.seek(4).unwrap();
        assert!(c.is_empty());
        assert!(c.seek(5).is_err());
    }

    #[test]
    fn swap_word_bytes_even_and_odd() {
        assert_eq!(swap_word_bytes(b"eHll"), b"Hell".to_vec());
        assert_eq!(swap_word_bytes(b"abc"), vec![b'b', b'a', 0, b'c']);
        assert!(swap_word_bytes(b"").is_empty());
    }
}
