//! Variable-length u32 codec: little-endian 7-bit groups, bit 7 of each of
//! the first four bytes is a continuation flag. A fifth byte, when present,
//! carries bits 28-31 directly with no flag, since the domain is 32 bits.
//!
//! The bit arrangement is a wire contract shared with every existing dump;
//! round-tripping the value through a different scheme is not enough.

use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io;
use std::io::{Read, Write};

/// Write `v` using the minimal number of 7-bit groups (1-5 bytes).
pub fn write_u32<W: Write>(out: &mut W, mut v: u32) -> io::Result<()> {
    while v >= 0x80 {
        out.write_u8((v as u8 & 0x7f) | 0x80)?;
        v >>= 7;
    }
    out.write_u8(v as u8)
}

/// Read a variable-size u32.
pub fn read_u32<R: Read>(input: &mut R) -> io::Result<u32> {
    let b = input.read_u8()?;
    if b & 0x80 == 0 {
        return Ok(b as u32);
    }
    read_u32_rest(input, b)
}

/// Continue a read whose first byte `b0` (continuation bit set) has already
/// been consumed. Split out so callers can treat end-of-stream on the first
/// byte differently from a truncation in the middle of a group.
pub(crate) fn read_u32_rest<R: Read>(input: &mut R, b0: u8) -> io::Result<u32> {
    let mut x = (b0 & 0x7f) as u32;
    let b = input.read_u8()?;
    if b & 0x80 == 0 {
        return Ok(x | (b as u32) << 7);
    }
    x |= ((b & 0x7f) as u32) << 7;
    let b = input.read_u8()?;
    if b & 0x80 == 0 {
        return Ok(x | (b as u32) << 14);
    }
    x |= ((b & 0x7f) as u32) << 14;
    let b = input.read_u8()?;
    if b & 0x80 == 0 {
        return Ok(x | (b as u32) << 21);
    }
    x |= ((b & 0x7f) as u32) << 21;
    // Fifth byte: bits 28-31, no continuation flag to strip.
    let b = input.read_u8()?;
    Ok(x | (b as u32) << 28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(v: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_u32(&mut buf, v).unwrap();
        let got = read_u32(&mut &buf[..]).unwrap();
        assert_eq!(v, got, "u32 should round-trip");
        buf
    }

    #[test]
    fn encode_decode_group_boundaries() {
        for s in 0..32 {
            round_trip(1u32 << s);
            round_trip((1u32 << s) - 1);
            round_trip((1u32 << s) + 1);
        }
        round_trip(u32::MAX);
    }

    #[test]
    fn minimal_group_count() {
        assert_eq!(round_trip(0).len(), 1);
        assert_eq!(round_trip(127).len(), 1);
        assert_eq!(round_trip(128).len(), 2);
        assert_eq!(round_trip((1 << 14) - 1).len(), 2);
        assert_eq!(round_trip(1 << 14).len(), 3);
        assert_eq!(round_trip((1 << 21) - 1).len(), 3);
        assert_eq!(round_trip(1 << 21).len(), 4);
        assert_eq!(round_trip((1 << 28) - 1).len(), 4);
        assert_eq!(round_trip(1 << 28).len(), 5);
        assert_eq!(round_trip(u32::MAX).len(), 5);
    }

    #[test]
    fn exact_wire_bytes() {
        assert_eq!(round_trip(0), [0x00]);
        assert_eq!(round_trip(300), [0xac, 0x02]);
        assert_eq!(round_trip((1 << 21) - 1), [0xff, 0xff, 0x7f]);
        assert_eq!(round_trip(1 << 28), [0x80, 0x80, 0x80, 0x80, 0x01]);
        assert_eq!(round_trip(u32::MAX), [0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    #[test]
    fn truncated_group_is_an_error() {
        // Continuation bit promises more bytes than the source holds.
        let buf = [0x80u8];
        assert!(read_u32(&mut &buf[..]).is_err());
    }
}
