//! Netstring framing.
//!
//! Each frame is an ASCII decimal length, a `:` delimiter, exactly that many
//! payload bytes, and a `,` terminator:
//!
//! ```text
//! 12:hello world!,
//! ```
//!
//! Decoding reads the length prefix one byte at a time and then exactly
//! `length + 1` bytes, so it never consumes anything past the terminator.
//! That keeps it safe to run directly on an unbuffered socket.

use crate::config::NetstringConfig;
use crate::error::FramingError;
use std::io::{ErrorKind, Read, Write};

/// Encode a payload as a netstring.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let len = payload.len().to_string();
    let mut buf = Vec::with_capacity(len.len() + payload.len() + 2);
    buf.extend_from_slice(len.as_bytes());
    buf.push(NetstringConfig::DELIMITER);
    buf.extend_from_slice(payload);
    buf.push(NetstringConfig::TERMINATOR);
    buf
}

/// Write one netstring frame, looping until every byte is accepted.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> std::io::Result<()> {
    writer.write_all(&encode(payload))?;
    writer.flush()
}

/// Decode one netstring frame using the default size limit.
pub fn decode<R: Read>(reader: &mut R) -> Result<Vec<u8>, FramingError> {
    decode_with_limit(reader, NetstringConfig::MAX_FRAME_SIZE)
}

/// Decode one netstring frame, rejecting declared lengths above `max_len`.
pub fn decode_with_limit<R: Read>(reader: &mut R, max_len: usize) -> Result<Vec<u8>, FramingError> {
    let length = read_length(reader)?;
    // Payload plus terminator.
    let expected = match length.checked_add(1) {
        Some(expected) if length <= max_len => expected,
        _ => {
            return Err(FramingError::TooLarge {
                length,
                max: max_len,
            })
        }
    };
    let mut buf = vec![0u8; expected];
    let received = read_full(reader, &mut buf)?;
    if received < expected {
        return Err(FramingError::Truncated { expected, received });
    }

    let terminator = buf[length];
    if terminator != NetstringConfig::TERMINATOR {
        return Err(FramingError::MissingTerminator {
            found: char::from(terminator),
        });
    }
    buf.truncate(length);
    Ok(buf)
}

fn read_length<R: Read>(reader: &mut R) -> Result<usize, FramingError> {
    let mut digits = Vec::new();
    loop {
        let byte = match read_byte(reader)? {
            Some(b) => b,
            None if digits.is_empty() => return Err(FramingError::ConnectionClosed),
            None => {
                return Err(FramingError::Truncated {
                    expected: digits.len() + 1,
                    received: digits.len(),
                })
            }
        };

        if byte == NetstringConfig::DELIMITER {
            break;
        }
        digits.push(byte);
        if !byte.is_ascii_digit() || digits.len() > NetstringConfig::MAX_LENGTH_DIGITS {
            return Err(invalid_length(&digits));
        }
    }

    if digits.is_empty() {
        return Err(invalid_length(&digits));
    }

    // Digits are ASCII so this is valid UTF-8; parse can still overflow.
    std::str::from_utf8(&digits)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| invalid_length(&digits))
}

fn invalid_length(digits: &[u8]) -> FramingError {
    FramingError::InvalidLength {
        prefix: String::from_utf8_lossy(digits).into_owned(),
    }
}

fn read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>, FramingError> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(FramingError::Io(e)),
        }
    }
}

/// Like `read_exact`, but reports how many bytes arrived before EOF.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, FramingError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(FramingError::Io(e)),
        }
    }
    Ok(filled)
}
