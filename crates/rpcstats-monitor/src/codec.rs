//! Versioned binary encoding of [`TraceRecord`].
//!
//! Layout (big-endian):
//!
//! ```text
//! "RPCS" | version: u8 | ncalls: u32 | { name | cost: f64 | nanos: u64 }*
//!        | nheader: u32 | { key | value }*
//! ```
//!
//! Strings are a `u32` byte length followed by UTF-8. Header entries are
//! written in key order and trailing bytes are rejected. A string or list
//! whose length does not fit in a `u32` cannot be encoded.

use crate::trace::{CallEvent, TraceRecord};
use bytes::{Buf, BufMut, BytesMut};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

pub const MAGIC: &[u8; 4] = b"RPCS";
pub const VERSION: u8 = 1;

/// Errors from encoding a trace record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{field} too long to encode: {len}")]
    TooLong { field: &'static str, len: usize },
}

/// Errors from decoding a trace record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    #[error("truncated {field}: need {needed} bytes, {remaining} left")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),
    #[error("duplicate header {0:?}")]
    DuplicateHeader(String),
    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
}

/// Encodes a record in the current format version.
pub fn encode(record: &TraceRecord) -> Result<Vec<u8>, EncodeError> {
    let mut buf = BytesMut::with_capacity(64 + record.calls.len() * 32);
    buf.put_slice(MAGIC);
    buf.put_u8(VERSION);

    buf.put_u32(len_u32(record.calls.len(), "call count")?);
    for call in &record.calls {
        put_str(&mut buf, &call.name, "call name")?;
        buf.put_f64(call.cost);
        buf.put_u64(u64::try_from(call.duration.as_nanos()).unwrap_or(u64::MAX));
    }

    buf.put_u32(len_u32(record.header.len(), "header count")?);
    for (key, value) in &record.header {
        put_str(&mut buf, key, "header key")?;
        put_str(&mut buf, value, "header value")?;
    }

    Ok(buf.to_vec())
}

/// Decodes a record, rejecting anything that is not exactly one valid record.
pub fn decode(mut input: &[u8]) -> Result<TraceRecord, DecodeError> {
    let buf = &mut input;

    ensure(buf, MAGIC.len(), "magic")?;
    if &buf[..MAGIC.len()] != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    buf.advance(MAGIC.len());

    ensure(buf, 1, "version")?;
    let version = buf.get_u8();
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    ensure(buf, 4, "call count")?;
    let ncalls = buf.get_u32() as usize;
    // Each call needs at least a length prefix, a cost and a duration.
    ensure(buf, ncalls.saturating_mul(4 + 8 + 8), "calls")?;
    let mut calls = Vec::with_capacity(ncalls);
    for _ in 0..ncalls {
        let name = get_str(buf, "call name")?;
        ensure(buf, 16, "call body")?;
        let cost = buf.get_f64();
        let duration = Duration::from_nanos(buf.get_u64());
        calls.push(CallEvent {
            name,
            cost,
            duration,
        });
    }

    ensure(buf, 4, "header count")?;
    let nheader = buf.get_u32() as usize;
    ensure(buf, nheader.saturating_mul(8), "header")?;
    let mut header = BTreeMap::new();
    for _ in 0..nheader {
        let key = get_str(buf, "header key")?;
        let value = get_str(buf, "header value")?;
        if header.contains_key(&key) {
            return Err(DecodeError::DuplicateHeader(key));
        }
        header.insert(key, value);
    }

    if buf.has_remaining() {
        return Err(DecodeError::TrailingBytes(buf.remaining()));
    }

    Ok(TraceRecord { header, calls })
}

fn len_u32(len: usize, field: &'static str) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::TooLong { field, len })
}

fn put_str(buf: &mut BytesMut, s: &str, field: &'static str) -> Result<(), EncodeError> {
    buf.put_u32(len_u32(s.len(), field)?);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn get_str(buf: &mut &[u8], field: &'static str) -> Result<String, DecodeError> {
    ensure(buf, 4, field)?;
    let len = buf.get_u32() as usize;
    ensure(buf, len, field)?;
    let s = std::str::from_utf8(&buf[..len])
        .map_err(|_| DecodeError::InvalidUtf8(field))?
        .to_string();
    buf.advance(len);
    Ok(s)
}

fn ensure(buf: &&[u8], needed: usize, field: &'static str) -> Result<(), DecodeError> {
    if buf.remaining() < needed {
        return Err(DecodeError::Truncated {
            field,
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}
