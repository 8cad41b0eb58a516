//! Wire format: a big-endian `u32` payload length, then a JSON array of
//! `[name, value]` pairs. Records concatenate directly on the FIFO.

use crate::constants::MAX_RECORD_LEN;
use crate::error::{Result, XtbugError};
use crate::snapshot::Snapshot;
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::{self, ErrorKind, Read, Write};
use tracing::warn;

/// One complete record for `snapshot`: length header and payload, ready
/// to go out in a single write.
pub fn encode_record(snapshot: &Snapshot) -> io::Result<Vec<u8>> {
    let payload = serde_json::to_vec(snapshot).map_err(|e| io::Error::new(ErrorKind::Other, e))?;
    if payload.len() > MAX_RECORD_LEN {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!("record of {} bytes exceeds limit", payload.len()),
        ));
    }
    let mut record = Vec::with_capacity(4 + payload.len());
    record.write_u32::<BigEndian>(payload.len() as u32)?;
    record.write_all(&payload)?;
    Ok(record)
}

/// What the decoder found at the next record boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Snapshot(Snapshot),
    /// Writer closed; nothing more will arrive.
    EndOfStream,
    /// The underlying reader was cancelled while waiting.
    Interrupted,
}

/// Pulls records off a byte stream one at a time.
///
/// A reader signals cancellation by failing with
/// [`ErrorKind::ConnectionAborted`]; see [`crate::transport::Interruptible`].
pub struct Decoder<R> {
    reader: R,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Block until the next record, end of stream, or cancellation.
    pub fn next_record(&mut self) -> Result<Decoded> {
        let mut header = [0u8; 4];
        match read_full(&mut self.reader, &mut header) {
            Ok(0) => return Ok(Decoded::EndOfStream),
            Ok(n) if n < header.len() => {
                warn!(bytes = n, "stream ended inside a record header");
                return Ok(Decoded::EndOfStream);
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::ConnectionAborted => return Ok(Decoded::Interrupted),
            Err(e) => return Err(e.into()),
        }

        let len = BigEndian::read_u32(&header) as usize;
        if len > MAX_RECORD_LEN {
            return Err(XtbugError::MalformedRecord(format!(
                "declared length {len} exceeds {MAX_RECORD_LEN}"
            )));
        }

        let mut payload = vec![0u8; len];
        match read_full(&mut self.reader, &mut payload) {
            Ok(n) if n < len => {
                warn!(expected = len, got = n, "stream ended inside a record");
                return Ok(Decoded::EndOfStream);
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::ConnectionAborted => return Ok(Decoded::Interrupted),
            Err(e) => return Err(e.into()),
        }

        let snapshot: Snapshot = serde_json::from_slice(&payload)
            .map_err(|e| XtbugError::MalformedRecord(e.to_string()))?;
        Ok(Decoded::Snapshot(snapshot))
    }
}

/// Fill `buf` unless the stream ends first; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode_all(bytes: Vec<u8>) -> Vec<Decoded> {
        let mut decoder = Decoder::new(Cursor::new(bytes));
        let mut out = Vec::new();
        loop {
            let next = decoder.next_record().unwrap();
            let done = next == Decoded::EndOfStream;
            out.push(next);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn header_is_big_endian_length() {
        let snap: Snapshot = vec![("a", "1")].into_iter().collect();
        let record = encode_record(&snap).unwrap();
        let payload = br#"[["a","1"]]"#;
        assert_eq!(&record[..4], &(payload.len() as u32).to_be_bytes());
        assert_eq!(&record[4..], payload);
    }

    #[test]
    fn oversized_snapshot_is_not_encoded() {
        let snap = Snapshot::new().with("big", &"x".repeat(MAX_RECORD_LEN));
        let err = encode_record(&snap).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn records_decode_back_to_back() {
        let first: Snapshot = vec![("a", "1"), ("b", "2")].into_iter().collect();
        let second: Snapshot = vec![("a", "3")].into_iter().collect();
        let mut stream = encode_record(&first).unwrap();
        stream.extend(encode_record(&second).unwrap());

        assert_eq!(
            decode_all(stream),
            vec![
                Decoded::Snapshot(first),
                Decoded::Snapshot(second),
                Decoded::EndOfStream
            ]
        );
    }

    #[test]
    fn empty_and_unicode_strings_survive() {
        let snap: Snapshot = vec![("", ""), ("π", "naïve\n  ✓ 日本"), ("q", "\"quoted\"")]
            .into_iter()
            .collect();
        let record = encode_record(&snap).unwrap();
        let decoded = decode_all(record.clone());
        assert_eq!(decoded[0], Decoded::Snapshot(snap.clone()));
        assert_eq!(encode_record(&snap).unwrap(), record);
    }

    #[test]
    fn empty_stream_is_a_clean_close() {
        assert_eq!(decode_all(Vec::new()), vec![Decoded::EndOfStream]);
    }

    #[test]
    fn torn_trailing_record_ends_stream() {
        let snap: Snapshot = vec![("name", "value")].into_iter().collect();
        let mut stream = encode_record(&snap).unwrap();
        let full = encode_record(&snap).unwrap();
        stream.extend_from_slice(&full[..full.len() - 3]);

        assert_eq!(
            decode_all(stream),
            vec![Decoded::Snapshot(snap), Decoded::EndOfStream]
        );
    }

    #[test]
    fn garbage_payload_is_malformed() {
        let mut stream = 5u32.to_be_bytes().to_vec();
        stream.extend_from_slice(b"nope!");
        let err = Decoder::new(Cursor::new(stream)).next_record().unwrap_err();
        assert!(matches!(err, XtbugError::MalformedRecord(_)));
    }

    #[test]
    fn oversized_length_is_malformed() {
        let stream = u32::MAX.to_be_bytes().to_vec();
        let err = Decoder::new(Cursor::new(stream)).next_record().unwrap_err();
        assert!(matches!(err, XtbugError::MalformedRecord(_)));
    }

    #[test]
    fn aborted_read_reports_interrupt() {
        struct Aborted;
        impl Read for Aborted {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(ErrorKind::ConnectionAborted, "stop"))
            }
        }
        let next = Decoder::new(Aborted).next_record().unwrap();
        assert_eq!(next, Decoded::Interrupted);
    }
}
