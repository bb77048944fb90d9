//! Streaming decoder: turns a byte source into a lazy, forward-only sequence
//! of [`NodeData`] records.

use crate::dict::DecodeDict;
use crate::error::{Error, Result};
use crate::node::{NodeData, NodeProperty, ValueType};
use crate::varint;
use byteorder::ReadBytesExt;
use lz4_flex::frame::FrameDecoder;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

const PROGRESS_INTERVAL: u64 = 1_000_000;

/// A single decoding session over a byte source.
///
/// The session exclusively owns its source, its dictionary window and its
/// scratch buffer; `read_node` calls must be strictly sequential. Records
/// are produced one pull at a time and are never revisited.
pub struct NodeStreamReader<R> {
    input: R,
    file_size: u64,
    dict: DecodeDict,
    buffer: Vec<u8>,
    count: u64,
}

/// Byte source behind a path-based session: either the raw file or an LZ4
/// frame unwrapped on the fly.
pub struct Source(SourceInner);

enum SourceInner {
    Plain(BufReader<File>),
    Lz4(FrameDecoder<BufReader<File>>),
}

impl Read for Source {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.0 {
            SourceInner::Plain(ref mut r) => r.read(buf),
            SourceInner::Lz4(ref mut r) => r.read(buf),
        }
    }
}

impl NodeStreamReader<Source> {
    /// Open a dump file for decoding. A `.lz4` suffix selects transparent
    /// LZ4 frame unwrapping before the record grammar applies.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_size = std::fs::metadata(path)?.len();
        let file = BufReader::new(File::open(path)?);
        let source = if path.extension().map_or(false, |ext| ext == "lz4") {
            Source(SourceInner::Lz4(FrameDecoder::new(file)))
        } else {
            Source(SourceInner::Plain(file))
        };
        Ok(Self::with_file_size(source, file_size))
    }
}

impl<R: Read> NodeStreamReader<R> {
    pub fn new(input: R) -> Self {
        Self::with_file_size(input, 0)
    }

    fn with_file_size(input: R, file_size: u64) -> Self {
        NodeStreamReader {
            input,
            file_size,
            dict: DecodeDict::new(),
            buffer: Vec::new(),
            count: 0,
        }
    }

    /// Total byte length of the underlying source, before any unwrapping.
    /// Diagnostic only; zero for sources without a known length.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Number of records decoded so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Pull the next record. `Ok(None)` is the normal end of the sequence:
    /// the source was cleanly exhausted at a record boundary. End of stream
    /// anywhere inside a record is an error.
    pub fn read_node(&mut self) -> Result<Option<NodeData>> {
        let element_count = match self.input.read_u8() {
            Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
            Ok(b) if b & 0x80 == 0 => b as u32,
            Ok(b) => varint::read_u32_rest(&mut self.input, b)?,
        };
        self.count += 1;
        if self.count % PROGRESS_INTERVAL == 0 {
            tracing::debug!(records = self.count, "decoded records");
        }
        let mut path_elements = Vec::with_capacity(element_count as usize);
        for _ in 0..element_count {
            let element = self
                .read_string()?
                .ok_or(Error::BadFormat("null path element"))?;
            path_elements.push(element);
        }
        let property_count = varint::read_u32(&mut self.input)?;
        let mut properties = Vec::with_capacity(property_count as usize);
        for _ in 0..property_count {
            let name = self
                .read_string()?
                .ok_or(Error::BadFormat("null property name"))?;
            let ordinal = self.input.read_u8()?;
            let value_type = ValueType::try_from(ordinal).map_err(Error::BadValueType)?;
            let multi_valued = self.input.read_u8()? == 1;
            let values = if multi_valued {
                let value_count = varint::read_u32(&mut self.input)?;
                let mut values = Vec::with_capacity(value_count as usize);
                for _ in 0..value_count {
                    values.push(self.read_string()?);
                }
                values
            } else {
                vec![self.read_string()?]
            };
            properties.push(NodeProperty {
                name,
                value_type,
                multi_valued,
                values,
            });
        }
        Ok(Some(NodeData::new(path_elements, properties)))
    }

    /// Decode one length-coded string. `None` is the null value, distinct
    /// from the empty string.
    pub(crate) fn read_string(&mut self) -> Result<Option<String>> {
        let code = varint::read_u32(&mut self.input)?;
        match code {
            0 => Ok(None),
            1 => Ok(Some(String::new())),
            c if c & 1 == 1 => {
                let offset = (c >> 1) as u64;
                Ok(Some(self.dict.resolve(offset)?))
            }
            c => {
                let len = (c >> 1) as usize;
                self.read_literal(len)?;
                let s = String::from_utf8(self.buffer[..len].to_vec())?;
                self.dict.cache(&s);
                Ok(Some(s))
            }
        }
    }

    /// Fill the scratch buffer with exactly `len` literal bytes, growing it
    /// to fit the longest literal seen in this session.
    fn read_literal(&mut self, len: usize) -> Result<()> {
        if self.buffer.len() < len {
            self.buffer.resize(len, 0);
        }
        let mut filled = 0;
        while filled < len {
            match self.input.read(&mut self.buffer[filled..len]) {
                Ok(0) => {
                    return Err(Error::Truncated {
                        expected: len,
                        actual: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl<R: Read> Iterator for NodeStreamReader<R> {
    type Item = Result<NodeData>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_node().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint::write_u32;

    #[test]
    fn empty_source_is_end_of_stream() {
        let mut reader = NodeStreamReader::new(&[][..]);
        assert!(reader.read_node().unwrap().is_none());
        // UFCS: `reader.count()` would resolve to `Iterator::count`.
        assert_eq!(NodeStreamReader::count(&reader), 0);
    }

    #[test]
    fn minimal_record() {
        // No path elements, no properties.
        let buf = [0u8, 0u8];
        let mut reader = NodeStreamReader::new(&buf[..]);
        let node = reader.read_node().unwrap().unwrap();
        assert!(node.path_elements.is_empty());
        assert!(node.properties.is_empty());
        assert!(reader.read_node().unwrap().is_none());
        // UFCS: `reader.count()` would resolve to `Iterator::count`.
        assert_eq!(NodeStreamReader::count(&reader), 1);
    }

    #[test]
    fn truncated_literal_reports_lengths() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 1).unwrap(); // one path element
        write_u32(&mut buf, 5 << 1).unwrap(); // literal of 5 bytes...
        buf.extend_from_slice(b"abc"); // ...but only 3 present
        let mut reader = NodeStreamReader::new(&buf[..]);
        match reader.read_node() {
            Err(Error::Truncated { expected, actual }) => {
                assert_eq!(expected, 5);
                assert_eq!(actual, 3);
            }
            other => panic!("expected truncation error, got {:?}", other),
        }
    }

    #[test]
    fn mid_record_eof_is_not_a_sentinel() {
        // Element count present, then the stream ends.
        let buf = [2u8];
        let mut reader = NodeStreamReader::new(&buf[..]);
        assert!(matches!(reader.read_node(), Err(Error::Io(_))));
    }

    #[test]
    fn unknown_value_type_ordinal_fails() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0).unwrap(); // no path elements
        write_u32(&mut buf, 1).unwrap(); // one property
        write_u32(&mut buf, 1 << 1).unwrap(); // name: literal "n"
        buf.extend_from_slice(b"n");
        buf.push(200); // ordinal outside the enumeration
        buf.push(0);
        write_u32(&mut buf, 1).unwrap(); // value: empty string
        let mut reader = NodeStreamReader::new(&buf[..]);
        assert!(matches!(
            reader.read_node(),
            Err(Error::BadValueType(200))
        ));
    }

    #[test]
    fn unpopulated_backref_fails() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 1).unwrap(); // one path element
        write_u32(&mut buf, (1 << 1) | 1).unwrap(); // back-reference, offset 1
        let mut reader = NodeStreamReader::new(&buf[..]);
        assert!(matches!(
            reader.read_node(),
            Err(Error::BadBackRef { offset: 1 })
        ));
    }

    #[test]
    fn null_path_element_is_rejected() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 1).unwrap(); // one path element
        write_u32(&mut buf, 0).unwrap(); // null
        let mut reader = NodeStreamReader::new(&buf[..]);
        assert!(matches!(reader.read_node(), Err(Error::BadFormat(_))));
    }

    #[test]
    fn invalid_utf8_literal_is_rejected() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 1).unwrap();
        write_u32(&mut buf, 2 << 1).unwrap();
        buf.extend_from_slice(&[0xff, 0xfe]);
        let mut reader = NodeStreamReader::new(&buf[..]);
        assert!(matches!(reader.read_node(), Err(Error::BadString(_))));
    }
}
