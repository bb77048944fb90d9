//! Streaming encoder: the mirror image of [`crate::decode`]. It maintains a
//! dictionary window identical to the decoder's, so every offset it emits
//! resolves to the same string on the other side.

use crate::dict::EncodeDict;
use crate::error::{Error, Result};
use crate::node::NodeData;
use crate::varint;
use crate::MAX_CACHED_STRING_LEN;
use byteorder::WriteBytesExt;
use lz4_flex::frame::FrameEncoder;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// A single encoding session over a byte sink.
pub struct NodeStreamWriter<W> {
    out: W,
    dict: EncodeDict,
}

/// Byte sink behind a path-based session: either the raw file or an LZ4
/// frame, finalized by [`NodeStreamWriter::finish`].
pub struct Sink(SinkInner);

enum SinkInner {
    Plain(BufWriter<File>),
    Lz4(FrameEncoder<BufWriter<File>>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0 {
            SinkInner::Plain(ref mut w) => w.write(buf),
            SinkInner::Lz4(ref mut w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0 {
            SinkInner::Plain(ref mut w) => w.flush(),
            SinkInner::Lz4(ref mut w) => w.flush(),
        }
    }
}

impl NodeStreamWriter<Sink> {
    /// Create a dump file. A `.lz4` suffix selects LZ4 frame compression,
    /// matching what [`crate::NodeStreamReader::open`] expects.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        let sink = if path.extension().map_or(false, |ext| ext == "lz4") {
            Sink(SinkInner::Lz4(FrameEncoder::new(file)))
        } else {
            Sink(SinkInner::Plain(file))
        };
        Ok(Self::new(sink))
    }

    /// Flush the sink and, for compressed output, finalize the LZ4 frame.
    /// Dropping the writer without calling this loses buffered data.
    pub fn finish(self) -> Result<()> {
        match self.out.0 {
            SinkInner::Plain(mut w) => w.flush()?,
            SinkInner::Lz4(enc) => {
                let mut inner = enc
                    .finish()
                    .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e)))?;
                inner.flush()?;
            }
        }
        Ok(())
    }
}

impl<W: Write> NodeStreamWriter<W> {
    pub fn new(out: W) -> Self {
        NodeStreamWriter {
            out,
            dict: EncodeDict::new(),
        }
    }

    pub fn write_node(&mut self, node: &NodeData) -> Result<()> {
        varint::write_u32(&mut self.out, node.path_elements.len() as u32)?;
        for element in &node.path_elements {
            self.write_string(Some(element))?;
        }
        varint::write_u32(&mut self.out, node.properties.len() as u32)?;
        for p in &node.properties {
            self.write_string(Some(&p.name))?;
            self.out.write_u8(p.value_type.into())?;
            self.out.write_u8(p.multi_valued as u8)?;
            if p.multi_valued {
                varint::write_u32(&mut self.out, p.values.len() as u32)?;
                for v in &p.values {
                    self.write_string(v.as_deref())?;
                }
            } else {
                if p.values.len() != 1 {
                    return Err(Error::BadEncode(
                        "single-valued property must carry exactly one value",
                    ));
                }
                self.write_string(p.values[0].as_deref())?;
            }
        }
        Ok(())
    }

    /// Encode one string. Null and empty take a lone length code; a string
    /// still inside the window becomes a back-reference; everything else is
    /// a literal, cached when shorter than the caching threshold.
    pub(crate) fn write_string(&mut self, s: Option<&str>) -> Result<()> {
        let Some(s) = s else {
            varint::write_u32(&mut self.out, 0)?;
            return Ok(());
        };
        if s.is_empty() {
            varint::write_u32(&mut self.out, 1)?;
            return Ok(());
        }
        if let Some(offset) = self.dict.offset_of(s) {
            varint::write_u32(&mut self.out, ((offset as u32) << 1) | 1)?;
            self.dict.touch(s);
            return Ok(());
        }
        let bytes = s.as_bytes();
        varint::write_u32(&mut self.out, (bytes.len() as u32) << 1)?;
        self.out.write_all(bytes)?;
        if s.chars().count() < MAX_CACHED_STRING_LEN {
            self.dict.touch(s);
        }
        Ok(())
    }

    /// Hand back the underlying sink. The caller is responsible for any
    /// flushing the sink still needs.
    pub fn into_inner(self) -> W {
        self.out
    }
}
