//! Streaming analysis of very large content-repository node dumps.
//!
//! A dump is a flat sequence of node records in a compact binary format:
//! variable-length integers for all counts, and a deterministic
//! sliding-window dictionary that turns repeated short strings (path
//! segments, property names, common values) into one-or-two-byte
//! back-references. [`NodeStreamReader`] decodes such a stream one record at
//! a time; [`NodeStreamWriter`] produces one, maintaining the identical
//! window so offsets agree bit-for-bit. An optional LZ4 frame around the
//! whole stream is unwrapped transparently, selected by a `.lz4` file-name
//! suffix.
//!
//! On top of the decoder sit single-pass [`StatsCollector`]s. The stream is
//! pulled once, each record is offered to every collector, and `end()`
//! finalizes them — no per-node or per-path state proportional to the
//! repository survives the pass. [`BinarySizeEmbedded`] is the concrete
//! collector here: it attributes embedded binary payload bytes to path
//! prefixes, exactly near the root and by randomized rounding deeper down,
//! trading exactness below a configurable resolution for bounded memory.
//!
//! ```no_run
//! use nodestats::{BinarySizeEmbedded, NodeStreamReader, StatsCollector};
//!
//! # fn main() -> nodestats::Result<()> {
//! let mut reader = NodeStreamReader::open("repo-dump.bin.lz4")?;
//! let mut sizes = BinarySizeEmbedded::new(4096);
//! while let Some(node) = reader.read_node()? {
//!     sizes.add(&node);
//! }
//! sizes.end();
//! for line in sizes.records() {
//!     println!("{}", line);
//! }
//! # Ok(())
//! # }
//! ```

mod collector;
mod decode;
mod dict;
mod encode;
mod error;
mod hash;
mod node;
mod storage;
mod varint;

pub use self::collector::{BinarySizeEmbedded, StatsCollector};
pub use self::decode::{NodeStreamReader, Source};
pub use self::encode::{NodeStreamWriter, Sink};
pub use self::error::{Error, Result};
pub use self::hash::{hash64, hash64_default};
pub use self::node::{NodeData, NodeProperty, ValueType};
pub use self::storage::Storage;

/// Capacity of the string dictionary window, and therefore the maximum
/// back-reference distance. A power of two; slots are indexed by bitmask.
pub const STRING_WINDOW_SIZE: usize = 1024;

/// Strings of this many characters or more are never cached in the window.
pub const MAX_CACHED_STRING_LEN: usize = 1024;
