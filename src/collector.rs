//! Single-pass statistics collectors driven by the stream decoder.

use crate::node::{NodeData, ValueType};
use crate::storage::Storage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Marker prefix carried by every binary property value.
const BLOB_ID_PREFIX: &str = ":blobId:";
/// After the marker, this prefix means the payload is embedded inline as hex.
/// Anything else is an out-of-line reference.
const INLINE_HEX_PREFIX: &str = "0x";
/// Path element past which deeper structure is not attributed.
const CONTENT_NODE_NAME: &str = "jcr:content";
/// Totals must strictly exceed this to appear in the report.
const REPORT_THRESHOLD: u64 = 1_000_000;

/// A single-pass consumer of decoded node records.
///
/// `add` sees each record exactly once, in stream order, with no lookback;
/// anything the collector needs must be extracted before the call returns.
/// `end` is called exactly once after the last record; no `add` is valid
/// afterwards. Calls must be strictly sequential.
pub trait StatsCollector {
    fn add(&mut self, node: &NodeData);
    fn end(&mut self);
}

/// Collects the total embedded binary size per path prefix, approximately.
///
/// Sub-resolution contributions at depth two and beyond are randomly rounded:
/// most are dropped, a proportional minority register as a full
/// resolution-sized step, so the expected total matches the true total while
/// the number of nonzero deep-path entries stays bounded. The draw comes from
/// a seeded generator (seed 1 unless overridden) so runs are reproducible.
pub struct BinarySizeEmbedded {
    storage: Storage,
    resolution: u64,
    rng: StdRng,
}

impl BinarySizeEmbedded {
    /// Bucket width `resolution` controls the exactness/cardinality
    /// trade-off. Must be at least 1.
    pub fn new(resolution: u64) -> Self {
        Self::with_seed(resolution, 1)
    }

    pub fn with_seed(resolution: u64, seed: u64) -> Self {
        assert!(resolution >= 1, "resolution must be at least 1");
        BinarySizeEmbedded {
            storage: Storage::new(),
            resolution,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Embedded binary size of one node. Where a node carries several
    /// embedded values, the last examined value wins; sizes are not summed.
    /// Reference values and values that fail to parse as hex contribute
    /// nothing, and never abort the scan.
    fn embedded_size(node: &NodeData) -> u64 {
        let mut size = 0;
        for p in &node.properties {
            if p.value_type != ValueType::Binary {
                continue;
            }
            for v in p.values.iter().flatten() {
                let Some(v) = v.strip_prefix(BLOB_ID_PREFIX) else {
                    continue;
                };
                if let Some(hex) = v.strip_prefix(INLINE_HEX_PREFIX) {
                    if let Some(n) = decoded_hex_len(hex) {
                        size = n;
                    }
                }
            }
        }
        size
    }

    /// Report lines for every key whose total exceeds the threshold, in
    /// insertion order, scaled to mega-units.
    pub fn records(&self) -> Vec<String> {
        self.storage
            .entries()
            .filter(|&(_, total)| total > REPORT_THRESHOLD)
            .map(|(key, total)| format!("{}: {}", key, total / REPORT_THRESHOLD))
            .collect()
    }

    /// The raw accumulator, for diagnostics and tests.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl StatsCollector for BinarySizeEmbedded {
    fn add(&mut self, node: &NodeData) {
        let size = Self::embedded_size(node);
        if size == 0 {
            return;
        }
        self.storage.add("/", size);
        let mut key = String::new();
        for (i, element) in node.path_elements.iter().enumerate() {
            key.push('/');
            key.push_str(element);
            if element == CONTENT_NODE_NAME {
                break;
            }
            if i < 2 || size >= self.resolution {
                // The handful of top-level roots, and any value at least one
                // bucket wide, are worth exact accounting.
                self.storage.add(&key, size);
            } else if self.rng.gen_range(0..self.resolution) < size {
                self.storage.add(&key, self.resolution);
            }
        }
    }

    fn end(&mut self) {}
}

fn decoded_hex_len(hex: &str) -> Option<u64> {
    if hex.is_empty() || hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(hex.len() as u64 / 2)
}

impl fmt::Display for BinarySizeEmbedded {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "BinarySizeEmbedded (MB)")?;
        for line in self.records() {
            writeln!(f, "{}", line)?;
        }
        write!(f, "{}", self.storage)
    }
}
