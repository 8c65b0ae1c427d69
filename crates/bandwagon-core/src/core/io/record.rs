use crate::core::models::topology::Topology;
use rand::Rng;
use std::collections::BTreeMap;

pub const UNNAMED_RECORD_ID: &str = "unnamed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

/// An annotated region of a record, in 0-based half-open coordinates.
///
/// A negative `start` marks a feature spanning the origin of a circular
/// record: it covers `[len + start, len)` followed by `[0, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub kind: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub qualifiers: BTreeMap<String, String>,
}

impl Feature {
    pub fn new(kind: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            kind: kind.into(),
            start,
            end,
            strand: Strand::Forward,
            qualifiers: BTreeMap::new(),
        }
    }

    pub fn with_qualifier(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.qualifiers.insert(key.into(), value.into());
        self
    }

    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers.get(key).map(String::as_str)
    }

    /// Display name: the `label` qualifier, else `gene`, `product` or `note`.
    pub fn label(&self) -> Option<&str> {
        ["label", "gene", "product", "note"]
            .iter()
            .find_map(|key| self.qualifier(key))
    }

    pub fn len(&self) -> u64 {
        self.start.abs_diff(self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn wraps_origin(&self) -> bool {
        self.start < 0
    }
}

/// A DNA sequence with its annotations, as read from a FASTA or GenBank file.
#[derive(Debug, Clone, PartialEq)]
pub struct SeqRecord {
    pub id: String,
    pub description: Option<String>,
    /// Uppercase bases.
    pub sequence: String,
    pub topology: Option<Topology>,
    pub features: Vec<Feature>,
}

impl SeqRecord {
    pub fn new(id: impl Into<String>, sequence: &str) -> Self {
        Self {
            id: id.into(),
            description: None,
            sequence: sequence.to_ascii_uppercase(),
            topology: None,
            features: Vec::new(),
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn is_linear(&self, default: bool) -> bool {
        record_is_linear(self, default)
    }
}

/// Whether the record is annotated as linear; `default` applies when the
/// record carries no topology annotation.
pub fn record_is_linear(record: &SeqRecord, default: bool) -> bool {
    record.topology.map_or(default, Topology::is_linear)
}

pub fn sequence_to_record(sequence: &str) -> SeqRecord {
    SeqRecord::new(UNNAMED_RECORD_ID, sequence)
}

pub fn random_dna_sequence<R: Rng>(length: usize, rng: &mut R) -> String {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];
    (0..length).map(|_| BASES[rng.gen_range(0..4)]).collect()
}

/// Adds a feature spanning `location` (`(start, end)`) with a `label` qualifier
/// plus any extra qualifiers.
pub fn annotate_record<I, K, V>(
    record: &mut SeqRecord,
    location: (i64, i64),
    label: &str,
    kind: &str,
    qualifiers: I,
) where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut feature = Feature::new(kind, location.0, location.1).with_qualifier("label", label);
    for (key, value) in qualifiers {
        feature.qualifiers.insert(key.into(), value.into());
    }
    record.features.push(feature);
}
