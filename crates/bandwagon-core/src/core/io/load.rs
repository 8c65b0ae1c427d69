use super::fasta::{FastaError, FastaFile};
use super::genbank::{GenBankError, GenBankFile};
use super::record::SeqRecord;
use super::traits::RecordFile;
use crate::core::models::topology::Topology;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to read FASTA file '{path}': {source}")]
    Fasta {
        path: String,
        #[source]
        source: FastaError,
    },
    #[error("Failed to read GenBank file '{path}': {source}")]
    GenBank {
        path: String,
        #[source]
        source: GenBankError,
    },
    #[error("Unsupported sequence file format: {0}")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Fasta,
    GenBank,
}

impl RecordFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "fa" | "fasta" | "fna" => Some(RecordFormat::Fasta),
            "gb" | "gbk" | "genbank" => Some(RecordFormat::GenBank),
            _ => None,
        }
    }
}

/// How the topology of a loaded record is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopologyOption {
    /// Keep the file's annotation, falling back to the loader default.
    #[default]
    Auto,
    Linear,
    Circular,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdOption {
    /// Use the file stem.
    #[default]
    Auto,
    Explicit(String),
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub format: Option<RecordFormat>,
    pub topology: TopologyOption,
    pub default_topology: Topology,
    pub id: IdOption,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            topology: TopologyOption::Auto,
            default_topology: Topology::Linear,
            id: IdOption::Auto,
        }
    }
}

impl LoadOptions {
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_topology(mut self, topology: TopologyOption) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_default_topology(mut self, topology: Topology) -> Self {
        self.default_topology = topology;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = IdOption::Explicit(id.into());
        self
    }
}

/// Loads the first record of a FASTA or GenBank file and settles its id and
/// topology according to `options`.
///
/// # Errors
///
/// Returns [`RecordError::UnsupportedFormat`] when no format is given and the
/// extension is not recognized, or the reader's error if parsing fails.
pub fn load_record(path: &Path, options: &LoadOptions) -> Result<SeqRecord, RecordError> {
    let format = options
        .format
        .or_else(|| RecordFormat::from_path(path))
        .ok_or_else(|| RecordError::UnsupportedFormat(path.to_path_buf()))?;
    let path_str = path.to_string_lossy().to_string();

    let mut record = match format {
        RecordFormat::Fasta => FastaFile::read_from_path(path).map_err(|source| RecordError::Fasta {
            path: path_str.clone(),
            source,
        })?,
        RecordFormat::GenBank => {
            GenBankFile::read_from_path(path).map_err(|source| RecordError::GenBank {
                path: path_str.clone(),
                source,
            })?
        }
    };

    record.topology = Some(match options.topology {
        TopologyOption::Auto => record.topology.unwrap_or(options.default_topology),
        TopologyOption::Linear => Topology::Linear,
        TopologyOption::Circular => Topology::Circular,
    });
    match &options.id {
        IdOption::Explicit(id) => record.id = id.clone(),
        IdOption::Auto => {
            if let Some(stem) = path.file_stem() {
                record.id = stem.to_string_lossy().to_string();
            }
        }
    }
    debug!(id = %record.id, "Resolved record id and topology.");

    info!(
        "Loaded record '{}' ({} bp, {}) from '{}'.",
        record.id,
        record.len(),
        record.topology.unwrap_or(options.default_topology),
        path_str
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const GENBANK: &str = "\
LOCUS       pX                        20 bp    DNA     circular SYN 01-JAN-1980
FEATURES             Location/Qualifiers
ORIGIN
        1 acgtacgtac gtacgtacgt
//
";

    #[test]
    fn fasta_records_take_default_topology_and_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("insert_A.fasta");
        fs::write(&path, ">seq1\nACGTACGT\n").unwrap();

        let record = load_record(&path, &LoadOptions::default()).unwrap();
        assert_eq!(record.id, "insert_A");
        assert_eq!(record.topology, Some(Topology::Linear));

        let circular = load_record(
            &path,
            &LoadOptions::default().with_default_topology(Topology::Circular),
        )
        .unwrap();
        assert_eq!(circular.topology, Some(Topology::Circular));
    }

    #[test]
    fn genbank_annotation_wins_in_auto_mode_but_not_when_forced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plasmid.gbk");
        fs::write(&path, GENBANK).unwrap();

        let auto = load_record(&path, &LoadOptions::default()).unwrap();
        assert_eq!(auto.topology, Some(Topology::Circular));
        assert_eq!(auto.len(), 20);

        let forced = load_record(
            &path,
            &LoadOptions::default()
                .with_topology(TopologyOption::Linear)
                .with_id("custom"),
        )
        .unwrap();
        assert_eq!(forced.topology, Some(Topology::Linear));
        assert_eq!(forced.id, "custom");
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sequence.txt");
        fs::write(&path, ">s\nAAAA\n").unwrap();

        let record = load_record(&path, &LoadOptions::default().with_format(RecordFormat::Fasta)).unwrap();
        assert_eq!(record.sequence, "AAAA");
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sequence.txt");
        fs::write(&path, ">s\nAAAA\n").unwrap();

        assert!(matches!(
            load_record(&path, &LoadOptions::default()),
            Err(RecordError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_record(Path::new("/nonexistent/x.fa"), &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/x.fa"));
    }
}
