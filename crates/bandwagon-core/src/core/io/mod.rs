//! Provides sequence records and the file formats they are read from.
//!
//! Records are loaded from FASTA or GenBank files through a shared
//! [`traits::RecordFile`] interface, and [`load::load_record`] picks the
//! format from the file extension and settles the record's id and topology.

pub mod fasta;
pub mod genbank;
pub mod load;
pub mod record;
pub mod traits;

pub use load::{IdOption, LoadOptions, RecordError, RecordFormat, TopologyOption, load_record};
pub use record::{
    Feature, SeqRecord, Strand, annotate_record, random_dna_sequence, record_is_linear,
    sequence_to_record,
};
