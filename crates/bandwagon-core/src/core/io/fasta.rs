use super::record::{SeqRecord, UNNAMED_RECORD_ID};
use super::traits::RecordFile;
use bio::io::fasta;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid FASTA record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },
    #[error("No FASTA record found")]
    Empty,
}

pub struct FastaFile;

impl RecordFile for FastaFile {
    type Error = FastaError;

    fn read_from(reader: &mut impl BufRead) -> Result<SeqRecord, Self::Error> {
        let reader = fasta::Reader::new(reader);
        let record = reader.records().next().ok_or(FastaError::Empty)??;
        record.check().map_err(|reason| FastaError::InvalidRecord {
            id: record.id().to_string(),
            reason: reason.to_string(),
        })?;

        let id = match record.id() {
            "" => UNNAMED_RECORD_ID,
            id => id,
        };
        let sequence = String::from_utf8_lossy(record.seq());
        let mut parsed = SeqRecord::new(id, &sequence);
        parsed.description = record.desc().map(String::from);
        Ok(parsed)
    }

    fn write_to(record: &SeqRecord, writer: &mut impl Write) -> Result<(), Self::Error> {
        let mut fasta_writer = fasta::Writer::new(writer);
        fasta_writer.write(
            &record.id,
            record.description.as_deref(),
            record.sequence.as_bytes(),
        )?;
        fasta_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn reads_first_record_with_description() {
        let content = ">pUC19 cloning vector\nacgtac\nGGATCC\n>second\nAAAA\n";
        let record = FastaFile::read_from(&mut Cursor::new(content)).unwrap();
        assert_eq!(record.id, "pUC19");
        assert_eq!(record.description.as_deref(), Some("cloning vector"));
        assert_eq!(record.sequence, "ACGTACGGATCC");
        assert!(record.topology.is_none());
    }

    #[test]
    fn empty_input_is_an_error() {
        let result = FastaFile::read_from(&mut Cursor::new(""));
        assert!(matches!(result, Err(FastaError::Empty)));
    }

    #[test]
    fn written_records_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.fa");
        let record = SeqRecord::new("construct_1", "ACGTTGCA");
        FastaFile::write_to_path(&record, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(">construct_1\n"));
        let again = FastaFile::read_from_path(&path).unwrap();
        assert_eq!(again.sequence, "ACGTTGCA");
    }
}
