use super::record::SeqRecord;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing sequence file formats.
///
/// Implementors parse the first record of a file and serialize a single
/// record; path-based helpers are provided on top of the reader/writer pair.
pub trait RecordFile {
    /// The error type for I/O and parsing failures.
    type Error: Error + From<io::Error>;

    /// Reads the first record from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails, the input holds no record, or the
    /// reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<SeqRecord, Self::Error>;

    /// Writes a record to a writer.
    ///
    /// # Arguments
    ///
    /// * `record` - The record to serialize.
    /// * `writer` - The writer to output to.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(record: &SeqRecord, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads the first record of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<SeqRecord, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a record to a file, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(record: &SeqRecord, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(record, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
