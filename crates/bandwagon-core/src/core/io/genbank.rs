use super::record::{Feature, SeqRecord, Strand, UNNAMED_RECORD_ID};
use super::traits::RecordFile;
use crate::core::models::topology::Topology;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const FEATURE_KEY_COLUMN: usize = 5;
const FEATURE_LOCATION_COLUMN: usize = 21;
const ORIGIN_LINE_WIDTH: usize = 60;

#[derive(Debug, Error)]
pub enum GenBankError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: GenBankParseErrorKind,
    },
    #[error("Missing required section: {0}")]
    MissingSection(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenBankParseErrorKind {
    #[error("LOCUS line has no name")]
    MalformedLocus,
    #[error("Unsupported or malformed location '{0}'")]
    InvalidLocation(String),
    #[error("Qualifier line outside of a feature: '{0}'")]
    OrphanQualifier(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Definition,
    Features,
    Origin,
}

#[derive(Debug)]
struct PendingFeature {
    line: usize,
    kind: String,
    location: String,
    qualifiers: Vec<(String, String)>,
    open_quote: bool,
}

impl PendingFeature {
    fn push_line(&mut self, content: &str) {
        if let Some(qualifier) = content.strip_prefix('/') {
            let (key, value) = qualifier.split_once('=').unwrap_or((qualifier, ""));
            self.open_quote = value.starts_with('"') && !(value.len() > 1 && value.ends_with('"'));
            self.qualifiers.push((key.to_string(), value.to_string()));
        } else if self.open_quote {
            if let Some((_, value)) = self.qualifiers.last_mut() {
                value.push(' ');
                value.push_str(content);
                self.open_quote = !content.ends_with('"');
            }
        } else {
            self.location.push_str(content);
        }
    }

    fn finish(self) -> Result<(Feature, bool), GenBankError> {
        let (start, end, strand) = parse_location(&self.location).map_err(|kind| GenBankError::Parse {
            line: self.line,
            kind,
        })?;
        let qualifiers: BTreeMap<String, String> = self
            .qualifiers
            .into_iter()
            .map(|(key, value)| (key, unquote(&value)))
            .collect();
        let wraps = end < start;
        Ok((
            Feature {
                kind: self.kind,
                start,
                end,
                strand,
                qualifiers,
            },
            wraps,
        ))
    }
}

fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('"')
        .map(|v| v.strip_suffix('"').unwrap_or(v))
        .unwrap_or(trimmed);
    inner.replace("\"\"", "\"")
}

/// Parses simple, `complement(..)`, `join(..)` and `order(..)` locations into
/// 0-based half-open `(start, end, strand)`. A join that restarts at the
/// beginning of the sequence yields `end < start`.
fn parse_location(text: &str) -> Result<(i64, i64, Strand), GenBankParseErrorKind> {
    let invalid = || GenBankParseErrorKind::InvalidLocation(text.to_string());
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let strand = if compact.contains("complement(") {
        Strand::Reverse
    } else {
        Strand::Forward
    };
    let stripped = compact
        .replace("complement(", "")
        .replace("join(", "")
        .replace("order(", "")
        .replace([')', '<', '>'], "");

    let mut segments = Vec::new();
    for piece in stripped.split(',') {
        let number = |s: &str| s.parse::<i64>().map_err(|_| invalid());
        let segment = if let Some((a, b)) = piece.split_once("..") {
            (number(a)? - 1, number(b)?)
        } else if let Some((a, _)) = piece.split_once('^') {
            let a = number(a)?;
            (a, a)
        } else {
            let a = number(piece)?;
            (a - 1, a)
        };
        if segment.0 < 0 || segment.1 < segment.0 {
            return Err(invalid());
        }
        segments.push(segment);
    }
    match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => Ok((first.0, last.1, strand)),
        _ => Err(invalid()),
    }
}

fn format_location(feature: &Feature, length: usize) -> String {
    let length = length as i64;
    let span = if feature.start < 0 {
        format!("join({}..{},1..{})", length + feature.start + 1, length, feature.end)
    } else if feature.end == feature.start + 1 {
        format!("{}", feature.end)
    } else {
        format!("{}..{}", feature.start + 1, feature.end)
    };
    match feature.strand {
        Strand::Forward => span,
        Strand::Reverse => format!("complement({span})"),
    }
}

pub struct GenBankFile;

impl RecordFile for GenBankFile {
    type Error = GenBankError;

    fn read_from(reader: &mut impl BufRead) -> Result<SeqRecord, Self::Error> {
        let mut name: Option<String> = None;
        let mut topology = None;
        let mut description: Option<String> = None;
        let mut sequence = String::new();
        let mut features: Vec<(Feature, bool)> = Vec::new();
        let mut pending: Option<PendingFeature> = None;
        let mut section = Section::Header;
        let mut saw_origin = false;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            if line.starts_with("//") {
                break;
            }
            if section == Section::Origin {
                sequence.extend(line.chars().filter(|c| c.is_ascii_alphabetic()));
                continue;
            }

            let starts_with_keyword = line.chars().next().is_some_and(|c| !c.is_whitespace());
            if starts_with_keyword {
                if let Some(feature) = pending.take() {
                    features.push(feature.finish()?);
                }
                let mut tokens = line.split_whitespace();
                match tokens.next().unwrap_or("") {
                    "LOCUS" => {
                        let tokens: Vec<&str> = tokens.collect();
                        let locus_name = tokens.first().ok_or(GenBankError::Parse {
                            line: line_num,
                            kind: GenBankParseErrorKind::MalformedLocus,
                        })?;
                        name = Some(locus_name.to_string());
                        topology = tokens.iter().find_map(|t| t.parse::<Topology>().ok());
                        section = Section::Header;
                    }
                    "DEFINITION" => {
                        let text = line["DEFINITION".len()..].trim();
                        description = Some(text.to_string());
                        section = Section::Definition;
                    }
                    "FEATURES" => section = Section::Features,
                    "ORIGIN" => {
                        section = Section::Origin;
                        saw_origin = true;
                    }
                    _ => section = Section::Header,
                }
                continue;
            }

            match section {
                Section::Definition => {
                    if let Some(text) = description.as_mut() {
                        text.push(' ');
                        text.push_str(line.trim());
                    }
                }
                Section::Features => {
                    let key_start = match (line.get(..FEATURE_KEY_COLUMN), line.get(FEATURE_KEY_COLUMN..)) {
                        (Some(indent), Some(rest))
                            if indent.trim().is_empty() && !rest.is_empty() && !rest.starts_with(' ') =>
                        {
                            Some(rest)
                        }
                        _ => None,
                    };
                    if let Some(rest) = key_start {
                        if let Some(feature) = pending.take() {
                            features.push(feature.finish()?);
                        }
                        let key = line.get(FEATURE_KEY_COLUMN..FEATURE_LOCATION_COLUMN).unwrap_or(rest);
                        let (kind, location) = match key.split_once(' ') {
                            Some(_) => (
                                key.trim(),
                                line.get(FEATURE_LOCATION_COLUMN..).unwrap_or("").trim(),
                            ),
                            None => {
                                let rest = rest.trim();
                                rest.split_once(char::is_whitespace)
                                    .map(|(k, l)| (k, l.trim()))
                                    .unwrap_or((rest, ""))
                            }
                        };
                        pending = Some(PendingFeature {
                            line: line_num,
                            kind: kind.to_string(),
                            location: location.to_string(),
                            qualifiers: Vec::new(),
                            open_quote: false,
                        });
                    } else {
                        let content = line.trim();
                        match pending.as_mut() {
                            Some(feature) => feature.push_line(content),
                            None if content.is_empty() => {}
                            None => {
                                return Err(GenBankError::Parse {
                                    line: line_num,
                                    kind: GenBankParseErrorKind::OrphanQualifier(content.to_string()),
                                });
                            }
                        }
                    }
                }
                Section::Header | Section::Origin => {}
            }
        }
        if let Some(feature) = pending.take() {
            features.push(feature.finish()?);
        }

        let name = name.ok_or(GenBankError::MissingSection("LOCUS"))?;
        if !saw_origin {
            return Err(GenBankError::MissingSection("ORIGIN"));
        }

        let length = sequence.len() as i64;
        let mut record = SeqRecord::new(if name.is_empty() { UNNAMED_RECORD_ID } else { &name }, &sequence);
        record.description = description.filter(|d| !d.is_empty() && d != ".");
        record.topology = topology;
        record.features = features
            .into_iter()
            .map(|(mut feature, wraps)| {
                if wraps {
                    feature.start -= length;
                }
                feature
            })
            .collect();
        Ok(record)
    }

    fn write_to(record: &SeqRecord, writer: &mut impl Write) -> Result<(), Self::Error> {
        let name = record.id.replace(char::is_whitespace, "_");
        let topology = record.topology.unwrap_or(Topology::Linear);
        writeln!(
            writer,
            "LOCUS       {:<16} {:>11} bp    DNA     {:<8} SYN 01-JAN-1980",
            name,
            record.len(),
            topology.to_string()
        )?;
        writeln!(
            writer,
            "DEFINITION  {}",
            record.description.as_deref().unwrap_or(".")
        )?;
        writeln!(writer, "FEATURES             Location/Qualifiers")?;
        for feature in &record.features {
            writeln!(
                writer,
                "     {:<16}{}",
                feature.kind,
                format_location(feature, record.len())
            )?;
            for (key, value) in &feature.qualifiers {
                writeln!(
                    writer,
                    "{:21}/{}=\"{}\"",
                    "",
                    key,
                    value.replace('"', "\"\"")
                )?;
            }
        }
        writeln!(writer, "ORIGIN")?;
        let bases = record.sequence.to_ascii_lowercase();
        for (i, chunk) in bases.as_bytes().chunks(ORIGIN_LINE_WIDTH).enumerate() {
            let blocks: Vec<&str> = chunk
                .chunks(10)
                .map(|block| std::str::from_utf8(block).unwrap_or(""))
                .collect();
            writeln!(writer, "{:>9} {}", i * ORIGIN_LINE_WIDTH + 1, blocks.join(" "))?;
        }
        writeln!(writer, "//")?;
        Ok(())
    }
}
