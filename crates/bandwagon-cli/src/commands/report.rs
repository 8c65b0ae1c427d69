use super::load_records;
use crate::cli::ReportArgs;
use crate::config::{CliOverrides, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use bandwagon::core::io::SeqRecord;
use bandwagon::core::io::genbank::GenBankFile;
use bandwagon::core::io::traits::RecordFile;
use bandwagon::workflows::digestion_grid::Digestion;
use bandwagon::workflows::record_digestion::{self, AnnotatedDigestions, pairs_product};
use std::path::Path;
use tracing::info;

/// Pairs the n-th record with the n-th digestion.
fn zip_pairs(records: Vec<SeqRecord>, digestions: &[Digestion]) -> Result<Vec<(SeqRecord, Digestion)>> {
    if records.len() != digestions.len() {
        return Err(CliError::Argument(format!(
            "--paired needs as many inputs as digestions ({} input(s), {} digestion(s))",
            records.len(),
            digestions.len()
        )));
    }
    Ok(records.into_iter().zip(digestions.iter().cloned()).collect())
}

fn save_annotated(results: &AnnotatedDigestions, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for (_, _, record) in results.iter() {
        let path = dir.join(format!("{}.gb", record.id));
        GenBankFile::write_to_path(record, &path).map_err(|e| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        })?;
        info!("Saved annotated record to {:?}", path);
    }
    Ok(())
}

pub fn run(args: ReportArgs) -> Result<()> {
    let app = build_config(&args.config, &CliOverrides::default())?;
    let records = load_records(&args.input)?;
    let pairs = if args.paired {
        zip_pairs(records, &args.input.digestions)?
    } else {
        pairs_product(&records, &args.input.digestions)
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = progress_handler.reporter();

    println!("Writing digestion report...");
    let results = record_digestion::run(&pairs, &app.ladder, &args.output, &app.render, &reporter)?;

    for (record_id, digestion, record) in results.iter() {
        let bands = record
            .features
            .iter()
            .filter(|f| f.qualifier(record_digestion::BAND_LABEL_QUALIFIER).is_some())
            .count();
        println!("  {record_id} | {digestion}: {bands} band(s)");
    }
    if let Some(dir) = &args.annotated_dir {
        save_annotated(&results, dir)?;
        println!("✓ Annotated records saved to: {}", dir.display());
    }
    println!("✓ Report written to: {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn write_fasta(dir: &Path, name: &str) -> String {
        let mut bases: Vec<u8> = b"ACGT".iter().cycle().take(1000).copied().collect();
        bases[100..106].copy_from_slice(b"GAATTC");
        bases[600..606].copy_from_slice(b"GGATCC");
        let path = dir.join(name);
        fs::write(&path, format!(">{name}\n{}\n", String::from_utf8(bases).unwrap())).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn paired_inputs_must_match_digestions() {
        let records = vec![SeqRecord::new("a", "ACGT"), SeqRecord::new("b", "ACGT")];
        let digestions: Vec<Digestion> = vec!["EcoRI".parse().unwrap()];
        assert!(matches!(zip_pairs(records.clone(), &digestions), Err(CliError::Argument(_))));

        let digestions: Vec<Digestion> = vec!["EcoRI".parse().unwrap(), "BamHI".parse().unwrap()];
        let pairs = zip_pairs(records, &digestions).unwrap();
        assert_eq!(pairs[1].0.id, "b");
        assert_eq!(pairs[1].1.label(), "BamHI");
    }

    #[test]
    fn report_writes_html_and_annotated_records() {
        let dir = tempdir().unwrap();
        let fasta = write_fasta(dir.path(), "pTest.fa");
        let output = dir.path().join("report.html").to_string_lossy().to_string();
        let annotated = dir.path().join("annotated").to_string_lossy().to_string();

        let cli = Cli::parse_from([
            "bandwagon",
            "report",
            "-i",
            fasta.as_str(),
            "-e",
            "EcoRI+BamHI",
            "-o",
            output.as_str(),
            "--topology",
            "circular",
            "--annotated-dir",
            annotated.as_str(),
        ]);
        let Commands::Report(args) = cli.command else {
            panic!("expected the report command");
        };
        run(args).unwrap();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("pTest (circular)"));
        let genbank = fs::read_to_string(Path::new(&annotated).join("pTest--EcoRI+BamHI.gb")).unwrap();
        assert!(genbank.contains("band_label"));
    }
}
