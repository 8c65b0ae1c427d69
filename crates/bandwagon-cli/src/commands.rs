pub mod digest;
pub mod enzymes;
pub mod grid;
pub mod ladder;
pub mod plot;
pub mod report;

use crate::cli::DigestionInputArgs;
use crate::error::Result;
use bandwagon::core::io::{LoadOptions, SeqRecord, load_record};
use tracing::info;

/// Loads every input file with the requested topology handling.
fn load_records(args: &DigestionInputArgs) -> Result<Vec<SeqRecord>> {
    let options = LoadOptions::default().with_topology(args.topology.into());
    let records = args
        .inputs
        .iter()
        .map(|path| load_record(path, &options))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    info!("Loaded {} record(s).", records.len());
    Ok(records)
}
