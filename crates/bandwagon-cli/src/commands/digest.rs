use super::load_records;
use crate::cli::DigestArgs;
use crate::config::{CliOverrides, build_config};
use crate::error::Result;
use bandwagon::core::digestion::{find_cut_sites, fragment_sizes};
use bandwagon::core::io::SeqRecord;
use bandwagon::core::ladder::Ladder;
use bandwagon::core::models::band::format_dna_size;
use bandwagon::core::models::pattern::BandsPattern;
use bandwagon::core::models::pattern_set::{BandsPatternsSet, LadderTicks};
use bandwagon::core::models::style::FontOverrides;
use bandwagon::core::models::topology::Topology;
use bandwagon::render::{export, layout};
use bandwagon::workflows::digestion_grid::Digestion;
use tracing::{debug, info};

const LANE_LABEL_ROTATION: f64 = 70.0;

/// Fragments of one record cut by one digestion, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestionResult {
    pub record_id: String,
    pub digestion: String,
    pub topology: Topology,
    pub cuts: Vec<usize>,
    pub fragments: Vec<usize>,
}

impl DigestionResult {
    fn summary(&self) -> String {
        if self.cuts.is_empty() {
            return "uncut".to_string();
        }
        self.fragments
            .iter()
            .map(|&size| format_dna_size(size as f64))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn digest_all(records: &[SeqRecord], digestions: &[Digestion]) -> Result<Vec<DigestionResult>> {
    let mut results = Vec::with_capacity(records.len() * digestions.len());
    for record in records {
        let topology = Topology::from_linear(record.is_linear(true));
        for digestion in digestions {
            let cuts = find_cut_sites(&record.sequence, &digestion.enzymes, topology.is_linear())?;
            let mut fragments = fragment_sizes(record.len(), &cuts, topology.is_linear());
            fragments.sort_unstable_by(|a, b| b.cmp(a));
            debug!(record = %record.id, digestion = %digestion, cuts = cuts.len(), "Digested record");
            results.push(DigestionResult {
                record_id: record.id.clone(),
                digestion: digestion.label(),
                topology,
                cuts,
                fragments,
            });
        }
    }
    Ok(results)
}

/// One lane per result after the ladder lane.
fn results_set(results: &[DigestionResult], ladder: &Ladder) -> BandsPatternsSet {
    let mut lanes = vec![ladder.pattern().clone()];
    lanes.extend(results.iter().map(|result| {
        let sizes: Vec<f64> = result.fragments.iter().map(|&size| size as f64).collect();
        BandsPattern::from_sizes(&sizes, ladder)
            .with_label(format!("{} | {}", result.record_id, result.digestion))
            .with_label_font(FontOverrides::default().rotation(LANE_LABEL_ROTATION))
            .with_topology(result.topology)
            .with_uncut(result.cuts.is_empty())
    }));
    BandsPatternsSet::new(lanes, ladder.clone())
}

pub fn run(args: DigestArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let results = digest_all(&records, &args.input.digestions)?;

    for result in &results {
        println!(
            "{}\t{}\t{}\t{}",
            result.record_id,
            result.digestion,
            result.topology,
            result.summary()
        );
    }

    if let Some(output) = &args.output {
        let app = build_config(&args.config, &CliOverrides::default())?;
        let mut set = results_set(&results, &app.ladder);
        if let Some(count) = app.ticks {
            set = set.with_ladder_ticks(LadderTicks::Count(count));
        }
        let scene = layout::pattern_set(&set, &app.render)?;
        export(&scene, output, &app.render)?;
        info!("Plotted {} digestion(s).", results.len());
        println!("✓ Gel written to: {}", output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandwagon::core::ladder::presets::ladder_100_to_4k;

    fn record(topology: Topology) -> SeqRecord {
        let mut bases: Vec<u8> = b"ACGT".iter().cycle().take(1000).copied().collect();
        bases[100..106].copy_from_slice(b"GAATTC");
        bases[600..606].copy_from_slice(b"GGATCC");
        SeqRecord::new("pTest", &String::from_utf8(bases).unwrap()).with_topology(topology)
    }

    #[test]
    fn fragments_follow_record_topology() {
        let digestions = vec!["EcoRI+BamHI".parse().unwrap(), "NotI".parse().unwrap()];
        let linear = digest_all(&[record(Topology::Linear)], &digestions).unwrap();
        assert_eq!(linear[0].fragments, vec![500, 399, 101]);
        assert_eq!(linear[0].digestion, "BamHI + EcoRI");
        assert_eq!(linear[0].summary(), "500, 399, 101");
        assert_eq!(linear[1].summary(), "uncut");

        let circular = digest_all(&[record(Topology::Circular)], &digestions).unwrap();
        assert_eq!(circular[0].fragments, vec![500, 500]);
    }

    #[test]
    fn unknown_enzymes_fail() {
        let digestions = vec!["NotAnEnzyme".parse().unwrap()];
        assert!(digest_all(&[record(Topology::Linear)], &digestions).is_err());
    }

    #[test]
    fn plot_has_a_lane_per_result() {
        let digestions = vec!["EcoRI".parse().unwrap(), "NotI".parse().unwrap()];
        let results = digest_all(&[record(Topology::Linear)], &digestions).unwrap();
        let set = results_set(&results, &ladder_100_to_4k());
        assert_eq!(set.patterns.len(), 3);
        assert_eq!(set.patterns[1].label.as_deref(), Some("pTest | EcoRI"));
        assert!(set.patterns[2].uncut);
    }
}
