use super::digestion_grid::Digestion;
use super::progress::{Progress, ProgressReporter};
use crate::core::digestion::find_cut_sites;
use crate::core::io::record::{Feature, SeqRecord, annotate_record, record_is_linear};
use crate::core::ladder::Ladder;
use crate::core::models::band::{Band, format_dna_size};
use crate::core::models::pattern::BandsPattern;
use crate::core::models::pattern_set::{BandsPatternsSet, LadderTicks};
use crate::core::models::style::{Color, FontOverrides};
use crate::core::models::topology::Topology;
use crate::error::BandwagonError;
use crate::render::record_map::{FeatureTrack, TrackFeature, record_page};
use crate::render::scene::Scene;
use crate::render::{RenderOptions, export_pages, layout};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, instrument};

pub const BAND_LABEL_QUALIFIER: &str = "band_label";
pub const BAND_SIZE_QUALIFIER: &str = "band_size";

const BAND_FEATURE_COLOR: Color = Color::rgb(0xe5, 0xd7, 0x40);
const SOURCE_FEATURE_COLOR: Color = Color::rgb(0xff, 0x82, 0x82);
const FEATURE_COLOR: Color = Color::rgb(0xea, 0xed, 0xff);

const PAGE_TICKS: usize = 3;
const PAGE_TICKS_FONT_SIZE: f64 = 12.0;
const PAGE_LABEL_FONT_SIZE: f64 = 18.0;
const RECORD_TITLE_SIZE: f64 = 22.0;
const BANDS_TITLE: &str = "BANDS";
const BANDS_TITLE_SIZE: f64 = 14.0;

/// `a`..`z`, then `aa`, `ab`, ... for digestions with more than 26 bands.
fn band_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'a' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Band regions of a digestion as `(start, end)`, largest first. On a circular
/// record the stretches on either side of the origin form one region with a
/// negative start.
fn band_regions(length: usize, cuts: &[usize], linear: bool) -> Vec<(i64, i64)> {
    let boundaries: BTreeSet<i64> = [0, length as i64]
        .into_iter()
        .chain(cuts.iter().map(|&c| c as i64))
        .collect();
    let boundaries: Vec<i64> = boundaries.into_iter().collect();
    let mut regions: Vec<(i64, i64)> = boundaries.windows(2).map(|w| (w[0], w[1])).collect();
    let cut_at_origin = cuts.first() == Some(&0);
    if !linear && regions.len() > 1 && !cut_at_origin {
        if let Some((start, end)) = regions.pop() {
            regions[0] = (-(end - start), regions[0].1);
        }
    }
    regions.sort_by_key(|&(start, end)| start - end);
    regions
}

/// Copies `record` and adds one `misc_feature` per band region, labelled
/// `"a - 1.2k"`, `"b - 650"`, … from the largest region down, with the letter
/// and size in the `band_label` and `band_size` qualifiers.
///
/// Records without a topology annotation are treated as circular.
pub fn annotate_digestion_bands<S: AsRef<str>>(
    record: &SeqRecord,
    enzymes: &[S],
) -> Result<SeqRecord, BandwagonError> {
    let linear = record_is_linear(record, false);
    let cuts = find_cut_sites(&record.sequence, enzymes, linear)?;
    let mut annotated = record.clone();
    for (index, (start, end)) in band_regions(record.len(), &cuts, linear).into_iter().enumerate() {
        let size = start.abs_diff(end);
        let letter = band_letter(index);
        annotate_record(
            &mut annotated,
            (start, end),
            &format!("{letter} - {}", format_dna_size(size as f64)),
            "misc_feature",
            [
                (BAND_LABEL_QUALIFIER, letter),
                (BAND_SIZE_QUALIFIER, size.to_string()),
            ],
        );
    }
    debug!(
        record = %record.id,
        bands = annotated.features.len() - record.features.len(),
        "Annotated digestion bands"
    );
    Ok(annotated)
}

struct BandRegion {
    label: String,
    size: i64,
    start: i64,
}

fn band_regions_of(record: &SeqRecord) -> Vec<BandRegion> {
    let mut regions: Vec<BandRegion> = record
        .features
        .iter()
        .filter_map(|feature| {
            let label = feature.qualifier(BAND_LABEL_QUALIFIER)?;
            let size = feature
                .qualifier(BAND_SIZE_QUALIFIER)
                .and_then(|s| s.parse().ok())
                .unwrap_or(feature.len() as i64);
            Some(BandRegion {
                label: label.to_string(),
                size,
                start: feature.start,
            })
        })
        .collect();
    regions.sort_by(|a, b| {
        (a.label.len(), &a.label, a.size, a.start).cmp(&(b.label.len(), &b.label, b.size, b.start))
    });
    regions
}

fn feature_color(feature: &Feature) -> Color {
    if feature.qualifiers.contains_key(BAND_LABEL_QUALIFIER) {
        BAND_FEATURE_COLOR
    } else if feature.qualifiers.contains_key("source") {
        SOURCE_FEATURE_COLOR
    } else {
        FEATURE_COLOR
    }
}

fn track_features<F>(record: &SeqRecord, keep: F) -> Vec<TrackFeature>
where
    F: Fn(&Feature) -> bool,
{
    record
        .features
        .iter()
        .filter(|feature| keep(feature))
        .map(|feature| TrackFeature {
            start: feature.start,
            end: feature.end,
            strand: feature.strand,
            label: feature.label().map(String::from),
            color: feature_color(feature),
        })
        .collect()
}

/// Draws one report page for a record annotated by
/// [`annotate_digestion_bands`]: the digestion lane against the ladder, the
/// record's own features titled `"<record_label> (<topology>)"`, and the band
/// regions, with dotted lines at every region boundary.
pub fn plot_record_digestion(
    annotated: &SeqRecord,
    ladder: &Ladder,
    record_label: &str,
    digestion_label: &str,
    options: &RenderOptions,
) -> Result<Scene, BandwagonError> {
    let linear = record_is_linear(annotated, false);
    let topology = Topology::from_linear(linear);
    let regions = band_regions_of(annotated);
    let length = annotated.len() as i64;
    let guides: Vec<i64> = regions
        .iter()
        .flat_map(|region| [region.start, region.start + region.size])
        .map(|position| if position < 0 { position + length } else { position })
        .collect();

    let record_track = FeatureTrack::new(annotated.len())
        .with_title(format!("{record_label} ({topology})"), RECORD_TITLE_SIZE)
        .with_features(track_features(annotated, |feature| {
            !feature.qualifiers.contains_key(BAND_LABEL_QUALIFIER)
                && !feature.qualifier("label").is_some_and(|l| l.contains("homology"))
        }))
        .with_guides(guides.clone())
        .with_ruler(false);
    let mut band_track = FeatureTrack::new(annotated.len())
        .with_title(BANDS_TITLE, BANDS_TITLE_SIZE)
        .with_features(track_features(annotated, |feature| {
            feature.qualifiers.contains_key(BAND_LABEL_QUALIFIER)
        }))
        .with_guides(guides);
    band_track.split_wrapping_features();

    let pattern = BandsPattern::new(
        regions
            .iter()
            .map(|region| Band::placed(region.size as f64, ladder).with_label(region.label.clone()))
            .collect(),
    )
    .with_topology(topology);
    let set = BandsPatternsSet::new(vec![pattern], ladder.clone())
        .with_ladder_ticks(LadderTicks::Count(PAGE_TICKS))
        .with_ticks_font(FontOverrides::default().size(PAGE_TICKS_FONT_SIZE))
        .with_label(digestion_label)
        .with_label_font(FontOverrides::default().size(PAGE_LABEL_FONT_SIZE));
    let lane = layout::pattern_set(&set, options)?;
    Ok(record_page(&lane, &record_track, &band_track, options))
}

/// Every record paired with every digestion, records outermost.
pub fn pairs_product(records: &[SeqRecord], digestions: &[Digestion]) -> Vec<(SeqRecord, Digestion)> {
    records
        .iter()
        .flat_map(|record| {
            digestions
                .iter()
                .map(move |digestion| (record.clone(), digestion.clone()))
        })
        .collect()
}

/// Annotated records grouped by record id, then by digestion label, both in
/// first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotatedDigestions {
    entries: Vec<(String, Vec<(String, SeqRecord)>)>,
}

impl AnnotatedDigestions {
    /// Adds a record, replacing any earlier one under the same keys.
    pub fn insert(&mut self, record_id: &str, digestion_label: &str, record: SeqRecord) {
        let index = match self.entries.iter().position(|(id, _)| id == record_id) {
            Some(index) => index,
            None => {
                self.entries.push((record_id.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        let digestions = &mut self.entries[index].1;
        match digestions.iter_mut().find(|(label, _)| label == digestion_label) {
            Some(entry) => entry.1 = record,
            None => digestions.push((digestion_label.to_string(), record)),
        }
    }

    pub fn get(&self, record_id: &str, digestion_label: &str) -> Option<&SeqRecord> {
        self.entries
            .iter()
            .find(|(id, _)| id == record_id)?
            .1
            .iter()
            .find(|(label, _)| label == digestion_label)
            .map(|(_, record)| record)
    }

    pub fn record_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &SeqRecord)> {
        self.entries.iter().flat_map(|(id, digestions)| {
            digestions
                .iter()
                .map(move |(label, record)| (id.as_str(), label.as_str(), record))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, d)| d.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Annotates and plots every `(record, digestion)` pair, one page each, and
/// writes all pages to `target` (PDF when built with the `pdf` feature, or
/// HTML).
///
/// Each annotated record is renamed `<record id>--<enzyme+enzyme>` with spaces
/// in the id replaced by underscores.
#[instrument(skip_all, name = "record_digestion_report")]
pub fn run(
    pairs: &[(SeqRecord, Digestion)],
    ladder: &Ladder,
    target: &Path,
    options: &RenderOptions,
    reporter: &ProgressReporter,
) -> Result<AnnotatedDigestions, BandwagonError> {
    if pairs.is_empty() {
        return Err(BandwagonError::InvalidInput(
            "a digestion report needs at least one record and digestion".to_string(),
        ));
    }
    reporter.report(Progress::PhaseStart {
        name: "Digesting records",
    });
    info!("Annotating and plotting {} record digestion(s).", pairs.len());
    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    let mut annotated_records = AnnotatedDigestions::default();
    let mut pages = Vec::with_capacity(pairs.len());
    for (record, digestion) in pairs {
        let digestion_label = digestion.label();
        let mut annotated = annotate_digestion_bands(record, &digestion.enzymes)?;
        annotated.id = format!(
            "{}--{}",
            record.id.replace(' ', "_"),
            digestion.enzymes.join("+")
        );
        pages.push(plot_record_digestion(
            &annotated,
            ladder,
            &record.id,
            &digestion_label,
            options,
        )?);
        annotated_records.insert(&record.id, &digestion_label, annotated);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    export_pages(&pages, target, options)?;
    reporter.report(Progress::Message(format!(
        "Wrote {} page(s) to {}",
        pages.len(),
        target.display()
    )));
    reporter.report(Progress::PhaseFinish);
    Ok(annotated_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ladder::presets::ladder_100_to_4k;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// 1 kb of ACGT repeats with EcoRI sites at 100 and 300 and a BamHI site at 600.
    fn plasmid(topology: Option<Topology>) -> SeqRecord {
        let mut bases: Vec<u8> = b"ACGT".iter().cycle().take(1000).copied().collect();
        bases[100..106].copy_from_slice(b"GAATTC");
        bases[300..306].copy_from_slice(b"GAATTC");
        bases[600..606].copy_from_slice(b"GGATCC");
        let mut record = SeqRecord::new("my plasmid", &String::from_utf8(bases).unwrap());
        record.topology = topology;
        record
            .features
            .push(Feature::new("CDS", 150, 450).with_qualifier("label", "geneA"));
        record
    }

    fn bands(record: &SeqRecord) -> Vec<(String, i64, i64, String)> {
        record
            .features
            .iter()
            .filter(|f| f.qualifier(BAND_LABEL_QUALIFIER).is_some())
            .map(|f| {
                (
                    f.qualifier(BAND_LABEL_QUALIFIER).unwrap().to_string(),
                    f.start,
                    f.end,
                    f.label().unwrap().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn regions_join_across_the_origin_on_circular_records() {
        assert_eq!(
            band_regions(1000, &[101, 301, 601], false),
            vec![(-399, 101), (301, 601), (101, 301)]
        );
        assert_eq!(
            band_regions(1000, &[101, 301, 601], true),
            vec![(601, 1000), (301, 601), (101, 301), (0, 101)]
        );
        assert_eq!(band_regions(1000, &[], false), vec![(0, 1000)]);
        assert_eq!(band_regions(1000, &[0, 500], false), vec![(0, 500), (500, 1000)]);
    }

    #[test]
    fn band_letters_continue_past_z() {
        assert_eq!(band_letter(0), "a");
        assert_eq!(band_letter(25), "z");
        assert_eq!(band_letter(26), "aa");
        assert_eq!(band_letter(27), "ab");
        assert_eq!(band_letter(52), "ba");
    }

    #[test]
    fn unannotated_records_are_digested_as_circular() {
        let annotated = annotate_digestion_bands(&plasmid(None), &["EcoRI", "BamHI"]).unwrap();
        assert_eq!(
            bands(&annotated),
            vec![
                ("a".to_string(), -399, 101, "a - 500".to_string()),
                ("b".to_string(), 301, 601, "b - 300".to_string()),
                ("c".to_string(), 101, 301, "c - 200".to_string()),
            ]
        );
        let feature = annotated.features.last().unwrap();
        assert_eq!(feature.kind, "misc_feature");
        assert_eq!(feature.qualifier(BAND_SIZE_QUALIFIER), Some("200"));
        // Existing features are kept.
        assert_eq!(annotated.features[0].label(), Some("geneA"));
    }

    #[test]
    fn linear_records_keep_end_fragments_apart() {
        let annotated =
            annotate_digestion_bands(&plasmid(Some(Topology::Linear)), &["EcoRI", "BamHI"]).unwrap();
        let labels: Vec<_> = bands(&annotated).into_iter().map(|b| b.3).collect();
        assert_eq!(labels, vec!["a - 399", "b - 300", "c - 200", "d - 101"]);
    }

    #[test]
    fn page_shows_lane_and_both_tracks() {
        let ladder = ladder_100_to_4k();
        let annotated = annotate_digestion_bands(&plasmid(None), &["EcoRI", "BamHI"]).unwrap();
        let page = plot_record_digestion(
            &annotated,
            &ladder,
            "my plasmid",
            "BamHI + EcoRI",
            &RenderOptions::default(),
        )
        .unwrap();
        let texts: Vec<_> = page.texts().map(|t| t.content.as_str()).collect();
        assert!(texts.contains(&"my plasmid (circular)"));
        assert!(texts.contains(&"BANDS"));
        assert!(texts.contains(&"BamHI + EcoRI"));
        assert!(texts.contains(&"geneA"));
        // Lane band labels are the region letters.
        assert!(texts.contains(&"a"));
        // Six guides on each track.
        assert_eq!(page.lines().filter(|l| l.dashed).count(), 12);
    }

    #[test]
    fn run_writes_pages_and_groups_results() {
        let ladder = ladder_100_to_4k();
        let dir = tempdir().unwrap();
        let target = dir.path().join("report.html");
        let digestions: Vec<Digestion> = vec!["EcoRI+BamHI".parse().unwrap(), "EcoRI".parse().unwrap()];
        let pairs = pairs_product(&[plasmid(None)], &digestions);

        let events = Mutex::new(0u64);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if event == Progress::TaskIncrement {
                *events.lock().unwrap() += 1;
            }
        }));
        let results = run(&pairs, &ladder, &target, &RenderOptions::default(), &reporter).unwrap();
        drop(reporter);

        assert_eq!(events.into_inner().unwrap(), 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results.record_ids().collect::<Vec<_>>(), vec!["my plasmid"]);
        let record = results.get("my plasmid", "BamHI + EcoRI").unwrap();
        assert_eq!(record.id, "my_plasmid--EcoRI+BamHI");
        assert!(results.get("my plasmid", "EcoRI").is_some());

        let html = std::fs::read_to_string(&target).unwrap();
        assert_eq!(html.matches("class=\"bandwagon-viewport\"").count(), 2);
    }
}
