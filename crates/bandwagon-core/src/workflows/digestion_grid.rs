use crate::core::digestion::{find_cut_sites, fragment_sizes};
use crate::core::io::record::SeqRecord;
use crate::core::ladder::Ladder;
use crate::core::models::band::{BandOverrides, SIZE_LABEL_DIRECTIVE};
use crate::core::models::pattern::BandsPattern;
use crate::core::models::pattern_set::{BandsPatternsSet, LadderTicks};
use crate::core::models::style::FontOverrides;
use crate::core::models::topology::Topology;
use crate::error::BandwagonError;
use crate::render::layout;
use crate::render::scene::Scene;
use crate::render::RenderOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, instrument};

const GRID_BAND_THICKNESS: f64 = 2.5;
const SIZE_LABEL_FONT_SIZE: f64 = 6.0;
const COLUMN_LABEL_ROTATION: f64 = 70.0;
const ROW_TICKS: usize = 4;
const ROW_TICKS_FONT_SIZE: f64 = 9.0;

/// A restriction enzyme mix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digestion {
    pub enzymes: Vec<String>,
}

impl Digestion {
    pub fn new<I, S>(enzymes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enzymes: enzymes.into_iter().map(Into::into).collect(),
        }
    }

    /// Enzyme names sorted and joined with `" + "`, e.g. `BamHI + EcoRI`.
    pub fn label(&self) -> String {
        let mut names: Vec<&str> = self.enzymes.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.join(" + ")
    }
}

impl FromStr for Digestion {
    type Err = String;

    /// Parses `EcoRI+BamHI` (also accepting `,` or spaces between names).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let enzymes: Vec<String> = s
            .split(['+', ',', ' '])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        if enzymes.is_empty() {
            return Err(format!("no enzyme names in '{s}'"));
        }
        Ok(Self { enzymes })
    }
}

impl fmt::Display for Digestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupBy {
    /// One row per digestion, one column per record.
    #[default]
    Digestions,
    /// One row per record, one column per digestion.
    Records,
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digestions" | "digestion" => Ok(Self::Digestions),
            "records" | "record" | "sequences" => Ok(Self::Records),
            other => Err(format!("unknown grouping '{other}' (expected digestions or records)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridOptions {
    pub group_by: GroupBy,
    pub show_band_sizes: bool,
    pub plot_ladder: bool,
    /// Topology of records without a topology annotation.
    pub default_topology: Topology,
    pub render: RenderOptions,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            group_by: GroupBy::Digestions,
            show_band_sizes: false,
            plot_ladder: false,
            default_topology: Topology::Linear,
            render: RenderOptions::default(),
        }
    }
}

struct Cell {
    bands: Vec<f64>,
    uncut: bool,
}

/// Rows in first-seen order, each holding its columns in first-seen order.
/// A repeated column key replaces the earlier cell.
#[derive(Default)]
struct Grid {
    rows: Vec<(String, Vec<(String, Cell)>)>,
}

impl Grid {
    fn insert(&mut self, row: String, column: String, cell: Cell) {
        let index = match self.rows.iter().position(|(key, _)| *key == row) {
            Some(index) => index,
            None => {
                self.rows.push((row, Vec::new()));
                self.rows.len() - 1
            }
        };
        let columns = &mut self.rows[index].1;
        match columns.iter_mut().find(|(key, _)| *key == column) {
            Some(existing) => existing.1 = cell,
            None => columns.push((column, cell)),
        }
    }
}

/// Builds one pattern set per grid row, rows sorted by key. Only the first row
/// carries column labels.
///
/// # Errors
///
/// Returns [`BandwagonError::InvalidInput`] when records or digestions are
/// empty, or a digestion error for an unknown enzyme.
pub fn build_rows(
    records: &[SeqRecord],
    digestions: &[Digestion],
    ladder: &Ladder,
    options: &GridOptions,
) -> Result<Vec<BandsPatternsSet>, BandwagonError> {
    if records.is_empty() || digestions.is_empty() {
        return Err(BandwagonError::InvalidInput(
            "a digestion grid needs at least one record and one digestion".to_string(),
        ));
    }

    let mut grid = Grid::default();
    for record in records {
        let linear = record.is_linear(options.default_topology.is_linear());
        for digestion in digestions {
            let cuts = find_cut_sites(&record.sequence, &digestion.enzymes, linear)?;
            let mut bands: Vec<f64> = fragment_sizes(record.len(), &cuts, linear)
                .into_iter()
                .map(|size| size as f64)
                .collect();
            bands.sort_by(f64::total_cmp);
            let cell = Cell {
                bands,
                uncut: cuts.is_empty(),
            };
            let (row, column) = match options.group_by {
                GroupBy::Digestions => (digestion.label(), record.id.clone()),
                GroupBy::Records => (record.id.clone(), digestion.label()),
            };
            grid.insert(row, column, cell);
        }
    }
    grid.rows.sort_by(|a, b| a.0.cmp(&b.0));

    let mut band_overrides = BandOverrides {
        thickness: Some(GRID_BAND_THICKNESS),
        ..BandOverrides::default()
    };
    if options.show_band_sizes {
        band_overrides.label = Some(SIZE_LABEL_DIRECTIVE.to_string());
        band_overrides.label_font = FontOverrides::default().size(SIZE_LABEL_FONT_SIZE);
    }

    let sets = grid
        .rows
        .into_iter()
        .enumerate()
        .map(|(row_index, (row_key, columns))| {
            let mut patterns: Vec<BandsPattern> = Vec::new();
            if options.plot_ladder {
                patterns.push(ladder.pattern().clone());
            }
            patterns.extend(columns.into_iter().map(|(column_key, cell)| {
                let mut pattern = BandsPattern::from_sizes(&cell.bands, ladder)
                    .with_label_font(FontOverrides::default().rotation(COLUMN_LABEL_ROTATION))
                    .with_band_overrides(band_overrides.clone())
                    .with_uncut(cell.uncut);
                if row_index == 0 {
                    pattern = pattern.with_label(column_key);
                }
                pattern
            }));
            BandsPatternsSet::new(patterns, ladder.clone())
                .with_ladder_ticks(LadderTicks::Count(ROW_TICKS))
                .with_ticks_font(FontOverrides::default().size(ROW_TICKS_FONT_SIZE))
                .with_label(row_key)
        })
        .collect::<Vec<_>>();
    debug!(rows = sets.len(), "Built digestion grid rows");
    Ok(sets)
}

/// Lays out the records × digestions grid as one scene, rows stacked top to
/// bottom.
#[instrument(skip_all, name = "digestion_grid")]
pub fn run(
    records: &[SeqRecord],
    digestions: &[Digestion],
    ladder: &Ladder,
    options: &GridOptions,
) -> Result<Scene, BandwagonError> {
    info!(
        "Digesting {} record(s) with {} digestion(s), grouped by {:?}.",
        records.len(),
        digestions.len(),
        options.group_by
    );
    let rows = build_rows(records, digestions, ladder, options)?;
    let scenes = rows
        .iter()
        .map(|set| layout::pattern_set(set, &options.render))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layout::stack(&scenes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ladder::presets::ladder_100_to_4k;

    /// 1 kb of ACGT repeats with an EcoRI site at 100 and a BamHI site at 600.
    fn record(id: &str) -> SeqRecord {
        let mut bases: Vec<u8> = b"ACGT".iter().cycle().take(1000).copied().collect();
        bases[100..106].copy_from_slice(b"GAATTC");
        bases[600..606].copy_from_slice(b"GGATCC");
        SeqRecord::new(id, &String::from_utf8(bases).unwrap())
    }

    fn digestions() -> Vec<Digestion> {
        vec![
            "EcoRI+BamHI".parse().unwrap(),
            "EcoRI".parse().unwrap(),
            "NotI".parse().unwrap(),
        ]
    }

    #[test]
    fn digestion_labels_sort_enzyme_names() {
        let digestion: Digestion = "EcoRI + BamHI".parse().unwrap();
        assert_eq!(digestion.enzymes, vec!["EcoRI", "BamHI"]);
        assert_eq!(digestion.label(), "BamHI + EcoRI");
        assert!("+".parse::<Digestion>().is_err());
    }

    #[test]
    fn rows_are_sorted_and_only_the_first_has_column_labels() {
        let ladder = ladder_100_to_4k();
        let rows = build_rows(
            &[record("r1"), record("r2")],
            &digestions(),
            &ladder,
            &GridOptions::default(),
        )
        .unwrap();
        let labels: Vec<_> = rows.iter().map(|r| r.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["BamHI + EcoRI", "EcoRI", "NotI"]);
        assert_eq!(rows[0].patterns[0].label.as_deref(), Some("r1"));
        assert_eq!(rows[0].patterns[1].label.as_deref(), Some("r2"));
        assert!(rows[1].patterns.iter().all(|p| p.label.is_none()));
        assert_eq!(rows[0].ladder_ticks, Some(LadderTicks::Count(4)));
    }

    #[test]
    fn cells_hold_sorted_fragments_and_uncut_flags() {
        let ladder = ladder_100_to_4k();
        let rows = build_rows(&[record("r1")], &digestions(), &ladder, &GridOptions::default()).unwrap();
        assert_eq!(rows[0].patterns[0].dna_sizes(), vec![101.0, 399.0, 500.0]);
        assert_eq!(rows[1].patterns[0].dna_sizes(), vec![101.0, 899.0]);
        assert_eq!(rows[2].patterns[0].dna_sizes(), vec![1000.0]);
        assert!(rows[2].patterns[0].uncut);
        assert!(!rows[0].patterns[0].uncut);
        assert_eq!(rows[0].patterns[0].band_overrides.thickness, Some(2.5));
    }

    #[test]
    fn grouping_by_records_swaps_rows_and_columns() {
        let ladder = ladder_100_to_4k();
        let options = GridOptions {
            group_by: GroupBy::Records,
            show_band_sizes: true,
            plot_ladder: true,
            ..GridOptions::default()
        };
        let rows = build_rows(&[record("r2"), record("r1")], &digestions(), &ladder, &options).unwrap();
        let labels: Vec<_> = rows.iter().map(|r| r.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["r1", "r2"]);
        // Ladder first, then one column per digestion in input order.
        assert_eq!(rows[0].patterns.len(), 4);
        assert_eq!(rows[0].patterns[0], *ladder.pattern());
        assert_eq!(rows[0].patterns[1].label.as_deref(), Some("BamHI + EcoRI"));
        let overrides = &rows[0].patterns[1].band_overrides;
        assert_eq!(overrides.label.as_deref(), Some("=size"));
        assert_eq!(overrides.label_font.size, Some(6.0));
    }

    #[test]
    fn circular_default_topology_joins_end_fragments() {
        let ladder = ladder_100_to_4k();
        let options = GridOptions {
            default_topology: Topology::Circular,
            ..GridOptions::default()
        };
        let rows = build_rows(&[record("r1")], &digestions(), &ladder, &options).unwrap();
        assert_eq!(rows[0].patterns[0].dna_sizes(), vec![500.0, 500.0]);
    }

    #[test]
    fn run_stacks_one_scene_per_row() {
        let ladder = ladder_100_to_4k();
        let options = GridOptions::default();
        let scene = run(&[record("r1")], &digestions(), &ladder, &options).unwrap();
        let row_height = options.render.margins.top + options.render.plot_height + options.render.margins.bottom;
        assert_eq!(scene.height, 3.0 * row_height);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let ladder = ladder_100_to_4k();
        assert!(matches!(
            build_rows(&[], &digestions(), &ladder, &GridOptions::default()),
            Err(BandwagonError::InvalidInput(_))
        ));
    }
}
