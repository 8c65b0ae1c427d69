use crate::cli::LadderArgs;
use crate::config::{CliOverrides, build_config};
use crate::error::Result;
use bandwagon::core::ladder::{Ladder, presets};
use bandwagon::core::models::band::format_dna_size;

/// Lines describing a ladder: its calibration points followed by the requested
/// conversions.
fn describe(ladder: &Ladder, sizes: &[f64], migrations: &[f64]) -> Vec<String> {
    let mut lines = vec![format!(
        "Ladder {} ({} calibration)",
        ladder.label().unwrap_or("unnamed"),
        ladder.model()
    )];
    lines.push(format!("{:>10} {:>12}", "SIZE (bp)", "MIGRATION"));
    for (size, migration) in ladder.calibration().points() {
        lines.push(format!("{size:>10.0} {migration:>12.2}"));
    }

    let (min_size, max_size) = ladder.dna_size_span();
    let (min_migration, max_migration) = ladder.migration_distance_span();
    lines.push(format!(
        "Sizes {} to {} migrate {min_migration:.2} to {max_migration:.2}.",
        format_dna_size(min_size),
        format_dna_size(max_size)
    ));

    for &size in sizes {
        lines.push(format!("{size} bp -> migration {:.2}", ladder.dna_size_to_migration(size)));
    }
    for &migration in migrations {
        lines.push(format!("migration {migration} -> {:.0} bp", ladder.migration_to_dna_size(migration)));
    }
    lines
}

pub fn run(args: LadderArgs) -> Result<()> {
    if args.list {
        for name in presets::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let app = build_config(&args.config, &CliOverrides::default())?;
    for line in describe(&app.ladder, &args.sizes, &args.migrations) {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandwagon::core::ladder::presets::ladder_100_to_4k;

    #[test]
    fn description_lists_points_and_conversions() {
        let ladder = ladder_100_to_4k();
        let lines = describe(&ladder, &[500.0], &[]);
        assert!(lines[0].starts_with("Ladder 100-4k"));
        assert_eq!(lines.len(), 2 + ladder.calibration().points().count() + 2);
        let conversion = lines.last().unwrap();
        assert!(conversion.starts_with("500 bp -> migration"));
    }

    #[test]
    fn migrations_convert_back_to_sizes() {
        let ladder = ladder_100_to_4k();
        let migration = ladder.dna_size_to_migration(1000.0);
        let lines = describe(&ladder, &[], &[migration]);
        assert!(lines.last().unwrap().ends_with("-> 1000 bp"));
    }
}
