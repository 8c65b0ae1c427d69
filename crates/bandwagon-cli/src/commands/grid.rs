use super::load_records;
use crate::cli::GridArgs;
use crate::config::{CliOverrides, build_config};
use crate::error::Result;
use bandwagon::core::models::topology::Topology;
use bandwagon::render::export;
use bandwagon::workflows::digestion_grid::{self, GridOptions};
use tracing::info;

pub fn run(args: GridArgs) -> Result<()> {
    let app = build_config(&args.config, &CliOverrides::default())?;
    let records = load_records(&args.input)?;

    let options = GridOptions {
        group_by: args.group_by,
        show_band_sizes: args.show_sizes,
        plot_ladder: args.with_ladder,
        default_topology: Topology::Linear,
        render: app.render.clone(),
    };
    info!("Plotting digestion grid...");
    let scene = digestion_grid::run(&records, &args.input.digestions, &app.ladder, &options)?;
    export(&scene, &args.output, &app.render)?;

    println!("✓ Digestion grid written to: {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn grid_reads_fasta_inputs_and_writes_svg() {
        let dir = tempdir().unwrap();
        let mut bases: Vec<u8> = b"ACGT".iter().cycle().take(1000).copied().collect();
        bases[100..106].copy_from_slice(b"GAATTC");
        let fasta = dir.path().join("pA.fa");
        fs::write(&fasta, format!(">pA test\n{}\n", String::from_utf8(bases).unwrap())).unwrap();
        let output = dir.path().join("grid.svg");
        let fasta_arg = fasta.to_string_lossy().to_string();
        let output_arg = output.to_string_lossy().to_string();

        let cli = Cli::parse_from([
            "bandwagon",
            "grid",
            "-i",
            fasta_arg.as_str(),
            "-e",
            "EcoRI",
            "-o",
            output_arg.as_str(),
            "--with-ladder",
        ]);
        let Commands::Grid(args) = cli.command else {
            panic!("expected the grid command");
        };
        run(args).unwrap();

        let svg = fs::read_to_string(&output).unwrap();
        assert!(svg.contains(">EcoRI<"));
        assert!(svg.contains(">pA<"));
    }
}
