use bandwagon::core::io::TopologyOption;
use bandwagon::workflows::digestion_grid::{Digestion, GroupBy};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "BandWagon CLI - Simulate restriction digests and plot agarose gel band patterns.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plot band patterns given as fragment sizes.
    Plot(PlotArgs),
    /// Print the fragments of each record and digestion, optionally plotting them.
    Digest(DigestArgs),
    /// Plot a grid of gels, one lane per record and digestion.
    Grid(GridArgs),
    /// Write an annotated digestion report with one page per record and digestion.
    Report(ReportArgs),
    /// Print a ladder's calibration table and convert sizes or migrations.
    Ladder(LadderArgs),
    /// List the known restriction enzymes.
    Enzymes(EnzymesArgs),
}

/// Settings shared by every command that draws against a ladder.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ladder preset name (e.g., '100-4k') or path to a .toml/.csv ladder table.
    #[arg(long, value_name = "NAME_OR_PATH")]
    pub ladder: Option<String>,

    /// Calibration model used to place bands against the ladder.
    #[arg(long, value_name = "MODEL")]
    pub ladder_model: Option<String>,

    /// TrueType font used when rendering PNG files.
    #[arg(long, value_name = "PATH")]
    pub font_path: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file and flags.
    /// Can be used multiple times. Example: -S render.column-width=80
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `plot` subcommand.
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Output file (.svg, .png, .html or .pdf).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// A lane as LABEL:SIZE,SIZE,... Can be used multiple times.
    #[arg(short, long = "pattern", value_name = "LABEL:SIZES")]
    pub patterns: Vec<String>,

    /// Number of ladder size ticks on the left axis.
    #[arg(long, value_name = "N")]
    pub ticks: Option<usize>,

    /// Label written to the left of the gel.
    #[arg(long, value_name = "TEXT")]
    pub label: Option<String>,

    /// Print each band's size next to it.
    #[arg(long)]
    pub show_sizes: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Record inputs and the digestions to apply to them.
#[derive(Args, Debug, Clone)]
pub struct DigestionInputArgs {
    /// Sequence files (.fa, .fasta, .gb, .gbk). Can be used multiple times.
    #[arg(short, long = "input", required = true, value_name = "PATH", num_args(1..))]
    pub inputs: Vec<PathBuf>,

    /// An enzyme mix such as 'EcoRI+BamHI'. Can be used multiple times.
    #[arg(short = 'e', long = "enzymes", required = true, value_name = "ENZ[+ENZ]", num_args(1..))]
    pub digestions: Vec<Digestion>,

    /// Topology of the loaded records; 'auto' keeps the file's annotation.
    #[arg(long, value_enum, default_value_t = TopologyArg::Auto)]
    pub topology: TopologyArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyArg {
    Auto,
    Linear,
    Circular,
}

impl From<TopologyArg> for TopologyOption {
    fn from(value: TopologyArg) -> Self {
        match value {
            TopologyArg::Auto => TopologyOption::Auto,
            TopologyArg::Linear => TopologyOption::Linear,
            TopologyArg::Circular => TopologyOption::Circular,
        }
    }
}

/// Arguments for the `digest` subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    #[command(flatten)]
    pub input: DigestionInputArgs,

    /// Also plot the fragments, one lane per record and digestion.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `grid` subcommand.
#[derive(Args, Debug)]
pub struct GridArgs {
    #[command(flatten)]
    pub input: DigestionInputArgs,

    /// Output file (.svg, .png, .html or .pdf).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Whether gel rows are digestions or records.
    #[arg(long, value_name = "GROUPING", default_value = "digestions")]
    pub group_by: GroupBy,

    /// Print each band's size next to it.
    #[arg(long)]
    pub show_sizes: bool,

    /// Draw the ladder as the first lane of every row.
    #[arg(long)]
    pub with_ladder: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: DigestionInputArgs,

    /// Output document (.pdf or .html).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Pair the n-th input with the n-th digestion instead of digesting every
    /// input with every digestion.
    #[arg(long)]
    pub paired: bool,

    /// Also save every annotated record as GenBank in this directory.
    #[arg(long, value_name = "DIR")]
    pub annotated_dir: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `ladder` subcommand.
#[derive(Args, Debug)]
pub struct LadderArgs {
    /// DNA size (bp) to convert to a migration distance. Can be used multiple times.
    #[arg(long = "size", value_name = "BP")]
    pub sizes: Vec<f64>,

    /// Migration distance to convert to a DNA size. Can be used multiple times.
    #[arg(long = "migration", value_name = "DISTANCE")]
    pub migrations: Vec<f64>,

    /// List the built-in ladder presets instead.
    #[arg(long)]
    pub list: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `enzymes` subcommand.
#[derive(Args, Debug)]
pub struct EnzymesArgs {
    /// Only list enzymes whose name or site contains this text (case-insensitive).
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["bandwagon", "enzymes", "-vv", "--log-file", "run.log"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_file, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn digestions_parse_as_enzyme_mixes() {
        let cli = Cli::parse_from([
            "bandwagon", "grid", "-i", "a.fa", "b.gb", "-e", "EcoRI+BamHI", "-e", "NotI", "-o", "grid.svg",
            "--group-by", "records", "--topology", "circular",
        ]);
        let Commands::Grid(args) = cli.command else {
            panic!("expected the grid command");
        };
        assert_eq!(args.input.inputs.len(), 2);
        assert_eq!(args.input.digestions[0].enzymes, vec!["EcoRI", "BamHI"]);
        assert_eq!(args.input.digestions[1].label(), "NotI");
        assert_eq!(args.group_by, GroupBy::Records);
        assert_eq!(args.input.topology, TopologyArg::Circular);
    }

    #[test]
    fn enzyme_flag_is_short_e_on_every_digestion_command() {
        for command in ["digest", "grid", "report"] {
            let parsed = Cli::try_parse_from([
                "bandwagon", command, "-i", "a.fa", "-e", "EcoRI", "--enzymes", "NotI+XhoI", "-o", "out.html",
            ]);
            assert!(parsed.is_ok(), "`{command} -e` was rejected");
        }
        assert!(Cli::try_parse_from(["bandwagon", "digest", "-i", "a.fa", "-d", "EcoRI"]).is_err());
    }

    #[test]
    fn plot_collects_patterns_and_set_values() {
        let cli = Cli::parse_from([
            "bandwagon", "plot", "-o", "gel.png", "-p", "A:500,1200", "-p", "B:300", "--ticks", "5", "-S",
            "ladder.name=100-4k",
        ]);
        let Commands::Plot(args) = cli.command else {
            panic!("expected the plot command");
        };
        assert_eq!(args.patterns, vec!["A:500,1200", "B:300"]);
        assert_eq!(args.ticks, Some(5));
        assert_eq!(args.config.set_values, vec!["ladder.name=100-4k"]);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["bandwagon", "enzymes", "-q", "-v"]).is_err());
    }
}
