use crate::cli::PlotArgs;
use crate::config::{AppConfig, CliOverrides, build_config};
use crate::error::{CliError, Result};
use crate::utils::parser;
use bandwagon::core::models::band::{BandOverrides, SIZE_LABEL_DIRECTIVE};
use bandwagon::core::models::pattern::BandsPattern;
use bandwagon::core::models::pattern_set::{BandsPatternsSet, LadderTicks};
use bandwagon::render::{export, layout};
use tracing::info;

fn patterns_set(app: &AppConfig, label: Option<&str>, show_sizes: bool) -> BandsPatternsSet {
    let mut lanes = vec![app.ladder.pattern().clone()];
    for lane in &app.patterns {
        let mut pattern = BandsPattern::from_sizes(&lane.sizes, &app.ladder);
        if let Some(label) = &lane.label {
            pattern = pattern.with_label(label.clone());
        }
        if let Some(color) = lane.background_color {
            pattern = pattern.with_background_color(color);
        }
        if show_sizes {
            pattern = pattern.with_band_overrides(BandOverrides {
                label: Some(SIZE_LABEL_DIRECTIVE.to_string()),
                ..BandOverrides::default()
            });
        }
        lanes.push(pattern);
    }

    let mut set = BandsPatternsSet::new(lanes, app.ladder.clone());
    if let Some(count) = app.ticks {
        set = set.with_ladder_ticks(LadderTicks::Count(count));
    }
    if let Some(label) = label {
        set = set.with_label(label);
    }
    set
}

pub fn run(args: PlotArgs) -> Result<()> {
    let patterns = args
        .patterns
        .iter()
        .map(|spec| {
            parser::parse_pattern(spec).map(|(label, sizes)| crate::config::PatternInput {
                label,
                sizes,
                background_color: None,
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CliError::Argument(e.to_string()))?;

    let app = build_config(
        &args.config,
        &CliOverrides {
            ticks: args.ticks,
            patterns,
        },
    )?;
    if app.patterns.is_empty() {
        return Err(CliError::Argument(
            "Nothing to plot. Pass --pattern or list [[patterns]] in the config file.".to_string(),
        ));
    }

    info!("Plotting {} pattern(s) against ladder {:?}.", app.patterns.len(), app.ladder.label());
    let set = patterns_set(&app, args.label.as_deref(), args.show_sizes);
    let scene = layout::pattern_set(&set, &app.render)?;
    export(&scene, &args.output, &app.render)?;

    println!("✓ Gel written to: {}", args.output.display());
    Ok(())
}
