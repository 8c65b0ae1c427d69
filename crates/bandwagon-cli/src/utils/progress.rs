use bandwagon::workflows::progress::{Progress, ProgressCallback, ProgressReporter};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;
const PHASE_TEMPLATE: &str = "{spinner:.green} {msg}";
const TASK_TEMPLATE: &str = "{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})";

fn phase_style() -> ProgressStyle {
    ProgressStyle::with_template(PHASE_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn task_style() -> ProgressStyle {
    ProgressStyle::with_template(TASK_TEMPLATE)
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Shows workflow progress on stderr: a spinner while a phase runs, a bar
/// while a counted task runs. Clones share the same bar.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(phase_style());
        bar.finish_and_clear();
        Self { bar }
    }

    /// A reporter forwarding every event to this handler.
    pub fn reporter(&self) -> ProgressReporter<'static> {
        ProgressReporter::with_callback(self.get_callback())
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let handler = self.clone();
        Box::new(move |event| handler.handle(event))
    }

    fn handle(&self, event: Progress) {
        let bar = &self.bar;
        match event {
            Progress::PhaseStart { name } => {
                bar.reset();
                bar.set_length(0);
                bar.set_style(phase_style());
                bar.set_message(name);
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::TaskStart { total_steps } => {
                bar.disable_steady_tick();
                bar.reset();
                bar.set_length(total_steps);
                bar.set_style(task_style());
            }
            Progress::TaskIncrement => bar.inc(1),
            Progress::TaskFinish => {
                if let Some(total) = bar.length() {
                    bar.set_position(total);
                }
                bar.finish();
            }
            Progress::Message(text) if bar.is_finished() => bar.set_message(text),
            Progress::Message(text) => bar.println(format!("  {text}")),
            Progress::PhaseFinish => {
                bar.disable_steady_tick();
                bar.finish_with_message("✓ Done");
            }
        }
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
