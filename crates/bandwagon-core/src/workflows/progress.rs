/// Events emitted by long-running workflows, for front ends to display.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// A counted task begins; one `TaskIncrement` follows per step.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Carries an optional progress callback through a workflow. A reporter
/// without callback drops every event.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn events_reach_the_callback_in_order() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(event);
        }));
        reporter.report(Progress::PhaseStart { name: "Digest" });
        reporter.report(Progress::TaskStart { total_steps: 2 });
        reporter.report(Progress::TaskIncrement);
        drop(reporter);

        let seen = seen.into_inner().unwrap();
        assert_eq!(
            seen,
            vec![
                Progress::PhaseStart { name: "Digest" },
                Progress::TaskStart { total_steps: 2 },
                Progress::TaskIncrement,
            ]
        );
    }

    #[test]
    fn silent_reporter_ignores_events() {
        ProgressReporter::new().report(Progress::Message("ignored".to_string()));
    }
}
