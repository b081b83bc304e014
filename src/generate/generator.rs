use chrono::{DateTime, FixedOffset};
use indicatif::ProgressBar;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::GenerateError;
use crate::git::VersionControl;
use crate::paths::Paths;
use crate::progress::Phase;
use crate::record::{CommitRecord, MarkRecord, write_record};
use crate::schedule::{
    Clock, Offset, OffsetSource, RandomOffsets, SystemClock, format_date, synthetic_date,
};

/// One commit created by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCommit {
    pub id: String,
    /// The synthetic date; also the commit message.
    pub date: String,
    /// Counter value written into the record (`None` for single-shot commits).
    pub counter: Option<u32>,
    pub offset: Offset,
}

/// Result of the final push attempt. Never turns a run into a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    Skipped,
    Failed(String),
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct Report {
    pub commits: Vec<CreatedCommit>,
    pub push: PushOutcome,
}

/// Creates backdated commits against one working tree.
///
/// Each iteration is strictly sequential: draw an offset, compute the date,
/// overwrite the data file, stage it, commit it. The first failing step
/// stops the run; already created commits stay in history. After the last
/// iteration a single push is attempted and its failure is only reported.
pub struct Generator<V> {
    vcs: V,
    data_file: PathBuf,
    stage_path: PathBuf,
    delay: Duration,
    push: bool,
    clock: Box<dyn Clock>,
    offsets: Box<dyn OffsetSource>,
    pb: ProgressBar,
    /// Receives progress lines while `pb` is hidden (no terminal).
    console: Box<dyn Write>,
}

impl<V: VersionControl> Generator<V> {
    /// A generator writing to `paths.data_file`, with random offsets, the
    /// local clock, a 100ms pause between iterations and pushing enabled.
    pub fn new(vcs: V, paths: &Paths) -> Self {
        Self {
            vcs,
            data_file: paths.data_file.clone(),
            stage_path: paths.data_rel.clone(),
            delay: Duration::from_millis(100),
            push: true,
            clock: Box::new(SystemClock),
            offsets: Box::new(RandomOffsets::new()),
            pb: ProgressBar::hidden(),
            console: Box::new(io::stderr()),
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push(mut self, enabled: bool) -> Self {
        self.push = enabled;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn offsets(mut self, offsets: impl OffsetSource + 'static) -> Self {
        self.offsets = Box::new(offsets);
        self
    }

    pub fn progress(mut self, pb: ProgressBar) -> Self {
        self.pb = pb;
        self
    }

    /// Where progress lines go when the progress bar is not drawn.
    pub fn console(mut self, out: impl Write + 'static) -> Self {
        self.console = Box::new(out);
        self
    }

    pub fn backend(&self) -> &V {
        &self.vcs
    }

    /// Create exactly `n` backdated commits, then attempt one push.
    ///
    /// The counter written into each record runs from `n` down to `1`.
    ///
    /// # Errors
    /// Returns [`GenerateError::Iteration`] for the first write, stage or
    /// commit failure; no further iterations run and no push is attempted.
    pub fn run(&mut self, n: u32) -> Result<Report, GenerateError> {
        self.start_progress();
        let mut commits = Vec::with_capacity(n.min(1024) as usize);

        for remaining in (1..=n).rev() {
            match self.step(remaining) {
                Ok(c) => commits.push(c),
                Err(source) => {
                    let err = GenerateError::Iteration {
                        remaining,
                        completed: commits.len(),
                        source: Box::new(source),
                    };
                    self.fail_progress(&err);
                    return Err(err);
                }
            }
            if remaining > 1 && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }

        info!(count = commits.len(), "all commits created");
        let push = self.push_attempt();
        self.finish_progress(commits.len());
        Ok(Report { commits, push })
    }

    /// Create one commit at the explicit `x` weeks / `y` days offset, then
    /// attempt one push.
    ///
    /// # Errors
    /// - [`GenerateError::InvalidOffset`] before any side effect if `x`/`y` are out of range.
    /// - Write, stage or commit failures as in [`Generator::run`], unwrapped.
    pub fn mark(&mut self, x: u32, y: u32) -> Result<Report, GenerateError> {
        let offset = Offset::new(x, y)?;
        self.start_progress();

        let now = self.clock.now();
        let date = synthetic_date(&now, offset)?;
        let stamp = format_date(&date);
        self.pb.set_message(format!("creating commit: {}", stamp));

        let record = MarkRecord::new(stamp.clone(), x, y);
        let id = match self.commit_record(&record, &stamp, &date) {
            Ok(id) => id,
            Err(e) => {
                self.fail_progress(&e);
                return Err(e);
            }
        };

        self.note(format!("created commit: {}", stamp));

        let commits = vec![CreatedCommit {
            id,
            date: stamp,
            counter: None,
            offset,
        }];
        let push = self.push_attempt();
        self.finish_progress(commits.len());
        Ok(Report { commits, push })
    }

    fn step(&mut self, remaining: u32) -> Result<CreatedCommit, GenerateError> {
        let offset = self.offsets.next_offset();
        let now = self.clock.now();
        let date = synthetic_date(&now, offset)?;
        let stamp = format_date(&date);

        debug!(remaining, weeks = offset.weeks, days = offset.days, date = %stamp, "creating commit");
        self.pb
            .set_message(format!("creating commit {}: {}", remaining, stamp));

        let record = CommitRecord {
            date: stamp.clone(),
            commit: remaining,
        };
        let id = self.commit_record(&record, &stamp, &date)?;
        self.note(format!("created commit {}: {}", remaining, stamp));

        Ok(CreatedCommit {
            id,
            date: stamp,
            counter: Some(remaining),
            offset,
        })
    }

    /// Overwrite the data file with `record`, stage it and commit it.
    fn commit_record<T: Serialize>(
        &mut self,
        record: &T,
        stamp: &str,
        date: &DateTime<FixedOffset>,
    ) -> Result<String, GenerateError> {
        write_record(&self.data_file, record)?;
        self.vcs
            .stage(&self.stage_path)
            .map_err(|source| GenerateError::Stage {
                path: self.stage_path.clone(),
                source,
            })?;
        self.vcs
            .commit(stamp, date)
            .map_err(|source| GenerateError::Commit { source })
    }

    fn push_attempt(&mut self) -> PushOutcome {
        if !self.push {
            debug!("push disabled");
            return PushOutcome::Skipped;
        }
        self.pb.set_message("pushing to remote…");
        match self.vcs.push() {
            Ok(()) => {
                info!("pushed to remote");
                PushOutcome::Pushed
            }
            Err(e) => {
                warn!(error = %e, "could not push to remote");
                PushOutcome::Failed(e.to_string())
            }
        }
    }

    /// Print one progress line above the spinner, or to the console when
    /// the spinner is hidden.
    fn note(&mut self, line: String) {
        if self.pb.is_hidden() {
            let _ = writeln!(self.console, "{}", line);
        } else {
            self.pb.println(line);
        }
    }

    fn start_progress(&self) {
        self.pb.set_style(Phase::Running.style());
        self.pb.enable_steady_tick(Duration::from_millis(80));
    }

    fn finish_progress(&self, count: usize) {
        self.pb.set_style(Phase::Done.style());
        self.pb
            .finish_with_message(format!("created {} commit(s)", count));
    }

    fn fail_progress(&self, err: &GenerateError) {
        self.pb.set_style(Phase::Failed.style());
        self.pb.finish_with_message(format!("error: {}", err));
    }
}
