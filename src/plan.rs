// [[file:../wwatch3.note::*imports][imports:1]]
//! Plan the simulated days of a run: names, directories and restart chaining

use crate::common::*;
use crate::desc::RunConfig;

use chrono::prelude::*;
// imports:1 ends here

// [[file:../wwatch3.note::*clock][clock:1]]
/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Today at midnight, the default first day of a run.
    fn today(&self) -> NaiveDate {
        self.now().naive_local().date()
    }
}

/// The wall clock in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().into()
    }
}

/// A clock always reporting the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Timestamp used in temporary run directory names, e.g.
/// `2019-10-13T131343.123456-0700`.
pub fn dir_timestamp(t: &DateTime<FixedOffset>) -> String {
    t.format("%Y-%m-%dT%H%M%S%.6f%z").to_string()
}

/// Compact lower-cased day tag, e.g. `13oct19`.
pub fn day_tag(date: NaiveDate) -> String {
    date.format("%d%b%y").to_string().to_lowercase()
}
// clock:1 ends here

// [[file:../wwatch3.note::*base][base:1]]
/// One simulated day of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct DayEntry {
    /// The simulated day, starting at midnight.
    pub date: NaiveDate,

    pub run_id: String,

    /// Directory the results of this day are gathered into.
    pub results_dir: PathBuf,

    /// Temporary run directory the model runs in.
    pub tmp_run_dir: PathBuf,

    /// The restart file this day starts from. `None` for a cold start.
    pub restart_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanWarning {
    /// Multi-day run without restart file: every day starts from calm state.
    ColdStart,
}

/// The ordered days of one `run` invocation.
#[derive(Debug, Clone)]
pub struct DayPlan {
    entries: Vec<DayEntry>,
    timestamp: String,
    warnings: Vec<PlanWarning>,
}

impl DayPlan {
    pub fn entries(&self) -> &[DayEntry] {
        &self.entries
    }

    /// The timestamp shared by all temporary run directory names.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn warnings(&self) -> &[PlanWarning] {
        &self.warnings
    }

    pub fn is_multi_day(&self) -> bool {
        self.entries.len() > 1
    }

    /// The first day, which drives the whole batch.
    pub fn first(&self) -> &DayEntry {
        &self.entries[0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
// base:1 ends here

// [[file:../wwatch3.note::*core][core:1]]
/// Compute the days of a run of `n_days` starting at `start_date`.
pub fn build_day_plan(
    config: &RunConfig,
    results_dir: &Path,
    start_date: NaiveDate,
    n_days: usize,
    clock: &dyn Clock,
) -> Result<DayPlan> {
    if n_days == 0 {
        bail!("number of days must be at least 1");
    }

    let timestamp = dir_timestamp(&clock.now());
    let run_id = &config.run_id;
    let mut warnings = vec![];

    if n_days == 1 {
        let entry = DayEntry {
            date: start_date,
            run_id: run_id.clone(),
            results_dir: results_dir.to_owned(),
            tmp_run_dir: config.runs_dir.join(format!("{}_{}", run_id, timestamp)),
            restart_path: config.restart.clone(),
        };
        return Ok(DayPlan {
            entries: vec![entry],
            timestamp,
            warnings,
        });
    }

    let mut entries: Vec<DayEntry> = Vec::with_capacity(n_days);
    for i in 0..n_days {
        let date = start_date + chrono::Duration::days(i as i64);
        let tag = day_tag(date);
        let restart_path = match entries.last() {
            None => config.restart.clone(),
            Some(prev) => match &prev.restart_path {
                Some(p) => Some(chain_restart_path(p, prev.date)?),
                None => None,
            },
        };
        entries.push(DayEntry {
            date,
            run_id: format!("{}_{}", run_id, tag),
            results_dir: results_dir.join(&tag),
            tmp_run_dir: config.runs_dir.join(format!("{}_{}_{}", run_id, tag, timestamp)),
            restart_path,
        });
    }

    if config.restart.is_none() {
        warn!("multi-day run without restart file: every day will start from calm state");
        warnings.push(PlanWarning::ColdStart);
    }

    Ok(DayPlan {
        entries,
        timestamp,
        warnings,
    })
}

/// The restart file written by the day `prev_date`, in the results directory
/// of that day: the sibling of the directory holding `prev_restart`.
fn chain_restart_path(prev_restart: &Path, prev_date: NaiveDate) -> Result<PathBuf> {
    let name = prev_restart
        .file_name()
        .with_context(|| format!("invalid restart file path: {}", prev_restart.display()))?;
    let dir = prev_restart
        .parent()
        .with_context(|| format!("restart file has no results root: {}", prev_restart.display()))?;
    // a restart file directly under `/` chains from `/`
    let root = dir.parent().unwrap_or(dir);
    Ok(root.join(day_tag(prev_date)).join(name))
}
// core:1 ends here

// test:1 ends here
