// [[file:../wwatch3.note::*imports][imports:1]]
//! The `prepare` and `run` sub-commands

use crate::common::*;
use crate::desc::{resolve_path, RunConfig, RunDesc};
use crate::materialize::{apply, consolidate, plan_materializations};
use crate::plan::{build_day_plan, dir_timestamp, Clock};
use crate::submit::{dispatch, QueueManager};
use crate::template::{BuiltinTemplate, RunContext, RunTemplate, RUN_SCRIPT};

use chrono::NaiveDate;
// imports:1 ends here

// [[file:../wwatch3.note::*prepare][prepare:1]]
/// Create and populate a temporary run directory for the run described in
/// `desc_file`, returning its path.
///
/// The directory is named from the run id and an ISO-like timestamp, e.g.
/// `SoGwaves_2019-09-28T131343.123456-0700`.
pub fn prepare(desc_file: &Path, clock: &dyn Clock, quiet: bool) -> Result<PathBuf> {
    let desc = RunDesc::from_file(desc_file)?;
    let config = RunConfig::from_desc(&desc)?;

    let name = format!("{}_{}", config.run_id, dir_timestamp(&clock.now()));
    let tmp_run_dir = config.runs_dir.join(&name);
    let context = RunContext {
        run_id: config.run_id.clone(),
        runs_dir: config.runs_dir.to_string_lossy().into_owned(),
        tmp_run_dir: name,
        work_dir: tmp_run_dir.to_string_lossy().into_owned(),
        mod_def_ww3_path: config.mod_def_ww3.to_string_lossy().into_owned(),
        current_forcing_dir: config.current_forcing_dir.to_string_lossy().into_owned(),
        wind_forcing_dir: config.wind_forcing_dir.to_string_lossy().into_owned(),
        n_days: 1,
        ..Default::default()
    };
    BuiltinTemplate.render(&context, &tmp_run_dir)?;

    if !quiet {
        println!("Created temporary run directory: {}", tmp_run_dir.display());
    }

    Ok(tmp_run_dir)
}
// prepare:1 ends here

// [[file:../wwatch3.note::*run][run:1]]
/// Options of the `run` sub-command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// The YAML run description file.
    pub desc_file: PathBuf,

    /// Walltime for the batch job, passed to `sbatch` verbatim.
    pub walltime: String,

    /// Directory to gather results into; created if missing.
    pub results_dir: PathBuf,

    /// First day of the run. Defaults to today.
    pub start_date: Option<NaiveDate>,

    pub n_days: usize,

    /// Prepare everything but do not submit to the queue.
    pub no_submit: bool,

    pub quiet: bool,
}

/// What a `run` invocation created and submitted.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub tmp_run_dirs: Vec<PathBuf>,

    /// The script submitted to the queue manager.
    pub run_script: PathBuf,

    /// The queue manager acknowledgement. `None` if not submitted.
    pub submit_msg: Option<String>,
}

/// Create and populate temporary run directories for every day of the run,
/// and submit the first day's run script to the queue manager.
///
/// Directories already created are left in place when a later step fails.
pub fn run(opts: &RunOptions, clock: &dyn Clock, queue: &dyn QueueManager) -> Result<RunOutcome> {
    let desc = RunDesc::from_file(&opts.desc_file)?;
    let config = RunConfig::from_desc(&desc)?;
    let results_dir = resolve_path(&opts.results_dir.to_string_lossy())?;
    let start_date = opts.start_date.unwrap_or_else(|| clock.today());

    let plan = build_day_plan(&config, &results_dir, start_date, opts.n_days, clock)?;
    info!("run {} for {} day(s) from {}", config.run_id, plan.len(), start_date);

    let days = plan_materializations(&desc, &opts.desc_file, &config, &plan, &opts.walltime)?;
    for day in &days {
        apply(day, &BuiltinTemplate, opts.quiet)?;
    }
    consolidate(&days)?;

    let run_script = plan.first().tmp_run_dir.join(RUN_SCRIPT);
    if !opts.quiet {
        println!("Wrote job run script to {}", run_script.display());
    }

    let submit_msg = dispatch(queue, &run_script, opts.no_submit)?;
    Ok(RunOutcome {
        tmp_run_dirs: days.into_iter().map(|d| d.tmp_run_dir).collect(),
        run_script,
        submit_msg,
    })
}
// run:1 ends here
