// [[file:../wwatch3.note::*imports][imports:1]]
//! Materialize the planned days into temporary run directories

use crate::common::*;
use crate::desc::{RunConfig, RunDesc};
use crate::plan::{DayEntry, DayPlan};
use crate::sbatch::{ntasks_per_node, sbatch_directives};
use crate::template::{RunContext, RunTemplate, RUN_SCRIPT};
// imports:1 ends here

// [[file:../wwatch3.note::*base][base:1]]
/// Environment modules required by the WaveWatch III executables.
pub const MODULE_LOAD: &str = "module load netcdf-fortran-mpi/4.4.4";

/// How the run description is kept in a temporary run directory.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistDesc {
    /// Byte for byte copy of the original file.
    Copy { from: PathBuf, to: PathBuf },
    /// A rewritten description in YAML.
    Write { to: PathBuf, yaml: String },
}

/// File system operations for materializing one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayMaterialization {
    pub context: RunContext,
    pub tmp_run_dir: PathBuf,
    pub persist: PersistDesc,
    pub ensure_dirs: Vec<PathBuf>,
}

impl DayMaterialization {
    /// The job run script of this day.
    pub fn run_script(&self) -> PathBuf {
        self.tmp_run_dir.join(RUN_SCRIPT)
    }
}

fn path_string(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

/// Join a value of every day as indented lines, for a bash array.
fn join_days<F: Fn(&DayEntry) -> String>(plan: &DayPlan, f: F) -> String {
    let items: Vec<_> = plan.entries().iter().map(f).collect();
    items.join("\n  ")
}
// base:1 ends here

// [[file:../wwatch3.note::*plan][plan:1]]
/// Describe the file system operations for every day in `plan`.
///
/// Nothing is touched on disk here; see `apply` for execution.
pub fn plan_materializations(
    desc: &RunDesc,
    desc_file: &Path,
    config: &RunConfig,
    plan: &DayPlan,
    walltime: &str,
) -> Result<Vec<DayMaterialization>> {
    let desc_name = desc_file
        .file_name()
        .with_context(|| format!("invalid run description file: {}", desc_file.display()))?;
    let ntasks = ntasks_per_node(config, plan.len());

    // the lists are embedded in the first day's run script for looping
    let (start_dates, results_dirs, work_dirs) = if plan.is_multi_day() {
        (
            join_days(plan, |d| d.date.format("%Y%m%d").to_string()),
            join_days(plan, |d| path_string(&d.results_dir)),
            join_days(plan, |d| path_string(&d.tmp_run_dir)),
        )
    } else {
        Default::default()
    };

    let mut days = vec![];
    for day in plan.entries() {
        let end_date = day.date + chrono::Duration::days(1);
        let context = RunContext {
            run_id: day.run_id.clone(),
            runs_dir: path_string(&config.runs_dir),
            tmp_run_dir: day
                .tmp_run_dir
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            work_dir: path_string(&day.tmp_run_dir),
            start_date: day.date.format("%Y-%m-%d").to_string(),
            start_date_yyyymmdd: day.date.format("%Y%m%d").to_string(),
            end_date_yyyymmdd: end_date.format("%Y%m%d").to_string(),
            mod_def_ww3_path: path_string(&config.mod_def_ww3),
            current_forcing_dir: path_string(&config.current_forcing_dir),
            wind_forcing_dir: path_string(&config.wind_forcing_dir),
            restart_path: day.restart_path.as_deref().map(path_string).unwrap_or_default(),
            sbatch_directives: sbatch_directives(config, &day.run_id, &day.results_dir, walltime, ntasks),
            module_load: MODULE_LOAD.into(),
            ntasks,
            results_dir: path_string(&day.results_dir),
            multi_day: plan.is_multi_day(),
            n_days: plan.len(),
            run_start_dates_yyyymmdd: start_dates.clone(),
            results_dirs: results_dirs.clone(),
            work_dirs: work_dirs.clone(),
        };

        let to = day.tmp_run_dir.join(desc_name);
        let persist = if plan.is_multi_day() {
            let yaml = desc
                .with_day_overrides(&day.run_id, day.restart_path.as_deref())
                .to_yaml_string()?;
            PersistDesc::Write { to, yaml }
        } else {
            PersistDesc::Copy {
                from: desc_file.to_owned(),
                to,
            }
        };

        days.push(DayMaterialization {
            context,
            tmp_run_dir: day.tmp_run_dir.clone(),
            persist,
            ensure_dirs: vec![day.results_dir.clone()],
        });
    }

    Ok(days)
}
// plan:1 ends here

// [[file:../wwatch3.note::*apply][apply:1]]
/// Carry out the file system operations of one day.
pub fn apply(day: &DayMaterialization, template: &dyn RunTemplate, quiet: bool) -> Result<()> {
    template
        .render(&day.context, &day.tmp_run_dir)
        .with_context(|| format!("failed to create run directory {}", day.tmp_run_dir.display()))?;
    if !quiet {
        println!("Created temporary run directory {}", day.tmp_run_dir.display());
    }

    match &day.persist {
        PersistDesc::Copy { from, to } => {
            std::fs::copy(from, to).with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
        }
        PersistDesc::Write { to, yaml } => {
            std::fs::write(to, yaml).with_context(|| format!("write {}", to.display()))?;
        }
    }

    for d in &day.ensure_dirs {
        std::fs::create_dir_all(d).with_context(|| format!("create directory {}", d.display()))?;
        debug!("results directory: {}", d.display());
    }

    Ok(())
}
// apply:1 ends here

// [[file:../wwatch3.note::*consolidate][consolidate:1]]
/// Run scripts made redundant by the first day's script, which loops over
/// all the days of the plan.
pub fn redundant_scripts(days: &[DayMaterialization]) -> Vec<PathBuf> {
    days.iter().skip(1).map(|d| d.run_script()).collect()
}

/// Remove the redundant run scripts. Missing scripts are ignored.
pub fn consolidate(days: &[DayMaterialization]) -> Result<()> {
    for script in redundant_scripts(days) {
        match std::fs::remove_file(&script) {
            Ok(()) => debug!("removed {}", script.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("remove {}", script.display())),
        }
    }
    Ok(())
}
// consolidate:1 ends here

// test:1 ends here
