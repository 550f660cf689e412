// [[file:../wwatch3.note::*imports][imports:1]]
//! Slurm batch directives for the run script

use crate::common::*;
use crate::desc::RunConfig;

use std::fmt::Write as _;
// imports:1 ends here

// [[file:../wwatch3.note::*base][base:1]]
/// Default tasks per node for a single day run.
pub const SINGLE_DAY_NTASKS_PER_NODE: u32 = 48;

/// Default tasks per node for a multi-day run.
pub const MULTI_DAY_NTASKS_PER_NODE: u32 = 20;

/// Hardware constraint requested for every run.
const CONSTRAINT: &str = "skylake";
// base:1 ends here

// [[file:../wwatch3.note::*directives][directives:1]]
/// Render the `#SBATCH` directives block for one run script.
///
/// `run_id` is the identifier of the run the script is for: the base run id
/// of `config` for single day runs, or the day tagged one otherwise.
pub fn sbatch_directives(
    config: &RunConfig,
    run_id: &str,
    results_dir: &Path,
    walltime: &str,
    ntasks_per_node: u32,
) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "#SBATCH --job-name={}", run_id);
    let _ = writeln!(s, "#SBATCH --mail-user={}", config.email);
    let _ = writeln!(s, "#SBATCH --mail-type=ALL");
    let _ = writeln!(s, "#SBATCH --account={}", config.account);
    let _ = writeln!(s, "#SBATCH --constraint={}", CONSTRAINT);
    let _ = writeln!(s, "#SBATCH --nodes=1");
    let _ = writeln!(s, "#SBATCH --ntasks-per-node={}", ntasks_per_node);
    let _ = writeln!(s, "#SBATCH --mem=0");
    let _ = writeln!(s, "#SBATCH --time={}", walltime);
    let _ = writeln!(s, "# stdout and stderr file paths/names");
    let _ = writeln!(s, "#SBATCH --output={}", results_dir.join("stdout").display());
    let _ = writeln!(s, "#SBATCH --error={}", results_dir.join("stderr").display());
    s
}

/// Tasks per node for a plan of `n_days`, honoring the override in the run
/// description.
pub fn ntasks_per_node(config: &RunConfig, n_days: usize) -> u32 {
    match config.ntasks_per_node {
        Some(n) => n,
        None if n_days > 1 => MULTI_DAY_NTASKS_PER_NODE,
        None => SINGLE_DAY_NTASKS_PER_NODE,
    }
}
// directives:1 ends here

// test:1 ends here
