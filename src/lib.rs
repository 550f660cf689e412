// [[file:../wwatch3.note::*header][header:1]]
//! WaveWatch III command processor
//!
//! Prepare temporary run directories for WaveWatch III runs described in a
//! YAML run description file, and submit them to the Slurm queue manager.
// header:1 ends here

// [[file:../wwatch3.note::*mods][mods:1]]
pub mod desc;
pub mod materialize;
pub mod plan;
pub mod run;
pub mod sbatch;
pub mod submit;
pub mod template;

pub use crate::desc::{RunConfig, RunDesc, RunDescError};
pub use crate::plan::{build_day_plan, Clock, DayEntry, DayPlan, FixedClock, SystemClock};
pub use crate::run::{prepare, run, RunOptions, RunOutcome};
pub use crate::submit::{QueueManager, Sbatch};
pub use crate::template::{BuiltinTemplate, RunContext, RunTemplate};

pub(crate) mod common {
    pub use gosh_core::*;

    pub use gut::prelude::*;
    pub use std::path::{Path, PathBuf};
}
// mods:1 ends here
