// [[file:../../wwatch3.note::*imports][imports:1]]
use gosh_core::gut::cli::Verbosity;
use gosh_core::gut::prelude::*;
use structopt::StructOpt;

use std::path::PathBuf;

use chrono::NaiveDate;
use wwatch3_cmd::{prepare, run, RunOptions, Sbatch, SystemClock};
// imports:1 ends here

// [[file:../../wwatch3.note::*structopt][structopt:1]]
/// WaveWatch III® Command Processor
#[derive(StructOpt, Debug)]
#[structopt(name = "wwatch3")]
struct Cli {
    #[structopt(flatten)]
    verbosity: Verbosity,

    #[structopt(subcommand)]
    cmd: Action,
}

#[derive(StructOpt, Debug)]
enum Action {
    /// Set up the WaveWatch III® run described in DESC_FILE and print the
    /// path of the temporary run directory.
    #[structopt(name = "prepare")]
    Prepare {
        /// run description YAML file
        #[structopt(name = "DESC_FILE", parse(from_os_str))]
        desc_file: PathBuf,

        /// don't show the run directory path on completion
        #[structopt(short = "q", long = "quiet")]
        quiet: bool,
    },

    /// Prepare, execute, and gather the results from a WaveWatch III® run
    /// described in DESC_FILE.
    ///
    /// The results files from the run are gathered in RESULTS_DIR. If
    /// RESULTS_DIR does not exist it will be created.
    #[structopt(name = "run")]
    Run {
        /// run description YAML file
        #[structopt(name = "DESC_FILE", parse(from_os_str))]
        desc_file: PathBuf,

        /// HPC batch job walltime for the run; formatted as HH:MM:SS
        #[structopt(name = "WALLTIME")]
        walltime: String,

        /// directory to store results into
        #[structopt(name = "RESULTS_DIR", parse(from_os_str))]
        results_dir: PathBuf,

        /// Prepare the temporary run directory, and the bash script to
        /// execute the WaveWatch III® run, but don't submit the run to the
        /// queue.
        #[structopt(long = "no-submit")]
        no_submit: bool,

        /// don't show the run directory path or job submission message
        #[structopt(short = "q", long = "quiet")]
        quiet: bool,

        /// Date to start the run on. Use YYYY-MM-DD format. Defaults to today.
        #[structopt(long = "start-date", parse(try_from_str = parse_date))]
        start_date: Option<NaiveDate>,

        /// Number of days of runs to execute in the batch job.
        #[structopt(long = "n-days", default_value = "1", parse(try_from_str = parse_n_days))]
        n_days: usize,
    },
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("unrecognized date format: {} - please use YYYY-MM-DD", s))
}

fn parse_n_days(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("invalid number of days: {} - must be an integer >= 1", s)),
    }
}
// structopt:1 ends here

// [[file:../../wwatch3.note::*main][main:1]]
fn main() -> Result<()> {
    let args = Cli::from_args();
    args.verbosity.setup_logger();

    let clock = SystemClock;
    match args.cmd {
        Action::Prepare { desc_file, quiet } => {
            prepare(&desc_file, &clock, quiet)?;
        }
        Action::Run {
            desc_file,
            walltime,
            results_dir,
            no_submit,
            quiet,
            start_date,
            n_days,
        } => {
            let opts = RunOptions {
                desc_file,
                walltime,
                results_dir,
                start_date,
                n_days,
                no_submit,
                quiet,
            };
            let outcome = run(&opts, &clock, &Sbatch::default())?;
            if let Some(msg) = outcome.submit_msg {
                if !quiet {
                    println!("{}", msg);
                }
            }
        }
    }

    Ok(())
}
// main:1 ends here

// [[file:../../wwatch3.note::*test][test:1]]
#[test]
fn test_cli_args() {
    let args = Cli::from_iter_safe(&["wwatch3", "run", "foo.yaml", "00:20:00", "results/foo/"]).unwrap();
    match args.cmd {
        Action::Run {
            walltime,
            no_submit,
            quiet,
            start_date,
            n_days,
            ..
        } => {
            assert_eq!(walltime, "00:20:00");
            assert!(!no_submit);
            assert!(!quiet);
            assert_eq!(start_date, None);
            assert_eq!(n_days, 1);
        }
        _ => panic!("expected run"),
    }

    let args = Cli::from_iter_safe(&[
        "wwatch3",
        "run",
        "foo.yaml",
        "00:20:00",
        "results/foo/",
        "--start-date",
        "2019-10-09",
        "--n-days",
        "3",
        "--no-submit",
        "-q",
    ])
    .unwrap();
    match args.cmd {
        Action::Run {
            no_submit,
            quiet,
            start_date,
            n_days,
            ..
        } => {
            assert!(no_submit);
            assert!(quiet);
            assert_eq!(start_date, Some(NaiveDate::from_ymd(2019, 10, 9)));
            assert_eq!(n_days, 3);
        }
        _ => panic!("expected run"),
    }

    let bad_date = &["wwatch3", "run", "foo.yaml", "00:20:00", "r/", "--start-date", "2019-13-45"];
    assert!(Cli::from_iter_safe(bad_date).is_err());
    let bad_days = &["wwatch3", "run", "foo.yaml", "00:20:00", "r/", "--n-days", "0"];
    assert!(Cli::from_iter_safe(bad_days).is_err());

    let args = Cli::from_iter_safe(&["wwatch3", "prepare", "foo.yaml", "--quiet"]).unwrap();
    match args.cmd {
        Action::Prepare { desc_file, quiet } => {
            assert_eq!(desc_file, PathBuf::from("foo.yaml"));
            assert!(quiet);
        }
        _ => panic!("expected prepare"),
    }
}
// test:1 ends here
