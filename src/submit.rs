// [[file:../wwatch3.note::*imports][imports:1]]
//! Submit job run scripts to the queue manager

use crate::common::*;

use duct::cmd;
// imports:1 ends here

// [[file:../wwatch3.note::*base][base:1]]
/// A cluster queue manager accepting job run scripts.
pub trait QueueManager {
    /// Submit `script`, returning the acknowledgement of the queue manager.
    fn submit(&self, script: &Path) -> Result<String>;
}

/// The Slurm queue manager, via `sbatch`.
#[derive(Debug, Clone)]
pub struct Sbatch {
    program: String,
}

impl Default for Sbatch {
    fn default() -> Self {
        Self { program: "sbatch".into() }
    }
}

impl Sbatch {
    /// Use `program` instead of `sbatch` found in `PATH`.
    pub fn new(program: &str) -> Self {
        Self { program: program.into() }
    }

    /// The submitting command line as program and arguments.
    pub fn cmdline(&self, script: &Path) -> Vec<String> {
        vec![self.program.clone(), script.to_string_lossy().into_owned()]
    }
}

impl QueueManager for Sbatch {
    fn submit(&self, script: &Path) -> Result<String> {
        let cmdline = self.cmdline(script);
        debug!("submit cmdline: {:?}", cmdline);

        // NOTE: no timeout: an unresponsive queue manager blocks here.
        let stdout = cmd(&cmdline[0], &cmdline[1..])
            .read()
            .with_context(|| format!("failed to submit {} with {}", script.display(), self.program))?;

        Ok(stdout)
    }
}
// base:1 ends here

// [[file:../wwatch3.note::*dispatch][dispatch:1]]
/// Submit `script` to `queue` unless `no_submit` is set.
pub fn dispatch(queue: &dyn QueueManager, script: &Path, no_submit: bool) -> Result<Option<String>> {
    if no_submit {
        info!("skipped submission of {}", script.display());
        return Ok(None);
    }
    let msg = queue.submit(script)?;
    Ok(Some(msg))
}
// dispatch:1 ends here

// [[file:../wwatch3.note::*test][test:1]]
#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        scripts: RefCell<Vec<PathBuf>>,
    }

    impl QueueManager for Recorder {
        fn submit(&self, script: &Path) -> Result<String> {
            self.scripts.borrow_mut().push(script.to_owned());
            Ok("Submitted batch job 1234".into())
        }
    }

    #[test]
    fn test_dispatch() -> Result<()> {
        let queue = Recorder::default();
        let script = Path::new("/runs/a/SoGWW3.sh");
        assert_eq!(dispatch(&queue, script, true)?, None);
        assert!(queue.scripts.borrow().is_empty());

        let msg = dispatch(&queue, script, false)?;
        assert_eq!(msg.as_deref(), Some("Submitted batch job 1234"));
        assert_eq!(*queue.scripts.borrow(), vec![script.to_owned()]);
        Ok(())
    }

    #[test]
    fn test_sbatch_cmdline() {
        let sbatch = Sbatch::default();
        let script = Path::new("/runs/SoGwaves 1/SoGWW3.sh");
        assert_eq!(sbatch.cmdline(script), ["sbatch", "/runs/SoGwaves 1/SoGWW3.sh"]);
    }

    #[test]
    fn test_sbatch_submit() -> Result<()> {
        // stand-in queue managers
        let echo = Sbatch::new("echo");
        let msg = echo.submit(Path::new("SoGWW3.sh"))?;
        assert_eq!(msg, "SoGWW3.sh");

        let failing = Sbatch::new("false");
        assert!(failing.submit(Path::new("SoGWW3.sh")).is_err());
        Ok(())
    }
}
// test:1 ends here
