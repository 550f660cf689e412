// [[file:../wwatch3.note::*imports][imports:1]]
//! Loading and validating YAML run description files

use crate::common::*;

use serde_yaml::{Mapping, Value};
use thiserror::Error;
// imports:1 ends here

// [[file:../wwatch3.note::*error][error:1]]
/// Problems found while reading values from a run description.
#[derive(Debug, Error)]
pub enum RunDescError {
    #[error("failed to read run description file {}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse run description file {}", .path.display())]
    Parse { path: PathBuf, source: serde_yaml::Error },

    #[error("\"{key}\" key not found - please check your run description YAML file")]
    MissingKey { key: String },

    #[error("\"{key}\" must be a scalar value")]
    NotScalar { key: String },

    #[error("invalid value for \"{key}\": {value}")]
    InvalidValue { key: String, value: String },

    #[error("failed to resolve path {value:?} against the working directory")]
    Resolve { value: String, source: std::io::Error },
}

impl RunDescError {
    /// Return true if the error only reports an absent key.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, RunDescError::MissingKey { .. })
    }
}

fn dotted(key_path: &[&str]) -> String {
    key_path.join(".")
}
// error:1 ends here

// [[file:../wwatch3.note::*path][path:1]]
/// Expand environment variables and `~` in `raw`, and turn it into an
/// absolute path with `.` and `..` components folded away. The path is not
/// required to exist.
///
/// Unset environment variables are left in the path as they are.
pub fn resolve_path(raw: &str) -> std::result::Result<PathBuf, RunDescError> {
    let expanded = shellexpand::full_with_context_no_errors(raw, dirs::home_dir, |var| std::env::var(var).ok());
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        Ok(normalize(&path))
    } else {
        let cwd = std::env::current_dir().map_err(|source| RunDescError::Resolve {
            value: raw.into(),
            source,
        })?;
        Ok(normalize(&cwd.join(path)))
    }
}

/// Lexically fold `.` and `..` components of an absolute `path`.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            // `..` of the root is the root
            Component::ParentDir => {
                out.pop();
            }
            c => out.push(c.as_os_str()),
        }
    }
    out
}
// path:1 ends here

// [[file:../wwatch3.note::*desc][desc:1]]
/// The parsed content of a run description YAML file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunDesc {
    root: Value,
}

impl RunDesc {
    /// Load run description from YAML file in `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, RunDescError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RunDescError::Read {
            path: path.to_owned(),
            source,
        })?;
        let root = serde_yaml::from_str(&text).map_err(|source| RunDescError::Parse {
            path: path.to_owned(),
            source,
        })?;
        debug!("loaded run description from {}", path.display());
        Ok(Self { root })
    }

    /// Parse run description from YAML text.
    pub fn from_yaml_str(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let root = serde_yaml::from_str(text)?;
        Ok(Self { root })
    }

    /// Serialize the run description back into YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        let s = serde_yaml::to_string(&self.root).context("serialize run description")?;
        Ok(s)
    }

    fn lookup(&self, key_path: &[&str]) -> Option<&Value> {
        let mut node = &self.root;
        for key in key_path {
            node = node.get(*key)?;
        }
        Some(node)
    }

    /// Fetch the value at nested `key_path` in string form.
    ///
    /// When `resolve_path` is true, the value is treated as a file system
    /// path: environment variables and `~` are expanded and the result is
    /// made absolute.
    pub fn get_value(&self, key_path: &[&str], resolve_path: bool) -> std::result::Result<String, RunDescError> {
        let key = dotted(key_path);
        let value = match self.lookup(key_path) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Null) => String::new(),
            Some(_) => return Err(RunDescError::NotScalar { key }),
            None => return Err(RunDescError::MissingKey { key }),
        };
        trace!("run description {} = {:?}", key, value);

        if resolve_path && !value.is_empty() {
            let path = self::resolve_path(&value)?;
            Ok(path.to_string_lossy().into_owned())
        } else {
            Ok(value)
        }
    }

    /// Same as `get_value`, but an absent key gives `None` instead of error.
    pub fn get_optional_value(
        &self,
        key_path: &[&str],
        resolve_path: bool,
    ) -> std::result::Result<Option<String>, RunDescError> {
        match self.get_value(key_path, resolve_path) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_missing_key() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Return a deep copy with `run_id` and `restart.restart.ww3` replaced
    /// for one day of a multi-day run.
    ///
    /// An existing `restart` section always receives the new value (empty
    /// when there is no restart file); a missing one is only created when
    /// there is a restart file to record.
    pub fn with_day_overrides(&self, run_id: &str, restart: Option<&Path>) -> Self {
        let mut root = self.root.clone();
        if let Value::Mapping(map) = &mut root {
            map.insert("run_id".into(), run_id.into());

            let restart_value: Value = restart
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
                .into();
            let restart_key: Value = "restart".into();
            let has_section = matches!(map.get(&restart_key), Some(Value::Mapping(_)));
            if has_section {
                if let Some(Value::Mapping(section)) = map.get_mut(&restart_key) {
                    section.insert("restart.ww3".into(), restart_value);
                }
            } else if restart.is_some() {
                let mut section = Mapping::new();
                section.insert("restart.ww3".into(), restart_value);
                map.insert(restart_key, Value::Mapping(section));
            }
        }
        Self { root }
    }
}
// desc:1 ends here

// [[file:../wwatch3.note::*config][config:1]]
/// Validated values of a run description required for preparing a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub run_id: String,
    pub runs_dir: PathBuf,
    pub mod_def_ww3: PathBuf,
    pub current_forcing_dir: PathBuf,
    pub wind_forcing_dir: PathBuf,
    pub email: String,
    pub account: String,

    /// Restart file for the first day. `None` means cold start.
    pub restart: Option<PathBuf>,

    /// Override for the `--ntasks-per-node` batch directive.
    pub ntasks_per_node: Option<u32>,
}

impl RunConfig {
    /// Collect and validate the values required for a run from `desc`.
    pub fn from_desc(desc: &RunDesc) -> std::result::Result<Self, RunDescError> {
        let path = |key_path: &[&str]| -> std::result::Result<PathBuf, RunDescError> {
            desc.get_value(key_path, true).map(PathBuf::from)
        };

        let restart = desc
            .get_optional_value(&["restart", "restart.ww3"], true)?
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let ntasks_per_node = match desc.get_optional_value(&["sbatch", "ntasks per node"], false)? {
            Some(s) => {
                let n = s.parse().map_err(|_| RunDescError::InvalidValue {
                    key: "sbatch.ntasks per node".into(),
                    value: s.clone(),
                })?;
                Some(n)
            }
            None => None,
        };

        Ok(Self {
            run_id: desc.get_value(&["run_id"], false)?,
            runs_dir: path(&["paths", "runs directory"])?,
            mod_def_ww3: path(&["grid", "mod_def.ww3 file"])?,
            current_forcing_dir: path(&["forcing", "current"])?,
            wind_forcing_dir: path(&["forcing", "wind"])?,
            email: desc.get_value(&["email"], false)?,
            account: desc.get_value(&["account"], false)?,
            restart,
            ntasks_per_node,
        })
    }
}
// config:1 ends here

// test:1 ends here
