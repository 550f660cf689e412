// [[file:../wwatch3.note::*imports][imports:1]]
//! Render the temporary run directory template

use crate::common::*;

use serde::Serialize;
use std::os::unix::fs::PermissionsExt;
// imports:1 ends here

// [[file:../wwatch3.note::*base][base:1]]
/// File name of the job run script in a temporary run directory.
pub const RUN_SCRIPT: &str = "SoGWW3.sh";

/// Template files as (file name, content, unix mode).
const TEMPLATE_FILES: &[(&str, &str, u32)] = &[
    (RUN_SCRIPT, include_str!("../template/SoGWW3.sh"), 0o755),
    ("ww3_grid.inp", include_str!("../template/ww3_grid.inp"), 0o644),
    ("ww3_ounf.inp", include_str!("../template/ww3_ounf.inp"), 0o644),
    ("ww3_ounp.inp", include_str!("../template/ww3_ounp.inp"), 0o644),
    ("ww3_prnc_current.inp", include_str!("../template/ww3_prnc_current.inp"), 0o644),
    ("ww3_prnc_wind.inp", include_str!("../template/ww3_prnc_wind.inp"), 0o644),
    ("ww3_shel.inp", include_str!("../template/ww3_shel.inp"), 0o644),
];

/// Values available to the run directory template.
///
/// Empty strings stand for values the sub-command does not provide, e.g.
/// dates for `prepare`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunContext {
    pub run_id: String,
    pub runs_dir: String,
    /// Name of the temporary run directory.
    pub tmp_run_dir: String,
    /// Full path of the temporary run directory.
    pub work_dir: String,

    pub start_date: String,
    pub start_date_yyyymmdd: String,
    pub end_date_yyyymmdd: String,

    pub mod_def_ww3_path: String,
    pub current_forcing_dir: String,
    pub wind_forcing_dir: String,
    pub restart_path: String,

    pub sbatch_directives: String,
    pub module_load: String,
    pub ntasks: u32,
    pub results_dir: String,

    pub multi_day: bool,
    pub n_days: usize,
    pub run_start_dates_yyyymmdd: String,
    pub results_dirs: String,
    pub work_dirs: String,
}

/// Expands a template into a populated temporary run directory.
pub trait RunTemplate {
    /// Render the template with `context` into the new directory `dest`.
    fn render(&self, context: &RunContext, dest: &Path) -> Result<()>;
}
// base:1 ends here

// [[file:../wwatch3.note::*builtin][builtin:1]]
/// The Strait of Georgia WaveWatch III run template shipped with the program.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplate;

impl BuiltinTemplate {
    /// Render a single template file.
    fn render_file(&self, name: &str, text: &str, context: &tera::Context) -> Result<String> {
        let txt = tera::Tera::one_off(text, context, false).with_context(|| format!("render template {}", name))?;
        Ok(txt)
    }
}

impl RunTemplate for BuiltinTemplate {
    fn render(&self, context: &RunContext, dest: &Path) -> Result<()> {
        if dest.exists() {
            bail!("temporary run directory already exists: {}", dest.display());
        }
        std::fs::create_dir_all(dest).with_context(|| format!("create run directory {}", dest.display()))?;

        let tctx = tera::Context::from_serialize(context).context("template context")?;
        for (name, text, mode) in TEMPLATE_FILES {
            let txt = self.render_file(name, text, &tctx)?;
            let path = dest.join(name);
            std::fs::write(&path, txt).with_context(|| format!("write {}", path.display()))?;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(*mode))?;
            trace!("rendered {}", path.display());
        }

        link_forcing(context, dest)?;

        Ok(())
    }
}

/// Create symbolic links to grid, forcing and restart files in `dest`.
fn link_forcing(context: &RunContext, dest: &Path) -> Result<()> {
    let mut links = vec![
        ("mod_def.ww3", &context.mod_def_ww3_path),
        ("wind", &context.wind_forcing_dir),
        ("current", &context.current_forcing_dir),
    ];
    if !context.restart_path.is_empty() {
        links.push(("restart.ww3", &context.restart_path));
    }

    for (name, target) in links {
        let link = dest.join(name);
        std::os::unix::fs::symlink(target, &link)
            .with_context(|| format!("link {} to {}", link.display(), target))?;
        debug!("{} -> {}", link.display(), target);
    }

    Ok(())
}
// builtin:1 ends here

// [[file:../wwatch3.note::*test][test:1]]
#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir: &Path) -> RunContext {
        RunContext {
            run_id: "SoGwaves".into(),
            runs_dir: dir.display().to_string(),
            tmp_run_dir: "run".into(),
            work_dir: dir.join("run").display().to_string(),
            start_date: "2019-10-13".into(),
            start_date_yyyymmdd: "20191013".into(),
            end_date_yyyymmdd: "20191014".into(),
            mod_def_ww3_path: "/project/mod_def.ww3".into(),
            current_forcing_dir: "/scratch/current".into(),
            wind_forcing_dir: "/scratch/wind".into(),
            sbatch_directives: "#SBATCH --mem=0\n".into(),
            module_load: "module load netcdf-fortran-mpi/4.4.4".into(),
            ntasks: 48,
            results_dir: "/results/foo".into(),
            n_days: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_builtin() -> Result<()> {
        let tdir = tempfile::tempdir()?;
        let ctx = context(tdir.path());
        let dest = tdir.path().join("run");
        BuiltinTemplate.render(&ctx, &dest)?;

        let shel = std::fs::read_to_string(dest.join("ww3_shel.inp"))?;
        assert!(shel.contains("   20191013 000000  Start time (YYYYMMDD HHmmss)"));
        assert!(shel.contains("  20191014 000000 3600 20191014 000000"));

        let wind = std::fs::read_to_string(dest.join("ww3_prnc_wind.inp"))?;
        assert!(wind.contains("  'wind/SoG_wind_20191013.nc'"));

        let script = std::fs::read_to_string(dest.join(RUN_SCRIPT))?;
        assert!(script.starts_with("#!/bin/bash\n\n#SBATCH --mem=0\n\nset -e"));
        assert!(script.contains(&format!("WORK_DIR=\"{}\"", ctx.work_dir)));
        assert!(script.contains("RESULTS_DIR=\"/results/foo\""));
        assert!(script.contains("${MPIRUN} -np 48 ${WW3_EXE}/ww3_shel"));
        assert!(!script.contains("WORK_DIRS"));
        let mode = std::fs::metadata(dest.join(RUN_SCRIPT))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o755);

        // links without restart
        let mut links: Vec<_> = std::fs::read_dir(&dest)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_symlink()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        links.sort();
        assert_eq!(links, ["current", "mod_def.ww3", "wind"]);
        assert_eq!(std::fs::read_link(dest.join("wind"))?, Path::new("/scratch/wind"));

        // refuse to render into an existing directory
        assert!(BuiltinTemplate.render(&ctx, &dest).is_err());

        Ok(())
    }

    #[test]
    fn test_render_multi_day_script() -> Result<()> {
        let tdir = tempfile::tempdir()?;
        let mut ctx = context(tdir.path());
        ctx.multi_day = true;
        ctx.n_days = 2;
        ctx.restart_path = "/results/12oct19/restart.ww3".into();
        ctx.run_start_dates_yyyymmdd = "20191013\n  20191014".into();
        ctx.results_dirs = "/results/13oct19\n  /results/14oct19".into();
        ctx.work_dirs = "/runs/a\n  /runs/b".into();
        let dest = tdir.path().join("run");
        BuiltinTemplate.render(&ctx, &dest)?;

        let script = std::fs::read_to_string(dest.join(RUN_SCRIPT))?;
        assert!(script.contains("N_DAYS=2\n"));
        assert!(script.contains("WORK_DIRS=(\n  /runs/a\n  /runs/b\n)\n"));
        assert!(script.contains("for (( i=0; i<N_DAYS; i++ )); do"));
        assert!(!script.contains("WORK_DIR=\""));
        assert!(dest.join("restart.ww3").symlink_metadata()?.file_type().is_symlink());

        Ok(())
    }
}
// test:1 ends here
