mod data_file;
mod render;

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use linked_hash_map::LinkedHashMap;
use log::debug;
use log::info;
use log::warn;

pub use self::data_file::unusable_name;
pub use self::data_file::unwritable;
pub use self::data_file::DataFile;
pub use self::render::AMR_FILE;
pub use self::render::CLAW_FILE;
pub use self::render::GAUGES_FILE;
pub use self::render::REGIONS_FILE;
use crate::error::Error;
use crate::error::SerializationError;
use crate::error::WriteError;
use crate::run_config::RunConfigBuilder;
use crate::run_config::RunConfiguration;

/// Control files with a fixed name. The problem file is named by the
/// problem section and may not collide with these.
pub const FIXED_FILES: [&str; 4] = [CLAW_FILE, AMR_FILE, GAUGES_FILE, REGIONS_FILE];

/// Renders a [`RunConfiguration`] into the text control files read by
/// the solver.
pub struct ConfigSerializer;

impl ConfigSerializer {
    /// Rendering the same configuration twice gives identical files.
    pub fn serialize(config: &RunConfiguration) -> Result<ControlFileSet, SerializationError> {
        let problem_file = config.problem.file.clone();
        if FIXED_FILES.contains(&problem_file.as_str()) {
            return Err(SerializationError::new(
                &problem_file,
                "problem.file",
                "problem file would overwrite another control file",
            ));
        }
        let mut files = LinkedHashMap::new();
        files.insert(CLAW_FILE.to_owned(), render::claw(config)?);
        files.insert(AMR_FILE.to_owned(), render::amr(config)?);
        files.insert(GAUGES_FILE.to_owned(), render::gauges(config)?);
        files.insert(REGIONS_FILE.to_owned(), render::regions(config)?);
        files.insert(problem_file, render::problem(config)?);
        Ok(ControlFileSet { files })
    }
}

/// File name to contents, in the order the files are written.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlFileSet {
    files: LinkedHashMap<String, String>,
}

fn temporary_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!(".{}.tmp", name))
}

fn backup_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!(".{}.bak", name))
}

fn write_file(path: &Path, contents: &str) -> Result<(), WriteError> {
    let to_write_error = |source| WriteError {
        path: path.to_owned(),
        source,
    };
    let file = File::create(path).map_err(to_write_error)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(to_write_error)?;
    let file = writer
        .into_inner()
        .map_err(|e| to_write_error(e.into_error()))?;
    file.sync_all().map_err(to_write_error)
}

fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            debug!("Could not remove {:?}: {}", path, e);
        }
    }
}

/// A control file moved into place. `backup` holds the file it
/// replaced, if there was one.
struct Committed {
    target: PathBuf,
    backup: Option<PathBuf>,
}

/// Moves `temporary` to `target`, keeping an existing target file at
/// `backup`. Only regular files are ever replaced.
fn commit(temporary: &Path, target: &Path, backup: &Path) -> io::Result<Committed> {
    let backup = match fs::symlink_metadata(target) {
        Ok(metadata) if metadata.is_dir() => {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "a directory is in the way of the control file",
            ))
        }
        Ok(_) => {
            fs::rename(target, backup)?;
            Some(backup.to_owned())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };
    if let Err(e) = fs::rename(temporary, target) {
        if let Some(backup) = &backup {
            if let Err(e) = fs::rename(backup, target) {
                warn!("Could not restore {:?} from {:?}: {}", target, backup, e);
            }
        }
        return Err(e);
    }
    Ok(Committed {
        target: target.to_owned(),
        backup,
    })
}

/// Puts back every file that was there before, newest commit first.
fn roll_back(committed: &[Committed]) {
    for c in committed.iter().rev() {
        let result = match &c.backup {
            Some(backup) => fs::rename(backup, &c.target),
            None => fs::remove_file(&c.target),
        };
        if let Err(e) = result {
            warn!("Could not roll back {:?}: {}", c.target, e);
        }
    }
}

impl ControlFileSet {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(|contents| contents.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|name| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .map(|(name, contents)| (name.as_str(), contents.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Writes every file to a temporary file in `dir` first and only
    /// moves them into place once all of them were written. Files they
    /// replace are kept aside until every file is in place. If any step
    /// fails, `dir` is left with the files it had before.
    pub fn write_to(&self, dir: &Path) -> Result<(), WriteError> {
        let mut temporaries = vec![];
        for (name, contents) in self.iter() {
            let path = temporary_path(dir, name);
            temporaries.push(path.clone());
            if let Err(e) = write_file(&path, contents) {
                remove_files(&temporaries);
                return Err(e);
            }
        }
        let mut committed = vec![];
        for (i, name) in self.names().enumerate() {
            let target = dir.join(name);
            match commit(&temporaries[i], &target, &backup_path(dir, name)) {
                Ok(c) => committed.push(c),
                Err(source) => {
                    roll_back(&committed);
                    remove_files(&temporaries[i..]);
                    return Err(WriteError {
                        path: target,
                        source,
                    });
                }
            }
            debug!("Wrote {:?}", target);
        }
        let backups: Vec<_> = committed.into_iter().filter_map(|c| c.backup).collect();
        remove_files(&backups);
        info!("Wrote {} control files to {:?}", self.len(), dir);
        Ok(())
    }
}

/// Builds, serializes and writes the control files. Nothing is written
/// if any step before the write fails.
pub fn write_run_files(builder: &RunConfigBuilder, dir: &Path) -> Result<ControlFileSet, Error> {
    let config = builder.build()?;
    let files = ConfigSerializer::serialize(&config)?;
    files.write_to(dir)?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::write_run_files;
    use super::ConfigSerializer;
    use super::DataFile;
    use super::AMR_FILE;
    use super::CLAW_FILE;
    use super::GAUGES_FILE;
    use super::REGIONS_FILE;
    use crate::error::Error;
    use crate::parameters::Region;
    use crate::presets::pipe_acoustics;
    use crate::presets::GaugeLayout;
    use crate::presets::Resolution;
    use crate::run_config::RunConfigBuilder;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("amrsetup-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn serialization_is_idempotent() {
        let config = pipe_acoustics(Resolution::Medium, GaugeLayout::AlongAxis)
            .build()
            .unwrap();
        let first = ConfigSerializer::serialize(&config).unwrap();
        let second = ConfigSerializer::serialize(&config).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.names().collect::<Vec<_>>(),
            vec![CLAW_FILE, AMR_FILE, GAUGES_FILE, REGIONS_FILE, "setprob.data"]
        );
    }

    #[test]
    fn claw_file_records() {
        let config = pipe_acoustics(Resolution::Medium, GaugeLayout::AlongAxis)
            .build()
            .unwrap();
        let files = ConfigSerializer::serialize(&config).unwrap();
        let claw = DataFile::parse(files.get(CLAW_FILE).unwrap());
        assert_eq!(claw.get("num_dim"), Some("2"));
        assert_eq!(claw.get("num_cells"), Some("86 21"));
        assert_eq!(claw.get("lower"), Some("0.08 0.0"));
        assert_eq!(claw.get("limiter"), Some("0 0"));
        assert_eq!(claw.get("bc_lower"), Some("1 3"));
        assert_eq!(claw.get("bc_upper"), Some("1 1"));
        assert_eq!(claw.get("capa_index"), Some("0"));
        assert_eq!(claw.get("dt_initial"), Some("1.5e-8"));
        assert_eq!(claw.get("dt_max"), Some("1e99"));
        assert_eq!(claw.get("output_style"), Some("1"));
        assert_eq!(claw.get("tfinal"), Some("50.0"));
        assert_eq!(claw.get("checkpt_style"), Some("2"));
        assert_eq!(claw.get("checkpt_times"), Some("20.0 47.0"));
        assert_eq!(claw.get("restart_file"), Some("'fort.chk00006'"));
        assert_eq!(claw.get("output_aux_components"), None);
        let names: Vec<_> = claw.names().take(5).collect();
        assert_eq!(names, vec!["num_dim", "lower", "upper", "num_cells", "num_eqn"]);
    }

    #[test]
    fn amr_gauge_and_problem_records() {
        let config = pipe_acoustics(Resolution::Medium, GaugeLayout::AlongAxis)
            .build()
            .unwrap();
        let files = ConfigSerializer::serialize(&config).unwrap();
        let amr = DataFile::parse(files.get(AMR_FILE).unwrap());
        assert_eq!(amr.get("amr_levels_max"), Some("3"));
        assert_eq!(amr.get("refinement_ratios_y"), Some("8 8"));
        assert_eq!(amr.get("refinement_ratios_z"), None);
        assert_eq!(amr.get("flag2refine_tol"), Some("5e-9"));
        assert_eq!(amr.get("uprint"), Some("F"));
        let gauges = DataFile::parse(files.get(GAUGES_FILE).unwrap());
        assert_eq!(gauges.get("num_gauges"), Some("7"));
        assert_eq!(gauges.rows.len(), 7);
        assert_eq!(gauges.rows[0][0], "0");
        assert_eq!(gauges.rows[6][0], "6");
        let problem = DataFile::parse(files.get("setprob.data").unwrap());
        assert_eq!(problem.get("rho"), Some("1000.0"));
        assert_eq!(problem.get("bulk"), Some("0.002202256"));
    }

    #[test]
    fn regions_are_written_in_order() {
        let mut builder = pipe_acoustics(Resolution::Coarse, GaugeLayout::None);
        builder
            .with_section(&crate::parameters::RegionParameters {
                regions: vec![
                    Region {
                        min_level: 1,
                        max_level: 3,
                        t_start: 0.0,
                        t_end: 10.0,
                        space_box: vec![[0.1, 0.2], [0.0, 0.02]],
                    },
                    Region {
                        min_level: 2,
                        max_level: 2,
                        t_start: 5.0,
                        t_end: 50.0,
                        space_box: vec![[0.08, 0.23], [0.0, 0.0375]],
                    },
                ],
            })
            .unwrap();
        let files = ConfigSerializer::serialize(&builder.build().unwrap()).unwrap();
        let regions = DataFile::parse(files.get(REGIONS_FILE).unwrap());
        assert_eq!(regions.get("num_regions"), Some("2"));
        assert_eq!(
            regions.rows[0],
            vec!["1", "3", "0.0", "10.0", "0.1", "0.2", "0.0", "0.02"]
        );
        assert_eq!(regions.rows[1][0], "2");
    }

    #[test]
    fn inconsistent_lists_are_rejected() {
        let mut config = RunConfigBuilder::new().build().unwrap();
        config.method.num_waves = 2;
        let err = ConfigSerializer::serialize(&config).unwrap_err();
        assert_eq!(err.file, CLAW_FILE);
        assert_eq!(err.field, "limiter");

        let mut config = RunConfigBuilder::new().build().unwrap();
        config.amr.amr_levels_max = 2;
        let err = ConfigSerializer::serialize(&config).unwrap_err();
        assert_eq!(err.file, AMR_FILE);
        assert_eq!(err.field, "refinement_ratios_x");

        let mut config = RunConfigBuilder::new().build().unwrap();
        config.grid.upper[0] = f64::NAN;
        assert_eq!(ConfigSerializer::serialize(&config).unwrap_err().field, "upper");
    }

    #[test]
    fn problem_file_may_not_shadow_fixed_files() {
        let mut config = RunConfigBuilder::new().build().unwrap();
        config.problem.file = CLAW_FILE.into();
        assert!(ConfigSerializer::serialize(&config).is_err());
    }

    #[test]
    fn write_leaves_no_temporary_files() {
        let dir = scratch_dir("write");
        let builder = pipe_acoustics(Resolution::Coarse, GaugeLayout::Scattered);
        let files = write_run_files(&builder, &dir).unwrap();
        let mut on_disk: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        on_disk.sort();
        let mut expected: Vec<_> = files.names().map(|name| name.to_owned()).collect();
        expected.sort();
        assert_eq!(on_disk, expected);
        assert_eq!(
            fs::read_to_string(dir.join(CLAW_FILE)).unwrap(),
            files.get(CLAW_FILE).unwrap()
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_build_writes_nothing() {
        let dir = scratch_dir("failed");
        let mut builder = pipe_acoustics(Resolution::Coarse, GaugeLayout::None);
        builder.set("method.limiter", vec!["mc"]).unwrap();
        let err = write_run_files(&builder, &dir).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn write_to_missing_directory_fails_cleanly() {
        let parent = scratch_dir("missing");
        let dir = parent.join("does_not_exist");
        let files = ConfigSerializer::serialize(&RunConfigBuilder::new().build().unwrap()).unwrap();
        let err = files.write_to(&dir).unwrap_err();
        assert!(err.path.starts_with(&dir));
        assert!(!dir.exists());
        fs::remove_dir_all(&parent).unwrap();
    }

    #[test]
    fn failed_write_keeps_previous_files() {
        let dir = scratch_dir("rollback");
        fs::write(dir.join(CLAW_FILE), "old claw").unwrap();
        fs::write(dir.join(AMR_FILE), "old amr").unwrap();
        fs::create_dir(dir.join(GAUGES_FILE)).unwrap();
        fs::write(dir.join(GAUGES_FILE).join("keep"), "").unwrap();
        let builder = pipe_acoustics(Resolution::Coarse, GaugeLayout::Scattered);
        match write_run_files(&builder, &dir).unwrap_err() {
            Error::Write(e) => assert_eq!(e.path, dir.join(GAUGES_FILE)),
            e => panic!("unexpected error {}", e),
        }
        assert_eq!(fs::read_to_string(dir.join(CLAW_FILE)).unwrap(), "old claw");
        assert_eq!(fs::read_to_string(dir.join(AMR_FILE)).unwrap(), "old amr");
        assert!(dir.join(GAUGES_FILE).join("keep").exists());
        let mut on_disk: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        on_disk.sort();
        assert_eq!(on_disk, vec![AMR_FILE, CLAW_FILE, GAUGES_FILE]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rewriting_replaces_previous_files() {
        let dir = scratch_dir("rewrite");
        write_run_files(&pipe_acoustics(Resolution::Coarse, GaugeLayout::None), &dir).unwrap();
        let files =
            write_run_files(&pipe_acoustics(Resolution::Fine, GaugeLayout::None), &dir).unwrap();
        let claw = DataFile::parse(&fs::read_to_string(dir.join(CLAW_FILE)).unwrap());
        assert_eq!(claw.get("num_cells"), Some("172 43"));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), files.len());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn descriptions_cannot_forge_records() {
        let mut builder = pipe_acoustics(Resolution::Coarse, GaugeLayout::None);
        builder
            .set("problem.params.rho.description", "density\n999.0 =: bulk")
            .unwrap();
        assert_eq!(
            builder.build().unwrap_err().field,
            "problem.params.rho.description"
        );

        let mut config = pipe_acoustics(Resolution::Coarse, GaugeLayout::None)
            .build()
            .unwrap();
        if let Some(rho) = config.problem.params.get_mut("rho") {
            rho.description = "density\n999.0 =: bulk".into();
        }
        let err = ConfigSerializer::serialize(&config).unwrap_err();
        assert_eq!(err.file, "setprob.data");
        assert_eq!(err.field, "rho");
    }

    #[test]
    fn quotes_in_restart_file_are_doubled() {
        let mut builder = RunConfigBuilder::new();
        builder.set("time.restart_file", "it's.chk").unwrap();
        let files = ConfigSerializer::serialize(&builder.build().unwrap()).unwrap();
        let claw = DataFile::parse(files.get(CLAW_FILE).unwrap());
        assert_eq!(claw.get("restart_file"), Some("'it''s.chk'"));
    }
}
