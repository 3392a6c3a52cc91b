//! Hand the rendered document to pandoc
//!
//! The driver writes the rendered stream into the build directory, copies
//! the Lua filter scripts next to it and runs the compiler:
//!
//! ```text
//! pandoc <staging> --lua-filter <builddir>/<f>... --filter <f>...
//!        --reference-doc <reference> -M title:<title> -o <builddir>/<output>
//! ```

use crate::error::{GendokuError, Result};
use crate::io::{fs, Config};
use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variables passed to the compiler, with the config keys they come from
pub const ENV_CONFIG_KEYS: [(&str, &str); 2] = [
    ("PLANTUML_BIN", "plantuml_bin"),
    ("PLANTUML_JAR", "plantuml_jar"),
];

/// Compiler filters and the scripts they need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    /// Executable filters, passed with `--filter`
    pub filters: Vec<String>,
    /// Lua filters, copied into the build directory and passed with `--lua-filter`
    pub lua_filters: Vec<String>,
    /// Lua modules the filters load; copied but not passed
    pub lua_filter_deps: Vec<String>,
    /// Where the Lua scripts are copied from
    pub filter_dir: PathBuf,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            filters: vec!["pandoc-plantuml".to_string()],
            lua_filters: vec!["odt-custom-styles.lua".to_string()],
            lua_filter_deps: vec!["util.lua".to_string()],
            filter_dir: PathBuf::from("filters"),
        }
    }
}

impl FilterSet {
    /// Defaults, overridden by `filters`, `lua_filters`, `lua_filter_deps`
    /// and `filterdir` when the configuration sets them
    pub fn from_config(config: &Config) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            filters: config.string_list("filters")?.unwrap_or(defaults.filters),
            lua_filters: config
                .string_list("lua_filters")?
                .unwrap_or(defaults.lua_filters),
            lua_filter_deps: config
                .string_list("lua_filter_deps")?
                .unwrap_or(defaults.lua_filter_deps),
            filter_dir: config.filterdir(),
        })
    }
}

/// A fully assembled compiler command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    /// The command as it would be typed, for logs and error messages
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.envs.iter().map(|(k, v)| (k, v)));
        command
    }
}

/// Stages rendered output and runs the compiler on it
pub struct BuildDriver<'a> {
    config: &'a Config,
    filters: FilterSet,
}

impl<'a> BuildDriver<'a> {
    pub fn new(config: &'a Config, filters: FilterSet) -> Self {
        Self { config, filters }
    }

    /// Driver with the filter set described by the configuration
    pub fn from_config(config: &'a Config) -> Result<Self> {
        Ok(Self::new(config, FilterSet::from_config(config)?))
    }

    /// `builddir/<document name without its last extension>`
    pub fn staging_path(&self) -> Result<PathBuf> {
        let document = Path::new(self.config.document()?);
        let stem = document
            .file_stem()
            .ok_or_else(|| GendokuError::config("`document` has no file name"))?;
        Ok(self.config.builddir()?.join(stem))
    }

    /// Write the rendered stream to the staging file
    pub fn stage(&self, rendered: &str) -> Result<PathBuf> {
        let staging = self.staging_path()?;
        debug!("Staging {}", staging.display());
        fs::write(&staging, rendered)?;
        Ok(staging)
    }

    /// Copy Lua filters and their dependencies into the build directory
    pub fn install_filters(&self) -> Result<()> {
        let builddir = self.config.builddir()?;
        fs::create_dir_all(&builddir)?;
        for script in self.filters.lua_filter_deps.iter().chain(&self.filters.lua_filters) {
            debug!("Installing filter {script}");
            fs::copy(&self.filters.filter_dir.join(script), &builddir.join(script))?;
        }
        Ok(())
    }

    /// Assemble the compiler command for a staged file
    pub fn invocation(&self, staging: &Path) -> Result<Invocation> {
        let builddir = self.config.builddir()?;
        let mut args: Vec<OsString> = vec![staging.into()];

        for script in &self.filters.lua_filters {
            args.push("--lua-filter".into());
            args.push(builddir.join(script).into());
        }
        for filter in &self.filters.filters {
            args.push("--filter".into());
            args.push(filter.into());
        }
        args.push("--reference-doc".into());
        args.push(self.config.reference()?.into());
        args.push("-M".into());
        args.push(format!("title:{}", self.config.title()?).into());
        args.push("-o".into());
        args.push(self.config.output()?.into());

        let envs = ENV_CONFIG_KEYS
            .iter()
            .filter_map(|(var, key)| {
                self.config
                    .get_str(key)
                    .map(|value| (var.to_string(), value.to_string()))
            })
            .collect();

        Ok(Invocation {
            program: self.config.pandoc().to_string(),
            args,
            envs,
        })
    }

    /// Stage, install filters and run the compiler
    pub fn run(&self, rendered: &str) -> Result<PathBuf> {
        let staging = self.stage(rendered)?;
        self.install_filters()?;

        let invocation = self.invocation(&staging)?;
        let command_line = invocation.command_line();
        info!("Running: {command_line}");

        let status = invocation
            .to_command()
            .status()
            .map_err(|e| GendokuError::file_system(&invocation.program, e))?;
        if !status.success() {
            return Err(GendokuError::compiler(command_line, status.to_string()));
        }

        let output = self.config.output()?;
        info!("Wrote {}", output.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs as stdfs;
    use tempfile::TempDir;

    const BASE: &str = "templatedir: templates\ndocument: document.md\ntitle: Manual\n\
                        builddir: build\noutput: manual.odt\nreference: reference.odt\n";

    fn config(extra: &str, root: &Path) -> Config {
        Config::from_yaml_str(&format!("{BASE}{extra}"), root).unwrap()
    }

    fn with_scripts(root: &Path, names: &[&str]) {
        stdfs::create_dir_all(root.join("filters")).unwrap();
        for name in names {
            stdfs::write(root.join("filters").join(name), format!("-- {name}")).unwrap();
        }
    }

    #[test]
    fn test_default_filter_set() {
        let config = config("", Path::new("/p"));
        let filters = FilterSet::from_config(&config).unwrap();
        assert_eq!(filters.filters, vec!["pandoc-plantuml"]);
        assert_eq!(filters.lua_filters, vec!["odt-custom-styles.lua"]);
        assert_eq!(filters.lua_filter_deps, vec!["util.lua"]);
        assert_eq!(filters.filter_dir, PathBuf::from("/p/filters"));
    }

    #[test]
    fn test_configured_filter_set() {
        let config = config("filters: []\nlua_filters: [a.lua, b.lua]\n", Path::new("/p"));
        let filters = FilterSet::from_config(&config).unwrap();
        assert!(filters.filters.is_empty());
        assert_eq!(filters.lua_filters, vec!["a.lua", "b.lua"]);
        assert_eq!(filters.lua_filter_deps, vec!["util.lua"]);
    }

    #[test]
    fn test_stage_writes_into_builddir() {
        let temp = TempDir::new().unwrap();
        let config = config("", temp.path());
        let driver = BuildDriver::from_config(&config).unwrap();

        let staging = driver.stage("# Manual\n").unwrap();
        assert_eq!(staging, temp.path().join("build/document"));
        assert_eq!(stdfs::read_to_string(staging).unwrap(), "# Manual\n");
    }

    #[test]
    fn test_install_filters() {
        let temp = TempDir::new().unwrap();
        with_scripts(temp.path(), &["util.lua", "odt-custom-styles.lua"]);
        let config = config("", temp.path());
        BuildDriver::from_config(&config).unwrap().install_filters().unwrap();

        let build = temp.path().join("build");
        assert_eq!(stdfs::read_to_string(build.join("util.lua")).unwrap(), "-- util.lua");
        assert!(build.join("odt-custom-styles.lua").is_file());
    }

    #[test]
    fn test_missing_filter_script() {
        let temp = TempDir::new().unwrap();
        let config = config("", temp.path());
        let err = BuildDriver::from_config(&config).unwrap().install_filters().unwrap_err();
        assert!(matches!(err, GendokuError::FileSystem { .. }));
    }

    #[test]
    fn test_invocation() {
        let config = config("plantuml_jar: /opt/plantuml.jar\n", Path::new("/p"));
        let driver = BuildDriver::from_config(&config).unwrap();
        let invocation = driver.invocation(Path::new("/p/build/document")).unwrap();

        assert_eq!(
            invocation.command_line(),
            "pandoc /p/build/document --lua-filter /p/build/odt-custom-styles.lua \
             --filter pandoc-plantuml --reference-doc /p/reference.odt \
             -M title:Manual -o /p/build/manual.odt"
        );
        assert_eq!(
            invocation.envs,
            vec![("PLANTUML_JAR".to_string(), "/opt/plantuml.jar".to_string())]
        );
    }

    #[test]
    fn test_invocation_requires_driver_keys() {
        let config =
            Config::from_yaml_str("templatedir: t\ndocument: d.md\ntitle: T\nbuilddir: b\n", "")
                .unwrap();
        let driver = BuildDriver::from_config(&config).unwrap();
        let err = driver.invocation(Path::new("b/d")).unwrap_err();
        assert!(matches!(err, GendokuError::MissingKey { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_success_and_failure() {
        let temp = TempDir::new().unwrap();
        with_scripts(temp.path(), &["util.lua", "odt-custom-styles.lua"]);

        let ok = config("pandoc: \"true\"\n", temp.path());
        let output = BuildDriver::from_config(&ok).unwrap().run("body").unwrap();
        assert_eq!(output, temp.path().join("build/manual.odt"));

        let failing = config("pandoc: \"false\"\n", temp.path());
        let err = BuildDriver::from_config(&failing).unwrap().run("body").unwrap_err();
        assert!(matches!(err, GendokuError::Compiler { command, .. } if command.starts_with("false ")));
    }

    #[test]
    fn test_missing_compiler() {
        let temp = TempDir::new().unwrap();
        with_scripts(temp.path(), &["util.lua", "odt-custom-styles.lua"]);
        let config = config("pandoc: gendoku-no-such-compiler\n", temp.path());
        let err = BuildDriver::from_config(&config).unwrap().run("body").unwrap_err();
        assert!(matches!(err, GendokuError::FileSystem { .. }));
    }
}
