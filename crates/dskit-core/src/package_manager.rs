use crate::CoreError;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// JavaScript package manager used to install a component's npm dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    /// Pick the package manager from the lockfile present in `root`.
    pub fn detect(root: &Path) -> Self {
        if root.join("pnpm-lock.yaml").exists() {
            Self::Pnpm
        } else if root.join("yarn.lock").exists() {
            Self::Yarn
        } else {
            Self::Npm
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
        }
    }

    pub fn install_args<S: AsRef<str>>(self, packages: &[S], dev: bool) -> Vec<String> {
        let mut args = match (self, dev) {
            (Self::Npm, false) => vec!["install"],
            (Self::Npm, true) => vec!["install", "--save-dev"],
            (Self::Yarn | Self::Pnpm, false) => vec!["add"],
            (Self::Yarn | Self::Pnpm, true) => vec!["add", "--dev"],
        }
        .into_iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();
        args.extend(packages.iter().map(|p| p.as_ref().to_owned()));
        args
    }

    /// Run the install in `root`. No-op when `packages` is empty.
    pub fn install<S: AsRef<str>>(
        self,
        root: &Path,
        packages: &[S],
        dev: bool,
    ) -> Result<(), CoreError> {
        if packages.is_empty() {
            return Ok(());
        }
        let args = self.install_args(packages, dev);
        debug!("running {} {}", self.program(), args.join(" "));

        // Child stdout goes to our stderr so `--json` output stays parseable.
        let status = Command::new(self.program())
            .args(&args)
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::from(std::io::stderr()))
            .status()
            .map_err(|e| CoreError::PackageManager(format!("{}: {e}", self.program())))?;

        if !status.success() {
            return Err(CoreError::PackageManager(format!(
                "{} {} exited with {status}",
                self.program(),
                args.join(" "),
            )));
        }
        info!("installed {} packages with {self}", packages.len());
        Ok(())
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_from_lockfile() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Npm);

        std::fs::write(dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Yarn);

        std::fs::write(dir.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Pnpm);
    }

    #[test]
    fn install_args_per_manager() {
        let pkgs = ["clsx", "tailwind-merge"];
        assert_eq!(
            PackageManager::Npm.install_args(&pkgs, false),
            vec!["install", "clsx", "tailwind-merge"]
        );
        assert_eq!(
            PackageManager::Npm.install_args(&pkgs, true),
            vec!["install", "--save-dev", "clsx", "tailwind-merge"]
        );
        assert_eq!(
            PackageManager::Pnpm.install_args(&pkgs[..1], true),
            vec!["add", "--dev", "clsx"]
        );
        assert_eq!(PackageManager::Yarn.install_args(&pkgs[..1], false), vec!["add", "clsx"]);
    }

    #[test]
    fn empty_install_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let none: [&str; 0] = [];
        PackageManager::Pnpm.install(dir.path(), &none, false).unwrap();
    }

    #[test]
    fn display_is_program_name() {
        assert_eq!(PackageManager::Yarn.to_string(), "yarn");
    }
}
