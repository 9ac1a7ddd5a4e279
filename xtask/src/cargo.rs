//! Tools for working with Cargo.

use std::{
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{bail, Result};

/// Execute cargo with the given arguments and environment from the specified
/// directory.
pub fn run(args: &[String], envs: &[(String, String)], cwd: &Path) -> Result<()> {
    if !cwd.is_dir() {
        bail!("The `cwd` argument MUST be a directory");
    }

    log::debug!("cargo {}", args.join(" "));

    let status = Command::new(get_cargo())
        .args(args)
        .envs(envs.iter().map(|(k, v)| (k, v)))
        .current_dir(cwd)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if status.success() {
        Ok(())
    } else {
        bail!("Failed to execute cargo subcommand")
    }
}

fn get_cargo() -> String {
    std::env::var("CARGO").unwrap_or_else(|_| String::from("cargo"))
}

#[derive(Debug, Default)]
pub struct CargoArgsBuilder {
    subcommand: String,
    package: Option<String>,
    args: Vec<String>,
}

impl CargoArgsBuilder {
    #[must_use]
    pub fn subcommand<S>(mut self, subcommand: S) -> Self
    where
        S: Into<String>,
    {
        self.subcommand = subcommand.into();
        self
    }

    #[must_use]
    pub fn package<S>(mut self, package: S) -> Self
    where
        S: Into<String>,
    {
        self.package = Some(package.into());
        self
    }

    #[must_use]
    pub fn arg<S>(mut self, arg: S) -> Self
    where
        S: Into<String>,
    {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<String> {
        let mut args = vec![self.subcommand];

        if let Some(package) = self.package {
            args.push(format!("--package={package}"));
        }

        args.extend(self.args);

        args
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_arguments_in_order() {
        let args = CargoArgsBuilder::default()
            .subcommand("test")
            .package("vip1970")
            .arg("--quiet")
            .build();

        assert_eq!(args, vec!["test", "--package=vip1970", "--quiet"]);
    }
}
