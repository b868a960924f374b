//! Invocation argument lists for the check and build steps.

use retrobuild_types::BuildProfile;

/// The argument list of one cargo invocation, without the `cargo` itself.
///
/// The trailing argument is always the package selector; the ambiguity
/// repair rewrites it from a bare name to `name@version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoCommand {
    args: Vec<String>,
}

impl CargoCommand {
    pub fn check(profile: BuildProfile, package: &str) -> Self {
        Self::new("check", profile, package)
    }

    pub fn build(profile: BuildProfile, package: &str) -> Self {
        Self::new("build", profile, package)
    }

    fn new(subcommand: &str, profile: BuildProfile, package: &str) -> Self {
        let mut args = vec![subcommand.to_string()];
        if let Some(flag) = profile.flag() {
            args.push(flag.to_string());
        }
        args.push("--package".to_string());
        args.push(package.to_string());
        Self { args }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Trailing package selector (`name` or `name@version`).
    pub fn package_selector(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }

    pub fn set_package_selector(&mut self, selector: &str) {
        if let Some(last) = self.args.last_mut() {
            *last = selector.to_string();
        }
    }

    pub fn display(&self) -> String {
        format!("cargo {}", self.args.join(" "))
    }
}

/// The check/build pair for one unit. Rebuilt fresh after most repairs;
/// reused verbatim after a selector rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitCommands {
    pub check: CargoCommand,
    pub build: CargoCommand,
}

impl UnitCommands {
    pub fn for_package(profile: BuildProfile, package: &str) -> Self {
        Self {
            check: CargoCommand::check(profile, package),
            build: CargoCommand::build(profile, package),
        }
    }

    /// Rewrite the package selector on both invocations.
    pub fn set_package_selector(&mut self, selector: &str) {
        self.check.set_package_selector(selector);
        self.build.set_package_selector(selector);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn release_check_command_shape() {
        let cmd = CargoCommand::check(BuildProfile::Release, "serde");
        assert_eq!(cmd.args(), ["check", "--release", "--package", "serde"]);
        assert_eq!(cmd.package_selector(), Some("serde"));
    }

    #[test]
    fn debug_profile_has_no_flag() {
        let cmd = CargoCommand::build(BuildProfile::Debug, "serde");
        assert_eq!(cmd.args(), ["build", "--package", "serde"]);
    }

    #[test]
    fn selector_rewrite_touches_only_the_trailing_argument() {
        let mut commands = UnitCommands::for_package(BuildProfile::Release, "hex");
        commands.set_package_selector("hex@0.4.3");
        assert_eq!(
            commands.check.args(),
            ["check", "--release", "--package", "hex@0.4.3"]
        );
        assert_eq!(
            commands.build.args(),
            ["build", "--release", "--package", "hex@0.4.3"]
        );
    }
}
