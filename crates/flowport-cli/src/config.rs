//! Configuration loading helpers for the flowport CLI.
//!
//! Arguments destined for `ortho-config` are separated from the CLI's own
//! flags so each parser only sees the options it understands.

use std::ffi::{OsStr, OsString};

use flowport_config::Config;
use ortho_config::OrthoConfig;

use crate::AppError;

/// CLI flags recognised by the configuration loader, with whether each one
/// consumes a value.
///
/// MAINTENANCE: keep in sync with the fields of `flowport_config::Config`.
const CONFIG_CLI_FLAGS: &[(&str, bool)] = &[
    ("--config-path", true),
    ("--packages-dir", true),
    ("--source-subdir", true),
    ("--source-extension", true),
    ("--output-subdir", true),
    ("--oncall-tag", true),
    ("--www-prefix", true),
    ("--fail-fast", false),
    ("--log-filter", true),
    ("--log-format", true),
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the configuration subset of the arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    if !argument_text.starts_with("--") {
        return FlagAction::Skip;
    }

    let (flag, has_inline_value) = match argument_text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (argument_text.as_ref(), false),
    };

    CONFIG_CLI_FLAGS
        .iter()
        .find(|(known, _)| *known == flag)
        .map_or(FlagAction::Skip, |(_, takes_value)| FlagAction::Include {
            needs_value: *takes_value && !has_inline_value,
        })
}

/// Arguments partitioned between the configuration loader and `clap`.
///
/// Both halves start with the program name.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) cli_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };

    let mut split = ConfigArgumentSplit {
        config_arguments: vec![program.clone()],
        cli_arguments: vec![program.clone()],
    };
    let mut pending_value = false;

    for argument in rest {
        if pending_value {
            split.config_arguments.push(argument.clone());
            pending_value = false;
            continue;
        }
        match process_config_flag(argument) {
            FlagAction::Include { needs_value } => {
                split.config_arguments.push(argument.clone());
                pending_value = needs_value;
            }
            FlagAction::Skip => split.cli_arguments.push(argument.clone()),
        }
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case("--log-filter", FlagAction::Include { needs_value: true })]
    #[case("--fail-fast", FlagAction::Include { needs_value: false })]
    #[case("--dry-run", FlagAction::Skip)]
    #[case("packages", FlagAction::Skip)]
    #[case("--unknown", FlagAction::Skip)]
    fn classifies_flags(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(process_config_flag(OsStr::new(argument)), expected);
    }

    #[test]
    fn config_flags_are_collected_from_any_position() {
        let split = split_config_arguments(&os_args(&[
            "flowport",
            "--dry-run",
            "--packages-dir",
            "pkgs",
            "--fail-fast",
            "--log-format=json",
        ]));

        assert_eq!(
            split.config_arguments,
            os_args(&[
                "flowport",
                "--packages-dir",
                "pkgs",
                "--fail-fast",
                "--log-format=json"
            ])
        );
        assert_eq!(split.cli_arguments, os_args(&["flowport", "--dry-run"]));
    }

    #[test]
    fn empty_arguments_split_to_nothing() {
        assert_eq!(split_config_arguments(&[]), ConfigArgumentSplit::default());
    }
}
