//! Configuration loading helpers for the meshctl runtime.
//!
//! The argument vector carries two audiences: leading `--flag` tokens feed
//! the layered configuration loader, and everything from the first
//! unrecognised token onward is the admin command. The split happens before
//! clap sees anything, so a `key=value` command parameter is never mistaken
//! for a flag.

use std::ffi::{OsStr, OsString};

use meshctl_config::Config;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration for the CLI.
    ///
    /// Configuration flags (listed in `CONFIG_CLI_FLAGS`) must appear before
    /// the admin command. A configuration flag spelled after the command
    /// token is forwarded to the daemon as a command parameter instead.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

/// How a recognised configuration flag carries its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueStyle {
    /// `--flag=value`, complete in one token.
    Inline,
    /// `--flag value`, consuming the following token.
    Separate,
}

/// Classifies one argument token, returning `None` for anything that is not
/// a known configuration flag.
fn classify_flag(argument: &OsStr) -> Option<ValueStyle> {
    let text = argument.to_string_lossy();
    let (flag, style) = match text.split_once('=') {
        Some((flag, _)) => (flag.to_owned(), ValueStyle::Inline),
        None => (text.into_owned(), ValueStyle::Separate),
    };
    if super::CONFIG_CLI_FLAGS.contains(&flag.as_str()) {
        Some(style)
    } else {
        None
    }
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut command_start = 1usize;
    let mut tokens = rest.iter();
    while let Some(argument) = tokens.next() {
        let Some(style) = classify_flag(argument.as_os_str()) else {
            break;
        };
        config_arguments.push(argument.clone());
        command_start += 1;
        if style == ValueStyle::Separate
            && let Some(value) = tokens.next()
        {
            config_arguments.push(value.clone());
            command_start += 1;
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start,
    }
}
