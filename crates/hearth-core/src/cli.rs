// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A small command-line option parser.
//!
//! Accepts `--name value` and `-name value`. A flag followed by nothing, or by
//! another token starting with `-`, is a valueless flag and maps to an empty
//! string. Every other token is positional.

use std::collections::BTreeMap;
use std::str::FromStr;

/// Errors raised when querying a [`CommandLine`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    /// A required option was not given.
    #[error("Required option not found: {0}")]
    MissingOption(String),
    /// An option value could not be parsed into the requested type.
    #[error("Invalid value '{value}' for option '{option}': {reason}")]
    InvalidValue {
        /// The option name, without dashes.
        option: String,
        /// The raw value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Parsed command-line options and positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    options: BTreeMap<String, String>,
    positional: Vec<String>,
}

impl CommandLine {
    /// Parses the arguments of the current process.
    pub fn from_env() -> Self {
        Self::parse(std::env::args())
    }

    /// Parses `args`; the first element is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut command_line = Self::default();
        let mut args = args.into_iter().skip(1).map(Into::into).peekable();

        while let Some(arg) = args.next() {
            let name = arg
                .strip_prefix("--")
                .or_else(|| arg.strip_prefix('-'))
                .map(str::to_string);
            match name {
                Some(name) => {
                    let value = match args.peek() {
                        Some(next) if !next.starts_with('-') => args.next().unwrap_or_default(),
                        _ => String::new(),
                    };
                    command_line.options.insert(name, value);
                }
                None => command_line.positional.push(arg),
            }
        }
        command_line
    }

    /// Returns `true` if the option was given, with or without a value.
    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Returns the value of an option, if given.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Returns the value of an option, or `default` when absent.
    pub fn option_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.option(name).unwrap_or(default)
    }

    /// Returns the value of an option that must be present.
    ///
    /// # Errors
    /// [`CliError::MissingOption`] if the option was not given.
    pub fn required_option(&self, name: &str) -> Result<&str, CliError> {
        self.option(name)
            .ok_or_else(|| CliError::MissingOption(name.to_string()))
    }

    /// Parses the value of an option, or returns `default` when absent.
    ///
    /// # Errors
    /// [`CliError::InvalidValue`] if the value does not parse as `T`.
    pub fn parse_option_or<T>(&self, name: &str, default: T) -> Result<T, CliError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.option(name) {
            Some(value) => value.parse().map_err(|e: T::Err| CliError::InvalidValue {
                option: name.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    /// Non-flag arguments, in order.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// One `name: value` line per option, sorted by name.
    pub fn options_summary(&self) -> String {
        self.options
            .iter()
            .map(|(name, value)| format!("{name}: {value}\n"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CommandLine {
        CommandLine::parse(std::iter::once("hearth").chain(args.iter().copied()))
    }

    #[test]
    fn test_long_and_short_flags() {
        let cli = parse(&["--width", "800", "-title", "demo"]);
        assert_eq!(cli.option("width"), Some("800"));
        assert_eq!(cli.option("title"), Some("demo"));
    }

    #[test]
    fn test_flag_followed_by_flag_is_valueless() {
        let cli = parse(&["--verbose", "--width", "800", "-fullscreen"]);
        assert!(cli.has_option("verbose"));
        assert_eq!(cli.option("verbose"), Some(""));
        assert_eq!(cli.option("fullscreen"), Some(""));
        assert_eq!(cli.option("width"), Some("800"));
    }

    #[test]
    fn test_positional_arguments() {
        let cli = parse(&["scene.json", "--width", "800", "extra"]);
        assert_eq!(cli.positional(), ["scene.json", "extra"]);
    }

    #[test]
    fn test_program_name_is_skipped() {
        let cli = CommandLine::parse(["hearth"]);
        assert!(cli.positional().is_empty());
        assert_eq!(cli.options_summary(), "");
    }

    #[test]
    fn test_required_option_missing() {
        let cli = parse(&[]);
        assert_eq!(
            cli.required_option("config"),
            Err(CliError::MissingOption("config".to_string()))
        );
    }

    #[test]
    fn test_optional_option_default() {
        let cli = parse(&["--title", "x"]);
        assert_eq!(cli.option_or("log-level", "info"), "info");
        assert_eq!(cli.option_or("title", "Hearth"), "x");
    }

    #[test]
    fn test_parse_option_or() {
        let cli = parse(&["--width", "1024", "--height", "tall"]);
        assert_eq!(cli.parse_option_or("width", 1280u32), Ok(1024));
        assert_eq!(cli.parse_option_or("depth", 3u32), Ok(3));
        assert!(matches!(
            cli.parse_option_or("height", 720u32),
            Err(CliError::InvalidValue { option, .. }) if option == "height"
        ));
    }

    #[test]
    fn test_later_duplicate_wins_and_summary_is_sorted() {
        let cli = parse(&["--width", "1", "--title", "t", "--width", "2"]);
        assert_eq!(cli.options_summary(), "title: t\nwidth: 2\n");
    }
}
