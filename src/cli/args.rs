//! `--flag` / `--option value` parsing for command arguments.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::cli::error::CommandError;

#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positionals: Vec<&'a str>,
    flags: Vec<&'a str>,
    options: Vec<(&'a str, &'a str)>,
}

impl<'a> ParsedArgs<'a> {
    /// Splits `args` into positionals, bare flags and options. Names listed in
    /// `value_options` take the next argument as their value, unless written
    /// as `--name=value`.
    pub fn parse(args: &[&'a str], value_options: &[&str]) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positionals.push(arg);
                continue;
            };
            if let Some((key, value)) = name.split_once('=') {
                parsed.options.push((key, value));
            } else if value_options.iter().any(|option| *option == name) {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("`--{name}` needs a value"))
                })?;
                parsed.options.push((name, value));
            } else {
                parsed.flags.push(name);
            }
        }
        Ok(parsed)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.iter().any(|flag| *flag == name)
    }

    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

/// Parses `YYYY-MM-DD` as midnight UTC.
pub(crate) fn parse_date(input: &str) -> Result<DateTime<Utc>, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_positionals_flags_and_options() {
        let args = ["Pizza night", "12", "--income", "--category", "Food", "--note=late"];
        let parsed = ParsedArgs::parse(&args, &["category", "note"]).expect("parse");

        assert_eq!(parsed.positionals, ["Pizza night", "12"]);
        assert!(parsed.flag("income"));
        assert_eq!(parsed.option("category"), Some("Food"));
        assert_eq!(parsed.option("note"), Some("late"));
    }

    #[test]
    fn missing_option_value_is_rejected() {
        let err = ParsedArgs::parse(&["--category"], &["category"]).unwrap_err();
        assert!(err.to_string().contains("needs a value"));
    }

    #[test]
    fn dates_are_midnight_utc() {
        let parsed = parse_date("2025-02-14").expect("date");
        assert_eq!(parsed.to_rfc3339(), "2025-02-14T00:00:00+00:00");
        assert!(parse_date("14/02/2025").is_err());
    }
}
