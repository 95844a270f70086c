use env_logger::Env;
use std::collections::{HashMap, HashSet};

use crate::config::AdminConfig;
use crate::error::AdminError;

/// Initialises logging to stderr. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}

/// Command-line arguments of an admin binary: `--flag`, `--option value`
/// (or `--option=value`) and positionals.
#[derive(Debug, Default)]
pub struct Args {
    flags: HashSet<String>,
    options: HashMap<String, String>,
    positionals: Vec<String>,
}

impl Args {
    /// `value_options` lists the options that take a value; any other
    /// `--name` is a flag. Unknown names are rejected.
    pub fn parse<I>(
        args: I,
        known_flags: &[&str],
        value_options: &[&str],
    ) -> Result<Self, AdminError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positionals.push(arg);
                continue;
            };

            if let Some((key, value)) = name.split_once('=') {
                if !value_options.contains(&key) {
                    return Err(usage(format!("unknown option --{}", key)));
                }
                parsed.options.insert(key.to_string(), value.to_string());
            } else if value_options.contains(&name) {
                // A following `--name` is never taken as the value
                let value = iter
                    .next()
                    .filter(|next| !next.starts_with("--"))
                    .ok_or_else(|| usage(format!("--{} needs a value", name)))?;
                parsed.options.insert(name.to_string(), value);
            } else if known_flags.contains(&name) || name == "help" {
                parsed.flags.insert(name.to_string());
            } else {
                return Err(usage(format!("unknown flag --{}", name)));
            }
        }

        Ok(parsed)
    }

    pub fn from_env(known_flags: &[&str], value_options: &[&str]) -> Result<Self, AdminError> {
        Self::parse(std::env::args().skip(1), known_flags, value_options)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }

    pub fn wants_help(&self) -> bool {
        self.flag("help")
    }
}

fn usage(message: String) -> AdminError {
    AdminError::Config(message)
}

/// Environment configuration with the `--database` override applied.
pub fn load_config(args: &Args) -> Result<AdminConfig, AdminError> {
    AdminConfig::from_env()?.with_database(args.option("database").map(str::to_string))
}

/// Reports a failed run on stderr and exits non-zero. Argument and
/// configuration errors exit with 2, everything else with 1.
pub fn exit_on_error(result: Result<(), AdminError>) {
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let code = match e {
            AdminError::Config(_) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags_options_and_positionals() {
        let parsed = Args::parse(
            args(&["--dry-run", "--user-id", "U123", "--database=staging", "extra"]),
            &["dry-run"],
            &["user-id", "database"],
        )
        .unwrap();

        assert!(parsed.flag("dry-run"));
        assert_eq!(parsed.option("user-id"), Some("U123"));
        assert_eq!(parsed.option("database"), Some("staging"));
        assert_eq!(parsed.positional(0), Some("extra"));
        assert!(!parsed.wants_help());
    }

    #[test]
    fn test_rejects_unknown_flag() {
        let result = Args::parse(args(&["--yolo"]), &["dry-run"], &[]);
        assert!(matches!(result, Err(AdminError::Config(_))));
    }

    #[test]
    fn test_option_without_value() {
        let result = Args::parse(args(&["--user-id"]), &[], &["user-id"]);
        assert!(matches!(result, Err(AdminError::Config(ref m)) if m.contains("needs a value")));
    }

    #[test]
    fn test_option_does_not_swallow_next_flag() {
        let result = Args::parse(
            args(&["--user-id", "--dry-run"]),
            &["dry-run", "allow-unknown-user"],
            &["database", "user-id"],
        );
        assert!(matches!(result, Err(AdminError::Config(ref m)) if m == "--user-id needs a value"));

        let result = Args::parse(
            args(&["--password", "--hash-password"]),
            &["hash-password"],
            &["password"],
        );
        assert!(matches!(result, Err(AdminError::Config(ref m)) if m == "--password needs a value"));

        // An explicit `=` still allows values that start with dashes
        let parsed = Args::parse(args(&["--password=--odd--"]), &[], &["password"]).unwrap();
        assert_eq!(parsed.option("password"), Some("--odd--"));
    }

    #[test]
    fn test_help_is_always_known() {
        let parsed = Args::parse(args(&["--help"]), &[], &[]).unwrap();
        assert!(parsed.wants_help());
    }
}
