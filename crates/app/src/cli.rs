use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use drill_core::model::{DigitRange, OperationKind};

#[derive(Parser)]
#[command(name = "drill", version, about = "Timed arithmetic practice in the terminal")]
pub struct Cli {
    /// SQLite database holding settings and history
    #[arg(long = "db", env = "DRILL_DB_URL", default_value = "sqlite:drill.sqlite3")]
    pub db_url: String,

    /// Base URL of the remote session store
    #[arg(long, env = "DRILL_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// User whose remote documents are read and written
    #[arg(long = "user", env = "DRILL_USER_ID")]
    pub user_id: Option<String>,

    /// Bearer token for the remote session store
    #[arg(long, env = "DRILL_REMOTE_TOKEN", hide_env_values = true)]
    pub remote_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Play a timed session (`q` quits, `p` pauses)
    Play {
        /// Replay the problem sequence for this seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show recent sessions
    History {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show aggregate statistics over recent sessions
    Stats,

    /// Show goal and daily challenge progress
    Goals,

    /// Change practice settings
    Configure {
        /// Session length in seconds: 30, 60 or 120
        #[arg(long)]
        length: Option<u32>,

        /// Operations to enable (comma-separated, e.g. "addition,percent")
        #[arg(long, value_delimiter = ',', value_parser = parse_kind)]
        only: Option<Vec<OperationKind>>,

        /// Digit ranges, e.g. "division=2-3/1" (first operand / second operand);
        /// percent takes a single range for the base
        #[arg(long, value_parser = parse_digits)]
        digits: Vec<DigitsArg>,
    },

    /// Push settings and the most recent local sessions to the remote store
    Sync,

    /// Replace local settings and history with the remote copies
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitsArg {
    pub kind: OperationKind,
    pub first: DigitRange,
    pub second: DigitRange,
}

pub fn parse_kind(raw: &str) -> Result<OperationKind, String> {
    OperationKind::from_key(raw.trim()).ok_or_else(|| format!("unknown operation: {raw}"))
}

fn parse_range(raw: &str) -> Result<DigitRange, String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<u8>()
            .map_err(|_| format!("invalid digit count: {s}"))
    };
    match raw.split_once('-') {
        Some((min, max)) => Ok(DigitRange::new(parse(min)?, parse(max)?)),
        None => Ok(DigitRange::single(parse(raw)?)),
    }
}

/// `kind=range[/range]`, where a range is `n` or `min-max`; one range applies to both operands.
///
/// Percent problems draw only the base, so `percent` accepts a single range.
pub fn parse_digits(raw: &str) -> Result<DigitsArg, String> {
    let (kind, ranges) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <operation>=<digits>, got {raw}"))?;
    let kind = parse_kind(kind)?;
    let (first, second) = match ranges.split_once('/') {
        Some(_) if kind == OperationKind::PercentOf => {
            return Err("percent takes one digit range, for the base".to_owned());
        }
        Some((first, second)) => (parse_range(first)?, parse_range(second)?),
        None => {
            let range = parse_range(ranges)?;
            (range, range)
        }
    };
    Ok(DigitsArg {
        kind,
        first,
        second,
    })
}

/// Turn a relative `sqlite:` path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw.to_owned();
    }

    let path_str = raw.strip_prefix("sqlite:").unwrap_or(raw);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> std::io::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid database url: {db_url}"),
        ));
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid database url: {db_url}"),
        ));
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_accept_single_shared_and_split_ranges() {
        let shared = parse_digits("addition=3").unwrap();
        assert_eq!(shared.first, DigitRange::single(3));
        assert_eq!(shared.second, DigitRange::single(3));

        let split = parse_digits("division=2-3/1").unwrap();
        assert_eq!(split.kind, OperationKind::Division);
        assert_eq!(split.first, DigitRange::new(2, 3));
        assert_eq!(split.second, DigitRange::single(1));
    }

    #[test]
    fn digits_reject_bad_input() {
        assert!(parse_digits("modulo=2").is_err());
        assert!(parse_digits("addition").is_err());
        assert!(parse_digits("addition=x").is_err());
    }

    #[test]
    fn percent_takes_one_range() {
        assert!(parse_digits("percent=2/3").is_err());
        let base = parse_digits("percent=2-3").unwrap();
        assert_eq!(base.second, DigitRange::new(2, 3));
    }

    #[test]
    fn cli_parses_goals() {
        let cli = Cli::try_parse_from(["drill", "--db", "sqlite::memory:", "goals"]).unwrap();
        assert!(matches!(cli.command, Command::Goals));
    }

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(normalize_sqlite_url("sqlite:///tmp/a.db"), "sqlite:///tmp/a.db");
        assert!(normalize_sqlite_url("sqlite:drill.sqlite3").starts_with("sqlite:///"));
    }

    #[test]
    fn cli_parses_configure() {
        let cli = Cli::try_parse_from([
            "drill",
            "--db",
            "sqlite::memory:",
            "configure",
            "--length",
            "30",
            "--only",
            "addition,percent",
            "--digits",
            "percent=2-3",
        ])
        .unwrap();
        let Command::Configure {
            length,
            only,
            digits,
        } = cli.command
        else {
            panic!("expected configure");
        };
        assert_eq!(length, Some(30));
        assert_eq!(
            only,
            Some(vec![OperationKind::Addition, OperationKind::PercentOf])
        );
        assert_eq!(digits.len(), 1);
    }
}
