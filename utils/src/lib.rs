use std::{fmt, io::BufRead, str::FromStr};

use anyhow::Context;
use clap::ArgMatches;

/// LogLevel
///
/// Represents minimum level of messages that will be logged
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel {
    pub level: usize,
}

impl FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel { level: 0 }),
            "warn" => Ok(LogLevel { level: 1 }),
            "info" => Ok(LogLevel { level: 2 }),
            "debug" => Ok(LogLevel { level: 3 }),
            "trace" => Ok(LogLevel { level: 4 }),
            "none" => Ok(LogLevel { level: 5 }),
            _ => Err("no match"),
        }
    }
}

impl LogLevel {
    pub fn is_none(&self) -> bool {
        self.level > 4
    }
    pub fn get_level(&self) -> usize {
        if self.level > 4 {
            0
        } else {
            self.level
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let level_str = ["error", "warn", "info", "debug", "trace", "none"];
        if self.level < 6 {
            write!(f, "{}", level_str[self.level])
        } else {
            write!(f, "unknown")
        }
    }
}

/// Initialize logging from command line arguments
///
/// Expects the `loglevel`, `quiet` and `timestamp` options to be defined
/// in the clap model.
pub fn init_log(m: &ArgMatches) -> anyhow::Result<()> {
    let verbose = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or(LogLevel { level: 2 });
    let quiet = verbose.is_none() || m.get_flag("quiet");
    let ts = m
        .get_one::<stderrlog::Timestamp>("timestamp")
        .copied()
        .unwrap_or(stderrlog::Timestamp::Off);

    stderrlog::new()
        .quiet(quiet)
        .verbosity(verbose.get_level())
        .timestamp(ts)
        .init()
        .with_context(|| "Could not initialize logging")
}

/// Field separator for delimited text input
///
/// Parsed from a single character.  The escapes `\t` and `tab` are
/// accepted so a tab can be given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator(char);

impl Separator {
    pub fn new(c: char) -> Self {
        Self(c)
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self('\t')
    }
}

impl FromStr for Separator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "\\t" | "tab" | "TAB" => Ok(Self('\t')),
            _ => {
                let mut it = s.chars();
                match (it.next(), it.next()) {
                    (Some(c), None) if c != '\n' && c != '\r' => Ok(Self(c)),
                    _ => Err(format!("Separator must be a single character, got '{}'", s)),
                }
            }
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            '\t' => write!(f, "\\t"),
            c => write!(f, "{}", c),
        }
    }
}

/// Read in next line and split on `sep` after stripping the line terminator
///
/// Returns Ok(None) at EOF.  Unlike trimming, leading and trailing white space
/// is kept so an empty leading field is preserved.
pub fn get_next_line<'a, R: BufRead>(
    rdr: &mut R,
    buf: &'a mut String,
    sep: Separator,
) -> anyhow::Result<Option<std::str::Split<'a, char>>> {
    buf.clear();
    if rdr.read_line(buf)? == 0 {
        Ok(None)
    } else {
        Ok(Some(
            buf.trim_end_matches(&['\n', '\r'][..]).split(sep.as_char()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn log_level_parsing() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap().get_level(), 1);
        assert!("none".parse::<LogLevel>().unwrap().is_none());
        assert_eq!("none".parse::<LogLevel>().unwrap().get_level(), 0);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel { level: 3 }.to_string(), "debug");
    }

    #[test]
    fn separator_parsing() {
        assert_eq!("\\t".parse::<Separator>().unwrap().as_char(), '\t');
        assert_eq!("tab".parse::<Separator>().unwrap(), Separator::default());
        assert_eq!(",".parse::<Separator>().unwrap().as_char(), ',');
        assert!("".parse::<Separator>().is_err());
        assert!("ab".parse::<Separator>().is_err());
        assert_eq!(Separator::default().to_string(), "\\t");
    }

    #[test]
    fn next_line_strips_terminators() {
        let mut rdr = Cursor::new("a\tb\r\nc\n\nd");
        let mut buf = String::new();
        let sep = Separator::default();

        let mut lines = Vec::new();
        while let Some(fields) = get_next_line(&mut rdr, &mut buf, sep).unwrap() {
            lines.push(fields.map(|s| s.to_owned()).collect::<Vec<_>>());
        }
        assert_eq!(
            lines,
            vec![
                vec!["a".to_owned(), "b".to_owned()],
                vec!["c".to_owned()],
                vec!["".to_owned()],
                vec!["d".to_owned()],
            ]
        );
    }

    #[test]
    fn next_line_keeps_leading_empty_field() {
        let mut rdr = Cursor::new("\tx\n");
        let mut buf = String::new();
        let mut fields = get_next_line(&mut rdr, &mut buf, Separator::default())
            .unwrap()
            .unwrap();
        assert_eq!(fields.next(), Some(""));
        assert_eq!(fields.next(), Some("x"));
    }
}
