//! Canonical deployment environments.
//!
//! Every spelling an operator might type collapses to one of three values.
//! Normalization never fails: anything unrecognized is `dev`.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

/// One of the three environments every project is created with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl Environment {
    /// Map any input to an environment, case-insensitively.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Prod,
            _ => Environment::Dev,
        }
    }

    /// Map a menu answer (`1`/`2`/`3` or a name) to an environment.
    pub fn from_menu_choice(choice: &str) -> Self {
        match choice.trim() {
            "1" => Environment::Dev,
            "2" => Environment::Staging,
            "3" => Environment::Prod,
            other => Self::normalize(other),
        }
    }

    /// The slug the API expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accepts any string so binding files with odd spellings still load.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Environment, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| Environment::normalize(&s)).unwrap_or_default())
}

/// Show the environment menu on `output` and read one answer from `input`.
///
/// An empty or unrecognized answer selects `dev`.
pub fn prompt<R, W>(input: &mut R, output: &mut W) -> io::Result<Environment>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    write!(
        output,
        "Select environment:\n  1) dev\n  2) staging\n  3) prod\nChoice [1]: "
    )?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(Environment::from_menu_choice(&line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_normalize_table() {
        assert_eq!(Environment::normalize("PROD"), Environment::Prod);
        assert_eq!(Environment::normalize("production"), Environment::Prod);
        assert_eq!(Environment::normalize("stage"), Environment::Staging);
        assert_eq!(Environment::normalize(" Staging "), Environment::Staging);
        assert_eq!(Environment::normalize("development"), Environment::Dev);
        assert_eq!(Environment::normalize("dev"), Environment::Dev);
        assert_eq!(Environment::normalize(""), Environment::Dev);
        assert_eq!(Environment::normalize("anything-else"), Environment::Dev);
    }

    #[test]
    fn test_normalize_is_total() {
        for raw in ["", " ", "\t", "ПРОД", "1", "prod\n", "qa", "🦀"] {
            let env = Environment::normalize(raw);
            assert!(matches!(
                env,
                Environment::Dev | Environment::Staging | Environment::Prod
            ));
        }
    }

    #[test]
    fn test_menu_choices() {
        assert_eq!(Environment::from_menu_choice("1"), Environment::Dev);
        assert_eq!(Environment::from_menu_choice("2\n"), Environment::Staging);
        assert_eq!(Environment::from_menu_choice("3"), Environment::Prod);
        assert_eq!(Environment::from_menu_choice("prod"), Environment::Prod);
        assert_eq!(Environment::from_menu_choice("7"), Environment::Dev);
    }

    #[test]
    fn test_prompt_reads_one_answer() {
        let mut input = Cursor::new("2\n3\n");
        let mut output = Vec::new();
        assert_eq!(prompt(&mut input, &mut output).unwrap(), Environment::Staging);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("1) dev"));
        assert!(shown.contains("3) prod"));
    }

    #[test]
    fn test_prompt_eof_defaults_to_dev() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert_eq!(prompt(&mut input, &mut output).unwrap(), Environment::Dev);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_prompt_reports_write_failure() {
        let mut input = Cursor::new("3\n");
        let err = prompt(&mut input, &mut BrokenPipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_prompt_reports_unreadable_answer() {
        // Invalid UTF-8 cannot be read as a line.
        let mut input = Cursor::new(vec![0xff, 0xfe, b'\n']);
        let mut output = Vec::new();
        let err = prompt(&mut input, &mut output).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Environment::Staging).unwrap();
        assert_eq!(json, "\"staging\"");
    }
}
