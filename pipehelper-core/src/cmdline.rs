//! Target command-line handling
//!
//! A target is a program path plus a single argument string. The argument
//! string is kept as given and only tokenized when the child is started.

use crate::error::{RelayError, Result};
use std::fmt;

/// Program to run and its raw argument string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: String,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: args.into(),
        }
    }

    /// Split a raw command line into program and argument string
    ///
    /// The program is the first token; a program path wrapped in double
    /// quotes may contain spaces. Everything after it, trimmed, is the
    /// argument string.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim_start();

        let (program, rest) = match raw.strip_prefix('"') {
            Some(quoted) => match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            },
            None => match raw.find(char::is_whitespace) {
                Some(end) => (&raw[..end], &raw[end..]),
                None => (raw, ""),
            },
        };

        if program.is_empty() {
            return Err(RelayError::EmptyCommandLine);
        }

        Ok(Self::new(program, rest.trim()))
    }

    /// Build from an already split argv, requoting the arguments
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or(RelayError::EmptyCommandLine)?;
        let program = program.as_ref();
        if program.is_empty() {
            return Err(RelayError::EmptyCommandLine);
        }

        Ok(Self::new(program, shell_words::join(args)))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &str {
        &self.args
    }

    /// Tokenize the argument string
    pub fn argv(&self) -> Result<Vec<String>> {
        Ok(shell_words::split(&self.args)?)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", shell_words::quote(&self.program))
        } else {
            write!(f, "{} {}", shell_words::quote(&self.program), self.args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let cmd = CommandLine::parse("grep -n 'foo bar' file.txt").unwrap();
        assert_eq!(cmd.program(), "grep");
        assert_eq!(cmd.args(), "-n 'foo bar' file.txt");
        assert_eq!(cmd.argv().unwrap(), vec!["-n", "foo bar", "file.txt"]);
    }

    #[test]
    fn test_parse_quoted_program() {
        let cmd = CommandLine::parse(r#"  "/opt/my tools/fmt"   --width 80 "#).unwrap();
        assert_eq!(cmd.program(), "/opt/my tools/fmt");
        assert_eq!(cmd.args(), "--width 80");
    }

    #[test]
    fn test_parse_program_only() {
        let cmd = CommandLine::parse("cat").unwrap();
        assert_eq!(cmd.program(), "cat");
        assert_eq!(cmd.args(), "");
        assert!(cmd.argv().unwrap().is_empty());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            CommandLine::parse("   "),
            Err(RelayError::EmptyCommandLine)
        ));
        assert!(matches!(
            CommandLine::parse(r#""" -x"#),
            Err(RelayError::EmptyCommandLine)
        ));
    }

    #[test]
    fn test_from_argv_requotes() {
        let cmd = CommandLine::from_argv(&["printf", "%s\n", "a b"]).unwrap();
        assert_eq!(cmd.program(), "printf");
        assert_eq!(cmd.argv().unwrap(), vec!["%s\n", "a b"]);
    }

    #[test]
    fn test_from_argv_empty() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            CommandLine::from_argv(&empty),
            Err(RelayError::EmptyCommandLine)
        ));
    }

    #[test]
    fn test_unbalanced_quotes() {
        let cmd = CommandLine::parse("echo 'unterminated").unwrap();
        assert!(matches!(cmd.argv(), Err(RelayError::CommandLine(_))));
    }

    #[test]
    fn test_display() {
        let cmd = CommandLine::new("/opt/my tools/fmt", "-w 80");
        assert_eq!(cmd.to_string(), "'/opt/my tools/fmt' -w 80");
    }
}
