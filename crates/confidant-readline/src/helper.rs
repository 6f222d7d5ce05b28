use crate::command::COMMANDS;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};

/// rustyline helper that provides completion, highlighting, and hints for slash commands.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        let prefix = prefix.to_lowercase();
        self.commands
            .iter()
            .filter(move |cmd| cmd.starts_with(&prefix))
    }
}

impl Default for CliHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates = self
                .matching(line)
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let line = &line[..pos];

        if line.starts_with('/') {
            self.matching(line)
                .find(|cmd| cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use rustyline::history::DefaultHistory;

    #[test]
    fn test_hint_completes_unique_prefix() {
        let helper = CliHelper::new();
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        assert_eq!(helper.hint("/inj", 4, &ctx), Some("ect portrait".to_string()));
        assert_eq!(helper.hint("/list p", 7, &ctx), Some("ortraits".to_string()));
        assert_eq!(helper.hint("hello", 5, &ctx), None);
    }

    #[test]
    fn test_complete_lists_all_list_commands() {
        let helper = CliHelper::new();
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (start, candidates) = helper.complete("/list", 5, &ctx).unwrap();
        assert_eq!(start, 0);
        let names: Vec<_> = candidates.into_iter().map(|p| p.replacement).collect();
        assert_eq!(names, vec!["/list history", "/list portraits"]);
    }
}
