/*!
Command grammar: `<keyword> [arg ...]`.

Tokens are separated by runs of whitespace. The keyword is taken verbatim
(case-sensitive). Argument counts are not checked here; each command decides
what to do with missing or extra arguments.
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub keyword: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Remaining arguments rejoined with single spaces (`cat my notes.txt` -> `my notes.txt`).
    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}

/// Split a submitted line. Callers discard blank input beforehand.
pub fn parse(raw: &str) -> ParsedCommand {
    let mut tokens = raw.split_whitespace().map(str::to_string);
    let keyword = tokens.next().unwrap_or_default();
    ParsedCommand {
        keyword,
        args: tokens.collect(),
    }
}
