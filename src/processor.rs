use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::mem;

use thiserror::Error;

use crate::ast::{Invocation, Scope};
use crate::parser::MacroParser;

/// Sentinel that shields literal `$` characters in argument text from the
/// placeholder passes. Reverted in one pass after all substitution is done.
const DOLLAR_SENTINEL: &str = "$@";

/// Highest placeholder index that is blanked when no argument fills it.
/// Indices past 10 are never matched as a unit; the lower passes rewrite
/// their `$1`..`$9` prefixes instead.
const MAX_PLACEHOLDER: usize = 10;

#[derive(Debug, Error)]
pub enum ExpandError {
    /// A line failed to reach its fixed point within the configured cap.
    /// Only possible when a pass limit was requested.
    #[error("expansion did not settle after {limit} rewrites")]
    PassLimitExceeded { limit: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Normal,
    GlobalDefinition,
    LocalDefinition,
}

/// Line-oriented macro expander.
///
/// Holds the global table (run-long) and the local table (cleared after every
/// line that is not itself a local definition). Feed lines through
/// [`process_line`](Expander::process_line) or drive a whole stream with
/// [`expand`](Expander::expand).
#[derive(Debug, Default)]
pub struct Expander {
    globals: HashMap<String, String>,
    locals: HashMap<String, String>,
    pass_limit: Option<usize>,
}

impl Expander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of rewrites per line. Without a cap the rewrite loop is
    /// unbounded and a self-referential macro will not terminate.
    pub fn with_pass_limit(mut self, limit: usize) -> Self {
        self.pass_limit = Some(limit);
        self
    }

    /// Register a global macro, as if `#+MACRO: name body` had been read.
    pub fn define_global(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.globals.insert(name.into(), body.into());
    }

    /// Register a local macro, as if `#+MACRO_LOCAL: name body` had been read.
    pub fn define_local(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.locals.insert(name.into(), body.into());
    }

    /// Process one line (without its terminator).
    ///
    /// Definition lines update a table and return `None` — they are never
    /// emitted and never scanned for invocations. Ordinary lines are rewritten
    /// to their fixed point and returned. Either way the local table is
    /// cleared afterward unless this line was itself a local definition.
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>, ExpandError> {
        let (kind, emitted) = match MacroParser::parse_definition(line) {
            Some(def) => {
                let kind = match def.scope {
                    Scope::Global => {
                        self.globals.insert(def.name.to_string(), def.body.to_string());
                        LineKind::GlobalDefinition
                    }
                    Scope::Local => {
                        self.locals.insert(def.name.to_string(), def.body.to_string());
                        LineKind::LocalDefinition
                    }
                };
                (kind, None)
            }
            None => (LineKind::Normal, Some(self.expand_line(line)?)),
        };

        if kind != LineKind::LocalDefinition {
            self.locals.clear();
        }

        Ok(emitted)
    }

    /// Drive an input stream to an output stream, line by line.
    ///
    /// Each line is fully expanded and emitted before the next is read. The
    /// final line may lack a terminator; a nonempty unterminated remainder is
    /// processed as a line, and end of input causes no extra iteration.
    /// Terminators are preserved as read.
    pub fn expand<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<(), ExpandError> {
        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let (content, terminator) = match line.strip_suffix('\n') {
                Some(content) => (content, "\n"),
                None => (line.as_str(), ""),
            };
            if let Some(expanded) = self.process_line(content)? {
                output.write_all(expanded.as_bytes())?;
                output.write_all(terminator.as_bytes())?;
            }
        }
        output.flush()?;
        Ok(())
    }

    /// Rewrite `line` until no invocation matches.
    ///
    /// Always the rightmost match first, so invocations nested inside another
    /// invocation's argument list resolve before the outer one.
    fn expand_line(&self, line: &str) -> Result<String, ExpandError> {
        let mut line = line.to_string();
        let mut passes = 0usize;

        while let Some(inv) = MacroParser::find_last_invocation(&line) {
            if let Some(limit) = self.pass_limit {
                if passes >= limit {
                    return Err(ExpandError::PassLimitExceeded { limit });
                }
            }
            passes += 1;

            let replacement = self.resolve(&inv);
            let (start, end) = (inv.start, inv.end);
            line.replace_range(start..end, &replacement);
        }

        Ok(line)
    }

    /// Compute the replacement text for a matched invocation.
    fn resolve(&self, inv: &Invocation) -> String {
        let body = self
            .locals
            .get(inv.name)
            .or_else(|| self.globals.get(inv.name));

        // An empty body and no definition are indistinguishable: both delete
        // the invocation.
        let body = match body {
            Some(body) if !body.is_empty() => body,
            _ => return String::new(),
        };

        match inv.args {
            None => body.clone(),
            Some(raw) => substitute_arguments(body, raw),
        }
    }
}

/// Expand `$0`..`$10` in `body` from the raw argument text of an invocation.
fn substitute_arguments(body: &str, raw_args: &str) -> String {
    let quoted = quote_dollar(raw_args);
    let args = split_arguments(&quoted);

    // $0 gets the whole argument text, unsplit and with `\,` escapes intact.
    let mut body = body.replace("$0", &quoted);
    for (i, arg) in args.iter().enumerate() {
        body = body.replace(&format!("${}", i + 1), arg);
    }
    for i in args.len() + 1..=MAX_PLACEHOLDER {
        body = body.replace(&format!("${i}"), "");
    }

    unquote_dollar(&body)
}

/// Split argument text on commas; `\,` is a literal comma, not a delimiter.
/// The escaping backslash is dropped from the split value.
fn split_arguments(raw: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ',' => args.push(mem::take(&mut current)),
            '\\' if chars.peek() == Some(&',') => {
                chars.next();
                current.push(',');
            }
            _ => current.push(c),
        }
    }
    args.push(current);
    args
}

fn quote_dollar(s: &str) -> String {
    s.replace('$', DOLLAR_SENTINEL)
}

fn unquote_dollar(s: &str) -> String {
    s.replace(DOLLAR_SENTINEL, "$")
}
