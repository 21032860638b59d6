use pest::Parser;
use pest_derive::Parser;

use crate::ast::{Definition, Invocation, Scope};

#[derive(Parser)]
#[grammar = "orgmacro.pest"]
pub struct MacroParser;

impl MacroParser {
    /// Classify a line (terminator already stripped) as a definition.
    ///
    /// Returns `None` for ordinary lines, including `#+` lines that match
    /// neither definition form — those fall through to expansion with their
    /// literal text intact.
    pub fn parse_definition(line: &str) -> Option<Definition<'_>> {
        let mut pairs = Self::parse(Rule::definition, line).ok()?;
        let form = pairs.next()?.into_inner().next()?;

        let scope = match form.as_rule() {
            Rule::global_def => Scope::Global,
            Rule::local_def => Scope::Local,
            _ => return None,
        };

        let mut parts = form.into_inner();
        let name = parts.next()?.as_str();
        let body = parts.next().map(|p| p.as_str()).unwrap_or("");

        Some(Definition { scope, name, body })
    }

    /// Find the invocation with the greatest start offset in `line`.
    ///
    /// Candidate start positions (every occurrence of `<<<`, overlapping
    /// included) are tried from the end of the line backward, so an inner
    /// invocation nested in another's argument list is always found before
    /// the outer one that contains it.
    pub fn find_last_invocation(line: &str) -> Option<Invocation<'_>> {
        let bytes = line.as_bytes();
        for start in (0..bytes.len().saturating_sub(2)).rev() {
            if &bytes[start..start + 3] != b"<<<" {
                continue;
            }
            if let Some(inv) = Self::parse_invocation_at(line, start) {
                return Some(inv);
            }
        }
        None
    }

    /// Match the invocation grammar anchored at byte offset `start`.
    fn parse_invocation_at(line: &str, start: usize) -> Option<Invocation<'_>> {
        let mut pairs = Self::parse(Rule::invocation, &line[start..]).ok()?;
        let inv = pairs.next()?;
        let end = start + inv.as_span().end();

        let form = inv.into_inner().next()?;
        match form.as_rule() {
            Rule::call => {
                let mut parts = form.into_inner();
                let name = parts.next()?.as_str();
                let args = parts.next().map(|p| p.as_str()).unwrap_or("");
                Some(Invocation {
                    name,
                    args: Some(args),
                    start,
                    end,
                })
            }
            Rule::plain => {
                let name = form.into_inner().next()?.as_str();
                Some(Invocation {
                    name,
                    args: None,
                    start,
                    end,
                })
            }
            _ => None,
        }
    }
}
