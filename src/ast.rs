/// Which macro table a definition line writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `#+MACRO:` — visible for the rest of the run.
    Global,
    /// `#+MACRO_LOCAL:` — visible through the next non-local-definition line.
    Local,
}

/// A recognized definition line, borrowing from the line it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition<'a> {
    pub scope: Scope,
    /// Macro name: a nonempty run of non-whitespace characters.
    pub name: &'a str,
    /// Everything after the single space following the name (may be empty).
    pub body: &'a str,
}

/// A matched macro invocation within a line.
///
/// `args` distinguishes `<<<name>>>` (`None`) from `<<<name()>>>`
/// (`Some("")`); only the latter triggers placeholder substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation<'a> {
    pub name: &'a str,
    /// Raw text between the parentheses, commas and escapes unprocessed.
    pub args: Option<&'a str>,
    /// Byte offset of the opening `<<<`.
    pub start: usize,
    /// Byte offset one past the closing `>>>`.
    pub end: usize,
}
