//! Streaming, line-oriented macro expander.
//!
//! Definition lines register macros and are consumed:
//!
//! ```text
//! #+MACRO: name body with $1 placeholders
//! #+MACRO_LOCAL: name visible only through the next ordinary line
//! ```
//!
//! Ordinary lines are rewritten until no invocation (`<<<name>>>` or
//! `<<<name(arg1,arg2)>>>`) remains, resolving nested invocations innermost
//! first, then emitted. Undefined macros expand to nothing; malformed
//! invocation syntax is left as literal text.
//!
//! ```
//! use orgmacro::Expander;
//!
//! let mut expander = Expander::new();
//! expander.define_global("greet", "Hello $1!");
//! let line = expander.process_line("<<<greet(World)>>>").unwrap();
//! assert_eq!(line.as_deref(), Some("Hello World!"));
//! ```

pub mod ast;
pub mod parser;
pub mod processor;

pub use ast::{Definition, Invocation, Scope};
pub use processor::{ExpandError, Expander};
