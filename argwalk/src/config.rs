/*!
Per-context configuration. A [`Config`] is fixed when its
[`Context`][crate::Context] is created; nested contexts get their own.
*/

use std::{
    cell::RefCell,
    fmt,
    io::{self, Write as _},
    rc::Rc,
};

use argwalk_parser::Lexer;

/// Where help text and parse error messages go
#[derive(Debug, Clone, Default)]
pub enum Sink {
    #[default]
    Stdout,
    Stderr,

    /// Discard everything
    Silent,

    /// Collect everything in memory
    Transcript(Transcript),
}

impl Sink {
    pub(crate) fn write(&self, text: &str) -> io::Result<()> {
        match self {
            Sink::Stdout => io::stdout().lock().write_all(text.as_bytes()),
            Sink::Stderr => io::stderr().lock().write_all(text.as_bytes()),
            Sink::Silent => Ok(()),
            Sink::Transcript(transcript) => {
                transcript.append(text);
                Ok(())
            }
        }
    }
}

/// A shared, in-memory record of everything written to a
/// [`Sink::Transcript`]. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct Transcript {
    buffer: Rc<RefCell<String>>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer.borrow().clone()
    }

    pub fn clear(&self) {
        self.buffer.borrow_mut().clear();
    }

    fn append(&self, text: &str) {
        self.buffer.borrow_mut().push_str(text);
    }
}

impl fmt::Debug for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transcript")
            .field(&self.buffer.borrow().len())
            .finish()
    }
}

/**
Configuration for one parsing context.

All fields are public; the builder methods are a convenience for the common
case of changing a few defaults:

```
use argwalk::{Config, Sink};

let config = Config::default()
    .long_prefix("/")
    .dashdash(false)
    .auto_help(false)
    .indent(7)
    .sink(Sink::Stderr);

assert_eq!(config.long_prefix, "/");
```
*/
#[derive(Debug, Clone)]
pub struct Config<'a> {
    /// Where help and error text is written
    pub sink: Sink,

    /// Replaces the generated `Usage:` line
    pub usage: Option<&'a str>,

    /// Appended after the options block, following a blank line
    pub suffix: Option<&'a str>,

    /// Column where subcommand descriptions start. Computed if unset.
    pub command_column: Option<usize>,

    /// Column where option descriptions start. Computed if unset.
    pub option_column: Option<usize>,

    /// Left margin for help entries
    pub indent: usize,

    /// Minimum gap before a computed description column
    pub padding: usize,

    /// Show an option's value hint (`<FILE>`) instead of its type name
    /// (`<string>`)
    pub variable_names: bool,

    /// Show `[int]` and `[string]` markers before option descriptions
    pub type_hints: bool,

    /// Allow grouped short options, like `-xzf`
    pub short_groups: bool,

    /// Recognize `--help` even when no such option was declared
    pub auto_help: bool,

    /// Treat everything after a bare `--` as positional
    pub dashdash: bool,

    /// The prefix for long options
    pub long_prefix: &'a str,

    /// Emit state transition diagnostics through `tracing`
    pub debug: bool,
}

impl Default for Config<'_> {
    fn default() -> Self {
        Self {
            sink: Sink::Stdout,
            usage: None,
            suffix: None,
            command_column: None,
            option_column: None,
            indent: 2,
            padding: 2,
            variable_names: true,
            type_hints: false,
            short_groups: true,
            auto_help: true,
            dashdash: true,
            long_prefix: "--",
            debug: false,
        }
    }
}

impl<'a> Config<'a> {
    #[must_use]
    pub fn sink(self, sink: Sink) -> Self {
        Self { sink, ..self }
    }

    #[must_use]
    pub fn usage(self, usage: &'a str) -> Self {
        Self {
            usage: Some(usage),
            ..self
        }
    }

    #[must_use]
    pub fn suffix(self, suffix: &'a str) -> Self {
        Self {
            suffix: Some(suffix),
            ..self
        }
    }

    #[must_use]
    pub fn command_column(self, column: usize) -> Self {
        Self {
            command_column: Some(column),
            ..self
        }
    }

    #[must_use]
    pub fn option_column(self, column: usize) -> Self {
        Self {
            option_column: Some(column),
            ..self
        }
    }

    #[must_use]
    pub fn indent(self, indent: usize) -> Self {
        Self { indent, ..self }
    }

    #[must_use]
    pub fn padding(self, padding: usize) -> Self {
        Self { padding, ..self }
    }

    #[must_use]
    pub fn variable_names(self, variable_names: bool) -> Self {
        Self {
            variable_names,
            ..self
        }
    }

    #[must_use]
    pub fn type_hints(self, type_hints: bool) -> Self {
        Self { type_hints, ..self }
    }

    #[must_use]
    pub fn short_groups(self, short_groups: bool) -> Self {
        Self {
            short_groups,
            ..self
        }
    }

    #[must_use]
    pub fn auto_help(self, auto_help: bool) -> Self {
        Self { auto_help, ..self }
    }

    #[must_use]
    pub fn dashdash(self, dashdash: bool) -> Self {
        Self { dashdash, ..self }
    }

    #[must_use]
    pub fn long_prefix(self, long_prefix: &'a str) -> Self {
        Self {
            long_prefix,
            ..self
        }
    }

    #[must_use]
    pub fn debug(self, debug: bool) -> Self {
        Self { debug, ..self }
    }

    /// The lexer for this configuration. `dashdash` is only honored when no
    /// descriptor claims `-` as a short name.
    pub(crate) fn lexer(&self, short_dash_claimed: bool) -> Lexer<'a> {
        Lexer::new(self.long_prefix).dashdash(self.dashdash && !short_dash_claimed)
    }
}
