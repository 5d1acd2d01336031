/*!
A step-driven command line argument parsing engine; argwalk walks the
argument vector one token at a time and tells you what it found.

The engine has two layers:

- A [`Context`] is a single parsing scope. You register descriptors with it
  through a declaration function (which runs twice: once to count, once to
  store), then call [`Context::step`] in a loop. Each step yields one
  [`Step`]: a matched option with its decoded [`Value`], a subcommand, a
  positional, or a control state like [`Step::End`]. Subcommands get their
  own nested [`Context`] through [`Context::enter`], sharing the same
  [`Cursor`] so parsing resumes exactly where the parent stopped.

- A [`Dispatch`] is a table from descriptor ids to handler closures. It owns
  the step loop and turns each handler's [`Flow`] into continue, stop, or
  break, which is usually all a program needs.

```
use argwalk::{Config, Descriptor, Dispatch, Flow, Outcome, Sink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arg {
    Verbose,
    Jobs,
}

#[derive(Default)]
struct Options {
    verbose: bool,
    jobs: i64,
    inputs: Vec<String>,
}

let argv = ["prog", "-v", "--jobs=4", "input.json"];
let mut options = Options::default();

let outcome = Dispatch::new(Config::default().sink(Sink::Silent))
    .on(Descriptor::flag(Arg::Verbose).short('v').long("verbose"), |options: &mut Options, _| {
        options.verbose = true;
        Flow::Continue
    })
    .on(Descriptor::integer(Arg::Jobs).short('j').long("jobs"), |options, invocation| {
        options.jobs = invocation.int();
        Flow::Continue
    })
    .positional("FILE...", |options, invocation| {
        options.inputs.push(invocation.str().to_owned());
        Flow::Continue
    })
    .run(&argv, &mut options);

assert_eq!(outcome, Outcome::Finished);
assert!(options.verbose);
assert_eq!(options.jobs, 4);
assert_eq!(options.inputs, ["input.json"]);
```
*/

pub mod config;
pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod errors;
mod help;
mod matcher;
mod printers;
pub mod state;
pub mod store;
pub mod value;

pub use argwalk_parser::Lexer;
pub use config::{Config, Sink, Transcript};
pub use context::{Context, Cursor, Lineage};
pub use descriptor::{Descriptor, Kind};
pub use dispatch::{Dispatch, Flow, Invocation, Outcome};
pub use errors::{ConfigError, GroupFault, OptionName, ParseError};
pub use state::{Phase, Step};
pub use store::{Entry, Registrar};
pub use value::Value;

/// The set of names that identify a particular option (`-short`, `--long`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tags<'a> {
    /// This option uses only a long name
    Long { long: &'a str },

    /// This option uses only a short name
    Short { short: char },

    /// This option uses both a long and short name
    LongShort { long: &'a str, short: char },
}

impl<'a> Tags<'a> {
    /// Combine an optional short and long name. Returns [`None`] if both are
    /// absent, since such an option could never be matched.
    #[inline]
    #[must_use]
    pub const fn new(short: Option<char>, long: Option<&'a str>) -> Option<Self> {
        match (short, long) {
            (None, None) => None,
            (Some(short), None) => Some(Tags::Short { short }),
            (None, Some(long)) => Some(Tags::Long { long }),
            (Some(short), Some(long)) => Some(Tags::LongShort { long, short }),
        }
    }

    /// Get the long name, if any
    #[inline]
    #[must_use]
    pub const fn long(&self) -> Option<&'a str> {
        match self {
            Tags::Long { long } | Tags::LongShort { long, .. } => Some(long),
            Tags::Short { .. } => None,
        }
    }

    /// Get the short name, if any
    #[inline]
    #[must_use]
    pub const fn short(&self) -> Option<char> {
        match self {
            Tags::Short { short } | Tags::LongShort { short, .. } => Some(*short),
            Tags::Long { .. } => None,
        }
    }
}
