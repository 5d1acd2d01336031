/*!
The lifecycle of a parsing context, and what each step reports.
*/

use argwalk_parser::PopulatedStr;

use crate::{errors::ParseError, value::Value};

/// Where a [`Context`][crate::Context] is in its lifecycle.
///
/// `Counting` → `Initializing` → `Parsing` → one of `End`, `Break`, or
/// `Error` → `Released`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The declaration function is running its first pass
    Counting,

    /// The declaration function is running its second pass
    Initializing,

    /// Tokens are being matched
    Parsing,

    /// The input was exhausted, or a subcommand took over
    End,

    /// The caller stopped parsing early
    Break,

    /// A parse error was reported
    Error,

    /// Descriptor storage was dropped; the context can't be used anymore
    Released,
}

impl Phase {
    /// True once parsing is over, for any reason
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::End | Phase::Break | Phase::Error | Phase::Released
        )
    }
}

/// The result of one call to [`Context::step`][crate::Context::step]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<'a, Id> {
    /// An option was matched. `value` is [`Value::None`] for flags.
    Matched { id: Id, value: Value<'a> },

    /// A subcommand was matched. The rest of the command line belongs to
    /// it; enter a nested context to keep parsing.
    Command { id: Id, name: &'a str },

    /// A positional argument, delivered to the catchall
    Positional(&'a str),

    /// A token that looked like an option but isn't declared, delivered to
    /// the catchall
    Unmatched(&'a str),

    /// `--help` was given, no help option was declared, and auto help is on.
    /// The help text has already been written.
    Help,

    /// The input is finished. This is the last step before release.
    End,

    /// The command line was invalid. The message has already been written.
    Error(ParseError<'a>),
}

/// Where the matcher is within the token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode<'a> {
    Ready,

    /// After the dashdash marker, every token is positional
    PositionalOnly,

    /// Partway through a short group such as `-xzf`
    ShortGroup {
        token: &'a str,
        rest: PopulatedStr<'a>,
    },

    /// A subcommand matched or the caller stopped; the next step is `End`
    Halted,
}
