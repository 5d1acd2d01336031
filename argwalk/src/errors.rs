/*!
Errors come in two flavors. A [`ParseError`] is the user's fault: the command
line didn't match the declared arguments. It borrows from argv and is
reported through [`Step::Error`][crate::Step::Error]. A [`ConfigError`] is
the programmer's fault: the declarations themselves are inconsistent, or an
accessor was used on the wrong kind of match. Those are fatal.
*/

use core::fmt;

use lazy_format::lazy_format;

use crate::Tags;

/// The name of an option as it should appear in an error message: the long
/// form with its configured prefix if there is one, otherwise `-x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionName<'a> {
    pub prefix: &'a str,
    pub tags: Tags<'a>,
}

impl fmt::Display for OptionName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.prefix;

        let name = lazy_format!(match (self.tags) {
            Tags::Long { long } | Tags::LongShort { long, .. } => "{prefix}{long}",
            Tags::Short { short } => "-{short}",
        });

        write!(f, "{name}")
    }
}

/// The specific problem with a malformed short option group
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GroupFault {
    #[error("there is no supported option \"-{0}\"")]
    Unsupported(char),

    #[error("option -{0} expects a value and therefore must be the last character")]
    ValueNotLast(char),
}

/// A recoverable error in the command line itself
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError<'a> {
    /// A token that no descriptor claims, with no positional catchall to
    /// receive it
    #[error("unexpected argument: {token:?}")]
    UnknownOption { token: &'a str },

    /// A valued option was the last token
    #[error("the {option} option expects a value")]
    MissingValue { option: OptionName<'a> },

    #[error("the {option} option expects an integer value, not {text:?}")]
    InvalidInteger { option: OptionName<'a>, text: &'a str },

    #[error("in argument {token:?}, {fault}")]
    MalformedShortGroup { token: &'a str, fault: GroupFault },

    /// `--flag=value` where `flag` takes no value
    #[error("the {option} option doesn't take a value (got {value:?})")]
    EmbeddedValueNotExpected { option: OptionName<'a>, value: &'a str },
}

/**
A programmer error: the declared arguments are inconsistent, or the context
was used in a way its current state doesn't allow. These are never caused by
the command line, so [`Context::register`][crate::Context::register] and
[`Dispatch`][crate::Dispatch] treat them as fatal.
*/
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("no arguments were declared, and there's no positional catchall")]
    NothingDeclared,

    #[error("an argument was declared with neither a short nor a long name")]
    Nameless,

    #[error("subcommands must have a long name and no short name (got short name {short:?})")]
    InvalidSubcommand { short: Option<char> },

    #[error("short option names must be ASCII (got {0:?})")]
    NonAsciiShort(char),

    #[error("the short option -{0} was declared more than once")]
    DuplicateShort(char),

    #[error("the long option {0:?} was declared more than once")]
    DuplicateLong(String),

    #[error("the subcommand {0:?} was declared more than once")]
    DuplicateCommand(String),

    #[error(
        "the declaration function isn't repeatable: counted {counted} {bucket}, \
        but registered {registered}"
    )]
    CountMismatch {
        bucket: &'static str,
        counted: usize,
        registered: usize,
    },

    #[error("the long option prefix must not be empty")]
    EmptyLongPrefix,

    #[error("the context was used before its arguments were registered")]
    Unregistered,

    #[error("the context's arguments were already registered")]
    AlreadyRegistered,

    #[error("the context was used after its storage was released")]
    Released,

    #[error("the current match has no {expected} value")]
    NoValue { expected: &'static str },

    #[error("the current match isn't a subcommand")]
    NotOnSubcommand,
}

/// Abort on a programmer error.
#[cold]
#[track_caller]
pub(crate) fn fatal(error: ConfigError) -> ! {
    panic!("argwalk configuration error: {error}")
}
