/*!
Descriptors are the caller's declarations: one per option or subcommand.
They're plain values built with chained methods and handed to a
[`Registrar`][crate::store::Registrar] during registration.
*/

/// What an argument expects to find on the command line after its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A flag, such as `--verbose`. Takes no value.
    Void,

    /// An option with a string value, such as `--name alice`
    String,

    /// An option with an integer value, such as `--jobs 4` or `--mask=0x1F`
    Integer,

    /// A named, nested parsing scope, such as `login` in `prog login -u me`
    Subcommand,
}

impl Kind {
    /// True for the kinds that consume a value
    #[inline]
    #[must_use]
    pub const fn expects_value(self) -> bool {
        matches!(self, Kind::String | Kind::Integer)
    }

    /// The generic name for this kind's value, used in help text when no
    /// value hint is available
    #[inline]
    #[must_use]
    pub const fn type_name(self) -> Option<&'static str> {
        match self {
            Kind::String => Some("string"),
            Kind::Integer => Some("int"),
            Kind::Void | Kind::Subcommand => None,
        }
    }
}

/**
A single declared argument: an option or a subcommand.

The `id` is whatever the caller wants to get back when this argument is
matched; usually a small `Copy` enum. At least one of the short and long
names must be set, and subcommands must have a long name and no short name;
both rules are checked when the descriptor is registered.

```
use argwalk::{Descriptor, Kind};

let jobs = Descriptor::integer("jobs")
    .short('j')
    .long("jobs")
    .hint("N")
    .describe("Number of jobs to run in parallel");

assert_eq!(jobs.kind(), Kind::Integer);
assert_eq!(jobs.short_name(), Some('j'));
assert_eq!(jobs.value_hint(), Some("N"));
```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor<'a, Id> {
    pub(crate) id: Id,
    pub(crate) short: Option<char>,
    pub(crate) long: Option<&'a str>,
    pub(crate) description: Option<&'a str>,
    pub(crate) kind: Kind,
    pub(crate) hint: Option<&'a str>,
}

impl<'a, Id> Descriptor<'a, Id> {
    #[must_use]
    pub fn new(id: Id, kind: Kind) -> Self {
        Self {
            id,
            short: None,
            long: None,
            description: None,
            kind,
            hint: None,
        }
    }

    /// A flag that takes no value
    #[must_use]
    pub fn flag(id: Id) -> Self {
        Self::new(id, Kind::Void)
    }

    /// An option that takes a string value
    #[must_use]
    pub fn string(id: Id) -> Self {
        Self::new(id, Kind::String)
    }

    /// An option that takes an integer value
    #[must_use]
    pub fn integer(id: Id) -> Self {
        Self::new(id, Kind::Integer)
    }

    /// A subcommand, matched when `name` appears as a bare token
    #[must_use]
    pub fn command(id: Id, name: &'a str) -> Self {
        Self::new(id, Kind::Subcommand).long(name)
    }

    #[must_use]
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    #[must_use]
    pub fn long(mut self, long: &'a str) -> Self {
        self.long = Some(long);
        self
    }

    /// Set the help text. Descriptors without a description are hidden from
    /// the help output, but still matched.
    #[must_use]
    pub fn describe(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }

    /// Set the placeholder name for this option's value in help text, such
    /// as `FILE` in `--output <FILE>`.
    #[must_use]
    pub fn hint(mut self, hint: &'a str) -> Self {
        self.hint = Some(hint);
        self
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.id
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[inline]
    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    #[inline]
    pub fn long_name(&self) -> Option<&'a str> {
        self.long
    }

    #[inline]
    pub fn description(&self) -> Option<&'a str> {
        self.description
    }

    #[inline]
    pub fn value_hint(&self) -> Option<&'a str> {
        self.hint
    }
}
