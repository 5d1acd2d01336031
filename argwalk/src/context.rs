/*!
Parsing contexts. A [`Context`] is one parsing scope: the root command, or a
subcommand nested inside it. Every context of a single parse shares one
[`Cursor`], so a nested context picks up exactly where its parent left off,
and anything it consumes is consumed for the parent too.
*/

use core::{cell::Cell, fmt};

use tracing::debug;

use crate::{
    Tags,
    config::Config,
    descriptor::Kind,
    errors::{ConfigError, OptionName, ParseError, fatal},
    help,
    matcher::{Classified, Matcher},
    state::{Mode, Phase, Step},
    store::{Entry, Registrar, Store},
    value::{Value, coerce},
};

/// The position of the next unread token in argv, shared by every context
/// of one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(Cell<usize>);

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    /// A cursor positioned just after the program name
    #[must_use]
    pub fn new() -> Self {
        Self::at(1)
    }

    #[must_use]
    pub fn at(position: usize) -> Self {
        Self(Cell::new(position))
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> usize {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, position: usize) {
        self.0.set(position)
    }

    /// Read the next token and advance past it
    pub(crate) fn take<'a>(&self, argv: &[&'a str]) -> Option<(usize, &'a str)> {
        let position = self.get();
        let token = *argv.get(position)?;
        self.set(position + 1);
        Some((position, token))
    }
}

/// Read-only access to the chain of contexts above a nested one, used to
/// build usage lines like `Usage: prog remote add ...`.
pub trait Lineage {
    /// The program name for a root context, or the subcommand name
    fn command_name(&self) -> &str;

    fn parent(&self) -> Option<&dyn Lineage>;
}

/// The non-empty command names from the root down to `lineage`
pub(crate) fn chain(lineage: &dyn Lineage) -> Vec<&str> {
    let mut names = Vec::new();
    let mut node = Some(lineage);

    while let Some(current) = node {
        let name = current.command_name();
        if !name.is_empty() {
            names.push(name);
        }
        node = current.parent();
    }

    names.reverse();
    names
}

/// The last path component of `argv[0]`
fn program_name<'a>(argv: &[&'a str]) -> &'a str {
    match argv.first() {
        Some(&path) => path.rsplit(['/', '\\']).next().unwrap_or(path),
        None => "",
    }
}

/**
A single parsing scope.

A context is created, registered exactly once, and then stepped until it
returns [`None`]:

```
use argwalk::{Config, Context, Cursor, Descriptor, Sink, Step, Value};

let argv = ["prog", "-n", "3", "extra"];
let cursor = Cursor::new();
let mut context = Context::new(&argv, &cursor, Config::default().sink(Sink::Silent));

context.register(|args| {
    args.add(Descriptor::integer('n').short('n'))
        .positional("EXTRA");
});

assert_eq!(context.step(), Some(Step::Matched { id: 'n', value: Value::Int(3) }));
assert_eq!(context.step(), Some(Step::Positional("extra")));
assert_eq!(context.step(), Some(Step::End));
assert_eq!(context.step(), None);
```
*/
pub struct Context<'c, 'a, Id> {
    argv: &'a [&'a str],
    cursor: &'c Cursor,
    parent: Option<&'c dyn Lineage>,
    name: &'a str,
    config: Config<'a>,
    phase: Phase,
    store: Option<Store<'a, Id>>,
    mode: Mode<'a>,

    /// The entry index and value of the most recent match
    current: Option<(usize, Value<'a>)>,

    /// The argv index of the most recently classified token
    index: usize,
}

impl<Id> fmt::Debug for Context<'_, '_, Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("cursor", &self.cursor.get())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<Id> Lineage for Context<'_, '_, Id> {
    fn command_name(&self) -> &str {
        self.name
    }

    fn parent(&self) -> Option<&dyn Lineage> {
        self.parent
    }
}

impl<'c, 'a, Id> Context<'c, 'a, Id> {
    /// Create a root context. Its name, used in the usage line, is the last
    /// path component of `argv[0]`.
    pub fn new(argv: &'a [&'a str], cursor: &'c Cursor, config: Config<'a>) -> Self {
        Self::resume(argv, cursor, program_name(argv), config)
    }

    /// Create a context with no parent at the cursor's current position. This
    /// is for code that handles each subcommand in its own function, without
    /// access to the parent context.
    pub fn resume(
        argv: &'a [&'a str],
        cursor: &'c Cursor,
        name: &'a str,
        config: Config<'a>,
    ) -> Self {
        Self::with_parent(argv, cursor, None, name, config)
    }

    fn with_parent(
        argv: &'a [&'a str],
        cursor: &'c Cursor,
        parent: Option<&'c dyn Lineage>,
        name: &'a str,
        config: Config<'a>,
    ) -> Self {
        Self {
            argv,
            cursor,
            parent,
            name,
            config,
            phase: Phase::Counting,
            store: None,
            mode: Mode::Ready,
            current: None,
            index: cursor.get(),
        }
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config<'a> {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The argv index of the token behind the current match
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The shared cursor
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> &'c Cursor {
        self.cursor
    }

    fn transition(&mut self, phase: Phase) {
        if self.config.debug {
            debug!(context = self.name, from = ?self.phase, to = ?phase, "phase transition");
        }

        self.phase = phase;
    }

    fn store(&self) -> &Store<'a, Id> {
        match self.store {
            Some(ref store) => store,
            None if self.phase == Phase::Released => fatal(ConfigError::Released),
            None => fatal(ConfigError::Unregistered),
        }
    }

    /// Run the two registration passes. `declare` is called exactly twice,
    /// and must make the same calls both times.
    pub fn try_register(
        &mut self,
        mut declare: impl FnMut(&mut Registrar<'a, Id>),
    ) -> Result<(), ConfigError> {
        if self.phase != Phase::Counting {
            return Err(ConfigError::AlreadyRegistered);
        }

        if self.config.long_prefix.is_empty() {
            return Err(ConfigError::EmptyLongPrefix);
        }

        let mut counting = Registrar::counting();
        declare(&mut counting);
        let tally = counting.into_tally()?;

        self.transition(Phase::Initializing);

        let mut initializing = Registrar::initializing(tally);
        declare(&mut initializing);
        self.store = Some(Store::build(initializing, &self.config)?);

        self.transition(Phase::Parsing);
        Ok(())
    }

    /// Like [`try_register`][Self::try_register], but panics on a
    /// configuration error.
    #[track_caller]
    pub fn register(&mut self, declare: impl FnMut(&mut Registrar<'a, Id>)) {
        if let Err(error) = self.try_register(declare) {
            fatal(error)
        }
    }

    /// Stop parsing right away. The next step releases the context without
    /// reporting [`Step::End`].
    pub fn halt(&mut self) {
        if self.phase == Phase::Parsing {
            self.transition(Phase::Break);
        }
    }

    /// Stop consuming input. The next step reports [`Step::End`].
    pub fn stop(&mut self) {
        self.mode = Mode::Halted;
    }

    /// Take the next raw token and advance past it, ignoring any matching
    /// rules. For options that accept an optional extra operand.
    pub fn next_token(&mut self) -> Option<&'a str> {
        self.cursor.take(self.argv).map(|(_, token)| token)
    }

    /// Move the cursor back `count` tokens, but never onto the program name
    pub fn rewind(&mut self, count: usize) {
        let position = self.cursor.get().saturating_sub(count).max(1);
        self.cursor.set(position);
    }

    /// The entry behind the current match, if any
    #[must_use]
    pub fn current(&self) -> Option<&Entry<'a, Id>> {
        let (index, _) = self.current?;
        Some(self.store().entry(index))
    }

    /// The value of the current match; [`Value::None`] if there isn't one
    #[must_use]
    pub fn value(&self) -> Value<'a> {
        self.current.map(|(_, value)| value).unwrap_or_default()
    }

    /// The integer value of the current match. Panics if the current match
    /// isn't an integer option.
    #[track_caller]
    #[must_use]
    pub fn int_value(&self) -> i64 {
        match self.value().as_int() {
            Some(value) => value,
            None => fatal(ConfigError::NoValue {
                expected: "integer",
            }),
        }
    }

    /// The string value of the current match. Panics if the current match
    /// isn't a string option.
    #[track_caller]
    #[must_use]
    pub fn str_value(&self) -> &'a str {
        match self.value().as_str() {
            Some(value) => value,
            None => fatal(ConfigError::NoValue { expected: "string" }),
        }
    }

    /// Render the help text for this context
    #[must_use]
    pub fn help(&self) -> String {
        let mut out = String::new();

        help::render(&mut out, self, self.store(), &self.config)
            .expect("writing to a String can't fail");
        out
    }

    /// Write the help text to the configured sink
    pub fn print_help(&self) {
        self.emit(&self.help());
    }

    fn emit(&self, text: &str) {
        if let Err(error) = self.config.sink.write(text) {
            debug!(context = self.name, %error, "failed to write to the output sink");
        }
    }

    /// Create a nested context for the subcommand that was just matched. It
    /// shares this context's argv and cursor.
    ///
    /// Panics if the current match isn't a subcommand.
    #[track_caller]
    pub fn enter<'s, C>(&'s self, config: Config<'a>) -> Context<'s, 'a, C> {
        let name = match self.current() {
            Some(entry) if entry.kind() == Kind::Subcommand => {
                entry.tags().long().unwrap_or_default()
            }
            _ => fatal(ConfigError::NotOnSubcommand),
        };

        Context::with_parent(self.argv, self.cursor, Some(self), name, config)
    }

    fn option_name(&self, tags: Tags<'a>) -> OptionName<'a> {
        OptionName {
            prefix: self.config.long_prefix,
            tags,
        }
    }

    fn fail(&mut self, error: ParseError<'a>) -> Step<'a, Id> {
        self.emit(&format!("{error}\n"));
        self.transition(Phase::Error);
        Step::Error(error)
    }

    fn unclaimed(&mut self, step: Step<'a, Id>, token: &'a str) -> Step<'a, Id> {
        match self.store().catchall() {
            true => step,
            false => self.fail(ParseError::UnknownOption { token }),
        }
    }

    /// Release the descriptor storage
    fn release(&mut self) {
        self.store = None;
        self.current = None;
        self.transition(Phase::Released);
    }
}

impl<'a, Id: Copy + fmt::Debug> Context<'_, 'a, Id> {
    /**
    Advance by one step. Returns [`None`] once the context is released,
    which happens on the step after [`Step::End`], [`Step::Error`], or
    [`Step::Help`], or right after [`halt`][Self::halt].

    Panics if the context hasn't been registered.
    */
    #[track_caller]
    pub fn step(&mut self) -> Option<Step<'a, Id>> {
        match self.phase {
            Phase::Parsing => {}
            Phase::Counting | Phase::Initializing => fatal(ConfigError::Unregistered),
            Phase::End | Phase::Break | Phase::Error => {
                self.release();
                return None;
            }
            Phase::Released => return None,
        }

        self.current = None;

        let classified = {
            let Some(store) = self.store.as_ref() else {
                fatal(ConfigError::Unregistered)
            };

            Matcher {
                store,
                config: &self.config,
                argv: self.argv,
                cursor: self.cursor,
                mode: &mut self.mode,
                index: &mut self.index,
            }
            .classify()
        };

        let step = match classified {
            Classified::Entry { index, embedded } => self.extract(index, embedded),
            Classified::Positional(token) => self.unclaimed(Step::Positional(token), token),
            Classified::Unmatched(token) => self.unclaimed(Step::Unmatched(token), token),
            Classified::Help => {
                self.print_help();
                self.transition(Phase::Break);
                Step::Help
            }
            Classified::End => {
                self.transition(Phase::End);
                Step::End
            }
            Classified::Error(error) => self.fail(error),
        };

        if self.config.debug {
            debug!(context = self.name, index = self.index, ?step, "step");
        }

        Some(step)
    }

    /// Produce the step for a matched entry, reading its value if it needs
    /// one.
    fn extract(&mut self, index: usize, embedded: Option<&'a str>) -> Step<'a, Id> {
        let entry = *self.store().entry(index);
        let id = *entry.id();

        match entry.kind() {
            Kind::Subcommand => {
                self.mode = Mode::Halted;
                self.current = Some((index, Value::None));

                Step::Command {
                    id,
                    name: entry.tags().long().unwrap_or_default(),
                }
            }
            Kind::Void => match embedded {
                None => {
                    self.current = Some((index, Value::None));
                    Step::Matched {
                        id,
                        value: Value::None,
                    }
                }
                Some(value) => match self.store().catchall() {
                    true => Step::Unmatched(self.argv[self.index]),
                    false => self.fail(ParseError::EmbeddedValueNotExpected {
                        option: self.option_name(entry.tags()),
                        value,
                    }),
                },
            },
            kind => {
                let option = self.option_name(entry.tags());

                let Some(text) = embedded.or_else(|| self.next_token()) else {
                    return self.fail(ParseError::MissingValue { option });
                };

                match coerce(kind, text) {
                    Some(value) => {
                        self.current = Some((index, value));
                        Step::Matched { id, value }
                    }
                    None => {
                        let step = self.fail(ParseError::InvalidInteger { option, text });
                        self.print_help();
                        step
                    }
                }
            }
        }
    }
}
