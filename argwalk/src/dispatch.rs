/*!
A table from descriptor ids to handler closures, and the loop that drives a
[`Context`] through it.

Most programs don't need to call [`Context::step`] themselves: they build a
[`Dispatch`], attach a closure to each declared argument, and
[`run`][Dispatch::run] it. Each handler returns a [`Flow`] saying whether to
keep going.
*/

use core::fmt;

use tracing::debug;

use crate::{
    config::Config,
    context::{Context, Cursor},
    descriptor::Descriptor,
    errors::{ConfigError, ParseError, fatal},
    state::Step,
    value::Value,
};

/// What a handler wants to happen next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flow {
    /// Keep parsing
    #[default]
    Continue,

    /// Stop consuming input, but still run the end handler
    Stop,

    /// Stop right away; the end handler doesn't run
    Break,
}

/// How a dispatch loop finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// The input was exhausted (or a handler returned [`Flow::Stop`])
    Finished,

    /// A handler returned [`Flow::Break`], or automatic help was printed
    Broke,

    /// The command line was invalid. The message was already written to the
    /// configured sink.
    Failed(ParseError<'a>),
}

type Handler<'a, Id, S> = Box<dyn FnMut(&mut S, Invocation<'_, '_, 'a, Id>) -> Flow + 'a>;

/// Everything a handler can see and do while it's running
pub struct Invocation<'i, 'c, 'a, Id> {
    context: &'i mut Context<'c, 'a, Id>,
    value: Value<'a>,
    delegated: &'i mut Option<Outcome<'a>>,
}

impl<Id> fmt::Debug for Invocation<'_, '_, '_, Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("context", &self.context)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<'c, 'a, Id> Invocation<'_, 'c, 'a, Id> {
    /// The matched value. Positional handlers get the token as a string.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Value<'a> {
        self.value
    }

    /// The integer value. Panics if the handler isn't for an integer option.
    #[track_caller]
    #[must_use]
    pub fn int(&self) -> i64 {
        match self.value.as_int() {
            Some(value) => value,
            None => fatal(ConfigError::NoValue {
                expected: "integer",
            }),
        }
    }

    /// The string value. Panics if the handler isn't for a string option or
    /// a positional.
    #[track_caller]
    #[must_use]
    pub fn str(&self) -> &'a str {
        match self.value.as_str() {
            Some(value) => value,
            None => fatal(ConfigError::NoValue { expected: "string" }),
        }
    }

    /// The underlying context
    #[inline]
    pub fn context(&mut self) -> &mut Context<'c, 'a, Id> {
        self.context
    }

    /// The argv index of the matched token
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.context.index()
    }

    /// Take the next raw token; see [`Context::next_token`]
    pub fn next_token(&mut self) -> Option<&'a str> {
        self.context.next_token()
    }

    /// Move the cursor back; see [`Context::rewind`]
    pub fn rewind(&mut self, count: usize) {
        self.context.rewind(count);
    }

    #[must_use]
    pub fn help(&self) -> String {
        self.context.help()
    }

    pub fn print_help(&self) {
        self.context.print_help();
    }

    /// Open a nested context for the subcommand being handled
    #[track_caller]
    pub fn enter<'s, C>(&'s self, config: Config<'a>) -> Context<'s, 'a, C> {
        self.context.enter(config)
    }

    /// Run `child` in a nested context for the subcommand being handled. Its
    /// outcome becomes the outcome of the whole dispatch.
    #[track_caller]
    pub fn run<C, T>(&mut self, child: &mut Dispatch<'a, C, T>, state: &mut T) -> Outcome<'a>
    where
        C: Copy + Eq + fmt::Debug,
    {
        let mut nested = self.context.enter(child.config.clone());
        let outcome = child.drive(&mut nested, state);

        *self.delegated = Some(outcome.clone());
        outcome
    }
}

/**
A set of declared arguments, each with an optional handler.

Handlers are called in command line order. Arguments declared with
[`declare`][Self::declare] are matched (so they aren't errors) but
nothing happens when they appear.

```
use argwalk::{Config, Descriptor, Dispatch, Flow, Outcome, Sink, Transcript};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arg {
    Help,
    Name,
}

let transcript = Transcript::new();
let argv = ["greet", "-h", "--name", "ignored"];
let mut greeted = Vec::new();

let outcome = Dispatch::new(Config::default().sink(Sink::Transcript(transcript.clone())))
    .on(Descriptor::flag(Arg::Help).short('h').long("help").describe("Show help"), |_: &mut Vec<String>, invocation| {
        invocation.print_help();
        Flow::Break
    })
    .on(Descriptor::string(Arg::Name).long("name").describe("Who to greet"), |greeted: &mut Vec<String>, invocation| {
        greeted.push(invocation.str().to_owned());
        Flow::Continue
    })
    .run(&argv, &mut greeted);

assert_eq!(outcome, Outcome::Broke);
assert!(greeted.is_empty());
assert!(transcript.contents().starts_with("Usage: greet [-h] [OPTIONS]\n"));
```
*/
pub struct Dispatch<'a, Id, S> {
    config: Config<'a>,
    descriptors: Vec<Descriptor<'a, Id>>,
    handlers: Vec<(Id, Handler<'a, Id, S>)>,
    positional: Option<(Option<&'a str>, Handler<'a, Id, S>)>,
    end: Option<Handler<'a, Id, S>>,
}

impl<Id: fmt::Debug, S> fmt::Debug for Dispatch<'_, Id, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("config", &self.config)
            .field("descriptors", &self.descriptors)
            .field("positional", &self.positional.is_some())
            .field("end", &self.end.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, Id, S> Dispatch<'a, Id, S> {
    #[must_use]
    pub fn new(config: Config<'a>) -> Self {
        Self {
            config,
            descriptors: Vec::new(),
            handlers: Vec::new(),
            positional: None,
            end: None,
        }
    }

    /// Declare an argument without a handler
    #[must_use]
    pub fn declare(mut self, descriptor: Descriptor<'a, Id>) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Declare an argument, and call `handler` each time it's matched
    #[must_use]
    pub fn on<F>(mut self, descriptor: Descriptor<'a, Id>, handler: F) -> Self
    where
        Id: Copy,
        F: FnMut(&mut S, Invocation<'_, '_, 'a, Id>) -> Flow + 'a,
    {
        self.handlers.push((descriptor.id, Box::new(handler)));
        self.declare(descriptor)
    }

    /// Accept positional arguments, passing each one to `handler`. `usage` is
    /// shown in the usage line.
    #[must_use]
    pub fn positional<F>(mut self, usage: &'a str, handler: F) -> Self
    where
        F: FnMut(&mut S, Invocation<'_, '_, 'a, Id>) -> Flow + 'a,
    {
        self.positional = Some((Some(usage), Box::new(handler)));
        self
    }

    /// Like [`positional`][Self::positional], without a usage entry
    #[must_use]
    pub fn catchall<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&mut S, Invocation<'_, '_, 'a, Id>) -> Flow + 'a,
    {
        self.positional = Some((None, Box::new(handler)));
        self
    }

    /// Call `handler` once the input is exhausted. It can still print help.
    #[must_use]
    pub fn end<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&mut S, Invocation<'_, '_, 'a, Id>) -> Flow + 'a,
    {
        self.end = Some(Box::new(handler));
        self
    }

    /// Declare a subcommand handled by a nested dispatch. When the
    /// subcommand is matched, `child` takes over the rest of the command
    /// line and this dispatch stops without running its end handler.
    #[must_use]
    pub fn command<C>(self, descriptor: Descriptor<'a, Id>, mut child: Dispatch<'a, C, S>) -> Self
    where
        Id: Copy + 'a,
        C: Copy + Eq + fmt::Debug + 'a,
        S: 'a,
    {
        self.on(descriptor, move |state, mut invocation| {
            invocation.run(&mut child, state);
            Flow::Break
        })
    }
}

fn invoke<'a, Id, S>(
    handler: &mut Handler<'a, Id, S>,
    state: &mut S,
    context: &mut Context<'_, 'a, Id>,
    value: Value<'a>,
    delegated: &mut Option<Outcome<'a>>,
) -> Flow {
    handler(
        state,
        Invocation {
            context,
            value,
            delegated,
        },
    )
}

impl<'a, Id, S> Dispatch<'a, Id, S>
where
    Id: Copy + Eq + fmt::Debug,
{
    /// Parse `argv` from the beginning, calling handlers on `state`
    ///
    /// Panics if the declared arguments are inconsistent.
    #[track_caller]
    pub fn run(&mut self, argv: &'a [&'a str], state: &mut S) -> Outcome<'a> {
        let cursor = Cursor::new();
        let mut context = Context::new(argv, &cursor, self.config.clone());
        self.drive(&mut context, state)
    }

    /// Register this table's arguments with an unregistered `context`, then
    /// step it to completion.
    #[track_caller]
    pub fn drive(&mut self, context: &mut Context<'_, 'a, Id>, state: &mut S) -> Outcome<'a> {
        let descriptors = &self.descriptors;
        let positional = self.positional.as_ref().map(|&(usage, _)| usage);

        context.register(|args| {
            descriptors.iter().for_each(|&descriptor| {
                args.add(descriptor);
            });

            match positional {
                Some(Some(usage)) => {
                    args.positional(usage);
                }
                Some(None) => {
                    args.catchall();
                }
                None => {}
            }
        });

        let mut outcome = Outcome::Finished;
        let mut delegated = None;

        while let Some(step) = context.step() {
            let flow = match step {
                Step::Matched { id, value } => {
                    self.dispatch(id, value, context, state, &mut delegated)
                }
                Step::Command { id, .. } => {
                    self.dispatch(id, Value::None, context, state, &mut delegated)
                }
                Step::Positional(token) | Step::Unmatched(token) => match self.positional {
                    Some((_, ref mut handler)) => {
                        invoke(handler, state, context, Value::Str(token), &mut delegated)
                    }
                    None => Flow::Continue,
                },
                Step::End => match self.end {
                    Some(ref mut handler) => {
                        invoke(handler, state, context, Value::None, &mut delegated)
                    }
                    None => Flow::Continue,
                },
                Step::Help => {
                    outcome = Outcome::Broke;
                    Flow::Continue
                }
                Step::Error(error) => {
                    outcome = Outcome::Failed(error);
                    Flow::Continue
                }
            };

            match flow {
                Flow::Continue => {}
                Flow::Stop => context.stop(),
                Flow::Break => {
                    outcome = Outcome::Broke;
                    context.halt();
                }
            }
        }

        delegated.unwrap_or(outcome)
    }

    fn dispatch(
        &mut self,
        id: Id,
        value: Value<'a>,
        context: &mut Context<'_, 'a, Id>,
        state: &mut S,
        delegated: &mut Option<Outcome<'a>>,
    ) -> Flow {
        match self
            .handlers
            .iter_mut()
            .find(|(handler_id, _)| *handler_id == id)
        {
            Some((_, handler)) => invoke(handler, state, context, value, delegated),
            None => {
                if context.config().debug {
                    debug!(?id, "no handler for matched argument");
                }
                Flow::Continue
            }
        }
    }
}
