use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use argwalk::{
    Config, ConfigError, Context, Cursor, Descriptor, Phase, Registrar, Sink, Step, Value,
};
use tracing::{Event, Metadata, Subscriber, span, subscriber::Interest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Top {
    Verbose,
    Sub,
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inner {
    Flag,
    User,
}

fn silent() -> Config<'static> {
    Config::default().sink(Sink::Silent)
}

fn top(args: &mut Registrar<'_, Top>) {
    args.add(Descriptor::flag(Top::Verbose).short('v').long("verbose"))
        .add(Descriptor::command(Top::Sub, "sub"))
        .add(Descriptor::command(Top::Login, "login"));
}

fn inner(args: &mut Registrar<'_, Inner>) {
    args.add(Descriptor::flag(Inner::Flag).long("flag"))
        .add(Descriptor::string(Inner::User).short('u').long("user"))
        .positional("ARGS...");
}

#[test]
fn subcommand_halts_the_parent() {
    let argv = ["prog", "-v", "sub", "--flag", "x"];
    let cursor = Cursor::new();
    let mut parent = Context::new(&argv, &cursor, silent());
    parent.register(top);

    assert_eq!(
        parent.step(),
        Some(Step::Matched {
            id: Top::Verbose,
            value: Value::None
        })
    );
    assert_eq!(
        parent.step(),
        Some(Step::Command {
            id: Top::Sub,
            name: "sub"
        })
    );

    {
        let mut child = parent.enter(silent());
        child.register(inner);

        assert_eq!(child.name(), "sub");
        assert_eq!(
            child.step(),
            Some(Step::Matched {
                id: Inner::Flag,
                value: Value::None
            })
        );
        assert_eq!(child.step(), Some(Step::Positional("x")));
        assert_eq!(child.step(), Some(Step::End));
        assert_eq!(child.step(), None);
    }

    // The child's progress is visible to the parent
    assert_eq!(cursor.get(), 5);
    assert_eq!(parent.step(), Some(Step::End));
    assert_eq!(parent.step(), None);
    assert_eq!(parent.phase(), Phase::Released);
}

#[test]
fn parent_ends_even_if_the_subcommand_is_ignored() {
    let argv = ["prog", "login", "-v"];
    let cursor = Cursor::new();
    let mut parent = Context::new(&argv, &cursor, silent());
    parent.register(top);

    assert_eq!(
        parent.step(),
        Some(Step::Command {
            id: Top::Login,
            name: "login"
        })
    );
    assert_eq!(parent.step(), Some(Step::End));
    assert_eq!(parent.step(), None);
    assert_eq!(cursor.get(), 2);
}

#[test]
fn subcommand_names_only_match_whole_tokens() {
    let argv = ["prog", "subs"];
    let cursor = Cursor::new();
    let mut parent = Context::new(&argv, &cursor, silent());
    parent.register(top);

    assert!(matches!(parent.step(), Some(Step::Error(_))));
}

#[test]
fn nested_usage_lines() {
    let argv = ["/opt/bin/prog", "login", "-u", "me"];
    let cursor = Cursor::new();
    let mut parent = Context::new(&argv, &cursor, silent());
    parent.register(top);
    parent.step();

    let mut child = parent.enter(silent());
    child.register(inner);

    assert!(
        child
            .help()
            .starts_with("Usage: prog login [-u] [OPTIONS] ARGS...\n")
    );

    assert_eq!(
        child.step(),
        Some(Step::Matched {
            id: Inner::User,
            value: Value::Str("me")
        })
    );
    assert_eq!(child.str_value(), "me");
}

#[test]
fn resume_at_the_cursor() {
    let argv = ["prog", "login", "--user", "me"];
    let cursor = Cursor::at(2);
    let mut context = Context::resume(&argv, &cursor, "login", silent());
    context.register(inner);

    assert!(context.help().starts_with("Usage: login [-u]"));
    assert_eq!(
        context.step(),
        Some(Step::Matched {
            id: Inner::User,
            value: Value::Str("me")
        })
    );
    assert_eq!(context.step(), Some(Step::End));
}

#[test]
fn index_next_token_and_rewind() {
    let argv = ["prog", "--flag", "extra", "--user", "me"];
    let cursor = Cursor::new();
    let mut context = Context::new(&argv, &cursor, silent());
    context.register(inner);

    assert_eq!(
        context.step(),
        Some(Step::Matched {
            id: Inner::Flag,
            value: Value::None
        })
    );
    assert_eq!(context.index(), 1);
    assert_eq!(context.next_token(), Some("extra"));
    assert_eq!(cursor.get(), 3);

    context.rewind(1);
    assert_eq!(context.step(), Some(Step::Positional("extra")));
    assert_eq!(context.index(), 2);

    assert_eq!(
        context.step(),
        Some(Step::Matched {
            id: Inner::User,
            value: Value::Str("me")
        })
    );
    assert_eq!(context.index(), 3);

    // Rewinding never moves onto the program name
    context.rewind(100);
    assert_eq!(cursor.get(), 1);
}

#[test]
fn stop_delivers_the_end_step() {
    let argv = ["prog", "--flag", "--flag"];
    let cursor = Cursor::new();
    let mut context = Context::new(&argv, &cursor, silent());
    context.register(inner);

    context.step();
    context.stop();

    assert_eq!(context.step(), Some(Step::End));
    assert_eq!(context.step(), None);
    assert_eq!(cursor.get(), 2);
}

#[test]
fn halt_skips_the_end_step() {
    let argv = ["prog", "--flag", "--flag"];
    let cursor = Cursor::new();
    let mut context = Context::new(&argv, &cursor, silent());
    context.register(inner);

    context.step();
    assert!(!context.phase().is_terminal());
    context.halt();

    assert_eq!(context.phase(), Phase::Break);
    assert!(context.phase().is_terminal());
    assert_eq!(context.step(), None);
    assert_eq!(context.phase(), Phase::Released);
}

#[test]
fn registration_runs_twice() {
    let argv = ["prog"];
    let cursor = Cursor::new();
    let mut context = Context::new(&argv, &cursor, silent());
    let mut phases = Vec::new();

    context.register(|args| {
        phases.push(args.phase());
        inner(args);
    });

    assert_eq!(phases, [Phase::Counting, Phase::Initializing]);
    assert_eq!(context.phase(), Phase::Parsing);
}

#[test]
fn configuration_errors() {
    let argv = ["prog"];
    let cursor = Cursor::new();

    let mut duplicate = Context::new(&argv, &cursor, silent());
    let result = duplicate.try_register(|args| {
        args.add(Descriptor::flag(Inner::Flag).long("same"))
            .add(Descriptor::flag(Inner::User).long("same"));
    });
    assert_eq!(result, Err(ConfigError::DuplicateLong("same".to_owned())));

    let mut empty = Context::<Inner>::new(&argv, &cursor, silent());
    assert_eq!(empty.try_register(|_| {}), Err(ConfigError::NothingDeclared));

    let mut no_prefix = Context::new(&argv, &cursor, silent().long_prefix(""));
    assert_eq!(no_prefix.try_register(inner), Err(ConfigError::EmptyLongPrefix));

    let mut twice = Context::new(&argv, &cursor, silent());
    assert_eq!(twice.try_register(inner), Ok(()));
    assert_eq!(twice.try_register(inner), Err(ConfigError::AlreadyRegistered));
}

#[test]
#[should_panic(expected = "was declared more than once")]
fn register_panics_on_configuration_errors() {
    let argv = ["prog"];
    let cursor = Cursor::new();
    let mut context = Context::new(&argv, &cursor, silent());

    context.register(|args| {
        args.add(Descriptor::flag(Inner::Flag).short('f'))
            .add(Descriptor::flag(Inner::User).short('f'));
    });
}

#[test]
#[should_panic(expected = "isn't a subcommand")]
fn entering_requires_a_subcommand() {
    let argv = ["prog", "-v"];
    let cursor = Cursor::new();
    let mut context = Context::new(&argv, &cursor, silent());
    context.register(top);
    context.step();

    let _child: Context<'_, '_, Inner> = context.enter(silent());
}

#[test]
#[should_panic(expected = "has no integer value")]
fn wrong_value_accessor() {
    let argv = ["prog", "-u", "me"];
    let cursor = Cursor::new();
    let mut context = Context::new(&argv, &cursor, silent());
    context.register(inner);
    context.step();

    let _ = context.int_value();
}

#[test]
#[should_panic(expected = "before its arguments were registered")]
fn stepping_requires_registration() {
    let argv = ["prog"];
    let cursor = Cursor::new();
    let mut context = Context::<Inner>::new(&argv, &cursor, silent());

    context.step();
}

#[test]
fn empty_argv_has_no_program_name() {
    let argv: [&str; 0] = [];
    let cursor = Cursor::new();
    let mut context = Context::new(&argv, &cursor, silent());
    context.register(inner);

    assert!(context.help().starts_with("Usage: [-u] [OPTIONS] ARGS...\n"));
    assert_eq!(context.step(), Some(Step::End));
}

/// Counts every event it sees
struct EventCounter(Arc<AtomicUsize>);

impl Subscriber for EventCounter {
    fn register_callsite(&self, _: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(1)
    }

    fn record(&self, _: &span::Id, _: &span::Record<'_>) {}

    fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}

    fn event(&self, _: &Event<'_>) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn enter(&self, _: &span::Id) {}

    fn exit(&self, _: &span::Id) {}
}

fn traced_events(config: Config<'static>) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let argv = ["prog", "--flag", "x"];

    tracing::subscriber::with_default(EventCounter(Arc::clone(&count)), || {
        let cursor = Cursor::new();
        let mut context = Context::new(&argv, &cursor, config);
        context.register(inner);
        while context.step().is_some() {}
    });

    count.load(Ordering::Relaxed)
}

#[test]
fn debug_tracing_is_opt_in() {
    assert_eq!(traced_events(silent()), 0);

    // Four phase transitions and three steps
    assert_eq!(traced_events(silent().debug(true)), 7);
}
