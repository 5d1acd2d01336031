/*!
The descriptor store and its lookup indexes.

Registration runs the caller's declaration function twice against a
[`Registrar`]. The first pass only counts; the second pass fills tables
allocated with exactly the counted capacities. The finished store is then
sorted and checked for duplicates, and never changes again.
*/

use crate::{
    Tags,
    config::Config,
    descriptor::{Descriptor, Kind},
    errors::ConfigError,
    printers,
    state::Phase,
};

/// Help entries wider than this don't push the description column further.
const MAX_ENTRY_WIDTH: usize = 30;

/// A registered argument, as stored in a context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a, Id> {
    id: Id,
    tags: Tags<'a>,
    kind: Kind,
    description: Option<&'a str>,
    hint: Option<&'a str>,
}

impl<'a, Id> Entry<'a, Id> {
    #[inline]
    pub fn id(&self) -> &Id {
        &self.id
    }

    #[inline]
    pub fn tags(&self) -> Tags<'a> {
        self.tags
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[inline]
    pub fn description(&self) -> Option<&'a str> {
        self.description
    }

    #[inline]
    pub fn hint(&self) -> Option<&'a str> {
        self.hint
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    arguments: usize,
    commands: usize,
    longs: usize,
    shorts: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Counting,
    Initializing,
}

/**
The handle passed to a declaration function. The function must make the
same calls, in the same order, every time it runs.

```
use argwalk::{Descriptor, Registrar};

fn declare(args: &mut Registrar<'_, &'static str>) {
    args.add(Descriptor::flag("verbose").short('v').long("verbose"))
        .add(Descriptor::string("output").short('o').hint("FILE"))
        .positional("FILE...");
}
# let _ = declare;
```
*/
#[derive(Debug)]
pub struct Registrar<'a, Id> {
    pass: Pass,
    tally: Tally,
    entries: Vec<Entry<'a, Id>>,
    commands: Vec<usize>,
    longs: Vec<usize>,
    shorts: Vec<usize>,
    catchall: bool,
    positional_usage: Option<&'a str>,
    error: Option<ConfigError>,
}

impl<'a, Id> Registrar<'a, Id> {
    pub(crate) fn counting() -> Self {
        Self {
            pass: Pass::Counting,
            tally: Tally::default(),
            entries: Vec::new(),
            commands: Vec::new(),
            longs: Vec::new(),
            shorts: Vec::new(),
            catchall: false,
            positional_usage: None,
            error: None,
        }
    }

    pub(crate) fn initializing(tally: Tally) -> Self {
        Self {
            pass: Pass::Initializing,
            tally,
            entries: Vec::with_capacity(tally.arguments),
            commands: Vec::with_capacity(tally.commands),
            longs: Vec::with_capacity(tally.longs),
            shorts: Vec::with_capacity(tally.shorts),
            catchall: false,
            positional_usage: None,
            error: None,
        }
    }

    /// Which registration pass is running
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.pass {
            Pass::Counting => Phase::Counting,
            Pass::Initializing => Phase::Initializing,
        }
    }

    /// Declare an option or subcommand. Invalid descriptors are reported when
    /// registration finishes; only the first problem is kept.
    pub fn add(&mut self, descriptor: Descriptor<'a, Id>) -> &mut Self {
        if self.error.is_none()
            && let Err(error) = self.try_add(descriptor)
        {
            self.error = Some(error);
        }

        self
    }

    /// Accept positional arguments (and unmatched tokens) instead of
    /// treating them as errors. `usage` is shown in the usage line.
    pub fn positional(&mut self, usage: &'a str) -> &mut Self {
        self.positional_usage = Some(usage);
        self.catchall()
    }

    /// Accept positional arguments without mentioning them in the usage line
    pub fn catchall(&mut self) -> &mut Self {
        self.catchall = true;
        self
    }

    fn try_add(&mut self, descriptor: Descriptor<'a, Id>) -> Result<(), ConfigError> {
        let tags = Tags::new(descriptor.short, descriptor.long).ok_or(ConfigError::Nameless)?;
        let command = descriptor.kind == Kind::Subcommand;

        if command && !matches!(tags, Tags::Long { .. }) {
            return Err(ConfigError::InvalidSubcommand {
                short: tags.short(),
            });
        }

        if let Some(short) = tags.short()
            && !short.is_ascii()
        {
            return Err(ConfigError::NonAsciiShort(short));
        }

        let has_long = tags.long().is_some();
        let has_short = tags.short().is_some();

        match self.pass {
            Pass::Counting => {
                self.tally.arguments += 1;
                match command {
                    true => self.tally.commands += 1,
                    false => {
                        self.tally.longs += usize::from(has_long);
                        self.tally.shorts += usize::from(has_short);
                    }
                }
            }
            Pass::Initializing => {
                let index = self.entries.len();

                self.entries.push(Entry {
                    id: descriptor.id,
                    tags,
                    kind: descriptor.kind,
                    description: descriptor.description,
                    hint: descriptor.hint,
                });

                if command {
                    self.commands.push(index);
                } else {
                    if has_long {
                        self.longs.push(index);
                    }
                    if has_short {
                        self.shorts.push(index);
                    }
                }
            }
        }

        Ok(())
    }

    /// End the counting pass, producing the capacities for the second pass.
    pub(crate) fn into_tally(self) -> Result<Tally, ConfigError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.tally),
        }
    }
}

/// A set of bytes, for constant time short option tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Bitmap([u64; 4]);

impl Bitmap {
    fn insert(&mut self, c: char) {
        if let Ok(byte) = u8::try_from(c) {
            self.0[usize::from(byte >> 6)] |= 1 << (byte & 63);
        }
    }

    pub fn contains(&self, c: char) -> bool {
        match u8::try_from(c) {
            Ok(byte) => self.0[usize::from(byte >> 6)] & (1 << (byte & 63)) != 0,
            Err(_) => false,
        }
    }
}

/// A finished, immutable descriptor table with its sorted indexes
#[derive(Debug)]
pub(crate) struct Store<'a, Id> {
    entries: Vec<Entry<'a, Id>>,
    commands: Vec<usize>,
    longs: Vec<usize>,
    shorts: Vec<usize>,
    short_set: Bitmap,
    valued_shorts: Bitmap,
    catchall: bool,
    positional_usage: Option<&'a str>,
    option_width: usize,
    command_width: usize,
}

fn long_name<'a, Id>(entries: &[Entry<'a, Id>], index: usize) -> &'a str {
    entries[index].tags.long().unwrap_or_default()
}

fn short_name<Id>(entries: &[Entry<'_, Id>], index: usize) -> char {
    entries[index].tags.short().unwrap_or_default()
}

fn check_count(bucket: &'static str, counted: usize, registered: usize) -> Result<(), ConfigError> {
    match counted == registered {
        true => Ok(()),
        false => Err(ConfigError::CountMismatch {
            bucket,
            counted,
            registered,
        }),
    }
}

impl<'a, Id> Store<'a, Id> {
    /// Finish the initializing pass: check it against the counted tally,
    /// sort the buckets, reject duplicates, and measure the help columns.
    pub fn build(registrar: Registrar<'a, Id>, config: &Config<'a>) -> Result<Self, ConfigError> {
        let Registrar {
            pass: _,
            tally,
            entries,
            mut commands,
            mut longs,
            mut shorts,
            catchall,
            positional_usage,
            error,
        } = registrar;

        if let Some(error) = error {
            return Err(error);
        }

        if entries.is_empty() && !catchall {
            return Err(ConfigError::NothingDeclared);
        }

        check_count("arguments", tally.arguments, entries.len())?;
        check_count("subcommand names", tally.commands, commands.len())?;
        check_count("long names", tally.longs, longs.len())?;
        check_count("short names", tally.shorts, shorts.len())?;

        commands.sort_unstable_by_key(|&i| long_name(&entries, i));
        longs.sort_unstable_by_key(|&i| long_name(&entries, i));
        shorts.sort_unstable_by_key(|&i| short_name(&entries, i));

        if let Some(pair) = commands
            .windows(2)
            .find(|pair| long_name(&entries, pair[0]) == long_name(&entries, pair[1]))
        {
            return Err(ConfigError::DuplicateCommand(
                long_name(&entries, pair[0]).to_owned(),
            ));
        }

        if let Some(pair) = longs
            .windows(2)
            .find(|pair| long_name(&entries, pair[0]) == long_name(&entries, pair[1]))
        {
            return Err(ConfigError::DuplicateLong(
                long_name(&entries, pair[0]).to_owned(),
            ));
        }

        if let Some(pair) = shorts
            .windows(2)
            .find(|pair| short_name(&entries, pair[0]) == short_name(&entries, pair[1]))
        {
            return Err(ConfigError::DuplicateShort(short_name(&entries, pair[0])));
        }

        let mut short_set = Bitmap::default();
        let mut valued_shorts = Bitmap::default();

        for &index in &shorts {
            let short = short_name(&entries, index);
            short_set.insert(short);
            if entries[index].kind.expects_value() {
                valued_shorts.insert(short);
            }
        }

        let described = || entries.iter().filter(|entry| entry.description.is_some());

        let option_width = described()
            .filter(|entry| entry.kind != Kind::Subcommand)
            .map(|entry| printers::option_entry(entry, config).to_string().chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_ENTRY_WIDTH);

        let command_width = described()
            .filter(|entry| entry.kind == Kind::Subcommand)
            .map(|entry| entry.tags.long().unwrap_or_default().chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_ENTRY_WIDTH);

        Ok(Self {
            entries,
            commands,
            longs,
            shorts,
            short_set,
            valued_shorts,
            catchall,
            positional_usage,
            option_width,
            command_width,
        })
    }

    #[inline]
    pub fn entry(&self, index: usize) -> &Entry<'a, Id> {
        &self.entries[index]
    }

    /// All entries, in declaration order
    #[inline]
    pub fn entries(&self) -> &[Entry<'a, Id>] {
        &self.entries
    }

    pub fn command(&self, name: &str) -> Option<usize> {
        find_by_name(&self.entries, &self.commands, name)
    }

    pub fn long(&self, name: &str) -> Option<usize> {
        find_by_name(&self.entries, &self.longs, name)
    }

    pub fn short(&self, short: char) -> Option<usize> {
        if !self.short_set.contains(short) {
            return None;
        }

        self.shorts
            .binary_search_by_key(&short, |&i| short_name(&self.entries, i))
            .ok()
            .map(|position| self.shorts[position])
    }

    #[inline]
    pub fn has_short(&self, short: char) -> bool {
        self.short_set.contains(short)
    }

    #[inline]
    pub fn short_expects_value(&self, short: char) -> bool {
        self.valued_shorts.contains(short)
    }

    #[inline]
    pub fn catchall(&self) -> bool {
        self.catchall
    }

    #[inline]
    pub fn positional_usage(&self) -> Option<&'a str> {
        self.positional_usage
    }

    #[inline]
    pub fn option_width(&self) -> usize {
        self.option_width
    }

    #[inline]
    pub fn command_width(&self) -> usize {
        self.command_width
    }

    #[inline]
    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    #[inline]
    pub fn has_longs(&self) -> bool {
        !self.longs.is_empty()
    }
}

fn find_by_name<Id>(entries: &[Entry<'_, Id>], bucket: &[usize], name: &str) -> Option<usize> {
    bucket
        .binary_search_by(|&i| long_name(entries, i).cmp(name))
        .ok()
        .map(|position| bucket[position])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build<'a>(
        mut declare: impl FnMut(&mut Registrar<'a, u32>),
    ) -> Result<Store<'a, u32>, ConfigError> {
        let mut counting = Registrar::counting();
        declare(&mut counting);
        let tally = counting.into_tally()?;

        let mut initializing = Registrar::initializing(tally);
        declare(&mut initializing);
        Store::build(initializing, &Config::default())
    }

    fn sample(args: &mut Registrar<'_, u32>) {
        args.add(Descriptor::flag(1).short('v').long("verbose"))
            .add(Descriptor::integer(2).short('j').long("jobs"))
            .add(Descriptor::string(3).long("base-url"))
            .add(Descriptor::flag(4).short('A'))
            .add(Descriptor::command(5, "build"))
            .add(Descriptor::command(6, "add"));
    }

    #[test]
    fn lookups() {
        let store = build(sample).expect("valid declarations");

        assert_eq!(store.long("jobs"), Some(1));
        assert_eq!(store.long("base-url"), Some(2));
        assert_eq!(store.long("job"), None);
        assert_eq!(store.long("jobsx"), None);
        assert_eq!(store.short('v'), Some(0));
        assert_eq!(store.short('A'), Some(3));
        assert_eq!(store.short('a'), None);
        assert_eq!(store.command("add"), Some(5));
        assert_eq!(store.command("build"), Some(4));

        // subcommand and option names are separate namespaces
        assert_eq!(store.long("build"), None);
        assert_eq!(store.command("verbose"), None);
    }

    #[test]
    fn short_bitmaps() {
        let store = build(sample).expect("valid declarations");

        assert!(store.has_short('v'));
        assert!(store.has_short('j'));
        assert!(!store.has_short('x'));
        assert!(!store.has_short('é'));
        assert!(store.short_expects_value('j'));
        assert!(!store.short_expects_value('v'));
    }

    #[test]
    fn duplicate_long_is_rejected() {
        let error = build(|args| {
            args.add(Descriptor::flag(1).long("same"))
                .add(Descriptor::flag(2).short('s').long("same"));
        })
        .unwrap_err();

        assert_eq!(error, ConfigError::DuplicateLong("same".to_owned()));
    }

    #[test]
    fn duplicate_short_is_rejected() {
        let error = build(|args| {
            args.add(Descriptor::flag(1).short('x'))
                .add(Descriptor::string(2).short('x').long("other"));
        })
        .unwrap_err();

        assert_eq!(error, ConfigError::DuplicateShort('x'));
    }

    #[test]
    fn duplicate_command_is_rejected() {
        let error = build(|args| {
            args.add(Descriptor::command(1, "run"))
                .add(Descriptor::flag(2).short('v'))
                .add(Descriptor::command(3, "run"));
        })
        .unwrap_err();

        assert_eq!(error, ConfigError::DuplicateCommand("run".to_owned()));
    }

    #[test]
    fn subcommand_and_option_may_share_a_name() {
        let store = build(|args| {
            args.add(Descriptor::flag(1).long("run"))
                .add(Descriptor::command(2, "run"));
        })
        .expect("separate namespaces");

        assert_eq!(store.long("run"), Some(0));
        assert_eq!(store.command("run"), Some(1));
    }

    #[test]
    fn invalid_descriptors() {
        let nameless = build(|args| {
            args.add(Descriptor::flag(1));
        });
        assert_eq!(nameless.unwrap_err(), ConfigError::Nameless);

        let short_command = build(|args| {
            args.add(Descriptor::command(1, "run").short('r'));
        });
        assert_eq!(
            short_command.unwrap_err(),
            ConfigError::InvalidSubcommand { short: Some('r') }
        );

        let unicode = build(|args| {
            args.add(Descriptor::flag(1).short('é'));
        });
        assert_eq!(unicode.unwrap_err(), ConfigError::NonAsciiShort('é'));
    }

    #[test]
    fn empty_declarations() {
        assert_eq!(build(|_| {}).unwrap_err(), ConfigError::NothingDeclared);

        let store = build(|args| {
            args.catchall();
        })
        .expect("a catchall alone is enough");
        assert!(store.catchall());
    }

    #[test]
    fn unrepeatable_declarations() {
        let mut calls = 0;

        let error = build(|args| {
            calls += 1;
            args.add(Descriptor::flag(1).long("always"));
            if calls == 1 {
                args.add(Descriptor::flag(2).short('o'));
            }
        })
        .unwrap_err();

        assert_eq!(
            error,
            ConfigError::CountMismatch {
                bucket: "arguments",
                counted: 2,
                registered: 1,
            }
        );
    }

    #[test]
    fn widths() {
        let store = build(|args| {
            args.add(Descriptor::flag(1).short('v').long("verbose").describe("Talk more"))
                .add(Descriptor::string(2).short('u').long("base-url").describe("Where"))
                .add(Descriptor::flag(3).long("undocumented-and-very-long-indeed"))
                .add(Descriptor::command(4, "install").describe("Install things"));
        })
        .expect("valid declarations");

        // "-u, --base-url <string>"
        assert_eq!(store.option_width(), 23);
        assert_eq!(store.command_width(), 7);
    }

    #[test]
    fn widths_are_capped() {
        let store = build(|args| {
            args.add(
                Descriptor::string(1)
                    .long("an-extremely-long-option-name")
                    .describe("Long"),
            );
        })
        .expect("valid declarations");

        assert_eq!(store.option_width(), MAX_ENTRY_WIDTH);
    }
}
