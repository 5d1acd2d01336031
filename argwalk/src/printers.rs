use core::fmt::Display;

use lazy_format::lazy_format;

use crate::{Tags, config::Config, descriptor::Kind, store::Entry};

/// The placeholder shown after a valued option: its hint when variable
/// names are enabled and it has one, otherwise its type name
pub fn placeholder<'a, Id>(entry: &Entry<'a, Id>, config: &Config<'a>) -> Option<&'a str> {
    let type_name = entry.kind().type_name()?;

    Some(match entry.hint() {
        Some(hint) if config.variable_names => hint,
        _ => type_name,
    })
}

/// The left column of an option's help line, like `-j, --jobs <N>`. Options
/// without a short name are aligned with the long names of those that have
/// one.
pub fn option_entry<'a, Id>(entry: &Entry<'a, Id>, config: &Config<'a>) -> impl Display {
    let prefix = config.long_prefix;
    let placeholder = placeholder(entry, config);
    let tags = entry.tags();

    let tags = lazy_format!(match (tags) {
        Tags::Short { short } => "-{short}",
        Tags::Long { long } => "    {prefix}{long}",
        Tags::LongShort { short, long } => "-{short}, {prefix}{long}",
    });

    lazy_format!(match (placeholder) {
        None => "{tags}",
        Some(placeholder) => "{tags} <{placeholder}>",
    })
}

/// The `[int]` or `[string]` marker shown before a description when type
/// hints are enabled
pub fn type_marker(kind: Kind) -> impl Display {
    lazy_format!(match (kind.type_name()) {
        None => "",
        Some(name) => "[{name}] ",
    })
}

/// The short option characters for the usage line, sorted without regard to
/// case, with uppercase first when two differ only in case.
pub fn usage_shorts<Id>(entries: &[Entry<'_, Id>]) -> String {
    let mut shorts: Vec<char> = entries
        .iter()
        .filter(|entry| entry.kind() != Kind::Subcommand)
        .filter_map(|entry| entry.tags().short())
        .collect();

    shorts.sort_by_key(|&short| (short.to_ascii_lowercase(), short.is_ascii_lowercase()));
    shorts.into_iter().collect()
}
