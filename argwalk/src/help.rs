/*!
Help text rendering.

The layout is a usage line, then a `Commands:` block and an `Options:` block
for the described entries, then the configured suffix:

```text
Usage: prog [-hj] [OPTIONS] FILE... COMMAND...

Commands:
  build    Build the project

Options:
  -h, --help      Show this help message
  -j, --jobs <N>  Number of parallel jobs
```

Entries without a description are left out. Descriptions start at a fixed
column per block; an entry too wide for its column pushes its description
onto the next line, and later lines of a multi-line description line up
under the first.
*/

use core::fmt::{self, Display, Write};

use indent_write::fmt::IndentWriter;
use joinery::JoinableIterator;

use crate::{
    config::Config,
    context::{Lineage, chain},
    descriptor::Kind,
    printers,
    store::Store,
};

/// Write `item` at the indent, then `description` starting at `column`
fn describe<W: Write + ?Sized>(
    out: &mut W,
    indent: usize,
    column: usize,
    item: impl Display,
    marker: impl Display,
    description: &str,
) -> fmt::Result {
    let item = item.to_string();
    let width = indent + item.chars().count();

    write!(out, "{:indent$}{item}", "")?;

    match column.checked_sub(width) {
        Some(gap) if gap > 0 => write!(out, "{:gap$}", "")?,
        _ => write!(out, "\n{:column$}", "")?,
    }

    match description.split_once('\n') {
        None => writeln!(out, "{marker}{description}"),
        Some((first, rest)) => {
            writeln!(out, "{marker}{first}")?;

            let padding = " ".repeat(column);
            let mut out = IndentWriter::new(&padding, &mut *out);
            writeln!(out, "{rest}")
        }
    }
}

/// Write an optional block, only if there's at least one item in it
fn maybe_block<W: Write + ?Sized, I: IntoIterator>(
    out: &mut W,
    header: &str,
    items: I,
    mut body: impl FnMut(&mut W, I::Item) -> fmt::Result,
) -> fmt::Result {
    let mut items = items.into_iter();

    match items.next() {
        None => Ok(()),
        Some(first) => {
            writeln!(out, "\n{header}:")?;
            body(out, first)?;
            items.try_for_each(|item| body(out, item))
        }
    }
}

fn usage<W: Write + ?Sized, Id>(
    out: &mut W,
    lineage: &dyn Lineage,
    store: &Store<'_, Id>,
) -> fmt::Result {
    write!(out, "Usage:")?;

    let names = chain(lineage);
    if !names.is_empty() {
        write!(out, " {}", names.iter().join_with(" "))?;
    }

    let shorts = printers::usage_shorts(store.entries());
    if !shorts.is_empty() {
        write!(out, " [-{shorts}]")?;
    }

    if store.has_longs() {
        write!(out, " [OPTIONS]")?;
    }

    if let Some(positional) = store.positional_usage() {
        write!(out, " {positional}")?;
    }

    if store.has_commands() {
        write!(out, " COMMAND...")?;
    }

    writeln!(out)
}

/// Render the full help text for one context
pub(crate) fn render<W: Write + ?Sized, Id>(
    out: &mut W,
    lineage: &dyn Lineage,
    store: &Store<'_, Id>,
    config: &Config<'_>,
) -> fmt::Result {
    match config.usage {
        Some(custom) => writeln!(out, "{custom}")?,
        None => usage(out, lineage, store)?,
    }

    let indent = config.indent;

    let commands = store
        .entries()
        .iter()
        .filter(|entry| entry.kind() == Kind::Subcommand)
        .filter_map(|entry| Some((entry, entry.description()?)));

    let command_column = config
        .command_column
        .unwrap_or(indent + store.command_width() + config.padding);

    maybe_block(out, "Commands", commands, |out, (entry, description)| {
        let name = entry.tags().long().unwrap_or_default();
        describe(out, indent, command_column, name, "", description)
    })?;

    let options = store
        .entries()
        .iter()
        .filter(|entry| entry.kind() != Kind::Subcommand)
        .filter_map(|entry| Some((entry, entry.description()?)));

    let option_column = config
        .option_column
        .unwrap_or(indent + store.option_width() + config.padding);

    maybe_block(out, "Options", options, |out, (entry, description)| {
        let item = printers::option_entry(entry, config);

        match config.type_hints {
            true => {
                let marker = printers::type_marker(entry.kind());
                describe(out, indent, option_column, item, marker, description)
            }
            false => describe(out, indent, option_column, item, "", description),
        }
    })?;

    match config.suffix {
        Some(suffix) => writeln!(out, "\n{suffix}"),
        None => Ok(()),
    }
}
