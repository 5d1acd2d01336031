use argwalk_parser::{PopulatedStr, Token};

use crate::{
    config::Config,
    context::Cursor,
    errors::{GroupFault, ParseError},
    state::Mode,
    store::Store,
};

/// What a single token (or short group character) turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Classified<'a> {
    /// A declared option or subcommand. `embedded` is the text after `=` in
    /// a long option.
    Entry {
        index: usize,
        embedded: Option<&'a str>,
    },
    Positional(&'a str),
    Unmatched(&'a str),
    Help,
    End,
    Error(ParseError<'a>),
}

/// Classifies tokens for one context. Reads from the shared cursor, and
/// tracks short groups and the dashdash marker through `mode`.
pub(crate) struct Matcher<'m, 'a, Id> {
    pub store: &'m Store<'a, Id>,
    pub config: &'m Config<'a>,
    pub argv: &'a [&'a str],
    pub cursor: &'m Cursor,
    pub mode: &'m mut Mode<'a>,

    /// Set to the argv index of the token being classified
    pub index: &'m mut usize,
}

impl<'a, Id> Matcher<'_, 'a, Id> {
    fn take(&mut self) -> Option<&'a str> {
        let (index, token) = self.cursor.take(self.argv)?;
        *self.index = index;
        Some(token)
    }

    pub fn classify(&mut self) -> Classified<'a> {
        let mode = *self.mode;

        match mode {
            Mode::ShortGroup { rest, .. } => return self.continue_group(rest),
            Mode::Halted => return Classified::End,
            Mode::PositionalOnly => {
                return match self.take() {
                    Some(token) => Classified::Positional(token),
                    None => Classified::End,
                };
            }
            Mode::Ready => {}
        }

        let Some(token) = self.take() else {
            return Classified::End;
        };

        if let Some(index) = self.store.command(token) {
            return Classified::Entry {
                index,
                embedded: None,
            };
        }

        let lexer = self.config.lexer(self.store.has_short('-'));

        match lexer.lex(token) {
            Token::Positional(token) => Classified::Positional(token),
            Token::DashDash => {
                *self.mode = Mode::PositionalOnly;
                match self.take() {
                    Some(token) => Classified::Positional(token),
                    None => Classified::End,
                }
            }
            Token::Long { name, value } => match self.store.long(name) {
                Some(index) => Classified::Entry {
                    index,
                    embedded: value,
                },
                None if self.config.auto_help && name == "help" && value.is_none() => {
                    Classified::Help
                }
                None => Classified::Unmatched(token),
            },
            Token::Short(short) => match self.store.short(short) {
                Some(index) => Classified::Entry {
                    index,
                    embedded: None,
                },
                None => Classified::Unmatched(token),
            },
            Token::ShortGroup(group) => self.start_group(token, group),
        }
    }

    /// Validate a whole short group up front. Every character must be a
    /// declared short option, and only the last may take a value.
    fn start_group(&mut self, token: &'a str, group: PopulatedStr<'a>) -> Classified<'a> {
        if !self.config.short_groups {
            return Classified::Unmatched(token);
        }

        let text = group.get();
        let fault = text.char_indices().find_map(|(position, short)| {
            let last = position + short.len_utf8() == text.len();

            if !self.store.has_short(short) {
                Some(GroupFault::Unsupported(short))
            } else if !last && self.store.short_expects_value(short) {
                Some(GroupFault::ValueNotLast(short))
            } else {
                None
            }
        });

        match fault {
            None => {
                *self.mode = Mode::ShortGroup { token, rest: group };
                self.continue_group(group)
            }
            Some(_) if self.store.catchall() => Classified::Unmatched(token),
            Some(fault) => Classified::Error(ParseError::MalformedShortGroup { token, fault }),
        }
    }

    fn continue_group(&mut self, rest: PopulatedStr<'a>) -> Classified<'a> {
        let (short, rest) = rest.split_first();

        *self.mode = match (*self.mode, PopulatedStr::new(rest)) {
            (Mode::ShortGroup { token, .. }, Some(rest)) => Mode::ShortGroup { token, rest },
            _ => Mode::Ready,
        };

        match self.store.short(short) {
            Some(index) => Classified::Entry {
                index,
                embedded: None,
            },
            // Groups are validated before the first character is reported
            None => unreachable!("short group character -{short} was validated"),
        }
    }
}
