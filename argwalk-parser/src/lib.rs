#![no_std]

/*!
Low-level lexing of single command-line tokens. Takes care of distinctions
between long options, short options, short groups, the `--` marker, and
positionals. No lookup, typing, or cursor handling happens here; usually this
is too low level to use directly, and [`argwalk`](https://docs.rs/argwalk)
drives it instead.
*/

mod populated_slice;

pub use populated_slice::PopulatedStr;

/**
The shape of a single raw token from the command line.

A [`Token`] says nothing about whether an option is actually known; given
`--target=foo -xzf input.txt`, the lexer reports a long option `target` with
the embedded value `foo`, a short group `xzf`, and a positional `input.txt`,
and it's up to the caller to look those names up.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'arg> {
    /// A bare word, the empty string, or a lone `-`
    Positional(&'arg str),

    /// The dashdash marker: the long prefix with nothing after it
    DashDash,

    /// A long option such as `--name`, or `--name=value` if `value` is
    /// present. The name excludes the prefix and may be empty (`--=x`).
    Long {
        name: &'arg str,
        value: Option<&'arg str>,
    },

    /// Exactly one character after a single dash, such as `-x`
    Short(char),

    /// Two or more characters after a single dash, such as `-xzf`. The
    /// group excludes the leading dash.
    ShortGroup(PopulatedStr<'arg>),
}

/**
A [`Lexer`] holds the handful of rules that affect how a token is split:
the long option prefix (`--` by default, `/` for Windows-style tools) and
whether the dashdash marker is recognized at all.
*/
#[derive(Debug, Clone, Copy)]
pub struct Lexer<'p> {
    long_prefix: &'p str,
    dashdash: bool,
}

impl Default for Lexer<'_> {
    fn default() -> Self {
        Self::new("--")
    }
}

impl<'p> Lexer<'p> {
    /// Create a lexer with the given long prefix. The prefix must not be
    /// empty, or every token would lex as a long option.
    #[inline]
    #[must_use]
    pub const fn new(long_prefix: &'p str) -> Self {
        Self {
            long_prefix,
            dashdash: true,
        }
    }

    /// Enable or disable recognition of the dashdash marker. When disabled,
    /// the marker lexes like any other token (so `--` becomes [`Token::Short`]
    /// with the character `-`).
    #[inline]
    #[must_use]
    pub const fn dashdash(self, dashdash: bool) -> Self {
        Self { dashdash, ..self }
    }

    /// Classify a single token.
    #[must_use]
    pub fn lex<'arg>(&self, token: &'arg str) -> Token<'arg> {
        if let Some(option) = token.strip_prefix(self.long_prefix)
            && !option.is_empty()
        {
            return match split_once(option, b'=') {
                Some((name, value)) => Token::Long {
                    name,
                    value: Some(value),
                },
                None => Token::Long {
                    name: option,
                    value: None,
                },
            };
        }

        if self.dashdash && token == self.long_prefix {
            return Token::DashDash;
        }

        let Some(short) = token.strip_prefix('-') else {
            return Token::Positional(token);
        };

        let mut chars = short.chars();

        match (chars.next(), chars.as_str()) {
            (None, _) => Token::Positional(token),
            (Some(option), "") => Token::Short(option),
            (Some(_), _) => match PopulatedStr::new(short) {
                Some(group) => Token::ShortGroup(group),
                None => Token::Positional(token),
            },
        }
    }
}

fn split_once(input: &str, delimiter: u8) -> Option<(&str, &str)> {
    // The delimiter is ASCII, so both halves fall on char boundaries
    memchr::memchr(delimiter, input.as_bytes()).map(|i| (&input[..i], &input[i + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(token: &str) -> Token<'_> {
        Lexer::default().lex(token)
    }

    #[test]
    fn positionals() {
        assert_eq!(lex("file.txt"), Token::Positional("file.txt"));
        assert_eq!(lex(""), Token::Positional(""));
        assert_eq!(lex("-"), Token::Positional("-"));
    }

    #[test]
    fn long_options() {
        assert_eq!(
            lex("--verbose"),
            Token::Long {
                name: "verbose",
                value: None
            }
        );
        assert_eq!(
            lex("--path=a=b"),
            Token::Long {
                name: "path",
                value: Some("a=b")
            }
        );
        assert_eq!(
            lex("--path="),
            Token::Long {
                name: "path",
                value: Some("")
            }
        );
    }

    #[test]
    fn shorts_and_groups() {
        assert_eq!(lex("-x"), Token::Short('x'));

        let Token::ShortGroup(group) = lex("-xzf") else {
            panic!("expected a short group");
        };
        assert_eq!(group.get(), "xzf");
        assert_eq!(group.split_first(), ('x', "zf"));
    }

    #[test]
    fn dashdash() {
        assert_eq!(lex("--"), Token::DashDash);
        assert_eq!(Lexer::default().dashdash(false).lex("--"), Token::Short('-'));
    }

    #[test]
    fn custom_prefix() {
        let lexer = Lexer::new("/").dashdash(false);

        assert_eq!(
            lexer.lex("/release6"),
            Token::Long {
                name: "release6",
                value: None
            }
        );
        assert_eq!(lexer.lex("/"), Token::Positional("/"));
        assert_eq!(lexer.lex("-a"), Token::Short('a'));

        let Token::ShortGroup(group) = lexer.lex("--all") else {
            panic!("expected a short group");
        };
        assert_eq!(group.get(), "-all");
    }
}
