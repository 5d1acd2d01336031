/// A string slice that is statically guaranteed to hold at least one
/// character. Used for the unread tail of a short option group like `-xzf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulatedStr<'a>(&'a str);

impl<'a> PopulatedStr<'a> {
    #[inline]
    #[must_use]
    pub fn new(s: &'a str) -> Option<Self> {
        match s.is_empty() {
            true => None,
            false => Some(Self(s)),
        }
    }

    /// The first character and the rest of the string
    #[inline]
    #[must_use]
    pub fn split_first(&self) -> (char, &'a str) {
        let mut chars = self.0.chars();

        match chars.next() {
            Some(first) => (first, chars.as_str()),
            None => unreachable!("PopulatedStr is never empty"),
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self) -> &'a str {
        self.0
    }
}
