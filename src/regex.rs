use std::fmt;

use crate::error::Result;
use crate::matcher::PatternMatcher;
use crate::nfa::MatchDiscipline;

/// A convenience wrapper pairing a whole-string matcher and a substring
/// matcher over the same pattern text.
///
/// The exact matcher answers "does the pattern span the entire input" and
/// "how long is the longest matching prefix"; the anywhere matcher answers
/// "does the pattern occur somewhere" and "where does the first occurrence
/// end". Both are compiled from the same accumulated text by one `compile`
/// call.
pub struct Regex {
    orig_text: String,
    exact: PatternMatcher,
    anywhere: PatternMatcher,
}

impl Regex {
    /// Create a regex with no pattern text yet.
    pub fn empty() -> Regex {
        Regex {
            orig_text: String::new(),
            exact: PatternMatcher::new(MatchDiscipline::WholeString),
            anywhere: PatternMatcher::new(MatchDiscipline::Substring),
        }
    }

    /// Create a regex for the given pattern. The pattern still needs to be
    /// compiled before matching.
    pub fn new(pattern: &str) -> Regex {
        let mut re = Regex::empty();
        re.add_pattern(pattern);
        re
    }

    /// Create a regex whose exact and anywhere sides use different pattern
    /// text. Combinator results use this to carry both composed texts.
    pub fn from_parts(exact_pattern: &str, anywhere_pattern: &str) -> Regex {
        let mut re = Regex::empty();
        re.orig_text = exact_pattern.to_string();
        re.exact.add_pattern(exact_pattern);
        re.anywhere.add_pattern(anywhere_pattern);
        re
    }

    /// Append a pattern as a new top-level alternative.
    pub fn add_pattern(&mut self, pattern: &str) {
        if self.orig_text.is_empty() {
            self.orig_text = pattern.to_string();
        } else {
            self.orig_text = format!("{}|{}", self.orig_text, pattern);
        }
        self.exact.add_pattern(pattern);
        self.anywhere.add_pattern(pattern);
    }

    pub fn make_case_insensitive(&mut self) {
        self.exact.make_case_insensitive();
        self.anywhere.make_case_insensitive();
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.exact.is_case_insensitive()
    }

    pub fn make_single_line(&mut self) {
        self.exact.make_single_line();
        self.anywhere.make_single_line();
    }

    pub fn is_single_line(&self) -> bool {
        self.exact.is_single_line()
    }

    /// Compile both sides. When `lazy` is set, determinization is deferred
    /// to match time.
    pub fn compile(&mut self, lazy: bool) -> Result<()> {
        self.exact.compile(lazy)?;
        self.anywhere.compile(lazy)
    }

    pub fn is_compiled(&self) -> bool {
        self.exact.is_compiled() && self.anywhere.is_compiled()
    }

    /// Return true if and only if the pattern matches the entire input.
    pub fn match_exactly(&self, input: &[u8]) -> bool {
        self.exact.match_all(input)
    }

    /// Find the end offset of the first completed occurrence of the pattern
    /// anywhere in the input.
    pub fn match_anywhere(&self, input: &[u8]) -> Option<usize> {
        self.anywhere.find(input)
    }

    /// Return true if and only if the pattern occurs somewhere in the input.
    pub fn is_match(&self, input: &[u8]) -> bool {
        self.match_anywhere(input).is_some()
    }

    /// The length of the longest nonempty prefix of the input matched by the
    /// pattern, treating the input as a complete subject.
    pub fn match_prefix(&self, input: &[u8]) -> Option<usize> {
        self.exact.longest_match(input, true, true)
    }

    /// Like `match_prefix`, with caller-controlled begin/end anchoring for
    /// inputs that are a fragment of a larger subject.
    pub fn match_prefix_anchored(
        &self,
        input: &[u8],
        bol: bool,
        eol: bool,
    ) -> Option<usize> {
        self.exact.longest_match(input, bol, eol)
    }

    /// The pattern text as originally registered.
    pub fn orig_text(&self) -> &str {
        &self.orig_text
    }

    /// The accumulated pattern text of the whole-string side.
    pub fn pattern_text(&self) -> &str {
        self.exact.pattern_text()
    }

    /// The accumulated pattern text of the substring side.
    pub fn anywhere_pattern_text(&self) -> &str {
        self.anywhere.pattern_text()
    }

    /// The whole-string matcher, for streaming prefix matches.
    pub fn exact_matcher(&self) -> &PatternMatcher {
        &self.exact
    }

    /// The substring matcher, for streaming occurrence matches.
    pub fn anywhere_matcher(&self) -> &PatternMatcher {
        &self.anywhere
    }

    /// Build the regex matching inputs matched by both operands.
    ///
    /// Composition is purely textual: the result matches one operand
    /// followed by the other, in either order, with anything in between.
    /// Subjects where the two operand matches overlap are not recognized.
    pub fn conjunction(a: &Regex, b: &Regex) -> Regex {
        assert_flags_agree(a, b, "conjunction");
        let ta = a.pattern_text();
        let tb = b.pattern_text();
        let text = format!("({})(?s:.*)({})|({})(?s:.*)({})", ta, tb, tb, ta);
        let mut re = Regex::new(&text);
        inherit_flags(&mut re, a);
        re
    }

    /// Build the regex matching inputs matched by either operand.
    pub fn disjunction(a: &Regex, b: &Regex) -> Regex {
        assert_flags_agree(a, b, "disjunction");
        let text = format!("({})|({})", a.pattern_text(), b.pattern_text());
        let mut re = Regex::new(&text);
        inherit_flags(&mut re, a);
        re
    }
}

fn assert_flags_agree(a: &Regex, b: &Regex, op: &str) {
    assert_eq!(
        a.is_case_insensitive(),
        b.is_case_insensitive(),
        "{} operands disagree on case sensitivity",
        op
    );
    assert_eq!(
        a.is_single_line(),
        b.is_single_line(),
        "{} operands disagree on single line mode",
        op
    );
}

fn inherit_flags(re: &mut Regex, from: &Regex) {
    if from.is_case_insensitive() {
        re.make_case_insensitive();
    }
    if from.is_single_line() {
        re.make_single_line();
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Regex")
            .field("orig_text", &self.orig_text)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Regex;

    #[test]
    fn exact_and_anywhere_sides() {
        let mut re = Regex::new("foo[0-9]+");
        re.compile(false).unwrap();
        assert!(re.match_exactly(b"foo123"));
        assert!(!re.match_exactly(b"xfoo123"));
        assert_eq!(Some(6), re.match_anywhere(b"xxfoo123yy"));
        assert!(re.is_match(b"zfoo7"));
        assert!(!re.is_match(b"foo"));
    }

    #[test]
    fn prefix_matching() {
        let mut re = Regex::new("ab*");
        re.compile(false).unwrap();
        assert_eq!(Some(3), re.match_prefix(b"abbc"));
        assert_eq!(Some(1), re.match_prefix(b"ax"));
        assert_eq!(None, re.match_prefix(b"xa"));
    }

    #[test]
    fn disjunction_matches_either() {
        let mut a = Regex::new("cat");
        let mut b = Regex::new("dog");
        let mut either = Regex::disjunction(&a, &b);
        a.compile(false).unwrap();
        b.compile(false).unwrap();
        either.compile(false).unwrap();
        assert!(either.is_match(b"a cat sat"));
        assert!(either.is_match(b"dogs bark"));
        assert!(!either.is_match(b"a bird"));
    }

    #[test]
    fn conjunction_requires_both() {
        let a = Regex::new("cat");
        let b = Regex::new("dog");
        let mut both = Regex::conjunction(&a, &b);
        both.compile(false).unwrap();
        assert!(both.is_match(b"cat and dog"));
        assert!(both.is_match(b"dog chases cat"));
        assert!(!both.is_match(b"just a cat"));
        assert!(!both.is_match(b"just a dog"));
    }

    #[test]
    fn added_patterns_alternate() {
        let mut re = Regex::empty();
        re.add_pattern("aa");
        re.add_pattern("bb");
        re.compile(false).unwrap();
        assert!(re.match_exactly(b"aa"));
        assert!(re.match_exactly(b"bb"));
        assert_eq!("aa|bb", re.orig_text());
    }
}
