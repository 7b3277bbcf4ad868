/*!
A byte-oriented regular expression engine built on fully compiled
deterministic finite automata.

Patterns are compiled, eagerly or lazily, into DFAs whose matching loop is a
plain transition-table walk. Begin- and end-of-input anchoring is decided by
the caller at match time, several patterns can be compiled into one automaton
that reports which of them matched, and match state can be carried across
arbitrarily chunked input.

# Example

```
use rematch::Regex;

let mut re = Regex::new("foo[0-9]+");
re.compile(false).unwrap();

assert!(re.match_exactly(b"foo123"));
assert!(!re.match_exactly(b"foo"));
// the first completed occurrence ends after the first digit
assert_eq!(Some(6), re.match_anywhere(b"xxfoo123yy"));
```
*/

#[macro_use]
mod macros;

mod charclass;
mod classes;
mod determinize;
mod dfa;
mod error;
mod matcher;
mod nfa;
mod regex;
mod sparse_set;
mod stream;

pub use crate::charclass::{CharClass, CharClassRanges};
pub use crate::classes::{ByteClassSet, ByteClasses};
pub use crate::dfa::{Automaton, DenseDfa, LazyDfa, StateID, DEAD};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::matcher::PatternMatcher;
pub use crate::nfa::{MatchDiscipline, PatternID};
pub use crate::regex::Regex;
pub use crate::stream::{MatchPos, MatchState};
