use std::cell::RefCell;
use std::collections::HashMap;
use std::iter;

use regex_syntax::hir::{self, Hir, HirKind};

use crate::charclass::CharClass;
use crate::error::{Error, Result};

pub type StateID = usize;

/// The index identifying which registered pattern an accepting state
/// terminates. Index 0 is reserved as the "no pattern" sentinel and is never
/// assigned to a registered pattern.
pub type PatternID = u32;

/// Whether a pattern must consume its entire input or may match anywhere
/// within it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchDiscipline {
    /// The pattern must consume the entire input; begin/end-of-input anchors
    /// are asserted by the caller at match time.
    WholeString,
    /// An implicit "any number of any bytes" prefix lets a match start at
    /// any offset.
    Substring,
}

/// A state in a nondeterministic automaton fragment.
#[derive(Debug)]
pub enum State {
    /// An epsilon edge.
    Empty { next: StateID },
    /// An epsilon fan-out to several alternates.
    Union { alternates: Vec<StateID> },
    /// Consumes one input byte belonging to the referenced character class.
    Class { class: usize, next: StateID },
    /// Consumes the begin- or end-of-input sentinel unit.
    Boundary { kind: Boundary, next: StateID },
    /// An accepting state carrying its originating pattern index.
    Match { id: PatternID },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Boundary {
    Begin,
    End,
}

impl State {
    pub fn is_epsilon(&self) -> bool {
        match *self {
            State::Empty { .. } | State::Union { .. } => true,
            State::Class { .. } | State::Boundary { .. } | State::Match { .. } => false,
        }
    }
}

/// A frozen nondeterministic automaton: a state arena, the character classes
/// its consuming edges reference, and a start state merging every registered
/// pattern. An NFA only exists as input to subset construction; it is
/// dropped once an eager DFA has been built.
#[derive(Debug)]
pub struct NFA {
    states: Vec<State>,
    classes: Vec<CharClass>,
    start: StateID,
}

impl NFA {
    pub fn start(&self) -> StateID {
        self.start
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id]
    }

    pub fn class(&self, index: usize) -> &CharClass {
        &self.classes[index]
    }

    /// Every distinct character class used by a consuming edge.
    pub fn classes(&self) -> &[CharClass] {
        &self.classes
    }
}

#[derive(Clone, Copy, Debug)]
struct Fragment {
    start: StateID,
    end: StateID,
}

/// An explicit build context for Thompson construction.
///
/// The builder owns the state arena, the character-class registry and an
/// intern map that collapses identical effective classes to one registry
/// index. Several patterns may be added; they are merged through a
/// top-level union, each branch keeping its own accepting index, so one
/// automaton recognizes membership in several pattern languages at once.
pub struct Builder {
    states: RefCell<Vec<State>>,
    classes: RefCell<Vec<CharClass>>,
    intern: RefCell<HashMap<CharClass, usize>>,
}

impl Builder {
    pub fn new() -> Builder {
        let builder = Builder {
            states: RefCell::new(vec![]),
            classes: RefCell::new(vec![]),
            intern: RefCell::new(HashMap::new()),
        };
        // State 0 is the top-level union merging all registered patterns.
        builder.add_union();
        builder
    }

    /// Compile one pattern into the automaton under construction, wrapped
    /// according to its match discipline and tagged with the given accepting
    /// index.
    ///
    /// The whole-string wrapping is `(BOL)? body (EOL)?`: the sentinel
    /// consumptions are optional so that the caller's begin/end flags decide
    /// anchoring at match time. The substring wrapping additionally inserts
    /// an unanchored any-byte prefix loop before the body.
    pub fn add_pattern(
        &self,
        expr: &Hir,
        id: PatternID,
        discipline: MatchDiscipline,
    ) -> Result<()> {
        assert_ne!(id, 0, "pattern index 0 is reserved");

        let body = self.compile(expr)?;

        let entry = self.add_union();
        let bol = self.add_boundary(Boundary::Begin);
        let after_bol = self.add_empty();
        self.patch(entry, bol);
        self.patch(bol, after_bol);
        self.patch(entry, after_bol);

        let before_body = match discipline {
            MatchDiscipline::Substring => {
                let scan = self.add_union();
                let any = self.add_class(CharClass::any(true));
                self.patch(scan, any);
                self.patch(any, scan);
                self.patch(after_bol, scan);
                scan
            }
            MatchDiscipline::WholeString => after_bol,
        };
        self.patch(before_body, body.start);

        let exit = self.add_union();
        let eol = self.add_boundary(Boundary::End);
        let mat = self.add_match(id);
        self.patch(body.end, exit);
        self.patch(exit, eol);
        self.patch(eol, mat);
        self.patch(exit, mat);

        // Merge the wrapped pattern into the shared automaton.
        self.patch(0, entry);
        trace!(
            "compiled pattern {} ({:?}): {} NFA states so far",
            id,
            discipline,
            self.states.borrow().len()
        );
        Ok(())
    }

    /// Freeze the arena into an immutable NFA.
    pub fn finish(self) -> NFA {
        NFA {
            states: self.states.into_inner(),
            classes: self.classes.into_inner(),
            start: 0,
        }
    }

    fn compile(&self, expr: &Hir) -> Result<Fragment> {
        match expr.kind() {
            HirKind::Empty => {
                let id = self.add_empty();
                Ok(Fragment { start: id, end: id })
            }
            HirKind::Literal(hir::Literal::Unicode(ch)) => {
                let mut buf = [0; 4];
                let it = ch
                    .encode_utf8(&mut buf)
                    .as_bytes()
                    .iter()
                    .map(|&b| Ok(self.compile_class(CharClass::byte(b))));
                self.compile_concat(it)
            }
            HirKind::Literal(hir::Literal::Byte(b)) => {
                Ok(self.compile_class(CharClass::byte(*b)))
            }
            HirKind::Class(hir::Class::Bytes(ref cls)) => {
                let mut class = CharClass::empty();
                for rng in cls.iter() {
                    class.add_range(rng.start(), rng.end());
                }
                Ok(self.compile_class(class))
            }
            HirKind::Class(hir::Class::Unicode(ref cls)) => {
                let mut class = CharClass::empty();
                for rng in cls.iter() {
                    if rng.end() as u32 > 0xFF {
                        return Err(Error::unsupported(
                            "character classes beyond raw bytes are not supported",
                        ));
                    }
                    class.add_range(rng.start() as u8, rng.end() as u8);
                }
                Ok(self.compile_class(class))
            }
            HirKind::Repetition(ref rep) => self.compile_repetition(rep),
            HirKind::Group(ref group) => self.compile(&group.hir),
            HirKind::Concat(ref exprs) => {
                self.compile_concat(exprs.iter().map(|e| self.compile(e)))
            }
            HirKind::Alternation(ref exprs) => {
                self.compile_alternation(exprs.iter().map(|e| self.compile(e)))
            }
            HirKind::Anchor(hir::Anchor::StartText) => {
                Ok(self.compile_boundary(Boundary::Begin))
            }
            HirKind::Anchor(hir::Anchor::EndText) => {
                Ok(self.compile_boundary(Boundary::End))
            }
            HirKind::Anchor(_) => {
                Err(Error::unsupported("multi-line anchors are not supported"))
            }
            HirKind::WordBoundary(_) => Err(Error::unsupported(
                r"word boundary assertions (\b and \B) are not supported",
            )),
        }
    }

    fn compile_concat<I>(&self, mut it: I) -> Result<Fragment>
    where
        I: Iterator<Item = Result<Fragment>>,
    {
        let Fragment { start, mut end } = match it.next() {
            Some(result) => result?,
            None => return Ok(self.compile_empty()),
        };
        for result in it {
            let compiled = result?;
            self.patch(end, compiled.start);
            end = compiled.end;
        }
        Ok(Fragment { start, end })
    }

    fn compile_alternation<I>(&self, it: I) -> Result<Fragment>
    where
        I: Iterator<Item = Result<Fragment>>,
    {
        let union = self.add_union();

        let mut alternate_ends = vec![];
        for result in it {
            let compiled = result?;
            self.patch(union, compiled.start);
            alternate_ends.push(compiled.end);
        }
        assert!(!alternate_ends.is_empty(), "alternations must be non-empty");

        let empty = self.add_empty();
        for id in alternate_ends {
            self.patch(id, empty);
        }
        Ok(Fragment { start: union, end: empty })
    }

    fn compile_repetition(&self, rep: &hir::Repetition) -> Result<Fragment> {
        match rep.kind {
            hir::RepetitionKind::ZeroOrOne => self.compile_zero_or_one(&rep.hir),
            hir::RepetitionKind::ZeroOrMore => self.compile_at_least(&rep.hir, 0),
            hir::RepetitionKind::OneOrMore => self.compile_at_least(&rep.hir, 1),
            hir::RepetitionKind::Range(ref rng) => match *rng {
                hir::RepetitionRange::Exactly(count) => {
                    self.compile_exactly(&rep.hir, count)
                }
                hir::RepetitionRange::AtLeast(m) => {
                    self.compile_at_least(&rep.hir, m)
                }
                hir::RepetitionRange::Bounded(min, max) => {
                    self.compile_bounded(&rep.hir, min, max)
                }
            },
        }
    }

    fn compile_bounded(&self, expr: &Hir, min: u32, max: u32) -> Result<Fragment> {
        let prefix = self.compile_exactly(expr, min)?;
        if min == max {
            return Ok(prefix);
        }

        let suffix = self
            .compile_concat((min..max).map(|_| self.compile_zero_or_one(expr)))?;
        self.patch(prefix.end, suffix.start);
        Ok(Fragment { start: prefix.start, end: suffix.end })
    }

    fn compile_at_least(&self, expr: &Hir, n: u32) -> Result<Fragment> {
        if n == 0 {
            // A closure: epsilon from the fragment's end back to its start
            // and an epsilon bypass for the zero-occurrence case.
            let union = self.add_union();
            let compiled = self.compile(expr)?;
            self.patch(union, compiled.start);
            self.patch(compiled.end, union);
            Ok(Fragment { start: union, end: union })
        } else if n == 1 {
            let compiled = self.compile(expr)?;
            let union = self.add_union();
            self.patch(compiled.end, union);
            self.patch(union, compiled.start);
            Ok(Fragment { start: compiled.start, end: union })
        } else {
            let prefix = self.compile_exactly(expr, n - 1)?;
            let last = self.compile(expr)?;
            let union = self.add_union();
            self.patch(prefix.end, last.start);
            self.patch(last.end, union);
            self.patch(union, last.start);
            Ok(Fragment { start: prefix.start, end: union })
        }
    }

    fn compile_zero_or_one(&self, expr: &Hir) -> Result<Fragment> {
        let union = self.add_union();
        let compiled = self.compile(expr)?;
        let empty = self.add_empty();
        self.patch(union, compiled.start);
        self.patch(union, empty);
        self.patch(compiled.end, empty);
        Ok(Fragment { start: union, end: empty })
    }

    fn compile_exactly(&self, expr: &Hir, n: u32) -> Result<Fragment> {
        let it = iter::repeat(()).take(n as usize).map(|_| self.compile(expr));
        self.compile_concat(it)
    }

    fn compile_class(&self, class: CharClass) -> Fragment {
        let id = self.add_class(class);
        Fragment { start: id, end: id }
    }

    fn compile_boundary(&self, kind: Boundary) -> Fragment {
        let id = self.add_boundary(kind);
        Fragment { start: id, end: id }
    }

    fn compile_empty(&self) -> Fragment {
        let id = self.add_empty();
        Fragment { start: id, end: id }
    }

    fn patch(&self, from: StateID, to: StateID) {
        match self.states.borrow_mut()[from] {
            State::Empty { ref mut next } => {
                *next = to;
            }
            State::Class { ref mut next, .. } => {
                *next = to;
            }
            State::Boundary { ref mut next, .. } => {
                *next = to;
            }
            State::Union { ref mut alternates } => {
                alternates.push(to);
            }
            State::Match { .. } => {}
        }
    }

    fn intern_class(&self, class: CharClass) -> usize {
        if let Some(&index) = self.intern.borrow().get(&class) {
            return index;
        }
        let index = self.classes.borrow().len();
        self.classes.borrow_mut().push(class);
        self.intern.borrow_mut().insert(class, index);
        index
    }

    fn add_state(&self, state: State) -> StateID {
        let id = self.states.borrow().len();
        self.states.borrow_mut().push(state);
        id
    }

    fn add_empty(&self) -> StateID {
        self.add_state(State::Empty { next: 0 })
    }

    fn add_union(&self) -> StateID {
        self.add_state(State::Union { alternates: vec![] })
    }

    fn add_class(&self, class: CharClass) -> StateID {
        let index = self.intern_class(class);
        self.add_state(State::Class { class: index, next: 0 })
    }

    fn add_boundary(&self, kind: Boundary) -> StateID {
        self.add_state(State::Boundary { kind, next: 0 })
    }

    fn add_match(&self, id: PatternID) -> StateID {
        self.add_state(State::Match { id })
    }
}

#[cfg(test)]
mod tests {
    use super::{Builder, MatchDiscipline, State};
    use regex_syntax::hir::Hir;
    use regex_syntax::ParserBuilder;

    fn parse(pattern: &str) -> Hir {
        ParserBuilder::new()
            .unicode(false)
            .allow_invalid_utf8(true)
            .build()
            .parse(pattern)
            .unwrap()
    }

    #[test]
    fn identical_classes_are_interned_once() {
        let builder = Builder::new();
        builder
            .add_pattern(&parse("a[0-9]b[0-9]"), 1, MatchDiscipline::WholeString)
            .unwrap();
        let nfa = builder.finish();
        // a, b and [0-9]: three distinct classes
        assert_eq!(3, nfa.classes().len());
    }

    #[test]
    fn substring_wrapping_adds_scan_loop() {
        let builder = Builder::new();
        builder
            .add_pattern(&parse("x"), 1, MatchDiscipline::Substring)
            .unwrap();
        let nfa = builder.finish();
        // x plus the any-byte scan class
        assert_eq!(2, nfa.classes().len());
    }

    #[test]
    fn accepting_states_carry_their_index() {
        let builder = Builder::new();
        builder.add_pattern(&parse("a"), 7, MatchDiscipline::WholeString).unwrap();
        let nfa = builder.finish();
        let ids: Vec<u32> = (0..nfa.len())
            .filter_map(|s| match *nfa.state(s) {
                State::Match { id } => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(vec![7], ids);
    }

    #[test]
    #[should_panic(expected = "pattern index 0 is reserved")]
    fn index_zero_is_rejected() {
        let builder = Builder::new();
        let _ = builder.add_pattern(&parse("a"), 0, MatchDiscipline::WholeString);
    }

    #[test]
    fn word_boundaries_are_unsupported() {
        let builder = Builder::new();
        assert!(builder
            .add_pattern(&parse(r"a\b"), 1, MatchDiscipline::WholeString)
            .is_err());
    }
}
