use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use regex_syntax::hir::Hir;
use regex_syntax::ParserBuilder;

use crate::classes::{ByteClassSet, ByteClasses};
use crate::determinize::Determinizer;
use crate::dfa::{Automaton, DenseDfa, LazyDfa, StateID};
use crate::error::{Error, Result};
use crate::nfa::{self, MatchDiscipline, PatternID};

/// A compiled pattern set with a fixed match discipline.
///
/// A matcher accumulates patterns and configuration, then compiles them into
/// one deterministic automaton. Until `compile` (or `compile_set`) succeeds
/// the matcher cannot match; configuration is frozen by compilation.
///
/// Every registered pattern shares the matcher's discipline: a whole-string
/// matcher accepts only when a pattern spans the entire subject, while a
/// substring matcher accepts when a pattern occurs anywhere within it.
pub struct PatternMatcher {
    discipline: MatchDiscipline,
    pattern_text: String,
    defs: HashMap<String, String>,
    case_insensitive: bool,
    single_line: bool,
    pattern_ids: Vec<PatternID>,
    compiled: Option<Compiled>,
}

pub(crate) struct Compiled {
    pub(crate) classes: ByteClasses,
    pub(crate) engine: Engine,
}

pub(crate) enum Engine {
    Dense(DenseDfa),
    Lazy(LazyDfa),
}

impl Automaton for Engine {
    fn start_state(&self) -> StateID {
        match *self {
            Engine::Dense(ref dfa) => dfa.start_state(),
            Engine::Lazy(ref dfa) => dfa.start_state(),
        }
    }

    fn next_state(&self, current: StateID, unit: usize) -> StateID {
        match *self {
            Engine::Dense(ref dfa) => dfa.next_state(current, unit),
            Engine::Lazy(ref dfa) => dfa.next_state(current, unit),
        }
    }

    fn match_ids(&self, id: StateID) -> Arc<[PatternID]> {
        match *self {
            Engine::Dense(ref dfa) => dfa.match_ids(id),
            Engine::Lazy(ref dfa) => dfa.match_ids(id),
        }
    }
}

impl PatternMatcher {
    pub fn new(discipline: MatchDiscipline) -> PatternMatcher {
        PatternMatcher {
            discipline,
            pattern_text: String::new(),
            defs: HashMap::new(),
            case_insensitive: false,
            single_line: false,
            pattern_ids: vec![],
            compiled: None,
        }
    }

    /// Append a pattern as a new top-level alternative of the accumulated
    /// pattern text.
    pub fn add_pattern(&mut self, pattern: &str) {
        assert!(!self.is_compiled(), "matcher is already compiled");
        if self.pattern_text.is_empty() {
            self.pattern_text = format!("({})", pattern);
        } else {
            self.pattern_text = format!("{}|({})", self.pattern_text, pattern);
        }
    }

    /// Replace the accumulated pattern text wholesale.
    pub fn set_pattern(&mut self, pattern: &str) {
        assert!(!self.is_compiled(), "matcher is already compiled");
        self.pattern_text = format!("({})", pattern);
    }

    /// Register a named sub-expression. Occurrences of `{name}` in later
    /// parsed patterns are replaced by the definition's text.
    pub fn define(&mut self, name: &str, definition: &str) {
        assert!(!self.is_compiled(), "matcher is already compiled");
        self.defs.insert(name.to_string(), definition.to_string());
    }

    pub fn lookup_def(&self, name: &str) -> Option<&str> {
        self.defs.get(name).map(|s| s.as_str())
    }

    pub fn make_case_insensitive(&mut self) {
        assert!(!self.is_compiled(), "matcher is already compiled");
        self.case_insensitive = true;
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// In single line mode, `.` also matches the newline byte.
    pub fn make_single_line(&mut self) {
        assert!(!self.is_compiled(), "matcher is already compiled");
        self.single_line = true;
    }

    pub fn is_single_line(&self) -> bool {
        self.single_line
    }

    pub fn discipline(&self) -> MatchDiscipline {
        self.discipline
    }

    /// The accumulated pattern text, as it will be parsed at compile time.
    pub fn pattern_text(&self) -> &str {
        &self.pattern_text
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// The pattern indices registered with the compiled automaton.
    pub fn pattern_ids(&self) -> &[PatternID] {
        &self.pattern_ids
    }

    /// The equivalence-class table of the compiled automaton.
    ///
    /// Panics if the matcher has not been compiled.
    pub fn byte_classes(&self) -> &ByteClasses {
        &self.compiled().classes
    }

    fn expand_defs(&self, pattern: &str) -> String {
        let mut expanded = pattern.to_string();
        for (name, def) in &self.defs {
            expanded = expanded.replace(&format!("{{{}}}", name), def);
        }
        expanded
    }

    fn parse(&self, pattern: &str) -> Result<Hir> {
        let expanded = self.expand_defs(pattern);
        let mut parser = ParserBuilder::new()
            .unicode(false)
            .allow_invalid_utf8(true)
            .case_insensitive(self.case_insensitive)
            .dot_matches_new_line(self.single_line)
            .build();
        parser.parse(&expanded).map_err(Error::syntax)
    }

    /// Compile the accumulated pattern text into one automaton under pattern
    /// index 1. When `lazy` is set, determinization is deferred and runs
    /// incrementally during matching.
    pub fn compile(&mut self, lazy: bool) -> Result<()> {
        let hir = self.parse(&self.pattern_text)?;
        self.compile_with(vec![(hir, 1)], lazy)?;
        self.pattern_ids = vec![1];
        Ok(())
    }

    /// Compile several patterns into one automaton, each tagged with its
    /// caller-chosen index. Matching then reports which of the indices have
    /// an accepted pattern. Index 0 is reserved.
    pub fn compile_set(
        &mut self,
        patterns: &[&str],
        indices: &[PatternID],
        lazy: bool,
    ) -> Result<()> {
        if patterns.is_empty() {
            return Err(Error::set("pattern sets must be non-empty".to_string()));
        }
        if patterns.len() != indices.len() {
            return Err(Error::set(format!(
                "got {} patterns but {} indices",
                patterns.len(),
                indices.len()
            )));
        }
        if let Some(i) = indices.iter().position(|&id| id == 0) {
            return Err(Error::set(format!(
                "pattern {:?} uses the reserved index 0",
                patterns[i]
            )));
        }

        let mut parsed = Vec::with_capacity(patterns.len());
        for (&pattern, &id) in patterns.iter().zip(indices) {
            parsed.push((self.parse(pattern)?, id));
        }
        self.compile_with(parsed, lazy)?;
        self.pattern_text = patterns
            .iter()
            .map(|p| format!("({})", p))
            .collect::<Vec<String>>()
            .join("|");
        self.pattern_ids = indices.to_vec();
        Ok(())
    }

    fn compile_with(&mut self, patterns: Vec<(Hir, PatternID)>, lazy: bool) -> Result<()> {
        let builder = nfa::Builder::new();
        for (hir, id) in &patterns {
            builder.add_pattern(hir, *id, self.discipline)?;
        }
        let nfa = builder.finish();

        let mut set = ByteClassSet::new();
        for class in nfa.classes() {
            set.add_class(class);
        }
        let classes = set.byte_classes();
        trace!(
            "compiling {} pattern(s): {} NFA states, {} input units, lazy={}",
            patterns.len(),
            nfa.len(),
            classes.alphabet_len(),
            lazy
        );

        let det = Determinizer::new(nfa, classes);
        let engine = if lazy {
            Engine::Lazy(LazyDfa::new(det))
        } else {
            Engine::Dense(det.build())
        };
        self.compiled = Some(Compiled { classes, engine });
        Ok(())
    }

    pub(crate) fn compiled(&self) -> &Compiled {
        match self.compiled {
            Some(ref c) => c,
            None => panic!("patterns must be compiled before matching"),
        }
    }

    /// Return true if and only if some registered pattern matches the entire
    /// input.
    pub fn match_all(&self, input: &[u8]) -> bool {
        let c = self.compiled();
        let engine = &c.engine;

        let mut state = engine.start_state();
        state = engine.next_state(state, c.classes.bol());
        for &b in input {
            if engine.is_dead_state(state) {
                return false;
            }
            state = engine.next_state(state, c.classes.get(b));
        }
        state = engine.next_state(state, c.classes.eol());
        engine.is_match_state(state)
    }

    /// Consume the complete input and collect matching pattern indices. The
    /// result is sorted and duplicate free.
    ///
    /// Under the whole-string discipline a pattern only counts when it spans
    /// the entire input, exactly as in `match_all`. Under the substring
    /// discipline every index that accepts at some point of the scan counts.
    pub fn match_set(&self, input: &[u8]) -> Vec<PatternID> {
        let c = self.compiled();
        let engine = &c.engine;
        let mut found = BTreeSet::new();
        let per_step = self.discipline == MatchDiscipline::Substring;

        let mut state = engine.start_state();
        state = engine.next_state(state, c.classes.bol());
        if per_step {
            found.extend(engine.match_ids(state).iter().cloned());
        }
        for &b in input {
            if engine.is_dead_state(state) {
                return found.into_iter().collect();
            }
            state = engine.next_state(state, c.classes.get(b));
            if per_step {
                found.extend(engine.match_ids(state).iter().cloned());
            }
        }
        if !engine.is_dead_state(state) {
            state = engine.next_state(state, c.classes.eol());
            found.extend(engine.match_ids(state).iter().cloned());
        }
        found.into_iter().collect()
    }

    /// Find the end offset of the first completed match, scanning left to
    /// right.
    ///
    /// A match that consumes no input is only reported when no nonempty
    /// match completes anywhere in the input, in which case the offset is 0.
    pub fn find(&self, input: &[u8]) -> Option<usize> {
        let c = self.compiled();
        let engine = &c.engine;

        let mut state = engine.start_state();
        state = engine.next_state(state, c.classes.bol());
        let empty = engine.is_match_state(state);
        for (i, &b) in input.iter().enumerate() {
            if engine.is_dead_state(state) {
                return if empty { Some(0) } else { None };
            }
            state = engine.next_state(state, c.classes.get(b));
            if engine.is_match_state(state) {
                return Some(i + 1);
            }
        }
        if !engine.is_dead_state(state) {
            state = engine.next_state(state, c.classes.eol());
            if engine.is_match_state(state) {
                return Some(input.len());
            }
        }
        if empty {
            Some(0)
        } else {
            None
        }
    }

    /// The length of the longest prefix of the input matched by some
    /// registered pattern, with caller-controlled begin/end anchoring.
    ///
    /// Only nonempty prefixes count; a pattern that accepts the empty string
    /// yields None here when nothing longer matches.
    pub fn longest_match(&self, input: &[u8], bol: bool, eol: bool) -> Option<usize> {
        let c = self.compiled();
        let engine = &c.engine;
        let mut best = None;

        let mut state = engine.start_state();
        if bol {
            state = engine.next_state(state, c.classes.bol());
        }
        for (i, &b) in input.iter().enumerate() {
            if engine.is_dead_state(state) {
                return best;
            }
            state = engine.next_state(state, c.classes.get(b));
            if engine.is_match_state(state) {
                best = Some(i + 1);
            }
        }
        if eol && !engine.is_dead_state(state) {
            state = engine.next_state(state, c.classes.eol());
            if engine.is_match_state(state) && !input.is_empty() {
                best = Some(input.len());
            }
        }
        best
    }
}

impl fmt::Debug for PatternMatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PatternMatcher")
            .field("discipline", &self.discipline)
            .field("pattern_text", &self.pattern_text)
            .field("case_insensitive", &self.case_insensitive)
            .field("single_line", &self.single_line)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}
