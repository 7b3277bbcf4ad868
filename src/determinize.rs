use std::collections::{HashMap, HashSet};
use std::iter;
use std::mem;
use std::sync::Arc;

use crate::classes::ByteClasses;
use crate::dfa::{DenseDfa, StateID, DEAD, UNKNOWN};
use crate::nfa::{self, Boundary, PatternID, State, NFA};
use crate::sparse_set::SparseSet;

/// A subset-construction engine.
///
/// A determinizer can run to completion, producing a dense automaton and
/// discarding its NFA, or live on behind a lazy automaton and realize states
/// one transition at a time. Deterministic states are identified by the
/// insertion-ordered set of consuming NFA states reached after taking the
/// epsilon closure, so an equivalent set reached along two different input
/// prefixes maps to one deterministic state.
pub(crate) struct Determinizer {
    /// The NFA being converted. Kept alive for as long as new states may
    /// still need realizing.
    nfa: NFA,
    classes: ByteClasses,
    /// One representative byte per byte symbol, indexed by symbol.
    representatives: Vec<u8>,
    /// The transition table built so far, row-major by state. Unrealized
    /// entries hold UNKNOWN.
    trans: Vec<StateID>,
    /// The accepting pattern indices of each realized state.
    matches: Vec<Arc<[PatternID]>>,
    /// The NFA-state-set key of each realized state, for cache reclaim and
    /// successor computation.
    builder_states: Vec<Arc<DeterminizerState>>,
    /// Maps a state key to its realized identifier.
    cache: HashMap<Arc<DeterminizerState>, StateID>,
    /// Scratch stack for epsilon closure traversal.
    stack: Vec<nfa::StateID>,
    /// Scratch set reused across closure computations.
    scratch: SparseSet,
    /// Scratch key storage reused across state construction.
    scratch_ids: Vec<nfa::StateID>,
    start: StateID,
}

/// The key identifying a deterministic state: the consuming NFA states it
/// contains, in insertion order, plus the sorted pattern indices accepted.
#[derive(Debug, Eq, Hash, PartialEq)]
struct DeterminizerState {
    nfa_states: Vec<nfa::StateID>,
    matches: Vec<PatternID>,
}

impl DeterminizerState {
    fn dead() -> DeterminizerState {
        DeterminizerState { nfa_states: vec![], matches: vec![] }
    }
}

impl Determinizer {
    pub(crate) fn new(nfa: NFA, classes: ByteClasses) -> Determinizer {
        let representatives = classes.representatives();
        let alphabet_len = classes.alphabet_len();
        let dead = Arc::new(DeterminizerState::dead());
        let mut cache = HashMap::new();
        cache.insert(dead.clone(), DEAD);

        let nfa_len = nfa.len();
        let mut det = Determinizer {
            nfa,
            classes,
            representatives,
            // the dead state loops to itself on every unit
            trans: vec![DEAD; alphabet_len],
            matches: vec![Vec::new().into()],
            builder_states: vec![dead],
            cache,
            stack: vec![],
            scratch: SparseSet::new(nfa_len),
            scratch_ids: vec![],
            start: DEAD,
        };
        det.start = det.add_start();
        det
    }

    fn alphabet_len(&self) -> usize {
        self.classes.alphabet_len()
    }

    pub(crate) fn start_id(&self) -> StateID {
        self.start
    }

    pub(crate) fn state_count(&self) -> usize {
        self.builder_states.len()
    }

    pub(crate) fn match_ids(&self, id: StateID) -> Arc<[PatternID]> {
        self.matches[id].clone()
    }

    /// The realized transition out of the given state, or None if it has not
    /// been computed yet.
    pub(crate) fn transition(&self, id: StateID, unit: usize) -> Option<StateID> {
        let next = self.trans[id * self.alphabet_len() + unit];
        if next == UNKNOWN {
            None
        } else {
            Some(next)
        }
    }

    /// Compute, record and return the transition out of the given state on
    /// the given unit.
    pub(crate) fn realize(&mut self, id: StateID, unit: usize) -> StateID {
        // Another thread may have realized this transition between our
        // shared-lock miss and acquiring the exclusive lock.
        if let Some(next) = self.transition(id, unit) {
            return next;
        }

        let mut sparse = mem::replace(&mut self.scratch, SparseSet::new(0));
        sparse.clear();
        self.next(id, unit, &mut sparse);
        let state = self.new_state(&sparse);
        self.scratch = sparse;

        let next = self.cached(state);
        let i = id * self.alphabet_len() + unit;
        self.trans[i] = next;
        next
    }

    /// Run subset construction to completion and produce a dense automaton.
    pub(crate) fn build(mut self) -> DenseDfa {
        let alphabet_len = self.alphabet_len();
        let mut worklist = vec![self.start];
        let mut seen: HashSet<StateID> = worklist.iter().cloned().collect();
        while let Some(id) = worklist.pop() {
            for unit in 0..alphabet_len {
                let next = self.realize(id, unit);
                if seen.insert(next) {
                    worklist.push(next);
                }
            }
        }
        trace!(
            "determinization complete: {} states over {} input units",
            self.state_count(),
            alphabet_len
        );
        DenseDfa::new(self.trans, self.matches, alphabet_len, self.start)
    }

    /// Compute the set of NFA states reached from the given deterministic
    /// state by consuming the given input unit.
    fn next(&mut self, id: StateID, unit: usize, set: &mut SparseSet) {
        let state = self.builder_states[id].clone();
        for &nfa_id in &state.nfa_states {
            let follow = match *self.nfa.state(nfa_id) {
                State::Class { class, next } => {
                    match self.representatives.get(unit) {
                        Some(&rep) if self.nfa.class(class).contains(rep) => {
                            Some(next)
                        }
                        _ => None,
                    }
                }
                State::Boundary { kind, next } => {
                    let wanted = match kind {
                        Boundary::Begin => self.classes.bol(),
                        Boundary::End => self.classes.eol(),
                    };
                    if unit == wanted {
                        Some(next)
                    } else {
                        None
                    }
                }
                State::Empty { .. } | State::Union { .. } | State::Match { .. } => {
                    None
                }
            };
            if let Some(next) = follow {
                self.epsilon_closure(next, set);
            }
        }
    }

    /// Add the epsilon closure of the given NFA state to the set.
    fn epsilon_closure(&mut self, start: nfa::StateID, set: &mut SparseSet) {
        if !self.nfa.state(start).is_epsilon() {
            set.insert(start);
            return;
        }

        self.stack.push(start);
        while let Some(id) = self.stack.pop() {
            if set.contains(id) {
                continue;
            }
            set.insert(id);
            match *self.nfa.state(id) {
                State::Empty { next } => {
                    self.stack.push(next);
                }
                State::Union { ref alternates } => {
                    self.stack.extend(alternates.iter().rev());
                }
                State::Class { .. }
                | State::Boundary { .. }
                | State::Match { .. } => {}
            }
        }
    }

    /// Build a deterministic-state key from a closure set. Only consuming
    /// states go into the key; accepting indices are collected separately.
    fn new_state(&mut self, set: &SparseSet) -> DeterminizerState {
        let mut nfa_states = mem::replace(&mut self.scratch_ids, vec![]);
        nfa_states.clear();
        let mut matches = vec![];
        for id in set.iter() {
            match *self.nfa.state(id) {
                State::Class { .. } | State::Boundary { .. } => {
                    nfa_states.push(id);
                }
                State::Match { id: pattern_id } => {
                    matches.push(pattern_id);
                }
                State::Empty { .. } | State::Union { .. } => {}
            }
        }
        matches.sort_unstable();
        matches.dedup();
        DeterminizerState { nfa_states, matches }
    }

    /// Return the identifier of the given state, realizing it if this is the
    /// first time its key has been seen.
    fn cached(&mut self, state: DeterminizerState) -> StateID {
        if let Some(&id) = self.cache.get(&state) {
            // reclaim the key's allocation for the next new_state call
            self.scratch_ids = state.nfa_states;
            return id;
        }
        self.add_state(state)
    }

    fn add_state(&mut self, state: DeterminizerState) -> StateID {
        let id = self.builder_states.len();
        self.trans
            .extend(iter::repeat(UNKNOWN).take(self.alphabet_len()));
        self.matches.push(state.matches.clone().into());
        let state = Arc::new(state);
        self.builder_states.push(state.clone());
        self.cache.insert(state, id);
        trace!("realized state {} ({} total)", id, self.builder_states.len());
        id
    }

    fn add_start(&mut self) -> StateID {
        let mut sparse = mem::replace(&mut self.scratch, SparseSet::new(0));
        sparse.clear();
        let start = self.nfa.start();
        self.epsilon_closure(start, &mut sparse);
        let state = self.new_state(&sparse);
        self.scratch = sparse;
        self.cached(state)
    }
}
