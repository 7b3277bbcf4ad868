use std::fmt;
use std::sync::{Arc, RwLock};

use crate::determinize::Determinizer;
use crate::nfa::PatternID;

pub type StateID = usize;

/// The identifier of the dead state. No outgoing transition ever leaves it,
/// so a match routine that reaches it can stop reading input.
pub const DEAD: StateID = 0;

/// A transition that has not been computed yet. Only lazy automata store
/// this sentinel; an eagerly built table never contains it.
pub(crate) const UNKNOWN: StateID = usize::MAX;

/// A deterministic automaton over equivalence-class input units.
///
/// Implementations share the same observable behavior: a fixed start state,
/// a total transition function over the unit alphabet (byte symbols plus the
/// begin- and end-of-input sentinels) and a possibly empty set of accepting
/// pattern indices per state. Whether the transition table is materialized
/// up front or filled in as inputs demand it is an implementation detail.
pub trait Automaton {
    /// The state to begin a search in.
    fn start_state(&self) -> StateID;

    /// Step from the given state on the given input unit.
    fn next_state(&self, current: StateID, unit: usize) -> StateID;

    /// The sorted pattern indices accepted in the given state. Empty when
    /// the state is not accepting.
    fn match_ids(&self, id: StateID) -> Arc<[PatternID]>;

    fn is_dead_state(&self, id: StateID) -> bool {
        id == DEAD
    }

    fn is_match_state(&self, id: StateID) -> bool {
        !self.match_ids(id).is_empty()
    }
}

/// An eagerly built dense automaton.
///
/// The transition table is one row per state with one column per input unit.
/// Construction fully explores the subset space, after which the source NFA
/// is discarded; matching is a pure table walk with no interior mutability
/// and no synchronization.
#[derive(Clone)]
pub struct DenseDfa {
    trans: Vec<StateID>,
    matches: Vec<Arc<[PatternID]>>,
    alphabet_len: usize,
    start: StateID,
}

impl DenseDfa {
    pub(crate) fn new(
        trans: Vec<StateID>,
        matches: Vec<Arc<[PatternID]>>,
        alphabet_len: usize,
        start: StateID,
    ) -> DenseDfa {
        DenseDfa { trans, matches, alphabet_len, start }
    }

    /// The number of states in this automaton.
    pub fn state_count(&self) -> usize {
        self.matches.len()
    }
}

impl Automaton for DenseDfa {
    fn start_state(&self) -> StateID {
        self.start
    }

    #[inline]
    fn next_state(&self, current: StateID, unit: usize) -> StateID {
        self.trans[current * self.alphabet_len + unit]
    }

    fn match_ids(&self, id: StateID) -> Arc<[PatternID]> {
        self.matches[id].clone()
    }
}

impl fmt::Debug for DenseDfa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for id in 0..self.state_count() {
            let ids = &self.matches[id];
            if id == self.start {
                write!(f, ">{:06}", id)?;
            } else {
                write!(f, " {:06}", id)?;
            }
            if !ids.is_empty() {
                write!(f, " (accepts {:?})", ids)?;
            }
            write!(f, ":")?;
            for unit in 0..self.alphabet_len {
                let next = self.trans[id * self.alphabet_len + unit];
                if next != DEAD {
                    write!(f, " {}=>{}", unit, next)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A lazily built automaton.
///
/// States and transitions are realized on demand while matching, so inputs
/// only pay for the part of the subset space they actually visit. The
/// realized portion is a shared memo: concurrent matches read it under a
/// shared lock and only take the exclusive lock when they hit a transition
/// nobody has computed yet.
pub struct LazyDfa {
    inner: RwLock<Determinizer>,
    start: StateID,
}

impl LazyDfa {
    pub(crate) fn new(det: Determinizer) -> LazyDfa {
        let start = det.start_id();
        LazyDfa { inner: RwLock::new(det), start }
    }

    /// The number of states realized so far.
    pub fn state_count(&self) -> usize {
        self.inner.read().unwrap().state_count()
    }
}

impl Automaton for LazyDfa {
    fn start_state(&self) -> StateID {
        self.start
    }

    fn next_state(&self, current: StateID, unit: usize) -> StateID {
        if let Some(next) = self.inner.read().unwrap().transition(current, unit) {
            return next;
        }
        // realize re-checks under the exclusive lock, so two threads racing
        // here agree on the resulting state identifier
        self.inner.write().unwrap().realize(current, unit)
    }

    fn match_ids(&self, id: StateID) -> Arc<[PatternID]> {
        self.inner.read().unwrap().match_ids(id)
    }
}

impl fmt::Debug for LazyDfa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LazyDfa")
            .field("start", &self.start)
            .field("realized_states", &self.state_count())
            .finish()
    }
}
