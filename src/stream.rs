use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::dfa::{Automaton, StateID};
use crate::matcher::PatternMatcher;
use crate::nfa::PatternID;

/// An absolute offset into the logical stream fed to a match state.
pub type MatchPos = u64;

/// Incremental match state over a stream delivered in arbitrary chunks.
///
/// The state carries the automaton position and the number of bytes consumed
/// so far, so feeding a subject in several pieces observes exactly the same
/// matches at exactly the same positions as feeding it at once. The matcher
/// it borrows is shared read-only; many streams can run against one compiled
/// matcher concurrently.
pub struct MatchState<'m> {
    matcher: &'m PatternMatcher,
    /// The current automaton state, or None before the first feed (and
    /// after a clear).
    current: Option<StateID>,
    pos: MatchPos,
    /// The position of the first completed match per pattern index.
    matches: BTreeMap<PatternID, MatchPos>,
}

impl<'m> MatchState<'m> {
    pub fn new(matcher: &'m PatternMatcher) -> MatchState<'m> {
        assert!(
            matcher.is_compiled(),
            "patterns must be compiled before streaming"
        );
        MatchState { matcher, current: None, pos: 0, matches: BTreeMap::new() }
    }

    /// Feed the next chunk of the stream.
    ///
    /// `bol` asserts begin-of-input before the chunk and is only meaningful
    /// on the first feed; `eol` asserts end-of-input after it. When `clear`
    /// is set, accumulated state is discarded first and the chunk starts a
    /// new stream. Returns true if this feed completed a match for some
    /// pattern index that had none before.
    pub fn feed(&mut self, bytes: &[u8], bol: bool, eol: bool, clear: bool) -> bool {
        if clear {
            self.clear();
        }
        let c = self.matcher.compiled();
        let engine = &c.engine;
        let before = self.matches.len();

        let mut state = match self.current {
            Some(state) => state,
            None => {
                let mut state = engine.start_state();
                if bol {
                    state = engine.next_state(state, c.classes.bol());
                }
                record(&mut self.matches, engine.match_ids(state), self.pos);
                state
            }
        };
        for (i, &b) in bytes.iter().enumerate() {
            if engine.is_dead_state(state) {
                self.pos += (bytes.len() - i) as u64;
                break;
            }
            state = engine.next_state(state, c.classes.get(b));
            self.pos += 1;
            if engine.is_match_state(state) {
                record(&mut self.matches, engine.match_ids(state), self.pos);
            }
        }
        if eol && !engine.is_dead_state(state) {
            // the end sentinel consumes no byte, so the state is not carried
            // past it
            let end = engine.next_state(state, c.classes.eol());
            record(&mut self.matches, engine.match_ids(end), self.pos);
        }
        self.current = Some(state);

        self.matches.len() > before
    }

    /// The first completed match position per pattern index, so far.
    pub fn matches(&self) -> &BTreeMap<PatternID, MatchPos> {
        &self.matches
    }

    /// The number of stream bytes consumed so far.
    pub fn len(&self) -> u64 {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Reset to the pre-first-feed state so a new stream can begin.
    pub fn clear(&mut self) {
        self.current = None;
        self.pos = 0;
        self.matches.clear();
    }
}

fn record(
    matches: &mut BTreeMap<PatternID, MatchPos>,
    ids: Arc<[PatternID]>,
    pos: MatchPos,
) {
    for &id in ids.iter() {
        matches.entry(id).or_insert(pos);
    }
}

impl<'m> fmt::Debug for MatchState<'m> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MatchState")
            .field("pos", &self.pos)
            .field("matches", &self.matches)
            .finish()
    }
}
