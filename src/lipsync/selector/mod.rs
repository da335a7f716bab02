use std::collections::VecDeque;

use crate::types::{AlignedPhoneme, Viseme, VisemeEvent};

mod tables;
#[cfg(test)]
mod tests;
mod tie_break;

pub use tables::{base_viseme, VisemeGroup};
pub use tie_break::{RandomTieBreaker, RoundRobinTieBreaker, TieBreakStrategy, TieBreaker};

/// Number of recent emissions remembered for duplicate avoidance.
pub const HISTORY_LEN: usize = 3;

/// Short-term memory of one generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorState {
    last: Option<Viseme>,
    history: VecDeque<Viseme>,
}

impl SelectorState {
    pub fn last(&self) -> Option<Viseme> {
        self.last
    }

    /// Oldest first, at most [`HISTORY_LEN`] entries.
    pub fn history(&self) -> &VecDeque<Viseme> {
        &self.history
    }

    fn record(&mut self, viseme: Viseme) {
        self.history.push_back(viseme);
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
        self.last = Some(viseme);
    }

    /// A long pause ends the phrase: forget the history, but remember the
    /// mouth is closed.
    fn reset_after_pause(&mut self) {
        self.history.clear();
        self.last = Some(Viseme::Neutral);
    }

    fn in_recent(&self, viseme: Viseme, depth: usize) -> bool {
        self.history.iter().rev().take(depth).any(|&v| v == viseme)
    }
}

/// Stateful left-to-right viseme chooser. Build one per request.
pub struct VisemeSelector {
    state: SelectorState,
    tie_breaker: Box<dyn TieBreaker>,
    substitutions: usize,
}

impl VisemeSelector {
    pub fn new(tie_breaker: Box<dyn TieBreaker>) -> Self {
        Self {
            state: SelectorState::default(),
            tie_breaker,
            substitutions: 0,
        }
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    /// Count of emissions that differ from their phoneme's base viseme.
    pub fn substitutions(&self) -> usize {
        self.substitutions
    }

    pub fn step(&mut self, entry: &AlignedPhoneme) -> VisemeEvent {
        if entry.pause {
            self.state.reset_after_pause();
            return VisemeEvent::new(Viseme::Neutral, entry.timestamp);
        }

        let base = base_viseme(entry.phoneme);
        let chosen = self.choose(base, entry.emphasized);
        if chosen != base {
            self.substitutions += 1;
        }
        self.state.record(chosen);
        VisemeEvent::new(chosen, entry.timestamp)
    }

    /// Lazily maps an aligned stream to events, carrying state between items.
    pub fn events<I>(&mut self, stream: I) -> Events<'_, I::IntoIter>
    where
        I: IntoIterator<Item = AlignedPhoneme>,
    {
        Events {
            selector: self,
            stream: stream.into_iter(),
        }
    }

    pub fn select<I>(&mut self, stream: I) -> Vec<VisemeEvent>
    where
        I: IntoIterator<Item = AlignedPhoneme>,
    {
        let events: Vec<VisemeEvent> = self.events(stream).collect();
        tracing::debug!(
            events = events.len(),
            substitutions = self.substitutions,
            "selector: visemes chosen"
        );
        events
    }

    fn choose(&mut self, base: Viseme, emphasized: bool) -> Viseme {
        if self.state.last != Some(base) {
            return base;
        }

        let group = VisemeGroup::of(base);
        let mut candidates: Vec<Viseme> = group
            .members()
            .iter()
            .copied()
            .filter(|&v| v != base && !self.state.in_recent(v, 2))
            .collect();
        if candidates.is_empty() {
            candidates = group
                .widened()
                .iter()
                .copied()
                .filter(|&v| !self.state.in_recent(v, 1))
                .collect();
        }

        match candidates.as_slice() {
            [] => base,
            _ if emphasized && candidates.contains(&Viseme::Aa) => Viseme::Aa,
            [only] => *only,
            _ => {
                let picked = self.tie_breaker.pick(&candidates);
                tracing::trace!(
                    base = base.as_str(),
                    group = group.as_str(),
                    picked = picked.as_str(),
                    candidates = candidates.len(),
                    "selector: tie broken"
                );
                picked
            }
        }
    }
}

pub struct Events<'a, I> {
    selector: &'a mut VisemeSelector,
    stream: I,
}

impl<I> Iterator for Events<'_, I>
where
    I: Iterator<Item = AlignedPhoneme>,
{
    type Item = VisemeEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.stream.next()?;
        Some(self.selector.step(&entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

/// One-shot selection over a complete aligned stream with fresh state.
pub fn select_visemes(stream: &[AlignedPhoneme], strategy: TieBreakStrategy) -> Vec<VisemeEvent> {
    VisemeSelector::new(strategy.build()).select(stream.iter().copied())
}
