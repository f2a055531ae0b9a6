use crate::turn::ChatTurn;

/// The ordered turns of the active conversation.
///
/// Turns are append-only, with one exception: the trailing pending answer
/// may be mutated or removed when its exchange settles. Every reset bumps
/// the generation, which is how late results of a previous conversation
/// are recognized.
#[derive(Clone, Debug, Default)]
pub struct MessageStore {
    turns: Vec<ChatTurn>,
    generation: u64,
}

impl MessageStore {
    /// Appends a turn and returns its index.
    pub fn append(&mut self, turn: ChatTurn) -> usize {
        debug_assert!(
            !turn.is_pending || self.pending_index().is_none(),
            "only one pending turn may exist at a time"
        );
        self.turns.push(turn);
        self.turns.len() - 1
    }

    /// Mutates the last turn in place.
    ///
    /// Returns `None` if the store is empty.
    pub fn replace_last<R>(
        &mut self,
        mutator: impl FnOnce(&mut ChatTurn) -> R,
    ) -> Option<R> {
        self.turns.last_mut().map(mutator)
    }

    /// Removes and returns the last turn.
    #[inline]
    pub fn remove_last(&mut self) -> Option<ChatTurn> {
        self.turns.pop()
    }

    /// Drops every turn, optionally seeds the store with `seed`, and
    /// returns the new generation.
    pub fn reset(&mut self, seed: Option<ChatTurn>) -> u64 {
        self.turns.clear();
        self.turns.extend(seed);
        self.generation += 1;
        trace!("store reset to generation {}", self.generation);
        self.generation
    }

    /// Returns the last `n` turns, oldest first.
    #[inline]
    pub fn window(&self, n: usize) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Returns the current generation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the number of turns.
    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the store has no turns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the turn at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ChatTurn> {
        self.turns.get(index)
    }

    /// Returns every turn, oldest first.
    #[inline]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Returns the index of the pending answer, if any.
    pub fn pending_index(&self) -> Option<usize> {
        self.turns.iter().rposition(|turn| turn.is_pending)
    }

    /// Returns the turn at `index` for an in-place update.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds. Callers hold indices that were
    /// validated against the current generation.
    pub(crate) fn turn_mut(&mut self, index: usize) -> &mut ChatTurn {
        &mut self.turns[index]
    }
}
