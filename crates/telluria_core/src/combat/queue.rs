//! Priority queue of pending combat actions.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{PoisonError, RwLock};

use telluria_data::CombatAction;
use uuid::Uuid;

/// Heap entry; ordered so the earliest `execute_at_ms` pops first and
/// ties break on insertion order.
#[derive(Debug, Clone)]
struct QueuedAction {
    action: CombatAction,
    seq: u64,
}

impl PartialEq for QueuedAction {
    fn eq(&self, other: &Self) -> bool {
        self.action.execute_at_ms == other.action.execute_at_ms && self.seq == other.seq
    }
}

impl Eq for QueuedAction {}

impl Ord for QueuedAction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest first.
        other
            .action
            .execute_at_ms
            .cmp(&self.action.execute_at_ms)
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedAction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    heap: BinaryHeap<QueuedAction>,
    next_seq: u64,
}

/// Min-heap on `(execute_at_ms, insertion order)` behind a
/// reader-writer lock, so the resolver can be inspected concurrently
/// with enqueueing.
#[derive(Debug, Default)]
pub struct ActionQueue {
    inner: RwLock<QueueInner>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, action: CombatAction) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(QueuedAction { action, seq });
    }

    /// A copy of the next action to fire, without removing it.
    pub fn peek(&self) -> Option<CombatAction> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.heap.peek().map(|q| q.action.clone())
    }

    pub fn dequeue(&self) -> Option<CombatAction> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.heap.pop().map(|q| q.action)
    }

    /// Pops the head only if it is due at `now_ms`.
    pub fn dequeue_due(&self, now_ms: u64) -> Option<CombatAction> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let due = inner
            .heap
            .peek()
            .map(|head| head.action.execute_at_ms <= now_ms)
            .unwrap_or(false);
        if due {
            inner.heap.pop().map(|q| q.action)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every queued action for `actor_id` (interruption, death).
    /// Returns how many were removed.
    pub fn remove_actor(&self, actor_id: Uuid) -> usize {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = inner.heap.len();
        let kept: Vec<QueuedAction> = inner
            .heap
            .drain()
            .filter(|q| q.action.actor_id != actor_id)
            .collect();
        inner.heap = kept.into();
        before - inner.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telluria_data::{ActionType, AttackVariant};

    fn action(actor: Uuid, queued_at: u64, reaction: u64) -> CombatAction {
        CombatAction::new(
            actor,
            Uuid::new_v4(),
            ActionType::Attack,
            AttackVariant::Normal,
            queued_at,
            reaction,
        )
    }

    #[test]
    fn pops_in_execute_order() {
        let queue = ActionQueue::new();
        let a = Uuid::new_v4();
        queue.enqueue(action(a, 0, 900));
        queue.enqueue(action(a, 0, 300));
        queue.enqueue(action(a, 0, 600));
        let order: Vec<u64> = std::iter::from_fn(|| queue.dequeue())
            .map(|x| x.execute_at_ms)
            .collect();
        assert_eq!(order, vec![300, 600, 900]);
    }

    #[test]
    fn ties_break_on_insertion_order() {
        let queue = ActionQueue::new();
        let first = action(Uuid::new_v4(), 0, 500);
        let second = action(Uuid::new_v4(), 0, 500);
        queue.enqueue(first.clone());
        queue.enqueue(second.clone());
        assert_eq!(queue.dequeue().unwrap().id, first.id);
        assert_eq!(queue.dequeue().unwrap().id, second.id);
    }

    #[test]
    fn dequeue_due_respects_now() {
        let queue = ActionQueue::new();
        queue.enqueue(action(Uuid::new_v4(), 0, 500));
        assert!(queue.dequeue_due(499).is_none());
        assert!(queue.dequeue_due(500).is_some());
        assert!(queue.dequeue_due(10_000).is_none());
    }

    #[test]
    fn remove_actor_filters_only_that_actor() {
        let queue = ActionQueue::new();
        let victim = Uuid::new_v4();
        let other = Uuid::new_v4();
        queue.enqueue(action(victim, 0, 100));
        queue.enqueue(action(other, 0, 200));
        queue.enqueue(action(victim, 0, 300));
        assert_eq!(queue.remove_actor(victim), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue().unwrap().actor_id, other);
    }
}
