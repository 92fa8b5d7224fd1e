//! Queue of branches with open sockets
//!
//! The head of the queue is the branch currently being grown from and
//! `cursor` is the next socket index to look at. Once every socket of the
//! head has been looked at, the head moves to the back of the queue.

use std::collections::VecDeque;

use super::branch::BranchId;

#[derive(Clone, Debug, Default)]
pub struct Frontier {
    queue: VecDeque<BranchId>,
    cursor: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn head(&self) -> Option<BranchId> {
        self.queue.front().copied()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, socket: usize) {
        self.cursor = socket;
    }

    pub fn advance_cursor(&mut self) {
        self.cursor += 1;
    }

    pub fn contains(&self, branch: BranchId) -> bool {
        self.queue.contains(&branch)
    }

    pub fn push(&mut self, branch: BranchId) {
        if !self.contains(branch) {
            self.queue.push_back(branch);
        }
    }

    /// Send the head to the back and start over at socket 0.
    pub fn rotate(&mut self) {
        if let Some(head) = self.queue.pop_front() {
            self.queue.push_back(head);
        }
        self.cursor = 0;
    }

    /// Drop `branch`. Removing the head resets the cursor.
    pub fn remove(&mut self, branch: BranchId) {
        if let Some(pos) = self.queue.iter().position(|&b| b == branch) {
            self.queue.remove(pos);
            if pos == 0 {
                self.cursor = 0;
            }
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.cursor = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = BranchId> + '_ {
        self.queue.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_resets_cursor() {
        let mut frontier = Frontier::new();
        frontier.push(BranchId(0));
        frontier.push(BranchId(1));
        frontier.push(BranchId(0));
        assert_eq!(frontier.len(), 2);

        frontier.advance_cursor();
        frontier.advance_cursor();
        assert_eq!(frontier.cursor(), 2);

        frontier.rotate();
        assert_eq!(frontier.head(), Some(BranchId(1)));
        assert_eq!(frontier.cursor(), 0);
        assert_eq!(frontier.iter().collect::<Vec<_>>(), vec![BranchId(1), BranchId(0)]);
    }

    #[test]
    fn test_remove() {
        let mut frontier = Frontier::new();
        for i in 0..3 {
            frontier.push(BranchId(i));
        }
        frontier.advance_cursor();

        frontier.remove(BranchId(2));
        assert_eq!(frontier.cursor(), 1);

        frontier.remove(BranchId(0));
        assert_eq!(frontier.cursor(), 0);
        assert_eq!(frontier.head(), Some(BranchId(1)));

        frontier.clear();
        assert!(frontier.is_empty());
        assert_eq!(frontier.head(), None);
    }
}
