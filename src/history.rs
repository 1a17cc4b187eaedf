// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use alloc::collections::VecDeque;

/// An append-only log of step records, indexed by step count.
///
/// Each record holds every quantity computed in one step, so all "columns" of the log always have
/// the same length. An unbounded log keeps everything; a bounded log is a ring buffer that drops
/// its oldest record once full. Records keep their absolute step index after older records are
/// evicted.
///
/// Components never read their own history back to compute a step, so the capacity has no
/// effect on the numbers they produce.
#[derive(Clone, Debug)]
pub struct History<R> {
    records: VecDeque<R>,
    capacity: Option<usize>,
    recorded: usize,
}

impl<R> Default for History<R> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<R> History<R> {
    /// Creates a log that keeps every record.
    pub fn unbounded() -> Self {
        Self {
            records: VecDeque::new(),
            capacity: None,
            recorded: 0,
        }
    }

    /// Creates a ring buffer that keeps the last `capacity` records.
    ///
    /// A capacity of zero disables recording altogether while still counting steps.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
            recorded: 0,
        }
    }

    /// Appends a record, evicting the oldest one if the log is full.
    pub fn push(&mut self, record: R) {
        self.recorded += 1;
        match self.capacity {
            Some(0) => return,
            Some(capacity) if self.records.len() == capacity => {
                self.records.pop_front();
            }
            _ => {}
        }
        self.records.push_back(record);
    }

    /// Number of records currently retained.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no record is retained.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The capacity of the ring buffer, or `None` for an unbounded log.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Total number of records ever pushed, including evicted ones.
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Absolute step index of the oldest retained record.
    pub fn first_index(&self) -> usize {
        self.recorded - self.records.len()
    }

    /// Returns the record of the given absolute step, if it is still retained.
    pub fn get(&self, step: usize) -> Option<&R> {
        step.checked_sub(self.first_index())
            .and_then(|offset| self.records.get(offset))
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&R> {
        self.records.back()
    }

    /// Iterates over the retained records from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &R> + ExactSizeIterator + '_ {
        self.records.iter()
    }

    /// Projects one quantity out of every retained record, e.g. the responses for plotting.
    pub fn column<T, P>(&self, project: P) -> impl Iterator<Item = T> + '_
    where
        P: Fn(&R) -> T + 'static,
    {
        self.records.iter().map(project)
    }
}

impl<'a, R> IntoIterator for &'a History<R> {
    type Item = &'a R;
    type IntoIter = alloc::collections::vec_deque::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
