//! Cursor-indexed navigation history

use std::fmt;

/// Direction of a navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

impl Direction {
    /// Signed step, `-1` for back and `+1` for forward
    pub fn delta(self) -> isize {
        match self {
            Direction::Back => -1,
            Direction::Forward => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Back => "back",
            Direction::Forward => "forward",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered visit log with a cursor.
///
/// The cursor is `None` when the history is empty or has been walked past its
/// start; otherwise it always indexes a live element.
#[derive(Debug, Clone)]
pub struct NavigationHistory<T> {
    elements: Vec<T>,
    cursor: Option<usize>,
}

impl<T> Default for NavigationHistory<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            cursor: None,
        }
    }
}

impl<T: Clone + PartialEq> NavigationHistory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append after the cursor, dropping every entry beyond it
    pub fn push(&mut self, element: T) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.elements.truncate(keep);
        self.elements.push(element);
        self.cursor = Some(self.elements.len() - 1);
    }

    /// Remove the last element of the whole log, regardless of the cursor
    pub fn pop(&mut self) -> Option<T> {
        let element = self.elements.pop()?;

        self.cursor = match (self.cursor, self.elements.len()) {
            (_, 0) => None,
            (Some(cursor), len) => Some(cursor.min(len - 1)),
            (None, _) => None,
        };

        Some(element)
    }

    /// Element under the cursor
    pub fn get(&self) -> Option<&T> {
        self.cursor.and_then(|cursor| self.elements.get(cursor))
    }

    /// Substitute every occurrence of `old` with `new`
    pub fn replace(&mut self, old: &T, new: T) {
        for element in self.elements.iter_mut().filter(|e| *e == old) {
            *element = new.clone();
        }
    }

    /// Remove every occurrence of `element`.
    ///
    /// Each removed occurrence at or before the cursor shifts the cursor one step
    /// back, so it keeps pointing at the same remaining entry (or at the entry
    /// before a removed current one).
    pub fn purge(&mut self, element: &T) {
        let mut shift = 0usize;
        let cursor = self.cursor;

        let mut index = 0usize;
        self.elements.retain(|e| {
            let remove = e == element;
            if remove && cursor.is_some_and(|c| index <= c) {
                shift += 1;
            }
            index += 1;
            !remove
        });

        self.cursor = cursor.and_then(|c| c.checked_sub(shift));
    }

    /// Step the cursor, asking `fallback` for an element when walking off either end.
    ///
    /// Walking back past the start prepends the fallback's element, or leaves the
    /// cursor before the start when there is none. Walking back from before the
    /// start does nothing. Walking forward past the end
    /// appends the fallback's element; without one the history is left untouched
    /// and `None` is returned.
    pub fn navigate<F>(&mut self, direction: Direction, fallback: F) -> Option<&T>
    where
        F: FnOnce(Direction) -> Option<T>,
    {
        match (direction, self.cursor) {
            // already before the start
            (Direction::Back, None) => {}
            (Direction::Back, Some(0)) => match fallback(direction) {
                Some(element) => {
                    self.elements.insert(0, element);
                    self.cursor = Some(0);
                }
                None => self.cursor = None,
            },
            (Direction::Back, Some(cursor)) => self.cursor = Some(cursor - 1),
            (Direction::Forward, cursor) => {
                let next = cursor.map_or(0, |c| c + 1);

                if next < self.elements.len() {
                    self.cursor = Some(next);
                } else {
                    let element = fallback(direction)?;
                    self.elements.push(element);
                    self.cursor = Some(self.elements.len() - 1);
                }
            }
        }

        tracing::trace!(direction = %direction, cursor = ?self.cursor, "Navigated history");

        self.get()
    }

    /// Keep only the newest `limit` entries
    pub fn retain_last(&mut self, limit: usize) {
        let overflow = self.elements.len().saturating_sub(limit);
        if overflow == 0 {
            return;
        }

        self.elements.drain(0..overflow);
        self.cursor = self.cursor.and_then(|c| c.checked_sub(overflow));
    }

    pub fn contains(&self, element: &T) -> bool {
        self.elements.contains(element)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elements.iter()
    }
}
