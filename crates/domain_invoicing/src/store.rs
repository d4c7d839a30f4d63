//! LineItem store
//!
//! Ordered collection of the line items of one draft. Sequence numbers are
//! handed out from a counter that only moves forward: removing a line or
//! clearing the store never frees a number for reuse.

use crate::draft::DraftHeader;
use crate::error::{DraftError, DraftField};
use crate::line::{LineCandidate, LineItem};

#[derive(Debug, Clone, PartialEq)]
pub struct LineItemStore {
    lines: Vec<LineItem>,
    next_sequence: u32,
}

impl Default for LineItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItemStore {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Rebuilds a store from persisted lines
    ///
    /// # Errors
    ///
    /// Rejects sequences that are zero, repeated or out of order, and a last
    /// sequence that leaves no room for another line.
    pub(crate) fn restore(lines: Vec<LineItem>) -> Result<Self, DraftError> {
        let mut last = 0;
        for line in &lines {
            if line.sequence() <= last {
                return Err(DraftError::validation(
                    DraftField::Lines,
                    format!(
                        "line sequence {} must be greater than {}",
                        line.sequence(),
                        last
                    ),
                ));
            }
            last = line.sequence();
        }
        let next_sequence = last.checked_add(1).ok_or_else(|| {
            DraftError::validation(DraftField::Lines, format!("line sequence {} is out of range", last))
        })?;
        Ok(Self {
            lines,
            next_sequence,
        })
    }

    /// Validates `candidate` and appends it with the next sequence number
    ///
    /// The header must already name the counterparty and both dates.
    ///
    /// # Errors
    ///
    /// `PreconditionNotMet` when header fields are missing;
    /// `ValidationRejected` when the candidate itself is invalid. The store is
    /// unchanged in both cases.
    pub fn add_line(
        &mut self,
        candidate: LineCandidate,
        header: &DraftHeader,
    ) -> Result<&LineItem, DraftError> {
        let missing = header.missing_for_line_entry();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(DraftField::as_str).collect();
            return Err(DraftError::precondition(
                "add_line",
                format!("header is missing {}", names.join(", ")),
            ));
        }

        let following = self.next_sequence.checked_add(1).ok_or_else(|| {
            DraftError::validation(DraftField::Lines, "no line sequence numbers left on this draft")
        })?;
        let line = candidate.into_line(self.next_sequence)?;
        self.next_sequence = following;

        let index = self.lines.len();
        self.lines.push(line);
        Ok(&self.lines[index])
    }

    /// Removes the line with `sequence`; a no-op when absent
    ///
    /// Remaining lines keep their sequence numbers.
    pub fn remove_line(&mut self, sequence: u32) -> Option<LineItem> {
        let index = self.lines.iter().position(|l| l.sequence() == sequence)?;
        Some(self.lines.remove(index))
    }

    /// Drops every line. Confirmation is the caller's responsibility.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order
    pub fn list(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn get(&self, sequence: u32) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.sequence() == sequence)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sequence number the next added line will receive
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [LineItem] {
        &mut self.lines
    }
}
