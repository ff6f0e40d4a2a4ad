use crate::radix::Base;

/// One successfully evaluated expression, kept exactly as committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub expression: String,
    pub base: Base,
    pub result: u64,
}

/// Append-only record of the session's evaluations, oldest first. Nothing is
/// ever removed or rewritten; the record lives as long as the session.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<Entry>,
}

impl History {
    pub fn push(&mut self, expression: &str, base: Base, result: u64) {
        self.entries.push(Entry {
            expression: expression.to_owned(),
            base,
            result,
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}
