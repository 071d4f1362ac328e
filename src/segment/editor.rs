use super::compiler::compile;
use super::decompiler::decompile;
use super::document::SegmentQueryDocument;
use super::row::{RowId, RuleRow};

/// Handle returned by [`RuleEditor::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&SegmentQueryDocument)>;

/// An editing session over an ordered list of rule rows.
///
/// The document is recompiled from the full row list on every mutation and
/// pushed to subscribers; nothing is cached between edits.
#[derive(Default)]
pub struct RuleEditor {
    rows: Vec<RuleRow>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl RuleEditor {
    /// An empty session with no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// A session seeded with one default row, as a fresh campaign form starts
    pub fn with_default_row() -> Self {
        let mut editor = Self::new();
        editor.rows.push(RuleRow::empty());
        editor
    }

    pub fn from_rows(rows: Vec<RuleRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[RuleRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<RuleRow> {
        self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&RuleRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Compile the current rows
    pub fn document(&self) -> SegmentQueryDocument {
        compile(&self.rows)
    }

    /// Append a default row and return its id
    pub fn add_row(&mut self) -> RowId {
        let row = RuleRow::empty();
        let id = row.id;
        self.rows.push(row);
        self.notify();
        id
    }

    pub fn push_row(&mut self, row: RuleRow) {
        self.rows.push(row);
        self.notify();
    }

    /// Replace the row with the same id. Returns false if no such row exists.
    pub fn update_row(&mut self, row: RuleRow) -> bool {
        let Some(slot) = self.rows.iter_mut().find(|existing| existing.id == row.id) else {
            return false;
        };
        *slot = row;
        self.notify();
        true
    }

    /// Remove a row by id, returning it if it was present
    pub fn remove_row(&mut self, id: RowId) -> Option<RuleRow> {
        let index = self.rows.iter().position(|row| row.id == id)?;
        let removed = self.rows.remove(index);
        self.notify();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.notify();
    }

    /// Back to a single default row, as after a campaign was created
    pub fn reset(&mut self) {
        self.rows.clear();
        self.rows.push(RuleRow::empty());
        self.notify();
    }

    /// Append the rows of an imported document to the current rows.
    ///
    /// Returns the number of rows added.
    pub fn import_document(&mut self, doc: &SegmentQueryDocument) -> usize {
        let imported = decompile(doc);
        let count = imported.len();
        self.rows.extend(imported);
        self.notify();
        count
    }

    /// Replace all rows with the rows of `doc`
    pub fn replace_with_document(&mut self, doc: &SegmentQueryDocument) {
        self.rows = decompile(doc);
        self.notify();
    }

    /// Register a callback run with the recompiled document after every edit
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&SegmentQueryDocument) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let doc = compile(&self.rows);
        for (_, observer) in self.observers.iter_mut() {
            observer(&doc);
        }
    }
}

impl std::fmt::Debug for RuleEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEditor")
            .field("rows", &self.rows)
            .field("observers", &self.observers.len())
            .finish()
    }
}
