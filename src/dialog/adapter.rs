use crate::playlist::PlaylistDuplicatesEntry;

pub type SelectedListener = Box<dyn FnMut(PlaylistDuplicatesEntry) + Send>;

/// The rows a playlist dialog shows, a cursor over them, and the callback that
/// fires when the row under the cursor is picked. Rendering reads `items()` and
/// `selected()`; it never owns the data.
#[derive(Default)]
pub struct PlaylistListAdapter {
    items: Vec<PlaylistDuplicatesEntry>,
    selected: Option<usize>,
    listener: Option<SelectedListener>,
}

impl PlaylistListAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new set of rows, keeping the cursor in range
    pub fn replace_all(&mut self, items: Vec<PlaylistDuplicatesEntry>) {
        self.items = items;
        self.selected = match (self.items.is_empty(), self.selected) {
            (true, _) => None,
            (false, Some(index)) => Some(index.min(self.items.len() - 1)),
            (false, None) => Some(0),
        };
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }

    pub fn items(&self) -> &[PlaylistDuplicatesEntry] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.move_selection(-1);
    }

    fn move_selection(&mut self, delta: i32) {
        if self.items.is_empty() {
            return;
        }

        let current = self.selected.unwrap_or(0);
        let new_index = if delta < 0 {
            current.saturating_sub((-delta) as usize)
        } else {
            (current + delta as usize).min(self.items.len() - 1)
        };

        self.selected = Some(new_index);
    }

    pub fn set_selected_listener(&mut self, listener: SelectedListener) {
        self.listener = Some(listener);
    }

    pub fn unset_selected_listener(&mut self) {
        self.listener = None;
    }

    /// Hand the row under the cursor to the listener. Returns false when there is
    /// no row or nobody is listening.
    pub fn activate_selected(&mut self) -> bool {
        let Some(entry) = self.selected.and_then(|i| self.items.get(i)).cloned() else {
            return false;
        };

        match self.listener.as_mut() {
            Some(listener) => {
                listener(entry);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn rows(names: &[&str]) -> Vec<PlaylistDuplicatesEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| PlaylistDuplicatesEntry::new(i as i64, *name))
            .collect()
    }

    #[test]
    fn test_cursor_stays_in_range() {
        let mut adapter = PlaylistListAdapter::new();
        assert_eq!(adapter.selected(), None);

        adapter.replace_all(rows(&["a", "b", "c"]));
        assert_eq!(adapter.selected(), Some(0));

        adapter.select_next();
        adapter.select_next();
        adapter.select_next();
        assert_eq!(adapter.selected(), Some(2));

        adapter.replace_all(rows(&["a"]));
        assert_eq!(adapter.selected(), Some(0));

        adapter.select_previous();
        assert_eq!(adapter.selected(), Some(0));

        adapter.replace_all(Vec::new());
        assert_eq!(adapter.selected(), None);
    }

    #[test]
    fn test_activate_calls_listener_with_selected_row() {
        let picked = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&picked);

        let mut adapter = PlaylistListAdapter::new();
        adapter.replace_all(rows(&["a", "b"]));
        adapter.set_selected_listener(Box::new(move |entry| {
            sink.lock().unwrap().push(entry.uid);
        }));

        adapter.select_next();
        assert!(adapter.activate_selected());
        assert_eq!(*picked.lock().unwrap(), vec![1]);

        adapter.unset_selected_listener();
        assert!(!adapter.activate_selected());
        assert_eq!(picked.lock().unwrap().len(), 1);
    }
}
