use super::{DismissListener, PlaylistDialog};
use crate::library::StreamEntity;
use crate::notify::Notifier;
use crate::playlist::PlaylistStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Asks for a name and creates a playlist holding the pending tracks
pub struct PlaylistCreationDialog {
    base: PlaylistDialog,
    store: Arc<dyn PlaylistStore>,
    notifier: Notifier,
    name: String,
    closed: bool,
}

impl PlaylistCreationDialog {
    pub fn new(store: Arc<dyn PlaylistStore>, notifier: Notifier, streams: Vec<StreamEntity>) -> Self {
        Self {
            base: PlaylistDialog::new(streams),
            store,
            notifier,
            name: String::new(),
            closed: false,
        }
    }

    pub fn set_on_dismiss_listener(&mut self, listener: Option<DismissListener>) {
        self.base.set_on_dismiss_listener(listener);
    }

    pub fn streams(&self) -> &[StreamEntity] {
        self.base.streams()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push_char(&mut self, c: char) {
        self.name.push(c);
    }

    pub fn pop_char(&mut self) {
        self.name.pop();
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Create the playlist in the background and close. A blank name keeps
    /// the dialog open and returns None.
    pub fn confirm(&mut self) -> Option<JoinHandle<()>> {
        if self.closed {
            return None;
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return None;
        }

        let store = Arc::clone(&self.store);
        let notifier = self.notifier.clone();
        let streams = self.base.streams().to_vec();

        info!("Creating playlist '{}' with {} streams", name, streams.len());

        let handle = tokio::spawn(async move {
            match store.create_playlist(&name, streams).await {
                Ok(_) => notifier.show("Playlist successfully created"),
                Err(e) => warn!("Failed to create playlist '{}': {}", name, e),
            }
        });

        self.close();
        Some(handle)
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.base.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::testing::{streams, RecordingStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup(n: usize) -> (PlaylistCreationDialog, Arc<RecordingStore>, tokio::sync::mpsc::UnboundedReceiver<String>) {
        let store = Arc::new(RecordingStore::new().with_playlist_count(0));
        let (notifier, toasts) = Notifier::channel();
        let dyn_store: Arc<dyn PlaylistStore> = store.clone();
        (PlaylistCreationDialog::new(dyn_store, notifier, streams(n)), store, toasts)
    }

    #[tokio::test]
    async fn test_confirm_creates_playlist() {
        let (mut dialog, store, mut toasts) = setup(3);
        for c in "Road Tripx".chars() {
            dialog.push_char(c);
        }
        dialog.pop_char();
        assert_eq!(dialog.name(), "Road Trip");

        dialog.confirm().unwrap().await.unwrap();

        assert!(dialog.is_closed());
        assert_eq!(store.calls.lock().unwrap().created, vec![("Road Trip".to_string(), 3)]);
        assert_eq!(toasts.try_recv().unwrap(), "Playlist successfully created");
    }

    #[tokio::test]
    async fn test_blank_name_keeps_dialog_open() {
        let (mut dialog, store, _toasts) = setup(1);
        dialog.set_name("   ");

        assert!(dialog.confirm().is_none());
        assert!(!dialog.is_closed());
        assert!(store.calls.lock().unwrap().created.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_dismisses_once_without_storage() {
        let (mut dialog, store, _toasts) = setup(1);
        let dismissed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&dismissed);
        dialog.set_on_dismiss_listener(Some(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        dialog.set_name("Chill");
        dialog.cancel();
        dialog.cancel();
        assert!(dialog.confirm().is_none());

        assert_eq!(dismissed.load(Ordering::SeqCst), 1);
        assert!(store.calls.lock().unwrap().created.is_empty());
    }
}
