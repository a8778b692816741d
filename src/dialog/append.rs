use super::adapter::PlaylistListAdapter;
use super::creation::PlaylistCreationDialog;
use super::tasks::TaskGroup;
use super::{DismissListener, PlaylistDialog};
use crate::library::StreamEntity;
use crate::notify::Notifier;
use crate::playlist::{any_playlist_contains_duplicates, PlaylistDuplicatesEntry, PlaylistStore};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    Created,
    /// Subscribed, waiting for the first snapshot
    Loading,
    Listing { filtered: bool },
    Closed,
}

/// Work finished off the UI loop, applied by `dispatch_pending` / `next_update`
#[derive(Debug)]
pub enum DialogMessage {
    PlaylistsReceived(Vec<PlaylistDuplicatesEntry>),
    PlaylistSelected(PlaylistDuplicatesEntry),
}

/// Lets the user pick one of their playlists for the pending tracks.
///
/// Rows come from a live query on the first pending track, so playlists that
/// already hold it show up with a count. Picking a row appends every pending
/// track and closes the dialog straight away; the write itself keeps going in
/// the background and reports through the `Notifier`.
pub struct PlaylistAppendDialog {
    base: PlaylistDialog,
    store: Arc<dyn PlaylistStore>,
    notifier: Notifier,
    adapter: PlaylistListAdapter,

    user_playlists: Vec<PlaylistDuplicatesEntry>,
    filter_text: String,
    list_visible: bool,
    duplicate_indicator_visible: bool,
    phase: DialogPhase,

    tasks: TaskGroup,
    tx: mpsc::UnboundedSender<DialogMessage>,
    rx: mpsc::UnboundedReceiver<DialogMessage>,
}

impl PlaylistAppendDialog {
    pub fn open(
        store: Arc<dyn PlaylistStore>,
        notifier: Notifier,
        streams: Vec<StreamEntity>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut adapter = PlaylistListAdapter::new();
        let selected_tx = tx.clone();
        adapter.set_selected_listener(Box::new(move |entry| {
            let _ = selected_tx.send(DialogMessage::PlaylistSelected(entry));
        }));

        Self {
            base: PlaylistDialog::new(streams),
            store,
            notifier,
            adapter,
            user_playlists: Vec::new(),
            filter_text: String::new(),
            list_visible: false,
            duplicate_indicator_visible: false,
            phase: DialogPhase::Created,
            tasks: TaskGroup::new(),
            tx,
            rx,
        }
    }

    pub fn set_on_dismiss_listener(&mut self, listener: Option<DismissListener>) {
        self.base.set_on_dismiss_listener(listener);
    }

    pub fn streams(&self) -> &[StreamEntity] {
        self.base.streams()
    }

    /// Start listening for playlists. Does nothing without pending tracks or
    /// when the dialog was already shown.
    pub fn on_shown(&mut self) {
        if self.phase != DialogPhase::Created {
            return;
        }
        let Some(first) = self.base.streams().first() else {
            debug!("Append dialog shown without pending streams");
            return;
        };

        let mut updates = self.store.playlist_duplicates(&first.url);
        let tx = self.tx.clone();
        self.tasks.spawn(async move {
            while let Some(result) = updates.next().await {
                match result {
                    Ok(playlists) => {
                        if tx.send(DialogMessage::PlaylistsReceived(playlists)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Playlist query failed: {}", e);
                        break;
                    }
                }
            }
        });

        self.phase = DialogPhase::Loading;
    }

    pub fn on_filter_text_changed(&mut self, text: &str) {
        if self.phase == DialogPhase::Closed {
            return;
        }

        self.filter_text = text.to_string();
        if matches!(self.phase, DialogPhase::Listing { .. }) {
            self.apply_filter();
        }
    }

    /// Append the pending tracks to `entry` and close.
    ///
    /// Returns the handle of the background write, which outlives the dialog.
    pub fn on_playlist_chosen(&mut self, entry: PlaylistDuplicatesEntry) -> Option<JoinHandle<()>> {
        if self.phase == DialogPhase::Closed || self.base.streams().is_empty() {
            return None;
        }

        let streams = self.base.streams().to_vec();
        let store = Arc::clone(&self.store);
        let notifier = self.notifier.clone();
        let message = append_message(entry.times_stream_is_contained);
        let update_thumbnail = entry.has_default_thumbnail();
        let playlist_id = entry.uid;

        info!("Appending {} streams to playlist {}", streams.len(), playlist_id);

        let handle = tokio::spawn(async move {
            let stream_ids = match store.append_to_playlist(playlist_id, streams).await {
                Ok(ids) => ids,
                Err(e) => {
                    warn!("Failed to append to playlist {}: {}", playlist_id, e);
                    return;
                }
            };
            notifier.show(&message);

            if !update_thumbnail {
                return;
            }
            let Some(&first_stream) = stream_ids.first() else {
                return;
            };
            match store
                .change_playlist_thumbnail(playlist_id, first_stream, false)
                .await
            {
                Ok(()) => notifier.show(&message),
                Err(e) => warn!("Failed to set thumbnail of playlist {}: {}", playlist_id, e),
            }
        });

        self.close();
        Some(handle)
    }

    /// Swap this dialog for a creation dialog holding the same tracks. The
    /// dismiss callback moves along with them.
    pub fn on_create_new_playlist_requested(&mut self) -> Option<PlaylistCreationDialog> {
        if self.phase == DialogPhase::Closed || self.base.streams().is_empty() {
            return None;
        }

        let mut creation = PlaylistCreationDialog::new(
            Arc::clone(&self.store),
            self.notifier.clone(),
            self.base.streams().to_vec(),
        );
        creation.set_on_dismiss_listener(self.base.take_on_dismiss_listener());

        self.close();
        Some(creation)
    }

    pub fn close(&mut self) {
        if self.phase == DialogPhase::Closed {
            return;
        }

        self.tasks.dispose();
        self.adapter.unset_selected_listener();
        self.adapter.clear();
        self.user_playlists.clear();
        self.filter_text.clear();
        self.list_visible = false;
        self.duplicate_indicator_visible = false;

        // Anything already queued was produced for a dialog that no longer exists
        self.rx.close();
        while self.rx.try_recv().is_ok() {}

        self.phase = DialogPhase::Closed;
        debug!("Append dialog closed");
        self.base.dismiss();
    }

    /// Apply everything that arrived since the last call, returns how many
    /// messages were handled
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle(message);
            handled += 1;
        }
        handled
    }

    /// Wait for the next message and apply it. False once the dialog is closed.
    pub async fn next_update(&mut self) -> bool {
        match self.rx.recv().await {
            Some(message) => {
                self.handle(message);
                true
            }
            None => false,
        }
    }

    fn handle(&mut self, message: DialogMessage) {
        match message {
            DialogMessage::PlaylistsReceived(playlists) => self.on_playlists_received(playlists),
            DialogMessage::PlaylistSelected(entry) => {
                // The commit reports through the notifier, nobody waits on it
                let _ = self.on_playlist_chosen(entry);
            }
        }
    }

    fn on_playlists_received(&mut self, playlists: Vec<PlaylistDuplicatesEntry>) {
        if self.phase == DialogPhase::Closed {
            return;
        }

        debug!("Received {} playlists", playlists.len());
        self.duplicate_indicator_visible = any_playlist_contains_duplicates(&playlists);
        self.user_playlists = playlists;
        self.list_visible = true;
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let filtered = !self.filter_text.is_empty();
        self.adapter
            .replace_all(filter_playlists(&self.user_playlists, &self.filter_text));
        self.phase = DialogPhase::Listing { filtered };
    }

    pub fn adapter(&self) -> &PlaylistListAdapter {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut PlaylistListAdapter {
        &mut self.adapter
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == DialogPhase::Closed
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn is_list_visible(&self) -> bool {
        self.list_visible
    }

    pub fn is_duplicate_indicator_visible(&self) -> bool {
        self.duplicate_indicator_visible
    }
}

/// Entries whose name contains `text`. Empty text keeps everything, unnamed
/// playlists never match a non-empty filter.
pub fn filter_playlists(
    playlists: &[PlaylistDuplicatesEntry],
    text: &str,
) -> Vec<PlaylistDuplicatesEntry> {
    if text.is_empty() {
        return playlists.to_vec();
    }

    playlists
        .iter()
        .filter(|entry| entry.ordering_name().is_some_and(|name| name.contains(text)))
        .cloned()
        .collect()
}

pub fn append_message(times_contained: u32) -> String {
    if times_contained == 0 {
        "Added to playlist".to_string()
    } else {
        format!("Duplicate added {} time(s)", times_contained)
    }
}
