// Playlist dialogs - the modal flows for sending tracks to a playlist
// Append picks an existing playlist, creation makes a new one from the same tracks

pub mod adapter;  // rows + cursor + selection callback
pub mod append;   // pick an existing playlist
pub mod creation; // name a new playlist
pub mod tasks;    // background work tied to a dialog's lifetime

pub use adapter::PlaylistListAdapter;
pub use append::{DialogPhase, PlaylistAppendDialog};
pub use creation::PlaylistCreationDialog;
pub use tasks::TaskGroup;

use crate::error::Result;
use crate::library::StreamEntity;
use crate::notify::Notifier;
use crate::playlist::PlaylistStore;
use std::sync::Arc;
use tracing::debug;

/// Called once when a dialog goes away. Can be moved to the dialog that replaces it.
pub type DismissListener = Box<dyn FnOnce() + Send>;

/// State every playlist dialog carries: the tracks it was opened for and the
/// dismiss callback.
pub struct PlaylistDialog {
    streams: Vec<StreamEntity>,
    on_dismiss: Option<DismissListener>,
}

impl PlaylistDialog {
    pub fn new(streams: Vec<StreamEntity>) -> Self {
        Self {
            streams,
            on_dismiss: None,
        }
    }

    pub fn streams(&self) -> &[StreamEntity] {
        &self.streams
    }

    pub fn set_on_dismiss_listener(&mut self, listener: Option<DismissListener>) {
        self.on_dismiss = listener;
    }

    pub fn take_on_dismiss_listener(&mut self) -> Option<DismissListener> {
        self.on_dismiss.take()
    }

    /// Fire the dismiss callback, at most once
    pub fn dismiss(&mut self) {
        if let Some(listener) = self.on_dismiss.take() {
            listener();
        }
    }
}

pub enum CorrespondingDialog {
    Append(PlaylistAppendDialog),
    Create(PlaylistCreationDialog),
}

/// Skip the playlist list entirely when there is nothing to list
pub async fn create_corresponding_dialog(
    store: Arc<dyn PlaylistStore>,
    notifier: Notifier,
    streams: Vec<StreamEntity>,
) -> Result<CorrespondingDialog> {
    let count = store.playlist_count().await?;
    debug!("Opening playlist dialog for {} streams ({} playlists)", streams.len(), count);

    if count == 0 {
        Ok(CorrespondingDialog::Create(PlaylistCreationDialog::new(store, notifier, streams)))
    } else {
        Ok(CorrespondingDialog::Append(PlaylistAppendDialog::open(store, notifier, streams)))
    }
}
