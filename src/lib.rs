// PanPipe Append - the "add to playlist" flow of the player as a library
// Dialog logic is UI-agnostic, the terminal front end sits behind the `tui` feature

pub mod config;   // settings and preferences
pub mod dialog;   // append / create playlist dialogs
pub mod error;    // typed store errors
pub mod library;  // tracks and directory scanning
pub mod notify;   // toast messages
pub mod playlist; // storage and the async store seam
#[cfg(feature = "tui")]
pub mod ui;       // terminal interface

pub use config::Config;
pub use dialog::{create_corresponding_dialog, CorrespondingDialog, PlaylistAppendDialog, PlaylistCreationDialog};
pub use error::PlaylistError;
pub use library::{MusicScanner, StreamEntity};
pub use notify::Notifier;
pub use playlist::{LocalPlaylistManager, PlaylistDuplicatesEntry, PlaylistStore};
