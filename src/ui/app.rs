use super::events::{
    key_to_append_dialog_event, key_to_creation_dialog_event, key_to_library_event, AppEvent,
};
use super::render;
use super::TerminalManager;
use crate::config::Config;
use crate::dialog::{
    create_corresponding_dialog, CorrespondingDialog, DismissListener, PlaylistAppendDialog,
    PlaylistCreationDialog,
};
use crate::library::StreamEntity;
use crate::notify::Notifier;
use crate::playlist::PlaylistStore;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::ListState,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

enum ActiveDialog {
    None,
    Append(PlaylistAppendDialog),
    Create(PlaylistCreationDialog),
}

pub struct App {
    config: Config,
    terminal: TerminalManager,
    store: Arc<dyn PlaylistStore>,
    notifier: Notifier,
    toasts: mpsc::UnboundedReceiver<String>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    streams: Vec<StreamEntity>,
    marked: BTreeSet<usize>,
    list_state: ListState,
    dialog: ActiveDialog,
    status_message: Option<(String, Instant)>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, store: Arc<dyn PlaylistStore>, streams: Vec<StreamEntity>) -> Result<Self> {
        let terminal = TerminalManager::new()?;
        let (notifier, toasts) = Notifier::channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut list_state = ListState::default();
        if !streams.is_empty() {
            list_state.select(Some(0));
        }

        Ok(Self {
            config,
            terminal,
            store,
            notifier,
            toasts,
            event_tx,
            event_rx,
            streams,
            marked: BTreeSet::new(),
            list_state,
            dialog: ActiveDialog::None,
            status_message: None,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // The poll timeout is the tick
        let tick_rate = self.config.ui.tick_rate();

        while !self.should_quit {
            if event::poll(tick_rate).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press {
                        let app_event = match &self.dialog {
                            ActiveDialog::None => key_to_library_event(key),
                            ActiveDialog::Append(_) => key_to_append_dialog_event(key),
                            ActiveDialog::Create(_) => key_to_creation_dialog_event(key),
                        };

                        if let Some(app_event) = app_event {
                            self.handle_event(app_event).await?;
                        }
                    }
                }
            }

            // Playlist snapshots and selections land here
            if let ActiveDialog::Append(dialog) = &mut self.dialog {
                dialog.dispatch_pending();
            }
            self.drop_closed_dialog();

            while let Ok(internal_event) = self.event_rx.try_recv() {
                self.handle_event(internal_event).await?;
            }

            while let Ok(message) = self.toasts.try_recv() {
                self.set_status(&message);
            }

            self.render()?;

            // poll blocks, give store tasks a turn
            tokio::task::yield_now().await;
        }

        // Dismiss callbacks still fire on the way out
        match &mut self.dialog {
            ActiveDialog::Append(dialog) => dialog.close(),
            ActiveDialog::Create(dialog) => dialog.cancel(),
            ActiveDialog::None => {}
        }
        info!("Shutting down");

        Ok(())
    }

    async fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Quit => {
                self.should_quit = true;
            }
            AppEvent::Up => self.move_selection(-1),
            AppEvent::Down => self.move_selection(1),
            AppEvent::ToggleMark => {
                if let Some(selected) = self.list_state.selected() {
                    if !self.marked.remove(&selected) {
                        self.marked.insert(selected);
                    }
                }
            }
            AppEvent::OpenPlaylistDialog => {
                self.open_playlist_dialog().await;
            }
            AppEvent::FilterInput(c) => {
                if let ActiveDialog::Append(dialog) = &mut self.dialog {
                    let mut text = dialog.filter_text().to_string();
                    text.push(c);
                    dialog.on_filter_text_changed(&text);
                }
            }
            AppEvent::FilterBackspace => {
                if let ActiveDialog::Append(dialog) = &mut self.dialog {
                    let mut text = dialog.filter_text().to_string();
                    text.pop();
                    dialog.on_filter_text_changed(&text);
                }
            }
            AppEvent::ChoosePlaylist => {
                if let ActiveDialog::Append(dialog) = &mut self.dialog {
                    // The adapter's listener queues the selection, the dialog applies it
                    if dialog.adapter_mut().activate_selected() {
                        dialog.dispatch_pending();
                    }
                }
            }
            AppEvent::CreateNewPlaylist => {
                if let ActiveDialog::Append(dialog) = &mut self.dialog {
                    if let Some(creation) = dialog.on_create_new_playlist_requested() {
                        self.dialog = ActiveDialog::Create(creation);
                    }
                }
            }
            AppEvent::CloseDialog => {
                if let ActiveDialog::Append(dialog) = &mut self.dialog {
                    dialog.close();
                }
            }
            AppEvent::NameInput(c) => {
                if let ActiveDialog::Create(dialog) = &mut self.dialog {
                    dialog.push_char(c);
                }
            }
            AppEvent::NameBackspace => {
                if let ActiveDialog::Create(dialog) = &mut self.dialog {
                    dialog.pop_char();
                }
            }
            AppEvent::ConfirmCreation => {
                if let ActiveDialog::Create(dialog) = &mut self.dialog {
                    if dialog.confirm().is_none() && !dialog.is_closed() {
                        self.set_status("Playlist name cannot be empty");
                    }
                }
            }
            AppEvent::CancelCreation => {
                if let ActiveDialog::Create(dialog) = &mut self.dialog {
                    dialog.cancel();
                }
            }
            AppEvent::DialogDismissed => {
                debug!("Dialog dismissed, clearing {} marks", self.marked.len());
                self.marked.clear();
            }
        }

        self.drop_closed_dialog();
        Ok(())
    }

    /// Marked tracks, or the highlighted one when nothing is marked
    fn pending_streams(&self) -> Vec<StreamEntity> {
        if self.marked.is_empty() {
            return self
                .list_state
                .selected()
                .and_then(|i| self.streams.get(i))
                .cloned()
                .into_iter()
                .collect();
        }

        self.marked
            .iter()
            .filter_map(|&i| self.streams.get(i))
            .cloned()
            .collect()
    }

    async fn open_playlist_dialog(&mut self) {
        let pending = self.pending_streams();
        if pending.is_empty() {
            self.set_status("No tracks to add");
            return;
        }

        let dialog = match create_corresponding_dialog(
            Arc::clone(&self.store),
            self.notifier.clone(),
            pending,
        )
        .await
        {
            Ok(dialog) => dialog,
            Err(e) => {
                warn!("Could not open playlist dialog: {}", e);
                return;
            }
        };

        let event_tx = self.event_tx.clone();
        let on_dismiss: DismissListener = Box::new(move || {
            let _ = event_tx.send(AppEvent::DialogDismissed);
        });

        self.dialog = match dialog {
            CorrespondingDialog::Append(mut append) => {
                append.set_on_dismiss_listener(Some(on_dismiss));
                append.on_shown();
                ActiveDialog::Append(append)
            }
            CorrespondingDialog::Create(mut creation) => {
                creation.set_on_dismiss_listener(Some(on_dismiss));
                ActiveDialog::Create(creation)
            }
        };
    }

    fn drop_closed_dialog(&mut self) {
        let closed = match &self.dialog {
            ActiveDialog::Append(dialog) => dialog.is_closed(),
            ActiveDialog::Create(dialog) => dialog.is_closed(),
            ActiveDialog::None => false,
        };
        if closed {
            self.dialog = ActiveDialog::None;
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if let ActiveDialog::Append(dialog) = &mut self.dialog {
            if delta < 0 {
                dialog.adapter_mut().select_previous();
            } else {
                dialog.adapter_mut().select_next();
            }
            return;
        }

        if self.streams.is_empty() {
            return;
        }

        let current = self.list_state.selected().unwrap_or(0);
        let new_index = if delta < 0 {
            current.saturating_sub((-delta) as usize)
        } else {
            (current + delta as usize).min(self.streams.len() - 1)
        };

        self.list_state.select(Some(new_index));
    }

    fn set_status(&mut self, message: &str) {
        self.status_message = Some((message.to_string(), Instant::now()));
    }

    fn render(&mut self) -> Result<()> {
        let toast_duration = self.config.ui.toast_duration();
        let streams = &self.streams;
        let marked = &self.marked;
        let list_state = &mut self.list_state;
        let dialog = &self.dialog;
        let status_message = self.status_message.as_ref();

        self.terminal.draw(|f| {
            let size = f.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Min(6),    // Library
                    Constraint::Length(3), // Status bar
                ])
                .split(size);

            render::render_header(f, chunks[0], marked.len());
            render::render_library(f, chunks[1], streams, marked, list_state);
            render::render_status_bar(f, chunks[2], status_message, toast_duration);

            match dialog {
                ActiveDialog::Append(dialog) => render::render_append_dialog(f, size, dialog),
                ActiveDialog::Create(dialog) => render::render_creation_dialog(f, size, dialog),
                ActiveDialog::None => {}
            }
        })
    }
}
