// Toast-style notifications
// Dialogs post here, the app drains the receiver on its loop and shows the latest message

use tokio::sync::mpsc;
use tracing::debug;

#[derive(Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<String>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn show(&self, message: &str) {
        debug!("Toast: {}", message);
        // Nobody listening means the app is shutting down
        let _ = self.sender.send(message.to_string());
    }
}
