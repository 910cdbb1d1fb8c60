//! The only link between the controller and the presenter: one ordered,
//! unbounded queue in each direction.

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::protocol::{ToController, ToPresenter};

/// Sending half. Messages arrive in send order, exactly once.
#[derive(Debug)]
pub struct Outbox<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Outbox<T> {
    /// Queue a message without waiting. Fails only if the peer is gone.
    pub fn send(&self, message: T) -> Result<()> {
        self.tx.send(message).map_err(|_| Error::Disconnected)
    }
}

/// Receiving half.
#[derive(Debug)]
pub struct Inbox<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Inbox<T> {
    /// Next message, or `None` once the peer has dropped its outbox and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

/// The controller's end of the channel.
#[derive(Debug)]
pub struct ControllerEnd {
    pub outbox: Outbox<ToPresenter>,
    pub inbox: Inbox<ToController>,
}

/// The presenter's end of the channel.
#[derive(Debug)]
pub struct PresenterEnd {
    pub outbox: Outbox<ToController>,
    pub inbox: Inbox<ToPresenter>,
}

/// Create a connected pair of channel ends.
pub fn pair() -> (ControllerEnd, PresenterEnd) {
    let (to_presenter, from_controller) = mpsc::unbounded_channel();
    let (to_controller, from_presenter) = mpsc::unbounded_channel();

    (
        ControllerEnd {
            outbox: Outbox { tx: to_presenter },
            inbox: Inbox { rx: from_presenter },
        },
        PresenterEnd {
            outbox: Outbox { tx: to_controller },
            inbox: Inbox {
                rx: from_controller,
            },
        },
    )
}
