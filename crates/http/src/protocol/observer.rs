use futures::channel::mpsc::UnboundedSender;
use tracing::warn;

/// Receives the notifications a session emits to its owner.
///
/// Notifications are delivered synchronously from inside the session's event methods, in the
/// order the session produces them.
pub trait Observer<E> {
    fn notify(&mut self, event: E);
}

impl<E> Observer<E> for Vec<E> {
    fn notify(&mut self, event: E) {
        self.push(event);
    }
}

impl<E> Observer<E> for UnboundedSender<E> {
    fn notify(&mut self, event: E) {
        if self.unbounded_send(event).is_err() {
            warn!("observer receiver dropped, notification discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures::channel::mpsc;

    #[test]
    fn test_vec_keeps_order() {
        let mut events = Vec::new();
        events.notify(1);
        events.notify(2);
        assert_eq!(events, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_channel_forwards() {
        let (mut sender, mut receiver) = mpsc::unbounded();
        sender.notify("header");
        sender.notify("complete");
        drop(sender);

        assert_eq!(receiver.next().await, Some("header"));
        assert_eq!(receiver.next().await, Some("complete"));
        assert_eq!(receiver.next().await, None);
    }

    #[test]
    fn test_closed_channel_does_not_panic() {
        let (mut sender, receiver) = mpsc::unbounded::<u8>();
        drop(receiver);
        sender.notify(1);
    }
}
