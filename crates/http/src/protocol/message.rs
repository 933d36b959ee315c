use bytes::Bytes;

/// An event produced by the incremental parser.
///
/// In [`Delivery::Whole`] mode only `Complete` is produced. In [`Delivery::Streaming`] mode a
/// message is delivered as one `Header`, any number of `Chunk`s, then `Complete` carrying the
/// same head with empty content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<T> {
    Header(T),
    Chunk(Bytes),
    Complete(T),
}

impl<T> Message<T> {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, Message::Complete(_))
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, Message::Chunk(_))
    }

    pub fn into_complete(self) -> Option<T> {
        match self {
            Message::Complete(message) => Some(message),
            _ => None,
        }
    }
}

/// How message content reaches the owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    /// buffer the whole message, content included
    #[default]
    Whole,
    /// hand out the head first, then content as it arrives
    Streaming,
}

impl Delivery {
    #[inline]
    pub fn is_streaming(self) -> bool {
        matches!(self, Delivery::Streaming)
    }
}
