//! The implementation of the sending end of the application layer protocol.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{LEN_TYPE_SIZE, LenType, Serialize};

/// A message laid out as it goes on the wire, it can be sent to many peers
/// while serializing it only once.
#[derive(Debug)]
pub struct Frame<'a> {
    head: Vec<u8>,
    tail: Option<&'a [u8]>,
}

impl<'a> Frame<'a> {
    /// Encodes `msg` into a new `Frame`.
    ///
    /// # Arguments
    /// * `msg` - A serializable object, zero copy data stays borrowed.
    pub fn new<T: Serialize<'a>>(msg: &'a T) -> Self {
        let mut head = Vec::new();
        let tail = encode(msg, &mut head);
        Self { head, tail }
    }

    /// The length of the frame's body, without the length prefix.
    pub fn len(&self) -> usize {
        self.head.len() - LEN_TYPE_SIZE + self.tail.map_or(0, <[_]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writes the length prefix and the owned part of `msg` into `buf`.
///
/// # Returns
/// The zero copy data that must follow `buf` on the wire, if any.
fn encode<'a, T: Serialize<'a>>(msg: &'a T, buf: &mut Vec<u8>) -> Option<&'a [u8]> {
    buf.clear();
    buf.resize(LEN_TYPE_SIZE, 0);

    let tail = msg.serialize(buf);
    let len = buf.len() - LEN_TYPE_SIZE + tail.map_or(0, <[_]>::len);
    buf[..LEN_TYPE_SIZE].copy_from_slice(&(len as LenType).to_be_bytes());

    tail
}

/// The sending end handle of the communication.
pub struct OnoSender<W>
where
    W: AsyncWrite + Unpin,
{
    tx: W,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> OnoSender<W> {
    /// Creates a new `OnoSender` instance.
    ///
    /// # Arguments
    /// * `tx` - The underlying writer.
    pub(super) fn new(tx: W) -> Self {
        Self {
            tx,
            buf: Vec::new(),
        }
    }

    /// Sends `msg` through the inner sender.
    ///
    /// # Arguments
    /// * `msg` - A serializable object.
    ///
    /// # Returns
    /// A result object that returns `io::Error` on failure.
    pub async fn send<'a, T: Serialize<'a>>(&mut self, msg: &'a T) -> io::Result<()> {
        let Self { tx, buf } = self;

        let tail = encode(msg, buf);
        write_frame(tx, buf, tail).await
    }

    /// Sends an already encoded `frame` through the inner sender.
    pub async fn send_frame(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        write_frame(&mut self.tx, &frame.head, frame.tail).await
    }
}

async fn write_frame<W>(tx: &mut W, head: &[u8], tail: Option<&[u8]>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    tx.write_all(head).await?;

    if let Some(tail) = tail {
        tx.write_all(tail).await?;
    }

    tx.flush().await
}
