use super::link::SerialLink;
use crate::domain::error::ScaleResult;
use std::io::{self, ErrorKind};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task;

/// Async wrapper owning an open link.
///
/// Every call runs on the blocking pool so the poll task never stalls the
/// executor. Not `Clone`: the handle has exactly one owner and the link is
/// closed when it is dropped.
pub struct PortHandle {
    link: Arc<Mutex<Box<dyn SerialLink>>>,
}

impl PortHandle {
    pub fn new(link: Box<dyn SerialLink>) -> Self {
        Self {
            link: Arc::new(Mutex::new(link)),
        }
    }

    /// Write all of `data`, then flush
    pub async fn send(&self, data: &'static [u8]) -> ScaleResult<()> {
        self.blocking(move |link| {
            link.write_all(data)?;
            link.flush()
        })
        .await
    }

    /// Read up to `max` bytes.
    ///
    /// An empty chunk means no data arrived before the transport's read
    /// timeout; it is not an error.
    pub async fn read_chunk(&self, max: usize) -> ScaleResult<Vec<u8>> {
        self.blocking(move |link| {
            let mut buffer = vec![0u8; max];
            match link.read(&mut buffer) {
                Ok(n) => {
                    buffer.truncate(n);
                    Ok(buffer)
                }
                Err(e) if is_no_data(&e) => Ok(Vec::new()),
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn blocking<T, F>(&self, op: F) -> ScaleResult<T>
    where
        F: FnOnce(&mut dyn SerialLink) -> io::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let link = Arc::clone(&self.link);
        let result = task::spawn_blocking(move || {
            let mut link = link.lock().unwrap_or_else(PoisonError::into_inner);
            op(&mut **link)
        })
        .await?;
        Ok(result?)
    }
}

fn is_no_data(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}
