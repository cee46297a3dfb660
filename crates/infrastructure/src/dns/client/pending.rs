use dashmap::DashMap;
use dnscore_domain::DnsResponse;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tracing::warn;

/// One outstanding request waiting for its reply.
pub(crate) struct PendingEntry {
    reply_tx: Mutex<Option<oneshot::Sender<DnsResponse>>>,
}

impl PendingEntry {
    fn take_sender(&self) -> Option<oneshot::Sender<DnsResponse>> {
        self.reply_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Outstanding requests keyed by transaction ID.
///
/// Registration and removal take the shard write lock. Completion only reads
/// the table and then takes the sender out of the entry itself.
#[derive(Default)]
pub(crate) struct PendingRequests {
    entries: DashMap<u16, Arc<PendingEntry>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` and returns the guard that owns the registration plus
    /// the receiving half of the reply channel.
    ///
    /// A live entry with the same ID is replaced; its caller never sees a reply
    /// and ends on its own timeout or cancellation.
    pub fn register(&self, id: u16) -> (PendingGuard<'_>, oneshot::Receiver<DnsResponse>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        let entry = Arc::new(PendingEntry {
            reply_tx: Mutex::new(Some(reply_tx)),
        });

        if self.entries.insert(id, entry.clone()).is_some() {
            warn!(id, "Replaced in-flight request with the same transaction ID");
        }

        (
            PendingGuard {
                table: self,
                id,
                entry,
            },
            reply_rx,
        )
    }

    /// Delivers `response` to the request waiting on its ID.
    ///
    /// Returns false when nobody is waiting (unknown ID, already answered, or
    /// the caller gave up).
    pub fn complete(&self, response: DnsResponse) -> bool {
        let sender = match self.entries.get(&response.id) {
            Some(entry) => entry.take_sender(),
            None => return false,
        };

        match sender {
            Some(tx) => tx.send(response).is_ok(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Removes its registration when dropped, whichever way the request ended.
pub(crate) struct PendingGuard<'a> {
    table: &'a PendingRequests,
    id: u16,
    entry: Arc<PendingEntry>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        // a colliding registration may own the slot now; leave it alone
        self.table
            .entries
            .remove_if(&self.id, |_, current| Arc::ptr_eq(current, &self.entry));
    }
}
