use dashmap::DashMap;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;
use tracing::{debug, info};

/// Buffer sizes handed out by the pool: plain UDP, EDNS-sized UDP, largest TCP frame.
const SIZE_CLASSES: [usize; 3] = [512, 4096, 65_535];

const MAX_IDLE_PER_CLASS: usize = 64;

static SHARED_POOL: LazyLock<BufferPool> = LazyLock::new(|| BufferPool::new(MAX_IDLE_PER_CLASS));

/// Pool of reusable byte buffers sized to DNS message limits.
///
/// Buffers are grouped by size class and handed back automatically when the
/// [`PooledBuffer`] is dropped. Contents are not cleared between uses.
pub struct BufferPool {
    pools: DashMap<usize, Vec<Vec<u8>>>,

    max_idle_per_class: usize,

    total_created: AtomicU64,

    total_reused: AtomicU64,

    total_returned: AtomicU64,
}

impl BufferPool {
    pub fn new(max_idle_per_class: usize) -> Self {
        info!(max_idle_per_class, "Initializing DNS buffer pool");

        Self {
            pools: DashMap::new(),
            max_idle_per_class,
            total_created: AtomicU64::new(0),
            total_reused: AtomicU64::new(0),
            total_returned: AtomicU64::new(0),
        }
    }

    /// The process-wide pool used by the transports.
    pub fn shared() -> &'static BufferPool {
        &SHARED_POOL
    }

    /// Rents a buffer whose length is at least `size`.
    ///
    /// Requests larger than the biggest size class are served with an exact,
    /// unpooled allocation that is simply freed on drop.
    pub fn rent(&'static self, size: usize) -> PooledBuffer {
        let Some(class) = size_class(size) else {
            debug!(size, "Oversized buffer requested, allocating outside the pool");
            return PooledBuffer {
                buf: vec![0u8; size],
                class: None,
                pool: self,
            };
        };

        let reused = self.pools.get_mut(&class).and_then(|mut entry| entry.pop());
        let buf = match reused {
            Some(buf) => {
                self.total_reused.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.total_created.fetch_add(1, Ordering::Relaxed);
                vec![0u8; class]
            }
        };

        PooledBuffer {
            buf,
            class: Some(class),
            pool: self,
        }
    }

    fn release(&self, class: usize, buf: Vec<u8>) {
        self.total_returned.fetch_add(1, Ordering::Relaxed);
        let mut entry = self.pools.entry(class).or_default();
        if entry.len() < self.max_idle_per_class {
            entry.push(buf);
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_created: self.total_created.load(Ordering::Relaxed),
            total_reused: self.total_reused.load(Ordering::Relaxed),
            total_returned: self.total_returned.load(Ordering::Relaxed),
            total_pooled: self.pools.iter().map(|e| e.len()).sum(),
        }
    }
}

fn size_class(size: usize) -> Option<usize> {
    SIZE_CLASSES.iter().copied().find(|&class| class >= size)
}

/// A buffer leased from a [`BufferPool`]; returned to it on drop.
pub struct PooledBuffer {
    buf: Vec<u8>,
    class: Option<usize>,
    pool: &'static BufferPool,
}

impl PooledBuffer {
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(class) = self.class {
            self.pool.release(class, std::mem::take(&mut self.buf));
        }
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("capacity", &self.buf.len())
            .field("class", &self.class)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Buffers allocated because no idle one was available
    pub total_created: u64,
    /// Rents served from an idle buffer
    pub total_reused: u64,
    /// Buffers handed back (including ones dropped because the class was full)
    pub total_returned: u64,
    /// Idle buffers currently held
    pub total_pooled: usize,
}

impl PoolStats {
    pub fn reuse_rate(&self) -> f64 {
        let rents = self.total_created + self.total_reused;
        if rents == 0 {
            0.0
        } else {
            self.total_reused as f64 / rents as f64
        }
    }
}
