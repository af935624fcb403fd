//! Bounded frame pool
//!
//! Hands out independent copies of frames for downstream forwarding and
//! enforces optional ceilings on the number of copies alive at once and on
//! their total byte size.

use parking_lot::Mutex;
use roistat_core::Frame;
use std::ops::Deref;
use std::sync::Arc;

/// Buffers and bytes currently handed out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolUsage {
    pub buffers: usize,
    pub bytes: usize,
}

#[derive(Debug)]
struct PoolInner {
    max_buffers: Option<usize>,
    max_memory: Option<usize>,
    usage: Mutex<PoolUsage>,
}

/// Frame copy allocator with buffer-count and memory ceilings
///
/// Cloning a pool yields another handle to the same accounting.
#[derive(Debug, Clone)]
pub struct FramePool {
    inner: Arc<PoolInner>,
}

fn ceiling(limit: i64) -> Option<usize> {
    if limit <= 0 {
        None
    } else {
        usize::try_from(limit).ok()
    }
}

impl FramePool {
    /// Create a pool.
    ///
    /// A ceiling of zero or below means unlimited.
    pub fn new(max_buffers: i32, max_memory: i64) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                max_buffers: ceiling(i64::from(max_buffers)),
                max_memory: ceiling(max_memory),
                usage: Mutex::new(PoolUsage::default()),
            }),
        }
    }

    /// Pool without ceilings.
    pub fn unlimited() -> Self {
        Self::new(-1, -1)
    }

    #[inline]
    pub fn max_buffers(&self) -> Option<usize> {
        self.inner.max_buffers
    }

    #[inline]
    pub fn max_memory(&self) -> Option<usize> {
        self.inner.max_memory
    }

    /// Current usage
    pub fn usage(&self) -> PoolUsage {
        *self.inner.usage.lock()
    }

    /// Copy `frame` into a new pooled buffer.
    ///
    /// Returns `None` if the copy would exceed a ceiling.
    pub fn duplicate(&self, frame: &Frame) -> Option<PooledFrame> {
        let bytes = frame.byte_len();
        {
            let mut usage = self.inner.usage.lock();
            if self
                .inner
                .max_buffers
                .is_some_and(|max| usage.buffers >= max)
            {
                return None;
            }
            if self
                .inner
                .max_memory
                .is_some_and(|max| usage.bytes.saturating_add(bytes) > max)
            {
                return None;
            }
            usage.buffers += 1;
            usage.bytes += bytes;
        }

        Some(PooledFrame {
            frame: frame.deep_copy(),
            bytes,
            pool: Arc::clone(&self.inner),
        })
    }

    /// Return a copy to the pool.
    ///
    /// Same as dropping it.
    pub fn release(&self, frame: PooledFrame) {
        drop(frame);
    }
}

/// Frame copy owned by a [`FramePool`]
///
/// Its buffer and bytes are returned to the pool on drop.
#[derive(Debug)]
pub struct PooledFrame {
    frame: Frame,
    bytes: usize,
    pool: Arc<PoolInner>,
}

impl Deref for PooledFrame {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        &self.frame
    }
}

impl Drop for PooledFrame {
    fn drop(&mut self) {
        let mut usage = self.pool.usage.lock();
        usage.buffers = usage.buffers.saturating_sub(1);
        usage.bytes = usage.bytes.saturating_sub(self.bytes);
    }
}
