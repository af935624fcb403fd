//! Downstream frame consumers

use roistat_core::Frame;
use std::fmt;
use std::sync::Arc;

/// Consumer of forwarded frames
pub type ArrayCallback = dyn Fn(&Frame) + Send + Sync;

/// Registered downstream consumers, called in registration order
#[derive(Clone, Default)]
pub struct ArrayCallbacks {
    consumers: Vec<Arc<ArrayCallback>>,
}

impl ArrayCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a consumer.
    pub fn register<F>(&mut self, consumer: F)
    where
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        self.consumers.push(Arc::new(consumer));
    }

    /// Deliver `frame` to every consumer.
    pub fn call(&self, frame: &Frame) {
        for consumer in &self.consumers {
            consumer(frame);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}

impl fmt::Debug for ArrayCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayCallbacks")
            .field("consumers", &self.consumers.len())
            .finish()
    }
}
