use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::LifecycleError;

#[derive(Debug)]
enum BufferState<T> {
    Idle,
    Open(Vec<T>),
    Closed(Arc<[T]>),
}

/// Ordered store of everything observed during one instrumentation window.
///
/// Opened and closed once. While open, events are kept in arrival order; outside the
/// window they are discarded without error, since late deliveries do happen.
#[derive(Debug)]
pub struct EventBuffer<T> {
    state: BufferState<T>,
    discarded: usize,
}

impl<T> Default for EventBuffer<T> {
    fn default() -> Self {
        Self {
            state: BufferState::Idle,
            discarded: 0,
        }
    }
}

impl<T> EventBuffer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            BufferState::Idle => {
                self.state = BufferState::Open(Vec::new());
                Ok(())
            }
            BufferState::Open(_) => Err(LifecycleError::BufferAlreadyOpen),
            BufferState::Closed(_) => Err(LifecycleError::BufferReused),
        }
    }

    /// Returns whether the event was kept.
    pub fn record(&mut self, event: T) -> bool {
        match &mut self.state {
            BufferState::Open(events) => {
                events.push(event);
                true
            }
            _ => {
                self.discarded += 1;
                false
            }
        }
    }

    /// Freezes the window. Later reads go through [`EventBuffer::frozen`].
    pub fn close(&mut self) -> Result<Arc<[T]>, LifecycleError> {
        match std::mem::replace(&mut self.state, BufferState::Idle) {
            BufferState::Open(events) => {
                let frozen: Arc<[T]> = Arc::from(events);
                self.state = BufferState::Closed(frozen.clone());
                Ok(frozen)
            }
            previous => {
                self.state = previous;
                Err(LifecycleError::BufferNotOpen)
            }
        }
    }

    /// Drops an open window's events and returns to idle so the buffer can open again.
    /// A closed buffer keeps its frozen sequence.
    pub fn abandon(&mut self) {
        if let BufferState::Open(events) = &self.state {
            self.discarded += events.len();
            self.state = BufferState::Idle;
        }
    }

    pub fn frozen(&self) -> Option<Arc<[T]>> {
        match &self.state {
            BufferState::Closed(events) => Some(events.clone()),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, BufferState::Open(_))
    }

    /// Events delivered outside the window.
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

/// Handle shared between a collector and the transport handler feeding it.
#[derive(Debug)]
pub struct SharedEventBuffer<T>(Arc<Mutex<EventBuffer<T>>>);

impl<T> Clone for SharedEventBuffer<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Default for SharedEventBuffer<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(EventBuffer::new())))
    }
}

impl<T> SharedEventBuffer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EventBuffer<T>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self) -> Result<(), LifecycleError> {
        self.lock().open()
    }

    pub fn record(&self, event: T) -> bool {
        let kept = self.lock().record(event);
        if !kept {
            debug!("Discarded event delivered outside the instrumentation window");
        }
        kept
    }

    pub fn close(&self) -> Result<Arc<[T]>, LifecycleError> {
        self.lock().close()
    }

    pub fn abandon(&self) {
        self.lock().abandon()
    }

    pub fn frozen(&self) -> Option<Arc<[T]>> {
        self.lock().frozen()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    pub fn discarded(&self) -> usize {
        self.lock().discarded()
    }
}
