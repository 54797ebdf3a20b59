//! Reference-counted busy indicator.
//!
//! Several overlapping operations may each want the loading indicator on.
//! Each calls [`show`](LoaderCounter::show) when it starts and
//! [`hide`](LoaderCounter::hide) when it ends; the indicator stays visible
//! while at least one of them is running.
//!
//! ```text
//!  show  show  hide  hide  hide
//!    1     2     1     0     0   ← count (never negative)
//!   on    on    on   off   off   ← visible
//! ```
//!
//! Visibility changes are published on a `watch` channel so a UI task can
//! `changed().await` instead of polling.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tracing::trace;

/// A non-negative counter of outstanding "busy" requests.
#[derive(Debug)]
pub struct LoaderCounter {
    count: Mutex<usize>,
    visible: watch::Sender<bool>,
}

impl LoaderCounter {
    pub fn new() -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            count: Mutex::new(0),
            visible,
        }
    }

    /// Adds one request. Returns the visibility afterwards (always `true`).
    pub fn show(&self) -> bool {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        if *count == 1 {
            self.visible.send_replace(true);
            trace!("loader shown");
        }
        true
    }

    /// Removes one request. Returns the visibility afterwards.
    ///
    /// Extra calls once the count is zero are ignored.
    pub fn hide(&self) -> bool {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        match *count {
            0 => {
                trace!("loader hide without matching show, ignored");
                false
            }
            1 => {
                *count = 0;
                self.visible.send_replace(false);
                trace!("loader hidden");
                false
            }
            _ => {
                *count -= 1;
                true
            }
        }
    }

    pub fn count(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Subscribes to visibility changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.subscribe()
    }
}

impl Default for LoaderCounter {
    fn default() -> Self {
        Self::new()
    }
}
