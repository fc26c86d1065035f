//! In-memory content overlays for unsaved buffers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;
use url::Url;

/// Overlay text for one source, stamped when installed.
#[derive(Debug, Clone)]
pub(crate) struct Overlay {
    pub(crate) text: Arc<str>,
    pub(crate) stamp: SystemTime,
}

/// Overlays keyed by canonical URI.
#[derive(Debug, Default)]
pub(crate) struct OverlayMap {
    entries: RwLock<HashMap<Url, Overlay>>,
}

impl OverlayMap {
    pub(crate) fn get(&self, uri: &Url) -> Option<Overlay> {
        self.entries.read().get(uri).cloned()
    }

    /// Install or remove an overlay, returning the previous text.
    pub(crate) fn set(&self, uri: &Url, contents: Option<String>) -> Option<Arc<str>> {
        let mut entries = self.entries.write();
        let previous = match contents {
            Some(text) => {
                // stamps must move forward even when the clock has not ticked
                let now = SystemTime::now();
                let stamp = match entries.get(uri) {
                    Some(prev) if prev.stamp >= now => prev.stamp + Duration::from_nanos(1),
                    _ => now,
                };
                entries.insert(
                    uri.clone(),
                    Overlay {
                        text: Arc::from(text),
                        stamp,
                    },
                )
            }
            None => entries.remove(uri),
        };
        previous.map(|overlay| overlay.text)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}
