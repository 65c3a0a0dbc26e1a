use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

/// Set of watched channel ids, replaced wholesale as an immutable snapshot
#[derive(Debug, Clone, Default)]
pub struct WatchSet {
    channels: Arc<RwLock<Arc<HashSet<String>>>>,
}

impl WatchSet {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: Arc::new(RwLock::new(Arc::new(Self::collect(channels)))),
        }
    }

    fn collect<I, S>(channels: I) -> HashSet<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        channels
            .into_iter()
            .map(|id| {
                let id: String = id.into();
                id.trim().to_string()
            })
            .filter(|id| !id.is_empty())
            .collect()
    }

    /// Swap in a new channel list; readers holding the old snapshot keep it
    pub fn replace<I, S>(&self, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let next = Arc::new(Self::collect(channels));
        *self.channels.write() = next;
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        Arc::clone(&*self.channels.read())
    }

    pub fn contains(&self, channel_id: &str) -> bool {
        self.channels.read().contains(channel_id)
    }

    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }
}
