//! Observable ordered collection of decoded images.
//!
//! Mutations are broadcast as [`GalleryEvent`]s on a `tokio::sync::broadcast`
//! channel; any consumer can subscribe independently. When no subscriber is
//! listening, events are silently dropped. Mutation requires `&mut Gallery`,
//! so appends can only ever happen from the single coordinating context that
//! owns the collection.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::assets::ImageAsset;

/// Buffer size for the mutation event channel.
const EVENT_BUFFER: usize = 64;

/// A mutation of the gallery.
#[derive(Debug, Clone)]
pub enum GalleryEvent {
    /// An image was appended at `index`.
    Added { index: usize, item: Arc<ImageAsset> },
    /// The gallery was cleared. Consumers drop any per-item bookkeeping.
    Reset,
}

/// Ordered, append-only (apart from reset) collection of decoded images.
pub struct Gallery {
    items: Vec<Arc<ImageAsset>>,
    events: broadcast::Sender<GalleryEvent>,
}

impl Gallery {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            items: Vec::new(),
            events,
        }
    }

    /// Append a decoded image and return its index. Indices are stable and
    /// monotonically increasing until the next [`reset`](Self::reset).
    pub fn push(&mut self, asset: ImageAsset) -> usize {
        let item = Arc::new(asset);
        let index = self.items.len();
        self.items.push(Arc::clone(&item));
        let _ = self.events.send(GalleryEvent::Added { index, item });
        index
    }

    /// Clear every image. Indices restart from zero afterwards.
    pub fn reset(&mut self) {
        self.items.clear();
        let _ = self.events.send(GalleryEvent::Reset);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The image at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Arc<ImageAsset>> {
        self.items.get(index)
    }

    /// All images in append order.
    pub fn items(&self) -> &[Arc<ImageAsset>] {
        &self.items
    }

    /// Subscribe to mutation events.
    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}
