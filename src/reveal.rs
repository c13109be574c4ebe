//! Staggered reveal of newly appended gallery items.
//!
//! Freshly decoded images should not pop in all at once. The batcher watches
//! the gallery's mutation stream, groups items that arrive in the same
//! scheduling turn, and emits one animation per item with start delays
//! staggered by a fixed interval: a fade from transparent plus a slide in
//! from the side, both on an exponential ease-in curve.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tracing::debug;

use crate::gallery::GalleryEvent;

/// Delay between consecutive items of one batch.
pub const ITEM_INTERVAL: Duration = Duration::from_millis(200);

/// Duration of each item's fade/slide transition.
pub const REVEAL_DURATION: Duration = Duration::from_secs(1);

/// Horizontal offset items slide in from.
const SLIDE_DISTANCE: f64 = 100.0;

/// Easing curve for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Easing {
    /// Exponential ease-in: slow start, sharp finish.
    ExponentialIn { exponent: f64 },
}

impl Easing {
    /// Evaluate the curve at normalized time `t` in `[0, 1]`.
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Self::ExponentialIn { exponent } => {
                let t = t.clamp(0.0, 1.0);
                ((exponent * t).exp() - 1.0) / (exponent.exp() - 1.0)
            }
        }
    }
}

/// One animated property ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub easing: Easing,
}

/// The full reveal animation for a single gallery item. Independent and
/// non-cancelable once dispatched; overlapping batches target disjoint
/// items and coexist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAnimation {
    /// Gallery index of the item being revealed.
    pub index: usize,
    /// Start delay relative to the batch dispatch.
    pub delay: Duration,
    /// Opacity ramp, transparent to opaque.
    pub fade: Transition,
    /// Horizontal offset ramp, down to rest position.
    pub slide: Transition,
}

/// Receives dispatched animations. Implemented by the presentation layer.
pub trait RevealSurface: Send {
    /// Start one item's animation. Must not block.
    fn animate(&mut self, animation: ItemAnimation);
}

/// Batches gallery additions and turns them into staggered animations.
///
/// Idle while the pending list is empty, batching while additions
/// accumulate, and a dispatch drains the whole batch at once. A reset
/// discards pending items without animating them.
#[derive(Debug, Clone)]
pub struct RevealBatcher {
    interval: Duration,
    duration: Duration,
    pending: Vec<usize>,
}

impl RevealBatcher {
    pub fn new(interval: Duration, duration: Duration) -> Self {
        Self {
            interval,
            duration,
            pending: Vec::new(),
        }
    }

    /// Fold one gallery mutation into the pending batch.
    pub fn on_event(&mut self, event: &GalleryEvent) {
        match event {
            GalleryEvent::Added { index, .. } => self.pending.push(*index),
            GalleryEvent::Reset => self.pending.clear(),
        }
    }

    /// True when no items are waiting to be animated.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drain the batch into animations, in enqueue order. The Nth batched
    /// item starts after `(N - 1) * interval`.
    pub fn dispatch(&mut self) -> Vec<ItemAnimation> {
        self.pending
            .drain(..)
            .enumerate()
            .map(|(slot, index)| ItemAnimation {
                index,
                delay: self.interval * slot as u32,
                fade: Transition {
                    from: 0.0,
                    to: 1.0,
                    duration: self.duration,
                    easing: Easing::ExponentialIn { exponent: 10.0 },
                },
                slide: Transition {
                    from: SLIDE_DISTANCE,
                    to: 0.0,
                    duration: self.duration,
                    easing: Easing::ExponentialIn { exponent: 5.0 },
                },
            })
            .collect()
    }
}

impl Default for RevealBatcher {
    fn default() -> Self {
        Self::new(ITEM_INTERVAL, REVEAL_DURATION)
    }
}

/// Drive a [`RevealSurface`] from a gallery event stream.
///
/// Each wake-up folds in every event already queued in the same scheduling
/// turn, then dispatches the accumulated batch. Runs until the gallery (and
/// with it the event channel) is dropped.
pub async fn run<S: RevealSurface>(
    mut events: Receiver<GalleryEvent>,
    mut surface: S,
    mut batcher: RevealBatcher,
) {
    loop {
        match events.recv().await {
            Ok(event) => batcher.on_event(&event),
            Err(RecvError::Lagged(missed)) => {
                debug!("reveal stream lagged, {missed} events dropped");
                continue;
            }
            Err(RecvError::Closed) => break,
        }

        // Everything already queued belongs to this batch.
        loop {
            match events.try_recv() {
                Ok(event) => batcher.on_event(&event),
                Err(TryRecvError::Lagged(missed)) => {
                    debug!("reveal stream lagged, {missed} events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        for animation in batcher.dispatch() {
            surface.animate(animation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageAsset;
    use crate::gallery::Gallery;
    use std::sync::{Arc, Mutex};
    use url::Url;

    fn asset(url: &str) -> ImageAsset {
        ImageAsset::new(Url::parse(url).unwrap(), image::RgbaImage::new(1, 1))
    }

    fn added(index: usize) -> GalleryEvent {
        GalleryEvent::Added {
            index,
            item: Arc::new(asset("http://host/a.png")),
        }
    }

    #[test]
    fn test_dispatch_staggers_delays_by_interval() {
        let mut batcher = RevealBatcher::default();
        for index in 0..4 {
            batcher.on_event(&added(index));
        }

        let animations = batcher.dispatch();
        assert_eq!(animations.len(), 4);
        for (slot, animation) in animations.iter().enumerate() {
            assert_eq!(animation.index, slot);
            assert_eq!(animation.delay, ITEM_INTERVAL * slot as u32);
        }
        assert!(batcher.is_idle());
    }

    #[test]
    fn test_reset_discards_pending_batch() {
        let mut batcher = RevealBatcher::default();
        batcher.on_event(&added(0));
        batcher.on_event(&added(1));
        batcher.on_event(&GalleryEvent::Reset);

        assert!(batcher.is_idle());
        assert!(batcher.dispatch().is_empty());
    }

    #[test]
    fn test_animation_shape() {
        let mut batcher = RevealBatcher::default();
        batcher.on_event(&added(7));
        let animations = batcher.dispatch();

        let animation = &animations[0];
        assert_eq!(animation.index, 7);
        assert_eq!(animation.delay, Duration::ZERO);
        assert_eq!(animation.fade.from, 0.0);
        assert_eq!(animation.fade.to, 1.0);
        assert_eq!(animation.fade.duration, REVEAL_DURATION);
        assert_eq!(animation.slide.from, 100.0);
        assert_eq!(animation.slide.to, 0.0);
    }

    #[test]
    fn test_easing_endpoints_and_monotonicity() {
        let easing = Easing::ExponentialIn { exponent: 10.0 };
        assert!(easing.apply(0.0).abs() < 1e-9);
        assert!((easing.apply(1.0) - 1.0).abs() < 1e-9);

        let mut previous = 0.0;
        for step in 1..=100 {
            let value = easing.apply(step as f64 / 100.0);
            assert!(value >= previous);
            previous = value;
        }
        // Ease-in: the first half covers far less than half the distance.
        assert!(easing.apply(0.5) < 0.1);
    }

    #[test]
    fn test_animation_serialization_roundtrip() {
        let mut batcher = RevealBatcher::default();
        batcher.on_event(&added(3));
        let animation = batcher.dispatch().remove(0);

        let json = serde_json::to_string(&animation).unwrap();
        assert!(json.contains("ExponentialIn"));

        let parsed: ItemAnimation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.index, 3);
        assert_eq!(parsed.fade, animation.fade);
    }

    struct Recording(Arc<Mutex<Vec<ItemAnimation>>>);

    impl RevealSurface for Recording {
        fn animate(&mut self, animation: ItemAnimation) {
            self.0.lock().unwrap().push(animation);
        }
    }

    #[tokio::test]
    async fn test_driver_batches_same_turn_additions() {
        let mut gallery = Gallery::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let driver = tokio::spawn(run(
            gallery.subscribe(),
            Recording(Arc::clone(&seen)),
            RevealBatcher::default(),
        ));

        // All three appends land before the driver first wakes, so they
        // form one batch.
        gallery.push(asset("http://host/a.jpg"));
        gallery.push(asset("http://host/b.png"));
        gallery.push(asset("http://host/c.png"));
        drop(gallery);

        driver.await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        for (slot, animation) in seen.iter().enumerate() {
            assert_eq!(animation.index, slot);
            assert_eq!(animation.delay, ITEM_INTERVAL * slot as u32);
        }
    }

    #[tokio::test]
    async fn test_driver_ignores_items_wiped_by_reset() {
        let mut gallery = Gallery::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let driver = tokio::spawn(run(
            gallery.subscribe(),
            Recording(Arc::clone(&seen)),
            RevealBatcher::default(),
        ));

        gallery.push(asset("http://host/a.jpg"));
        gallery.push(asset("http://host/b.png"));
        gallery.reset();
        drop(gallery);

        driver.await.unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }
}
