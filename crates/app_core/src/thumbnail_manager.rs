//! Thumbnail loading and caching
//!
//! Cells report what they show each frame. A cell has to stay visible for
//! the debounce delay before its thumbnail is queued on the render worker;
//! cells that scroll away first are dropped without ever costing a decode.
//! Each thumbnail fails alone: an error marks that one target as failed.

use crate::config::ThumbnailConfig;
use crate::debounce::Debouncer;
use crate::render::{Priority, RenderEvent, RenderRequest, RenderTarget, RenderWorker, RenderedImage};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub enum ThumbnailState {
    /// Not requested yet, or waiting out the debounce
    Pending,
    Loading,
    Ready(Arc<RenderedImage>),
    /// Shown as a placeholder; never retried
    Failed,
}

impl ThumbnailState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ThumbnailState::Pending | ThumbnailState::Loading)
    }
}

/// Thumbnail manager
pub struct ThumbnailManager {
    worker: RenderWorker,
    reply_tx: Sender<RenderEvent>,
    reply_rx: Receiver<RenderEvent>,
    debouncer: Debouncer<RenderTarget>,
    states: HashMap<RenderTarget, ThumbnailState>,
    /// Ready targets, oldest first
    ready_order: VecDeque<RenderTarget>,
    max_edge: u32,
    capacity: usize,
}

impl ThumbnailManager {
    pub fn new(worker: RenderWorker, config: &ThumbnailConfig) -> Self {
        let (reply_tx, reply_rx) = unbounded();
        Self {
            worker,
            reply_tx,
            reply_rx,
            debouncer: Debouncer::new(config.debounce()),
            states: HashMap::new(),
            ready_order: VecDeque::new(),
            max_edge: config.max_dimension,
            capacity: config.memory_cache_entries.max(1),
        }
    }

    pub fn state(&self, target: &RenderTarget) -> ThumbnailState {
        self.states.get(target).cloned().unwrap_or(ThumbnailState::Pending)
    }

    /// Declare the targets currently on screen. Anything else still waiting
    /// in the debouncer is cancelled.
    pub fn set_visible<I>(&mut self, visible: I, now: Instant)
    where
        I: IntoIterator<Item = RenderTarget>,
    {
        let visible: HashSet<RenderTarget> = visible.into_iter().collect();
        self.debouncer.retain(|t| visible.contains(t));

        for target in visible {
            if !self.states.contains_key(&target) {
                self.debouncer.request(target, now);
            }
        }
    }

    /// Queue debounced targets and collect finished renders.
    /// Returns whether any state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        for target in self.debouncer.poll(now) {
            let request = RenderRequest {
                target: target.clone(),
                max_edge: self.max_edge,
            };
            let state = match self.worker.render(request, Priority::Background, &self.reply_tx) {
                Ok(()) => ThumbnailState::Loading,
                Err(e) => {
                    tracing::warn!("Thumbnail not queued: {}", e);
                    ThumbnailState::Failed
                }
            };
            self.states.insert(target, state);
            changed = true;
        }

        while let Ok(event) = self.reply_rx.try_recv() {
            let RenderEvent::Rendered { request, result } = event else {
                continue;
            };
            // Cleared while in flight
            if !matches!(self.states.get(&request.target), Some(ThumbnailState::Loading)) {
                continue;
            }
            let state = match result {
                Ok(image) => {
                    self.ready_order.push_back(request.target.clone());
                    ThumbnailState::Ready(Arc::new(image))
                }
                Err(_) => ThumbnailState::Failed,
            };
            self.states.insert(request.target, state);
            changed = true;
        }

        self.evict();
        changed
    }

    fn evict(&mut self) {
        while self.ready_order.len() > self.capacity {
            if let Some(old) = self.ready_order.pop_front() {
                self.states.remove(&old);
            }
        }
    }

    /// When the next debounced target becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    pub fn has_work(&self) -> bool {
        !self.debouncer.is_empty()
            || self.states.values().any(|s| matches!(s, ThumbnailState::Loading))
    }

    /// Forget everything (new root folder, reload)
    pub fn clear(&mut self) {
        self.debouncer.clear();
        self.states.clear();
        self.ready_order.clear();
    }

    pub fn cached_count(&self) -> usize {
        self.ready_order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(capacity: usize) -> ThumbnailConfig {
        ThumbnailConfig {
            debounce_ms: 300,
            memory_cache_entries: capacity,
            max_dimension: 64,
        }
    }

    fn png(dir: &Path, name: &str) -> RenderTarget {
        let path = dir.join(name);
        image::RgbaImage::new(8, 8).save(&path).unwrap();
        RenderTarget::Image(path)
    }

    /// Tick until nothing is loading
    fn settle(manager: &mut ThumbnailManager, now: Instant) {
        for _ in 0..500 {
            manager.tick(now);
            if !manager.has_work() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("thumbnails never settled");
    }

    #[test]
    fn test_short_visits_are_cancelled() {
        let dir = TempDir::new().unwrap();
        let a = png(dir.path(), "a.png");
        let mut manager = ThumbnailManager::new(RenderWorker::spawn().unwrap(), &config(10));

        let t0 = Instant::now();
        manager.set_visible([a.clone()], t0);
        manager.tick(t0 + Duration::from_millis(200));
        // Scrolled away before the delay
        manager.set_visible([], t0 + Duration::from_millis(250));
        assert!(!manager.tick(t0 + Duration::from_millis(400)));
        assert!(matches!(manager.state(&a), ThumbnailState::Pending));
        assert!(!manager.has_work());
    }

    #[test]
    fn test_failures_are_isolated() {
        let dir = TempDir::new().unwrap();
        let good = png(dir.path(), "good.png");
        let bad = RenderTarget::Image(dir.path().join("missing.png"));
        let mut manager = ThumbnailManager::new(RenderWorker::spawn().unwrap(), &config(10));

        let t0 = Instant::now();
        manager.set_visible([good.clone(), bad.clone()], t0);
        settle(&mut manager, t0 + Duration::from_millis(300));

        assert!(matches!(manager.state(&good), ThumbnailState::Ready(_)));
        assert!(matches!(manager.state(&bad), ThumbnailState::Failed));

        // Failed targets are not re-requested
        manager.set_visible([bad.clone()], t0 + Duration::from_secs(1));
        assert!(!manager.has_work());
    }

    #[test]
    fn test_cache_is_bounded() {
        let dir = TempDir::new().unwrap();
        let targets: Vec<_> = (0..3).map(|i| png(dir.path(), &format!("{}.png", i))).collect();
        let mut manager = ThumbnailManager::new(RenderWorker::spawn().unwrap(), &config(2));

        let t0 = Instant::now();
        manager.set_visible(targets.clone(), t0);
        settle(&mut manager, t0 + Duration::from_millis(300));

        assert_eq!(manager.cached_count(), 2);
        let ready = targets
            .iter()
            .filter(|t| matches!(manager.state(t), ThumbnailState::Ready(_)))
            .count();
        assert_eq!(ready, 2);
    }
}
