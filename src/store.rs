//! Lyrics document store
//!
//! Async fetch of [`LyricsDocument`]s from an external data collaborator,
//! with a per-song cache. The cache is an explicit object owned by whoever
//! composes the engine, not process-global state: bounded capacity with
//! oldest-first eviction, explicit invalidation of one or all entries, and
//! collapsing of concurrent fetches for the same key into a single in-flight
//! request.
//!
//! Lyrics are an enhancement, not a playback precondition: a fetch error
//! propagates once to the caller, nothing is cached, and a later call simply
//! retries.

use anyhow::Result;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::types::LyricsDocument;

/// The opaque external collaborator that produces lyrics documents. May be
/// backed by a database, a REST call, or a bundled fallback dataset.
#[async_trait::async_trait]
pub trait LyricsSource: Send + Sync {
    /// Fetch the document for a song; `Ok(None)` means the song has no
    /// synchronized lyrics, which is a normal state.
    async fn fetch(&self, song_id: &str) -> Result<Option<LyricsDocument>>;
}

/// One cache slot. The cell resolves at most once per slot, so concurrent
/// callers for the same song await the same fetch.
type Slot = Arc<OnceCell<Option<Arc<LyricsDocument>>>>;

#[derive(Default)]
struct Inner {
    slots: HashMap<String, Slot>,
    /// Insertion order, oldest first, for eviction
    order: VecDeque<String>,
}

/// Keyed cache over a [`LyricsSource`], at most one cached document per
/// song id. Documents are immutable once fetched and handed out as
/// `Arc`-shared references.
pub struct LyricsStore<S> {
    source: S,
    max_entries: usize,
    inner: Mutex<Inner>,
}

/// Default cache capacity; enough for a listening session's worth of songs.
pub const DEFAULT_MAX_ENTRIES: usize = 64;

impl<S: LyricsSource> LyricsStore<S> {
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(source: S, max_entries: usize) -> Self {
        Self {
            source,
            max_entries: max_entries.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Get the document for a song, fetching it on first use.
    ///
    /// Concurrent calls for the same id share one in-flight fetch. A
    /// `None` result is returned but not cached, matching a fetch failure:
    /// the next call asks the source again.
    pub async fn get(&self, song_id: &str) -> Result<Option<Arc<LyricsDocument>>> {
        let slot = self.slot_for(song_id);

        let outcome = slot
            .get_or_try_init(|| async {
                tracing::debug!("Fetching lyrics for song {}", song_id);
                self.source
                    .fetch(song_id)
                    .await
                    .map(|doc| doc.map(Arc::new))
            })
            .await;

        match outcome {
            Ok(Some(doc)) => Ok(Some(doc.clone())),
            Ok(None) => {
                self.drop_slot(song_id, &slot);
                Ok(None)
            }
            Err(err) => {
                tracing::warn!("Lyrics fetch failed for song {}: {}", song_id, err);
                self.drop_slot(song_id, &slot);
                Err(err)
            }
        }
    }

    /// Peek at the cache without fetching.
    pub fn cached(&self, song_id: &str) -> Option<Arc<LyricsDocument>> {
        let inner = self.inner.lock();
        inner
            .slots
            .get(song_id)
            .and_then(|slot| slot.get().cloned())
            .flatten()
    }

    /// Evict one song.
    pub fn invalidate(&self, song_id: &str) {
        let mut inner = self.inner.lock();
        if inner.slots.remove(song_id).is_some() {
            inner.order.retain(|id| id != song_id);
        }
    }

    /// Evict everything.
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock();
        inner.slots.clear();
        inner.order.clear();
    }

    /// Number of slots currently held (resolved or in flight).
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get or create the slot for a key, evicting the oldest entries when
    /// the map is full.
    fn slot_for(&self, song_id: &str) -> Slot {
        let mut inner = self.inner.lock();
        if let Some(slot) = inner.slots.get(song_id) {
            return slot.clone();
        }

        while inner.slots.len() >= self.max_entries {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.slots.remove(&oldest);
            tracing::debug!("Evicted cached lyrics for song {}", oldest);
        }

        let slot: Slot = Arc::new(OnceCell::new());
        inner.slots.insert(song_id.to_string(), slot.clone());
        inner.order.push_back(song_id.to_string());
        slot
    }

    /// Remove a slot that resolved to nothing (or failed), but only if the
    /// map still holds this exact slot; a concurrent invalidate-and-refetch
    /// may have replaced it.
    fn drop_slot(&self, song_id: &str, slot: &Slot) {
        let mut inner = self.inner.lock();
        if inner
            .slots
            .get(song_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            inner.slots.remove(song_id);
            inner.order.retain(|id| id != song_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LyricLine;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    enum Behavior {
        Found,
        Missing,
        FailFirst(AtomicBool),
        SlowFound(Duration),
    }

    struct FakeSource {
        calls: AtomicUsize,
        behavior: Behavior,
    }

    impl FakeSource {
        fn new(behavior: Behavior) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                behavior,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn document(song_id: &str) -> LyricsDocument {
            LyricsDocument {
                song_id: song_id.to_string(),
                lines: vec![LyricLine::new(0, "hola")],
                ..Default::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl LyricsSource for FakeSource {
        async fn fetch(&self, song_id: &str) -> Result<Option<LyricsDocument>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Found => Ok(Some(Self::document(song_id))),
                Behavior::Missing => Ok(None),
                Behavior::FailFirst(failed) => {
                    if failed.swap(true, Ordering::SeqCst) {
                        Ok(Some(Self::document(song_id)))
                    } else {
                        anyhow::bail!("backend unavailable")
                    }
                }
                Behavior::SlowFound(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(Some(Self::document(song_id)))
                }
            }
        }
    }

    #[tokio::test]
    async fn test_second_get_hits_the_cache() {
        let store = LyricsStore::new(FakeSource::new(Behavior::Found));

        let first = store.get("song-1").await.unwrap().unwrap();
        let second = store.get("song-1").await.unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.source.calls(), 1);
        assert!(store.cached("song-1").is_some());
    }

    #[tokio::test]
    async fn test_concurrent_gets_share_one_fetch() {
        let store = LyricsStore::new(FakeSource::new(Behavior::SlowFound(
            Duration::from_millis(20),
        )));

        let (a, b) = tokio::join!(store.get("song-1"), store.get("song-1"));
        assert!(a.unwrap().is_some());
        assert!(b.unwrap().is_some());
        assert_eq!(store.source.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_lyrics_are_not_cached() {
        let store = LyricsStore::new(FakeSource::new(Behavior::Missing));

        assert!(store.get("song-1").await.unwrap().is_none());
        assert!(store.get("song-1").await.unwrap().is_none());

        // No lyrics is a normal state, but nothing is pinned in the cache
        assert_eq!(store.source.calls(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_once_then_retries() {
        let store = LyricsStore::new(FakeSource::new(Behavior::FailFirst(AtomicBool::new(
            false,
        ))));

        assert!(store.get("song-1").await.is_err());
        assert!(store.cached("song-1").is_none());

        // The failure cached nothing; the retry reaches the source again
        assert!(store.get("song-1").await.unwrap().is_some());
        assert_eq!(store.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let store = LyricsStore::new(FakeSource::new(Behavior::Found));

        store.get("song-1").await.unwrap();
        store.invalidate("song-1");
        store.get("song-1").await.unwrap();

        assert_eq!(store.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_every_entry() {
        let store = LyricsStore::new(FakeSource::new(Behavior::Found));

        store.get("song-1").await.unwrap();
        store.get("song-2").await.unwrap();
        assert_eq!(store.len(), 2);

        store.invalidate_all();
        assert!(store.is_empty());
        assert!(store.cached("song-1").is_none());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_first() {
        let store = LyricsStore::with_capacity(FakeSource::new(Behavior::Found), 2);

        store.get("song-1").await.unwrap();
        store.get("song-2").await.unwrap();
        store.get("song-3").await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.cached("song-1").is_none());
        assert!(store.cached("song-3").is_some());

        // The evicted song refetches on demand
        store.get("song-1").await.unwrap();
        assert_eq!(store.source.calls(), 4);
    }
}
