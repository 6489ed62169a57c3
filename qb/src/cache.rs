//! Prefetch cache for quiz and training material
//!
//! Quizzes are keyed by task position on the board, training by the task's
//! objective text. An entry, once present, is used verbatim until it is
//! explicitly invalidated; nothing expires on a timer. Only successful
//! fetches are stored, so a failed prefetch leaves the key empty and the next
//! on-demand access fetches again.
//!
//! Concurrent misses on the same key are not merged: both fetches go out and
//! the later write wins, which is harmless since payloads for one key are
//! interchangeable within one plan.
//!
//! Keys are only meaningful for the board they were fetched against. `clear`
//! starts a new epoch, and a fetch that began under an older epoch is returned
//! to its caller but never stored.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{ClientError, QuestApi};
use crate::domain::{QuizPayload, TrainingPayload};

/// Snapshot of cache counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub quizzes: usize,
    pub trainings: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct CacheInner {
    quizzes: RwLock<HashMap<usize, QuizPayload>>,
    trainings: RwLock<HashMap<String, TrainingPayload>>,
    hits: AtomicU64,
    misses: AtomicU64,
    epoch: AtomicU64,
}

/// Shared handle to the cache; clones see the same entries
#[derive(Clone, Default)]
pub struct PrefetchCache {
    inner: Arc<CacheInner>,
}

impl PrefetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached quiz for `index`, fetching it with `role` on a miss
    pub async fn get_or_fetch_quiz(
        &self,
        api: &dyn QuestApi,
        index: usize,
        role: &str,
    ) -> Result<QuizPayload, ClientError> {
        debug!(index, %role, "get_or_fetch_quiz: called");
        if let Some(quiz) = self.inner.quizzes.read().await.get(&index) {
            debug!(index, "get_or_fetch_quiz: hit");
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(quiz.clone());
        }

        debug!(index, "get_or_fetch_quiz: miss, fetching");
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        let epoch = self.epoch();
        let quiz = api.start_quiz(index, role).await?;
        self.store_quiz(epoch, index, quiz.clone()).await;
        Ok(quiz)
    }

    /// Cached training for `objective`, fetching it on a miss
    pub async fn get_or_fetch_training(
        &self,
        api: &dyn QuestApi,
        objective: &str,
    ) -> Result<TrainingPayload, ClientError> {
        debug!(%objective, "get_or_fetch_training: called");
        if let Some(training) = self.inner.trainings.read().await.get(objective) {
            debug!(%objective, "get_or_fetch_training: hit");
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(training.clone());
        }

        debug!(%objective, "get_or_fetch_training: miss, fetching");
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        let epoch = self.epoch();
        let training = api.train(objective).await?;
        self.store_training(epoch, objective.to_string(), training.clone()).await;
        Ok(training)
    }

    /// Drop the quiz for `index`; the next access refetches fresh questions
    ///
    /// Returns whether an entry was present.
    pub async fn invalidate_quiz(&self, index: usize) -> bool {
        let removed = self.inner.quizzes.write().await.remove(&index).is_some();
        debug!(index, removed, "invalidate_quiz: called");
        removed
    }

    /// Speculatively fetch the quiz for `index` in the background
    ///
    /// Skips the fetch if the entry is already cached. Failures are logged and
    /// leave the cache untouched.
    pub fn warm(&self, api: Arc<dyn QuestApi>, index: usize, role: String) -> JoinHandle<()> {
        debug!(index, %role, "warm: called");
        let cache = self.clone();
        let epoch = self.epoch();
        tokio::spawn(async move {
            if cache.contains_quiz(index).await {
                debug!(index, "warm: quiz already cached");
                return;
            }
            match api.start_quiz(index, &role).await {
                Ok(quiz) => {
                    if cache.store_quiz(epoch, index, quiz).await {
                        debug!(index, "warm: quiz cached");
                    }
                }
                Err(e) => {
                    warn!(index, error = %e, "warm: quiz prefetch failed");
                }
            }
        })
    }

    /// Speculatively fetch training for `objective` in the background
    pub fn warm_training(&self, api: Arc<dyn QuestApi>, objective: String) -> JoinHandle<()> {
        debug!(%objective, "warm_training: called");
        let cache = self.clone();
        let epoch = self.epoch();
        tokio::spawn(async move {
            if cache.contains_training(&objective).await {
                debug!(%objective, "warm_training: training already cached");
                return;
            }
            match api.train(&objective).await {
                Ok(training) => {
                    if cache.store_training(epoch, objective.clone(), training).await {
                        debug!(%objective, "warm_training: training cached");
                    }
                }
                Err(e) => {
                    warn!(%objective, error = %e, "warm_training: training prefetch failed");
                }
            }
        })
    }

    pub async fn contains_quiz(&self, index: usize) -> bool {
        self.inner.quizzes.read().await.contains_key(&index)
    }

    pub async fn contains_training(&self, objective: &str) -> bool {
        self.inner.trainings.read().await.contains_key(objective)
    }

    /// Forget everything, e.g. when a new plan replaces the board
    ///
    /// Fetches still in flight from before the clear will not be stored.
    pub async fn clear(&self) {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(epoch, "clear: called");
        self.inner.quizzes.write().await.clear();
        self.inner.trainings.write().await.clear();
    }

    fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Insert unless the cache was cleared since `epoch`; checked under the write lock
    async fn store_quiz(&self, epoch: u64, index: usize, quiz: QuizPayload) -> bool {
        let mut quizzes = self.inner.quizzes.write().await;
        if self.epoch() != epoch {
            debug!(index, epoch, "store_quiz: stale fetch, dropping");
            return false;
        }
        quizzes.insert(index, quiz);
        true
    }

    async fn store_training(&self, epoch: u64, objective: String, training: TrainingPayload) -> bool {
        let mut trainings = self.inner.trainings.write().await;
        if self.epoch() != epoch {
            debug!(%objective, epoch, "store_training: stale fetch, dropping");
            return false;
        }
        trainings.insert(objective, training);
        true
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            quizzes: self.inner.quizzes.read().await.len(),
            trainings: self.inner.trainings.read().await.len(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
        }
    }
}
