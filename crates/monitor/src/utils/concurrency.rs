// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Concurrency utilities for bounded fan-out and per-key serialization.

use futures::stream::FuturesUnordered;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedMutexGuard, Semaphore};

/// Runs at most `max_concurrent` tasks at once, running the next tasks only
/// when currently running ones finish and free up space.
///
/// Returns a [`futures::Stream`] of results in completion order.
pub fn run_with_concurrency<F, O>(
    max_concurrent: usize,
    tasks: impl IntoIterator<Item = F>,
) -> impl futures::Stream<Item = O>
where
    F: Future<Output = O>,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let futs = FuturesUnordered::new();

    for task in tasks {
        let sem = semaphore.clone();
        futs.push(async move {
            // The semaphore is never closed, so a permit is always granted.
            let _permit = sem.acquire().await.ok();
            task.await
        });
    }

    futs
}

/// Async mutex per key. Holders of the same key run one at a time; distinct
/// keys never contend.
#[derive(Debug)]
pub struct KeyedMutex<K> {
    locks: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
}

impl<K> Default for KeyedMutex<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedMutex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(key.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
