//! In-memory data source for tests
//!
//! Serves the integers `0..total` in pages and records every call. An
//! optional gate holds fetches in flight until the test releases them.

use super::types::{KeySource, OffsetSource, Page, PageNumberSource};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    KeyInitial,
    KeyNext(Option<String>),
    OffsetInitial(u32, u32),
    OffsetNext(u32, u32),
    PageInitial(u32),
    PageNext(u32),
}

pub(crate) struct MockSource {
    total: usize,
    page_size: usize,
    calls: Mutex<Vec<Call>>,
    failures: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    absent_when_empty: bool,
}

impl MockSource {
    /// `total` items; page-number and key fetches return `page_size` items
    pub(crate) fn new(total: usize, page_size: usize) -> Self {
        Self {
            total,
            page_size,
            calls: Mutex::new(Vec::new()),
            failures: AtomicUsize::new(0),
            gate: None,
            absent_when_empty: false,
        }
    }

    /// Hold every fetch until a permit is released
    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Answer `None` instead of an empty page
    pub(crate) fn absent_when_empty(mut self) -> Self {
        self.absent_when_empty = true;
        self
    }

    /// Fail the next `n` fetches
    pub(crate) fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Let `n` gated fetches complete
    pub(crate) fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn serve(&self, call: Call, start: usize, len: usize) -> Result<Page<u32>> {
        self.calls.lock().unwrap().push(call);

        if let Some(gate) = &self.gate {
            gate.acquire().await.map_err(|_| Error::Cancelled)?.forget();
        }

        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::fetch("mock source failure"));
        }

        let end = (start + len).min(self.total);
        let items: Vec<u32> = (start.min(end)..end).map(|i| i as u32).collect();
        if items.is_empty() && self.absent_when_empty {
            Ok(None)
        } else {
            Ok(Some(items))
        }
    }
}

#[async_trait]
impl KeySource<u32> for MockSource {
    async fn load_initial(&self) -> Result<Page<u32>> {
        self.serve(Call::KeyInitial, 0, self.page_size).await
    }

    async fn load_next(&self, key: Option<&str>) -> Result<Page<u32>> {
        let start = key.and_then(|k| k.parse().ok()).unwrap_or(0);
        self.serve(Call::KeyNext(key.map(ToString::to_string)), start, self.page_size)
            .await
    }
}

#[async_trait]
impl OffsetSource<u32> for MockSource {
    async fn load_initial(&self, offset: u32, limit: u32) -> Result<Page<u32>> {
        self.serve(
            Call::OffsetInitial(offset, limit),
            offset as usize,
            limit as usize,
        )
        .await
    }

    async fn load_next(&self, offset: u32, limit: u32) -> Result<Page<u32>> {
        self.serve(Call::OffsetNext(offset, limit), offset as usize, limit as usize)
            .await
    }
}

#[async_trait]
impl PageNumberSource<u32> for MockSource {
    async fn load_initial(&self, page: u32) -> Result<Page<u32>> {
        self.serve(
            Call::PageInitial(page),
            page as usize * self.page_size,
            self.page_size,
        )
        .await
    }

    async fn load_next(&self, page: u32) -> Result<Page<u32>> {
        self.serve(
            Call::PageNext(page),
            page as usize * self.page_size,
            self.page_size,
        )
        .await
    }
}
