//! Page accumulation for list views.
//!
//! A [`Paginator`] owns the items loaded so far, the next page cursor and an
//! in-flight guard. The fetch itself is supplied per call, so one type serves
//! every list endpoint:
//!
//! ```no_run
//! use libris_client::{LibrisClient, ListUsersQuery, Paginator};
//!
//! # async fn example(client: LibrisClient) -> libris_client::Result<()> {
//! let users = Paginator::new(20);
//! let query = ListUsersQuery::default();
//! while users.has_more() {
//!     users
//!         .load_next(|page, limit| {
//!             let (client, query) = (&client, &query);
//!             async move { client.admin().users(query, page, limit).await.map(|p| p.items) }
//!         })
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use parking_lot::Mutex;

use crate::error::Result;

/// Whether a fetch is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
}

/// What a call to [`Paginator::load_next`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived and was applied.
    Loaded { count: usize },
    /// Another fetch was already in flight; nothing was requested.
    Busy,
    /// The last page was short; nothing was requested.
    Exhausted,
    /// A `reset` happened while this page was in flight; it was dropped.
    Discarded,
}

#[derive(Debug)]
struct PageState<T> {
    items: Vec<T>,
    cursor: u32,
    has_more: bool,
    load: LoadState,
    /// Bumped by `reset` so a page fetched before it is not applied after it.
    generation: u64,
}

impl<T> PageState<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: 1,
            has_more: true,
            load: LoadState::Idle,
            generation: 0,
        }
    }
}

/// Cursor, accumulated items and in-flight guard for one list.
#[derive(Debug)]
pub struct Paginator<T> {
    limit: u32,
    state: Mutex<PageState<T>>,
}

/// Returns the paginator to `Idle` however the fetch ends, including the
/// caller dropping the future.
struct LoadingGuard<'a, T> {
    paginator: &'a Paginator<T>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.paginator.state.lock().load = LoadState::Idle;
    }
}

impl<T> Paginator<T> {
    /// A paginator requesting `limit` items per page. A zero limit is
    /// treated as one.
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            state: Mutex::new(PageState::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// The page the next `load_next` will request.
    pub fn cursor(&self) -> u32 {
        self.state.lock().cursor
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().load == LoadState::Loading
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Back to page one with no items.
    ///
    /// A fetch still in flight is not cancelled. Its page is discarded when
    /// it lands, and until then `load_next` keeps returning `Busy`.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        state.items.clear();
        state.cursor = 1;
        state.has_more = true;
    }

    /// Fetch the page at the cursor and apply it.
    ///
    /// Does nothing while another fetch is in flight or after a short page.
    /// Page one replaces the items; later pages append in order. On error
    /// the cursor and items are left as they were.
    pub async fn load_next<F, Fut>(&self, fetch: F) -> Result<LoadOutcome>
    where
        F: FnOnce(u32, u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let (cursor, generation) = {
            let mut state = self.state.lock();
            if state.load == LoadState::Loading {
                return Ok(LoadOutcome::Busy);
            }
            if !state.has_more {
                return Ok(LoadOutcome::Exhausted);
            }
            state.load = LoadState::Loading;
            (state.cursor, state.generation)
        };
        let _guard = LoadingGuard { paginator: self };

        tracing::debug!(page = cursor, limit = self.limit, "loading page");
        let page = fetch(cursor, self.limit).await?;

        let mut state = self.state.lock();
        if state.generation != generation {
            return Ok(LoadOutcome::Discarded);
        }
        let count = page.len();
        state.has_more = count == self.limit as usize;
        if cursor == 1 {
            state.items = page;
        } else {
            state.items.extend(page);
        }
        state.cursor = cursor + 1;
        Ok(LoadOutcome::Loaded { count })
    }
}

impl<T: Clone> Paginator<T> {
    /// Snapshot of every item loaded so far.
    pub fn items(&self) -> Vec<T> {
        self.state.lock().items.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::Error;

    /// Items `[(page - 1) * limit, page * limit)`, truncated to `total`.
    fn numbered(page: u32, limit: u32, total: u32) -> Vec<u32> {
        let start = (page - 1) * limit;
        (start..(start + limit).min(total)).collect()
    }

    #[tokio::test]
    async fn test_full_pages_accumulate() {
        let pager = Paginator::new(3);
        for _ in 0..4 {
            let outcome = pager
                .load_next(|page, limit| async move { Ok(numbered(page, limit, 100)) })
                .await
                .unwrap();
            assert_eq!(outcome, LoadOutcome::Loaded { count: 3 });
        }

        assert_eq!(pager.len(), 12);
        assert!(pager.has_more());
        assert_eq!(pager.cursor(), 5);
        assert_eq!(pager.items(), (0..12).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_short_page_stops_fetching() {
        let pager = Paginator::new(5);
        let calls = AtomicUsize::new(0);
        let fetch = |page: u32, limit: u32| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(numbered(page, limit, 7)) }
        };

        pager.load_next(fetch).await.unwrap();
        let second = pager.load_next(fetch).await.unwrap();
        assert_eq!(second, LoadOutcome::Loaded { count: 2 });
        assert!(!pager.has_more());

        let third = pager.load_next(fetch).await.unwrap();
        assert_eq!(third, LoadOutcome::Exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(pager.len(), 7);
    }

    #[tokio::test]
    async fn test_concurrent_calls_fetch_once() {
        let pager = Paginator::new(2);
        let calls = AtomicUsize::new(0);
        let fetch = |page: u32, limit: u32| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(numbered(page, limit, 10))
            }
        };

        let (first, second) = tokio::join!(pager.load_next(fetch), pager.load_next(fetch));

        assert_eq!(first.unwrap(), LoadOutcome::Loaded { count: 2 });
        assert_eq!(second.unwrap(), LoadOutcome::Busy);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!pager.is_loading());
    }

    #[tokio::test]
    async fn test_reset_replaces_from_page_one() {
        let pager = Paginator::new(2);
        pager
            .load_next(|page, limit| async move { Ok(numbered(page, limit, 3)) })
            .await
            .unwrap();
        pager
            .load_next(|page, limit| async move { Ok(numbered(page, limit, 3)) })
            .await
            .unwrap();
        assert!(!pager.has_more());

        pager.reset();
        assert_eq!(pager.cursor(), 1);
        assert!(pager.has_more());
        assert!(pager.is_empty());

        pager
            .load_next(|page, _| async move {
                assert_eq!(page, 1);
                Ok(vec![40, 41])
            })
            .await
            .unwrap();
        assert_eq!(pager.items(), vec![40, 41]);
    }

    #[tokio::test]
    async fn test_failure_clears_loading_and_keeps_cursor() {
        let pager: Paginator<u32> = Paginator::new(2);
        let err = pager
            .load_next(|_, _| async { Err(Error::Config("boom".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!pager.is_loading());
        assert_eq!(pager.cursor(), 1);

        let outcome = pager
            .load_next(|page, limit| async move { Ok(numbered(page, limit, 10)) })
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { count: 2 });
    }

    #[tokio::test]
    async fn test_dropped_future_clears_loading() {
        let pager: Paginator<u32> = Paginator::new(2);
        {
            let pending = pager.load_next(|_, _| std::future::pending::<Result<Vec<u32>>>());
            let timed_out = tokio::time::timeout(Duration::from_millis(10), pending).await;
            assert!(timed_out.is_err());
        }
        assert!(!pager.is_loading());
        assert_eq!(pager.cursor(), 1);
    }

    #[tokio::test]
    async fn test_reset_during_fetch_discards_page() {
        let pager = Paginator::new(2);
        let load = pager.load_next(|page, limit| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(numbered(page, limit, 10))
        });
        let reset = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            pager.reset();
        };

        let (outcome, ()) = tokio::join!(load, reset);
        assert_eq!(outcome.unwrap(), LoadOutcome::Discarded);
        assert!(pager.is_empty());
        assert_eq!(pager.cursor(), 1);
        assert!(!pager.is_loading());
    }

    #[tokio::test]
    async fn test_reset_during_fetch_stays_busy() {
        let pager = Paginator::new(2);
        let calls = AtomicUsize::new(0);
        let in_flight = AtomicUsize::new(0);
        let max_in_flight = AtomicUsize::new(0);
        let fetch = |page: u32, limit: u32| {
            calls.fetch_add(1, Ordering::SeqCst);
            let (in_flight, max_in_flight) = (&in_flight, &max_in_flight);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(numbered(page, limit, 10))
            }
        };

        let second = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            pager.reset();
            pager.load_next(fetch).await
        };
        let (first, second) = tokio::join!(pager.load_next(fetch), second);

        assert_eq!(first.unwrap(), LoadOutcome::Discarded);
        assert_eq!(second.unwrap(), LoadOutcome::Busy);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert!(!pager.is_loading());

        let outcome = pager.load_next(fetch).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { count: 2 });
        assert_eq!(pager.items(), vec![0, 1]);
    }
}
