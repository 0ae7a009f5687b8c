use crate::url::normalize_parsed;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Normalized URL to fetch
    pub url: Url,

    /// Number of fetch attempts made so far
    pub attempts: u32,

    /// Discovery sequence number, increasing in enqueue order
    pub seq: u64,
}

#[derive(Debug, Default)]
struct FrontierInner {
    visited: HashSet<String>,
    pending: VecDeque<CrawlTask>,
    in_flight: usize,
    next_seq: u64,
}

/// De-duplicated FIFO of URLs to crawl
///
/// A URL is marked visited at enqueue time, so two workers discovering the
/// same link race on a single lock and exactly one of them wins. The visited
/// set therefore covers pending, in-flight and finished URLs alike.
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a URL to the pending queue
    ///
    /// Returns false, without touching the queue, if the URL was already
    /// seen in this run or cannot be crawled (non-HTTP scheme, no host).
    pub fn enqueue(&self, url: Url) -> bool {
        let url = match normalize_parsed(url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Not enqueuing URL: {}", e);
                return false;
            }
        };

        let mut inner = self.lock();
        if !inner.visited.insert(url.as_str().to_string()) {
            tracing::trace!("Already seen: {}", url);
            return false;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        tracing::trace!("Enqueued #{}: {}", seq, url);
        inner.pending.push_back(CrawlTask {
            url,
            attempts: 0,
            seq,
        });
        true
    }

    /// Takes the oldest pending task
    ///
    /// The task counts as in flight until [`Frontier::finish`] is called.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> Option<CrawlTask> {
        let mut inner = self.lock();
        let task = inner.pending.pop_front()?;
        inner.in_flight += 1;
        Some(task)
    }

    /// Marks a dispatched task as done, whatever its outcome
    pub fn finish(&self, task: &CrawlTask) {
        let mut inner = self.lock();
        if inner.in_flight == 0 {
            tracing::warn!("finish() called with no task in flight: {}", task.url);
            return;
        }
        inner.in_flight -= 1;
    }

    /// Claims the page a task landed on after redirects
    ///
    /// Returns true when `landed` is the task's own URL, or when it was not
    /// seen before and is now marked visited. False means some other task
    /// already owns that page.
    pub fn claim(&self, task: &CrawlTask, landed: &Url) -> bool {
        let Ok(landed) = normalize_parsed(landed.clone()) else {
            return false;
        };
        if landed == task.url {
            return true;
        }

        let claimed = self.lock().visited.insert(landed.as_str().to_string());
        if !claimed {
            tracing::trace!("{} landed on already seen {}", task.url, landed);
        }
        claimed
    }

    /// True when nothing is pending and nothing is in flight
    pub fn is_complete(&self) -> bool {
        let inner = self.lock();
        inner.pending.is_empty() && inner.in_flight == 0
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Number of distinct URLs accepted so far
    pub fn visited_len(&self) -> usize {
        self.lock().visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_claim_redirect_target() {
        let frontier = Frontier::new();
        frontier.enqueue(url("http://a.com/shirt.php?id=1"));
        frontier.enqueue(url("http://a.com/shirt.php?id=2"));
        let first = frontier.next().unwrap();

        // Landing on its own URL, even with a fragment, is always fine
        assert!(frontier.claim(&first, &url("http://a.com/shirt.php?id=1#top")));

        // id=2 is already queued, so a redirect onto it is a duplicate
        assert!(!frontier.claim(&first, &url("http://a.com/shirt.php?id=2")));

        // A fresh target is claimed once and blocks later discovery
        assert!(frontier.claim(&first, &url("http://a.com/shirt.php?id=3")));
        assert!(!frontier.enqueue(url("http://a.com/shirt.php?id=3")));
        assert_eq!(frontier.visited_len(), 3);
    }

    #[test]
    fn test_new_frontier_is_complete() {
        let frontier = Frontier::new();
        assert!(frontier.is_complete());
        assert!(frontier.next().is_none());
    }

    #[test]
    fn test_fifo_order() {
        let frontier = Frontier::new();
        frontier.enqueue(url("http://a.com/1"));
        frontier.enqueue(url("http://a.com/2"));
        frontier.enqueue(url("http://a.com/3"));

        let order: Vec<String> = std::iter::from_fn(|| frontier.next())
            .map(|t| t.url.path().to_string())
            .collect();
        assert_eq!(order, vec!["/1", "/2", "/3"]);
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let frontier = Frontier::new();
        frontier.enqueue(url("http://a.com/1"));
        frontier.enqueue(url("http://a.com/2"));

        assert_eq!(frontier.next().unwrap().seq, 0);
        assert_eq!(frontier.next().unwrap().seq, 1);
    }

    #[test]
    fn test_duplicate_enqueue_is_noop() {
        let frontier = Frontier::new();
        assert!(frontier.enqueue(url("http://a.com/shirt.php?id=1")));
        assert!(!frontier.enqueue(url("http://a.com/shirt.php?id=1")));
        assert!(!frontier.enqueue(url("http://A.com/shirt.php?id=1#top")));

        assert_eq!(frontier.pending_len(), 1);
        assert_eq!(frontier.visited_len(), 1);
    }

    #[test]
    fn test_no_refetch_after_dispatch() {
        let frontier = Frontier::new();
        frontier.enqueue(url("http://a.com/x"));
        let task = frontier.next().unwrap();
        frontier.finish(&task);

        assert!(!frontier.enqueue(url("http://a.com/x")));
        assert!(frontier.next().is_none());
    }

    #[test]
    fn test_rejects_non_http() {
        let frontier = Frontier::new();
        assert!(!frontier.enqueue(url("mailto:a@b.com")));
        assert!(frontier.is_complete());
    }

    #[test]
    fn test_in_flight_blocks_completion() {
        let frontier = Frontier::new();
        frontier.enqueue(url("http://a.com/x"));

        let task = frontier.next().unwrap();
        assert_eq!(frontier.pending_len(), 0);
        assert_eq!(frontier.in_flight(), 1);
        assert!(!frontier.is_complete());

        frontier.finish(&task);
        assert!(frontier.is_complete());
    }

    #[test]
    fn test_cyclic_graph_terminates() {
        // a -> b -> a: the second discovery of `a` is rejected
        let frontier = Frontier::new();
        frontier.enqueue(url("http://a.com/a"));

        let mut fetched = 0;
        while let Some(task) = frontier.next() {
            fetched += 1;
            let next = if task.url.path() == "/a" { "/b" } else { "/a" };
            frontier.enqueue(task.url.join(next).unwrap());
            frontier.finish(&task);
            assert!(fetched <= 2, "cycle was not cut");
        }

        assert_eq!(fetched, 2);
        assert!(frontier.is_complete());
    }

    #[test]
    fn test_concurrent_enqueue_single_winner() {
        let frontier = Arc::new(Frontier::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                std::thread::spawn(move || frontier.enqueue(url("http://a.com/shirt.php?id=9")))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(frontier.pending_len(), 1);
    }
}
