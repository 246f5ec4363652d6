//! The pagination driver.
//!
//! Pages are requested in order starting at 1. The driver stops at the first
//! of: an empty page, the last page announced by `pageCount`, or a failed
//! request. A failure mid-way keeps what was already collected.

use std::time::Duration;

use tracing::{info, warn};

use crate::{
  endpoints::Listing,
  fetch::Fetch,
  payload::{AthleteStub, ListingPage},
};

/// Everything collected from one listing walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
  pub stubs:              Vec<AthleteStub>,
  /// Pages that returned a readable body, including a final empty page.
  pub pages:              u32,
  /// Items dropped because they could not be read as an athlete.
  pub malformed:          usize,
  /// `true` when a request failure ended the walk.
  pub stopped_on_failure: bool,
}

pub async fn fetch_all<F: Fetch>(fetcher: &F, listing: &Listing, delay: Duration) -> Pagination {
  let mut out = Pagination::default();
  let mut page = 1;

  loop {
    let url = listing.page_url(page);
    let body = match fetcher.get_json(&url).await {
      Ok(body) => body,
      Err(e) => {
        warn!(page, error = %e, "listing request failed, stopping");
        out.stopped_on_failure = true;
        break;
      }
    };
    let parsed: ListingPage = match serde_json::from_value(body) {
      Ok(parsed) => parsed,
      Err(e) => {
        warn!(page, error = %e, "listing page unreadable, stopping");
        out.stopped_on_failure = true;
        break;
      }
    };
    out.pages += 1;

    if parsed.items.is_empty() {
      break;
    }

    let count = parsed.items.len();
    for item in parsed.items {
      match serde_json::from_value::<AthleteStub>(item) {
        Ok(stub) => out.stubs.push(stub),
        Err(e) => {
          out.malformed += 1;
          warn!(page, error = %e, "skipping unreadable listing item");
        }
      }
    }
    info!(page, items = count, collected = out.stubs.len(), "fetched listing page");

    if parsed.page_count.is_some_and(|last| page >= last) {
      break;
    }
    page += 1;
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use serde_json::{Value, json};

  use super::*;
  use crate::testing::FakeFetcher;

  fn listing() -> Listing {
    Listing {
      url:       "http://api.test/athletes".into(),
      page_size: 50,
    }
  }

  fn items(start: usize, n: usize) -> Value {
    Value::Array((start..start + n).map(|i| json!({ "id": i.to_string() })).collect())
  }

  #[tokio::test]
  async fn walks_until_an_empty_page() {
    let l = listing();
    let fake = FakeFetcher::new()
      .with(l.page_url(1), json!({ "items": items(0, 50) }))
      .with(l.page_url(2), json!({ "items": items(50, 50) }))
      .with(l.page_url(3), json!({ "items": [] }));

    let got = fetch_all(&fake, &l, Duration::ZERO).await;

    assert_eq!(got.stubs.len(), 100);
    assert_eq!(got.pages, 3);
    assert!(!got.stopped_on_failure);
    assert_eq!(fake.calls(&l.page_url(4)), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn waits_between_pages_but_not_after_the_last() {
    let l = listing();
    let fake = FakeFetcher::new()
      .with(l.page_url(1), json!({ "items": items(0, 50) }))
      .with(l.page_url(2), json!({ "items": items(50, 50) }))
      .with(l.page_url(3), json!({ "items": [] }));

    let start = tokio::time::Instant::now();
    let got = fetch_all(&fake, &l, Duration::from_millis(500)).await;
    let waited = start.elapsed();

    assert_eq!(got.pages, 3);
    assert!(waited >= Duration::from_secs(1), "waited {waited:?}");
    assert!(waited < Duration::from_millis(1100), "waited {waited:?}");
  }

  #[tokio::test]
  async fn stops_at_announced_page_count() {
    let l = listing();
    let fake = FakeFetcher::new()
      .with(l.page_url(1), json!({ "items": items(0, 2), "pageCount": 2 }))
      .with(l.page_url(2), json!({ "items": items(2, 1), "pageCount": 2 }));

    let got = fetch_all(&fake, &l, Duration::ZERO).await;

    assert_eq!(got.stubs.len(), 3);
    assert_eq!(got.pages, 2);
    assert_eq!(fake.calls(&l.page_url(3)), 0);
  }

  #[tokio::test]
  async fn failure_keeps_earlier_pages() {
    let l = listing();
    let fake = FakeFetcher::new().with(l.page_url(1), json!({ "items": items(0, 5) }));

    let got = fetch_all(&fake, &l, Duration::ZERO).await;

    assert_eq!(got.stubs.len(), 5);
    assert!(got.stopped_on_failure);
  }

  #[tokio::test]
  async fn unreadable_items_are_skipped() {
    let l = listing();
    let fake = FakeFetcher::new()
      .with(l.page_url(1), json!({ "items": [{ "id": "1" }, { "name": "no id" }, { "id": 3 }] }))
      .with(l.page_url(2), json!({ "items": [] }));

    let got = fetch_all(&fake, &l, Duration::ZERO).await;

    let ids: Vec<_> = got.stubs.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
    assert_eq!(got.malformed, 1);
  }
}
