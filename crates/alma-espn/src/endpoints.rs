//! URL construction for the sports-core API.

use alma_core::athlete::League;

pub const DEFAULT_BASE_URL: &str = "https://sports.core.api.espn.com";

/// Where the upstream API lives. Tests point this at fake hosts.
#[derive(Debug, Clone)]
pub struct Endpoints {
  base_url: String,
}

impl Default for Endpoints {
  fn default() -> Self { Self::new(DEFAULT_BASE_URL) }
}

impl Endpoints {
  pub fn new(base_url: impl Into<String>) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Self { base_url }
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  /// The paginated athlete listing for `league`.
  pub fn listing(&self, league: League, page_size: u32) -> Listing {
    Listing {
      url: format!(
        "{}/v3/sports/{}/{}/athletes",
        self.base_url,
        league.sport(),
        league
      ),
      page_size,
    }
  }

  /// The full record for one athlete.
  pub fn detail(&self, league: League, athlete_id: &str) -> String {
    format!(
      "{}/v2/sports/{}/leagues/{}/athletes/{}",
      self.base_url,
      league.sport(),
      league,
      athlete_id
    )
  }
}

/// A listing endpoint plus the page size requested from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
  pub url:       String,
  pub page_size: u32,
}

impl Listing {
  /// Pages are numbered from 1.
  pub fn page_url(&self, page: u32) -> String {
    format!("{}?limit={}&page={}", self.url, self.page_size, page)
  }
}
