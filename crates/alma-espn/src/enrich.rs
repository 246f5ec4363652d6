//! Per-athlete enrichment: one listing stub plus its detail record, with
//! every link resolved, becomes one [`Athlete`] row.

use alma_core::athlete::{Athlete, BirthPlace, Draft, League};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
  college::attribute_college,
  endpoints::Endpoints,
  fetch::Fetch,
  payload::{AthleteDetail, AthleteStub},
  resolve::ReferenceResolver,
};

/// The row for `stub` with only the listing fields filled in.
pub fn from_stub(stub: &AthleteStub, league: League, pulled_at: DateTime<Utc>) -> Athlete {
  let mut athlete = Athlete::new(stub.id.clone(), league, pulled_at);
  athlete.full_name = stub.full_name.clone();
  athlete.first_name = stub.first_name.clone();
  athlete.last_name = stub.last_name.clone();
  athlete.jersey = stub.jersey.clone();
  athlete.active = stub.active;
  athlete.weight = stub.weight;
  athlete.height = stub.height;
  athlete.age = stub.age;
  athlete.date_of_birth = stub.date_of_birth.clone();
  athlete.experience_years = stub.experience.as_ref().and_then(|e| e.years);
  if let Some(place) = &stub.birth_place {
    athlete.birth_place = BirthPlace {
      city:    place.city.clone(),
      state:   place.state.clone(),
      country: place.country.clone(),
    };
  }
  athlete
}

async fn fetch_detail<F: Fetch>(
  resolver: &ReferenceResolver<F>,
  endpoints: &Endpoints,
  league: League,
  id: &str,
) -> Option<AthleteDetail> {
  let url = endpoints.detail(league, id);
  match resolver.fetcher().get_json(&url).await {
    Ok(body) => match serde_json::from_value(body) {
      Ok(detail) => Some(detail),
      Err(e) => {
        debug!(athlete = id, error = %e, "athlete detail unreadable");
        None
      }
    },
    Err(e) => {
      debug!(athlete = id, error = %e, "athlete detail fetch failed");
      None
    }
  }
}

/// Build the row for one athlete.
///
/// Never fails: when the detail record cannot be fetched, the row still
/// carries the listing fields and leaves position, team, college and draft
/// empty.
pub async fn enrich<F: Fetch>(
  resolver: &mut ReferenceResolver<F>,
  endpoints: &Endpoints,
  league: League,
  stub: &AthleteStub,
  pulled_at: DateTime<Utc>,
) -> Athlete {
  let mut athlete = from_stub(stub, league, pulled_at);
  let Some(detail) = fetch_detail(resolver, endpoints, league, &stub.id).await else {
    return athlete;
  };

  if let Some(href) = detail.position.as_ref().and_then(|l| l.href()) {
    athlete.position = resolver.position(href).await;
  }
  if let Some(href) = detail.team.as_ref().and_then(|l| l.href()) {
    athlete.team = resolver.team_abbreviation(href).await;
  }
  athlete.college = attribute_college(resolver, &detail).await;
  athlete.debut_year = detail.debut_year;

  if let Some(draft) = &detail.draft {
    let team = match draft.team.as_ref().and_then(|l| l.href()) {
      Some(href) => resolver.team_abbreviation(href).await,
      None => None,
    };
    athlete.draft = Draft {
      year: draft.year,
      round: draft.round,
      pick: draft.selection,
      team,
    };
  }

  athlete
}
