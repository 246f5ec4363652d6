//! College attribution.
//!
//! Two paths lead from an athlete detail to a college:
//!
//! 1. `collegeAthlete.$ref` → the college-athlete record → its `college.$ref`
//!    → the college. This is the authoritative path and wins whenever it
//!    yields a name.
//! 2. `college.$ref` directly on the detail.
//!
//! Path 2 is only attempted when path 1 is unavailable or fails at any hop.

use alma_core::athlete::{CollegeAttribution, Provenance};

use crate::{
  fetch::Fetch,
  payload::AthleteDetail,
  resolve::{CollegeRecord, ReferenceResolver},
};

fn attributed(record: CollegeRecord, provenance: Provenance) -> CollegeAttribution {
  CollegeAttribution {
    name: Some(record.name),
    id: record.id,
    provenance,
  }
}

pub async fn attribute_college<F: Fetch>(
  resolver: &mut ReferenceResolver<F>,
  detail: &AthleteDetail,
) -> CollegeAttribution {
  if let Some(href) = detail.college_athlete.as_ref().and_then(|l| l.href())
    && let Some(college_ref) = resolver.college_link(href).await
    && let Some(record) = resolver.college(&college_ref).await
  {
    return attributed(record, Provenance::CollegeAthlete);
  }

  if let Some(href) = detail.college.as_ref().and_then(|l| l.href())
    && let Some(record) = resolver.college(href).await
  {
    return attributed(record, Provenance::Direct);
  }

  CollegeAttribution::none()
}
