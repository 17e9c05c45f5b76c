//! Mock external doctor search tool.
//!
//! Stands in for a real external platform search (e.g. Google). Results
//! are fabricated from the criteria through a fixed decision table, not a
//! ranking algorithm: no scoring, no real geocoding. Deterministic for
//! the same criteria modulo an artificial latency.

use std::time::Duration;
use tracing::info;

use crate::domain::{
    DoctorSearchCriteria, DomainError, ExternalDoctorProfile, InviteStatus,
};
use crate::ports::ExternalSearchPort;

pub struct MockExternalSearch {
    /// Simulated API latency in milliseconds.
    delay_ms: u64,
}

impl MockExternalSearch {
    /// Create a mock tool with the original's latency (1500ms).
    pub fn new() -> Self {
        Self { delay_ms: 1500 }
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for MockExternalSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// Fabricate the three-entry candidate pool from the criteria:
/// a geo-oriented candidate, a global remote-consult candidate, and a
/// location-text candidate. Specialties are fixed so the substring
/// filter can genuinely miss.
fn candidate_pool(criteria: &DoctorSearchCriteria) -> [ExternalDoctorProfile; 3] {
    let location_label = match criteria.coordinates {
        Some(coords) => {
            let radius = criteria
                .radius_km
                .map(|km| format!(" within {}km", km))
                .unwrap_or_default();
            format!(
                "Near ({:.2}, {:.2}){}",
                coords.latitude, coords.longitude, radius
            )
        }
        None => criteria
            .location
            .clone()
            .unwrap_or_else(|| "Various Locations".to_string()),
    };

    let geo_languages = match &criteria.language {
        Some(lang) => vec![lang.clone(), "English".to_string()],
        None => vec![
            "English".to_string(),
            "Spanish".to_string(),
            "Wolof".to_string(),
        ],
    };

    [
        ExternalDoctorProfile {
            id: "ext_doc_geo_1".into(),
            name: format!(
                "Dr. Nearby Generalist ({})",
                criteria.language.as_deref().unwrap_or("Any Lang")
            ),
            specialty: Some("General Medicine".into()),
            location: Some(location_label),
            languages: Some(geo_languages),
            external_profile_url: Some(
                "https://www.google.com/search?q=doctor+near+me".into(),
            ),
            invite_status: InviteStatus::NotInvited,
        },
        ExternalDoctorProfile {
            id: "ext_doc_geo_2".into(),
            name: "Dr. Global Searcher (Remote Consult)".into(),
            specialty: Some("Pediatrics".into()),
            location: Some("Online / Global".into()),
            languages: Some(vec![
                "French".to_string(),
                "German".to_string(),
                "English".to_string(),
            ]),
            external_profile_url: Some(
                "https://www.google.com/search?q=pediatrician+online".into(),
            ),
            invite_status: InviteStatus::NotInvited,
        },
        ExternalDoctorProfile {
            id: "ext_doc_specific_1".into(),
            name: format!(
                "Dr. Specific Location ({})",
                criteria.location.as_deref().unwrap_or("City Center")
            ),
            specialty: Some("Internal Medicine".into()),
            location: Some(
                criteria
                    .location
                    .clone()
                    .unwrap_or_else(|| "City Center".to_string()),
            ),
            languages: Some(vec!["English".to_string()]),
            external_profile_url: Some(
                "https://www.google.com/search?q=doctor+city+center".into(),
            ),
            invite_status: InviteStatus::NotInvited,
        },
    ]
}

#[async_trait::async_trait]
impl ExternalSearchPort for MockExternalSearch {
    async fn search(
        &self,
        criteria: &DoctorSearchCriteria,
    ) -> Result<Vec<ExternalDoctorProfile>, DomainError> {
        info!(?criteria, "[MOCK] external doctor search called");

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        let [geo, global, specific] = candidate_pool(criteria);

        // Decision table, in priority order.
        if criteria.coordinates.is_some() {
            return Ok(vec![geo, global]);
        }
        if criteria
            .location
            .as_deref()
            .is_some_and(|l| !l.trim().is_empty())
        {
            return Ok(vec![specific, geo]);
        }

        let pool = [geo.clone(), global, specific];
        let mut results: Vec<ExternalDoctorProfile> = pool
            .into_iter()
            .filter(|doc| {
                let specialty_ok = match criteria.specialty.as_deref() {
                    Some(wanted) if !wanted.trim().is_empty() => doc
                        .specialty
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&wanted.to_lowercase())),
                    _ => true,
                };
                let language_ok = match criteria.language.as_deref() {
                    Some(wanted) if !wanted.trim().is_empty() => {
                        doc.languages.as_ref().is_some_and(|langs| {
                            langs.iter().any(|l| l.eq_ignore_ascii_case(wanted))
                        })
                    }
                    _ => true,
                };
                specialty_ok && language_ok
            })
            .collect();

        if results.is_empty() {
            // Generic fallback: exactly one entry.
            return Ok(vec![geo]);
        }
        results.truncate(2);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;

    fn tool() -> MockExternalSearch {
        MockExternalSearch::with_delay(0)
    }

    #[tokio::test]
    async fn test_coordinates_select_geo_subset() {
        let results = tool()
            .search(&DoctorSearchCriteria {
                coordinates: Some(Coordinates {
                    latitude: 14.69,
                    longitude: -17.44,
                }),
                radius_km: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "ext_doc_geo_1");
        assert_eq!(results[1].id, "ext_doc_geo_2");
        assert!(results[0]
            .location
            .as_deref()
            .unwrap()
            .contains("within 10km"));
    }

    #[tokio::test]
    async fn test_location_text_selects_location_subset() {
        let results = tool()
            .search(&DoctorSearchCriteria {
                location: Some("Dakar".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "ext_doc_specific_1");
        assert_eq!(results[0].location.as_deref(), Some("Dakar"));
    }

    #[tokio::test]
    async fn test_unmatched_specialty_yields_single_fallback() {
        let results = tool()
            .search(&DoctorSearchCriteria {
                specialty: Some("zzz-nomatch".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "ext_doc_geo_1");
    }

    #[tokio::test]
    async fn test_specialty_filter_caps_at_two() {
        let results = tool()
            .search(&DoctorSearchCriteria {
                specialty: Some("medicine".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        // "General Medicine" and "Internal Medicine" both match.
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_language_filter_exact_membership() {
        let results = tool()
            .search(&DoctorSearchCriteria {
                language: Some("german".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        // The requested language is echoed into the geo candidate, and the
        // global candidate lists German natively.
        assert!(results.len() <= 2);
        assert!(results.iter().all(|d| {
            d.languages
                .as_ref()
                .unwrap()
                .iter()
                .any(|l| l.eq_ignore_ascii_case("german"))
        }));
    }

    #[tokio::test]
    async fn test_deterministic_for_same_criteria() {
        let criteria = DoctorSearchCriteria {
            location: Some("Thiès".into()),
            ..Default::default()
        };
        let a = tool().search(&criteria).await.unwrap();
        let b = tool().search(&criteria).await.unwrap();

        let ids = |r: &[ExternalDoctorProfile]| -> Vec<String> {
            r.iter().map(|d| d.id.clone()).collect()
        };
        assert_eq!(ids(&a), ids(&b));
    }
}
