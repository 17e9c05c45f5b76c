//! Doctor search orchestrator: in-network first, external fallback.
//!
//! One search runs strictly sequentially through
//! `SearchingInternal -> Done` or
//! `SearchingInternal -> SearchingExternal -> Done | Failed`.
//! The external tool is only ever invoked when the internal filter
//! returned zero results, never in parallel or speculatively.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{
    filter_internal, DoctorProfile, DoctorSearchCriteria, DomainError, ExternalDoctorProfile,
    InternalDoctorProfile, InviteStatus,
};
use crate::ports::ExternalSearchPort;

/// Result of one completed search. At most one of the two lists is
/// non-empty: internal results suppress the external lookup entirely.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub internal: Vec<InternalDoctorProfile>,
    pub external: Vec<ExternalDoctorProfile>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.external.is_empty()
    }

    /// Flatten into the display-agnostic combined list, internal first.
    pub fn combined(&self) -> Vec<DoctorProfile> {
        self.internal
            .iter()
            .cloned()
            .map(DoctorProfile::Internal)
            .chain(self.external.iter().cloned().map(DoctorProfile::External))
            .collect()
    }

    /// Mark an external result as invited, matched by id. Returns false
    /// when no external result has that id.
    pub fn mark_invited(&mut self, id: &str) -> bool {
        match self.external.iter_mut().find(|d| d.id == id) {
            Some(doctor) => {
                doctor.invite_status = InviteStatus::Invited;
                true
            }
            None => false,
        }
    }
}

pub struct DoctorSearchService {
    directory: Vec<InternalDoctorProfile>,
    external: Arc<dyn ExternalSearchPort>,
}

impl DoctorSearchService {
    pub fn new(
        directory: Vec<InternalDoctorProfile>,
        external: Arc<dyn ExternalSearchPort>,
    ) -> Self {
        Self {
            directory,
            external,
        }
    }

    pub fn with_default_directory(external: Arc<dyn ExternalSearchPort>) -> Self {
        Self::new(crate::domain::in_network_doctors(), external)
    }

    /// Run one search. Each call starts a fresh machine from `Idle`.
    pub async fn search(
        &self,
        criteria: &DoctorSearchCriteria,
    ) -> Result<SearchOutcome, DomainError> {
        info!(?criteria, "doctor search: searching in-network directory");
        let internal: Vec<InternalDoctorProfile> = filter_internal(&self.directory, criteria)
            .into_iter()
            .cloned()
            .collect();

        if !internal.is_empty() {
            info!(count = internal.len(), "doctor search: done (internal)");
            return Ok(SearchOutcome {
                internal,
                external: Vec::new(),
            });
        }

        info!("doctor search: no in-network match, searching externally");
        let external_criteria = external_criteria(criteria);
        let external = self.external.search(&external_criteria).await.map_err(|e| {
            warn!(error = %e, "doctor search: external lookup failed");
            e
        })?;

        info!(count = external.len(), "doctor search: done (external)");
        Ok(SearchOutcome {
            internal: Vec::new(),
            external,
        })
    }
}

/// Build the external tool's criteria from the form input.
///
/// Coordinates win over the free-text location when both are present;
/// the radius attaches alongside whichever of the two survives.
fn external_criteria(criteria: &DoctorSearchCriteria) -> DoctorSearchCriteria {
    let specialty = criteria.specialty.clone().filter(|s| !s.trim().is_empty());
    let language = criteria.language.clone().filter(|s| !s.trim().is_empty());
    let location = criteria.location.clone().filter(|s| !s.trim().is_empty());

    if criteria.coordinates.is_some() {
        DoctorSearchCriteria {
            specialty,
            language,
            location: None,
            coordinates: criteria.coordinates,
            radius_km: criteria.radius_km,
        }
    } else {
        DoctorSearchCriteria {
            specialty,
            language,
            radius_km: if location.is_some() {
                criteria.radius_km
            } else {
                None
            },
            location,
            coordinates: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counting stub: records calls and the last criteria it saw.
    struct CountingExternal {
        calls: AtomicUsize,
        last_criteria: Mutex<Option<DoctorSearchCriteria>>,
        results: Vec<ExternalDoctorProfile>,
        fail: bool,
    }

    impl CountingExternal {
        fn returning(results: Vec<ExternalDoctorProfile>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_criteria: Mutex::new(None),
                results,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_criteria: Mutex::new(None),
                results: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl ExternalSearchPort for CountingExternal {
        async fn search(
            &self,
            criteria: &DoctorSearchCriteria,
        ) -> Result<Vec<ExternalDoctorProfile>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_criteria.lock().unwrap() = Some(criteria.clone());
            if self.fail {
                return Err(DomainError::Remote("tool unavailable".into()));
            }
            Ok(self.results.clone())
        }
    }

    fn external_doctor(id: &str) -> ExternalDoctorProfile {
        ExternalDoctorProfile {
            id: id.into(),
            name: format!("Dr. External {}", id),
            specialty: None,
            location: None,
            languages: None,
            external_profile_url: None,
            invite_status: InviteStatus::NotInvited,
        }
    }

    #[tokio::test]
    async fn test_internal_hit_skips_external_entirely() {
        let stub = Arc::new(CountingExternal::returning(vec![external_doctor("x")]));
        let service = DoctorSearchService::with_default_directory(stub.clone());

        let outcome = service
            .search(&DoctorSearchCriteria {
                specialty: Some("Cardiol".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.internal.len(), 1);
        assert!(outcome.external.is_empty());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_internal_miss_falls_back_to_external() {
        let stub = Arc::new(CountingExternal::returning(vec![external_doctor("a")]));
        let service = DoctorSearchService::with_default_directory(stub.clone());

        let outcome = service
            .search(&DoctorSearchCriteria {
                specialty: Some("Dermatologist".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(outcome.internal.is_empty());
        assert_eq!(outcome.external.len(), 1);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_external_failure_surfaces() {
        let stub = Arc::new(CountingExternal::failing());
        let service = DoctorSearchService::with_default_directory(stub);

        let err = service
            .search(&DoctorSearchCriteria {
                specialty: Some("Dermatologist".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Remote(_)));
    }

    #[tokio::test]
    async fn test_coordinates_preferred_over_location_text() {
        let stub = Arc::new(CountingExternal::returning(Vec::new()));
        let service = DoctorSearchService::with_default_directory(stub.clone());

        service
            .search(&DoctorSearchCriteria {
                specialty: Some("Dermatologist".into()),
                location: Some("Dakar".into()),
                coordinates: Some(Coordinates {
                    latitude: 14.69,
                    longitude: -17.44,
                }),
                radius_km: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();

        let seen = stub.last_criteria.lock().unwrap().clone().unwrap();
        assert!(seen.coordinates.is_some());
        assert!(seen.location.is_none());
        assert_eq!(seen.radius_km, Some(10));
    }

    #[tokio::test]
    async fn test_radius_attaches_to_location_without_coordinates() {
        let stub = Arc::new(CountingExternal::returning(Vec::new()));
        let service = DoctorSearchService::with_default_directory(stub.clone());

        service
            .search(&DoctorSearchCriteria {
                specialty: Some("Dermatologist".into()),
                location: Some("Kaolack".into()),
                radius_km: Some(25),
                ..Default::default()
            })
            .await
            .unwrap();

        let seen = stub.last_criteria.lock().unwrap().clone().unwrap();
        assert_eq!(seen.location.as_deref(), Some("Kaolack"));
        assert_eq!(seen.radius_km, Some(25));
        assert!(seen.coordinates.is_none());
    }

    #[tokio::test]
    async fn test_mark_invited_by_id() {
        let mut outcome = SearchOutcome {
            internal: Vec::new(),
            external: vec![external_doctor("a"), external_doctor("b")],
        };

        assert!(outcome.mark_invited("b"));
        assert_eq!(outcome.external[1].invite_status, InviteStatus::Invited);
        assert_eq!(outcome.external[0].invite_status, InviteStatus::NotInvited);
        assert!(!outcome.mark_invited("missing"));
    }
}
