//! Static in-network doctor directory and the internal search filter.
//!
//! The directory is immutable reference data; filtering is plain
//! AND-combined, case-insensitive matching (substring on specialty-or-name
//! and on location, exact membership on language). An absent criterion
//! matches everything.

use crate::domain::entities::{DoctorSearchCriteria, InternalDoctorProfile};

/// The platform's in-network directory.
pub fn in_network_doctors() -> Vec<InternalDoctorProfile> {
    vec![
        InternalDoctorProfile {
            id: "1".into(),
            name: "Dr. Amina Fall".into(),
            specialty: "Cardiologist".into(),
            languages: vec!["Français".into(), "Wolof".into()],
            location: "Dakar, Senegal".into(),
            avatar_seed: "AF".into(),
            bio: "Experienced cardiologist focusing on preventative care and patient education."
                .into(),
        },
        InternalDoctorProfile {
            id: "2".into(),
            name: "Dr. John Smith".into(),
            specialty: "Pediatrician".into(),
            languages: vec!["English".into(), "Français".into()],
            location: "New York, USA".into(),
            avatar_seed: "JS".into(),
            bio: "Dedicated pediatrician with a passion for child wellness and development."
                .into(),
        },
        InternalDoctorProfile {
            id: "3".into(),
            name: "Dr. Mariama Diallo".into(),
            specialty: "General Practitioner".into(),
            languages: vec!["Wolof".into(), "English".into()],
            location: "Thiès, Senegal".into(),
            avatar_seed: "MD".into(),
            bio: "Compassionate GP providing comprehensive healthcare services to families."
                .into(),
        },
        InternalDoctorProfile {
            id: "4".into(),
            name: "Dr. Chen Wei".into(),
            specialty: "Neurologist".into(),
            languages: vec!["English".into()],
            location: "London, UK".into(),
            avatar_seed: "CW".into(),
            bio: "Specialist in neurological disorders, committed to advancing patient care \
                  through research."
                .into(),
        },
    ]
}

/// Filter the directory by the given criteria.
///
/// - `specialty` matches as a case-insensitive substring of the doctor's
///   specialty OR name (so "Dr. Smith" finds a doctor too).
/// - `location` matches as a case-insensitive substring.
/// - `language` must be an exact (case-insensitive) member of the
///   doctor's spoken languages.
pub fn filter_internal<'a>(
    directory: &'a [InternalDoctorProfile],
    criteria: &DoctorSearchCriteria,
) -> Vec<&'a InternalDoctorProfile> {
    directory
        .iter()
        .filter(|doc| {
            let specialty_ok = match criteria.specialty.as_deref() {
                Some(wanted) if !wanted.trim().is_empty() => {
                    let wanted = wanted.to_lowercase();
                    doc.specialty.to_lowercase().contains(&wanted)
                        || doc.name.to_lowercase().contains(&wanted)
                }
                _ => true,
            };
            let location_ok = match criteria.location.as_deref() {
                Some(wanted) if !wanted.trim().is_empty() => {
                    doc.location.to_lowercase().contains(&wanted.to_lowercase())
                }
                _ => true,
            };
            let language_ok = match criteria.language.as_deref() {
                Some(wanted) if !wanted.trim().is_empty() => {
                    let wanted = wanted.to_lowercase();
                    doc.languages.iter().any(|l| l.to_lowercase() == wanted)
                }
                _ => true,
            };
            specialty_ok && location_ok && language_ok
        })
        .collect()
}
