//! Per-entity allow-lists of PHI field names.
//!
//! The manifest is maintainable data, not logic: each entity type maps to the
//! fixed set of field names known to carry PHI for that type. The transformer
//! touches exactly these fields and nothing else, so a field missing here is
//! a data-leak bug — including denormalized copies of another entity's
//! fields (a prescription embeds the patient's name, DOB, gender, and
//! allergies, and must list all four).
//!
//! Unknown entity types resolve to an empty list: records the portal has not
//! classified pass through untouched rather than crashing the caller.

/// PHI fields on a patient record.
const PATIENT_FIELDS: &[&str] = &[
    "firstName",
    "lastName",
    "dateOfBirth",
    "phone",
    "email",
    "streetAddress",
    "zipCode",
    "allergies",
    "gender",
];

/// PHI fields on a prescription record, including the denormalized patient
/// copies carried for pharmacy transmission.
const PRESCRIPTION_FIELDS: &[&str] = &[
    "medicationName",
    "medicationStrength",
    "directions",
    "pharmacyName",
    "providerName",
    "providerNpi",
    "providerPhone",
    "patientName",
    "patientDob",
    "patientGender",
    "patientAllergies",
];

/// PHI fields on a provider record. Both naming conventions that appear in
/// stored rows are listed (`providerNpi` and `npi`, etc.).
const PROVIDER_FIELDS: &[&str] = &[
    "providerNpi",
    "providerName",
    "providerPhone",
    "name",
    "npi",
    "phone",
    "dea",
    "license",
    "email",
];

/// Return the sensitive field names for `entity_type`.
///
/// Unknown entity types return an empty slice, never an error.
pub fn fields_for(entity_type: &str) -> &'static [&'static str] {
    match entity_type {
        "patient" => PATIENT_FIELDS,
        "prescription" => PRESCRIPTION_FIELDS,
        "provider" => PROVIDER_FIELDS,
        _ => &[],
    }
}

/// Return `true` if `field` is listed as sensitive for `entity_type`.
pub fn is_sensitive(entity_type: &str, field: &str) -> bool {
    fields_for(entity_type).contains(&field)
}

/// All entity types with a non-empty manifest.
pub fn entity_types() -> &'static [&'static str] {
    &["patient", "prescription", "provider"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unknown_entity_is_empty() {
        assert!(fields_for("invoice").is_empty());
        assert!(fields_for("").is_empty());
    }

    #[test]
    fn no_duplicate_fields_per_entity() {
        for entity in entity_types() {
            let fields = fields_for(entity);
            let unique: HashSet<_> = fields.iter().collect();
            assert_eq!(unique.len(), fields.len(), "duplicate field in {entity}");
        }
    }

    #[test]
    fn every_listed_entity_has_fields() {
        for entity in entity_types() {
            assert!(!fields_for(entity).is_empty(), "{entity} manifest is empty");
        }
    }

    #[test]
    fn prescription_lists_denormalized_patient_fields() {
        // Regression guard: a prescription carries copies of patient PHI, and
        // dropping any of these from the manifest leaks it to storage.
        for field in ["patientName", "patientDob", "patientGender", "patientAllergies"] {
            assert!(
                is_sensitive("prescription", field),
                "prescription manifest is missing {field}"
            );
        }
    }

    #[test]
    fn membership_is_per_entity() {
        // "medicationName" is sensitive on prescriptions only.
        assert!(is_sensitive("prescription", "medicationName"));
        assert!(!is_sensitive("patient", "medicationName"));
        // "email" is listed for patients and providers, not prescriptions.
        assert!(is_sensitive("patient", "email"));
        assert!(!is_sensitive("prescription", "email"));
    }

    #[test]
    fn structural_fields_are_never_listed() {
        for entity in entity_types() {
            for field in ["id", "clinicId", "createdAt", "updatedAt"] {
                assert!(!is_sensitive(entity, field), "{entity} lists {field}");
            }
        }
    }
}
