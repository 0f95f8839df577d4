//! Audit event model.
//!
//! Timestamps are deliberately absent: the append-only sink assigns them on
//! insert so that event ordering reflects the log, not caller clocks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use phi_core::manifest;

/// The CRUD action an operation performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
}

/// The authenticated identity that performed an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable user id from the session provider.
    pub user_id: String,
    /// Email at the time of the operation.
    pub email: String,
    /// Portal role (e.g. `"provider"`, `"pharmacist"`, `"billing"`).
    pub role: String,
}

impl Actor {
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role: role.into(),
        }
    }
}

/// One completed (or attempted) operation against a record with sensitive
/// fields. Append-only once emitted; never mutated or deleted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique id assigned at construction.
    pub event_id: Uuid,
    /// Who performed the operation.
    pub actor: Actor,
    /// Tenant scope, when the operation happened inside a clinic context.
    pub clinic_id: Option<String>,
    /// What kind of operation it was.
    pub action: AuditAction,
    /// Entity type of the touched record (e.g. `"patient"`).
    pub resource_type: String,
    /// Id of the touched record, when one exists yet.
    pub resource_id: Option<String>,
    /// Sensitive field names implicated by the operation.
    pub sensitive_fields: Vec<String>,
    /// Whether any sensitive field was implicated.
    pub has_sensitive_data: bool,
    /// Free-text detail safe for the audit log (no PHI).
    pub detail: Option<String>,
}

impl AuditEvent {
    /// Construct a bare event with no sensitive-field list.
    pub fn new(actor: Actor, action: AuditAction, resource_type: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            actor,
            clinic_id: None,
            action,
            resource_type: resource_type.into(),
            resource_id: None,
            sensitive_fields: Vec::new(),
            has_sensitive_data: false,
            detail: None,
        }
    }

    /// Construct an event for record access, pre-filling the implicated
    /// sensitive fields from the entity's manifest so callers never restate
    /// which fields carry PHI.
    pub fn record_access(
        actor: Actor,
        action: AuditAction,
        entity_type: &str,
        resource_id: Option<&str>,
    ) -> Self {
        let fields = manifest::fields_for(entity_type);
        Self {
            event_id: Uuid::new_v4(),
            actor,
            clinic_id: None,
            action,
            resource_type: entity_type.to_owned(),
            resource_id: resource_id.map(str::to_owned),
            sensitive_fields: fields.iter().map(|f| (*f).to_owned()).collect(),
            has_sensitive_data: !fields.is_empty(),
            detail: None,
        }
    }

    /// Record access to a patient record.
    pub fn patient_access(actor: Actor, action: AuditAction, resource_id: Option<&str>) -> Self {
        Self::record_access(actor, action, "patient", resource_id)
    }

    /// Record access to a prescription record.
    pub fn prescription_access(
        actor: Actor,
        action: AuditAction,
        resource_id: Option<&str>,
    ) -> Self {
        Self::record_access(actor, action, "prescription", resource_id)
    }

    /// Record access to a provider record.
    pub fn provider_access(actor: Actor, action: AuditAction, resource_id: Option<&str>) -> Self {
        Self::record_access(actor, action, "provider", resource_id)
    }

    /// Scope the event to a clinic.
    pub fn with_clinic(mut self, clinic_id: impl Into<String>) -> Self {
        self.clinic_id = Some(clinic_id.into());
        self
    }

    /// Attach free-text detail. Callers must not place PHI here.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Actor {
        Actor::new("u-1", "dr@example.com", "provider")
    }

    #[test]
    fn record_access_prefills_manifest_fields() {
        let event = AuditEvent::patient_access(actor(), AuditAction::Read, Some("p-17"));
        let expected: Vec<String> = phi_core::manifest::fields_for("patient")
            .iter()
            .map(|f| (*f).to_owned())
            .collect();
        assert_eq!(event.sensitive_fields, expected);
        assert!(event.has_sensitive_data);
        assert_eq!(event.resource_type, "patient");
        assert_eq!(event.resource_id.as_deref(), Some("p-17"));
    }

    #[test]
    fn wrappers_cover_each_resource_kind() {
        let rx = AuditEvent::prescription_access(actor(), AuditAction::Create, None);
        assert!(rx.sensitive_fields.contains(&"patientAllergies".to_owned()));
        let prov = AuditEvent::provider_access(actor(), AuditAction::Update, Some("dr-3"));
        assert!(prov.sensitive_fields.contains(&"dea".to_owned()));
    }

    #[test]
    fn unknown_entity_yields_no_sensitive_data() {
        let event = AuditEvent::record_access(actor(), AuditAction::Read, "invoice", None);
        assert!(event.sensitive_fields.is_empty());
        assert!(!event.has_sensitive_data);
    }

    #[test]
    fn builder_scopes_clinic_and_detail() {
        let event = AuditEvent::new(actor(), AuditAction::Delete, "patient")
            .with_clinic("c1")
            .with_detail("chart closed");
        assert_eq!(event.clinic_id.as_deref(), Some("c1"));
        assert_eq!(event.detail.as_deref(), Some("chart closed"));
    }

    #[test]
    fn action_serialises_uppercase() {
        let json = serde_json::to_string(&AuditAction::Read).unwrap();
        assert_eq!(json, "\"READ\"");
    }

    #[test]
    fn event_ids_are_unique() {
        let a = AuditEvent::new(actor(), AuditAction::Read, "patient");
        let b = AuditEvent::new(actor(), AuditAction::Read, "patient");
        assert_ne!(a.event_id, b.event_id);
    }
}
