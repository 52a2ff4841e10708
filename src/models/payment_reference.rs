use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// What a payment row settles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentReferenceKind {
    Sale,
    Appointment,
    Purchase,
}

/// Typed reference from a payment row to the record it settles.
///
/// The `payments` table stores this as `(reference_type, reference_id)`;
/// dispatch above the storage boundary goes through this union instead of
/// string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentReference {
    Sale(Uuid),
    Appointment(Uuid),
    Purchase(Uuid),
}

impl PaymentReference {
    pub fn kind(&self) -> PaymentReferenceKind {
        match self {
            PaymentReference::Sale(_) => PaymentReferenceKind::Sale,
            PaymentReference::Appointment(_) => PaymentReferenceKind::Appointment,
            PaymentReference::Purchase(_) => PaymentReferenceKind::Purchase,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            PaymentReference::Sale(id)
            | PaymentReference::Appointment(id)
            | PaymentReference::Purchase(id) => *id,
        }
    }

    /// Rebuilds the union from the stored column pair.
    pub fn from_parts(kind: &str, id: Uuid) -> Option<Self> {
        match kind.parse::<PaymentReferenceKind>().ok()? {
            PaymentReferenceKind::Sale => Some(PaymentReference::Sale(id)),
            PaymentReferenceKind::Appointment => Some(PaymentReference::Appointment(id)),
            PaymentReferenceKind::Purchase => Some(PaymentReference::Purchase(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_round_trip() {
        let id = Uuid::new_v4();
        let reference = PaymentReference::Appointment(id);
        let rebuilt =
            PaymentReference::from_parts(&reference.kind().to_string(), reference.id()).unwrap();
        assert_eq!(rebuilt, reference);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(PaymentReference::from_parts("refund", Uuid::new_v4()).is_none());
    }
}
