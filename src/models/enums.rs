use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::Validation {
                        field: stringify!($name).into(),
                        reason: format!("unrecognized value '{s}'"),
                    }),
                }
            }
        }
    };
}

str_enum!(PatientType {
    InPatient => "inpatient",
    OutPatient => "outpatient",
});

str_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn patient_type_round_trip() {
        for (variant, s) in [
            (PatientType::InPatient, "inpatient"),
            (PatientType::OutPatient, "outpatient"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(PatientType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn appointment_status_round_trip() {
        for (variant, s) in [
            (AppointmentStatus::Scheduled, "scheduled"),
            (AppointmentStatus::Completed, "completed"),
            (AppointmentStatus::Cancelled, "cancelled"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AppointmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(PatientType::from_str("visitor").is_err());
        assert!(AppointmentStatus::from_str("").is_err());
        assert!(matches!(
            AppointmentStatus::from_str("pending"),
            Err(DatabaseError::Validation { ref field, .. }) if field == "AppointmentStatus"
        ));
    }
}
