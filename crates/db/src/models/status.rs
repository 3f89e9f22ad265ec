//! Status helper enums mapping to SMALLINT columns.
//!
//! Each enum variant's discriminant matches the seed order (1-based) of
//! the corresponding column domain.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Wire name, as it appears in filter values.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            pub fn from_str(value: &str) -> Option<Self> {
                match value {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Export job lifecycle. `Pending` is the only non-terminal state;
    /// no transition leaves `Generated` or `Failed`.
    ExportJobStatus {
        Pending = 1 => "pending",
        Generated = 2 => "generated",
        Failed = 3 => "failed",
    }
}

define_status_enum! {
    /// Dossier lifecycle state. Filter values arrive as the wire names.
    DossierState {
        Brouillon = 1 => "brouillon",
        EnConstruction = 2 => "en_construction",
        EnInstruction = 3 => "en_instruction",
        Accepte = 4 => "accepte",
        Refuse = 5 => "refuse",
        ClasseSansSuite = 6 => "classe_sans_suite",
    }
}

impl DossierState {
    /// Terminal states: a decision has been made.
    pub const TERMINES: [DossierState; 3] = [
        DossierState::Accepte,
        DossierState::Refuse,
        DossierState::ClasseSansSuite,
    ];

    /// States an instructeur actively works on.
    pub const EN_COURS: [DossierState; 2] =
        [DossierState::EnConstruction, DossierState::EnInstruction];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for status in [
            ExportJobStatus::Pending,
            ExportJobStatus::Generated,
            ExportJobStatus::Failed,
        ] {
            assert_eq!(ExportJobStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(ExportJobStatus::from_id(99), None);
    }

    #[test]
    fn dossier_state_parses_wire_names() {
        assert_eq!(
            DossierState::from_str("en_construction"),
            Some(DossierState::EnConstruction)
        );
        assert_eq!(DossierState::from_str("draft"), None);
    }
}
