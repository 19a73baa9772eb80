//! Lookup enums for contracts and interventions, plus the intervention
//! status state machine.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table of the database migrations.

/// Status / kind ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant, in seed order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Map a database ID back to the enum. `None` for unknown IDs.
            pub fn from_id(id: StatusId) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.id() == id)
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
    /// Whether a contract runs until an end date or for a fixed number of visits.
    ContractKind {
        Recurring = 1,
        OneOff = 2,
    }
}

define_status_enum! {
    /// Contract lifecycle status.
    ContractStatus {
        Draft = 1,
        Active = 2,
        Suspended = 3,
        Ended = 4,
        Cancelled = 5,
    }
}

define_status_enum! {
    /// Kind of field visit.
    InterventionKind {
        Regular = 1,
        Inspection = 2,
        /// Ad-hoc visit after a client complaint.
        Complaint = 3,
        /// First-time commercial visit before a contract exists.
        FirstVisit = 4,
        /// Commercial site visit.
        CommercialVisit = 5,
    }
}

define_status_enum! {
    /// Intervention lifecycle status.
    InterventionStatus {
        ToSchedule = 1,
        Scheduled = 2,
        Done = 3,
        Postponed = 4,
        Cancelled = 5,
    }
}

impl InterventionKind {
    /// Kinds that belong to a contract's recurrence. Out-of-contract kinds
    /// never produce a follow-up visit.
    pub const RECURRING: &'static [InterventionKind] =
        &[InterventionKind::Regular, InterventionKind::Inspection];

    pub fn drives_recurrence(self) -> bool {
        Self::RECURRING.contains(&self)
    }
}

impl InterventionStatus {
    /// Statuses of a visit that is still waiting to happen on its planned date.
    pub const QUEUED: &'static [InterventionStatus] =
        &[InterventionStatus::ToSchedule, InterventionStatus::Scheduled];

    /// Statuses no operation transitions out of.
    pub const TERMINAL: &'static [InterventionStatus] =
        &[InterventionStatus::Done, InterventionStatus::Cancelled];

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    /// Human-readable name (for error messages and note lines).
    pub fn name(self) -> &'static str {
        match self {
            Self::ToSchedule => "To schedule",
            Self::Scheduled => "Scheduled",
            Self::Done => "Done",
            Self::Postponed => "Postponed",
            Self::Cancelled => "Cancelled",
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::InterventionStatus::{self, *};

    /// Returns the set of statuses reachable from `from`.
    ///
    /// `Done` and `Cancelled` are terminal and return an empty slice.
    pub fn valid_transitions(from: InterventionStatus) -> &'static [InterventionStatus] {
        match from {
            ToSchedule => &[Scheduled, Postponed, Done, Cancelled],
            Scheduled => &[ToSchedule, Postponed, Done, Cancelled],
            // Postponed loops back to the queue, or can be postponed again.
            Postponed => &[ToSchedule, Scheduled, Postponed, Done, Cancelled],
            Done | Cancelled => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: InterventionStatus, to: InterventionStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(
        from: InterventionStatus,
        to: InterventionStatus,
    ) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!(
                "Invalid transition: {} -> {}",
                from.name(),
                to.name()
            ))
        }
    }
}
