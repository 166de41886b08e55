use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display, EnumString};

/// Where a document is in its lifecycle.
///
/// This axis governs which queue or query surfaces the document; it is
/// independent of the receiving department's [AdminStatus].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    SerializeDisplay,
    DeserializeFromStr,
)]
#[strum(serialize_all = "title_case", ascii_case_insensitive)]
pub enum LifecycleStatus {
    /// Created but not yet forwarded; only visible to the owner
    Draft,
    /// Forwarded at least once; surfaces in inbox, outbox and triage queues
    Sent,
    /// Soft deleted. Terminal: no transition leaves this state
    Deleted,
}

impl LifecycleStatus {
    /// true when the status no longer admits any transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleStatus::Deleted)
    }
}

/// The receiving department's triage state.
///
/// Only meaningful once a document is [LifecycleStatus::Sent]. Movement is
/// free-form: any value may follow any other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    SerializeDisplay,
    DeserializeFromStr,
)]
#[strum(serialize_all = "title_case", ascii_case_insensitive)]
pub enum AdminStatus {
    /// Awaiting triage; the value a document enters Sent with
    Pending,
    /// Under active review
    InReview,
    /// Parked by the receiving department
    OnHold,
    /// Pushed back for later handling
    Deferred,
    /// Rejected, usually with a remark explaining why
    Rejected,
    /// Processing finished
    Completed,
}

impl AdminStatus {
    /// the triage state a document carries when it first enters [LifecycleStatus::Sent]
    pub fn initial() -> AdminStatus {
        AdminStatus::Pending
    }

    /// Triage is free-form: any value may follow any other.
    /// Kept as a method so a stricter matrix has one place to land.
    pub fn may_follow(&self, _previous: AdminStatus) -> bool {
        true
    }
}

/// The handling priority assigned by the owner at creation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    SerializeDisplay,
    DeserializeFromStr,
)]
#[strum(serialize_all = "title_case", ascii_case_insensitive)]
pub enum Priority {
    /// Routine, no deadline pressure
    Low,
    /// The default lane
    #[default]
    Normal,
    /// Needs handling ahead of the normal lane
    Urgent,
    /// Drop-everything handling
    Critical,
}
