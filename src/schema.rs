//! Sheet and form vocabulary: column headers, choice lists, and the
//! enumerated approval/status cell values the workflow branches on.
//!
//! Cell matching is exact; anything outside the enumerated strings falls
//! into the catch-all variants so a stray edit never panics the batch.

/// Title of the intake form created by `setup-form`.
pub const FORM_TITLE: &str = "Out of office (OOO) request";

/// Guidance attached to the Name question. The hosted form used to enforce
/// a title-case pattern; the public Forms API cannot attach text validation,
/// so the rule ships as guidance text instead.
pub const NAME_GUIDANCE: &str = "Please use Title Case and proper punctuation for your name.";

/// Columns the tracking sheet must carry, in intake order.
///
/// The first nine are written by the form host; the last two are appended
/// by `setup-columns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    Timestamp,
    FullName,
    EmailAddress,
    Campus,
    StartDate,
    EndDate,
    Reason,
    Description,
    SupervisorEmail,
    SupervisorApproval,
    HrApproval,
    EventStatus,
}

impl Header {
    pub const ALL: [Header; 12] = [
        Header::Timestamp,
        Header::FullName,
        Header::EmailAddress,
        Header::Campus,
        Header::StartDate,
        Header::EndDate,
        Header::Reason,
        Header::Description,
        Header::SupervisorEmail,
        Header::SupervisorApproval,
        Header::HrApproval,
        Header::EventStatus,
    ];

    /// The exact header-row text for this column.
    pub fn title(self) -> &'static str {
        match self {
            Header::Timestamp => "Timestamp",
            Header::FullName => "Name",
            Header::EmailAddress => "Email Address",
            Header::Campus => "Campus",
            Header::StartDate => "Start date",
            Header::EndDate => "End date",
            Header::Reason => "Reason",
            Header::Description => "Brief description",
            Header::SupervisorEmail => "Supervisor email",
            Header::SupervisorApproval => "My supervisor has already approved this request",
            Header::HrApproval => "HR approval",
            Header::EventStatus => "Calendar event status",
        }
    }
}

/// Time-off reasons offered by the form's Reason dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Personal,
    Professional,
    Dwtl,
}

impl Reason {
    pub const ALL: [Reason; 3] = [Reason::Personal, Reason::Professional, Reason::Dwtl];

    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Personal => "Personal",
            Reason::Professional => "Professional",
            Reason::Dwtl => "DWTL",
        }
    }
}

/// Campuses offered by the form's Campus dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Campus {
    Anderson,
    Southwood,
    Creekside,
    Midtown,
    System,
}

impl Campus {
    pub const ALL: [Campus; 5] = [
        Campus::Anderson,
        Campus::Southwood,
        Campus::Creekside,
        Campus::Midtown,
        Campus::System,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Campus::Anderson => "Anderson",
            Campus::Southwood => "Southwood",
            Campus::Creekside => "Creekside",
            Campus::Midtown => "Midtown",
            Campus::System => "System",
        }
    }
}

/// Supervisor approval state as read from the checkbox/dropdown cell.
///
/// The form's checkbox writes "Approved"; HR can overwrite the cell with
/// "Not approved". Every other value (including the empty cell) is `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Approved,
    NotApproved,
    Unset,
}

impl ApprovalState {
    /// Dropdown choices for an approval column, in display order.
    pub const CHOICES: [&'static str; 2] = ["Approved", "Not approved"];

    pub fn from_cell(cell: &str) -> ApprovalState {
        match cell {
            "Approved" => ApprovalState::Approved,
            "Not approved" => ApprovalState::NotApproved,
            _ => ApprovalState::Unset,
        }
    }
}

/// Processing state of a row, stored in the Calendar event status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    NotCreated,
    Created,
}

impl EventStatus {
    /// Dropdown choices for the status column, in display order.
    pub const CHOICES: [&'static str; 2] = ["Event not created", "Event created"];

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::NotCreated => "Event not created",
            EventStatus::Created => "Event created",
        }
    }

    /// Only the exact "Event created" string counts as processed; anything
    /// else leaves the row eligible for the next run.
    pub fn from_cell(cell: &str) -> EventStatus {
        if cell == "Event created" {
            EventStatus::Created
        } else {
            EventStatus::NotCreated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_titles_are_unique() {
        let mut titles: Vec<&str> = Header::ALL.iter().map(|h| h.title()).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), Header::ALL.len());
    }

    #[test]
    fn test_approval_state_from_cell() {
        assert_eq!(ApprovalState::from_cell("Approved"), ApprovalState::Approved);
        assert_eq!(
            ApprovalState::from_cell("Not approved"),
            ApprovalState::NotApproved
        );
        assert_eq!(ApprovalState::from_cell(""), ApprovalState::Unset);
        // Matching is exact, not case-insensitive.
        assert_eq!(ApprovalState::from_cell("approved"), ApprovalState::Unset);
        assert_eq!(ApprovalState::from_cell("Pending"), ApprovalState::Unset);
    }

    #[test]
    fn test_event_status_round_trip() {
        assert_eq!(EventStatus::from_cell("Event created"), EventStatus::Created);
        assert_eq!(
            EventStatus::from_cell("Event not created"),
            EventStatus::NotCreated
        );
        // Unknown values count as not created so the row is retried.
        assert_eq!(EventStatus::from_cell(""), EventStatus::NotCreated);
        assert_eq!(EventStatus::from_cell("wip"), EventStatus::NotCreated);
        assert_eq!(
            EventStatus::from_cell(EventStatus::Created.as_str()),
            EventStatus::Created
        );
    }

    #[test]
    fn test_choice_lists_match_display_strings() {
        assert_eq!(EventStatus::CHOICES[0], EventStatus::NotCreated.as_str());
        assert_eq!(EventStatus::CHOICES[1], EventStatus::Created.as_str());
        assert_eq!(Reason::Dwtl.as_str(), "DWTL");
        assert_eq!(Campus::ALL.len(), 5);
    }
}
