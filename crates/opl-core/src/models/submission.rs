//! One Point Lesson submission model

use serde::{Deserialize, Serialize};

/// A parsed form submission. Every field is optional on the wire; the email
/// address is checked separately before anything else happens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub email: Option<String>,
    pub department: Option<String>,
    pub site: Option<String>,
    pub shift_engineer: Option<String>,
    pub equipment: Option<String>,
    pub area: Option<String>,
    pub objective: Option<String>,
    pub issue_description: Option<String>,
    pub reason: Option<String>,
    pub remedial_action: Option<String>,
    pub troubleshooting_action: Option<String>,
    pub before_image_url: Option<String>,
    pub after_image_url: Option<String>,
}

impl Submission {
    /// Trimmed recipient address; empty when the field is missing.
    pub fn email(&self) -> &str {
        self.email.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Text fields that will appear in the report, in report order.
    pub fn present_fields(&self) -> impl Iterator<Item = (ReportField, &str)> {
        ReportField::ALL
            .into_iter()
            .filter_map(move |field| field.value(self).map(|value| (field, value)))
    }
}

/// The ten free-text fields of a report, in the order they are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    Department,
    Site,
    ShiftEngineer,
    Equipment,
    Area,
    Objective,
    IssueDescription,
    Reason,
    RemedialAction,
    TroubleshootingAction,
}

impl ReportField {
    pub const ALL: [ReportField; 10] = [
        ReportField::Department,
        ReportField::Site,
        ReportField::ShiftEngineer,
        ReportField::Equipment,
        ReportField::Area,
        ReportField::Objective,
        ReportField::IssueDescription,
        ReportField::Reason,
        ReportField::RemedialAction,
        ReportField::TroubleshootingAction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReportField::Department => "Department",
            ReportField::Site => "Site",
            ReportField::ShiftEngineer => "Shift Engineer",
            ReportField::Equipment => "Equipment",
            ReportField::Area => "Area",
            ReportField::Objective => "Objective",
            ReportField::IssueDescription => "Issue Description",
            ReportField::Reason => "Reason for Issue",
            ReportField::RemedialAction => "Remedial Action",
            ReportField::TroubleshootingAction => "Troubleshooting Action",
        }
    }

    /// The submitted value, or `None` when the field is missing or empty.
    pub fn value(self, submission: &Submission) -> Option<&str> {
        let raw = match self {
            ReportField::Department => &submission.department,
            ReportField::Site => &submission.site,
            ReportField::ShiftEngineer => &submission.shift_engineer,
            ReportField::Equipment => &submission.equipment,
            ReportField::Area => &submission.area,
            ReportField::Objective => &submission.objective,
            ReportField::IssueDescription => &submission.issue_description,
            ReportField::Reason => &submission.reason,
            ReportField::RemedialAction => &submission.remedial_action,
            ReportField::TroubleshootingAction => &submission.troubleshooting_action,
        };
        raw.as_deref().filter(|v| !v.is_empty())
    }
}

/// Which of the two report photographs an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Before,
    After,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 2] = [ImageSlot::Before, ImageSlot::After];

    /// Local file name inside the request scratch directory.
    pub fn file_name(self) -> &'static str {
        match self {
            ImageSlot::Before => "before.jpg",
            ImageSlot::After => "after.jpg",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageSlot::Before => "Before:",
            ImageSlot::After => "After:",
        }
    }

    pub fn source_url(self, submission: &Submission) -> Option<&str> {
        match self {
            ImageSlot::Before => submission.before_image_url.as_deref(),
            ImageSlot::After => submission.after_image_url.as_deref(),
        }
    }
}

impl std::fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSlot::Before => f.write_str("before"),
            ImageSlot::After => f.write_str("after"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_payload_and_ignores_unknown_keys() {
        let submission: Submission = serde_json::from_value(serde_json::json!({
            "email": "  tech@plant.example.com ",
            "department": "Maintenance",
            "timestamp": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(submission.email(), "tech@plant.example.com");
        assert_eq!(submission.department.as_deref(), Some("Maintenance"));
        assert!(submission.site.is_none());
    }

    #[test]
    fn missing_email_reads_as_empty() {
        let submission = Submission::default();
        assert_eq!(submission.email(), "");
    }

    #[test]
    fn empty_and_null_fields_are_skipped() {
        let submission: Submission = serde_json::from_value(serde_json::json!({
            "email": "a@b.com",
            "department": "",
            "site": null,
            "area": "Boiler house"
        }))
        .unwrap();

        let fields: Vec<_> = submission.present_fields().collect();
        assert_eq!(fields, vec![(ReportField::Area, "Boiler house")]);
    }

    #[test]
    fn present_fields_follow_report_order() {
        let submission = Submission {
            troubleshooting_action: Some("Checked breaker".to_string()),
            department: Some("Utilities".to_string()),
            reason: Some("Worn bearing".to_string()),
            ..Default::default()
        };

        let labels: Vec<_> = submission.present_fields().map(|(f, _)| f.label()).collect();
        assert_eq!(
            labels,
            vec!["Department", "Reason for Issue", "Troubleshooting Action"]
        );
    }

    #[test]
    fn image_slots_use_fixed_file_names() {
        assert_eq!(ImageSlot::Before.file_name(), "before.jpg");
        assert_eq!(ImageSlot::After.file_name(), "after.jpg");
        assert_eq!(ImageSlot::After.label(), "After:");
    }
}
