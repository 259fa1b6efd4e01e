//! Visit request domain types and registration validation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use gatehouse_core::{Department, Email, VisitStatus, VisitorRequestId, VisitorUid};

/// A visit request row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VisitorRequest {
    pub id: VisitorRequestId,
    pub name: String,
    pub designation: String,
    pub organization: String,
    pub phone: String,
    pub email: Email,
    pub purpose: String,
    pub department: Department,
    pub photo_url: Option<String>,
    pub status: VisitStatus,
    /// Pass code, set when the request is approved.
    pub visitor_uid: Option<VisitorUid>,
    pub expected_date: Option<NaiveDate>,
    pub expected_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
}

/// Slim projection used by the analytics summaries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatRow {
    pub status: VisitStatus,
    pub department: Department,
    pub created_at: DateTime<Utc>,
}

/// Field limits for public registration, matching the registration form.
const NAME_MAX: usize = 30;
const DESIGNATION_MAX: usize = 100;
const ORGANIZATION_MAX: usize = 200;
const PHONE_MIN: usize = 7;
const PHONE_MAX: usize = 20;
const PURPOSE_MAX: usize = 500;

/// Error carrying the message shown to the registrant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Raw public registration payload, as submitted.
#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub designation: String,
    pub organization: String,
    pub phone: String,
    pub email: String,
    pub purpose: String,
    pub department: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    pub expected_time: Option<NaiveTime>,
}

/// A validated registration, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewVisitorRequest {
    pub name: String,
    pub designation: String,
    pub organization: String,
    pub phone: String,
    pub email: Email,
    pub purpose: String,
    pub department: Department,
    pub photo_url: Option<String>,
    pub expected_date: Option<NaiveDate>,
    pub expected_time: Option<NaiveTime>,
}

impl RegistrationForm {
    /// Validate the submission and produce an insertable request.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] with a registrant-facing message for
    /// the first failing field.
    pub fn validate(self) -> Result<NewVisitorRequest, ValidationError> {
        let name = required_within(self.name.trim(), "Name", NAME_MAX)?;
        let designation = required_within(self.designation.trim(), "Designation", DESIGNATION_MAX)?;
        let organization =
            required_within(self.organization.trim(), "Organization", ORGANIZATION_MAX)?;

        let phone = self.phone.trim().to_owned();
        if phone.len() < PHONE_MIN || phone.len() > PHONE_MAX {
            return Err(ValidationError(
                "Please enter a valid phone number".to_owned(),
            ));
        }

        let email = Email::parse(self.email.trim())
            .map_err(|_| ValidationError("Please enter a valid email address".to_owned()))?;

        let purpose = required_within(self.purpose.trim(), "Purpose", PURPOSE_MAX)?;

        let department = Department::parse(&self.department)
            .map_err(|_| ValidationError("Please select a valid department".to_owned()))?;

        Ok(NewVisitorRequest {
            name,
            designation,
            organization,
            phone,
            email,
            purpose,
            department,
            photo_url: self.photo_url.filter(|u| !u.trim().is_empty()),
            expected_date: self.expected_date,
            expected_time: self.expected_time,
        })
    }
}

fn required_within(value: &str, field: &str, max: usize) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(ValidationError(format!(
            "{field} must be {max} characters or less"
        )));
    }
    Ok(value.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: "Asha Raman".to_owned(),
            designation: "Research Scholar".to_owned(),
            organization: "IIT Madras".to_owned(),
            phone: "+91 9876543210".to_owned(),
            email: "asha@example.com".to_owned(),
            purpose: "Project discussion with faculty".to_owned(),
            department: "CSE".to_owned(),
            photo_url: None,
            expected_date: None,
            expected_time: None,
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let new = form().validate().unwrap();
        assert_eq!(new.department.as_str(), "CSE");
        assert_eq!(new.email.as_str(), "asha@example.com");
    }

    #[test]
    fn test_name_required_and_bounded() {
        let mut f = form();
        f.name = "  ".to_owned();
        assert_eq!(
            f.validate().unwrap_err(),
            ValidationError("Name is required".to_owned())
        );

        let mut f = form();
        f.name = "x".repeat(31);
        assert_eq!(
            f.validate().unwrap_err(),
            ValidationError("Name must be 30 characters or less".to_owned())
        );
    }

    #[test]
    fn test_phone_length_bounds() {
        let mut f = form();
        f.phone = "12345".to_owned();
        assert!(f.validate().is_err());

        let mut f = form();
        f.phone = "1".repeat(21);
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_email_validated() {
        let mut f = form();
        f.email = "not-an-email".to_owned();
        assert_eq!(
            f.validate().unwrap_err(),
            ValidationError("Please enter a valid email address".to_owned())
        );
    }

    #[test]
    fn test_department_validated() {
        let mut f = form();
        f.department = "ASTROLOGY".to_owned();
        assert_eq!(
            f.validate().unwrap_err(),
            ValidationError("Please select a valid department".to_owned())
        );
    }

    #[test]
    fn test_blank_photo_url_dropped() {
        let mut f = form();
        f.photo_url = Some("   ".to_owned());
        assert_eq!(f.validate().unwrap().photo_url, None);
    }

    #[test]
    fn test_purpose_bounded() {
        let mut f = form();
        f.purpose = "p".repeat(501);
        assert!(f.validate().is_err());
    }
}
