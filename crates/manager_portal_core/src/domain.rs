//! crates/manager_portal_core/src/domain.rs
//!
//! Defines the core data structures the portal works with.
//! Every entity is owned by the remote GraphQL backend; the values here are
//! transient copies that are only valid until the next fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::ports::PortError;

/// The only role allowed past the session guard.
pub const MANAGER_ROLE: &str = "manager";

//=========================================================================================
// Session
//=========================================================================================

/// The identity carried by an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl SessionUser {
    pub fn is_manager(&self) -> bool {
        self.role == MANAGER_ROLE
    }
}

//=========================================================================================
// Status Enumerations
//=========================================================================================

/// Moderation state of a review. Travels over the wire as `"0"`, `"1"` or `"2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReviewModeration {
    Approved,
    Denied,
    #[default]
    Pending,
}

impl ReviewModeration {
    pub const ALL: [ReviewModeration; 3] = [Self::Approved, Self::Denied, Self::Pending];

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Approved => "0",
            Self::Denied => "1",
            Self::Pending => "2",
        }
    }

    pub fn from_wire(token: &str) -> Result<Self, PortError> {
        match token {
            "0" => Ok(Self::Approved),
            "1" => Ok(Self::Denied),
            "2" => Ok(Self::Pending),
            other => Err(PortError::Validation(format!(
                "'{other}' is not a review moderation status"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Denied => "Denied",
            Self::Pending => "Pending Approval",
        }
    }
}

impl TryFrom<String> for ReviewModeration {
    type Error = PortError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_wire(&value)
    }
}

impl From<ReviewModeration> for String {
    fn from(value: ReviewModeration) -> Self {
        value.as_wire().to_string()
    }
}

impl fmt::Display for ReviewModeration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolution state of a complaint. `"0"` is resolved, `"1"` is unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ComplaintStatus {
    Resolved,
    #[default]
    Unresolved,
}

impl ComplaintStatus {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Resolved => "0",
            Self::Unresolved => "1",
        }
    }

    pub fn from_wire(token: &str) -> Result<Self, PortError> {
        match token {
            "0" => Ok(Self::Resolved),
            "1" => Ok(Self::Unresolved),
            other => Err(PortError::Validation(format!(
                "'{other}' is not a complaint status"
            ))),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Resolved => Self::Unresolved,
            Self::Unresolved => Self::Resolved,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Resolved => "Resolved",
            Self::Unresolved => "Unresolved",
        }
    }
}

impl TryFrom<String> for ComplaintStatus {
    type Error = PortError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_wire(&value)
    }
}

impl From<ComplaintStatus> for String {
    fn from(value: ComplaintStatus) -> Self {
        value.as_wire().to_string()
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//=========================================================================================
// Business
//=========================================================================================

/// A business profile owned by a manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub year_founded: Option<i64>,
    pub type_of_entity: Option<String>,
    pub business_hours: Option<String>,
    pub revenue: Option<String>,
    pub employee_count: Option<i64>,
    pub keywords: Option<String>,
    #[serde(rename = "companyLinkedIn")]
    pub company_linked_in: Option<String>,
    pub company_facebook: Option<String>,
    pub company_twitter: Option<String>,
    pub technologies_used: Option<String>,
    pub sic_codes: Option<String>,
}

/// Minimal reference to a business, used by pickers and relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

//=========================================================================================
// Products and Images
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub extension: Option<String>,
}

/// An image attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    #[serde(default)]
    pub file: Option<FileInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingOnly {
    pub rating: u8,
}

/// A product as it appears in the product list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub reviews: Vec<RatingOnly>,
}

impl Product {
    /// Mean rating over the product's reviews, `None` when it has none.
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        Some(f64::from(total) / self.reviews.len() as f64)
    }
}

/// A product with everything the edit view needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub business: Option<BusinessRef>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub reviews: Vec<ProductReview>,
    #[serde(default)]
    pub complaints: Vec<ProductComplaint>,
}

//=========================================================================================
// Feedback: Reviews, Complaints and Replies
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    #[serde(default)]
    pub user: Option<UserRef>,
    pub rating: u8,
    #[serde(default)]
    pub content: Option<String>,
    pub moderation_status: ReviewModeration,
    #[serde(default, deserialize_with = "flexible_flag")]
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl Review {
    /// The rating rendered as stars, capped at five.
    pub fn stars(&self) -> String {
        "⭐".repeat(usize::from(self.rating.min(5)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub status: ComplaintStatus,
    #[serde(default, deserialize_with = "flexible_flag")]
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

/// Product reviews share the business review shape.
pub type ProductReview = Review;
/// Product complaints share the business complaint shape.
pub type ProductComplaint = Complaint;

//=========================================================================================
// Job Listings and Accounts
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The signed-in manager's own user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// The backend has been seen returning `isAnonymous` both as a boolean and as
// the strings "true"/"false".
fn flexible_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(b)) => Ok(b),
        Some(Flag::Text(s)) => Ok(s.eq_ignore_ascii_case("true")),
    }
}
