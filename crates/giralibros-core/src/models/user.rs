use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Exchange areas users can offer to meet in. Stored as TEXT with a CHECK
/// constraint; the variants mirror that constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationArea {
    Caba,
    GbaNorte,
    GbaOeste,
    GbaSur,
}

impl LocationArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationArea::Caba => "CABA",
            LocationArea::GbaNorte => "GBA_NORTE",
            LocationArea::GbaOeste => "GBA_OESTE",
            LocationArea::GbaSur => "GBA_SUR",
        }
    }
}

impl std::str::FromStr for LocationArea {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CABA" => Ok(LocationArea::Caba),
            "GBA_NORTE" => Ok(LocationArea::GbaNorte),
            "GBA_OESTE" => Ok(LocationArea::GbaOeste),
            "GBA_SUR" => Ok(LocationArea::GbaSur),
            other => Err(format!("unknown location area: {}", other)),
        }
    }
}

/// Which offered books a browse query may see.
///
/// Authenticated callers browse within their own exchange areas; anonymous
/// callers get the unrestricted listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaScope {
    Filtered(Vec<LocationArea>),
    Unfiltered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// The email the user shares with others when exchanging.
    pub contact_email: String,
    /// Alternative means of contact, e.g. a WhatsApp number.
    pub alternate_contact: String,
    pub about: String,
    pub created_at: DateTime<Utc>,
}

/// Profile as returned to its owner: contact fields plus exchange areas.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub username: String,
    pub contact_email: String,
    pub alternate_contact: String,
    pub about: String,
    pub areas: Vec<LocationArea>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ProfileForm {
    #[validate(email(message = "contact_email must be a valid email address"))]
    pub contact_email: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "alternate_contact must be at most 200 characters"))]
    pub alternate_contact: String,
    #[serde(default)]
    pub about: String,
    /// Replace-all semantics: the submitted areas become the user's areas.
    #[validate(length(min = 1, message = "at least one exchange area is required"))]
    pub areas: Vec<LocationArea>,
}
