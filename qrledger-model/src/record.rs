use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::QrRecordId;

/// Maximum length, in characters, of a record's code value.
pub const MAX_NUMBER_LEN: usize = 100;
/// Maximum length, in characters, of a record's display name.
pub const MAX_NAME_LEN: usize = 200;

/// A registered QR code.
///
/// Records are created once and never updated in place; `updated_at` only
/// mirrors the storage row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QrRecord {
    pub id: QrRecordId,
    pub number: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub raw_content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QrRecord {
    /// Display name, if one was given and is not blank.
    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    pub fn display_description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

/// Payload of the add form / create endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQrRecord {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewQrRecord {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Trim every field, drop blank optionals, and enforce the length limits.
    pub fn normalized(&self) -> Result<NewQrRecord> {
        let number = self.number.trim().to_string();
        if number.is_empty() {
            return Err(ModelError::MissingField("number"));
        }
        if number.chars().count() > MAX_NUMBER_LEN {
            return Err(ModelError::TooLong {
                field: "number",
                max: MAX_NUMBER_LEN,
            });
        }

        let name = non_blank(self.name.as_deref()).map(str::to_string);
        if let Some(name) = &name
            && name.chars().count() > MAX_NAME_LEN
        {
            return Err(ModelError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }

        let description =
            non_blank(self.description.as_deref()).map(str::to_string);

        Ok(NewQrRecord {
            number,
            name,
            description,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
