//! The structured query a user submits from the search form.

use serde::{Deserialize, Serialize};

use crate::errors::FieldError;

/// Budget tier. Unknown values fall back to `Flexible`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Free,
    Under20,
    Under50,
    Under100,
    #[default]
    #[serde(other)]
    Flexible,
}

impl Budget {
    pub fn phrase(self) -> &'static str {
        match self {
            Budget::Free => "free tools only",
            Budget::Under20 => "under $20/month",
            Budget::Under50 => "under $50/month",
            Budget::Under100 => "under $100/month",
            Budget::Flexible => "any price range",
        }
    }
}

/// Privacy tier. Unknown values fall back to `Standard`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    High,
    Local,
    OpenSource,
    #[default]
    #[serde(other)]
    Standard,
}

impl Privacy {
    pub fn phrase(self) -> &'static str {
        match self {
            Privacy::Standard => "standard privacy",
            Privacy::High => "high privacy with GDPR compliance",
            Privacy::Local => "local/on-premise solutions only",
            Privacy::OpenSource => "open source preferred",
        }
    }
}

const ANY: &str = "any";

fn any() -> String {
    ANY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub budget: Budget,
    #[serde(default = "any")]
    pub category: String,
    #[serde(default = "any")]
    pub platform: String,
    #[serde(default)]
    pub privacy: Privacy,
    #[serde(default)]
    pub additional: Option<String>,
}

impl Query {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        if self.use_case.trim().is_empty() {
            return Err(vec![FieldError::new(
                "queryData.useCase",
                "Use case description is required",
            )]);
        }
        Ok(())
    }

    pub fn category_phrase(&self) -> String {
        open_choice_phrase(&self.category, "any category")
    }

    pub fn platform_phrase(&self) -> String {
        open_choice_phrase(&self.platform, "any platform")
    }

    pub fn additional_phrase(&self) -> &str {
        match self.additional.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => "None specified",
        }
    }
}

fn open_choice_phrase(value: &str, catch_all: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ANY) {
        catch_all.to_string()
    } else {
        value.to_string()
    }
}
