use std::{fmt, str::FromStr};

use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_CHARS: usize = 200;

/// Stored as a single-letter code. Ordering a query by this column sorts by the
/// code (`H` < `L` < `M`), not by severity.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Priority {
    #[sea_orm(string_value = "L")]
    #[serde(rename = "L")]
    Low,
    #[default]
    #[sea_orm(string_value = "M")]
    #[serde(rename = "M")]
    Medium,
    #[sea_orm(string_value = "H")]
    #[serde(rename = "H")]
    High,
}

impl Priority {
    pub fn code(self) -> &'static str {
        match self {
            Priority::Low => "L",
            Priority::Medium => "M",
            Priority::High => "H",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority code '{0}' (expected L, M or H)")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "L" | "l" => Ok(Priority::Low),
            "M" | "m" => Ok(Priority::Medium),
            "H" | "h" => Ok(Priority::High),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,
    #[sea_orm(indexed)]
    pub due_date: Option<Date>,
    pub priority: Priority,
    #[sea_orm(default_value = false)]
    pub completed: bool,
    #[sea_orm(default_value = false)]
    pub cancelled: bool,
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
