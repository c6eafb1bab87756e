use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MarkingType {
    Entrada,
    Saida,
}

impl MarkingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkingType::Entrada => "entrada",
            MarkingType::Saida => "saida",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "entrada" => Some(MarkingType::Entrada),
            "saida" => Some(MarkingType::Saida),
            _ => None,
        }
    }
}
