//! Institution reference data.

use serde::{Deserialize, Serialize};

/// Identifier of an institution
pub type InstitutionId = i64;

/// Read-only institution record used by the pickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Institution as embedded in user summaries, where only the name is sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionRef {
    #[serde(rename = "nome")]
    pub name: String,
}
