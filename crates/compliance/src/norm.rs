use serde::{Deserialize, Serialize};

use verdicomply_core::NormId;

/// Reference environmental regulation or standard (e.g. ISO 14001).
///
/// `code` is unique across all norms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentalNorm {
    pub id: Option<NormId>,
    pub code: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub agency: Option<String>,
    pub severity: Option<String>,
}
