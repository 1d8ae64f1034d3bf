//! Reference data every fresh installation starts with.

use crate::{Department, EnvironmentalNorm};

/// Departments created on first start.
pub const DEFAULT_DEPARTMENTS: [&str; 3] = ["Manufatura", "Logística", "Operações"];

/// (code, title, description, agency, severity)
const DEFAULT_NORMS: [(&str, &str, &str, &str, &str); 5] = [
    (
        "CONAMA-001",
        "Resolução CONAMA nº 001",
        "Critérios básicos e diretrizes para avaliação de impacto ambiental",
        "CONAMA",
        "Média",
    ),
    (
        "ISO-14001",
        "ISO 14001:2015",
        "Sistema de Gestão Ambiental",
        "ISO",
        "Alta",
    ),
    (
        "NBR-10004",
        "NBR 10004",
        "Classificação de resíduos sólidos",
        "ABNT",
        "Alta",
    ),
    (
        "LEI-12305",
        "Lei 12.305/2010",
        "Política Nacional de Resíduos Sólidos",
        "Governo Federal",
        "Alta",
    ),
    (
        "LEI-9605",
        "Lei 9.605/1998",
        "Lei de Crimes Ambientais",
        "Governo Federal",
        "Alta",
    ),
];

pub fn default_departments() -> Vec<Department> {
    DEFAULT_DEPARTMENTS.iter().map(|name| Department::new(*name)).collect()
}

pub fn default_norms() -> Vec<EnvironmentalNorm> {
    DEFAULT_NORMS
        .iter()
        .map(|(code, title, description, agency, severity)| EnvironmentalNorm {
            id: None,
            code: (*code).to_string(),
            title: Some((*title).to_string()),
            description: Some((*description).to_string()),
            agency: Some((*agency).to_string()),
            severity: Some((*severity).to_string()),
        })
        .collect()
}
