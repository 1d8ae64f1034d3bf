use std::borrow::Cow;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use verdicomply_auth::Role;
use verdicomply_compliance::{
    Audit, ComplianceLog, ComplianceRecord, Department, EnvironmentalNorm, PendingItem,
};
use verdicomply_core::{AuditId, ComplianceId, DepartmentId, Flag, NormId};

use crate::app::errors::{ApiError, FieldError};
use crate::app::services::{AuditView, ComplianceLogView, ComplianceView, PendingItemView};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "O nome do departamento é obrigatório"),
        length(max = 100, message = "O nome do departamento deve ter no máximo 100 caracteres")
    )]
    pub nome_departamento: Option<String>,
}

impl DepartmentRequest {
    pub fn into_name(self) -> Result<String, ApiError> {
        present(self.nome_departamento, "nomeDepartamento")
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    #[validate(required(message = "O departamento é obrigatório"))]
    pub departamento_id: Option<i64>,

    #[validate(custom(function = "not_in_future"))]
    pub data_auditoria: Option<NaiveDate>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "O auditor responsável é obrigatório"),
        length(max = 100, message = "O auditor responsável deve ter no máximo 100 caracteres")
    )]
    pub auditor_responsavel: Option<String>,

    #[validate(length(max = 20, message = "O status da auditoria deve ter no máximo 20 caracteres"))]
    pub status_auditoria: Option<String>,
}

impl AuditRequest {
    pub fn into_audit(self) -> Result<Audit, ApiError> {
        Ok(Audit {
            id: None,
            department_id: DepartmentId::new(present(self.departamento_id, "departamentoId")?),
            audit_date: self.data_auditoria,
            auditor: present(self.auditor_responsavel, "auditorResponsavel")?,
            status: self.status_auditoria,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRequest {
    #[validate(required(message = "A auditoria é obrigatória"))]
    pub auditoria_id: Option<i64>,

    #[validate(required(message = "A norma ambiental é obrigatória"))]
    pub norma_ambiental_id: Option<i64>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "O status de conformidade é obrigatório"),
        custom(function = "compliance_flag")
    )]
    pub esta_conforme: Option<String>,

    #[validate(length(max = 200, message = "A observação deve ter no máximo 200 caracteres"))]
    pub observacao: Option<String>,
}

impl ComplianceRequest {
    pub fn into_record(self) -> Result<ComplianceRecord, ApiError> {
        Ok(ComplianceRecord {
            id: None,
            audit_id: AuditId::new(present(self.auditoria_id, "auditoriaId")?),
            norm_id: NormId::new(present(self.norma_ambiental_id, "normaAmbientalId")?),
            compliant: present(self.esta_conforme, "estaConforme")?.parse::<Flag>()?,
            notes: self.observacao,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PendingItemRequest {
    #[validate(required(message = "A conformidade é obrigatória"))]
    pub conformidade_id: Option<i64>,

    #[serde(default, alias = "descricaoPendencia", deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "A descrição da pendência é obrigatória"),
        length(max = 200, message = "A descrição deve ter no máximo 200 caracteres")
    )]
    pub descricao: Option<String>,

    #[validate(required(message = "O prazo de resolução é obrigatório"))]
    pub prazo_resolucao: Option<NaiveDate>,

    /// Defaults to `N` when absent.
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(custom(function = "resolved_flag"))]
    pub resolvida: Option<String>,
}

impl PendingItemRequest {
    pub fn into_item(self) -> Result<PendingItem, ApiError> {
        let resolved = match self.resolvida {
            Some(raw) => raw.parse::<Flag>()?,
            None => Flag::Nao,
        };
        Ok(PendingItem {
            id: None,
            compliance_id: ComplianceId::new(present(self.conformidade_id, "conformidadeId")?),
            description: present(self.descricao, "descricao")?,
            due_date: present(self.prazo_resolucao, "prazoResolucao")?,
            resolved,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceLogRequest {
    #[validate(required(message = "A conformidade é obrigatória"))]
    pub conformidade_id: Option<i64>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "A ação é obrigatória"),
        length(max = 20, message = "A ação deve ter no máximo 20 caracteres")
    )]
    pub acao: Option<String>,

    #[validate(required(message = "A data de registro é obrigatória"))]
    pub data_registro: Option<NaiveDate>,

    #[validate(length(max = 200, message = "Os detalhes devem ter no máximo 200 caracteres"))]
    pub detalhes: Option<String>,
}

impl ComplianceLogRequest {
    pub fn into_log(self) -> Result<ComplianceLog, ApiError> {
        Ok(ComplianceLog {
            id: None,
            compliance_id: ComplianceId::new(present(self.conformidade_id, "conformidadeId")?),
            action: present(self.acao, "acao")?,
            recorded_on: present(self.data_registro, "dataRegistro")?,
            details: self.detalhes,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NormRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "O código da norma é obrigatório"),
        length(max = 20, message = "O código deve ter no máximo 20 caracteres")
    )]
    pub codigo_norma: Option<String>,

    #[validate(length(max = 100, message = "O título deve ter no máximo 100 caracteres"))]
    pub titulo: Option<String>,

    #[validate(length(max = 200, message = "A descrição deve ter no máximo 200 caracteres"))]
    pub descricao: Option<String>,

    #[validate(length(max = 100, message = "O órgão fiscalizador deve ter no máximo 100 caracteres"))]
    pub orgao_fiscalizador: Option<String>,

    #[validate(length(max = 20, message = "A severidade deve ter no máximo 20 caracteres"))]
    pub severidade: Option<String>,
}

impl NormRequest {
    pub fn into_norm(self) -> Result<EnvironmentalNorm, ApiError> {
        Ok(EnvironmentalNorm {
            id: None,
            code: present(self.codigo_norma, "codigoNorma")?,
            title: self.titulo,
            description: self.descricao,
            agency: self.orgao_fiscalizador,
            severity: self.severidade,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "Nome de usuário é obrigatório"))]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "Senha é obrigatória"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "O nome de usuário é obrigatório"),
        length(min = 3, max = 50, message = "O nome de usuário deve ter entre 3 e 50 caracteres")
    )]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "A senha é obrigatória"),
        length(min = 6, message = "A senha deve ter pelo menos 6 caracteres")
    )]
    pub password: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "O perfil é obrigatório"), custom(function = "known_role"))]
    pub role: Option<String>,
}

impl RegistrationRequest {
    pub fn into_parts(self) -> Result<(String, String, Role), ApiError> {
        let role = present(self.role, "role")?
            .parse::<Role>()
            .map_err(|_| ApiError::BadRequest("O perfil deve ser ADMIN, GESTOR ou AUDITOR".to_string()))?;
        Ok((present(self.username, "username")?, present(self.password, "password")?, role))
    }
}

/// `?data=YYYY-MM-DD` on the overdue listing.
#[derive(Debug, Deserialize)]
pub struct OverdueQuery {
    pub data: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: Option<i64>,
    pub nome_departamento: String,
}

impl From<Department> for DepartmentResponse {
    fn from(department: Department) -> Self {
        Self {
            id: department.id.map(|id| id.value()),
            nome_departamento: department.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    pub id: Option<i64>,
    pub departamento_id: i64,
    pub departamento: DepartmentResponse,
    pub data_auditoria: Option<NaiveDate>,
    pub auditor_responsavel: String,
    pub status_auditoria: Option<String>,
}

impl From<AuditView> for AuditResponse {
    fn from(view: AuditView) -> Self {
        let AuditView { audit, department } = view;
        Self {
            id: audit.id.map(|id| id.value()),
            departamento_id: audit.department_id.value(),
            departamento: department.into(),
            data_auditoria: audit.audit_date,
            auditor_responsavel: audit.auditor,
            status_auditoria: audit.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormResponse {
    pub id: Option<i64>,
    pub codigo_norma: String,
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub orgao_fiscalizador: Option<String>,
    pub severidade: Option<String>,
}

impl From<EnvironmentalNorm> for NormResponse {
    fn from(norm: EnvironmentalNorm) -> Self {
        Self {
            id: norm.id.map(|id| id.value()),
            codigo_norma: norm.code,
            titulo: norm.title,
            descricao: norm.description,
            orgao_fiscalizador: norm.agency,
            severidade: norm.severity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResponse {
    pub id: Option<i64>,
    pub auditoria_id: i64,
    pub norma_ambiental_id: i64,
    pub esta_conforme: Flag,
    pub observacao: Option<String>,
    pub auditoria: AuditResponse,
    pub norma_ambiental: NormResponse,
}

impl From<ComplianceView> for ComplianceResponse {
    fn from(view: ComplianceView) -> Self {
        let ComplianceView { record, audit, norm } = view;
        Self {
            id: record.id.map(|id| id.value()),
            auditoria_id: record.audit_id.value(),
            norma_ambiental_id: record.norm_id.value(),
            esta_conforme: record.compliant,
            observacao: record.notes,
            auditoria: audit.into(),
            norma_ambiental: norm.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingItemResponse {
    pub id: Option<i64>,
    pub conformidade_id: i64,
    pub descricao: String,
    pub prazo_resolucao: NaiveDate,
    pub resolvida: Flag,
    pub conformidade: ComplianceResponse,
}

impl From<PendingItemView> for PendingItemResponse {
    fn from(view: PendingItemView) -> Self {
        let PendingItemView { item, compliance } = view;
        Self {
            id: item.id.map(|id| id.value()),
            conformidade_id: item.compliance_id.value(),
            descricao: item.description,
            prazo_resolucao: item.due_date,
            resolvida: item.resolved,
            conformidade: compliance.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceLogResponse {
    pub id: Option<i64>,
    pub conformidade_id: i64,
    pub acao: String,
    pub data_registro: NaiveDate,
    pub detalhes: Option<String>,
    pub conformidade: ComplianceResponse,
}

impl From<ComplianceLogView> for ComplianceLogResponse {
    fn from(view: ComplianceLogView) -> Self {
        let ComplianceLogView { log, compliance } = view;
        Self {
            id: log.id.map(|id| id.value()),
            conformidade_id: log.compliance_id.value(),
            acao: log.action,
            data_registro: log.recorded_on,
            detalhes: log.details,
            conformidade: compliance.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub tipo: String,
    pub token: Option<String>,
    pub username: String,
    pub roles: Vec<String>,
}

impl TokenResponse {
    pub fn bearer(token: String, username: String, roles: &[Role]) -> Self {
        Self {
            tipo: "Bearer".to_string(),
            token: Some(token),
            username,
            roles: roles.iter().map(Role::authority).collect(),
        }
    }

    /// Body of a failed login: no token, no roles.
    pub fn rejected(username: String) -> Self {
        Self {
            tipo: "erro".to_string(),
            token: None,
            username,
            roles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub username: String,
    pub role: String,
    pub mensagem: String,
}

// -------------------------
// Helpers
// -------------------------

pub fn list<V, R: From<V>>(views: Vec<V>) -> Vec<R> {
    views.into_iter().map(R::from).collect()
}

/// Treat `""` and whitespace-only strings like a missing value.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Unwrap a field that validation already required.
fn present<T>(value: Option<T>, campo: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| {
        ApiError::Validation(vec![FieldError {
            campo: campo.to_string(),
            mensagem: "Campo obrigatório".to_string(),
        }])
    })
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn compliance_flag(value: &str) -> Result<(), ValidationError> {
    match value {
        "S" | "N" => Ok(()),
        _ => Err(invalid(
            "flag",
            "O valor deve ser 'S' para conforme ou 'N' para não conforme",
        )),
    }
}

fn resolved_flag(value: &str) -> Result<(), ValidationError> {
    match value {
        "S" | "N" => Ok(()),
        _ => Err(invalid(
            "flag",
            "O valor deve ser 'S' para resolvida ou 'N' para não resolvida",
        )),
    }
}

fn not_in_future(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Local::now().date_naive() {
        return Err(invalid("past_or_present", "A data da auditoria não pode ser futura"));
    }
    Ok(())
}

fn known_role(value: &str) -> Result<(), ValidationError> {
    if Role::ALL.iter().any(|role| role.as_str() == value) {
        return Ok(());
    }
    Err(invalid("role", "O perfil deve ser ADMIN, GESTOR ou AUDITOR"))
}
