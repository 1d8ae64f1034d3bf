//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (foreign key violation) | `23503` | `Integrity(ForeignKey)` |
//! | Database (unique violation) | `23505` | `Integrity(Unique)` |
//! | Database (not null / check violation) | `23502` / `23514` | `Integrity(Other)` |
//! | Database (value too long) | `22001` | `Integrity(Other)` |
//! | Anything else | N/A | `Backend` |
//!
//! ## Thread Safety
//!
//! `PostgresStore` is `Send + Sync`; all statements go through the SQLx pool.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::error::ErrorKind;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;

use verdicomply_auth::{Role, UserAccount};
use verdicomply_compliance::{
    Audit, ComplianceLog, ComplianceRecord, Department, EnvironmentalNorm, PendingItem,
};
use verdicomply_core::{
    AuditId, ComplianceId, ComplianceLogId, DepartmentId, Flag, NormId, PendingItemId, UserId,
};

use super::r#trait::{
    AuditRepository, ComplianceLogRepository, ComplianceRecordRepository, CrudRepository,
    DepartmentRepository, IntegrityKind, NormRepository, PendingItemRepository, StoreError,
    StoreResult, UserRepository,
};
use crate::schema::SCHEMA_SQL;

/// Postgres implementation of every repository.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure every table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    #[instrument(skip(self))]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        tracing::info!("schema migration applied");
        Ok(())
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    // `UPDATE .. RETURNING` on a missing id yields no row.
    if let sqlx::Error::RowNotFound = err {
        return StoreError::NotFound;
    }
    if let sqlx::Error::Database(db) = &err {
        match db.kind() {
            ErrorKind::ForeignKeyViolation => return StoreError::Integrity(IntegrityKind::ForeignKey),
            ErrorKind::UniqueViolation => return StoreError::Integrity(IntegrityKind::Unique),
            ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                return StoreError::Integrity(IntegrityKind::Other);
            }
            _ => {}
        }
        if db.code().as_deref() == Some("22001") {
            return StoreError::Integrity(IntegrityKind::Other);
        }
    }
    StoreError::Backend(err.to_string())
}

fn decode_err(err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("row decode failed: {err}"))
}

fn parse_flag(raw: String) -> StoreResult<Flag> {
    raw.parse()
        .map_err(|e| StoreError::Backend(format!("invalid flag in row: {e}")))
}

fn department_from_row(row: &PgRow) -> StoreResult<Department> {
    Ok(Department {
        id: Some(DepartmentId::new(row.try_get("id").map_err(decode_err)?)),
        name: row.try_get("nome_departamento").map_err(decode_err)?,
    })
}

fn audit_from_row(row: &PgRow) -> StoreResult<Audit> {
    Ok(Audit {
        id: Some(AuditId::new(row.try_get("id").map_err(decode_err)?)),
        department_id: DepartmentId::new(row.try_get("departamento_id").map_err(decode_err)?),
        audit_date: row.try_get("data_auditoria").map_err(decode_err)?,
        auditor: row
            .try_get::<Option<String>, _>("auditor_responsavel")
            .map_err(decode_err)?
            .unwrap_or_default(),
        status: row.try_get("status_auditoria").map_err(decode_err)?,
    })
}

fn norm_from_row(row: &PgRow) -> StoreResult<EnvironmentalNorm> {
    Ok(EnvironmentalNorm {
        id: Some(NormId::new(row.try_get("id").map_err(decode_err)?)),
        code: row.try_get("codigo_norma").map_err(decode_err)?,
        title: row.try_get("titulo").map_err(decode_err)?,
        description: row.try_get("descricao").map_err(decode_err)?,
        agency: row.try_get("orgao_fiscalizador").map_err(decode_err)?,
        severity: row.try_get("severidade").map_err(decode_err)?,
    })
}

fn compliance_from_row(row: &PgRow) -> StoreResult<ComplianceRecord> {
    Ok(ComplianceRecord {
        id: Some(ComplianceId::new(row.try_get("id").map_err(decode_err)?)),
        audit_id: AuditId::new(row.try_get("auditoria_id").map_err(decode_err)?),
        norm_id: NormId::new(row.try_get("norma_id").map_err(decode_err)?),
        compliant: parse_flag(row.try_get("esta_conforme").map_err(decode_err)?)?,
        notes: row.try_get("observacao").map_err(decode_err)?,
    })
}

fn pending_from_row(row: &PgRow) -> StoreResult<PendingItem> {
    Ok(PendingItem {
        id: Some(PendingItemId::new(row.try_get("id").map_err(decode_err)?)),
        compliance_id: ComplianceId::new(row.try_get("conformidade_id").map_err(decode_err)?),
        description: row.try_get("descricao_pendencia").map_err(decode_err)?,
        due_date: row.try_get("prazo_resolucao").map_err(decode_err)?,
        resolved: parse_flag(row.try_get("resolvida").map_err(decode_err)?)?,
    })
}

fn log_from_row(row: &PgRow) -> StoreResult<ComplianceLog> {
    Ok(ComplianceLog {
        id: Some(ComplianceLogId::new(row.try_get("id").map_err(decode_err)?)),
        compliance_id: ComplianceId::new(row.try_get("conformidade_id").map_err(decode_err)?),
        action: row.try_get("acao").map_err(decode_err)?,
        recorded_on: row.try_get("data_registro").map_err(decode_err)?,
        details: row.try_get("detalhes").map_err(decode_err)?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<UserAccount> {
    let role: String = row.try_get("role").map_err(decode_err)?;
    Ok(UserAccount {
        id: Some(UserId::new(row.try_get("id").map_err(decode_err)?)),
        username: row.try_get("username").map_err(decode_err)?,
        password_hash: row.try_get("password").map_err(decode_err)?,
        role: role
            .parse::<Role>()
            .map_err(|e| StoreError::Backend(format!("invalid role in row: {e}")))?,
    })
}

fn map_rows<T>(rows: Vec<PgRow>, f: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
    rows.iter().map(f).collect()
}

/// `DELETE ... WHERE id = $1` shared by every table.
async fn delete_row(pool: &PgPool, table: &'static str, id: i64) -> StoreResult<()> {
    sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

async fn row_exists(pool: &PgPool, table: &'static str, id: i64) -> StoreResult<bool> {
    let row = sqlx::query(&format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1) AS present"))
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(map_sqlx_error)?;
    row.try_get("present").map_err(decode_err)
}

// ---------------------------------------------------------------------------
// departamento
// ---------------------------------------------------------------------------

#[async_trait]
impl CrudRepository<Department, DepartmentId> for PostgresStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<Department>> {
        let rows = sqlx::query("SELECT id, nome_departamento FROM departamento ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        map_rows(rows, department_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        sqlx::query("SELECT id, nome_departamento FROM departamento WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .as_ref()
            .map(department_from_row)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn save(&self, entity: Department) -> StoreResult<Department> {
        let row = match entity.id {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO departamento (nome_departamento)
                    VALUES ($1)
                    RETURNING id, nome_departamento
                    "#,
                )
                .bind(&entity.name)
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE departamento
                    SET nome_departamento = $2
                    WHERE id = $1
                    RETURNING id, nome_departamento
                    "#,
                )
                .bind(id.value())
                .bind(&entity.name)
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;
        department_from_row(&row)
    }

    async fn exists_by_id(&self, id: DepartmentId) -> StoreResult<bool> {
        row_exists(&self.pool, "departamento", id.value()).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: DepartmentId) -> StoreResult<()> {
        delete_row(&self.pool, "departamento", id.value()).await
    }
}

impl DepartmentRepository for PostgresStore {}

// ---------------------------------------------------------------------------
// auditoria
// ---------------------------------------------------------------------------

const AUDIT_COLUMNS: &str =
    "id, departamento_id, data_auditoria, auditor_responsavel, status_auditoria";

#[async_trait]
impl CrudRepository<Audit, AuditId> for PostgresStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<Audit>> {
        let rows = sqlx::query(&format!("SELECT {AUDIT_COLUMNS} FROM auditoria ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        map_rows(rows, audit_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: AuditId) -> StoreResult<Option<Audit>> {
        sqlx::query(&format!("SELECT {AUDIT_COLUMNS} FROM auditoria WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .as_ref()
            .map(audit_from_row)
            .transpose()
    }

    #[instrument(skip(self, entity))]
    async fn save(&self, entity: Audit) -> StoreResult<Audit> {
        let row = match entity.id {
            None => {
                sqlx::query(&format!(
                    r#"
                    INSERT INTO auditoria (departamento_id, data_auditoria, auditor_responsavel, status_auditoria)
                    VALUES ($1, $2, $3, $4)
                    RETURNING {AUDIT_COLUMNS}
                    "#
                ))
                .bind(entity.department_id.value())
                .bind(entity.audit_date)
                .bind(&entity.auditor)
                .bind(&entity.status)
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                sqlx::query(&format!(
                    r#"
                    UPDATE auditoria
                    SET departamento_id = $2, data_auditoria = $3, auditor_responsavel = $4, status_auditoria = $5
                    WHERE id = $1
                    RETURNING {AUDIT_COLUMNS}
                    "#
                ))
                .bind(id.value())
                .bind(entity.department_id.value())
                .bind(entity.audit_date)
                .bind(&entity.auditor)
                .bind(&entity.status)
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;
        audit_from_row(&row)
    }

    async fn exists_by_id(&self, id: AuditId) -> StoreResult<bool> {
        row_exists(&self.pool, "auditoria", id.value()).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: AuditId) -> StoreResult<()> {
        delete_row(&self.pool, "auditoria", id.value()).await
    }
}

#[async_trait]
impl AuditRepository for PostgresStore {
    #[instrument(skip(self))]
    async fn find_by_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Audit>> {
        let rows = sqlx::query(&format!(
            "SELECT {AUDIT_COLUMNS} FROM auditoria WHERE departamento_id = $1 ORDER BY id"
        ))
        .bind(department_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, audit_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_status_containing(&self, fragment: &str) -> StoreResult<Vec<Audit>> {
        let rows = sqlx::query(&format!(
            "SELECT {AUDIT_COLUMNS} FROM auditoria WHERE status_auditoria ILIKE '%' || $1 || '%' ORDER BY id"
        ))
        .bind(escape_like(fragment))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, audit_from_row)
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

// ---------------------------------------------------------------------------
// norma_ambiental
// ---------------------------------------------------------------------------

const NORM_COLUMNS: &str = "id, codigo_norma, titulo, descricao, orgao_fiscalizador, severidade";

#[async_trait]
impl CrudRepository<EnvironmentalNorm, NormId> for PostgresStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<EnvironmentalNorm>> {
        let rows = sqlx::query(&format!("SELECT {NORM_COLUMNS} FROM norma_ambiental ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        map_rows(rows, norm_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: NormId) -> StoreResult<Option<EnvironmentalNorm>> {
        sqlx::query(&format!("SELECT {NORM_COLUMNS} FROM norma_ambiental WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .as_ref()
            .map(norm_from_row)
            .transpose()
    }

    #[instrument(skip(self, entity))]
    async fn save(&self, entity: EnvironmentalNorm) -> StoreResult<EnvironmentalNorm> {
        let row = match entity.id {
            None => {
                sqlx::query(&format!(
                    r#"
                    INSERT INTO norma_ambiental (codigo_norma, titulo, descricao, orgao_fiscalizador, severidade)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING {NORM_COLUMNS}
                    "#
                ))
                .bind(&entity.code)
                .bind(&entity.title)
                .bind(&entity.description)
                .bind(&entity.agency)
                .bind(&entity.severity)
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                sqlx::query(&format!(
                    r#"
                    UPDATE norma_ambiental
                    SET codigo_norma = $2, titulo = $3, descricao = $4, orgao_fiscalizador = $5, severidade = $6
                    WHERE id = $1
                    RETURNING {NORM_COLUMNS}
                    "#
                ))
                .bind(id.value())
                .bind(&entity.code)
                .bind(&entity.title)
                .bind(&entity.description)
                .bind(&entity.agency)
                .bind(&entity.severity)
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;
        norm_from_row(&row)
    }

    async fn exists_by_id(&self, id: NormId) -> StoreResult<bool> {
        row_exists(&self.pool, "norma_ambiental", id.value()).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: NormId) -> StoreResult<()> {
        delete_row(&self.pool, "norma_ambiental", id.value()).await
    }
}

#[async_trait]
impl NormRepository for PostgresStore {
    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> StoreResult<Option<EnvironmentalNorm>> {
        sqlx::query(&format!("SELECT {NORM_COLUMNS} FROM norma_ambiental WHERE codigo_norma = $1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .as_ref()
            .map(norm_from_row)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_agency(&self, agency: &str) -> StoreResult<Vec<EnvironmentalNorm>> {
        let rows = sqlx::query(&format!(
            "SELECT {NORM_COLUMNS} FROM norma_ambiental WHERE orgao_fiscalizador = $1 ORDER BY id"
        ))
        .bind(agency)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, norm_from_row)
    }

    async fn exists_by_code(&self, code: &str) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM norma_ambiental WHERE codigo_norma = $1) AS present",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        row.try_get("present").map_err(decode_err)
    }
}

// ---------------------------------------------------------------------------
// conformidade
// ---------------------------------------------------------------------------

const COMPLIANCE_COLUMNS: &str = "id, auditoria_id, norma_id, esta_conforme, observacao";

#[async_trait]
impl CrudRepository<ComplianceRecord, ComplianceId> for PostgresStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<ComplianceRecord>> {
        let rows = sqlx::query(&format!("SELECT {COMPLIANCE_COLUMNS} FROM conformidade ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        map_rows(rows, compliance_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ComplianceId) -> StoreResult<Option<ComplianceRecord>> {
        sqlx::query(&format!("SELECT {COMPLIANCE_COLUMNS} FROM conformidade WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .as_ref()
            .map(compliance_from_row)
            .transpose()
    }

    #[instrument(skip(self, entity))]
    async fn save(&self, entity: ComplianceRecord) -> StoreResult<ComplianceRecord> {
        let row = match entity.id {
            None => {
                sqlx::query(&format!(
                    r#"
                    INSERT INTO conformidade (auditoria_id, norma_id, esta_conforme, observacao)
                    VALUES ($1, $2, $3, $4)
                    RETURNING {COMPLIANCE_COLUMNS}
                    "#
                ))
                .bind(entity.audit_id.value())
                .bind(entity.norm_id.value())
                .bind(entity.compliant.as_str())
                .bind(&entity.notes)
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                sqlx::query(&format!(
                    r#"
                    UPDATE conformidade
                    SET auditoria_id = $2, norma_id = $3, esta_conforme = $4, observacao = $5
                    WHERE id = $1
                    RETURNING {COMPLIANCE_COLUMNS}
                    "#
                ))
                .bind(id.value())
                .bind(entity.audit_id.value())
                .bind(entity.norm_id.value())
                .bind(entity.compliant.as_str())
                .bind(&entity.notes)
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;
        compliance_from_row(&row)
    }

    async fn exists_by_id(&self, id: ComplianceId) -> StoreResult<bool> {
        row_exists(&self.pool, "conformidade", id.value()).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: ComplianceId) -> StoreResult<()> {
        delete_row(&self.pool, "conformidade", id.value()).await
    }
}

#[async_trait]
impl ComplianceRecordRepository for PostgresStore {
    #[instrument(skip(self))]
    async fn find_by_audit(&self, audit_id: AuditId) -> StoreResult<Vec<ComplianceRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMPLIANCE_COLUMNS} FROM conformidade WHERE auditoria_id = $1 ORDER BY id"
        ))
        .bind(audit_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, compliance_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_flag(&self, compliant: Flag) -> StoreResult<Vec<ComplianceRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMPLIANCE_COLUMNS} FROM conformidade WHERE esta_conforme = $1 ORDER BY id"
        ))
        .bind(compliant.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, compliance_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_norm(&self, norm_id: NormId) -> StoreResult<Vec<ComplianceRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMPLIANCE_COLUMNS} FROM conformidade WHERE norma_id = $1 ORDER BY id"
        ))
        .bind(norm_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, compliance_from_row)
    }
}

// ---------------------------------------------------------------------------
// pendencia
// ---------------------------------------------------------------------------

const PENDING_COLUMNS: &str =
    "id, conformidade_id, descricao_pendencia, prazo_resolucao, resolvida";

#[async_trait]
impl CrudRepository<PendingItem, PendingItemId> for PostgresStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<PendingItem>> {
        let rows = sqlx::query(&format!("SELECT {PENDING_COLUMNS} FROM pendencia ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        map_rows(rows, pending_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: PendingItemId) -> StoreResult<Option<PendingItem>> {
        sqlx::query(&format!("SELECT {PENDING_COLUMNS} FROM pendencia WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .as_ref()
            .map(pending_from_row)
            .transpose()
    }

    #[instrument(skip(self, entity))]
    async fn save(&self, entity: PendingItem) -> StoreResult<PendingItem> {
        let row = match entity.id {
            None => {
                sqlx::query(&format!(
                    r#"
                    INSERT INTO pendencia (conformidade_id, descricao_pendencia, prazo_resolucao, resolvida)
                    VALUES ($1, $2, $3, $4)
                    RETURNING {PENDING_COLUMNS}
                    "#
                ))
                .bind(entity.compliance_id.value())
                .bind(&entity.description)
                .bind(entity.due_date)
                .bind(entity.resolved.as_str())
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                sqlx::query(&format!(
                    r#"
                    UPDATE pendencia
                    SET conformidade_id = $2, descricao_pendencia = $3, prazo_resolucao = $4, resolvida = $5
                    WHERE id = $1
                    RETURNING {PENDING_COLUMNS}
                    "#
                ))
                .bind(id.value())
                .bind(entity.compliance_id.value())
                .bind(&entity.description)
                .bind(entity.due_date)
                .bind(entity.resolved.as_str())
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;
        pending_from_row(&row)
    }

    async fn exists_by_id(&self, id: PendingItemId) -> StoreResult<bool> {
        row_exists(&self.pool, "pendencia", id.value()).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: PendingItemId) -> StoreResult<()> {
        delete_row(&self.pool, "pendencia", id.value()).await
    }
}

#[async_trait]
impl PendingItemRepository for PostgresStore {
    #[instrument(skip(self))]
    async fn find_by_compliance(&self, compliance_id: ComplianceId) -> StoreResult<Vec<PendingItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {PENDING_COLUMNS} FROM pendencia WHERE conformidade_id = $1 ORDER BY id"
        ))
        .bind(compliance_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, pending_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_resolved(&self, resolved: Flag) -> StoreResult<Vec<PendingItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {PENDING_COLUMNS} FROM pendencia WHERE resolvida = $1 ORDER BY id"
        ))
        .bind(resolved.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, pending_from_row)
    }

    #[instrument(skip(self))]
    async fn find_overdue(&self, reference: NaiveDate) -> StoreResult<Vec<PendingItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {PENDING_COLUMNS} FROM pendencia WHERE resolvida = 'N' AND prazo_resolucao < $1 ORDER BY prazo_resolucao, id"
        ))
        .bind(reference)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, pending_from_row)
    }
}

// ---------------------------------------------------------------------------
// log_conformidade
// ---------------------------------------------------------------------------

const LOG_COLUMNS: &str = "id, conformidade_id, acao, data_registro, detalhes";

#[async_trait]
impl CrudRepository<ComplianceLog, ComplianceLogId> for PostgresStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<ComplianceLog>> {
        let rows = sqlx::query(&format!("SELECT {LOG_COLUMNS} FROM log_conformidade ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        map_rows(rows, log_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ComplianceLogId) -> StoreResult<Option<ComplianceLog>> {
        sqlx::query(&format!("SELECT {LOG_COLUMNS} FROM log_conformidade WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .as_ref()
            .map(log_from_row)
            .transpose()
    }

    #[instrument(skip(self, entity))]
    async fn save(&self, entity: ComplianceLog) -> StoreResult<ComplianceLog> {
        let row = match entity.id {
            None => {
                sqlx::query(&format!(
                    r#"
                    INSERT INTO log_conformidade (conformidade_id, acao, data_registro, detalhes)
                    VALUES ($1, $2, $3, $4)
                    RETURNING {LOG_COLUMNS}
                    "#
                ))
                .bind(entity.compliance_id.value())
                .bind(&entity.action)
                .bind(entity.recorded_on)
                .bind(&entity.details)
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                sqlx::query(&format!(
                    r#"
                    UPDATE log_conformidade
                    SET conformidade_id = $2, acao = $3, data_registro = $4, detalhes = $5
                    WHERE id = $1
                    RETURNING {LOG_COLUMNS}
                    "#
                ))
                .bind(id.value())
                .bind(entity.compliance_id.value())
                .bind(&entity.action)
                .bind(entity.recorded_on)
                .bind(&entity.details)
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;
        log_from_row(&row)
    }

    async fn exists_by_id(&self, id: ComplianceLogId) -> StoreResult<bool> {
        row_exists(&self.pool, "log_conformidade", id.value()).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: ComplianceLogId) -> StoreResult<()> {
        delete_row(&self.pool, "log_conformidade", id.value()).await
    }
}

#[async_trait]
impl ComplianceLogRepository for PostgresStore {
    #[instrument(skip(self))]
    async fn find_by_compliance(&self, compliance_id: ComplianceId) -> StoreResult<Vec<ComplianceLog>> {
        let rows = sqlx::query(&format!(
            "SELECT {LOG_COLUMNS} FROM log_conformidade WHERE conformidade_id = $1 ORDER BY data_registro DESC, id DESC"
        ))
        .bind(compliance_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, log_from_row)
    }

    #[instrument(skip(self))]
    async fn find_by_action(&self, action: &str) -> StoreResult<Vec<ComplianceLog>> {
        let rows = sqlx::query(&format!(
            "SELECT {LOG_COLUMNS} FROM log_conformidade WHERE acao = $1 ORDER BY id"
        ))
        .bind(action)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        map_rows(rows, log_from_row)
    }
}

// ---------------------------------------------------------------------------
// usuarios
// ---------------------------------------------------------------------------

#[async_trait]
impl UserRepository for PostgresStore {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        sqlx::query("SELECT id, username, password, role FROM usuarios WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM usuarios WHERE username = $1) AS present")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.try_get("present").map_err(decode_err)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn save_user(&self, user: UserAccount) -> StoreResult<UserAccount> {
        let row = match user.id {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO usuarios (username, password, role)
                    VALUES ($1, $2, $3)
                    RETURNING id, username, password, role
                    "#,
                )
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(user.role.as_str())
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE usuarios SET username = $2, password = $3, role = $4
                    WHERE id = $1
                    RETURNING id, username, password, role
                    "#,
                )
                .bind(id.value())
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(user.role.as_str())
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;
        user_from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
        assert_eq!(escape_like("andamento"), "andamento");
    }

    #[test]
    fn missing_rows_and_pool_errors_are_classified() {
        assert!(matches!(map_sqlx_error(sqlx::Error::RowNotFound), StoreError::NotFound));
        assert!(matches!(map_sqlx_error(sqlx::Error::PoolClosed), StoreError::Backend(_)));
    }
}
