use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use verdicomply_auth::UserAccount;
use verdicomply_compliance::{
    compliance_log::sort_newest_first, Audit, ComplianceLog, ComplianceRecord, Department,
    EnvironmentalNorm, PendingItem,
};
use verdicomply_core::{
    AuditId, ComplianceId, ComplianceLogId, DepartmentId, Flag, NormId, PendingItemId, UserId,
};

use super::r#trait::{
    AuditRepository, ComplianceLogRepository, ComplianceRecordRepository, CrudRepository,
    DepartmentRepository, IntegrityKind, NormRepository, PendingItemRepository, StoreError,
    StoreResult, UserRepository,
};

/// One table: rows keyed by id plus its sequence.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    /// Resolve the id to store under: the given one, which must already exist,
    /// or the next sequence value.
    fn assign_id(&mut self, id: Option<i64>) -> StoreResult<i64> {
        match id {
            Some(id) if self.rows.contains_key(&id) => Ok(id),
            Some(_) => Err(StoreError::NotFound),
            None => {
                self.last_id += 1;
                Ok(self.last_id)
            }
        }
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| pred(row)).cloned().collect()
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

#[derive(Debug, Default)]
struct Tables {
    departments: Table<Department>,
    audits: Table<Audit>,
    norms: Table<EnvironmentalNorm>,
    compliance: Table<ComplianceRecord>,
    pending_items: Table<PendingItem>,
    logs: Table<ComplianceLog>,
    users: Table<UserAccount>,
}

/// In-memory implementation of every repository.
///
/// Intended for tests/dev. Foreign keys, unique columns and column lengths are
/// checked the same way the Postgres schema checks them, so callers see the
/// same `StoreError::Integrity` outcomes on either backend.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

fn require(condition: bool, kind: IntegrityKind) -> StoreResult<()> {
    if condition {
        Ok(())
    } else {
        Err(StoreError::Integrity(kind))
    }
}

fn fits(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

fn fits_opt(value: &Option<String>, max: usize) -> bool {
    value.as_deref().is_none_or(|v| fits(v, max))
}

// ---------------------------------------------------------------------------
// departamento
// ---------------------------------------------------------------------------

#[async_trait]
impl CrudRepository<Department, DepartmentId> for InMemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<Department>> {
        Ok(self.read()?.departments.all())
    }

    async fn find_by_id(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        Ok(self.read()?.departments.get(id.value()))
    }

    async fn save(&self, mut entity: Department) -> StoreResult<Department> {
        require(fits(&entity.name, 100), IntegrityKind::Other)?;

        let mut tables = self.write()?;
        let id = tables.departments.assign_id(entity.id.map(i64::from))?;
        entity.id = Some(DepartmentId::new(id));
        tables.departments.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn exists_by_id(&self, id: DepartmentId) -> StoreResult<bool> {
        Ok(self.read()?.departments.contains(id.value()))
    }

    async fn delete_by_id(&self, id: DepartmentId) -> StoreResult<()> {
        let mut tables = self.write()?;
        let referenced = tables.audits.rows.values().any(|a| a.department_id == id);
        require(!referenced, IntegrityKind::ForeignKey)?;
        tables.departments.rows.remove(&id.value());
        Ok(())
    }
}

impl DepartmentRepository for InMemoryStore {}

// ---------------------------------------------------------------------------
// auditoria
// ---------------------------------------------------------------------------

#[async_trait]
impl CrudRepository<Audit, AuditId> for InMemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<Audit>> {
        Ok(self.read()?.audits.all())
    }

    async fn find_by_id(&self, id: AuditId) -> StoreResult<Option<Audit>> {
        Ok(self.read()?.audits.get(id.value()))
    }

    async fn save(&self, mut entity: Audit) -> StoreResult<Audit> {
        require(
            fits(&entity.auditor, 100) && fits_opt(&entity.status, 20),
            IntegrityKind::Other,
        )?;

        let mut tables = self.write()?;
        require(
            tables.departments.contains(entity.department_id.value()),
            IntegrityKind::ForeignKey,
        )?;
        let id = tables.audits.assign_id(entity.id.map(i64::from))?;
        entity.id = Some(AuditId::new(id));
        tables.audits.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn exists_by_id(&self, id: AuditId) -> StoreResult<bool> {
        Ok(self.read()?.audits.contains(id.value()))
    }

    async fn delete_by_id(&self, id: AuditId) -> StoreResult<()> {
        let mut tables = self.write()?;
        let referenced = tables.compliance.rows.values().any(|c| c.audit_id == id);
        require(!referenced, IntegrityKind::ForeignKey)?;
        tables.audits.rows.remove(&id.value());
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for InMemoryStore {
    async fn find_by_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Audit>> {
        Ok(self.read()?.audits.filter(|a| a.department_id == department_id))
    }

    async fn find_by_status_containing(&self, fragment: &str) -> StoreResult<Vec<Audit>> {
        Ok(self.read()?.audits.filter(|a| a.status_matches(fragment)))
    }
}

// ---------------------------------------------------------------------------
// norma_ambiental
// ---------------------------------------------------------------------------

#[async_trait]
impl CrudRepository<EnvironmentalNorm, NormId> for InMemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<EnvironmentalNorm>> {
        Ok(self.read()?.norms.all())
    }

    async fn find_by_id(&self, id: NormId) -> StoreResult<Option<EnvironmentalNorm>> {
        Ok(self.read()?.norms.get(id.value()))
    }

    async fn save(&self, mut entity: EnvironmentalNorm) -> StoreResult<EnvironmentalNorm> {
        require(
            fits(&entity.code, 20)
                && fits_opt(&entity.title, 100)
                && fits_opt(&entity.description, 200)
                && fits_opt(&entity.agency, 100)
                && fits_opt(&entity.severity, 20),
            IntegrityKind::Other,
        )?;

        let mut tables = self.write()?;
        let duplicate = tables
            .norms
            .rows
            .values()
            .any(|n| n.code == entity.code && n.id != entity.id);
        require(!duplicate, IntegrityKind::Unique)?;

        let id = tables.norms.assign_id(entity.id.map(i64::from))?;
        entity.id = Some(NormId::new(id));
        tables.norms.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn exists_by_id(&self, id: NormId) -> StoreResult<bool> {
        Ok(self.read()?.norms.contains(id.value()))
    }

    async fn delete_by_id(&self, id: NormId) -> StoreResult<()> {
        let mut tables = self.write()?;
        let referenced = tables.compliance.rows.values().any(|c| c.norm_id == id);
        require(!referenced, IntegrityKind::ForeignKey)?;
        tables.norms.rows.remove(&id.value());
        Ok(())
    }
}

#[async_trait]
impl NormRepository for InMemoryStore {
    async fn find_by_code(&self, code: &str) -> StoreResult<Option<EnvironmentalNorm>> {
        Ok(self.read()?.norms.filter(|n| n.code == code).into_iter().next())
    }

    async fn find_by_agency(&self, agency: &str) -> StoreResult<Vec<EnvironmentalNorm>> {
        Ok(self
            .read()?
            .norms
            .filter(|n| n.agency.as_deref() == Some(agency)))
    }

    async fn exists_by_code(&self, code: &str) -> StoreResult<bool> {
        Ok(self.read()?.norms.rows.values().any(|n| n.code == code))
    }
}

// ---------------------------------------------------------------------------
// conformidade
// ---------------------------------------------------------------------------

#[async_trait]
impl CrudRepository<ComplianceRecord, ComplianceId> for InMemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<ComplianceRecord>> {
        Ok(self.read()?.compliance.all())
    }

    async fn find_by_id(&self, id: ComplianceId) -> StoreResult<Option<ComplianceRecord>> {
        Ok(self.read()?.compliance.get(id.value()))
    }

    async fn save(&self, mut entity: ComplianceRecord) -> StoreResult<ComplianceRecord> {
        require(fits_opt(&entity.notes, 200), IntegrityKind::Other)?;

        let mut tables = self.write()?;
        require(
            tables.audits.contains(entity.audit_id.value())
                && tables.norms.contains(entity.norm_id.value()),
            IntegrityKind::ForeignKey,
        )?;
        let id = tables.compliance.assign_id(entity.id.map(i64::from))?;
        entity.id = Some(ComplianceId::new(id));
        tables.compliance.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn exists_by_id(&self, id: ComplianceId) -> StoreResult<bool> {
        Ok(self.read()?.compliance.contains(id.value()))
    }

    async fn delete_by_id(&self, id: ComplianceId) -> StoreResult<()> {
        let mut tables = self.write()?;
        let referenced = tables.pending_items.rows.values().any(|p| p.compliance_id == id)
            || tables.logs.rows.values().any(|l| l.compliance_id == id);
        require(!referenced, IntegrityKind::ForeignKey)?;
        tables.compliance.rows.remove(&id.value());
        Ok(())
    }
}

#[async_trait]
impl ComplianceRecordRepository for InMemoryStore {
    async fn find_by_audit(&self, audit_id: AuditId) -> StoreResult<Vec<ComplianceRecord>> {
        Ok(self.read()?.compliance.filter(|c| c.audit_id == audit_id))
    }

    async fn find_by_flag(&self, compliant: Flag) -> StoreResult<Vec<ComplianceRecord>> {
        Ok(self.read()?.compliance.filter(|c| c.compliant == compliant))
    }

    async fn find_by_norm(&self, norm_id: NormId) -> StoreResult<Vec<ComplianceRecord>> {
        Ok(self.read()?.compliance.filter(|c| c.norm_id == norm_id))
    }
}

// ---------------------------------------------------------------------------
// pendencia
// ---------------------------------------------------------------------------

#[async_trait]
impl CrudRepository<PendingItem, PendingItemId> for InMemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<PendingItem>> {
        Ok(self.read()?.pending_items.all())
    }

    async fn find_by_id(&self, id: PendingItemId) -> StoreResult<Option<PendingItem>> {
        Ok(self.read()?.pending_items.get(id.value()))
    }

    async fn save(&self, mut entity: PendingItem) -> StoreResult<PendingItem> {
        require(fits(&entity.description, 200), IntegrityKind::Other)?;

        let mut tables = self.write()?;
        require(
            tables.compliance.contains(entity.compliance_id.value()),
            IntegrityKind::ForeignKey,
        )?;
        let id = tables.pending_items.assign_id(entity.id.map(i64::from))?;
        entity.id = Some(PendingItemId::new(id));
        tables.pending_items.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn exists_by_id(&self, id: PendingItemId) -> StoreResult<bool> {
        Ok(self.read()?.pending_items.contains(id.value()))
    }

    async fn delete_by_id(&self, id: PendingItemId) -> StoreResult<()> {
        self.write()?.pending_items.rows.remove(&id.value());
        Ok(())
    }
}

#[async_trait]
impl PendingItemRepository for InMemoryStore {
    async fn find_by_compliance(&self, compliance_id: ComplianceId) -> StoreResult<Vec<PendingItem>> {
        Ok(self
            .read()?
            .pending_items
            .filter(|p| p.compliance_id == compliance_id))
    }

    async fn find_by_resolved(&self, resolved: Flag) -> StoreResult<Vec<PendingItem>> {
        Ok(self.read()?.pending_items.filter(|p| p.resolved == resolved))
    }

    async fn find_overdue(&self, reference: NaiveDate) -> StoreResult<Vec<PendingItem>> {
        Ok(self.read()?.pending_items.filter(|p| p.is_overdue(reference)))
    }
}

// ---------------------------------------------------------------------------
// log_conformidade
// ---------------------------------------------------------------------------

#[async_trait]
impl CrudRepository<ComplianceLog, ComplianceLogId> for InMemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<ComplianceLog>> {
        Ok(self.read()?.logs.all())
    }

    async fn find_by_id(&self, id: ComplianceLogId) -> StoreResult<Option<ComplianceLog>> {
        Ok(self.read()?.logs.get(id.value()))
    }

    async fn save(&self, mut entity: ComplianceLog) -> StoreResult<ComplianceLog> {
        require(
            fits(&entity.action, 20) && fits_opt(&entity.details, 200),
            IntegrityKind::Other,
        )?;

        let mut tables = self.write()?;
        require(
            tables.compliance.contains(entity.compliance_id.value()),
            IntegrityKind::ForeignKey,
        )?;
        let id = tables.logs.assign_id(entity.id.map(i64::from))?;
        entity.id = Some(ComplianceLogId::new(id));
        tables.logs.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn exists_by_id(&self, id: ComplianceLogId) -> StoreResult<bool> {
        Ok(self.read()?.logs.contains(id.value()))
    }

    async fn delete_by_id(&self, id: ComplianceLogId) -> StoreResult<()> {
        self.write()?.logs.rows.remove(&id.value());
        Ok(())
    }
}

#[async_trait]
impl ComplianceLogRepository for InMemoryStore {
    async fn find_by_compliance(&self, compliance_id: ComplianceId) -> StoreResult<Vec<ComplianceLog>> {
        let mut logs = self.read()?.logs.filter(|l| l.compliance_id == compliance_id);
        sort_newest_first(&mut logs);
        Ok(logs)
    }

    async fn find_by_action(&self, action: &str) -> StoreResult<Vec<ComplianceLog>> {
        Ok(self.read()?.logs.filter(|l| l.action == action))
    }
}

// ---------------------------------------------------------------------------
// usuarios
// ---------------------------------------------------------------------------

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self
            .read()?
            .users
            .filter(|u| u.username == username)
            .into_iter()
            .next())
    }

    async fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        Ok(self.read()?.users.rows.values().any(|u| u.username == username))
    }

    async fn save_user(&self, mut user: UserAccount) -> StoreResult<UserAccount> {
        require(fits(&user.username, 50), IntegrityKind::Other)?;

        let mut tables = self.write()?;
        let duplicate = tables
            .users
            .rows
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        require(!duplicate, IntegrityKind::Unique)?;

        let id = tables.users.assign_id(user.id.map(i64::from))?;
        user.id = Some(UserId::new(id));
        tables.users.rows.insert(id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use verdicomply_auth::Role;

    use super::*;
    use crate::repository::Repositories;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded() -> (Repositories, ComplianceId) {
        let repos = Repositories::from_store(Arc::new(InMemoryStore::new()));
        let dept = repos.departments.save(Department::new("Manufatura")).await.unwrap();
        let audit = repos
            .audits
            .save(Audit {
                id: None,
                department_id: dept.id.unwrap(),
                audit_date: Some(date(2024, 1, 15)),
                auditor: "Ana".to_string(),
                status: Some("Em andamento".to_string()),
            })
            .await
            .unwrap();
        let norm = repos
            .norms
            .save(EnvironmentalNorm {
                id: None,
                code: "ISO-14001".to_string(),
                title: None,
                description: None,
                agency: Some("ISO".to_string()),
                severity: None,
            })
            .await
            .unwrap();
        let record = repos
            .compliance
            .save(ComplianceRecord {
                id: None,
                audit_id: audit.id.unwrap(),
                norm_id: norm.id.unwrap(),
                compliant: Flag::Nao,
                notes: None,
            })
            .await
            .unwrap();
        (repos, record.id.unwrap())
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially_per_table() {
        let repos = Repositories::in_memory();
        let a = repos.departments.save(Department::new("A")).await.unwrap();
        let b = repos.departments.save(Department::new("B")).await.unwrap();
        assert_eq!(a.id, Some(DepartmentId::new(1)));
        assert_eq!(b.id, Some(DepartmentId::new(2)));
    }

    #[tokio::test]
    async fn save_with_id_overwrites_the_row() {
        let repos = Repositories::in_memory();
        let mut dept = repos.departments.save(Department::new("Old")).await.unwrap();
        dept.name = "New".to_string();
        repos.departments.save(dept.clone()).await.unwrap();

        let all = repos.departments.find_all().await.unwrap();
        assert_eq!(all, vec![dept]);
    }

    #[tokio::test]
    async fn save_with_unknown_id_does_not_insert() {
        let repos = Repositories::in_memory();
        let mut ghost = Department::new("Fantasma");
        ghost.id = Some(DepartmentId::new(42));

        let err = repos.departments.save(ghost).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);

        let next = repos.departments.save(Department::new("Real")).await.unwrap();
        assert_eq!(next.id, Some(DepartmentId::new(1)));
        assert_eq!(repos.departments.find_all().await.unwrap(), vec![next]);
    }

    #[tokio::test]
    async fn audit_requires_existing_department() {
        let repos = Repositories::in_memory();
        let err = repos
            .audits
            .save(Audit {
                id: None,
                department_id: DepartmentId::new(99),
                audit_date: None,
                auditor: "Ana".to_string(),
                status: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Integrity(IntegrityKind::ForeignKey));
    }

    #[tokio::test]
    async fn deleting_a_referenced_parent_is_rejected() {
        let (repos, compliance_id) = seeded().await;
        repos
            .logs
            .save(ComplianceLog {
                id: None,
                compliance_id,
                action: "CRIACAO".to_string(),
                recorded_on: date(2024, 1, 16),
                details: None,
            })
            .await
            .unwrap();

        let err = repos.compliance.delete_by_id(compliance_id).await.unwrap_err();
        assert_eq!(err, StoreError::Integrity(IntegrityKind::ForeignKey));

        let err = repos.departments.delete_by_id(DepartmentId::new(1)).await.unwrap_err();
        assert_eq!(err, StoreError::Integrity(IntegrityKind::ForeignKey));
    }

    #[tokio::test]
    async fn norm_codes_are_unique() {
        let (repos, _) = seeded().await;
        let err = repos
            .norms
            .save(EnvironmentalNorm {
                id: None,
                code: "ISO-14001".to_string(),
                title: None,
                description: None,
                agency: None,
                severity: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Integrity(IntegrityKind::Unique));
        assert!(repos.norms.exists_by_code("ISO-14001").await.unwrap());
        assert_eq!(repos.norms.find_by_agency("ISO").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn overlong_columns_are_rejected() {
        let repos = Repositories::in_memory();
        let err = repos
            .departments
            .save(Department::new("x".repeat(101)))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Integrity(IntegrityKind::Other));
    }

    #[tokio::test]
    async fn overdue_filter_and_log_ordering() {
        let (repos, compliance_id) = seeded().await;
        for (due, resolved) in [
            (date(2024, 1, 1), Flag::Nao),
            (date(2024, 1, 1), Flag::Sim),
            (date(2024, 12, 1), Flag::Nao),
        ] {
            repos
                .pending_items
                .save(PendingItem {
                    id: None,
                    compliance_id,
                    description: "Corrigir".to_string(),
                    due_date: due,
                    resolved,
                })
                .await
                .unwrap();
        }
        let overdue = repos.pending_items.find_overdue(date(2024, 6, 1)).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, Some(PendingItemId::new(1)));

        for day in [3, 20, 10] {
            repos
                .logs
                .save(ComplianceLog {
                    id: None,
                    compliance_id,
                    action: "REVISAO".to_string(),
                    recorded_on: date(2024, 2, day),
                    details: None,
                })
                .await
                .unwrap();
        }
        let days: Vec<u32> = repos
            .logs
            .find_by_compliance(compliance_id)
            .await
            .unwrap()
            .iter()
            .map(|l| chrono::Datelike::day(&l.recorded_on))
            .collect();
        assert_eq!(days, vec![20, 10, 3]);
    }

    #[tokio::test]
    async fn audit_status_search_is_case_insensitive() {
        let (repos, _) = seeded().await;
        assert_eq!(repos.audits.find_by_status_containing("ANDAMENTO").await.unwrap().len(), 1);
        assert!(repos.audits.find_by_status_containing("concluída").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let repos = Repositories::in_memory();
        let user = UserAccount {
            id: None,
            username: "ana".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Auditor,
        };
        repos.users.save_user(user.clone()).await.unwrap();
        let err = repos.users.save_user(user).await.unwrap_err();
        assert_eq!(err, StoreError::Integrity(IntegrityKind::Unique));
        assert!(repos.users.exists_by_username("ana").await.unwrap());
    }
}
