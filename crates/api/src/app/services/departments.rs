use verdicomply_compliance::Department;
use verdicomply_core::{DepartmentId, DomainError};
use verdicomply_infra::{CrudRepository, Repositories};

use super::ServiceResult;

pub(crate) const NOT_FOUND: &str = "Departamento não encontrado";

pub struct DepartmentService {
    repos: Repositories,
}

impl DepartmentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Department>> {
        Ok(self.repos.departments.find_all().await?)
    }

    pub async fn get(&self, id: DepartmentId) -> ServiceResult<Department> {
        self.repos
            .departments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND).into())
    }

    pub async fn create(&self, name: String) -> ServiceResult<Department> {
        Ok(self.repos.departments.save(Department::new(name)).await?)
    }

    pub async fn update(&self, id: DepartmentId, name: String) -> ServiceResult<Department> {
        let mut department = self.get(id).await?;
        department.name = name;
        Ok(self.repos.departments.save(department).await?)
    }

    pub async fn delete(&self, id: DepartmentId) -> ServiceResult<()> {
        if !self.repos.departments.exists_by_id(id).await? {
            return Err(DomainError::not_found(NOT_FOUND).into());
        }
        Ok(self.repos.departments.delete_by_id(id).await?)
    }
}
