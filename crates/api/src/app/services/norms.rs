use verdicomply_compliance::EnvironmentalNorm;
use verdicomply_core::{DomainError, NormId};
use verdicomply_infra::{CrudRepository, NormRepository, Repositories};

use super::ServiceResult;

pub(crate) const NOT_FOUND: &str = "Norma ambiental não encontrada";
pub(crate) const DUPLICATE_CODE: &str = "Já existe uma norma com o mesmo código";

pub struct NormService {
    repos: Repositories,
}

impl NormService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> ServiceResult<Vec<EnvironmentalNorm>> {
        Ok(self.repos.norms.find_all().await?)
    }

    pub async fn get(&self, id: NormId) -> ServiceResult<EnvironmentalNorm> {
        self.repos
            .norms
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND).into())
    }

    pub async fn by_agency(&self, agency: &str) -> ServiceResult<Vec<EnvironmentalNorm>> {
        Ok(self.repos.norms.find_by_agency(agency).await?)
    }

    pub async fn by_code(&self, code: &str) -> ServiceResult<EnvironmentalNorm> {
        self.repos
            .norms
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND).into())
    }

    pub async fn create(&self, mut norm: EnvironmentalNorm) -> ServiceResult<EnvironmentalNorm> {
        if self.repos.norms.exists_by_code(&norm.code).await? {
            return Err(DomainError::conflict(DUPLICATE_CODE).into());
        }
        norm.id = None;
        Ok(self.repos.norms.save(norm).await?)
    }

    /// Overwrite an existing norm. Taking another norm's code is rejected.
    pub async fn update(&self, id: NormId, mut norm: EnvironmentalNorm) -> ServiceResult<EnvironmentalNorm> {
        self.get(id).await?;
        if let Some(other) = self.repos.norms.find_by_code(&norm.code).await? {
            if other.id != Some(id) {
                return Err(DomainError::conflict(DUPLICATE_CODE).into());
            }
        }
        norm.id = Some(id);
        Ok(self.repos.norms.save(norm).await?)
    }

    pub async fn delete(&self, id: NormId) -> ServiceResult<()> {
        if !self.repos.norms.exists_by_id(id).await? {
            return Err(DomainError::not_found(NOT_FOUND).into());
        }
        Ok(self.repos.norms.delete_by_id(id).await?)
    }

    /// Insert `norm` unless its code is already registered. Returns whether it was inserted.
    pub async fn ensure(&self, norm: EnvironmentalNorm) -> ServiceResult<bool> {
        if self.repos.norms.exists_by_code(&norm.code).await? {
            return Ok(false);
        }
        self.repos.norms.save(norm).await?;
        Ok(true)
    }
}
