//! Login account stored in the `usuarios` table.

use serde::{Deserialize, Serialize};

use verdicomply_core::UserId;

use crate::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Option<UserId>,
    pub username: String,
    /// PHC-formatted argon2id hash; never the plaintext.
    pub password_hash: String,
    pub role: Role,
}
