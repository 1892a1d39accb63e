use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Patient,
    Doctor,
    Receptionist,
}

/// Identity of the signed-in user, passed explicitly to the views that need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: i64,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn patient(user_id: i64) -> Self {
        Self::new(user_id, Role::Patient)
    }

    pub fn patient_id(&self) -> Option<i64> {
        match self.role {
            Role::Patient => Some(self.user_id),
            _ => None,
        }
    }
}
