use serde::{Deserialize, Serialize};

// 관리자 모델 (비밀번호는 노출하지 않는다)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: String,
    pub name: String,
}

// 관리자 로그인 폼
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub id: String,
    pub password: String,
}

// 로컬 저장소의 관리자 계정 (adminAccounts)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccount {
    pub id: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

impl AdminAccount {
    pub fn matches(&self, id: &str, password: &str) -> bool {
        self.id == id && self.password == password
    }

    pub fn to_admin(&self) -> Admin {
        Admin {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}
