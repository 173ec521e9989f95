/// 로그인 세션 저장소
/// 로그인할 때마다 토큰을 발급하고, 회원(currentUser)과 관리자(adminUser)를
/// 토큰별 키로 로컬 저장소에 보관한다. 요청은 `Authorization: Bearer <토큰>`으로 세션을 지정한다.
/// 만료는 없으며, 로그아웃하거나 저장소가 사라질 때까지 유지된다.
// region:    --- Imports
use crate::admin::{Admin, AdminCredentials};
use crate::database::{keys, AuctionRepository, LocalStorage, StoreError};
use crate::member::Member;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Current User
/// 로그인한 회원
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl CurrentUser {
    /// 이름이 없으면 이메일 앞부분
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        self.email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

impl From<Member> for CurrentUser {
    fn from(member: Member) -> Self {
        CurrentUser {
            id: member.id,
            name: member.name,
            email: member.email,
        }
    }
}

// endregion: --- Current User

// region:    --- Session Token
/// 요청에 실린 세션 토큰. 헤더가 없거나 형식이 맞지 않으면 None
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    pub fn from_header(value: &str) -> Self {
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .and_then(|token| Uuid::try_parse(token).ok())
            .map(|token| token.to_string());
        SessionToken(token)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(SessionToken::from_header)
            .unwrap_or_default())
    }
}

/// 로그인 결과: 발급된 토큰 + 사용자 정보
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn<T> {
    pub token: String,
    #[serde(flatten)]
    pub user: T,
}

fn session_key(kind: &str, token: &str) -> String {
    format!("{}:{}", kind, token)
}

fn issue_token() -> String {
    Uuid::new_v4().to_string()
}

// endregion: --- Session Token

// region:    --- Session Store
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn LocalStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.storage.get_item(key).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    // 손상된 세션은 로그아웃 상태로 본다
                    warn!("{:<12} --> 세션 파싱 실패 key: {}, error: {}", "Session", key, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.storage.set_item(key, &raw).await
    }

    async fn read_session<T: DeserializeOwned>(
        &self,
        kind: &str,
        token: Option<&str>,
    ) -> Result<Option<T>, StoreError> {
        match token {
            Some(token) => self.read(&session_key(kind, token)).await,
            None => Ok(None),
        }
    }

    async fn remove_session(&self, kind: &str, token: Option<&str>) -> Result<(), StoreError> {
        match token {
            Some(token) => self.storage.remove_item(&session_key(kind, token)).await,
            None => Ok(()),
        }
    }

    /// 토큰에 묶인 로그인 회원
    pub async fn current_user(&self, token: Option<&str>) -> Result<Option<CurrentUser>, StoreError> {
        self.read_session(keys::CURRENT_USER, token).await
    }

    /// 이메일로 회원 로그인, 새 토큰 발급
    pub async fn sign_in_member(
        &self,
        repo: &dyn AuctionRepository,
        email: &str,
    ) -> Result<Option<SignedIn<CurrentUser>>, StoreError> {
        let Some(member) = repo.find_member_by_email(email.trim()).await? else {
            info!("{:<12} --> 회원 로그인 실패 email: {}", "Session", email);
            return Ok(None);
        };
        let user = CurrentUser::from(member);
        let token = issue_token();
        self.write(&session_key(keys::CURRENT_USER, &token), &user)
            .await?;
        info!("{:<12} --> 회원 로그인 id: {}", "Session", user.id);
        Ok(Some(SignedIn { token, user }))
    }

    pub async fn sign_out_member(&self, token: Option<&str>) -> Result<(), StoreError> {
        self.remove_session(keys::CURRENT_USER, token).await
    }

    /// 토큰에 묶인 관리자
    pub async fn admin_user(&self, token: Option<&str>) -> Result<Option<Admin>, StoreError> {
        self.read_session(keys::ADMIN_USER, token).await
    }

    /// 관리자 로그인, 새 토큰 발급
    pub async fn sign_in_admin(
        &self,
        repo: &dyn AuctionRepository,
        credentials: &AdminCredentials,
    ) -> Result<Option<SignedIn<Admin>>, StoreError> {
        let Some(admin) = repo
            .authenticate_admin(&credentials.id, &credentials.password)
            .await?
        else {
            warn!("{:<12} --> 관리자 인증 실패 id: {}", "Session", credentials.id);
            return Ok(None);
        };
        let token = issue_token();
        self.write(&session_key(keys::ADMIN_USER, &token), &admin)
            .await?;
        info!("{:<12} --> 관리자 로그인 id: {}", "Session", admin.id);
        Ok(Some(SignedIn { token, user: admin }))
    }

    pub async fn sign_out_admin(&self, token: Option<&str>) -> Result<(), StoreError> {
        self.remove_session(keys::ADMIN_USER, token).await
    }
}

// endregion: --- Session Store
