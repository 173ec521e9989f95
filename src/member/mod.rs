use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 회원 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Supplier,
    #[default]
    Buyer,
}

impl MemberType {
    /// 알 수 없는 값은 구매자로 취급
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "supplier" => MemberType::Supplier,
            _ => MemberType::Buyer,
        }
    }
}

// 회원 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub member_type: MemberType,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// 회원 가입 폼
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub phone: String,
    #[serde(rename = "type", default)]
    pub member_type: MemberType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_type_defaults_to_buyer() {
        assert_eq!(MemberType::parse("Supplier"), MemberType::Supplier);
        assert_eq!(MemberType::parse("buyer"), MemberType::Buyer);
        assert_eq!(MemberType::parse("vip"), MemberType::Buyer);

        let form: NewMember =
            serde_json::from_value(serde_json::json!({"name": "김", "email": "kim@example.com"}))
                .unwrap();
        assert_eq!(form.member_type, MemberType::Buyer);
        assert!(form.company.is_empty());
    }
}
