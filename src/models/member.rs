use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Corresponds to the `member_gender` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// A member row as stored. Never serialized directly, see `MemberProfile`.
#[derive(Debug, Clone, FromRow)]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub nickname: String,
    pub birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public view of a member returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberProfile {
    pub username: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub nickname: String,
    pub birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<&Member> for MemberProfile {
    fn from(member: &Member) -> Self {
        Self {
            username: member.username.clone(),
            email: member.email.clone(),
            gender: member.gender,
            nickname: member.nickname.clone(),
            birth: member.birth,
            created_at: member.created_at,
        }
    }
}

/// The other end of a follow edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct MemberSummary {
    pub username: String,
    pub nickname: String,
}

/// A member ready to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub nickname: String,
    pub birth: Option<NaiveDate>,
}

/// Fields to overwrite on an existing member. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct MemberChanges {
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub nickname: Option<String>,
    pub birth: Option<NaiveDate>,
}

impl Member {
    pub fn apply(&mut self, changes: MemberChanges) {
        if let Some(password_hash) = changes.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(gender) = changes.gender {
            self.gender = Some(gender);
        }
        if let Some(nickname) = changes.nickname {
            self.nickname = nickname;
        }
        if let Some(birth) = changes.birth {
            self.birth = Some(birth);
        }
        self.updated_at = Utc::now();
    }
}

/// Body of `PUT /members/mine`. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ModifyRequest {
    #[validate(length(min = 6, max = 100))]
    pub password: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub gender: Option<Gender>,
    #[validate(length(min = 1, max = 32))]
    pub nickname: Option<String>,
    #[validate(custom = "validate_birth")]
    pub birth: Option<NaiveDate>,
}

/// Body of `DELETE /members/mine`.
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordRequest {
    #[validate(length(min = 1))]
    pub password: String,
}

/// Birth dates in the future are rejected.
pub fn validate_birth(birth: &NaiveDate) -> Result<(), ValidationError> {
    if *birth > Utc::now().date_naive() {
        return Err(ValidationError::new("birth_in_future"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> Member {
        let now = Utc::now();
        Member {
            id: 1,
            username: "reader".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            email: "reader@example.com".to_string(),
            gender: None,
            nickname: "Reader".to_string(),
            birth: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_only_overwrites_given_fields() {
        let mut member = member();
        member.apply(MemberChanges {
            nickname: Some("Bookworm".to_string()),
            gender: Some(Gender::Female),
            ..Default::default()
        });

        assert_eq!(member.nickname, "Bookworm");
        assert_eq!(member.gender, Some(Gender::Female));
        assert_eq!(member.email, "reader@example.com");
        assert_eq!(member.password_hash, "$2b$04$hash");
    }

    #[test]
    fn test_profile_hides_password() {
        let profile = MemberProfile::from(&member());
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "reader");
    }

    #[test]
    fn test_modify_request_validation() {
        let valid = ModifyRequest {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let bad_email = ModifyRequest {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(bad_email.validate().is_err());

        let short_password = ModifyRequest {
            password: Some("123".to_string()),
            ..Default::default()
        };
        assert!(short_password.validate().is_err());

        let future_birth = ModifyRequest {
            birth: Some(Utc::now().date_naive() + chrono::Duration::days(30)),
            ..Default::default()
        };
        assert!(future_birth.validate().is_err());
    }

    #[test]
    fn test_gender_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Gender::Other).unwrap(), "other");
    }
}
