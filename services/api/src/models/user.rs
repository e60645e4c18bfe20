//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Coins granted to every new account
pub const STARTING_COINS: i64 = 10;

/// Avatar assigned until the user picks one
pub const DEFAULT_AVATAR: &str = "default_avatar";

/// Role tag carried by an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Parent,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    /// Unique handle, also the subject of session tokens
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    /// Absent for accounts created without a password
    pub password_hash: Option<String>,
    pub avatar: String,
    pub role: Role,
    pub scratchy_coins: i64,
    pub unlocked_skins: Vec<String>,
    pub preferred_language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh student account with the starting coin balance
    pub fn new_student(
        username: String,
        email: String,
        password_hash: String,
        display_name: String,
        preferred_language: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            display_name,
            email: Some(email),
            password_hash: Some(password_hash),
            avatar: DEFAULT_AVATAR.to_string(),
            role: Role::Student,
            scratchy_coins: STARTING_COINS,
            unlocked_skins: Vec::new(),
            preferred_language,
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    /// Apply the whitelisted profile fields; everything else stays untouched
    pub fn apply_profile_update(&mut self, update: &UpdateProfile, now: DateTime<Utc>) {
        if let Some(display_name) = &update.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(avatar) = &update.avatar {
            self.avatar = avatar.clone();
        }
        if let Some(language) = &update.preferred_language {
            self.preferred_language = language.clone();
        }
        self.updated_at = now;
    }
}

/// Profile update payload
///
/// Only these fields can be changed through the profile endpoint. Unknown
/// fields in the request body are dropped by deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub preferred_language: Option<String>,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar: String,
    pub avatar_accessories: Vec<String>,
    pub avatar_color: String,
    pub role: Role,
    pub scratchy_coins: i64,
    pub unlocked_skins: Vec<String>,
    pub preferred_language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            avatar_accessories: Vec::new(),
            avatar_color: "blue".to_string(),
            role: user.role,
            scratchy_coins: user.scratchy_coins,
            unlocked_skins: user.unlocked_skins.clone(),
            preferred_language: user.preferred_language.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
