use serde::{Deserialize, Serialize};

use crate::domain::Account;

pub const ME_PATH: &str = "auth/me";
pub const REFRESH_PATH: &str = "auth/refresh";
pub const LOGIN_PATH: &str = "auth/login";
pub const REGISTER_PATH: &str = "auth/register";
pub const UPDATE_PATH: &str = "auth/update";
pub const LOGOUT_PATH: &str = "auth/logout";
pub const DELETE_PATH: &str = "auth/delete";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAccountRequest {
    pub username: String,
}

/// Account payload of `/auth/me` and `/auth/update`. Deployments disagree on
/// whether the record is nested under `user` or returned flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountEnvelope {
    Wrapped { user: Account },
    Flat(Account),
}

impl AccountEnvelope {
    pub fn into_account(self) -> Account {
        match self {
            Self::Wrapped { user } => user,
            Self::Flat(account) => account,
        }
    }
}
