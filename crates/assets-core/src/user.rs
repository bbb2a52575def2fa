//! User accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered account. The password is only ever held as a PHC hash
/// string and is never serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
  pub id:            Uuid,
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub create_time:   DateTime<Utc>,
  pub update_time:   DateTime<Utc>,
}

impl User {
  pub fn new(email: String, password_hash: String) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      email,
      password_hash,
      create_time: now,
      update_time: now,
    }
  }
}
