//! [`UsersService`]: account registration and credential checks.

use std::sync::Arc;

use assets_core::{
  params::{LoginUser, RegisterUser},
  store::{StoreError, StoreErrorKind, UserFilter, UserStore},
  user::User,
};
use tracing::debug;
use validator::Validate;

use crate::{Error, Result, hasher::CredentialHasher};

pub struct UsersService<S> {
  store:  Arc<S>,
  hasher: Arc<dyn CredentialHasher>,
}

impl<S> Clone for UsersService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), hasher: Arc::clone(&self.hasher) }
  }
}

impl<S: UserStore> UsersService<S> {
  pub fn new(store: Arc<S>, hasher: Arc<dyn CredentialHasher>) -> Self { Self { store, hasher } }

  async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
    let filter = UserFilter { emails: vec![email.to_owned()], limit: 1, ..UserFilter::default() };
    let page = self.store.select_users(filter).await.map_err(Error::processing)?;
    Ok(page.items.into_iter().next())
  }

  pub async fn register(&self, params: RegisterUser) -> Result<User> {
    params.validate()?;
    debug!(email = %params.email, "registering user");

    if self.find_by_email(&params.email).await?.is_some() {
      return Err(Error::AlreadyExists("user with this email already exists".into()));
    }

    // Run the CPU-bound hash off the async workers.
    let hasher = Arc::clone(&self.hasher);
    let password = params.password;
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
      .await
      .map_err(Error::processing)?
      .map_err(Error::processing)?;

    // A concurrent registration may have taken the email since the check.
    let user = User::new(params.email, hash);
    match self.store.insert_users(vec![user.clone()]).await {
      Ok(_) => Ok(user),
      Err(e) if e.kind() == StoreErrorKind::Conflict => {
        Err(Error::AlreadyExists("user with this email already exists".into()))
      }
      Err(e) => Err(Error::processing(e)),
    }
  }

  /// Resolve the account for `params`. An unknown email and a wrong password
  /// both yield [`Error::Authentication`].
  pub async fn login(&self, params: LoginUser) -> Result<User> {
    params.validate()?;
    debug!(email = %params.email, "login attempt");

    let Some(user) = self.find_by_email(&params.email).await? else {
      return Err(Error::Authentication);
    };

    let hasher = Arc::clone(&self.hasher);
    let password = params.password;
    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
      .await
      .map_err(Error::processing)?
      .map_err(Error::processing)?;

    if !matches {
      return Err(Error::Authentication);
    }
    Ok(user)
  }
}
