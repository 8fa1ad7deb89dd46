//! [`AuthProvider`] over GoTrue.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | magic link | `POST /otp[?redirect_to=…]` |
//! | verify code | `POST /verify` (`type: email`) |
//! | refresh | `POST /token?grant_type=refresh_token` |
//! | current user | `GET /user` |
//! | sign out | `POST /logout` |

use chrono::Utc;
use planner_core::{
  session::{Session, User},
  store::AuthProvider,
};
use tracing::debug;

use crate::{
  Error, Result,
  client::{SupabaseClient, check},
  encode::{OtpRequest, RefreshRequest, TokenResponse, VerifyRequest},
};

impl AuthProvider for SupabaseClient {
  type Error = Error;

  async fn sign_in_with_otp(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
    debug!("requesting magic link");
    let mut req = self.anonymous(self.http().post(self.auth_url("/otp")));
    if let Some(redirect) = redirect_to {
      req = req.query(&[("redirect_to", redirect)]);
    }
    let resp = req
      .json(&OtpRequest {
        email,
        create_user: true,
      })
      .send()
      .await?;
    check(resp).await?;
    Ok(())
  }

  async fn verify_otp(&self, email: &str, token: &str) -> Result<Session> {
    let resp = self
      .anonymous(self.http().post(self.auth_url("/verify")))
      .json(&VerifyRequest {
        kind: "email",
        email,
        token,
      })
      .send()
      .await?;
    let tokens: TokenResponse = check(resp).await?.json().await?;
    Ok(tokens.into_session(Utc::now()))
  }

  async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
    let resp = self
      .anonymous(self.http().post(self.auth_url("/token")))
      .query(&[("grant_type", "refresh_token")])
      .json(&RefreshRequest { refresh_token })
      .send()
      .await?;
    let tokens: TokenResponse = check(resp).await?.json().await?;
    Ok(tokens.into_session(Utc::now()))
  }

  async fn get_user(&self, access_token: &str) -> Result<User> {
    let resp = self
      .authorize(self.http().get(self.auth_url("/user")), access_token)
      .send()
      .await?;
    Ok(check(resp).await?.json().await?)
  }

  async fn sign_out(&self, access_token: &str) -> Result<()> {
    let resp = self
      .authorize(self.http().post(self.auth_url("/logout")), access_token)
      .send()
      .await?;
    check(resp).await?;
    Ok(())
  }
}
