//! Google Sheets v4 client, the production `SpreadsheetGateway`.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers the calls a
//! run needs: open spreadsheet, read values, write values, plus the OAuth
//! token exchange (refresh token or service-account JWT) that yields the
//! bearer token.
//!
//! One attempt per call. No retries, no backoff.

mod auth;
mod client;
mod gateway;

pub use auth::{
    load_credentials, refresh_access_token, service_account_token, sign_assertion, AssertionClaims,
    AuthorizedUser, Credentials, ServiceAccount, SPREADSHEETS_SCOPE,
};
pub use client::{SheetsClient, SheetsError, UpdateResponse};
