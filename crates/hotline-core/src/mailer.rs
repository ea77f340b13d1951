//! The messaging transport boundary.

use std::future::Future;

use crate::error::MailError;

/// One outbound message. The transport attempts delivery; no confirmation is
/// required or recorded by this subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
  pub subject: String,
  pub body:    String,
  pub from:    String,
  pub to:      String,
}

/// Abstraction over whatever actually delivers mail.
pub trait Mailer: Send + Sync {
  fn send<'a>(
    &'a self,
    email: &'a OutboundEmail,
  ) -> impl Future<Output = Result<(), MailError>> + Send + 'a;
}
