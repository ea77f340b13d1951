//! [`Mailer`] implementations.
//!
//! `LogMailer` is the default for the worker binary until SMTP delivery is
//! wired in; `MemoryMailer` backs the test suite.

use std::{
  collections::HashSet,
  future::Future,
  sync::{Arc, Mutex},
};

use hotline_core::{
  error::MailError,
  mailer::{Mailer, OutboundEmail},
};

/// Writes each outbound email to the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
  fn send<'a>(
    &'a self,
    email: &'a OutboundEmail,
  ) -> impl Future<Output = Result<(), MailError>> + Send + 'a {
    async move {
      tracing::info!(
        to = %email.to,
        subject = %email.subject,
        "outbound email"
      );
      Ok(())
    }
  }
}

/// Collects sent email in memory, with optional per-address failure
/// injection.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
  sent:     Arc<Mutex<Vec<OutboundEmail>>>,
  fail_for: Arc<Mutex<HashSet<String>>>,
}

impl MemoryMailer {
  pub fn new() -> Self { Self::default() }

  pub fn sent(&self) -> Vec<OutboundEmail> {
    self.sent.lock().expect("mailer mutex poisoned").clone()
  }

  /// Make every send to `addr` fail with a transport error.
  pub fn fail_sends_to(&self, addr: impl Into<String>) {
    self
      .fail_for
      .lock()
      .expect("mailer mutex poisoned")
      .insert(addr.into());
  }

  /// Let previously failing addresses deliver again.
  pub fn clear_failures(&self) {
    self.fail_for.lock().expect("mailer mutex poisoned").clear();
  }
}

impl Mailer for MemoryMailer {
  fn send<'a>(
    &'a self,
    email: &'a OutboundEmail,
  ) -> impl Future<Output = Result<(), MailError>> + Send + 'a {
    async move {
      let failing = self
        .fail_for
        .lock()
        .expect("mailer mutex poisoned")
        .contains(&email.to);
      if failing {
        return Err(MailError(format!("delivery to {} refused", email.to)));
      }
      self
        .sent
        .lock()
        .expect("mailer mutex poisoned")
        .push(email.clone());
      Ok(())
    }
  }
}
