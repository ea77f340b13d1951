//! Queue-and-worker front of the engine.
//!
//! Triggers enqueue an [`Event`] and return immediately; a worker loop
//! drains the queue and runs each dispatch on its own task. Dispatch
//! failures are logged, never surfaced to the code that raised the event.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use hotline_core::{links::LinkBuilder, mailer::Mailer, store::HotlineStore};

/// A domain event the engine reacts to. Carries ids, not records; each
/// dispatch run re-reads current state from the store.
#[derive(Debug, Clone)]
pub enum Event {
  ReportCreated { report_id: Uuid },
  ReportSubmitted { report_id: Uuid },
  CommentCreated { comment_id: Uuid },
  SubscriptionOwnerChanged {
    subscription_id: Uuid,
    previous_owner:  Uuid,
    new_owner:       Uuid,
  },
  InviteCreated { invite_id: Uuid, message: String },
}

/// Handle for raising events. Cheap to clone; all clones feed the same
/// worker.
#[derive(Clone)]
pub struct Engine {
  tx: mpsc::UnboundedSender<Event>,
}

impl Engine {
  /// Spawn the worker loop and return the trigger handle. The worker exits
  /// when every `Engine` clone has been dropped.
  pub fn spawn<S, M, L>(dispatcher: Dispatcher<S, M, L>) -> Self
  where
    S: HotlineStore + 'static,
    M: Mailer + 'static,
    L: LinkBuilder + 'static,
  {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    tokio::spawn(async move {
      while let Some(event) = rx.recv().await {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
          let result = match &event {
            Event::ReportCreated { report_id } => {
              dispatcher.run_report_created(*report_id).await
            }
            Event::ReportSubmitted { report_id } => {
              dispatcher.run_report_submitted(*report_id).await
            }
            Event::CommentCreated { comment_id } => {
              dispatcher.run_comment_created(*comment_id).await
            }
            Event::SubscriptionOwnerChanged {
              subscription_id,
              previous_owner,
              new_owner,
            } => {
              dispatcher
                .run_owner_changed(
                  *subscription_id,
                  *previous_owner,
                  *new_owner,
                )
                .await
            }
            Event::InviteCreated { invite_id, message } => {
              dispatcher.run_invite_created(*invite_id, message).await
            }
          };
          match result {
            Ok(summary) => {
              tracing::debug!(?event, sent = summary.sent, "dispatch run done");
            }
            Err(err) => {
              tracing::error!(?event, error = %err, "dispatch run failed");
            }
          }
        });
      }
    });

    Self { tx }
  }

  // ─── Triggers ──────────────────────────────────────────────────────────

  pub fn on_report_created(&self, report_id: Uuid) {
    self.raise(Event::ReportCreated { report_id });
  }

  pub fn on_report_submitted(&self, report_id: Uuid) {
    self.raise(Event::ReportSubmitted { report_id });
  }

  pub fn on_comment_created(&self, comment_id: Uuid) {
    self.raise(Event::CommentCreated { comment_id });
  }

  pub fn on_subscription_owner_changed(
    &self,
    subscription_id: Uuid,
    previous_owner: Uuid,
    new_owner: Uuid,
  ) {
    self.raise(Event::SubscriptionOwnerChanged {
      subscription_id,
      previous_owner,
      new_owner,
    });
  }

  pub fn on_invite_created(&self, invite_id: Uuid, message: String) {
    self.raise(Event::InviteCreated { invite_id, message });
  }

  fn raise(&self, event: Event) {
    if self.tx.send(event).is_err() {
      tracing::warn!("notification worker has shut down, event dropped");
    }
  }
}
