//! Runtime configuration for the notification engine.

use serde::Deserialize;

/// Settings the dispatch runs need: where links point, who mail comes from,
/// the key for signed login links, and the subject line for each notice.
/// Subjects have sensible defaults so a `config.toml` only has to set the
/// first three fields.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
  /// Site root used to build absolute URLs, e.g. `https://hotline.example.org`.
  pub base_url:    String,
  pub from_email:  String,
  /// Server-side secret for the timestamp signer behind authentication
  /// links.
  pub signing_key: String,

  #[serde(default = "default_new_submission_subject")]
  pub new_submission_subject:     String,
  #[serde(default = "default_new_comment_subject")]
  pub new_comment_subject:        String,
  #[serde(default = "default_new_owner_subject")]
  pub new_owner_subject:          String,
  #[serde(default = "default_submission_receipt_subject")]
  pub submission_receipt_subject: String,
  #[serde(default = "default_invite_subject")]
  pub invite_subject:             String,
}

fn default_new_submission_subject() -> String {
  "New Invasives Hotline submission for review".into()
}

fn default_new_comment_subject() -> String {
  "Invasives Hotline - New comment on report".into()
}

fn default_new_owner_subject() -> String {
  "A subscription has been assigned to you on the Invasives Hotline".into()
}

fn default_submission_receipt_subject() -> String {
  "Thank you for your Invasives Hotline submission".into()
}

fn default_invite_subject() -> String {
  "You have been invited to review an Invasives Hotline report".into()
}
