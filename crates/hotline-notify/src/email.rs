//! Builders for each notice the engine sends.

use hotline_core::{
  comment::Comment,
  mailer::OutboundEmail,
  report::Report,
  subscription::Subscription,
  user::User,
};

use crate::config::NotifyConfig;

/// A new report matched one of the recipient's saved searches.
pub fn report_match(
  config: &NotifyConfig,
  owner: &User,
  report: &Report,
  url: &str,
) -> OutboundEmail {
  OutboundEmail {
    subject: config.new_submission_subject.clone(),
    body:    format!(
      "Hello {},\n\n\
       A new report matching one of your subscriptions has been submitted:\n\n\
       {}\n\n\
       Review it here: {url}\n",
      owner.full_name(),
      report.title,
    ),
    from:    config.from_email.clone(),
    to:      owner.email.clone(),
  }
}

/// Someone commented on a report the recipient is tied to.
pub fn new_comment(
  config: &NotifyConfig,
  author: &User,
  comment: &Comment,
  report: &Report,
  recipient: &User,
  url: &str,
) -> OutboundEmail {
  OutboundEmail {
    subject: config.new_comment_subject.clone(),
    body:    format!(
      "Hello {},\n\n\
       {} commented on the report {:?}:\n\n\
       {}\n\n\
       View the discussion here: {url}\n",
      recipient.full_name(),
      author.full_name(),
      report.title,
      comment.body,
    ),
    from:    config.from_email.clone(),
    to:      recipient.email.clone(),
  }
}

/// A saved search was reassigned to the recipient.
pub fn new_owner(
  config: &NotifyConfig,
  new_owner: &User,
  subscription: &Subscription,
  url: &str,
) -> OutboundEmail {
  OutboundEmail {
    subject: config.new_owner_subject.clone(),
    body:    format!(
      "Hello {},\n\n\
       The subscription {:?} has been assigned to you. You will now be\n\
       notified of new reports matching it.\n\n\
       See the reports it covers here: {url}\n",
      new_owner.full_name(),
      subscription.name,
    ),
    from:    config.from_email.clone(),
    to:      new_owner.email.clone(),
  }
}

/// Receipt sent to the submitter when their report is accepted.
pub fn report_submitted(
  config: &NotifyConfig,
  submitter: &User,
  report: &Report,
  url: &str,
) -> OutboundEmail {
  OutboundEmail {
    subject: config.submission_receipt_subject.clone(),
    body:    format!(
      "Hello {},\n\n\
       Thank you for submitting {:?}. An expert will review it and follow\n\
       up on the report page.\n\n\
       Track your report here: {url}\n",
      submitter.full_name(),
      report.title,
    ),
    from:    config.from_email.clone(),
    to:      submitter.email.clone(),
  }
}

/// An expert was invited to review a report.
pub fn invite(
  config: &NotifyConfig,
  inviter: &User,
  invited: &User,
  report: &Report,
  message: &str,
  url: &str,
) -> OutboundEmail {
  let mut body = format!(
    "Hello {},\n\n\
     {} has invited you to review the report {:?}.\n",
    invited.full_name(),
    inviter.full_name(),
    report.title,
  );
  if !message.trim().is_empty() {
    body.push_str(&format!("\nThey added:\n\n{message}\n"));
  }
  body.push_str(&format!("\nReview the report here: {url}\n"));

  OutboundEmail {
    subject: config.invite_subject.clone(),
    body,
    from: config.from_email.clone(),
    to: invited.email.clone(),
  }
}
