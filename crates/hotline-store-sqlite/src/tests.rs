//! Integration tests for `SqliteStore` against an in-memory database.

use hotline_core::{
  comment::{NewComment, Visibility},
  query::{ArchivedFilter, ClaimedFilter, PublicFilter, ReportQuery, SourceFilter},
  report::{NewInvite, NewReport},
  store::{HotlineStore, Viewer},
  subscription::NewSubscription,
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(email: &str, is_active: bool) -> NewUser {
  NewUser {
    email:      email.into(),
    first_name: "Jo".into(),
    last_name:  "Bloggs".into(),
    is_active,
    is_staff:   is_active,
  }
}

async fn manager(s: &SqliteStore, email: &str) -> User {
  s.add_user(new_user(email, true)).await.unwrap()
}

async fn submitter(s: &SqliteStore, email: &str) -> User {
  s.add_user(new_user(email, false)).await.unwrap()
}

fn new_report(created_by: Uuid) -> NewReport {
  NewReport {
    title:       "Knotweed".into(),
    category_id: Uuid::new_v4(),
    species_id:  None,
    county_id:   Uuid::new_v4(),
    description: "Thick stand along the riverbank".into(),
    location:    "NE bank of the Willamette".into(),
    created_by,
    claimed_by:  None,
    is_archived: false,
    is_public:   false,
  }
}

// ─── Users and reports ───────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;

  let user = manager(&s, "alice@example.com").await;
  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "alice@example.com");
  assert!(fetched.is_active);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn add_and_get_report() {
  let s = store().await;
  let user = submitter(&s, "reporter@example.com").await;

  let report = s.add_report(new_report(user.user_id)).await.unwrap();
  let fetched = s.get_report(report.report_id).await.unwrap().unwrap();

  assert_eq!(fetched.report_id, report.report_id);
  assert_eq!(fetched.created_by, user.user_id);
  assert_eq!(fetched.claimed_by, None);
  assert!(!fetched.is_public);
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comments_roundtrip_in_order() {
  let s = store().await;
  let user = manager(&s, "m@example.com").await;
  let report = s.add_report(new_report(user.user_id)).await.unwrap();

  let first = s
    .add_comment(NewComment {
      report_id:  report.report_id,
      body:       "first".into(),
      visibility: Visibility::Private,
      created_by: user.user_id,
    })
    .await
    .unwrap();
  let second = s
    .add_comment(NewComment {
      report_id:  report.report_id,
      body:       "second".into(),
      visibility: Visibility::Public,
      created_by: user.user_id,
    })
    .await
    .unwrap();

  let comments = s.comments_for_report(report.report_id).await.unwrap();
  assert_eq!(comments.len(), 2);
  assert_eq!(comments[0].comment_id, first.comment_id);
  assert_eq!(comments[0].visibility, Visibility::Private);
  assert_eq!(comments[1].comment_id, second.comment_id);
  assert_eq!(comments[1].visibility, Visibility::Public);
}

// ─── Invites ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn invite_unique_per_report_user_pair() {
  let s = store().await;
  let inviter = manager(&s, "manager@example.com").await;
  let expert = manager(&s, "expert@example.com").await;
  let report = s.add_report(new_report(inviter.user_id)).await.unwrap();

  let invite = NewInvite {
    report_id:  report.report_id,
    user_id:    expert.user_id,
    created_by: inviter.user_id,
  };

  s.add_invite(invite.clone()).await.unwrap();
  let err = s.add_invite(invite).await.unwrap_err();
  assert!(matches!(err, crate::Error::DuplicateInvite { .. }));

  let invites = s.invites_for_report(report.report_id).await.unwrap();
  assert_eq!(invites.len(), 1);
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subscription_crud() {
  let s = store().await;
  let user = manager(&s, "subscriber@example.com").await;

  let sub = s
    .add_subscription(NewSubscription {
      user_id: user.user_id,
      name:    "Knotweed watch".into(),
      query:   "q=knotweed".into(),
    })
    .await
    .unwrap();

  let fetched = s.get_subscription(sub.subscription_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Knotweed watch");
  assert_eq!(fetched.query, "q=knotweed");

  assert_eq!(s.subscriptions().await.unwrap().len(), 1);
  assert_eq!(
    s.subscriptions_for_user(user.user_id).await.unwrap().len(),
    1
  );

  assert!(s.delete_subscription(sub.subscription_id).await.unwrap());
  assert!(!s.delete_subscription(sub.subscription_id).await.unwrap());
  assert!(s.subscriptions().await.unwrap().is_empty());
}

#[tokio::test]
async fn reassign_subscription_changes_owner() {
  let s = store().await;
  let alice = manager(&s, "alice@example.com").await;
  let bob = manager(&s, "bob@example.com").await;

  let sub = s
    .add_subscription(NewSubscription {
      user_id: alice.user_id,
      name:    "Ivy".into(),
      query:   "q=ivy".into(),
    })
    .await
    .unwrap();

  let updated = s
    .reassign_subscription(sub.subscription_id, bob.user_id)
    .await
    .unwrap();
  assert_eq!(updated.user_id, bob.user_id);
  assert!(s.subscriptions_for_user(alice.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reassign_missing_subscription_errors() {
  let s = store().await;
  let err = s
    .reassign_subscription(Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::SubscriptionNotFound(_)));
}

// ─── Notification ledger ─────────────────────────────────────────────────────

#[tokio::test]
async fn record_notification_is_insert_if_absent() {
  let s = store().await;
  let user = manager(&s, "u@example.com").await;
  let report = s.add_report(new_report(user.user_id)).await.unwrap();

  assert!(
    s.record_notification(user.user_id, report.report_id)
      .await
      .unwrap()
  );
  // Second attempt for the same pair is a no-op, not an error.
  assert!(
    !s.record_notification(user.user_id, report.report_id)
      .await
      .unwrap()
  );

  let notified = s.notified_users(report.report_id).await.unwrap();
  assert_eq!(notified, vec![user.user_id]);
}

#[tokio::test]
async fn ledger_entries_are_per_report() {
  let s = store().await;
  let user = manager(&s, "u@example.com").await;
  let first = s.add_report(new_report(user.user_id)).await.unwrap();
  let second = s.add_report(new_report(user.user_id)).await.unwrap();

  assert!(
    s.record_notification(user.user_id, first.report_id)
      .await
      .unwrap()
  );
  assert!(
    s.record_notification(user.user_id, second.report_id)
      .await
      .unwrap()
  );
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_by_term_matches_title_and_text() {
  let s = store().await;
  let user = manager(&s, "m@example.com").await;

  let knotweed = s.add_report(new_report(user.user_id)).await.unwrap();
  let mut other = new_report(user.user_id);
  other.title = "English ivy".into();
  other.description = "Climbing a garage wall".into();
  let ivy = s.add_report(other).await.unwrap();

  let viewer = Viewer::of(&user);
  let query = ReportQuery { term: Some("knotweed".into()), ..Default::default() };

  let results = s.search_reports(&query, &viewer).await.unwrap();
  assert_eq!(results, vec![knotweed.report_id]);

  let query = ReportQuery { term: Some("garage".into()), ..Default::default() };
  let results = s.search_reports(&query, &viewer).await.unwrap();
  assert_eq!(results, vec![ivy.report_id]);
}

#[tokio::test]
async fn search_term_that_is_an_id_matches_the_report() {
  let s = store().await;
  let user = manager(&s, "m@example.com").await;
  let report = s.add_report(new_report(user.user_id)).await.unwrap();
  s.add_report(new_report(user.user_id)).await.unwrap();

  let query = ReportQuery {
    term: Some(report.report_id.hyphenated().to_string()),
    ..Default::default()
  };
  let results = s.search_reports(&query, &Viewer::of(&user)).await.unwrap();
  assert_eq!(results, vec![report.report_id]);
}

#[tokio::test]
async fn search_by_category_and_county() {
  let s = store().await;
  let user = manager(&s, "m@example.com").await;

  let first = s.add_report(new_report(user.user_id)).await.unwrap();
  let second = s.add_report(new_report(user.user_id)).await.unwrap();

  let viewer = Viewer::of(&user);
  let query = ReportQuery {
    categories: vec![first.category_id],
    ..Default::default()
  };
  assert_eq!(
    s.search_reports(&query, &viewer).await.unwrap(),
    vec![first.report_id]
  );

  let query = ReportQuery {
    counties: vec![second.county_id],
    ..Default::default()
  };
  assert_eq!(
    s.search_reports(&query, &viewer).await.unwrap(),
    vec![second.report_id]
  );
}

#[tokio::test]
async fn search_by_flags() {
  let s = store().await;
  let user = manager(&s, "m@example.com").await;

  let mut archived = new_report(user.user_id);
  archived.is_archived = true;
  let archived = s.add_report(archived).await.unwrap();

  let mut public = new_report(user.user_id);
  public.is_public = true;
  let public = s.add_report(public).await.unwrap();

  let viewer = Viewer::of(&user);

  let query = ReportQuery {
    archived: Some(ArchivedFilter::Archived),
    ..Default::default()
  };
  assert_eq!(
    s.search_reports(&query, &viewer).await.unwrap(),
    vec![archived.report_id]
  );

  let query = ReportQuery {
    public: Some(PublicFilter::Public),
    ..Default::default()
  };
  assert_eq!(
    s.search_reports(&query, &viewer).await.unwrap(),
    vec![public.report_id]
  );
}

#[tokio::test]
async fn search_by_claimant() {
  let s = store().await;
  let manager_a = manager(&s, "a@example.com").await;
  let manager_b = manager(&s, "b@example.com").await;

  let mut claimed = new_report(manager_a.user_id);
  claimed.claimed_by = Some(manager_a.user_id);
  let claimed = s.add_report(claimed).await.unwrap();
  let unclaimed = s.add_report(new_report(manager_a.user_id)).await.unwrap();

  let query = ReportQuery {
    claimed: Some(ClaimedFilter::Me),
    ..Default::default()
  };
  assert_eq!(
    s.search_reports(&query, &Viewer::of(&manager_a)).await.unwrap(),
    vec![claimed.report_id]
  );
  assert!(
    s.search_reports(&query, &Viewer::of(&manager_b))
      .await
      .unwrap()
      .is_empty()
  );

  let query = ReportQuery {
    claimed: Some(ClaimedFilter::Nobody),
    ..Default::default()
  };
  assert_eq!(
    s.search_reports(&query, &Viewer::of(&manager_b)).await.unwrap(),
    vec![unclaimed.report_id]
  );
}

#[tokio::test]
async fn search_by_source() {
  let s = store().await;
  let staff = manager(&s, "staff@example.com").await;
  let expert = manager(&s, "expert@example.com").await;

  let reported = s.add_report(new_report(expert.user_id)).await.unwrap();
  let invited = s.add_report(new_report(staff.user_id)).await.unwrap();
  s.add_invite(NewInvite {
    report_id:  invited.report_id,
    user_id:    expert.user_id,
    created_by: staff.user_id,
  })
  .await
  .unwrap();

  let viewer = Viewer::of(&expert);

  let query = ReportQuery {
    source: Some(SourceFilter::Reported),
    ..Default::default()
  };
  assert_eq!(
    s.search_reports(&query, &viewer).await.unwrap(),
    vec![reported.report_id]
  );

  let query = ReportQuery {
    source: Some(SourceFilter::Invited),
    ..Default::default()
  };
  assert_eq!(
    s.search_reports(&query, &viewer).await.unwrap(),
    vec![invited.report_id]
  );
}

#[tokio::test]
async fn inactive_viewer_only_sees_public_or_tied_reports() {
  let s = store().await;
  let staff = manager(&s, "staff@example.com").await;
  let outsider = submitter(&s, "outsider@example.com").await;

  let private = s.add_report(new_report(staff.user_id)).await.unwrap();
  let mut public = new_report(staff.user_id);
  public.is_public = true;
  let public = s.add_report(public).await.unwrap();
  let own = s.add_report(new_report(outsider.user_id)).await.unwrap();

  let results = s
    .search_reports(&ReportQuery::default(), &Viewer::of(&outsider))
    .await
    .unwrap();

  assert!(results.contains(&public.report_id));
  assert!(results.contains(&own.report_id));
  assert!(!results.contains(&private.report_id));

  // An invite ties the outsider to the private report.
  s.add_invite(NewInvite {
    report_id:  private.report_id,
    user_id:    outsider.user_id,
    created_by: staff.user_id,
  })
  .await
  .unwrap();

  let results = s
    .search_reports(&ReportQuery::default(), &Viewer::of(&outsider))
    .await
    .unwrap();
  assert!(results.contains(&private.report_id));
}

#[tokio::test]
async fn report_matches_is_a_membership_test() {
  let s = store().await;
  let user = manager(&s, "m@example.com").await;
  let report = s.add_report(new_report(user.user_id)).await.unwrap();

  let viewer = Viewer::of(&user);
  let query = ReportQuery { term: Some("knotweed".into()), ..Default::default() };

  assert!(
    s.report_matches(&query, &viewer, report.report_id)
      .await
      .unwrap()
  );
  assert!(
    !s.report_matches(&query, &viewer, Uuid::new_v4())
      .await
      .unwrap()
  );
}
