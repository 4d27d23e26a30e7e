//! Newsletter signup reconciliation.
//!
//! A signup touches two systems that cannot be updated atomically: the
//! Mailchimp list and the local `newsletter_signups` table. The flow
//! orders the writes so the only reachable inconsistency is "subscribed
//! remotely, missing locally", and compensates by removing the remote
//! subscriber when the local write fails. A failed compensation is logged
//! as requiring manual reconciliation; it is never silently dropped.

use tracing::{error, info};

use crate::models::newsletter::{NewSignup, NewsletterSignup, SignupStore};
use crate::services::mailchimp::MailingList;
use crate::utils::error::{AppError, StoreError};

#[derive(Debug)]
pub enum SignupOutcome {
    /// First signup for this email; responds 201.
    Created(NewsletterSignup),
    /// Re-signup; the existing row kept its id and got the latest names.
    Updated(NewsletterSignup),
}

impl SignupOutcome {
    pub fn into_record(self) -> NewsletterSignup {
        match self {
            SignupOutcome::Created(record) | SignupOutcome::Updated(record) => record,
        }
    }
}

/// Runs one signup end to end. The mailing-list upsert must succeed before
/// any local write is attempted; see the module docs for why the order
/// matters.
pub async fn process_signup(
    list: &dyn MailingList,
    store: &dyn SignupStore,
    signup: NewSignup,
) -> Result<SignupOutcome, AppError> {
    if let Err(err) = list
        .upsert_subscriber(&signup.email, &signup.first_name, &signup.last_name)
        .await
    {
        // Nothing was written locally, so there is nothing to undo.
        error!(email = %signup.email, error = %err, "Mailing list upsert failed");
        return Err(AppError::MailingList(err.to_string()));
    }

    match write_signup(store, &signup).await {
        Ok(outcome) => Ok(outcome),
        Err(store_err) => {
            // The provider now has a subscriber with no local row. Undo the
            // remote write so both systems agree the signup failed.
            match list.remove_subscriber(&signup.email).await {
                Ok(()) => {
                    info!(
                        email = %signup.email,
                        error = %store_err,
                        "Local signup write failed; mailing list subscription rolled back"
                    );
                }
                Err(rollback_err) => {
                    error!(
                        email = %signup.email,
                        database_error = %store_err,
                        rollback_error = %rollback_err,
                        manual_reconciliation_required = true,
                        "Local signup write failed and the mailing list rollback also \
                         failed; subscriber state must be reconciled manually"
                    );
                }
            }
            Err(AppError::Database(store_err.to_string()))
        }
    }
}

async fn write_signup(
    store: &dyn SignupStore,
    signup: &NewSignup,
) -> Result<SignupOutcome, StoreError> {
    if let Some(existing) = store.find_by_email(&signup.email).await? {
        let updated = store
            .update_names(existing.id, &signup.first_name, &signup.last_name)
            .await?;
        return Ok(SignupOutcome::Updated(updated));
    }

    match store.insert(signup).await {
        Ok(created) => Ok(SignupOutcome::Created(created)),
        // Two concurrent signups for the same email can both miss the
        // existence check; the unique index decides the winner and the
        // loser lands here and takes the update path.
        Err(StoreError::Duplicate) => {
            let existing = store.find_by_email(&signup.email).await?.ok_or_else(|| {
                StoreError::Unavailable(
                    "signup row missing after duplicate insert".to_string(),
                )
            })?;
            let updated = store
                .update_names(existing.id, &signup.first_name, &signup.last_name)
                .await?;
            Ok(SignupOutcome::Updated(updated))
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::services::mailchimp::MailingListError;

    fn signup(email: &str, first_name: &str, last_name: &str) -> NewSignup {
        NewSignup {
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    #[derive(Default)]
    struct MockList {
        fail_upsert: bool,
        fail_remove: bool,
        upsert_calls: Mutex<Vec<String>>,
        remove_calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MailingList for MockList {
        async fn upsert_subscriber(
            &self,
            email: &str,
            _first_name: &str,
            _last_name: &str,
        ) -> Result<(), MailingListError> {
            self.upsert_calls.lock().unwrap().push(email.to_string());
            if self.fail_upsert {
                Err(MailingListError::Api {
                    status: 503,
                    detail: "list unavailable".to_string(),
                })
            } else {
                Ok(())
            }
        }

        async fn remove_subscriber(&self, email: &str) -> Result<(), MailingListError> {
            self.remove_calls.lock().unwrap().push(email.to_string());
            if self.fail_remove {
                Err(MailingListError::Api {
                    status: 503,
                    detail: "list unavailable".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct MockStore {
        fail_insert: bool,
        duplicate_on_insert: bool,
        rows: Mutex<HashMap<String, NewsletterSignup>>,
    }

    impl MockStore {
        fn with_row(self, email: &str, first_name: &str, last_name: &str) -> Self {
            let row = NewsletterSignup {
                id: Uuid::new_v4(),
                email: email.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().insert(email.to_string(), row);
            self
        }

        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn row(&self, email: &str) -> NewsletterSignup {
            self.rows.lock().unwrap().get(email).cloned().unwrap()
        }
    }

    #[async_trait]
    impl SignupStore for MockStore {
        async fn find_by_email(
            &self,
            email: &str,
        ) -> Result<Option<NewsletterSignup>, StoreError> {
            Ok(self.rows.lock().unwrap().get(email).cloned())
        }

        async fn insert(&self, signup: &NewSignup) -> Result<NewsletterSignup, StoreError> {
            if self.fail_insert {
                return Err(StoreError::Unavailable("connection reset".to_string()));
            }
            if self.duplicate_on_insert || self.rows.lock().unwrap().contains_key(&signup.email) {
                return Err(StoreError::Duplicate);
            }
            let row = NewsletterSignup {
                id: Uuid::new_v4(),
                email: signup.email.clone(),
                first_name: signup.first_name.clone(),
                last_name: signup.last_name.clone(),
                created_at: Utc::now(),
            };
            self.rows
                .lock()
                .unwrap()
                .insert(signup.email.clone(), row.clone());
            Ok(row)
        }

        async fn update_names(
            &self,
            id: Uuid,
            first_name: &str,
            last_name: &str,
        ) -> Result<NewsletterSignup, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .values_mut()
                .find(|row| row.id == id)
                .ok_or(StoreError::NotFound)?;
            row.first_name = first_name.to_string();
            row.last_name = last_name.to_string();
            Ok(row.clone())
        }
    }

    #[tokio::test]
    async fn first_signup_creates_a_row() {
        let list = MockList::default();
        let store = MockStore::default();

        let outcome = process_signup(&list, &store, signup("jd1234@stern.nyu.edu", "Jane", "Doe"))
            .await
            .unwrap();

        assert!(matches!(outcome, SignupOutcome::Created(_)));
        assert_eq!(store.row_count(), 1);
        assert_eq!(
            list.upsert_calls.lock().unwrap().as_slice(),
            ["jd1234@stern.nyu.edu"]
        );
        assert!(list.remove_calls.lock().unwrap().is_empty());

        let row = store.row("jd1234@stern.nyu.edu");
        assert_eq!(row.first_name, "Jane");
        assert_eq!(row.last_name, "Doe");
    }

    #[tokio::test]
    async fn repeat_signup_updates_names_in_place() {
        let list = MockList::default();
        let store = MockStore::default();

        let first = process_signup(&list, &store, signup("jd1234@stern.nyu.edu", "Jane", "Doe"))
            .await
            .unwrap()
            .into_record();
        let second = process_signup(
            &list,
            &store,
            signup("jd1234@stern.nyu.edu", "Jane", "Smith"),
        )
        .await
        .unwrap();

        assert!(matches!(second, SignupOutcome::Updated(_)));
        let second = second.into_record();

        // One row, same id, latest names
        assert_eq!(store.row_count(), 1);
        assert_eq!(second.id, first.id);
        assert_eq!(store.row("jd1234@stern.nyu.edu").last_name, "Smith");

        // The upsert is repeated; Mailchimp converges on one subscriber
        assert_eq!(list.upsert_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mailing_list_failure_blocks_all_local_writes() {
        let list = MockList {
            fail_upsert: true,
            ..Default::default()
        };
        let store = MockStore::default();

        let err = process_signup(&list, &store, signup("jd1234@stern.nyu.edu", "Jane", "Doe"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MailingList(_)));
        assert_eq!(err.code(), "MAILCHIMP_ERROR");
        assert_eq!(store.row_count(), 0);
        assert!(list.remove_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn local_failure_triggers_compensating_removal() {
        let list = MockList::default();
        let store = MockStore {
            fail_insert: true,
            ..Default::default()
        };

        let err = process_signup(&list, &store, signup("jd1234@stern.nyu.edu", "Jane", "Doe"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.code(), "DATABASE_ERROR");
        // The exact email that was subscribed gets removed again
        assert_eq!(
            list.remove_calls.lock().unwrap().as_slice(),
            ["jd1234@stern.nyu.edu"]
        );
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn double_failure_still_reports_a_database_error() {
        let list = MockList {
            fail_remove: true,
            ..Default::default()
        };
        let store = MockStore {
            fail_insert: true,
            ..Default::default()
        };

        let err = process_signup(&list, &store, signup("jd1234@stern.nyu.edu", "Jane", "Doe"))
            .await
            .unwrap_err();

        // The rollback was attempted even though it failed; the caller
        // still sees a database error, never a silent success.
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(list.remove_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_failure_also_rolls_back_the_subscription() {
        let list = MockList::default();
        // A pre-existing row forces the update path, and the update fails.
        let failing = FailingUpdateStore {
            inner: MockStore::default().with_row("jd1234@stern.nyu.edu", "Jane", "Doe"),
        };

        let err = process_signup(
            &list,
            &failing,
            signup("jd1234@stern.nyu.edu", "Jane", "Smith"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(list.remove_calls.lock().unwrap().len(), 1);
    }

    struct FailingUpdateStore {
        inner: MockStore,
    }

    #[async_trait]
    impl SignupStore for FailingUpdateStore {
        async fn find_by_email(
            &self,
            email: &str,
        ) -> Result<Option<NewsletterSignup>, StoreError> {
            self.inner.find_by_email(email).await
        }

        async fn insert(&self, signup: &NewSignup) -> Result<NewsletterSignup, StoreError> {
            self.inner.insert(signup).await
        }

        async fn update_names(
            &self,
            _id: Uuid,
            _first_name: &str,
            _last_name: &str,
        ) -> Result<NewsletterSignup, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
    }

    #[tokio::test]
    async fn insert_race_resolves_to_the_update_path() {
        let list = MockList::default();
        // duplicate_on_insert simulates losing an insert race: the
        // existence check saw nothing, the insert hit the unique index,
        // and by then the winner's row is visible.
        let store = MockStore {
            duplicate_on_insert: true,
            ..Default::default()
        }
        .with_row("jd1234@stern.nyu.edu", "Other", "Writer");

        let outcome = process_signup(
            &list,
            &RaceyStore {
                inner: store,
                first_lookup_done: Mutex::new(false),
            },
            signup("jd1234@stern.nyu.edu", "Jane", "Doe"),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, SignupOutcome::Updated(_)));
        let record = outcome.into_record();
        assert_eq!(record.first_name, "Jane");
        assert!(list.remove_calls.lock().unwrap().is_empty());
    }

    /// Hides the pre-seeded row from the first existence check so the flow
    /// goes down the insert path and collides with the unique index.
    struct RaceyStore {
        inner: MockStore,
        first_lookup_done: Mutex<bool>,
    }

    #[async_trait]
    impl SignupStore for RaceyStore {
        async fn find_by_email(
            &self,
            email: &str,
        ) -> Result<Option<NewsletterSignup>, StoreError> {
            {
                let mut done = self.first_lookup_done.lock().unwrap();
                if !*done {
                    *done = true;
                    return Ok(None);
                }
            }
            self.inner.find_by_email(email).await
        }

        async fn insert(&self, signup: &NewSignup) -> Result<NewsletterSignup, StoreError> {
            self.inner.insert(signup).await
        }

        async fn update_names(
            &self,
            id: Uuid,
            first_name: &str,
            last_name: &str,
        ) -> Result<NewsletterSignup, StoreError> {
            self.inner.update_names(id, first_name, last_name).await
        }
    }
}
