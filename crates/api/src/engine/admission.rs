//! Staff account admission and role management.

use chrono::Utc;
use staffpurchase_core::error::CoreError;
use staffpurchase_core::roles::{admit, resolve_display_name, Admission, Role};
use staffpurchase_db::models::staff::{StaffAccount, StaffSummary, StaffUpsert};
use staffpurchase_db::StaffStore;
use staffpurchase_events::{EventBus, WorkflowEvent};

use crate::auth::identity::VerifiedIdentity;
use crate::error::AppResult;

const USER_NOT_FOUND: &str = "User not found";

pub struct StaffAdmission<'a> {
    store: &'a dyn StaffStore,
    bus: &'a EventBus,
}

impl<'a> StaffAdmission<'a> {
    pub fn new(store: &'a dyn StaffStore, bus: &'a EventBus) -> Self {
        Self { store, bus }
    }

    /// Create or refresh the account behind a verified identity.
    ///
    /// The first account ever synced becomes `admin`; later newcomers wait
    /// as `pending`. Returning accounts keep their role.
    pub async fn sync(&self, identity: &VerifiedIdentity) -> AppResult<StaffAccount> {
        let existing = self.store.find(&identity.uid).await?;
        let store_is_empty = match &existing {
            Some(_) => false,
            None => self.store.is_empty().await?,
        };
        let admission = admit(store_is_empty, existing.as_ref().map(|a| a.role));

        let name = resolve_display_name(
            identity.name.as_deref(),
            existing.as_ref().map(|a| a.name.as_str()),
            identity.email.as_deref(),
        );
        let email = identity
            .email
            .clone()
            .or_else(|| existing.as_ref().map(|a| a.email.clone()))
            .unwrap_or_default();
        let photo_url = identity
            .picture
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| existing.as_ref().map(|a| a.photo_url.clone()))
            .unwrap_or_default();

        let account = self
            .store
            .upsert(&StaffUpsert {
                uid: identity.uid.clone(),
                email,
                name,
                photo_url,
                role: admission.role(),
                last_login: Utc::now(),
            })
            .await?;

        match admission {
            Admission::Bootstrap => {
                tracing::info!(uid = %account.uid, email = %account.email, "First account bootstrapped as admin");
            }
            Admission::AwaitingApproval => {
                tracing::info!(uid = %account.uid, email = %account.email, "New registration awaiting approval");
            }
            Admission::Returning(_) => {
                tracing::debug!(uid = %account.uid, role = %account.role, "Account synced");
            }
        }

        if admission.notifies_registration() {
            self.bus.publish(WorkflowEvent::StaffRegistered {
                account: account.clone(),
            });
        }
        Ok(account)
    }

    pub async fn list(&self) -> AppResult<Vec<StaffSummary>> {
        let accounts = self.store.list().await?;
        Ok(accounts.into_iter().map(StaffSummary::from).collect())
    }

    /// Assign `role` to `uid` on behalf of `actor`.
    pub async fn change_role(
        &self,
        uid: &str,
        role: &str,
        actor: &StaffAccount,
    ) -> AppResult<Role> {
        let new_role = Role::parse_assignable(role)?;
        let previous = self
            .store
            .set_role(uid, new_role)
            .await?
            .ok_or_else(|| CoreError::NotFound(USER_NOT_FOUND.into()))?;

        let old_role = previous.role;
        tracing::info!(
            uid,
            old_role = %old_role,
            new_role = %new_role,
            changed_by = %actor.uid,
            "Role updated"
        );

        if old_role != new_role {
            let changed_by = if actor.name.trim().is_empty() {
                actor.email.clone()
            } else {
                actor.name.clone()
            };
            self.bus.publish(WorkflowEvent::RoleChanged {
                account: StaffAccount {
                    role: new_role,
                    ..previous
                },
                old_role,
                new_role,
                changed_by,
            });
        }
        Ok(new_role)
    }

    /// Remove the staff record. The identity provider account is untouched.
    pub async fn delete(&self, uid: &str) -> AppResult<()> {
        if !self.store.delete(uid).await? {
            return Err(CoreError::NotFound(USER_NOT_FOUND.into()).into());
        }
        tracing::info!(uid, "Staff account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use staffpurchase_db::{MemoryStore, StoreResult};

    use super::*;
    use crate::error::AppError;

    /// Promotes an account to `staff` right after `find` has read it, the
    /// way a concurrent admin role change would.
    struct PromoteAfterFind {
        inner: MemoryStore,
        target: &'static str,
    }

    #[async_trait]
    impl StaffStore for PromoteAfterFind {
        async fn is_empty(&self) -> StoreResult<bool> {
            self.inner.is_empty().await
        }

        async fn find(&self, uid: &str) -> StoreResult<Option<StaffAccount>> {
            let found = StaffStore::find(&self.inner, uid).await?;
            if uid == self.target {
                self.inner.set_role(uid, Role::Staff).await?;
            }
            Ok(found)
        }

        async fn upsert(&self, input: &StaffUpsert) -> StoreResult<StaffAccount> {
            self.inner.upsert(input).await
        }

        async fn list(&self) -> StoreResult<Vec<StaffAccount>> {
            StaffStore::list(&self.inner).await
        }

        async fn set_role(&self, uid: &str, role: Role) -> StoreResult<Option<StaffAccount>> {
            self.inner.set_role(uid, role).await
        }

        async fn delete(&self, uid: &str) -> StoreResult<bool> {
            StaffStore::delete(&self.inner, uid).await
        }
    }

    fn identity(uid: &str, email: &str, name: Option<&str>) -> VerifiedIdentity {
        VerifiedIdentity {
            uid: uid.into(),
            email: Some(email.into()),
            name: name.map(str::to_string),
            picture: None,
        }
    }

    #[tokio::test]
    async fn first_sync_bootstraps_admin_then_newcomers_wait() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let engine = StaffAdmission::new(&store, &bus);

        let first = engine.sync(&identity("u1", "boss@example.com", None)).await.unwrap();
        assert_eq!(first.role, Role::Admin);
        assert_eq!(first.name, "Boss");

        let second = engine
            .sync(&identity("u2", "kim@example.com", Some("Kim")))
            .await
            .unwrap();
        assert_eq!(second.role, Role::Pending);

        // Only the pending registration is announced.
        let published = rx.recv().await.unwrap();
        assert_matches!(
            published.event,
            WorkflowEvent::StaffRegistered { account } if account.uid == "u2"
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn returning_sync_keeps_role_and_stored_name() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let engine = StaffAdmission::new(&store, &bus);

        engine.sync(&identity("u1", "boss@example.com", Some("The Boss"))).await.unwrap();
        let again = engine.sync(&identity("u1", "boss@example.com", None)).await.unwrap();

        assert_eq!(again.role, Role::Admin);
        assert_eq!(again.name, "The Boss");
        assert!(again.last_login.is_some());
    }

    #[tokio::test]
    async fn sync_does_not_revert_a_concurrent_promotion() {
        let bus = EventBus::default();
        let store = PromoteAfterFind {
            inner: MemoryStore::new(),
            target: "u2",
        };
        let plain = StaffAdmission::new(&store.inner, &bus);
        plain.sync(&identity("u1", "boss@example.com", Some("Boss"))).await.unwrap();
        plain.sync(&identity("u2", "kim@example.com", Some("Kim"))).await.unwrap();

        let engine = StaffAdmission::new(&store, &bus);
        let synced = engine
            .sync(&identity("u2", "kim@example.com", Some("Kim")))
            .await
            .unwrap();

        assert_eq!(synced.role, Role::Staff);
        let stored = StaffStore::find(&store.inner, "u2").await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Staff);
    }

    #[tokio::test]
    async fn change_role_validates_and_notifies() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let engine = StaffAdmission::new(&store, &bus);
        let admin = engine.sync(&identity("u1", "boss@example.com", Some("Boss"))).await.unwrap();
        engine.sync(&identity("u2", "kim@example.com", Some("Kim"))).await.unwrap();

        assert_matches!(
            engine.change_role("u2", "pending", &admin).await,
            Err(AppError::Core(CoreError::Validation(msg))) if msg == "Invalid role"
        );
        assert_matches!(
            engine.change_role("ghost", "staff", &admin).await,
            Err(AppError::Core(CoreError::NotFound(msg))) if msg == "User not found"
        );

        let mut rx = bus.subscribe();
        let role = engine.change_role("u2", "representative", &admin).await.unwrap();
        assert_eq!(role, Role::Representative);

        let published = rx.recv().await.unwrap();
        assert_matches!(
            published.event,
            WorkflowEvent::RoleChanged { old_role: Role::Pending, new_role: Role::Representative, changed_by, .. }
                if changed_by == "Boss"
        );
    }

    #[tokio::test]
    async fn delete_missing_account_is_not_found() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let engine = StaffAdmission::new(&store, &bus);

        assert_matches!(
            engine.delete("ghost").await,
            Err(AppError::Core(CoreError::NotFound(_)))
        );
    }
}
