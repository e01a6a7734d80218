//! Generic attribute modification and reload.

use super::callbacks::run_callbacks;
use super::store::{reject_address_changes, scope_of, touch};
use super::StandardProvisioning;
use crate::entry::{attrs, AttrChanges, Entry, EntryKind, TypedEntry};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::{ModifyOptions, DEFAULT_IDENTITY_NAME};
use crate::storage::{StorageProvider, ADMIN_SCOPE};
use log::{info, trace};

/// Account attributes never shown on the default identity.
const IDENTITY_EXCLUDED: [&str; 5] = ["id", "cn", "description", "createTimestamp", "modifyTimestamp"];

/// Whether `entry` is the implicit identity of its account.
pub(super) fn is_default_identity(entry: &Entry) -> bool {
    entry.kind() == EntryKind::Identity && entry.parent() == Some(entry.id())
}

impl<S: StorageProvider> StandardProvisioning<S> {
    pub async fn modify_attrs<E: TypedEntry>(
        &self,
        entry: &mut E,
        changes: &AttrChanges,
        options: ModifyOptions,
    ) -> ProvisioningResult<()> {
        let target = entry.entry();
        info!(
            "Modifying {} '{}' ({} changes, check_immutable={}, callbacks={})",
            target.kind(),
            target.name(),
            changes.len(),
            options.check_immutable,
            options.allow_callback
        );
        trace!("Modify changes: {:?}", changes);
        reject_address_changes(changes)?;

        let _guard = self.write_lock.lock().await;
        let updated = self.modify_entry(target, changes, options).await?;
        *entry.entry_mut() = updated;
        Ok(())
    }

    pub async fn reload<E: TypedEntry>(&self, entry: &mut E) -> ProvisioningResult<()> {
        let current = entry.entry();
        let fresh = if is_default_identity(current) {
            let account = self.load_account_entry(current.id()).await?;
            self.default_identity(&account)
        } else {
            let stored = self
                .load_existing(scope_of(current), current.kind(), current.id())
                .await?;
            self.resolve(stored).await?
        };
        *entry.entry_mut() = fresh;
        Ok(())
    }

    /// Validate, apply, run callbacks and store. The caller holds the write lock.
    pub(super) async fn modify_entry(
        &self,
        target: &Entry,
        changes: &AttrChanges,
        options: ModifyOptions,
    ) -> ProvisioningResult<Entry> {
        if changes.touches("id") {
            return Err(ProvisioningError::invalid_request(
                "attribute id cannot be modified",
            ));
        }
        if is_default_identity(target) {
            return self.modify_default_identity(target.id(), changes, options).await;
        }

        let kind = target.kind();
        let validated = self
            .registry
            .validate_changes(kind, changes, options.check_immutable)?;
        let mut current = self
            .load_existing(scope_of(target), kind, target.id())
            .await?;
        current.apply(&validated);

        if kind == EntryKind::Identity {
            self.follow_identity_rename(&mut current).await?;
        }

        self.store_modified(current, &validated, options).await
    }

    /// Resolve defaults, run callbacks, stamp and save.
    async fn store_modified(
        &self,
        mut entry: Entry,
        validated: &AttrChanges,
        options: ModifyOptions,
    ) -> ProvisioningResult<Entry> {
        entry.set_defaults(self.defaults_for(&entry).await?);
        if options.allow_callback {
            run_callbacks(
                &self.registry,
                validated.iter().map(|(name, _)| name),
                &mut entry,
            )?;
        }
        touch(&mut entry);
        self.save(&entry).await?;
        Ok(entry)
    }

    /// A change of `prefIdentityName` renames the identity.
    async fn follow_identity_rename(&self, identity: &mut Entry) -> ProvisioningResult<()> {
        let Some(new_name) = identity.get(&attrs::PREF_IDENTITY_NAME) else {
            return Ok(());
        };
        if new_name == identity.name() {
            return Ok(());
        }
        if new_name.eq_ignore_ascii_case(DEFAULT_IDENTITY_NAME) {
            return Err(ProvisioningError::exists(EntryKind::Identity, new_name));
        }
        if let Some(other) = self
            .find_by_name(scope_of(identity), EntryKind::Identity, &new_name)
            .await?
        {
            if other.id() != identity.id() {
                return Err(ProvisioningError::exists(EntryKind::Identity, new_name));
            }
        }
        info!("Renaming identity '{}' to '{}'", identity.name(), new_name);
        identity.set_name(new_name);
        Ok(())
    }

    /// Changes to the default identity land on the account itself.
    async fn modify_default_identity(
        &self,
        account_id: &str,
        changes: &AttrChanges,
        options: ModifyOptions,
    ) -> ProvisioningResult<Entry> {
        self.registry
            .validate_changes(EntryKind::Identity, changes, options.check_immutable)?;
        if changes.touches(attrs::PREF_IDENTITY_NAME.name()) {
            return Err(ProvisioningError::invalid_request(
                "the default identity cannot be renamed",
            ));
        }

        let mut account = self.load_account_entry(account_id).await?;
        let validated =
            self.registry
                .validate_changes(account.kind(), changes, options.check_immutable)?;
        account.apply(&validated);
        let account = self.store_modified(account, &validated, options).await?;
        Ok(self.default_identity(&account))
    }

    /// The stored account or calendar resource with `id`, administrators
    /// outside the directory included.
    pub(super) async fn load_account_entry(&self, id: &str) -> ProvisioningResult<Entry> {
        let entry = match self
            .load_any(&[EntryKind::Account, EntryKind::CalendarResource], id)
            .await?
        {
            Some(entry) => Some(entry),
            None => self.load(ADMIN_SCOPE, EntryKind::Account, id).await?,
        };
        let entry = entry.ok_or_else(|| ProvisioningError::no_such(EntryKind::Account, id))?;
        self.resolve(entry).await
    }

    /// The implicit identity of an account, built from its own attributes.
    pub(super) fn default_identity(&self, account: &Entry) -> Entry {
        let mut identity = Entry::new(EntryKind::Identity, account.id(), DEFAULT_IDENTITY_NAME)
            .with_parent(account.id());

        let own = identity.attrs_mut();
        for (name, values) in account.attrs() {
            if IDENTITY_EXCLUDED.contains(&name.as_str()) {
                continue;
            }
            if self
                .registry
                .get(name)
                .is_some_and(|definition| definition.applies_to(EntryKind::Identity))
            {
                own.insert(name.clone(), values.clone());
            }
        }
        own.insert("id".to_string(), vec![account.id().to_string()]);
        own.insert(
            attrs::PREF_IDENTITY_NAME.name().to_string(),
            vec![DEFAULT_IDENTITY_NAME.to_string()],
        );
        own
            .entry(attrs::PREF_FROM_ADDRESS.name().to_string())
            .or_insert_with(|| vec![account.name().to_string()]);
        if let Some(display_name) = account.get_str("displayName") {
            own
                .entry(attrs::PREF_FROM_DISPLAY.name().to_string())
                .or_insert_with(|| vec![display_name.to_string()]);
        }

        identity.set_defaults(std::sync::Arc::new(
            self.registry.defaults_for(EntryKind::Identity),
        ));
        identity
    }
}
