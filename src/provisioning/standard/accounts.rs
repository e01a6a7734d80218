//! Accounts, calendar resources, aliases and credentials.

use super::store::{local_part, scope_of, touch, view, views};
use super::{single_change, StandardProvisioning};
use crate::auth::{hash_password, verify_password, AuthProtocol, PasswordPolicy, PreAuthRequest};
use crate::entry::{
    attrs, value, Account, AccountCalendarUserType, AccountStatus, AttrChanges, CalendarResource,
    Cos, Domain, Entry, EntryKind, TypedEntry,
};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::{AccountBy, EntryBy, ModifyOptions};
use crate::storage::{StorageProvider, ADMIN_SCOPE, DIRECTORY_SCOPE};
use chrono::Utc;
use log::{debug, info, trace, warn};

/// Check `password` against the entry's policy and store its hash.
pub(super) fn store_password(entry: &mut Entry, password: &str) -> ProvisioningResult<()> {
    PasswordPolicy::from_entry(entry).check(password)?;
    let now = value::format_generalized_time(&Utc::now());
    let own = entry.attrs_mut();
    own.insert(
        attrs::USER_PASSWORD.name().to_string(),
        vec![hash_password(password)],
    );
    own.insert(attrs::PASSWORD_MODIFIED_TIME.name().to_string(), vec![now]);
    Ok(())
}

/// Refuse login for anything but an active account.
fn check_login_status(entry: &Entry) -> ProvisioningResult<()> {
    match entry.get(&attrs::ACCOUNT_STATUS) {
        Some(AccountStatus::Active) => Ok(()),
        Some(AccountStatus::Maintenance) => Err(ProvisioningError::MaintenanceMode {
            account: entry.name().to_string(),
        }),
        Some(status) => Err(ProvisioningError::auth_failed(
            entry.name(),
            format!("account status is {}", status),
        )),
        None => Err(ProvisioningError::auth_failed(
            entry.name(),
            "account has no status",
        )),
    }
}

fn is_account_kind(kind: EntryKind) -> bool {
    matches!(kind, EntryKind::Account | EntryKind::CalendarResource)
}

impl<S: StorageProvider> StandardProvisioning<S> {
    pub async fn create_account(
        &self,
        email: &str,
        password: Option<&str>,
        attrs: AttrChanges,
    ) -> ProvisioningResult<Account> {
        info!("Creating account '{}'", email);
        trace!("Account attributes: {:?}", attrs);
        let _guard = self.write_lock.lock().await;
        let entry = self
            .insert_account(EntryKind::Account, email, password, &attrs)
            .await?;
        view(entry)
    }

    /// Create and store an account or calendar resource. The caller holds
    /// the write lock.
    pub(super) async fn insert_account(
        &self,
        kind: EntryKind,
        email: &str,
        password: Option<&str>,
        changes: &AttrChanges,
    ) -> ProvisioningResult<Entry> {
        let address = self.checked_address(email)?;
        self.domain_for_address(&address).await?;
        self.ensure_address_free(kind, &address).await?;

        let mut presets = vec![
            (attrs::UID.name(), local_part(&address).to_string()),
            (attrs::MAIL.name(), address.clone()),
            (attrs::MAIL_DELIVERY_ADDRESS.name(), address.clone()),
            (attrs::ACCOUNT_STATUS.name(), AccountStatus::Active.to_string()),
            (attrs::MAIL_HOST.name(), self.config.local_server_name.clone()),
        ];
        if kind == EntryKind::CalendarResource {
            presets.push((
                attrs::ACCOUNT_CALENDAR_USER_TYPE.name(),
                AccountCalendarUserType::Resource.to_string(),
            ));
        }

        let base = Self::new_entry(kind, &address, None);
        let mut entry = self.prepare_entry(base, changes, &presets).await?;
        if let Some(password) = password {
            store_password(&mut entry, password)?;
        }
        self.save(&entry).await?;
        info!("Created {} {} ({})", kind, address, entry.id());
        Ok(entry)
    }

    pub async fn get_account(&self, by: AccountBy) -> ProvisioningResult<Option<Account>> {
        debug!("Looking up account by {:?}", by);
        let found = match &by {
            AccountBy::Id(id) => match self.load_account_entry(id).await {
                Ok(entry) => Some(entry),
                Err(ProvisioningError::NoSuchEntry { .. }) => None,
                Err(e) => return Err(e),
            },
            AccountBy::Name(name) => {
                let address = self.qualify(name);
                match self.find_by_address(EntryKind::Account, &address).await? {
                    Some(entry) => Some(entry),
                    None => {
                        self.find_by_address(EntryKind::CalendarResource, &address)
                            .await?
                    }
                }
            }
            AccountBy::AdminName(name) => {
                self.find_by_name(ADMIN_SCOPE, EntryKind::Account, &name.trim().to_lowercase())
                    .await?
            }
        };

        match found {
            Some(entry) => Ok(Some(view(self.resolve(entry).await?)?)),
            None => Ok(None),
        }
    }

    pub async fn get_all_accounts(&self, domain: &Domain) -> ProvisioningResult<Vec<Account>> {
        views(
            self.lookup_in_domain(EntryKind::Account, domain.name())
                .await?,
        )
    }

    /// Accounts and calendar resources flagged as administrators. The system
    /// administrator is not a directory account and is not listed.
    pub async fn get_all_admin_accounts(&self) -> ProvisioningResult<Vec<Account>> {
        let mut admins = Vec::new();
        for kind in [EntryKind::Account, EntryKind::CalendarResource] {
            for entry in self.lookup_all(kind).await? {
                if entry.get(&attrs::IS_ADMIN_ACCOUNT) {
                    admins.push(view(entry)?);
                }
            }
        }
        Ok(admins)
    }

    pub async fn rename_account(&self, account_id: &str, new_name: &str) -> ProvisioningResult<()> {
        self.rename_addressable(EntryKind::Account, account_id, new_name)
            .await
    }

    pub async fn delete_account(&self, account_id: &str) -> ProvisioningResult<()> {
        self.delete_addressable(EntryKind::Account, account_id)
            .await
    }

    pub async fn modify_account_status(
        &self,
        account: &mut Account,
        status: AccountStatus,
    ) -> ProvisioningResult<()> {
        info!("Setting status of {} to {}", account.name(), status);
        let changes = single_change(&attrs::ACCOUNT_STATUS, status);
        let _guard = self.write_lock.lock().await;
        let updated = self
            .modify_entry(account.entry(), &changes, ModifyOptions::default())
            .await?;
        *account.entry_mut() = updated;
        Ok(())
    }

    pub async fn set_cos(&self, account: &mut Account, cos: &Cos) -> ProvisioningResult<()> {
        info!("Assigning cos '{}' to {}", cos.name(), account.name());
        let changes = single_change(&attrs::COS_ID, cos.id());
        let _guard = self.write_lock.lock().await;
        let updated = self
            .modify_entry(account.entry(), &changes, ModifyOptions::default())
            .await?;
        *account.entry_mut() = updated;
        Ok(())
    }

    pub async fn add_alias<E: TypedEntry>(
        &self,
        entry: &mut E,
        alias: &str,
    ) -> ProvisioningResult<()> {
        let target = entry.entry();
        if !target.kind().is_addressable() {
            return Err(ProvisioningError::invalid_request(format!(
                "{} entries cannot have aliases",
                target.kind()
            )));
        }
        let alias = self.checked_address(alias)?;
        info!("Adding alias {} to {} {}", alias, target.kind(), target.name());

        let _guard = self.write_lock.lock().await;
        self.domain_for_address(&alias).await?;
        self.ensure_address_free(target.kind(), &alias).await?;

        let mut changes = AttrChanges::new();
        changes.add_value(attrs::MAIL_ALIAS.name(), alias);
        let updated = self
            .modify_entry(target, &changes, ModifyOptions::default())
            .await?;
        *entry.entry_mut() = updated;
        Ok(())
    }

    /// Remove an alias. List memberships under the alias go with it.
    pub async fn remove_alias<E: TypedEntry>(
        &self,
        entry: &mut E,
        alias: &str,
    ) -> ProvisioningResult<()> {
        let target = entry.entry();
        let alias = self.qualify(alias);
        info!(
            "Removing alias {} from {} {}",
            alias,
            target.kind(),
            target.name()
        );

        let _guard = self.write_lock.lock().await;
        let current = self
            .load_existing(scope_of(target), target.kind(), target.id())
            .await?;
        let has_alias = current
            .values(attrs::MAIL_ALIAS.name())
            .is_some_and(|aliases| aliases.iter().any(|a| a.eq_ignore_ascii_case(&alias)));
        if !has_alias {
            return Err(ProvisioningError::NoSuchAlias { alias });
        }

        let mut changes = AttrChanges::new();
        changes.remove_value(attrs::MAIL_ALIAS.name(), alias.as_str());
        let updated = self
            .modify_entry(&current, &changes, ModifyOptions::default())
            .await?;
        self.rewrite_member(&alias, None).await?;
        *entry.entry_mut() = updated;
        Ok(())
    }

    pub async fn auth_account(
        &self,
        account: &Account,
        password: &str,
        protocol: AuthProtocol,
    ) -> ProvisioningResult<()> {
        debug!("Authenticating {} over {}", account.name(), protocol);
        let current = self.load_account_entry(account.id()).await?;
        check_login_status(&current)?;

        let Some(stored) = current.get_str(attrs::USER_PASSWORD.name()) else {
            return Err(ProvisioningError::auth_failed(
                current.name(),
                "no password set",
            ));
        };
        if !verify_password(password, stored) {
            warn!("Password mismatch for {} over {}", current.name(), protocol);
            return Err(ProvisioningError::auth_failed(
                current.name(),
                "invalid password",
            ));
        }
        info!("Authenticated {} over {}", current.name(), protocol);
        Ok(())
    }

    /// Check a pre-auth signature made with the account domain's `preAuthKey`.
    pub async fn pre_auth_account(
        &self,
        account: &Account,
        account_name: &str,
        account_by: &str,
        timestamp: i64,
        expires: i64,
        preauth: &str,
    ) -> ProvisioningResult<()> {
        debug!(
            "Pre-authenticating {} by {} at {}",
            account_name, account_by, timestamp
        );
        let current = self.load_account_entry(account.id()).await?;

        let names_account = match account_by {
            "id" => account_name == current.id(),
            "name" => {
                let address = self.qualify(account_name);
                current.name().eq_ignore_ascii_case(&address)
                    || current
                        .get_multi(attrs::MAIL_ALIAS.name())
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(&address))
            }
            other => {
                return Err(ProvisioningError::invalid_request(format!(
                    "unknown account selector '{}'",
                    other
                )));
            }
        };
        if !names_account {
            return Err(ProvisioningError::auth_failed(
                current.name(),
                format!("pre-auth request names {}", account_name),
            ));
        }

        let domain = self.domain_for_address(current.name()).await?;
        let Some(key) = domain.get_str(attrs::PRE_AUTH_KEY.name()) else {
            return Err(ProvisioningError::auth_failed(
                current.name(),
                format!("domain {} has no pre-auth key", domain.name()),
            ));
        };

        let request = PreAuthRequest {
            account: account_name.to_string(),
            by: account_by.to_string(),
            timestamp,
            expires,
        };
        request.verify(
            key,
            preauth,
            Utc::now().timestamp_millis(),
            self.config.preauth_max_skew_ms(),
        )?;
        check_login_status(&current)?;
        info!("Pre-authenticated {}", current.name());
        Ok(())
    }

    pub async fn change_password(
        &self,
        account: &mut Account,
        current_password: &str,
        new_password: &str,
    ) -> ProvisioningResult<()> {
        info!("Changing password of {}", account.name());
        let _guard = self.write_lock.lock().await;
        let mut current = self.load_account_entry(account.id()).await?;

        if current.get(&attrs::PASSWORD_LOCKED) {
            return Err(ProvisioningError::InvalidPassword {
                message: "password is locked".to_string(),
            });
        }
        let verified = current
            .get_str(attrs::USER_PASSWORD.name())
            .is_some_and(|stored| verify_password(current_password, stored));
        if !verified {
            return Err(ProvisioningError::auth_failed(
                current.name(),
                "current password does not match",
            ));
        }

        store_password(&mut current, new_password)?;
        touch(&mut current);
        self.save(&current).await?;
        *account.entry_mut() = current;
        Ok(())
    }

    pub async fn check_password_strength(
        &self,
        account: &Account,
        password: &str,
    ) -> ProvisioningResult<()> {
        let current = self.load_account_entry(account.id()).await?;
        PasswordPolicy::from_entry(&current).check(password)
    }

    /// Administrative password reset: no current password, policy still applies.
    pub async fn set_password(
        &self,
        account: &mut Account,
        new_password: &str,
    ) -> ProvisioningResult<()> {
        info!("Setting password of {}", account.name());
        let _guard = self.write_lock.lock().await;
        let mut current = self.load_account_entry(account.id()).await?;
        store_password(&mut current, new_password)?;
        touch(&mut current);
        self.save(&current).await?;
        *account.entry_mut() = current;
        Ok(())
    }

    /// Calendar resources are accounts that also need a display name and a
    /// resource type.
    pub async fn create_calendar_resource(
        &self,
        email: &str,
        password: Option<&str>,
        attrs: AttrChanges,
    ) -> ProvisioningResult<CalendarResource> {
        info!("Creating calendar resource '{}'", email);
        trace!("Calendar resource attributes: {:?}", attrs);
        for required in [attrs::DISPLAY_NAME.name(), attrs::CAL_RES_TYPE.name()] {
            if !attrs.touches(required) {
                return Err(ProvisioningError::invalid_request(format!(
                    "calendar resource requires {}",
                    required
                )));
            }
        }

        let _guard = self.write_lock.lock().await;
        let entry = self
            .insert_account(EntryKind::CalendarResource, email, password, &attrs)
            .await?;
        view(entry)
    }

    pub async fn get_calendar_resource(
        &self,
        by: EntryBy,
    ) -> ProvisioningResult<Option<CalendarResource>> {
        self.lookup(EntryKind::CalendarResource, &by)
            .await?
            .map(view)
            .transpose()
    }

    pub async fn get_all_calendar_resources(
        &self,
        domain: &Domain,
    ) -> ProvisioningResult<Vec<CalendarResource>> {
        views(
            self.lookup_in_domain(EntryKind::CalendarResource, domain.name())
                .await?,
        )
    }

    pub async fn rename_calendar_resource(
        &self,
        resource_id: &str,
        new_name: &str,
    ) -> ProvisioningResult<()> {
        self.rename_addressable(EntryKind::CalendarResource, resource_id, new_name)
            .await
    }

    pub async fn delete_calendar_resource(&self, resource_id: &str) -> ProvisioningResult<()> {
        self.delete_addressable(EntryKind::CalendarResource, resource_id)
            .await
    }

    /// Rename an addressable entry and rewrite list memberships under its
    /// old address.
    pub(super) async fn rename_addressable(
        &self,
        kind: EntryKind,
        id: &str,
        new_name: &str,
    ) -> ProvisioningResult<()> {
        let new_address = self.checked_address(new_name)?;
        info!("Renaming {} {} to {}", kind, id, new_address);

        let _guard = self.write_lock.lock().await;
        let mut entry = self.load_existing(DIRECTORY_SCOPE, kind, id).await?;
        let old_address = entry.name().to_string();
        if old_address == new_address {
            return Ok(());
        }
        self.domain_for_address(&new_address).await?;
        if let Some(owner) = self.address_owner(&new_address).await? {
            if owner.id() != id {
                return Err(ProvisioningError::exists(kind, new_address));
            }
        }

        entry.set_name(new_address.as_str());
        let own = entry.attrs_mut();
        own.insert(attrs::MAIL.name().to_string(), vec![new_address.clone()]);
        if let Some(aliases) = own.get_mut(attrs::MAIL_ALIAS.name()) {
            aliases.retain(|alias| !alias.eq_ignore_ascii_case(&new_address));
            if aliases.is_empty() {
                own.remove(attrs::MAIL_ALIAS.name());
            }
        }
        if is_account_kind(kind) {
            own.insert(
                attrs::UID.name().to_string(),
                vec![local_part(&new_address).to_string()],
            );
            let delivers_to_old = own
                .get(attrs::MAIL_DELIVERY_ADDRESS.name())
                .and_then(|v| v.first())
                .is_some_and(|address| address.eq_ignore_ascii_case(&old_address));
            if delivers_to_old {
                own.insert(
                    attrs::MAIL_DELIVERY_ADDRESS.name().to_string(),
                    vec![new_address.clone()],
                );
            }
        }
        touch(&mut entry);
        self.save(&entry).await?;

        self.rewrite_member(&old_address, Some(&new_address)).await?;
        Ok(())
    }

    /// Delete an addressable entry, its list memberships and, for accounts,
    /// everything stored under it.
    pub(super) async fn delete_addressable(&self, kind: EntryKind, id: &str) -> ProvisioningResult<()> {
        info!("Deleting {} {}", kind, id);
        let _guard = self.write_lock.lock().await;
        let entry = self.load_existing(DIRECTORY_SCOPE, kind, id).await?;

        let mut addresses = vec![entry.name().to_string()];
        addresses.extend(entry.get_multi(attrs::MAIL_ALIAS.name()));
        for address in &addresses {
            self.rewrite_member(address, None).await?;
        }

        if is_account_kind(kind) {
            let removed = self
                .storage
                .clear_scope(entry.id())
                .await
                .map_err(|e| ProvisioningError::storage("clear_scope", e))?;
            debug!("Removed {} entries owned by {}", removed, entry.name());
        }
        self.remove(&entry).await
    }
}
