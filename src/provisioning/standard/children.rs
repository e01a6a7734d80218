//! Data sources and identities.
//!
//! Both live in a storage scope named after the owning account's id, so
//! names only need to be unique per account and deleting the account removes
//! them. Every account also has an implicit `DEFAULT` identity backed by its
//! own attributes.

use super::store::{view, views};
use super::StandardProvisioning;
use crate::entry::{
    attrs, Account, AttrChanges, DataSource, DataSourceType, Entry, EntryKind, Identity,
};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::{EntryBy, ModifyOptions, DEFAULT_IDENTITY_NAME};
use crate::storage::StorageProvider;
use log::{debug, info, trace};

fn is_default_name(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(DEFAULT_IDENTITY_NAME)
}

fn checked_child_name(kind: EntryKind, name: &str) -> ProvisioningResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProvisioningError::invalid_request(format!(
            "{} name cannot be empty",
            kind
        )));
    }
    Ok(name)
}

impl<S: StorageProvider> StandardProvisioning<S> {
    pub async fn create_data_source(
        &self,
        account: &Account,
        source_type: DataSourceType,
        name: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<DataSource> {
        let name = checked_child_name(EntryKind::DataSource, name)?;
        info!(
            "Creating {} data source '{}' for {}",
            source_type,
            name,
            account.name()
        );
        trace!("Data source attributes: {:?}", attrs);

        let _guard = self.write_lock.lock().await;
        let owner = self.load_account_entry(account.id()).await?;
        self.ensure_name_free(owner.id(), EntryKind::DataSource, name)
            .await?;

        let presets = [
            (attrs::DATA_SOURCE_TYPE.name(), source_type.to_string()),
            (attrs::CN.name(), name.to_string()),
        ];
        let base = Self::new_entry(EntryKind::DataSource, name, Some(owner.id()));
        let entry = self.prepare_entry(base, &attrs, &presets).await?;
        self.save(&entry).await?;
        view(entry)
    }

    pub async fn get_data_source(
        &self,
        account: &Account,
        by: EntryBy,
    ) -> ProvisioningResult<Option<DataSource>> {
        let found = self
            .find_child(account.id(), EntryKind::DataSource, &by)
            .await?;
        match found {
            Some(entry) => Ok(Some(view(self.resolve(entry).await?)?)),
            None => Ok(None),
        }
    }

    pub async fn get_all_data_sources(&self, account: &Account) -> ProvisioningResult<Vec<DataSource>> {
        views(self.children(account.id(), EntryKind::DataSource).await?)
    }

    /// Data source changes are checked against immutable attributes.
    pub async fn modify_data_source(
        &self,
        account: &Account,
        data_source_id: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<()> {
        info!(
            "Modifying data source {} of {}",
            data_source_id,
            account.name()
        );
        trace!("Data source changes: {:?}", attrs);
        let _guard = self.write_lock.lock().await;
        let target = self
            .load_existing(account.id(), EntryKind::DataSource, data_source_id)
            .await?;
        self.modify_entry(&target, &attrs, ModifyOptions::checked())
            .await?;
        Ok(())
    }

    pub async fn delete_data_source(
        &self,
        account: &Account,
        data_source_id: &str,
    ) -> ProvisioningResult<()> {
        info!(
            "Deleting data source {} of {}",
            data_source_id,
            account.name()
        );
        let _guard = self.write_lock.lock().await;
        let target = self
            .load_existing(account.id(), EntryKind::DataSource, data_source_id)
            .await?;
        self.remove(&target).await
    }

    pub async fn create_identity(
        &self,
        account: &Account,
        name: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<Identity> {
        let name = checked_child_name(EntryKind::Identity, name)?;
        info!("Creating identity '{}' for {}", name, account.name());
        trace!("Identity attributes: {:?}", attrs);
        if is_default_name(name) {
            return Err(ProvisioningError::exists(EntryKind::Identity, name));
        }

        let _guard = self.write_lock.lock().await;
        let owner = self.load_account_entry(account.id()).await?;
        self.ensure_name_free(owner.id(), EntryKind::Identity, name)
            .await?;

        let base = Self::new_entry(EntryKind::Identity, name, Some(owner.id()));
        let mut entry = self.prepare_entry(base, &attrs, &[]).await?;
        entry.attrs_mut().insert(
            attrs::PREF_IDENTITY_NAME.name().to_string(),
            vec![name.to_string()],
        );
        self.save(&entry).await?;
        view(entry)
    }

    /// `DEFAULT` by name, or the account's own id, selects the default identity.
    pub async fn get_identity(
        &self,
        account: &Account,
        by: EntryBy,
    ) -> ProvisioningResult<Option<Identity>> {
        let selects_default = match &by {
            EntryBy::Name(name) => is_default_name(name),
            EntryBy::Id(id) => id == account.id(),
        };
        if selects_default {
            let owner = self.load_account_entry(account.id()).await?;
            return view(self.default_identity(&owner)).map(Some);
        }

        let found = self
            .find_child(account.id(), EntryKind::Identity, &by)
            .await?;
        match found {
            Some(entry) => Ok(Some(view(self.resolve(entry).await?)?)),
            None => Ok(None),
        }
    }

    /// The default identity first, then the others by name.
    pub async fn get_all_identities(&self, account: &Account) -> ProvisioningResult<Vec<Identity>> {
        let owner = self.load_account_entry(account.id()).await?;
        let mut identities = self.children(owner.id(), EntryKind::Identity).await?;
        identities.sort_by_key(|identity| identity.name().to_lowercase());
        identities.insert(0, self.default_identity(&owner));
        views(identities)
    }

    pub async fn modify_identity(
        &self,
        account: &Account,
        identity_name: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<()> {
        info!(
            "Modifying identity '{}' of {}",
            identity_name,
            account.name()
        );
        trace!("Identity changes: {:?}", attrs);
        let _guard = self.write_lock.lock().await;
        let target = if is_default_name(identity_name) {
            let owner = self.load_account_entry(account.id()).await?;
            self.default_identity(&owner)
        } else {
            self.find_by_name(account.id(), EntryKind::Identity, identity_name.trim())
                .await?
                .ok_or_else(|| ProvisioningError::no_such(EntryKind::Identity, identity_name))?
        };
        self.modify_entry(&target, &attrs, ModifyOptions::default())
            .await?;
        Ok(())
    }

    pub async fn delete_identity(&self, account: &Account, identity_name: &str) -> ProvisioningResult<()> {
        info!(
            "Deleting identity '{}' of {}",
            identity_name,
            account.name()
        );
        if is_default_name(identity_name) {
            return Err(ProvisioningError::invalid_request(
                "the default identity cannot be deleted",
            ));
        }
        let _guard = self.write_lock.lock().await;
        let target = self
            .find_by_name(account.id(), EntryKind::Identity, identity_name.trim())
            .await?
            .ok_or_else(|| ProvisioningError::no_such(EntryKind::Identity, identity_name))?;
        self.remove(&target).await
    }

    async fn find_child(
        &self,
        account_id: &str,
        kind: EntryKind,
        by: &EntryBy,
    ) -> ProvisioningResult<Option<Entry>> {
        debug!("Looking up {} of {} by {:?}", kind, account_id, by);
        match by {
            EntryBy::Id(id) => self.load(account_id, kind, id).await,
            EntryBy::Name(name) => self.find_by_name(account_id, kind, name.trim()).await,
        }
    }

    /// Stored children of `kind` under an account, defaults resolved.
    async fn children(&self, account_id: &str, kind: EntryKind) -> ProvisioningResult<Vec<Entry>> {
        let mut resolved = Vec::new();
        for entry in self.list_entries(account_id, kind).await? {
            resolved.push(self.resolve(entry).await?);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name_matching() {
        assert!(is_default_name("DEFAULT"));
        assert!(is_default_name(" default "));
        assert!(!is_default_name("identity-1"));
    }

    #[test]
    fn test_child_names_are_trimmed() {
        assert_eq!(
            checked_child_name(EntryKind::Identity, "  work ").unwrap(),
            "work"
        );
        assert!(checked_child_name(EntryKind::DataSource, "   ").is_err());
    }
}
