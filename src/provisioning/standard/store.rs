//! Entry persistence, name resolution and the defaults chain.

use super::StandardProvisioning;
use crate::entry::{attrs, value, AttrChanges, AttrMap, Entry, EntryKind, TypedEntry};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::EntryBy;
use crate::schema::is_valid_address;
use crate::storage::{StorageKey, StorageProvider, DIRECTORY_SCOPE};
use chrono::Utc;
use log::{debug, trace, warn};
use std::sync::Arc;

/// Id of the global configuration entry.
pub(crate) const CONFIG_ID: &str = "config";

/// Attributes a class of service or the global config never passes down.
const NOT_INHERITED: [&str; 6] = [
    "id",
    "cn",
    "description",
    "createTimestamp",
    "modifyTimestamp",
    "ace",
];

/// Addresses are written by create, rename, `add_alias` and `remove_alias`
/// only, which keep them unique across the directory.
pub(super) fn reject_address_changes(changes: &AttrChanges) -> ProvisioningResult<()> {
    let managed = [
        attrs::MAIL.name(),
        attrs::MAIL_DELIVERY_ADDRESS.name(),
        attrs::MAIL_ALIAS.name(),
    ];
    match managed.into_iter().find(|name| changes.touches(name)) {
        Some(name) => Err(ProvisioningError::invalid_request(format!(
            "attribute {} is maintained by the directory, use add_alias, remove_alias or rename",
            name
        ))),
        None => Ok(()),
    }
}

/// Storage scope an entry lives in.
pub(super) fn scope_of(entry: &Entry) -> &str {
    entry.parent().unwrap_or(DIRECTORY_SCOPE)
}

fn key_of(entry: &Entry) -> StorageKey {
    StorageKey::new(scope_of(entry), entry.kind().as_str(), entry.id())
}

/// Domain part of an address.
pub(super) fn domain_part(address: &str) -> Option<&str> {
    address.rsplit_once('@').map(|(_, domain)| domain)
}

pub(super) fn local_part(address: &str) -> &str {
    address.split_once('@').map_or(address, |(local, _)| local)
}

/// Convert an entry into a typed view, failing if the kind does not fit.
pub(super) fn view<T: TypedEntry>(entry: Entry) -> ProvisioningResult<T> {
    let kind = entry.kind();
    let id = entry.id().to_string();
    T::from_entry(entry).ok_or_else(|| {
        ProvisioningError::internal(format!("entry {} of kind {} has an unexpected kind", id, kind))
    })
}

pub(super) fn views<T: TypedEntry>(entries: Vec<Entry>) -> ProvisioningResult<Vec<T>> {
    entries.into_iter().map(view).collect()
}

/// Record the current time in `modifyTimestamp`.
pub(super) fn touch(entry: &mut Entry) {
    let now = value::format_generalized_time(&Utc::now());
    entry
        .attrs_mut()
        .insert("modifyTimestamp".to_string(), vec![now]);
}

impl<S: StorageProvider> StandardProvisioning<S> {
    /// A fresh entry with a generated id and creation timestamps.
    pub(super) fn new_entry(kind: EntryKind, name: &str, parent: Option<&str>) -> Entry {
        let id = uuid::Uuid::new_v4().to_string();
        Self::new_entry_with_id(kind, &id, name, parent)
    }

    pub(super) fn new_entry_with_id(
        kind: EntryKind,
        id: &str,
        name: &str,
        parent: Option<&str>,
    ) -> Entry {
        let mut entry = Entry::new(kind, id, name);
        if let Some(parent) = parent {
            entry = entry.with_parent(parent);
        }
        let now = value::format_generalized_time(&Utc::now());
        let attrs = entry.attrs_mut();
        attrs.insert("id".to_string(), vec![id.to_string()]);
        attrs.insert("createTimestamp".to_string(), vec![now.clone()]);
        attrs.insert("modifyTimestamp".to_string(), vec![now]);
        entry
    }

    /// Lower-case an address-style name and qualify a bare one with the
    /// default domain.
    pub(super) fn qualify(&self, name: &str) -> String {
        let name = name.trim().to_lowercase();
        if name.contains('@') {
            name
        } else {
            format!("{}@{}", name, self.config.default_domain.to_lowercase())
        }
    }

    /// Qualify and check an address for a new entry or alias.
    pub(super) fn checked_address(&self, address: &str) -> ProvisioningResult<String> {
        let address = self.qualify(address);
        if !is_valid_address(&address) {
            return Err(ProvisioningError::invalid_request(format!(
                "invalid address: {}",
                address
            )));
        }
        Ok(address)
    }

    pub(super) async fn load(
        &self,
        scope: &str,
        kind: EntryKind,
        id: &str,
    ) -> ProvisioningResult<Option<Entry>> {
        let key = StorageKey::new(scope, kind.as_str(), id);
        let data = self
            .storage
            .get(key)
            .await
            .map_err(|e| ProvisioningError::storage("get", e))?;

        match data {
            Some(data) => {
                let entry: Entry = serde_json::from_value(data).map_err(|e| {
                    ProvisioningError::internal(format!(
                        "Failed to deserialize {} {}: {}",
                        kind, id, e
                    ))
                })?;
                trace!("Entry {} found", id);
                Ok(Some(entry))
            }
            None => {
                debug!("{} {} not found in scope '{}'", kind, id, scope);
                Ok(None)
            }
        }
    }

    /// Load an entry that must exist.
    pub(super) async fn load_existing(
        &self,
        scope: &str,
        kind: EntryKind,
        id: &str,
    ) -> ProvisioningResult<Entry> {
        self.load(scope, kind, id)
            .await?
            .ok_or_else(|| ProvisioningError::no_such(kind, id))
    }

    /// Load a top-level entry of the first of `kinds` that has `id`.
    pub(super) async fn load_any(
        &self,
        kinds: &[EntryKind],
        id: &str,
    ) -> ProvisioningResult<Option<Entry>> {
        for kind in kinds {
            if let Some(entry) = self.load(DIRECTORY_SCOPE, *kind, id).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    pub(super) async fn save(&self, entry: &Entry) -> ProvisioningResult<()> {
        let data = serde_json::to_value(entry).map_err(|e| {
            ProvisioningError::internal(format!("Failed to serialize {}: {}", entry.id(), e))
        })?;
        self.storage
            .put(key_of(entry), data)
            .await
            .map_err(|e| ProvisioningError::storage("put", e))?;
        Ok(())
    }

    pub(super) async fn remove(&self, entry: &Entry) -> ProvisioningResult<()> {
        let existed = self
            .storage
            .delete(key_of(entry))
            .await
            .map_err(|e| ProvisioningError::storage("delete", e))?;
        if !existed {
            return Err(ProvisioningError::no_such(entry.kind(), entry.id()));
        }
        Ok(())
    }

    fn decode_all(&self, documents: Vec<(StorageKey, serde_json::Value)>) -> Vec<Entry> {
        documents
            .into_iter()
            .filter_map(|(key, data)| match serde_json::from_value::<Entry>(data) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping undecodable entry {}: {}", key, e);
                    None
                }
            })
            .collect()
    }

    /// Every stored entry of `kind` in `scope`, ordered by id.
    pub(super) async fn list_entries(
        &self,
        scope: &str,
        kind: EntryKind,
    ) -> ProvisioningResult<Vec<Entry>> {
        let documents = self
            .storage
            .list(StorageKey::prefix(scope, kind.as_str()), 0, usize::MAX)
            .await
            .map_err(|e| ProvisioningError::storage("list", e))?;
        Ok(self.decode_all(documents))
    }

    /// Entries of `kind` in `scope` whose document matches `path == value`.
    pub(super) async fn find_entries(
        &self,
        scope: &str,
        kind: EntryKind,
        path: &str,
        value: &str,
    ) -> ProvisioningResult<Vec<Entry>> {
        let documents = self
            .storage
            .find_by_attribute(StorageKey::prefix(scope, kind.as_str()), path, value)
            .await
            .map_err(|e| ProvisioningError::storage("find", e))?;
        Ok(self.decode_all(documents))
    }

    pub(super) async fn find_by_name(
        &self,
        scope: &str,
        kind: EntryKind,
        name: &str,
    ) -> ProvisioningResult<Option<Entry>> {
        Ok(self
            .find_entries(scope, kind, "name", name)
            .await?
            .into_iter()
            .next())
    }

    /// Entry of `kind` whose primary address or alias is `address`.
    pub(super) async fn find_by_address(
        &self,
        kind: EntryKind,
        address: &str,
    ) -> ProvisioningResult<Option<Entry>> {
        if let Some(entry) = self.find_by_name(DIRECTORY_SCOPE, kind, address).await? {
            return Ok(Some(entry));
        }
        Ok(self
            .find_entries(DIRECTORY_SCOPE, kind, "attrs.mailAlias", address)
            .await?
            .into_iter()
            .next())
    }

    /// The addressable entry that owns `address`, if any.
    pub(super) async fn address_owner(&self, address: &str) -> ProvisioningResult<Option<Entry>> {
        for kind in EntryKind::ADDRESSABLE {
            if let Some(entry) = self.find_by_address(kind, address).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Fail with `EntryExists` if any addressable entry uses `address`.
    pub(super) async fn ensure_address_free(
        &self,
        kind: EntryKind,
        address: &str,
    ) -> ProvisioningResult<()> {
        if let Some(owner) = self.address_owner(address).await? {
            debug!("Address {} already used by {} {}", address, owner.kind(), owner.id());
            return Err(ProvisioningError::exists(kind, address));
        }
        Ok(())
    }

    /// Fail with `EntryExists` if `scope` already holds a `kind` named `name`.
    pub(super) async fn ensure_name_free(
        &self,
        scope: &str,
        kind: EntryKind,
        name: &str,
    ) -> ProvisioningResult<()> {
        if self.find_by_name(scope, kind, name).await?.is_some() {
            return Err(ProvisioningError::exists(kind, name));
        }
        Ok(())
    }

    /// The domain an address belongs to, which must exist.
    pub(super) async fn domain_for_address(&self, address: &str) -> ProvisioningResult<Entry> {
        let domain = domain_part(address).ok_or_else(|| {
            ProvisioningError::invalid_request(format!("address {} has no domain", address))
        })?;
        self.find_by_name(DIRECTORY_SCOPE, EntryKind::Domain, domain)
            .await?
            .ok_or_else(|| ProvisioningError::no_such(EntryKind::Domain, domain))
    }

    /// Look up a top-level entry and resolve its defaults.
    pub(super) async fn lookup(
        &self,
        kind: EntryKind,
        by: &EntryBy,
    ) -> ProvisioningResult<Option<Entry>> {
        debug!("Looking up {} by {:?}", kind, by);
        let found = match by {
            EntryBy::Id(id) => self.load(DIRECTORY_SCOPE, kind, id).await?,
            EntryBy::Name(name) if kind.is_addressable() => {
                self.find_by_address(kind, &self.qualify(name)).await?
            }
            EntryBy::Name(name) => self.find_by_name(DIRECTORY_SCOPE, kind, name).await?,
        };
        match found {
            Some(entry) => Ok(Some(self.resolve(entry).await?)),
            None => Ok(None),
        }
    }

    /// Every top-level entry of `kind`, defaults resolved.
    pub(super) async fn lookup_all(&self, kind: EntryKind) -> ProvisioningResult<Vec<Entry>> {
        let mut resolved = Vec::new();
        for entry in self.list_entries(DIRECTORY_SCOPE, kind).await? {
            resolved.push(self.resolve(entry).await?);
        }
        Ok(resolved)
    }

    /// Addressable entries of `kind` in `domain`, defaults resolved.
    pub(super) async fn lookup_in_domain(
        &self,
        kind: EntryKind,
        domain: &str,
    ) -> ProvisioningResult<Vec<Entry>> {
        let mut resolved = Vec::new();
        for entry in self.list_entries(DIRECTORY_SCOPE, kind).await? {
            if domain_part(entry.name()).is_some_and(|d| d.eq_ignore_ascii_case(domain)) {
                resolved.push(self.resolve(entry).await?);
            }
        }
        Ok(resolved)
    }

    /// Attach the resolved defaults chain.
    pub(super) async fn resolve(&self, mut entry: Entry) -> ProvisioningResult<Entry> {
        let defaults = self.defaults_for(&entry).await?;
        entry.set_defaults(defaults);
        Ok(entry)
    }

    /// Schema defaults overlaid with the inherited entry (cos or config).
    pub(super) async fn defaults_for(&self, entry: &Entry) -> ProvisioningResult<Arc<AttrMap>> {
        let kind = entry.kind();
        let mut defaults = self.registry.defaults_for(kind);

        let inherited = match kind {
            EntryKind::Account | EntryKind::CalendarResource => self.cos_of(entry).await?,
            EntryKind::Domain | EntryKind::Server => {
                self.load(DIRECTORY_SCOPE, EntryKind::Config, CONFIG_ID)
                    .await?
            }
            _ => None,
        };

        if let Some(source) = inherited {
            for (name, values) in source.attrs() {
                if values.is_empty() || NOT_INHERITED.contains(&name.as_str()) {
                    continue;
                }
                if self
                    .registry
                    .get(name)
                    .is_some_and(|definition| definition.applies_to(kind))
                {
                    defaults.insert(name.clone(), values.clone());
                }
            }
        }

        Ok(Arc::new(defaults))
    }

    /// Class of service of an account: its own `cosId`, else its domain's
    /// `domainDefaultCosId`, else the default cos.
    async fn cos_of(&self, account: &Entry) -> ProvisioningResult<Option<Entry>> {
        if let Some(cos_id) = account.attrs().get("cosId").and_then(|v| v.first()) {
            if let Some(cos) = self.load(DIRECTORY_SCOPE, EntryKind::Cos, cos_id).await? {
                return Ok(Some(cos));
            }
            warn!("Account {} references missing cos {}", account.id(), cos_id);
        }

        if let Some(domain_name) = domain_part(account.name()) {
            let domain = self
                .find_by_name(DIRECTORY_SCOPE, EntryKind::Domain, domain_name)
                .await?;
            let default_cos_id = domain
                .as_ref()
                .and_then(|d| d.attrs().get("domainDefaultCosId"))
                .and_then(|v| v.first());
            if let Some(cos_id) = default_cos_id {
                if let Some(cos) = self.load(DIRECTORY_SCOPE, EntryKind::Cos, cos_id).await? {
                    return Ok(Some(cos));
                }
            }
        }

        self.find_by_name(DIRECTORY_SCOPE, EntryKind::Cos, &self.config.default_cos_name)
            .await
    }
}
