//! Standard provisioning engine over a pluggable storage backend.
//!
//! [`StandardProvisioning`] keeps every directory rule in one place: schema
//! validation of attribute changes, address uniqueness, the defaults chain,
//! attribute callbacks, list membership and cascading deletes. The storage
//! backend only stores JSON documents.
//!
//! # Features
//!
//! * Idempotent bootstrap of the global config, default cos, local server,
//!   default domain, administrators and system rights
//! * Address uniqueness across accounts, calendar resources, lists and
//!   groups, aliases included
//! * Renames that rewrite list memberships
//! * Account children (data sources, identities) stored in a scope owned by
//!   the account and removed with it
//!
//! # Example Usage
//!
//! ```rust
//! use dirprov::config::ProvisioningConfig;
//! use dirprov::entry::AttrChanges;
//! use dirprov::provisioning::{EntryBy, Provisioning, StandardProvisioning};
//! use dirprov::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProvisioningConfig::builder()
//!     .with_default_domain("corp.example.test")
//!     .build()?;
//! let prov = StandardProvisioning::new(InMemoryStorage::new(), config).await?;
//!
//! let cos = prov.create_cos("gold", AttrChanges::new()).await?;
//! let found = prov.get_cos(EntryBy::name("gold")).await?;
//! assert_eq!(found.map(|c| c.id().to_string()), Some(cos.id().to_string()));
//! # Ok(())
//! # }
//! ```

mod accounts;
mod callbacks;
mod children;
mod directory;
mod groups;
mod modify;
mod search;
mod store;

use crate::auth::AuthProtocol;
use crate::config::ProvisioningConfig;
use crate::entry::{
    attrs, Account, AccountStatus, Attr, AttrChanges, AttrType, CalendarResource, Config, Cos,
    DataSource, DataSourceType, DistributionList, Domain, DynamicGroup, Entry, EntryKind,
    Identity, Right, Server, ShareLocator, TypedEntry, UcService, Zimlet,
};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::filter::EntrySearchFilter;
use crate::provisioning::{
    AccountBy, DistributionListMembership, EntryBy, GalSearchType, MimeTypeInfo, ModifyOptions,
    Provisioning, SearchGalResult, SearchOptions, SearchParams,
};
use crate::schema::AttributeRegistry;
use crate::storage::{StorageProvider, ADMIN_SCOPE, DIRECTORY_SCOPE};
use callbacks::run_callbacks;
use log::info;
use std::collections::HashSet;
use store::{reject_address_changes, CONFIG_ID};
use tokio::sync::Mutex;

/// System rights seeded at bootstrap: name, type, target types, covered
/// attributes or rights, description.
const SYSTEM_RIGHTS: &[(&str, &str, &[&str], &[&str], &str)] = &[
    (
        "adminLoginAs",
        "preset",
        &["account", "calresource"],
        &[],
        "log in as another account",
    ),
    ("createAccount", "preset", &["domain"], &[], "create accounts in a domain"),
    ("deleteAccount", "preset", &["account"], &[], "delete an account"),
    ("renameAccount", "preset", &["account"], &[], "rename an account"),
    (
        "addDistributionListMember",
        "preset",
        &["dl"],
        &[],
        "add members to a distribution list",
    ),
    (
        "getAccountInfo",
        "getAttrs",
        &["account"],
        &["displayName", "mail", "accountStatus", "cosId"],
        "read basic account information",
    ),
    (
        "modifyAccount",
        "setAttrs",
        &["account"],
        &["displayName", "givenName", "sn", "accountStatus"],
        "modify basic account attributes",
    ),
    (
        "domainAdminRights",
        "combo",
        &["domain"],
        &["createAccount", "deleteAccount", "renameAccount", "getAccountInfo", "modifyAccount"],
        "rights of a domain administrator",
    ),
];

/// Provisioning engine over a [`StorageProvider`].
pub struct StandardProvisioning<S: StorageProvider> {
    storage: S,
    config: ProvisioningConfig,
    registry: AttributeRegistry,
    /// Serialises compound writes (uniqueness check + put, rename + member rewrite).
    write_lock: Mutex<()>,
}

impl<S: StorageProvider> std::fmt::Debug for StandardProvisioning<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardProvisioning")
            .field("config", &self.config)
            .field("attributes", &self.registry.len())
            .finish()
    }
}

impl<S: StorageProvider> StandardProvisioning<S> {
    /// Create the engine and bootstrap the directory.
    ///
    /// Bootstrapping is idempotent: entries that already exist are kept.
    pub async fn new(storage: S, config: ProvisioningConfig) -> ProvisioningResult<Self> {
        config.validate()?;
        let registry = AttributeRegistry::with_embedded_schema()
            .map_err(|e| ProvisioningError::internal(format!("attribute schema: {}", e)))?;

        let provisioning = Self {
            storage,
            config,
            registry,
            write_lock: Mutex::new(()),
        };
        provisioning.bootstrap().await?;
        Ok(provisioning)
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn bootstrap(&self) -> ProvisioningResult<()> {
        let _guard = self.write_lock.lock().await;

        if self
            .load(DIRECTORY_SCOPE, EntryKind::Config, CONFIG_ID)
            .await?
            .is_none()
        {
            let mut changes = AttrChanges::new();
            changes
                .set(&attrs::DEFAULT_DOMAIN_NAME, self.config.default_domain.as_str())
                .set(
                    &attrs::GAL_MAX_RESULTS,
                    i32::try_from(self.config.gal_max_results).unwrap_or(i32::MAX),
                );
            let base = Self::new_entry_with_id(EntryKind::Config, CONFIG_ID, CONFIG_ID, None);
            let config = self.prepare_entry(base, &changes, &[]).await?;
            self.save(&config).await?;
            info!("Bootstrapped global config");
        }

        let cos_name = self.config.default_cos_name.clone();
        if self
            .find_by_name(DIRECTORY_SCOPE, EntryKind::Cos, &cos_name)
            .await?
            .is_none()
        {
            self.insert_named(EntryKind::Cos, &cos_name, &AttrChanges::new(), &[])
                .await?;
            info!("Bootstrapped default cos '{}'", cos_name);
        }

        let server_name = self.config.local_server_name.clone();
        if self
            .find_by_name(DIRECTORY_SCOPE, EntryKind::Server, &server_name)
            .await?
            .is_none()
        {
            let mut changes = AttrChanges::new();
            changes
                .set_multi(attrs::SERVICE_ENABLED, self.config.local_server_services.clone())
                .set_multi(attrs::SERVICE_INSTALLED, self.config.local_server_services.clone());
            self.insert_named(
                EntryKind::Server,
                &server_name,
                &changes,
                &[(attrs::SERVICE_HOSTNAME.name(), server_name.clone())],
            )
            .await?;
            info!("Bootstrapped local server '{}'", server_name);
        }

        let domain_name = self.config.default_domain.to_lowercase();
        if self
            .find_by_name(DIRECTORY_SCOPE, EntryKind::Domain, &domain_name)
            .await?
            .is_none()
        {
            self.insert_named(EntryKind::Domain, &domain_name, &AttrChanges::new(), &[])
                .await?;
            info!("Bootstrapped default domain '{}'", domain_name);
        }

        let admin_address = self.qualify(&self.config.admin_name);
        if self.address_owner(&admin_address).await?.is_none() {
            let mut changes = AttrChanges::new();
            changes.set(&attrs::IS_ADMIN_ACCOUNT, true);
            self.insert_account(
                EntryKind::Account,
                &admin_address,
                Some(&self.config.admin_password),
                &changes,
            )
            .await?;
            info!("Bootstrapped global admin '{}'", admin_address);
        }

        let system_admin = self.config.system_admin_name.to_lowercase();
        if self
            .find_by_name(ADMIN_SCOPE, EntryKind::Account, &system_admin)
            .await?
            .is_none()
        {
            let mut changes = AttrChanges::new();
            changes
                .set(&attrs::IS_ADMIN_ACCOUNT, true)
                .set(&attrs::UID, system_admin.as_str());
            let base = Self::new_entry(EntryKind::Account, &system_admin, Some(ADMIN_SCOPE));
            let mut entry = self
                .prepare_entry(
                    base,
                    &changes,
                    &[(attrs::ACCOUNT_STATUS.name(), AccountStatus::Active.to_string())],
                )
                .await?;
            accounts::store_password(&mut entry, &self.config.admin_password)?;
            self.save(&entry).await?;
            info!("Bootstrapped system admin '{}'", system_admin);
        }

        for (name, right_type, targets, covered, description) in SYSTEM_RIGHTS {
            if self
                .find_by_name(DIRECTORY_SCOPE, EntryKind::Right, name)
                .await?
                .is_some()
            {
                continue;
            }
            let covered_attr = if *right_type == "combo" {
                attrs::RIGHT_RIGHTS.name()
            } else {
                attrs::RIGHT_ATTRS.name()
            };
            let mut changes = AttrChanges::new();
            changes
                .set_str(attrs::RIGHT_TYPE, *right_type)
                .set_multi(attrs::RIGHT_TARGET_TYPE, targets.iter().copied())
                .set_str(attrs::DESCRIPTION, *description);
            if !covered.is_empty() {
                changes.set_multi(covered_attr, covered.iter().copied());
            }
            self.insert_named(EntryKind::Right, name, &changes, &[]).await?;
        }

        Ok(())
    }

    /// Build a new entry from caller attributes plus engine presets.
    ///
    /// Presets only fill attributes the caller did not set. Callbacks of
    /// every attribute on the entry run. Nothing is stored.
    pub(super) async fn prepare_entry(
        &self,
        mut entry: Entry,
        changes: &AttrChanges,
        presets: &[(&str, String)],
    ) -> ProvisioningResult<Entry> {
        if changes.touches("id") {
            return Err(ProvisioningError::invalid_request(
                "attribute id is assigned by the directory",
            ));
        }
        reject_address_changes(changes)?;
        let validated = self
            .registry
            .validate_changes(entry.kind(), changes, false)?;
        entry.apply(&validated);
        for (name, value) in presets {
            entry
                .attrs_mut()
                .entry(name.to_string())
                .or_insert_with(|| vec![value.clone()]);
        }

        entry.set_defaults(self.defaults_for(&entry).await?);
        let present: Vec<String> = entry.attrs().keys().cloned().collect();
        run_callbacks(
            &self.registry,
            present.iter().map(String::as_str),
            &mut entry,
        )?;
        Ok(entry)
    }

    /// Create and store a top-level entry with a plain unique name. The
    /// caller holds the write lock.
    pub(super) async fn insert_named(
        &self,
        kind: EntryKind,
        name: &str,
        changes: &AttrChanges,
        presets: &[(&str, String)],
    ) -> ProvisioningResult<Entry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProvisioningError::invalid_request(format!(
                "{} name cannot be empty",
                kind
            )));
        }
        self.ensure_name_free(DIRECTORY_SCOPE, kind, name).await?;

        let mut presets = presets.to_vec();
        presets.push((attrs::CN.name(), name.to_string()));
        let entry = self
            .prepare_entry(Self::new_entry(kind, name, None), changes, &presets)
            .await?;
        self.save(&entry).await?;
        Ok(entry)
    }

    /// Delete a top-level entry of `kind` by id.
    pub(super) async fn delete_top_level(
        &self,
        kind: EntryKind,
        id: &str,
    ) -> ProvisioningResult<Entry> {
        let entry = self.load_existing(DIRECTORY_SCOPE, kind, id).await?;
        self.remove(&entry).await?;
        Ok(entry)
    }
}

impl<S: StorageProvider> Provisioning for StandardProvisioning<S> {
    async fn health_check(&self) -> ProvisioningResult<()> {
        StandardProvisioning::health_check(self).await
    }

    async fn get_config(&self) -> ProvisioningResult<Config> {
        StandardProvisioning::get_config(self).await
    }

    async fn create_cos(&self, name: &str, attrs: AttrChanges) -> ProvisioningResult<Cos> {
        StandardProvisioning::create_cos(self, name, attrs).await
    }

    async fn get_cos(&self, by: EntryBy) -> ProvisioningResult<Option<Cos>> {
        StandardProvisioning::get_cos(self, by).await
    }

    async fn get_all_cos(&self) -> ProvisioningResult<Vec<Cos>> {
        StandardProvisioning::get_all_cos(self).await
    }

    async fn rename_cos(&self, cos_id: &str, new_name: &str) -> ProvisioningResult<()> {
        StandardProvisioning::rename_cos(self, cos_id, new_name).await
    }

    async fn delete_cos(&self, cos_id: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_cos(self, cos_id).await
    }

    async fn create_domain(&self, name: &str, attrs: AttrChanges) -> ProvisioningResult<Domain> {
        StandardProvisioning::create_domain(self, name, attrs).await
    }

    async fn get_domain(&self, by: EntryBy) -> ProvisioningResult<Option<Domain>> {
        StandardProvisioning::get_domain(self, by).await
    }

    async fn get_all_domains(&self) -> ProvisioningResult<Vec<Domain>> {
        StandardProvisioning::get_all_domains(self).await
    }

    async fn delete_domain(&self, domain_id: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_domain(self, domain_id).await
    }

    async fn get_mime_types(&self, mime_type: &str) -> ProvisioningResult<Vec<MimeTypeInfo>> {
        StandardProvisioning::get_mime_types(self, mime_type).await
    }

    async fn get_mime_types_by_extension(
        &self,
        extension: &str,
    ) -> ProvisioningResult<Vec<MimeTypeInfo>> {
        StandardProvisioning::get_mime_types_by_extension(self, extension).await
    }

    async fn create_server(&self, name: &str, attrs: AttrChanges) -> ProvisioningResult<Server> {
        StandardProvisioning::create_server(self, name, attrs).await
    }

    async fn get_server(&self, by: EntryBy) -> ProvisioningResult<Option<Server>> {
        StandardProvisioning::get_server(self, by).await
    }

    async fn get_local_server(&self) -> ProvisioningResult<Server> {
        StandardProvisioning::get_local_server(self).await
    }

    async fn get_all_servers(&self, service: Option<&str>) -> ProvisioningResult<Vec<Server>> {
        StandardProvisioning::get_all_servers(self, service).await
    }

    async fn delete_server(&self, server_id: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_server(self, server_id).await
    }

    async fn create_zimlet(&self, name: &str, attrs: AttrChanges) -> ProvisioningResult<Zimlet> {
        StandardProvisioning::create_zimlet(self, name, attrs).await
    }

    async fn get_zimlet(&self, name: &str) -> ProvisioningResult<Option<Zimlet>> {
        StandardProvisioning::get_zimlet(self, name).await
    }

    async fn list_all_zimlets(&self) -> ProvisioningResult<Vec<Zimlet>> {
        StandardProvisioning::list_all_zimlets(self).await
    }

    async fn get_object_types(&self) -> ProvisioningResult<Vec<Zimlet>> {
        StandardProvisioning::get_object_types(self).await
    }

    async fn delete_zimlet(&self, name: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_zimlet(self, name).await
    }

    async fn create_account(
        &self,
        email: &str,
        password: Option<&str>,
        attrs: AttrChanges,
    ) -> ProvisioningResult<Account> {
        StandardProvisioning::create_account(self, email, password, attrs).await
    }

    async fn get_account(&self, by: AccountBy) -> ProvisioningResult<Option<Account>> {
        StandardProvisioning::get_account(self, by).await
    }

    async fn get_all_accounts(&self, domain: &Domain) -> ProvisioningResult<Vec<Account>> {
        StandardProvisioning::get_all_accounts(self, domain).await
    }

    async fn get_all_admin_accounts(&self) -> ProvisioningResult<Vec<Account>> {
        StandardProvisioning::get_all_admin_accounts(self).await
    }

    async fn rename_account(&self, account_id: &str, new_name: &str) -> ProvisioningResult<()> {
        StandardProvisioning::rename_account(self, account_id, new_name).await
    }

    async fn delete_account(&self, account_id: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_account(self, account_id).await
    }

    async fn modify_account_status(
        &self,
        account: &mut Account,
        status: AccountStatus,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::modify_account_status(self, account, status).await
    }

    async fn set_cos(&self, account: &mut Account, cos: &Cos) -> ProvisioningResult<()> {
        StandardProvisioning::set_cos(self, account, cos).await
    }

    async fn add_alias<E: TypedEntry>(&self, entry: &mut E, alias: &str) -> ProvisioningResult<()> {
        StandardProvisioning::add_alias(self, entry, alias).await
    }

    async fn remove_alias<E: TypedEntry>(
        &self,
        entry: &mut E,
        alias: &str,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::remove_alias(self, entry, alias).await
    }

    async fn auth_account(
        &self,
        account: &Account,
        password: &str,
        protocol: AuthProtocol,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::auth_account(self, account, password, protocol).await
    }

    async fn pre_auth_account(
        &self,
        account: &Account,
        account_name: &str,
        account_by: &str,
        timestamp: i64,
        expires: i64,
        preauth: &str,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::pre_auth_account(
            self,
            account,
            account_name,
            account_by,
            timestamp,
            expires,
            preauth,
        )
        .await
    }

    async fn change_password(
        &self,
        account: &mut Account,
        current_password: &str,
        new_password: &str,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::change_password(self, account, current_password, new_password).await
    }

    async fn check_password_strength(
        &self,
        account: &Account,
        password: &str,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::check_password_strength(self, account, password).await
    }

    async fn set_password(&self, account: &mut Account, new_password: &str) -> ProvisioningResult<()> {
        StandardProvisioning::set_password(self, account, new_password).await
    }

    async fn create_calendar_resource(
        &self,
        email: &str,
        password: Option<&str>,
        attrs: AttrChanges,
    ) -> ProvisioningResult<CalendarResource> {
        StandardProvisioning::create_calendar_resource(self, email, password, attrs).await
    }

    async fn get_calendar_resource(
        &self,
        by: EntryBy,
    ) -> ProvisioningResult<Option<CalendarResource>> {
        StandardProvisioning::get_calendar_resource(self, by).await
    }

    async fn get_all_calendar_resources(
        &self,
        domain: &Domain,
    ) -> ProvisioningResult<Vec<CalendarResource>> {
        StandardProvisioning::get_all_calendar_resources(self, domain).await
    }

    async fn rename_calendar_resource(
        &self,
        resource_id: &str,
        new_name: &str,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::rename_calendar_resource(self, resource_id, new_name).await
    }

    async fn delete_calendar_resource(&self, resource_id: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_calendar_resource(self, resource_id).await
    }

    async fn create_distribution_list(
        &self,
        email: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<DistributionList> {
        StandardProvisioning::create_distribution_list(self, email, attrs).await
    }

    async fn get_distribution_list(
        &self,
        by: EntryBy,
    ) -> ProvisioningResult<Option<DistributionList>> {
        StandardProvisioning::get_distribution_list(self, by).await
    }

    async fn get_all_distribution_lists(
        &self,
        domain: &Domain,
    ) -> ProvisioningResult<Vec<DistributionList>> {
        StandardProvisioning::get_all_distribution_lists(self, domain).await
    }

    async fn add_members(
        &self,
        list: &mut DistributionList,
        members: &[&str],
    ) -> ProvisioningResult<()> {
        StandardProvisioning::add_members(self, list, members).await
    }

    async fn remove_members(
        &self,
        list: &mut DistributionList,
        members: &[&str],
    ) -> ProvisioningResult<()> {
        StandardProvisioning::remove_members(self, list, members).await
    }

    async fn get_distribution_list_ids(
        &self,
        account: &Account,
    ) -> ProvisioningResult<HashSet<String>> {
        StandardProvisioning::get_distribution_list_ids(self, account).await
    }

    async fn get_distribution_lists(
        &self,
        account: &Account,
        direct_only: bool,
    ) -> ProvisioningResult<DistributionListMembership<DistributionList>> {
        StandardProvisioning::get_distribution_lists(self, account, direct_only).await
    }

    async fn in_distribution_list(
        &self,
        account: &Account,
        list_id: &str,
    ) -> ProvisioningResult<bool> {
        StandardProvisioning::in_distribution_list(self, account, list_id).await
    }

    async fn rename_distribution_list(
        &self,
        list_id: &str,
        new_name: &str,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::rename_distribution_list(self, list_id, new_name).await
    }

    async fn delete_distribution_list(&self, list_id: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_distribution_list(self, list_id).await
    }

    async fn create_dynamic_group(
        &self,
        email: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<DynamicGroup> {
        StandardProvisioning::create_dynamic_group(self, email, attrs).await
    }

    async fn get_dynamic_group(&self, by: EntryBy) -> ProvisioningResult<Option<DynamicGroup>> {
        StandardProvisioning::get_dynamic_group(self, by).await
    }

    async fn get_dynamic_group_members(
        &self,
        group: &DynamicGroup,
    ) -> ProvisioningResult<Vec<Account>> {
        StandardProvisioning::get_dynamic_group_members(self, group).await
    }

    async fn delete_dynamic_group(&self, group_id: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_dynamic_group(self, group_id).await
    }

    async fn create_data_source(
        &self,
        account: &Account,
        source_type: DataSourceType,
        name: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<DataSource> {
        StandardProvisioning::create_data_source(self, account, source_type, name, attrs).await
    }

    async fn get_data_source(
        &self,
        account: &Account,
        by: EntryBy,
    ) -> ProvisioningResult<Option<DataSource>> {
        StandardProvisioning::get_data_source(self, account, by).await
    }

    async fn get_all_data_sources(&self, account: &Account) -> ProvisioningResult<Vec<DataSource>> {
        StandardProvisioning::get_all_data_sources(self, account).await
    }

    async fn modify_data_source(
        &self,
        account: &Account,
        data_source_id: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::modify_data_source(self, account, data_source_id, attrs).await
    }

    async fn delete_data_source(
        &self,
        account: &Account,
        data_source_id: &str,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::delete_data_source(self, account, data_source_id).await
    }

    async fn create_identity(
        &self,
        account: &Account,
        name: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<Identity> {
        StandardProvisioning::create_identity(self, account, name, attrs).await
    }

    async fn get_identity(
        &self,
        account: &Account,
        by: EntryBy,
    ) -> ProvisioningResult<Option<Identity>> {
        StandardProvisioning::get_identity(self, account, by).await
    }

    async fn get_all_identities(&self, account: &Account) -> ProvisioningResult<Vec<Identity>> {
        StandardProvisioning::get_all_identities(self, account).await
    }

    async fn modify_identity(
        &self,
        account: &Account,
        identity_name: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::modify_identity(self, account, identity_name, attrs).await
    }

    async fn delete_identity(&self, account: &Account, identity_name: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_identity(self, account, identity_name).await
    }

    async fn create_uc_service(&self, name: &str, attrs: AttrChanges) -> ProvisioningResult<UcService> {
        StandardProvisioning::create_uc_service(self, name, attrs).await
    }

    async fn get_uc_service(&self, by: EntryBy) -> ProvisioningResult<Option<UcService>> {
        StandardProvisioning::get_uc_service(self, by).await
    }

    async fn get_all_uc_services(&self) -> ProvisioningResult<Vec<UcService>> {
        StandardProvisioning::get_all_uc_services(self).await
    }

    async fn delete_uc_service(&self, service_id: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_uc_service(self, service_id).await
    }

    async fn create_share_locator(
        &self,
        id: &str,
        owner_account_id: &str,
    ) -> ProvisioningResult<ShareLocator> {
        StandardProvisioning::create_share_locator(self, id, owner_account_id).await
    }

    async fn get_share_locator(&self, id: &str) -> ProvisioningResult<Option<ShareLocator>> {
        StandardProvisioning::get_share_locator(self, id).await
    }

    async fn delete_share_locator(&self, id: &str) -> ProvisioningResult<()> {
        StandardProvisioning::delete_share_locator(self, id).await
    }

    async fn get_right(&self, name: &str) -> ProvisioningResult<Option<Right>> {
        StandardProvisioning::get_right(self, name).await
    }

    async fn get_all_rights(&self) -> ProvisioningResult<Vec<Right>> {
        StandardProvisioning::get_all_rights(self).await
    }

    async fn modify_attrs<E: TypedEntry>(
        &self,
        entry: &mut E,
        changes: &AttrChanges,
        options: ModifyOptions,
    ) -> ProvisioningResult<()> {
        StandardProvisioning::modify_attrs(self, entry, changes, options).await
    }

    async fn reload<E: TypedEntry>(&self, entry: &mut E) -> ProvisioningResult<()> {
        StandardProvisioning::reload(self, entry).await
    }

    async fn auto_complete_gal(
        &self,
        domain: &Domain,
        query: &str,
        search_type: GalSearchType,
        limit: usize,
    ) -> ProvisioningResult<SearchGalResult> {
        StandardProvisioning::auto_complete_gal(self, domain, query, search_type, limit).await
    }

    async fn search_gal(
        &self,
        domain: &Domain,
        query: &str,
        search_type: GalSearchType,
        token: Option<&str>,
    ) -> ProvisioningResult<SearchGalResult> {
        StandardProvisioning::search_gal(self, domain, query, search_type, token).await
    }

    async fn search_accounts(
        &self,
        filter: &str,
        params: &SearchParams,
    ) -> ProvisioningResult<Vec<Account>> {
        StandardProvisioning::search_accounts(self, filter, params).await
    }

    async fn search_calendar_resources(
        &self,
        filter: &EntrySearchFilter,
        params: &SearchParams,
    ) -> ProvisioningResult<Vec<CalendarResource>> {
        StandardProvisioning::search_calendar_resources(self, filter, params).await
    }

    async fn search_directory(&self, options: &SearchOptions) -> ProvisioningResult<Vec<Entry>> {
        StandardProvisioning::search_directory(self, options).await
    }
}

/// Typed set-then-modify helper shared by the named account operations.
pub(super) fn single_change<T: AttrType>(attr: &Attr<T>, value: impl Into<T>) -> AttrChanges {
    let mut changes = AttrChanges::new();
    changes.set(attr, value);
    changes
}
