//! The provisioning API and its storage-backed implementation.
//!
//! [`Provisioning`] is the directory's whole surface: create, look up, rename,
//! modify and delete every kind of entry, manage aliases and list membership,
//! authenticate accounts, and search. [`StandardProvisioning`] implements it
//! over any [`crate::storage::StorageProvider`].
//!
//! # Example Usage
//!
//! ```rust
//! use dirprov::config::ProvisioningConfig;
//! use dirprov::entry::{attrs, AttrChanges};
//! use dirprov::provisioning::{AccountBy, Provisioning, StandardProvisioning};
//! use dirprov::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let prov = StandardProvisioning::new(InMemoryStorage::new(), ProvisioningConfig::default()).await?;
//!
//! let mut attrs = AttrChanges::new();
//! attrs.set(&attrs::DISPLAY_NAME, "Phoebe Shao");
//! let account = prov.create_account("phoebe@example.test", Some("test123"), attrs).await?;
//!
//! let found = prov.get_account(AccountBy::name("phoebe")).await?;
//! assert_eq!(found.map(|a| a.id().to_string()), Some(account.id().to_string()));
//! # Ok(())
//! # }
//! ```

mod mime;
pub mod standard;
mod types;

pub use mime::{builtin_mime_types, MimeTypeInfo};
pub use standard::StandardProvisioning;
pub use types::{
    AccountBy, DistributionListMembership, EntryBy, EntryTypes, GalContact, GalSearchType,
    ModifyOptions, SearchGalResult, SearchOptions, SearchParams, DEFAULT_IDENTITY_NAME,
};

use crate::auth::AuthProtocol;
use crate::entry::{
    Account, AccountStatus, Attr, AttrChanges, AttrType, CalendarResource, Config, Cos, DataSource,
    DataSourceType, DistributionList, Domain, DynamicGroup, Entry, Identity, Right, Server,
    ShareLocator, TypedEntry, UcService, Zimlet,
};
use crate::error::ProvisioningResult;
use crate::filter::EntrySearchFilter;
use std::collections::HashSet;
use std::future::Future;

/// Directory provisioning operations.
///
/// Lookups return `Ok(None)` when nothing matches; mutations of a missing
/// entry fail with `NoSuchEntry`. Operations that change an entry passed by
/// `&mut` refresh it in place.
pub trait Provisioning: Send + Sync {
    /// Check that the backing store answers.
    fn health_check(&self) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn get_config(&self) -> impl Future<Output = ProvisioningResult<Config>> + Send;

    // ---- classes of service ----

    fn create_cos(
        &self,
        name: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<Cos>> + Send;

    fn get_cos(&self, by: EntryBy) -> impl Future<Output = ProvisioningResult<Option<Cos>>> + Send;

    fn get_all_cos(&self) -> impl Future<Output = ProvisioningResult<Vec<Cos>>> + Send;

    fn rename_cos(
        &self,
        cos_id: &str,
        new_name: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    /// The default class of service cannot be deleted.
    fn delete_cos(&self, cos_id: &str) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- domains ----

    fn create_domain(
        &self,
        name: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<Domain>> + Send;

    fn get_domain(
        &self,
        by: EntryBy,
    ) -> impl Future<Output = ProvisioningResult<Option<Domain>>> + Send;

    fn get_all_domains(&self) -> impl Future<Output = ProvisioningResult<Vec<Domain>>> + Send;

    /// Fails with `DomainNotEmpty` while addressable entries remain in it.
    fn delete_domain(&self, domain_id: &str)
    -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- mime ----

    fn get_mime_types(
        &self,
        mime_type: &str,
    ) -> impl Future<Output = ProvisioningResult<Vec<MimeTypeInfo>>> + Send;

    fn get_mime_types_by_extension(
        &self,
        extension: &str,
    ) -> impl Future<Output = ProvisioningResult<Vec<MimeTypeInfo>>> + Send;

    // ---- servers ----

    fn create_server(
        &self,
        name: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<Server>> + Send;

    fn get_server(
        &self,
        by: EntryBy,
    ) -> impl Future<Output = ProvisioningResult<Option<Server>>> + Send;

    fn get_local_server(&self) -> impl Future<Output = ProvisioningResult<Server>> + Send;

    /// All servers, or only those with `service` enabled.
    fn get_all_servers(
        &self,
        service: Option<&str>,
    ) -> impl Future<Output = ProvisioningResult<Vec<Server>>> + Send;

    fn delete_server(&self, server_id: &str)
    -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- zimlets ----

    fn create_zimlet(
        &self,
        name: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<Zimlet>> + Send;

    fn get_zimlet(
        &self,
        name: &str,
    ) -> impl Future<Output = ProvisioningResult<Option<Zimlet>>> + Send;

    fn list_all_zimlets(&self) -> impl Future<Output = ProvisioningResult<Vec<Zimlet>>> + Send;

    /// Enabled zimlets, which provide the content object types.
    fn get_object_types(&self) -> impl Future<Output = ProvisioningResult<Vec<Zimlet>>> + Send;

    fn delete_zimlet(&self, name: &str) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- accounts ----

    fn create_account(
        &self,
        email: &str,
        password: Option<&str>,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<Account>> + Send;

    /// Calendar resources resolve as accounts too.
    fn get_account(
        &self,
        by: AccountBy,
    ) -> impl Future<Output = ProvisioningResult<Option<Account>>> + Send;

    fn get_all_accounts(
        &self,
        domain: &Domain,
    ) -> impl Future<Output = ProvisioningResult<Vec<Account>>> + Send;

    /// Directory accounts flagged `isAdminAccount`; system administrators
    /// are not included.
    fn get_all_admin_accounts(&self)
    -> impl Future<Output = ProvisioningResult<Vec<Account>>> + Send;

    /// Move an account to a new primary address; list memberships follow.
    fn rename_account(
        &self,
        account_id: &str,
        new_name: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    /// Also removes the account's data sources, identities and its
    /// addresses from every list.
    fn delete_account(
        &self,
        account_id: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn modify_account_status(
        &self,
        account: &mut Account,
        status: AccountStatus,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn set_cos(
        &self,
        account: &mut Account,
        cos: &Cos,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    /// Add an alias address to an account, calendar resource or group.
    fn add_alias<E: TypedEntry>(
        &self,
        entry: &mut E,
        alias: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    /// Remove an alias; fails with `NoSuchAlias` if the entry does not carry it.
    fn remove_alias<E: TypedEntry>(
        &self,
        entry: &mut E,
        alias: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- authentication ----

    fn auth_account(
        &self,
        account: &Account,
        password: &str,
        protocol: AuthProtocol,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    /// Verify a pre-auth signature made with the domain's `preAuthKey`.
    fn pre_auth_account(
        &self,
        account: &Account,
        account_name: &str,
        account_by: &str,
        timestamp: i64,
        expires: i64,
        preauth: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- passwords ----

    fn change_password(
        &self,
        account: &mut Account,
        current_password: &str,
        new_password: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn check_password_strength(
        &self,
        account: &Account,
        password: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn set_password(
        &self,
        account: &mut Account,
        new_password: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- calendar resources ----

    /// Requires `displayName` and `calResType`.
    fn create_calendar_resource(
        &self,
        email: &str,
        password: Option<&str>,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<CalendarResource>> + Send;

    fn get_calendar_resource(
        &self,
        by: EntryBy,
    ) -> impl Future<Output = ProvisioningResult<Option<CalendarResource>>> + Send;

    fn get_all_calendar_resources(
        &self,
        domain: &Domain,
    ) -> impl Future<Output = ProvisioningResult<Vec<CalendarResource>>> + Send;

    fn rename_calendar_resource(
        &self,
        resource_id: &str,
        new_name: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn delete_calendar_resource(
        &self,
        resource_id: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- distribution lists ----

    fn create_distribution_list(
        &self,
        email: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<DistributionList>> + Send;

    fn get_distribution_list(
        &self,
        by: EntryBy,
    ) -> impl Future<Output = ProvisioningResult<Option<DistributionList>>> + Send;

    fn get_all_distribution_lists(
        &self,
        domain: &Domain,
    ) -> impl Future<Output = ProvisioningResult<Vec<DistributionList>>> + Send;

    fn add_members(
        &self,
        list: &mut DistributionList,
        members: &[&str],
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn remove_members(
        &self,
        list: &mut DistributionList,
        members: &[&str],
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    /// Ids of every list the account belongs to, directly or not.
    fn get_distribution_list_ids(
        &self,
        account: &Account,
    ) -> impl Future<Output = ProvisioningResult<HashSet<String>>> + Send;

    fn get_distribution_lists(
        &self,
        account: &Account,
        direct_only: bool,
    ) -> impl Future<Output = ProvisioningResult<DistributionListMembership<DistributionList>>> + Send;

    fn in_distribution_list(
        &self,
        account: &Account,
        list_id: &str,
    ) -> impl Future<Output = ProvisioningResult<bool>> + Send;

    fn rename_distribution_list(
        &self,
        list_id: &str,
        new_name: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn delete_distribution_list(
        &self,
        list_id: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- dynamic groups ----

    fn create_dynamic_group(
        &self,
        email: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<DynamicGroup>> + Send;

    fn get_dynamic_group(
        &self,
        by: EntryBy,
    ) -> impl Future<Output = ProvisioningResult<Option<DynamicGroup>>> + Send;

    /// Accounts of the group's domain matching its `memberURL` filter.
    fn get_dynamic_group_members(
        &self,
        group: &DynamicGroup,
    ) -> impl Future<Output = ProvisioningResult<Vec<Account>>> + Send;

    fn delete_dynamic_group(
        &self,
        group_id: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- data sources ----

    fn create_data_source(
        &self,
        account: &Account,
        source_type: DataSourceType,
        name: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<DataSource>> + Send;

    fn get_data_source(
        &self,
        account: &Account,
        by: EntryBy,
    ) -> impl Future<Output = ProvisioningResult<Option<DataSource>>> + Send;

    fn get_all_data_sources(
        &self,
        account: &Account,
    ) -> impl Future<Output = ProvisioningResult<Vec<DataSource>>> + Send;

    fn modify_data_source(
        &self,
        account: &Account,
        data_source_id: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn delete_data_source(
        &self,
        account: &Account,
        data_source_id: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- identities ----

    fn create_identity(
        &self,
        account: &Account,
        name: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<Identity>> + Send;

    /// The name [`DEFAULT_IDENTITY_NAME`] (or the account's id) resolves to
    /// the account's own identity.
    fn get_identity(
        &self,
        account: &Account,
        by: EntryBy,
    ) -> impl Future<Output = ProvisioningResult<Option<Identity>>> + Send;

    /// The default identity first, then the others by name.
    fn get_all_identities(
        &self,
        account: &Account,
    ) -> impl Future<Output = ProvisioningResult<Vec<Identity>>> + Send;

    fn modify_identity(
        &self,
        account: &Account,
        identity_name: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    fn delete_identity(
        &self,
        account: &Account,
        identity_name: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- unified communication services ----

    fn create_uc_service(
        &self,
        name: &str,
        attrs: AttrChanges,
    ) -> impl Future<Output = ProvisioningResult<UcService>> + Send;

    fn get_uc_service(
        &self,
        by: EntryBy,
    ) -> impl Future<Output = ProvisioningResult<Option<UcService>>> + Send;

    fn get_all_uc_services(&self)
    -> impl Future<Output = ProvisioningResult<Vec<UcService>>> + Send;

    fn delete_uc_service(
        &self,
        service_id: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- share locators ----

    fn create_share_locator(
        &self,
        id: &str,
        owner_account_id: &str,
    ) -> impl Future<Output = ProvisioningResult<ShareLocator>> + Send;

    fn get_share_locator(
        &self,
        id: &str,
    ) -> impl Future<Output = ProvisioningResult<Option<ShareLocator>>> + Send;

    fn delete_share_locator(&self, id: &str)
    -> impl Future<Output = ProvisioningResult<()>> + Send;

    // ---- rights ----

    fn get_right(&self, name: &str)
    -> impl Future<Output = ProvisioningResult<Option<Right>>> + Send;

    fn get_all_rights(&self) -> impl Future<Output = ProvisioningResult<Vec<Right>>> + Send;

    // ---- generic entry access ----

    /// Validate and apply a change set, then refresh `entry` from the store.
    ///
    /// Changing `id` is always rejected with `InvalidRequest`.
    fn modify_attrs<E: TypedEntry>(
        &self,
        entry: &mut E,
        changes: &AttrChanges,
        options: ModifyOptions,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send;

    /// Replace `entry` with its stored state.
    fn reload<E: TypedEntry>(&self, entry: &mut E)
    -> impl Future<Output = ProvisioningResult<()>> + Send;

    /// Set one attribute through `modify_attrs`.
    fn set_attr<E, T>(
        &self,
        entry: &mut E,
        attr: &Attr<T>,
        value: impl Into<T>,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send
    where
        E: TypedEntry,
        T: AttrType,
    {
        let mut changes = AttrChanges::new();
        changes.set(attr, value);
        async move {
            self.modify_attrs(entry, &changes, ModifyOptions::default())
                .await
        }
    }

    /// Remove an attribute through `modify_attrs`.
    fn unset_attr<E: TypedEntry>(
        &self,
        entry: &mut E,
        name: &str,
    ) -> impl Future<Output = ProvisioningResult<()>> + Send {
        let mut changes = AttrChanges::new();
        changes.unset(name);
        async move {
            self.modify_attrs(entry, &changes, ModifyOptions::default())
                .await
        }
    }

    // ---- global address list ----

    /// Prefix match, at most `limit` contacts (capped by the domain's
    /// `galMaxResults`).
    fn auto_complete_gal(
        &self,
        domain: &Domain,
        query: &str,
        search_type: GalSearchType,
        limit: usize,
    ) -> impl Future<Output = ProvisioningResult<SearchGalResult>> + Send;

    /// Substring match; with a `token` only entries changed since it.
    fn search_gal(
        &self,
        domain: &Domain,
        query: &str,
        search_type: GalSearchType,
        token: Option<&str>,
    ) -> impl Future<Output = ProvisioningResult<SearchGalResult>> + Send;

    // ---- search ----

    /// Accounts matching an LDAP-style filter.
    fn search_accounts(
        &self,
        filter: &str,
        params: &SearchParams,
    ) -> impl Future<Output = ProvisioningResult<Vec<Account>>> + Send;

    fn search_calendar_resources(
        &self,
        filter: &EntrySearchFilter,
        params: &SearchParams,
    ) -> impl Future<Output = ProvisioningResult<Vec<CalendarResource>>> + Send;

    fn search_directory(
        &self,
        options: &SearchOptions,
    ) -> impl Future<Output = ProvisioningResult<Vec<Entry>>> + Send;
}
