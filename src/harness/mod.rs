//! End-to-end smoke test of a [`Provisioning`] implementation.
//!
//! [`ProvisioningSmokeTest`] creates one entry of every kind under names
//! derived from a test id, exercises lookups, renames, aliases, membership,
//! authentication and search against them, then waits for a
//! [`Confirmation`] and deletes what it created.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use dirprov::config::ProvisioningConfig;
//! use dirprov::harness::{AutoConfirm, ProvisioningSmokeTest};
//! use dirprov::provisioning::StandardProvisioning;
//! use dirprov::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProvisioningConfig::default();
//! let prov = StandardProvisioning::new(InMemoryStorage::new(), config.clone()).await?;
//! let test_id = ProvisioningSmokeTest::new(&prov, &config, AutoConfirm)
//!     .execute()
//!     .await?;
//! println!("Test {} done!", test_id);
//! # Ok(())
//! # }
//! ```

use crate::auth::{generate_pre_auth_key, AuthProtocol, PreAuthRequest};
use crate::config::ProvisioningConfig;
use crate::entry::{
    attrs, Account, AccountStatus, AttrChanges, CalResType, CalendarResource, Cos,
    DataSourceConnectionType, DataSourceType, DistributionList, Domain, NamedEntry, Server,
};
use crate::error::{ErrorCode, ProvisioningError};
use crate::filter::{EntrySearchFilter, Operator, Single};
use crate::provisioning::{
    AccountBy, EntryBy, EntryTypes, GalSearchType, ModifyOptions, Provisioning, SearchOptions,
    SearchParams, DEFAULT_IDENTITY_NAME,
};
use log::{debug, info};
use std::future::Future;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Errors that stop a smoke test.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The directory answered, but not with what the test expected.
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error("failed to read confirmation: {0}")]
    Io(#[from] std::io::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Gate between the checks and the cleanup.
pub trait Confirmation {
    fn confirm(&mut self, prompt: &str) -> impl Future<Output = std::io::Result<()>> + Send;
}

/// Waits for a line on standard input.
#[derive(Debug, Default)]
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    async fn confirm(&mut self, prompt: &str) -> std::io::Result<()> {
        println!("{}", prompt);
        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;
        Ok(())
    }
}

/// Proceeds straight to the cleanup.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirmation for AutoConfirm {
    async fn confirm(&mut self, prompt: &str) -> std::io::Result<()> {
        debug!("Auto-confirming: {}", prompt);
        Ok(())
    }
}

/// Names of everything a smoke test creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestNames {
    pub test_id: String,
    pub password: String,
    pub cos: String,
    pub domain: String,
    pub server: String,
    pub zimlet: String,
    pub new_name: String,
    pub new_email: String,
    pub account: String,
    pub account_alias: String,
    pub full_name: String,
    pub calendar_resource: String,
    pub calendar_resource_alias: String,
    pub list: String,
    pub list_alias: String,
    pub nested_list: String,
    pub nested_list_alias: String,
    pub data_source: String,
    pub identity: String,
}

impl TestNames {
    pub fn new(test_id: impl Into<String>) -> Self {
        let test_id = test_id.into();
        let domain = format!("domain-{}.ldap-test-domain", test_id);
        let email = |user: &str| format!("{}@{}", user, domain);
        let new_name = "newname".to_string();
        Self {
            password: "test123".to_string(),
            cos: format!("cos-{}", test_id),
            server: format!("server-{}", test_id),
            zimlet: format!("zimlet-{}", test_id),
            new_email: email(&format!("{}-{}", new_name, test_id)),
            account: email("acct-1"),
            account_alias: email("alias-of-acct-1"),
            full_name: "Phoebe Shao".to_string(),
            calendar_resource: email("cr-1"),
            calendar_resource_alias: email("alias-of-cr-1"),
            list: email("dl-1"),
            list_alias: email("alias-of-dl-1"),
            nested_list: email("dl-nested"),
            nested_list_alias: email("alias-of-dl-nested"),
            data_source: "datasource-1".to_string(),
            identity: "identity-1".to_string(),
            new_name,
            domain,
            test_id,
        }
    }

    /// A test id from the current local time.
    pub fn generate_id() -> String {
        chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
    }
}

/// Entries created by a run, in the order they are deleted.
struct Created {
    zimlet: String,
    server: Server,
    identity: String,
    data_source: String,
    nested_list: DistributionList,
    list: DistributionList,
    calendar_resource: CalendarResource,
    account: Account,
    domain: Domain,
    cos: Cos,
}

/// Scripted walk through the provisioning API.
pub struct ProvisioningSmokeTest<'a, P: Provisioning, C: Confirmation> {
    prov: &'a P,
    confirmation: C,
    names: TestNames,
    pre_auth_key: String,
    default_cos_name: String,
    system_admin_name: String,
    admin_name: String,
}

impl<'a, P: Provisioning, C: Confirmation> ProvisioningSmokeTest<'a, P, C> {
    /// Administrator and default class of service names come from `config`,
    /// which must be the one `prov` was built with.
    pub fn new(prov: &'a P, config: &ProvisioningConfig, confirmation: C) -> Self {
        Self {
            prov,
            confirmation,
            names: TestNames::new(TestNames::generate_id()),
            pre_auth_key: generate_pre_auth_key(),
            default_cos_name: config.default_cos_name.clone(),
            system_admin_name: config.system_admin_name.clone(),
            admin_name: config.admin_name.clone(),
        }
    }

    pub fn with_test_id(mut self, test_id: impl Into<String>) -> Self {
        self.names = TestNames::new(test_id);
        self
    }

    pub fn names(&self) -> &TestNames {
        &self.names
    }

    /// Run every step, then clean up after confirmation. Returns the test id.
    pub async fn execute(mut self) -> HarnessResult<String> {
        info!("Starting provisioning smoke test {}", self.names.test_id);

        self.test_health().await?;
        self.test_config().await?;
        let cos = self.test_cos().await?;
        let domain = self.test_domain().await?;
        self.test_mime().await?;
        let server = self.test_server().await?;
        let zimlet = self.test_zimlet().await?;
        self.test_admin_account().await?;
        let mut account = self.test_account(&domain, &cos).await?;
        self.test_auth(&account).await?;
        self.test_password(&mut account).await?;
        let calendar_resource = self.test_calendar_resource(&domain, &cos).await?;
        let (list, nested_list) = self.test_distribution_list(&domain, &account).await?;
        let data_source = self.test_data_source(&account).await?;
        let identity = self.test_identity(&account).await?;
        self.test_entry(&mut account).await?;
        self.test_gal(&domain).await?;
        self.test_search(&domain).await?;

        let created = Created {
            zimlet,
            server,
            identity,
            data_source,
            nested_list,
            list,
            calendar_resource,
            account,
            domain,
            cos,
        };
        self.confirmation
            .confirm("Press enter to delete entries created by the test")
            .await?;
        self.delete_all(created).await?;

        info!("Provisioning smoke test {} passed", self.names.test_id);
        Ok(self.names.test_id)
    }

    async fn test_health(&self) -> HarnessResult<()> {
        println!("Testing health");
        self.prov.health_check().await?;
        Ok(())
    }

    async fn test_config(&self) -> HarnessResult<()> {
        println!("Testing config");
        let config = self.prov.get_config().await?;
        ensure(
            config.default_domain_name().is_some(),
            "config names a default domain",
        )
    }

    async fn test_cos(&self) -> HarnessResult<Cos> {
        println!("Testing cos");
        let n = &self.names;

        let default_cos = self
            .prov
            .get_cos(EntryBy::name(&self.default_cos_name))
            .await?
            .ok_or_else(|| assertion("default cos exists"))?;

        let cos = self.prov.create_cos(&n.cos, AttrChanges::new()).await?;
        let got = self.prov.get_cos(EntryBy::id(cos.id())).await?;
        verify_same_entry(&cos, got.as_ref())?;
        let got = self.prov.get_cos(EntryBy::name(&n.cos)).await?;
        verify_same_entry(&cos, got.as_ref())?;

        let all = self.prov.get_all_cos().await?;
        verify_entries("cos", &all, &[&default_cos, &cos], false)?;

        self.prov.rename_cos(cos.id(), &n.new_name).await?;
        let got = self.prov.get_cos(EntryBy::name(&n.new_name)).await?;
        verify_same_entry(&cos, got.as_ref())?;
        self.prov.rename_cos(cos.id(), &n.cos).await?;

        Ok(cos)
    }

    async fn test_domain(&self) -> HarnessResult<Domain> {
        println!("Testing domain");
        let n = &self.names;

        let mut attrs = AttrChanges::new();
        attrs.set(&attrs::PRE_AUTH_KEY, self.pre_auth_key.as_str());
        let domain = self.prov.create_domain(&n.domain, attrs).await?;

        let got = self.prov.get_domain(EntryBy::id(domain.id())).await?;
        verify_same_entry(&domain, got.as_ref())?;
        let got = self.prov.get_domain(EntryBy::name(&n.domain)).await?;
        verify_same_entry(&domain, got.as_ref())?;

        let all = self.prov.get_all_domains().await?;
        verify_entries("domains", &all, &[&domain], false)?;

        Ok(domain)
    }

    async fn test_mime(&self) -> HarnessResult<()> {
        println!("Testing mime");
        let by_type = self.prov.get_mime_types("all").await?;
        ensure(!by_type.is_empty(), "mime type 'all' is known")?;
        let by_extension = self.prov.get_mime_types_by_extension("text").await?;
        ensure(!by_extension.is_empty(), "extension 'text' is known")
    }

    async fn test_server(&self) -> HarnessResult<Server> {
        println!("Testing server");
        let n = &self.names;

        let server = self.prov.create_server(&n.server, AttrChanges::new()).await?;
        let got = self.prov.get_server(EntryBy::id(server.id())).await?;
        verify_same_entry(&server, got.as_ref())?;
        let got = self.prov.get_server(EntryBy::name(&n.server)).await?;
        verify_same_entry(&server, got.as_ref())?;

        let local = self.prov.get_local_server().await?;
        let all = self.prov.get_all_servers(None).await?;
        verify_entries("servers", &all, &[&local, &server], false)?;
        let mailbox = self.prov.get_all_servers(Some("mailbox")).await?;
        verify_entries("mailbox servers", &mailbox, &[&local], false)?;

        Ok(server)
    }

    async fn test_zimlet(&self) -> HarnessResult<String> {
        println!("Testing zimlet");
        let n = &self.names;

        let mut attrs = AttrChanges::new();
        attrs
            .set(&attrs::ZIMLET_VERSION, "1.0")
            .set(&attrs::ZIMLET_ENABLED, true);
        let zimlet = self.prov.create_zimlet(&n.zimlet, attrs).await?;

        let got = self.prov.get_zimlet(&n.zimlet).await?;
        verify_same_entry(&zimlet, got.as_ref())?;

        let object_types = self.prov.get_object_types().await?;
        verify_entries("object types", &object_types, &[&zimlet], false)?;
        let all = self.prov.list_all_zimlets().await?;
        verify_entries("zimlets", &all, &[&zimlet], false)?;

        Ok(zimlet.name().to_string())
    }

    async fn test_admin_account(&self) -> HarnessResult<()> {
        println!("Testing admin account");

        self.prov
            .get_account(AccountBy::admin_name(&self.system_admin_name))
            .await?
            .ok_or_else(|| assertion("system admin account exists"))?;

        let admin = self
            .prov
            .get_account(AccountBy::name(&self.admin_name))
            .await?
            .ok_or_else(|| assertion("global admin account exists"))?;
        let admins = self.prov.get_all_admin_accounts().await?;
        verify_entries("admin accounts", &admins, &[&admin], true)
    }

    async fn test_account(&self, domain: &Domain, cos: &Cos) -> HarnessResult<Account> {
        println!("Testing account");
        let n = &self.names;

        let mut attrs = AttrChanges::new();
        attrs.set(&attrs::COS_ID, cos.id());
        let mut account = self
            .prov
            .create_account(&n.account, Some(&n.password), attrs)
            .await?;
        self.prov.add_alias(&mut account, &n.account_alias).await?;

        for by in [
            AccountBy::id(account.id()),
            AccountBy::name(&n.account),
            AccountBy::name(&n.account_alias),
        ] {
            let got = self.prov.get_account(by).await?;
            verify_same_entry(&account, got.as_ref())?;
        }

        let all = self.prov.get_all_accounts(domain).await?;
        verify_entries("domain accounts", &all, &[&account], true)?;

        self.prov
            .modify_account_status(&mut account, AccountStatus::Maintenance)
            .await?;
        self.prov
            .modify_account_status(&mut account, AccountStatus::Active)
            .await?;

        self.prov.remove_alias(&mut account, &n.account_alias).await?;

        self.prov.rename_account(account.id(), &n.new_email).await?;
        self.prov.rename_account(account.id(), &n.account).await?;
        self.prov.reload(&mut account).await?;

        self.prov.set_cos(&mut account, cos).await?;

        Ok(account)
    }

    async fn test_auth(&self, account: &Account) -> HarnessResult<()> {
        println!("Testing auth");
        let n = &self.names;

        self.prov
            .auth_account(account, &n.password, AuthProtocol::Test)
            .await?;

        let request = PreAuthRequest {
            account: n.account.clone(),
            by: "name".to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            expires: 0,
        };
        let preauth = request.sign(&self.pre_auth_key)?;
        self.prov
            .pre_auth_account(
                account,
                &request.account,
                &request.by,
                request.timestamp,
                request.expires,
                &preauth,
            )
            .await?;
        Ok(())
    }

    async fn test_password(&self, account: &mut Account) -> HarnessResult<()> {
        println!("Testing password");
        let password = &self.names.password;

        self.prov
            .change_password(account, password, password)
            .await?;
        self.prov.check_password_strength(account, password).await?;
        self.prov.set_password(account, password).await?;
        Ok(())
    }

    async fn test_calendar_resource(
        &self,
        domain: &Domain,
        cos: &Cos,
    ) -> HarnessResult<CalendarResource> {
        println!("Testing calendar resource");
        let n = &self.names;

        let mut attrs = AttrChanges::new();
        attrs
            .set(&attrs::DISPLAY_NAME, "cr-1")
            .set(&attrs::CAL_RES_TYPE, CalResType::Equipment)
            .set(&attrs::COS_ID, cos.id());
        let mut resource = self
            .prov
            .create_calendar_resource(&n.calendar_resource, Some(&n.password), attrs)
            .await?;
        self.prov
            .add_alias(&mut resource, &n.calendar_resource_alias)
            .await?;

        for by in [
            EntryBy::id(resource.id()),
            EntryBy::name(&n.calendar_resource),
            EntryBy::name(&n.calendar_resource_alias),
        ] {
            let got = self.prov.get_calendar_resource(by).await?;
            verify_same_entry(&resource, got.as_ref())?;
        }

        let all = self.prov.get_all_calendar_resources(domain).await?;
        verify_entries("domain calendar resources", &all, &[&resource], true)?;

        self.prov
            .rename_calendar_resource(resource.id(), &n.new_email)
            .await?;
        self.prov
            .rename_calendar_resource(resource.id(), &n.calendar_resource)
            .await?;
        self.prov.reload(&mut resource).await?;

        Ok(resource)
    }

    async fn test_distribution_list(
        &self,
        domain: &Domain,
        account: &Account,
    ) -> HarnessResult<(DistributionList, DistributionList)> {
        println!("Testing distribution list");
        let n = &self.names;

        let mut list = self
            .prov
            .create_distribution_list(&n.list, AttrChanges::new())
            .await?;
        self.prov.add_alias(&mut list, &n.list_alias).await?;
        for by in [
            EntryBy::id(list.id()),
            EntryBy::name(&n.list),
            EntryBy::name(&n.list_alias),
        ] {
            let got = self.prov.get_distribution_list(by).await?;
            verify_same_entry(&list, got.as_ref())?;
        }

        let mut nested = self
            .prov
            .create_distribution_list(&n.nested_list, AttrChanges::new())
            .await?;
        self.prov.add_alias(&mut nested, &n.nested_list_alias).await?;

        self.prov
            .add_members(&mut list, &[n.nested_list.as_str()])
            .await?;
        self.prov
            .add_members(&mut nested, &[n.account.as_str()])
            .await?;

        let all = self.prov.get_all_distribution_lists(domain).await?;
        verify_entries("domain lists", &all, &[&list, &nested], true)?;

        let ids = self.prov.get_distribution_list_ids(account).await?;
        ensure(
            ids.len() == 2 && ids.contains(list.id()) && ids.contains(nested.id()),
            "account belongs to both lists",
        )?;

        let membership = self.prov.get_distribution_lists(account, false).await?;
        verify_entries("all lists", &membership.lists, &[&list, &nested], true)?;
        ensure(
            membership.via.len() == 1
                && membership.via.get(list.name()).map(String::as_str) == Some(nested.name()),
            "membership of the outer list goes through the nested list",
        )?;

        let direct = self.prov.get_distribution_lists(account, true).await?;
        verify_entries("direct lists", &direct.lists, &[&nested], true)?;

        ensure(
            self.prov.in_distribution_list(account, list.id()).await?,
            "account is in the outer list",
        )?;

        self.prov.remove_alias(&mut list, &n.list_alias).await?;
        let nested_name = nested.name().to_string();
        self.prov
            .remove_members(&mut list, &[nested_name.as_str()])
            .await?;

        self.prov
            .rename_distribution_list(list.id(), &n.new_email)
            .await?;
        self.prov.rename_distribution_list(list.id(), &n.list).await?;
        self.prov.reload(&mut list).await?;

        Ok((list, nested))
    }

    async fn test_data_source(&self, account: &Account) -> HarnessResult<String> {
        println!("Testing data source");
        let n = &self.names;

        let mut attrs = AttrChanges::new();
        attrs
            .set(&attrs::DATA_SOURCE_ENABLED, true)
            .set(&attrs::DATA_SOURCE_CONNECTION_TYPE, DataSourceConnectionType::Ssl)
            .set(&attrs::DATA_SOURCE_FOLDER_ID, "inbox")
            .set(&attrs::DATA_SOURCE_HOST, "google.com")
            .set(&attrs::DATA_SOURCE_LEAVE_ON_SERVER, true)
            .set(&attrs::DATA_SOURCE_PASSWORD, n.password.as_str())
            .set(&attrs::DATA_SOURCE_PORT, 9999)
            .set(&attrs::DATA_SOURCE_USERNAME, "whatever");
        let data_source = self
            .prov
            .create_data_source(account, DataSourceType::Pop3, &n.data_source, attrs)
            .await?;

        let got = self
            .prov
            .get_data_source(account, EntryBy::id(data_source.id()))
            .await?;
        verify_same_entry(&data_source, got.as_ref())?;
        let got = self
            .prov
            .get_data_source(account, EntryBy::name(&n.data_source))
            .await?;
        verify_same_entry(&data_source, got.as_ref())?;

        let all = self.prov.get_all_data_sources(account).await?;
        verify_entries("data sources", &all, &[&data_source], true)?;

        let mut changes = AttrChanges::new();
        changes.set_str(attrs::DATA_SOURCE_POLLING_INTERVAL, "100");
        self.prov
            .modify_data_source(account, data_source.id(), changes)
            .await?;

        Ok(data_source.id().to_string())
    }

    async fn test_identity(&self, account: &Account) -> HarnessResult<String> {
        println!("Testing identity");
        let n = &self.names;

        let identity = self
            .prov
            .create_identity(account, &n.identity, AttrChanges::new())
            .await?;

        let got = self
            .prov
            .get_identity(account, EntryBy::id(identity.id()))
            .await?;
        verify_same_entry(&identity, got.as_ref())?;
        let got = self
            .prov
            .get_identity(account, EntryBy::name(&n.identity))
            .await?;
        verify_same_entry(&identity, got.as_ref())?;

        let default = self
            .prov
            .get_identity(account, EntryBy::name(DEFAULT_IDENTITY_NAME))
            .await?;
        verify_same_entry(account, default.as_ref())?;
        let default = default.ok_or_else(|| assertion("default identity exists"))?;

        let all = self.prov.get_all_identities(account).await?;
        verify_entries("identities", &all, &[&default, &identity], true)?;

        let mut changes = AttrChanges::new();
        changes.set(&attrs::PREF_BCC_ADDRESS, "whatever");
        self.prov
            .modify_identity(account, &n.identity, changes)
            .await?;

        Ok(identity.name().to_string())
    }

    async fn test_entry(&self, account: &mut Account) -> HarnessResult<()> {
        println!("Testing entry");

        let mut changes = AttrChanges::new();
        changes.set(&attrs::ID, "junk");
        match self
            .prov
            .modify_attrs(account, &changes, ModifyOptions::checked())
            .await
        {
            Err(e) if e.code() == ErrorCode::InvalidRequest => {}
            Err(e) => return Err(e.into()),
            Ok(()) => return Err(assertion("changing the id is rejected")),
        }

        let mut changes = AttrChanges::new();
        changes.set(&attrs::DISPLAY_NAME, self.names.full_name.as_str());
        self.prov
            .modify_attrs(account, &changes, ModifyOptions::checked())
            .await?;
        self.prov.reload(account).await?;
        ensure(
            account.display_name().as_deref() == Some(self.names.full_name.as_str()),
            "display name was stored",
        )
    }

    async fn test_gal(&self, domain: &Domain) -> HarnessResult<()> {
        println!("Testing gal");
        let n = &self.names;
        let query: String = n.account.chars().take(3).collect();

        let result = self
            .prov
            .auto_complete_gal(domain, &query, GalSearchType::All, 100)
            .await?;
        self.verify_gal_match("auto-complete", &result.matches)?;

        let result = self
            .prov
            .search_gal(domain, &query, GalSearchType::All, None)
            .await?;
        self.verify_gal_match("search", &result.matches)
    }

    fn verify_gal_match(
        &self,
        what: &str,
        matches: &[crate::provisioning::GalContact],
    ) -> HarnessResult<()> {
        ensure(
            matches.len() == 1,
            &format!("{} returns one contact, got {}", what, matches.len()),
        )?;
        ensure(
            matches[0].full_name() == Some(self.names.full_name.as_str()),
            &format!("{} returns the test account", what),
        )
    }

    async fn test_search(&self, domain: &Domain) -> HarnessResult<()> {
        println!("Testing search");
        let n = &self.names;

        let account = self
            .prov
            .get_account(AccountBy::name(&n.account))
            .await?
            .ok_or_else(|| assertion("test account exists"))?;
        let resource = self
            .prov
            .get_account(AccountBy::name(&n.calendar_resource))
            .await?
            .ok_or_else(|| assertion("test calendar resource exists"))?;

        let delivery = attrs::MAIL_DELIVERY_ADDRESS.name();
        let query = format!("({}={})", delivery, n.account);
        let params = SearchParams::new()
            .with_return_attrs([delivery])
            .sorted_by(delivery, true);

        let found = self.prov.search_accounts(&query, &params).await?;
        verify_entries("searched accounts", &found, &[&account], true)?;

        let options = SearchOptions::new()
            .with_domain(domain.name())
            .with_filter(query.as_str())
            .with_types(EntryTypes::ACCOUNTS)
            .with_params(params.clone());
        let found = self.prov.search_directory(&options).await?;
        verify_entries("searched domain accounts", &found, &[&account], true)?;

        let filter = EntrySearchFilter::new(Single::new(
            delivery,
            Operator::Eq,
            n.calendar_resource.as_str(),
        ));
        let found = self
            .prov
            .search_calendar_resources(&filter, &SearchParams::new())
            .await?;
        verify_entries("searched calendar resources", &found, &[&resource], true)?;

        let options = SearchOptions::new()
            .with_domain(domain.name())
            .with_filter(filter.to_ldap_string())
            .with_types(EntryTypes::CALENDAR_RESOURCES);
        let found = self.prov.search_directory(&options).await?;
        verify_entries("searched domain calendar resources", &found, &[&resource], true)?;

        let options = SearchOptions::new()
            .with_domain(domain.name())
            .with_filter(query);
        let found = self.prov.search_directory(&options).await?;
        verify_entries("searched directory", &found, &[&account], true)
    }

    async fn delete_all(&self, created: Created) -> HarnessResult<()> {
        println!("Deleting entries");
        let Created {
            zimlet,
            server,
            identity,
            data_source,
            nested_list,
            list,
            calendar_resource,
            account,
            domain,
            cos,
        } = created;

        self.prov.delete_zimlet(&zimlet).await?;
        self.prov.delete_server(server.id()).await?;
        self.prov.delete_identity(&account, &identity).await?;
        self.prov.delete_data_source(&account, &data_source).await?;
        self.prov.delete_distribution_list(nested_list.id()).await?;
        self.prov.delete_distribution_list(list.id()).await?;
        self.prov
            .delete_calendar_resource(calendar_resource.id())
            .await?;
        self.prov.delete_account(account.id()).await?;
        self.prov.delete_domain(domain.id()).await?;
        self.prov.delete_cos(cos.id()).await?;
        Ok(())
    }
}

/// Console lines for a provisioning failure: code and message, then every
/// underlying cause.
pub fn failure_report(error: &ProvisioningError) -> Vec<String> {
    let mut lines = vec![format!("ERROR: {} ({})", error.code(), error)];
    let causes = std::iter::successors(std::error::Error::source(error), |cause| cause.source());
    lines.extend(causes.map(|cause| format!("    caused by: {}", cause)));
    lines
}

fn assertion(message: impl Into<String>) -> HarnessError {
    HarnessError::Assertion(message.into())
}

fn ensure(condition: bool, message: &str) -> HarnessResult<()> {
    if condition {
        Ok(())
    } else {
        Err(assertion(message))
    }
}

/// `got` must be present and carry the id of `expected`.
pub fn verify_same_entry<A, B>(expected: &A, got: Option<&B>) -> HarnessResult<()>
where
    A: NamedEntry + ?Sized,
    B: NamedEntry + ?Sized,
{
    if got.is_some_and(|got| got.id() == expected.id()) {
        return Ok(());
    }
    println!("\n===== verify_same_entry failed =====");
    println!("{}", expected.id());
    println!("{}", got.map_or("entry is missing", |got| got.id()));
    Err(assertion(format!(
        "{} is not the entry found",
        expected.name()
    )))
}

/// Every expected entry must be in `list` (by id); with `check_count` the
/// list must hold nothing else.
pub fn verify_entries<E: NamedEntry>(
    what: &str,
    list: &[E],
    expected: &[&dyn NamedEntry],
    check_count: bool,
) -> HarnessResult<()> {
    let count_ok = !check_count || list.len() == expected.len();
    let missing: Vec<&str> = expected
        .iter()
        .filter(|entry| !list.iter().any(|e| e.id() == entry.id()))
        .map(|entry| entry.name())
        .collect();
    if count_ok && missing.is_empty() {
        return Ok(());
    }

    println!("\n===== verify_entries failed: {} =====", what);
    println!("list contains {} entries:", list.len());
    for entry in list {
        println!("    {}", entry.name());
    }
    println!("expected {} entries:", expected.len());
    for entry in expected {
        println!("    {}", entry.name());
    }
    println!();

    if !count_ok {
        return Err(assertion(format!(
            "{}: expected {} entries, got {}",
            what,
            expected.len(),
            list.len()
        )));
    }
    Err(assertion(format!("{}: missing {}", what, missing.join(", "))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, EntryKind};

    #[test]
    fn test_names_derive_from_id() {
        let names = TestNames::new("t1");
        assert_eq!(names.domain, "domain-t1.ldap-test-domain");
        assert_eq!(names.account, "acct-1@domain-t1.ldap-test-domain");
        assert_eq!(names.new_email, "newname-t1@domain-t1.ldap-test-domain");
        assert!(names.account.starts_with("acc"));
    }

    #[test]
    fn test_verify_entries() {
        let a = Entry::new(EntryKind::Cos, "1", "a");
        let b = Entry::new(EntryKind::Cos, "2", "b");
        let list = vec![a.clone(), b.clone()];

        assert!(verify_entries("cos", &list, &[&a], false).is_ok());
        assert!(verify_entries("cos", &list, &[&a], true).is_err());
        assert!(verify_entries("cos", &list, &[&a, &b], true).is_ok());
        assert!(verify_entries("cos", &list[..1], &[&b], false).is_err());

        let err = verify_entries("cos", &list, &[&a, &b, &a], true).unwrap_err();
        assert!(err.to_string().contains("expected 3 entries, got 2"));
        let c = Entry::new(EntryKind::Cos, "3", "c");
        let err = verify_entries("cos", &list, &[&c], false).unwrap_err();
        assert!(err.to_string().contains("missing c"));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Reset(#[source] std::io::Error);

    #[test]
    fn test_failure_report_walks_causes() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        let error = ProvisioningError::storage("put", Reset(io));
        assert_eq!(
            failure_report(&error),
            vec![
                "ERROR: service.FAILURE (Storage error: put failed: connection reset)".to_string(),
                "    caused by: connection reset".to_string(),
                "    caused by: socket closed".to_string(),
            ]
        );

        let error = ProvisioningError::invalid_request("bad");
        assert_eq!(failure_report(&error).len(), 1);
    }

    #[test]
    fn test_verify_same_entry() {
        let a = Entry::new(EntryKind::Cos, "1", "a");
        let renamed = Entry::new(EntryKind::Cos, "1", "b");
        let other = Entry::new(EntryKind::Cos, "2", "a");
        assert!(verify_same_entry(&a, Some(&a)).is_ok());
        // Identity is the id; the name may differ.
        assert!(verify_same_entry(&a, Some(&renamed)).is_ok());
        assert!(verify_same_entry(&a, Some(&other)).is_err());
        assert!(verify_same_entry::<Entry, Entry>(&a, None).is_err());
    }
}
