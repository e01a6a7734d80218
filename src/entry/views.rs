//! Typed views over entries of each kind.
//!
//! Each view is a thin newtype around [`Entry`] that dereferences to it, so
//! the generic accessors stay available next to the named convenience getters.

use super::attrs;
use super::enums::*;
use super::{Entry, EntryKind, NamedEntry, TypedEntry};
use std::ops::Deref;
use std::time::Duration;

macro_rules! named_entry {
    ($(#[$meta:meta])* $name:ident => [$($kind:ident),+]) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(Entry);

        impl Deref for $name {
            type Target = Entry;

            fn deref(&self) -> &Entry {
                &self.0
            }
        }

        impl NamedEntry for $name {
            fn id(&self) -> &str {
                self.0.id()
            }

            fn name(&self) -> &str {
                self.0.name()
            }
        }

        impl TypedEntry for $name {
            fn accepts(kind: EntryKind) -> bool {
                matches!(kind, $(EntryKind::$kind)|+)
            }

            fn from_entry(entry: Entry) -> Option<Self> {
                Self::accepts(entry.kind()).then(|| $name(entry))
            }

            fn entry(&self) -> &Entry {
                &self.0
            }

            fn entry_mut(&mut self) -> &mut Entry {
                &mut self.0
            }

            fn into_entry(self) -> Entry {
                self.0
            }
        }

        impl From<$name> for Entry {
            fn from(view: $name) -> Entry {
                view.0
            }
        }
    };
}

named_entry! {
    /// A mailbox account. Calendar resources are accounts too.
    Account => [Account, CalendarResource]
}

named_entry! {
    CalendarResource => [CalendarResource]
}

named_entry! {
    /// The global configuration entry.
    Config => [Config]
}

named_entry! {
    /// A class of service.
    Cos => [Cos]
}

named_entry! {
    DataSource => [DataSource]
}

named_entry! {
    DistributionList => [DistributionList]
}

named_entry! {
    Domain => [Domain]
}

named_entry! {
    /// A group whose members are computed from a search filter.
    DynamicGroup => [DynamicGroup]
}

named_entry! {
    /// A sending persona of an account.
    Identity => [Identity]
}

named_entry! {
    Right => [Right]
}

named_entry! {
    Server => [Server]
}

named_entry! {
    ShareLocator => [ShareLocator]
}

named_entry! {
    UcService => [UcService]
}

named_entry! {
    Zimlet => [Zimlet]
}

fn domain_of(address: &str) -> Option<&str> {
    address.rsplit_once('@').map(|(_, domain)| domain)
}

impl Account {
    pub fn display_name(&self) -> Option<String> {
        self.get(&attrs::DISPLAY_NAME)
    }

    pub fn domain_name(&self) -> Option<&str> {
        domain_of(self.name())
    }

    pub fn account_status(&self) -> Option<AccountStatus> {
        self.get(&attrs::ACCOUNT_STATUS)
    }

    pub fn mail_status(&self) -> Option<MailStatus> {
        self.get(&attrs::MAIL_STATUS)
    }

    pub fn cos_id(&self) -> Option<String> {
        self.get(&attrs::COS_ID)
    }

    pub fn is_admin_account(&self) -> bool {
        self.get(&attrs::IS_ADMIN_ACCOUNT)
    }

    pub fn mail_aliases(&self) -> Vec<String> {
        self.get(&attrs::MAIL_ALIAS)
    }

    pub fn mail_delivery_address(&self) -> Option<String> {
        self.get(&attrs::MAIL_DELIVERY_ADDRESS)
    }

    pub fn mail_quota(&self) -> i64 {
        self.get(&attrs::MAIL_QUOTA)
    }

    pub fn auth_token_lifetime(&self) -> Option<Duration> {
        self.get(&attrs::AUTH_TOKEN_LIFETIME)
    }

    pub fn is_calendar_resource(&self) -> bool {
        self.kind() == EntryKind::CalendarResource
    }
}

impl From<CalendarResource> for Account {
    fn from(resource: CalendarResource) -> Account {
        Account(resource.0)
    }
}

impl CalendarResource {
    pub fn display_name(&self) -> Option<String> {
        self.get(&attrs::DISPLAY_NAME)
    }

    pub fn resource_type(&self) -> Option<CalResType> {
        self.get(&attrs::CAL_RES_TYPE)
    }

    /// Number of seats, `-1` when unset.
    pub fn capacity(&self) -> i32 {
        self.get(&attrs::CAL_RES_CAPACITY)
    }

    pub fn location_display_name(&self) -> Option<String> {
        self.get(&attrs::CAL_RES_LOCATION_DISPLAY_NAME)
    }

    pub fn auto_accept_decline(&self) -> bool {
        self.get(&attrs::CAL_RES_AUTO_ACCEPT_DECLINE)
    }
}

impl Config {
    pub fn default_domain_name(&self) -> Option<String> {
        self.get(&attrs::DEFAULT_DOMAIN_NAME)
    }

    pub fn gal_max_results(&self) -> i32 {
        self.get(&attrs::GAL_MAX_RESULTS)
    }
}

impl Cos {
    pub fn password_min_length(&self) -> i32 {
        self.get(&attrs::PASSWORD_MIN_LENGTH)
    }

    pub fn password_max_length(&self) -> i32 {
        self.get(&attrs::PASSWORD_MAX_LENGTH)
    }

    pub fn mail_quota(&self) -> i64 {
        self.get(&attrs::MAIL_QUOTA)
    }
}

impl DataSource {
    /// Id of the owning account.
    pub fn account_id(&self) -> Option<&str> {
        self.parent()
    }

    pub fn data_source_type(&self) -> Option<DataSourceType> {
        self.get(&attrs::DATA_SOURCE_TYPE)
    }

    pub fn is_enabled(&self) -> bool {
        self.get(&attrs::DATA_SOURCE_ENABLED)
    }

    pub fn connection_type(&self) -> Option<DataSourceConnectionType> {
        self.get(&attrs::DATA_SOURCE_CONNECTION_TYPE)
    }

    pub fn host(&self) -> Option<String> {
        self.get(&attrs::DATA_SOURCE_HOST)
    }

    pub fn port(&self) -> i32 {
        self.get(&attrs::DATA_SOURCE_PORT)
    }

    pub fn username(&self) -> Option<String> {
        self.get(&attrs::DATA_SOURCE_USERNAME)
    }

    pub fn folder_id(&self) -> Option<String> {
        self.get(&attrs::DATA_SOURCE_FOLDER_ID)
    }

    pub fn polling_interval(&self) -> Option<Duration> {
        self.get(&attrs::DATA_SOURCE_POLLING_INTERVAL)
    }
}

impl DistributionList {
    /// Direct member addresses.
    pub fn members(&self) -> Vec<String> {
        self.get(&attrs::MEMBER)
    }

    pub fn display_name(&self) -> Option<String> {
        self.get(&attrs::DISPLAY_NAME)
    }

    pub fn subscription_policy(&self) -> Option<SubscriptionPolicy> {
        self.get(&attrs::SUBSCRIPTION_POLICY)
    }

    pub fn mail_aliases(&self) -> Vec<String> {
        self.get(&attrs::MAIL_ALIAS)
    }
}

impl Domain {
    pub fn pre_auth_key(&self) -> Option<String> {
        self.get(&attrs::PRE_AUTH_KEY)
    }

    pub fn status(&self) -> Option<DomainStatus> {
        self.get(&attrs::DOMAIN_STATUS)
    }

    pub fn domain_type(&self) -> Option<DomainType> {
        self.get(&attrs::DOMAIN_TYPE)
    }

    pub fn default_cos_id(&self) -> Option<String> {
        self.get(&attrs::DOMAIN_DEFAULT_COS_ID)
    }

    pub fn gal_mode(&self) -> Option<GalMode> {
        self.get(&attrs::GAL_MODE)
    }

    pub fn gal_max_results(&self) -> i32 {
        self.get(&attrs::GAL_MAX_RESULTS)
    }

    pub fn virtual_hostnames(&self) -> Vec<String> {
        self.get(&attrs::VIRTUAL_HOSTNAME)
    }
}

impl DynamicGroup {
    pub fn member_url(&self) -> Option<String> {
        self.get(&attrs::MEMBER_URL)
    }

    pub fn is_acl_group(&self) -> bool {
        self.get(&attrs::IS_ACL_GROUP)
    }
}

impl Identity {
    pub fn account_id(&self) -> Option<&str> {
        self.parent()
    }

    pub fn from_address(&self) -> Option<String> {
        self.get(&attrs::PREF_FROM_ADDRESS)
    }

    pub fn from_display(&self) -> Option<String> {
        self.get(&attrs::PREF_FROM_DISPLAY)
    }

    pub fn reply_to_address(&self) -> Option<String> {
        self.get(&attrs::PREF_REPLY_TO_ADDRESS)
    }

    pub fn bcc_address(&self) -> Option<String> {
        self.get(&attrs::PREF_BCC_ADDRESS)
    }
}

impl Right {
    pub fn right_type(&self) -> Option<RightType> {
        self.get(&attrs::RIGHT_TYPE)
    }

    /// Target types that parse; unknown stored values are skipped.
    pub fn target_types(&self) -> Vec<RightTargetType> {
        self.get(&attrs::RIGHT_TARGET_TYPE)
            .iter()
            .filter_map(|t| t.parse().ok())
            .collect()
    }

    pub fn is_preset(&self) -> bool {
        self.right_type() == Some(RightType::Preset)
    }
}

impl Server {
    pub fn service_hostname(&self) -> Option<String> {
        self.get(&attrs::SERVICE_HOSTNAME)
    }

    pub fn services_enabled(&self) -> Vec<String> {
        self.get(&attrs::SERVICE_ENABLED)
    }

    pub fn has_service(&self, service: &str) -> bool {
        self.services_enabled()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(service))
    }

    pub fn mail_port(&self) -> i32 {
        self.get(&attrs::MAIL_PORT)
    }
}

impl ShareLocator {
    pub fn owner_account_id(&self) -> Option<String> {
        self.get(&attrs::SHARE_OWNER_ACCOUNT_ID)
    }
}

impl UcService {
    pub fn admin_url(&self) -> Option<String> {
        self.get(&attrs::UC_ADMIN_URL)
    }

    pub fn call_control_url(&self) -> Option<String> {
        self.get(&attrs::UC_CALL_CONTROL_URL)
    }

    pub fn voicemail_url(&self) -> Option<String> {
        self.get(&attrs::UC_VOICEMAIL_URL)
    }
}

impl Zimlet {
    pub fn version(&self) -> Option<String> {
        self.get(&attrs::ZIMLET_VERSION)
    }

    pub fn is_enabled(&self) -> bool {
        self.get(&attrs::ZIMLET_ENABLED)
    }

    pub fn priority(&self) -> i32 {
        self.get(&attrs::ZIMLET_PRIORITY)
    }

    pub fn is_extension(&self) -> bool {
        self.get(&attrs::ZIMLET_IS_EXTENSION)
    }

    pub fn keyword(&self) -> Option<String> {
        self.get(&attrs::ZIMLET_KEYWORD)
    }
}
