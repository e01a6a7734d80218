//! The kinds of entry a directory holds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a directory entry.
///
/// The kind decides which attributes apply to an entry, where it is stored,
/// and which typed view ([`crate::entry::Account`], [`crate::entry::Cos`], ...)
/// it can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    Account,
    CalendarResource,
    Config,
    Cos,
    DataSource,
    DistributionList,
    Domain,
    DynamicGroup,
    Identity,
    Right,
    Server,
    ShareLocator,
    UcService,
    Zimlet,
}

impl EntryKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntryKind; 14] = [
        EntryKind::Account,
        EntryKind::CalendarResource,
        EntryKind::Config,
        EntryKind::Cos,
        EntryKind::DataSource,
        EntryKind::DistributionList,
        EntryKind::Domain,
        EntryKind::DynamicGroup,
        EntryKind::Identity,
        EntryKind::Right,
        EntryKind::Server,
        EntryKind::ShareLocator,
        EntryKind::UcService,
        EntryKind::Zimlet,
    ];

    /// Kinds whose name is an email address and which can carry aliases.
    pub const ADDRESSABLE: [EntryKind; 4] = [
        EntryKind::Account,
        EntryKind::CalendarResource,
        EntryKind::DistributionList,
        EntryKind::DynamicGroup,
    ];

    /// Name used as the storage bucket and in serialized entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Account => "account",
            EntryKind::CalendarResource => "calendarResource",
            EntryKind::Config => "config",
            EntryKind::Cos => "cos",
            EntryKind::DataSource => "dataSource",
            EntryKind::DistributionList => "distributionList",
            EntryKind::Domain => "domain",
            EntryKind::DynamicGroup => "dynamicGroup",
            EntryKind::Identity => "identity",
            EntryKind::Right => "right",
            EntryKind::Server => "server",
            EntryKind::ShareLocator => "shareLocator",
            EntryKind::UcService => "ucService",
            EntryKind::Zimlet => "zimlet",
        }
    }

    /// Upper-case form used in error codes (`NO_SUCH_CALENDAR_RESOURCE`).
    pub fn code_name(&self) -> &'static str {
        match self {
            EntryKind::Account => "ACCOUNT",
            EntryKind::CalendarResource => "CALENDAR_RESOURCE",
            EntryKind::Config => "CONFIG",
            EntryKind::Cos => "COS",
            EntryKind::DataSource => "DATA_SOURCE",
            EntryKind::DistributionList => "DISTRIBUTION_LIST",
            EntryKind::Domain => "DOMAIN",
            EntryKind::DynamicGroup => "DYNAMIC_GROUP",
            EntryKind::Identity => "IDENTITY",
            EntryKind::Right => "RIGHT",
            EntryKind::Server => "SERVER",
            EntryKind::ShareLocator => "SHARE_LOCATOR",
            EntryKind::UcService => "UC_SERVICE",
            EntryKind::Zimlet => "ZIMLET",
        }
    }

    /// Whether entries of this kind are named by an email address.
    pub fn is_addressable(&self) -> bool {
        Self::ADDRESSABLE.contains(self)
    }

    /// Whether entries of this kind live under an owning account.
    pub fn is_account_child(&self) -> bool {
        matches!(self, EntryKind::DataSource | EntryKind::Identity)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Account => "account",
            EntryKind::CalendarResource => "calendar resource",
            EntryKind::Config => "config",
            EntryKind::Cos => "cos",
            EntryKind::DataSource => "data source",
            EntryKind::DistributionList => "distribution list",
            EntryKind::Domain => "domain",
            EntryKind::DynamicGroup => "dynamic group",
            EntryKind::Identity => "identity",
            EntryKind::Right => "right",
            EntryKind::Server => "server",
            EntryKind::ShareLocator => "share locator",
            EntryKind::UcService => "uc service",
            EntryKind::Zimlet => "zimlet",
        };
        f.write_str(label)
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryKind::ALL
            .iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown entry kind '{}'", s))
    }
}
