//! Selectors, options and result types of the provisioning API.

use crate::entry::{Entry, EntryKind, NamedEntry};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::BitOr;

/// Name of the identity every account implicitly has.
pub const DEFAULT_IDENTITY_NAME: &str = "DEFAULT";

/// How an entry is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBy {
    Id(String),
    /// Name of the entry. Bare names of address-named kinds are qualified
    /// with the default domain.
    Name(String),
}

impl EntryBy {
    pub fn id(id: impl Into<String>) -> Self {
        EntryBy::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        EntryBy::Name(name.into())
    }

    pub fn key(&self) -> &str {
        match self {
            EntryBy::Id(key) | EntryBy::Name(key) => key,
        }
    }
}

/// How an account is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountBy {
    Id(String),
    /// Primary address or alias.
    Name(String),
    /// System administrator name, outside of any domain.
    AdminName(String),
}

impl AccountBy {
    pub fn id(id: impl Into<String>) -> Self {
        AccountBy::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        AccountBy::Name(name.into())
    }

    pub fn admin_name(name: impl Into<String>) -> Self {
        AccountBy::AdminName(name.into())
    }

    pub fn key(&self) -> &str {
        match self {
            AccountBy::Id(key) | AccountBy::Name(key) | AccountBy::AdminName(key) => key,
        }
    }
}

impl From<EntryBy> for AccountBy {
    fn from(by: EntryBy) -> Self {
        match by {
            EntryBy::Id(id) => AccountBy::Id(id),
            EntryBy::Name(name) => AccountBy::Name(name),
        }
    }
}

/// Switches of [`crate::provisioning::Provisioning::modify_attrs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyOptions {
    /// Reject changes to immutable attributes.
    pub check_immutable: bool,
    /// Run attribute callbacks (`accountStatus`, `passwordLength`).
    pub allow_callback: bool,
}

impl Default for ModifyOptions {
    fn default() -> Self {
        Self {
            check_immutable: false,
            allow_callback: true,
        }
    }
}

impl ModifyOptions {
    /// Immutable attributes checked, callbacks run.
    pub fn checked() -> Self {
        Self {
            check_immutable: true,
            allow_callback: true,
        }
    }
}

/// Which kinds of entries a GAL query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalSearchType {
    #[default]
    All,
    Account,
    Resource,
    Group,
}

impl GalSearchType {
    pub fn includes(&self, kind: EntryKind) -> bool {
        match self {
            GalSearchType::All => kind.is_addressable(),
            GalSearchType::Account => kind == EntryKind::Account,
            GalSearchType::Resource => kind == EntryKind::CalendarResource,
            GalSearchType::Group => {
                matches!(kind, EntryKind::DistributionList | EntryKind::DynamicGroup)
            }
        }
    }
}

/// One match of a GAL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalContact {
    id: String,
    attrs: BTreeMap<String, String>,
}

impl GalContact {
    pub const FULL_NAME: &'static str = "fullName";
    pub const EMAIL: &'static str = "email";
    pub const FIRST_NAME: &'static str = "firstName";
    pub const LAST_NAME: &'static str = "lastName";
    pub const ID: &'static str = "id";

    /// Build the contact card of an addressable entry.
    pub fn from_entry(entry: &Entry) -> Self {
        let local_part = entry
            .name()
            .split_once('@')
            .map_or(entry.name(), |(local, _)| local);
        let full_name = entry
            .get_str("displayName")
            .or_else(|| entry.get_str("cn"))
            .unwrap_or(local_part);

        let mut attrs = BTreeMap::new();
        attrs.insert(Self::ID.to_string(), entry.id().to_string());
        attrs.insert(Self::EMAIL.to_string(), entry.name().to_string());
        attrs.insert(Self::FULL_NAME.to_string(), full_name.to_string());
        if let Some(first) = entry.get_str("givenName") {
            attrs.insert(Self::FIRST_NAME.to_string(), first.to_string());
        }
        if let Some(last) = entry.get_str("sn") {
            attrs.insert(Self::LAST_NAME.to_string(), last.to_string());
        }

        Self {
            id: entry.id().to_string(),
            attrs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn full_name(&self) -> Option<&str> {
        self.get(Self::FULL_NAME)
    }

    pub fn email(&self) -> Option<&str> {
        self.get(Self::EMAIL)
    }
}

/// Result of a GAL query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchGalResult {
    pub matches: Vec<GalContact>,
    /// More entries matched than were returned.
    pub has_more: bool,
    /// Generalized time of the search; pass it back to get only later changes.
    pub token: Option<String>,
}

/// Set of entry types a directory search covers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryTypes(u8);

impl EntryTypes {
    pub const ACCOUNTS: EntryTypes = EntryTypes(1);
    pub const CALENDAR_RESOURCES: EntryTypes = EntryTypes(1 << 1);
    pub const DISTRIBUTION_LISTS: EntryTypes = EntryTypes(1 << 2);
    pub const DYNAMIC_GROUPS: EntryTypes = EntryTypes(1 << 3);
    /// Every alias appears as its own result, named by the alias address.
    pub const ALIASES: EntryTypes = EntryTypes(1 << 4);
    pub const DOMAINS: EntryTypes = EntryTypes(1 << 5);
    pub const COSES: EntryTypes = EntryTypes(1 << 6);

    const NAMES: [(EntryTypes, &'static str); 7] = [
        (Self::ACCOUNTS, "accounts"),
        (Self::CALENDAR_RESOURCES, "resources"),
        (Self::DISTRIBUTION_LISTS, "distributionlists"),
        (Self::DYNAMIC_GROUPS, "dynamicgroups"),
        (Self::ALIASES, "aliases"),
        (Self::DOMAINS, "domains"),
        (Self::COSES, "coses"),
    ];

    pub const fn empty() -> Self {
        EntryTypes(0)
    }

    pub const fn all() -> Self {
        EntryTypes(0x7f)
    }

    pub fn contains(&self, other: EntryTypes) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Stored kinds these types cover (aliases live on addressable kinds).
    pub fn kinds(&self) -> Vec<EntryKind> {
        let mut kinds = Vec::new();
        let include = [
            (Self::ACCOUNTS, EntryKind::Account),
            (Self::CALENDAR_RESOURCES, EntryKind::CalendarResource),
            (Self::DISTRIBUTION_LISTS, EntryKind::DistributionList),
            (Self::DYNAMIC_GROUPS, EntryKind::DynamicGroup),
            (Self::DOMAINS, EntryKind::Domain),
            (Self::COSES, EntryKind::Cos),
        ];
        for (types, kind) in include {
            if self.contains(types) {
                kinds.push(kind);
            }
        }
        kinds
    }

    /// Parse a comma separated list such as `accounts,resources`.
    pub fn parse(list: &str) -> Option<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .try_fold(Self::empty(), |acc, name| {
                Self::NAMES
                    .iter()
                    .find(|(_, known)| known.eq_ignore_ascii_case(name))
                    .map(|(types, _)| acc | *types)
            })
    }
}

impl Default for EntryTypes {
    fn default() -> Self {
        Self::ACCOUNTS
    }
}

impl BitOr for EntryTypes {
    type Output = EntryTypes;

    fn bitor(self, rhs: EntryTypes) -> EntryTypes {
        EntryTypes(self.0 | rhs.0)
    }
}

impl fmt::Debug for EntryTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(types, _)| self.contains(*types))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "EntryTypes({})", names.join(","))
    }
}

/// Result shaping shared by the search operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Attributes kept on returned entries; `None` keeps everything.
    pub return_attrs: Option<Vec<String>>,
    /// Attribute to sort by (`name` sorts by address); `None` keeps storage order.
    pub sort_attr: Option<String>,
    pub sort_ascending: bool,
    /// 0 means unlimited.
    pub max_results: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            return_attrs: None,
            sort_attr: None,
            sort_ascending: true,
            max_results: 0,
        }
    }
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_return_attrs<I, V>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.return_attrs = Some(attrs.into_iter().map(Into::into).collect());
        self
    }

    pub fn sorted_by(mut self, attr: impl Into<String>, ascending: bool) -> Self {
        self.sort_attr = Some(attr.into());
        self.sort_ascending = ascending;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// A directory search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Restrict to addressable entries of this domain (and the domain itself).
    pub domain: Option<String>,
    /// LDAP-style filter; `None` matches everything.
    pub filter: Option<String>,
    pub types: EntryTypes,
    pub return_attrs: Option<Vec<String>>,
    pub sort_attr: Option<String>,
    pub sort_ascending: bool,
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            domain: None,
            filter: None,
            types: EntryTypes::default(),
            return_attrs: None,
            sort_attr: None,
            sort_ascending: true,
            max_results: 0,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_types(mut self, types: EntryTypes) -> Self {
        self.types = types;
        self
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.return_attrs = params.return_attrs;
        self.sort_attr = params.sort_attr;
        self.sort_ascending = params.sort_ascending;
        self.max_results = params.max_results;
        self
    }

    /// The result shaping part of the options.
    pub fn params(&self) -> SearchParams {
        SearchParams {
            return_attrs: self.return_attrs.clone(),
            sort_attr: self.sort_attr.clone(),
            sort_ascending: self.sort_ascending,
            max_results: self.max_results,
        }
    }
}

/// Lists an address belongs to, directly or through nested lists.
#[derive(Debug, Clone, Default)]
pub struct DistributionListMembership<L> {
    /// Lists in breadth-first order, direct memberships first.
    pub lists: Vec<L>,
    /// For indirect memberships: list name to the name of the member list
    /// through which the address belongs to it.
    pub via: HashMap<String, String>,
}

impl<L: NamedEntry> DistributionListMembership<L> {
    pub fn ids(&self) -> Vec<&str> {
        self.lists.iter().map(NamedEntry::id).collect()
    }

    pub fn contains(&self, list_id: &str) -> bool {
        self.lists.iter().any(|list| list.id() == list_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_types() {
        let types = EntryTypes::ACCOUNTS | EntryTypes::ALIASES;
        assert!(types.contains(EntryTypes::ACCOUNTS));
        assert!(!types.contains(EntryTypes::COSES));
        assert_eq!(types.kinds(), vec![EntryKind::Account]);
        assert_eq!(EntryTypes::default(), EntryTypes::ACCOUNTS);
        assert_eq!(
            EntryTypes::parse("accounts, Resources"),
            Some(EntryTypes::ACCOUNTS | EntryTypes::CALENDAR_RESOURCES)
        );
        assert_eq!(EntryTypes::parse("accounts,bogus"), None);
        assert_eq!(EntryTypes::all().kinds().len(), 6);
    }

    #[test]
    fn test_gal_contact() {
        let mut entry = Entry::new(EntryKind::Account, "a1", "acct-1@d.test");
        let contact = GalContact::from_entry(&entry);
        assert_eq!(contact.full_name(), Some("acct-1"));
        assert_eq!(contact.email(), Some("acct-1@d.test"));
        assert_eq!(contact.get(GalContact::ID), Some("a1"));

        let mut changes = crate::entry::AttrChanges::new();
        changes
            .set_str("displayName", "Phoebe Shao")
            .set_str("givenName", "Phoebe")
            .set_str("sn", "Shao");
        entry.apply(&changes);
        let contact = GalContact::from_entry(&entry);
        assert_eq!(contact.full_name(), Some("Phoebe Shao"));
        assert_eq!(contact.get(GalContact::FIRST_NAME), Some("Phoebe"));
        assert_eq!(contact.get(GalContact::LAST_NAME), Some("Shao"));
    }

    #[test]
    fn test_gal_search_types() {
        assert!(GalSearchType::All.includes(EntryKind::DistributionList));
        assert!(!GalSearchType::All.includes(EntryKind::Cos));
        assert!(GalSearchType::Resource.includes(EntryKind::CalendarResource));
        assert!(!GalSearchType::Account.includes(EntryKind::CalendarResource));
    }

    #[test]
    fn test_selectors() {
        assert_eq!(EntryBy::name("x").key(), "x");
        assert_eq!(AccountBy::from(EntryBy::id("1")), AccountBy::Id("1".into()));
        assert!(!ModifyOptions::default().check_immutable);
        assert!(ModifyOptions::checked().check_immutable);
    }
}
