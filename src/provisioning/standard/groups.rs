//! Distribution lists and dynamic groups.
//!
//! List members are stored as addresses in the `member` attribute. An
//! address belongs to a list when the list names it or one of the lists it
//! belongs to, directly or through any depth of nesting; cycles are cut by
//! visiting each list once.

use super::store::{domain_part, touch, view, views};
use super::StandardProvisioning;
use crate::entry::{
    attrs, Account, AttrChanges, DistributionList, Domain, DynamicGroup, Entry, EntryKind,
    MailStatus, TypedEntry,
};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::filter::Filter;
use crate::provisioning::{DistributionListMembership, EntryBy, ModifyOptions};
use crate::storage::{StorageProvider, DIRECTORY_SCOPE};
use log::{debug, info, trace};
use std::collections::{HashMap, HashSet, VecDeque};

/// Primary address and aliases of an addressable entry.
fn addresses_of(entry: &Entry) -> Vec<String> {
    let mut addresses = vec![entry.name().to_string()];
    addresses.extend(entry.get_multi(attrs::MAIL_ALIAS.name()));
    addresses
}

fn names_any(list: &Entry, addresses: &[String]) -> bool {
    list.get_multi(attrs::MEMBER.name()).iter().any(|member| {
        addresses
            .iter()
            .any(|address| member.eq_ignore_ascii_case(address))
    })
}

/// The search filter of a dynamic group's `memberURL`.
///
/// Accepts a bare filter or an LDAP URL whose last `?` part is the filter
/// (`ldap:///??sub?(mail=*)`).
pub(super) fn member_filter(member_url: &str) -> ProvisioningResult<Filter> {
    let member_url = member_url.trim();
    let filter = if member_url.to_ascii_lowercase().starts_with("ldap:") {
        member_url
            .rsplit_once('?')
            .map_or(member_url, |(_, filter)| filter)
    } else {
        member_url
    };
    Ok(Filter::parse(filter)?)
}

impl<S: StorageProvider> StandardProvisioning<S> {
    pub async fn create_distribution_list(
        &self,
        email: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<DistributionList> {
        info!("Creating distribution list '{}'", email);
        trace!("Distribution list attributes: {:?}", attrs);
        let _guard = self.write_lock.lock().await;
        let entry = self
            .insert_group(EntryKind::DistributionList, email, &attrs)
            .await?;
        view(entry)
    }

    /// Create and store a list or dynamic group. The caller holds the write lock.
    async fn insert_group(
        &self,
        kind: EntryKind,
        email: &str,
        changes: &AttrChanges,
    ) -> ProvisioningResult<Entry> {
        let address = self.checked_address(email)?;
        self.domain_for_address(&address).await?;
        self.ensure_address_free(kind, &address).await?;

        let presets = [
            (attrs::MAIL.name(), address.clone()),
            (attrs::MAIL_STATUS.name(), MailStatus::Enabled.to_string()),
        ];
        let base = Self::new_entry(kind, &address, None);
        let entry = self.prepare_entry(base, changes, &presets).await?;
        self.save(&entry).await?;
        info!("Created {} {} ({})", kind, address, entry.id());
        Ok(entry)
    }

    pub async fn get_distribution_list(
        &self,
        by: EntryBy,
    ) -> ProvisioningResult<Option<DistributionList>> {
        self.lookup(EntryKind::DistributionList, &by)
            .await?
            .map(view)
            .transpose()
    }

    pub async fn get_all_distribution_lists(
        &self,
        domain: &Domain,
    ) -> ProvisioningResult<Vec<DistributionList>> {
        views(
            self.lookup_in_domain(EntryKind::DistributionList, domain.name())
                .await?,
        )
    }

    /// Add member addresses. Addresses already on the list are skipped; a
    /// list cannot contain itself.
    pub async fn add_members(
        &self,
        list: &mut DistributionList,
        members: &[&str],
    ) -> ProvisioningResult<()> {
        info!("Adding {} members to {}", members.len(), list.name());
        trace!("New members: {:?}", members);
        let mut addresses = Vec::with_capacity(members.len());
        for member in members {
            addresses.push(self.checked_address(member)?);
        }

        let _guard = self.write_lock.lock().await;
        let current = self
            .load_existing(DIRECTORY_SCOPE, EntryKind::DistributionList, list.id())
            .await?;
        let own_addresses = addresses_of(&current);
        let existing = current.get_multi(attrs::MEMBER.name());

        let mut changes = AttrChanges::new();
        for address in addresses {
            if own_addresses
                .iter()
                .any(|own| own.eq_ignore_ascii_case(&address))
            {
                return Err(ProvisioningError::invalid_request(format!(
                    "{} cannot be a member of itself",
                    current.name()
                )));
            }
            if existing.iter().any(|m| m.eq_ignore_ascii_case(&address)) {
                debug!("{} is already a member of {}", address, current.name());
                continue;
            }
            changes.add_value(attrs::MEMBER.name(), address);
        }

        let updated = if changes.is_empty() {
            self.resolve(current).await?
        } else {
            self.modify_entry(&current, &changes, ModifyOptions::default())
                .await?
        };
        *list.entry_mut() = updated;
        Ok(())
    }

    /// Remove member addresses; each must currently be on the list.
    pub async fn remove_members(
        &self,
        list: &mut DistributionList,
        members: &[&str],
    ) -> ProvisioningResult<()> {
        info!("Removing {} members from {}", members.len(), list.name());
        let _guard = self.write_lock.lock().await;
        let current = self
            .load_existing(DIRECTORY_SCOPE, EntryKind::DistributionList, list.id())
            .await?;
        let existing = current.get_multi(attrs::MEMBER.name());

        let mut changes = AttrChanges::new();
        for member in members {
            let address = self.qualify(member);
            let Some(stored) = existing.iter().find(|m| m.eq_ignore_ascii_case(&address)) else {
                return Err(ProvisioningError::invalid_request(format!(
                    "{} is not a member of {}",
                    address,
                    current.name()
                )));
            };
            changes.remove_value(attrs::MEMBER.name(), stored.as_str());
        }

        let updated = self
            .modify_entry(&current, &changes, ModifyOptions::default())
            .await?;
        *list.entry_mut() = updated;
        Ok(())
    }

    pub async fn get_distribution_list_ids(
        &self,
        account: &Account,
    ) -> ProvisioningResult<HashSet<String>> {
        let (lists, _) = self.memberships(account.id(), false).await?;
        Ok(lists.iter().map(|list| list.id().to_string()).collect())
    }

    pub async fn get_distribution_lists(
        &self,
        account: &Account,
        direct_only: bool,
    ) -> ProvisioningResult<DistributionListMembership<DistributionList>> {
        let (lists, via) = self.memberships(account.id(), direct_only).await?;
        let mut resolved = Vec::with_capacity(lists.len());
        for list in lists {
            resolved.push(self.resolve(list).await?);
        }
        Ok(DistributionListMembership {
            lists: views(resolved)?,
            via,
        })
    }

    pub async fn in_distribution_list(
        &self,
        account: &Account,
        list_id: &str,
    ) -> ProvisioningResult<bool> {
        let (lists, _) = self.memberships(account.id(), false).await?;
        Ok(lists.iter().any(|list| list.id() == list_id))
    }

    /// Breadth-first walk from an account's addresses up through the lists
    /// that contain them.
    async fn memberships(
        &self,
        account_id: &str,
        direct_only: bool,
    ) -> ProvisioningResult<(Vec<Entry>, HashMap<String, String>)> {
        let account = self.load_account_entry(account_id).await?;
        let all_lists = self
            .list_entries(DIRECTORY_SCOPE, EntryKind::DistributionList)
            .await?;

        let mut found: Vec<Entry> = Vec::new();
        let mut via = HashMap::new();
        let mut visited = HashSet::new();
        let mut queue: VecDeque<(Vec<String>, Option<String>)> = VecDeque::new();
        queue.push_back((addresses_of(&account), None));

        while let Some((addresses, through)) = queue.pop_front() {
            for list in &all_lists {
                if visited.contains(list.id()) || !names_any(list, &addresses) {
                    continue;
                }
                visited.insert(list.id().to_string());
                if let Some(through) = &through {
                    via.insert(list.name().to_string(), through.clone());
                }
                if !direct_only {
                    queue.push_back((addresses_of(list), Some(list.name().to_string())));
                }
                found.push(list.clone());
            }
        }

        debug!(
            "{} belongs to {} lists ({} indirectly)",
            account.name(),
            found.len(),
            via.len()
        );
        Ok((found, via))
    }

    pub async fn rename_distribution_list(
        &self,
        list_id: &str,
        new_name: &str,
    ) -> ProvisioningResult<()> {
        self.rename_addressable(EntryKind::DistributionList, list_id, new_name)
            .await
    }

    pub async fn delete_distribution_list(&self, list_id: &str) -> ProvisioningResult<()> {
        self.delete_addressable(EntryKind::DistributionList, list_id)
            .await
    }

    /// Replace `old` by `new` in every list naming it as a member, or drop it
    /// when `new` is `None`. The caller holds the write lock.
    pub(super) async fn rewrite_member(
        &self,
        old: &str,
        new: Option<&str>,
    ) -> ProvisioningResult<()> {
        let lists = self
            .find_entries(
                DIRECTORY_SCOPE,
                EntryKind::DistributionList,
                "attrs.member",
                old,
            )
            .await?;

        for mut list in lists {
            let own = list.attrs_mut();
            if let Some(members) = own.get_mut(attrs::MEMBER.name()) {
                members.retain(|member| !member.eq_ignore_ascii_case(old));
                if let Some(new) = new {
                    if !members.iter().any(|m| m.eq_ignore_ascii_case(new)) {
                        members.push(new.to_string());
                    }
                }
                if members.is_empty() {
                    own.remove(attrs::MEMBER.name());
                }
            }
            touch(&mut list);
            self.save(&list).await?;
            debug!(
                "Membership of {} in {} rewritten to {:?}",
                old,
                list.name(),
                new
            );
        }
        Ok(())
    }

    pub async fn create_dynamic_group(
        &self,
        email: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<DynamicGroup> {
        info!("Creating dynamic group '{}'", email);
        trace!("Dynamic group attributes: {:?}", attrs);
        for (name, change) in attrs.iter() {
            if name.eq_ignore_ascii_case(attrs::MEMBER_URL.name()) {
                for url in change.values() {
                    member_filter(url)?;
                }
            }
        }

        let _guard = self.write_lock.lock().await;
        let entry = self
            .insert_group(EntryKind::DynamicGroup, email, &attrs)
            .await?;
        view(entry)
    }

    pub async fn get_dynamic_group(&self, by: EntryBy) -> ProvisioningResult<Option<DynamicGroup>> {
        self.lookup(EntryKind::DynamicGroup, &by)
            .await?
            .map(view)
            .transpose()
    }

    /// Accounts of the group's domain matching its `memberURL` filter.
    pub async fn get_dynamic_group_members(
        &self,
        group: &DynamicGroup,
    ) -> ProvisioningResult<Vec<Account>> {
        let Some(member_url) = group.member_url() else {
            return Ok(Vec::new());
        };
        let filter = member_filter(&member_url)?;
        let Some(domain) = domain_part(group.name()) else {
            return Ok(Vec::new());
        };

        let members: Vec<Entry> = self
            .lookup_in_domain(EntryKind::Account, domain)
            .await?
            .into_iter()
            .filter(|account| filter.matches(account))
            .collect();
        debug!("Dynamic group {} has {} members", group.name(), members.len());
        views(members)
    }

    pub async fn delete_dynamic_group(&self, group_id: &str) -> ProvisioningResult<()> {
        self.delete_addressable(EntryKind::DynamicGroup, group_id)
            .await
    }
}
