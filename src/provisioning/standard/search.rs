//! Global address list and directory searches.
//!
//! Searches scan the stored entries of the requested kinds and evaluate the
//! filter in memory. Results are sorted case-insensitively on the sort
//! attribute (entries without it last) and trimmed to the requested
//! attributes.

use super::store::{domain_part, local_part, views};
use super::StandardProvisioning;
use crate::entry::{
    attrs, value, Account, CalendarResource, Domain, Entry, EntryKind,
};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::filter::{EntrySearchFilter, Filter};
use crate::provisioning::{
    EntryTypes, GalContact, GalSearchType, SearchGalResult, SearchOptions, SearchParams,
};
use crate::storage::StorageProvider;
use chrono::Utc;
use log::{debug, info};
use std::cmp::Ordering;

/// Attribute on alias pseudo-entries naming the entry the alias points to.
const ALIAS_TARGET_NAME: &str = "aliasTargetName";

/// Words a GAL query can match against: local parts, names and their words.
fn gal_tokens(entry: &Entry) -> Vec<String> {
    let mut tokens = vec![local_part(entry.name()).to_lowercase()];
    for alias in entry.get_multi(attrs::MAIL_ALIAS.name()) {
        tokens.push(local_part(&alias).to_lowercase());
    }
    for name in [
        attrs::DISPLAY_NAME.name(),
        attrs::CN.name(),
        attrs::GIVEN_NAME.name(),
        attrs::SN.name(),
    ] {
        if let Some(text) = entry.get_str(name) {
            let text = text.to_lowercase();
            tokens.extend(text.split_whitespace().map(str::to_string));
            tokens.push(text);
        }
    }
    tokens
}

/// Prefix match used by auto-complete.
fn gal_prefix_match(entry: &Entry, query: &str) -> bool {
    query.is_empty() || gal_tokens(entry).iter().any(|t| t.starts_with(query))
}

/// Substring match used by GAL search; `*` matches everything.
fn gal_substring_match(entry: &Entry, query: &str) -> bool {
    if query.is_empty() || query == "*" {
        return true;
    }
    let query = query.trim_matches('*');
    entry.name().to_lowercase().contains(query)
        || gal_tokens(entry).iter().any(|t| t.contains(query))
}

fn sort_value<'a>(entry: &'a Entry, attribute: &str) -> Option<&'a str> {
    if attribute.eq_ignore_ascii_case("name") {
        Some(entry.name())
    } else {
        entry.get_str(attribute)
    }
}

/// Sort on `attribute`, ignoring case, entries without a value last.
fn sort_entries(entries: &mut [Entry], attribute: &str, ascending: bool) {
    entries.sort_by(|a, b| {
        match (sort_value(a, attribute), sort_value(b, attribute)) {
            (Some(x), Some(y)) => {
                let order = x.to_lowercase().cmp(&y.to_lowercase());
                if ascending { order } else { order.reverse() }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Pseudo-entries for each alias of `entry`, carrying the target's id.
fn alias_entries(entry: &Entry) -> Vec<Entry> {
    entry
        .get_multi(attrs::MAIL_ALIAS.name())
        .into_iter()
        .map(|alias| {
            let mut pseudo = Entry::new(entry.kind(), entry.id(), alias.as_str());
            let own = pseudo.attrs_mut();
            own.insert("id".to_string(), vec![entry.id().to_string()]);
            own.insert(attrs::MAIL.name().to_string(), vec![alias]);
            own.insert(
                ALIAS_TARGET_NAME.to_string(),
                vec![entry.name().to_string()],
            );
            pseudo
        })
        .collect()
}

fn in_domain(entry: &Entry, domain: &str) -> bool {
    match entry.kind() {
        EntryKind::Domain => entry.name().eq_ignore_ascii_case(domain),
        kind if kind.is_addressable() => {
            domain_part(entry.name()).is_some_and(|d| d.eq_ignore_ascii_case(domain))
        }
        _ => false,
    }
}

impl<S: StorageProvider> StandardProvisioning<S> {
    pub async fn auto_complete_gal(
        &self,
        domain: &Domain,
        query: &str,
        search_type: GalSearchType,
        limit: usize,
    ) -> ProvisioningResult<SearchGalResult> {
        let query = query.trim().to_lowercase();
        debug!(
            "GAL auto-complete '{}' in {} ({:?}, limit {})",
            query,
            domain.name(),
            search_type,
            limit
        );
        let matches = self
            .gal_candidates(domain, search_type)
            .await?
            .into_iter()
            .filter(|entry| gal_prefix_match(entry, &query))
            .collect();
        Ok(self.gal_result(domain, matches, limit, None))
    }

    /// Substring search. With a token (a generalized time from an earlier
    /// result) only entries modified after it are returned.
    pub async fn search_gal(
        &self,
        domain: &Domain,
        query: &str,
        search_type: GalSearchType,
        token: Option<&str>,
    ) -> ProvisioningResult<SearchGalResult> {
        let query = query.trim().to_lowercase();
        debug!(
            "GAL search '{}' in {} ({:?}, token {:?})",
            query,
            domain.name(),
            search_type,
            token
        );
        let since = match token {
            Some(token) => Some(value::parse_generalized_time(token).ok_or_else(|| {
                ProvisioningError::invalid_request(format!("invalid GAL sync token: {}", token))
            })?),
            None => None,
        };
        let new_token = value::format_generalized_time(&Utc::now());

        let matches = self
            .gal_candidates(domain, search_type)
            .await?
            .into_iter()
            .filter(|entry| gal_substring_match(entry, &query))
            .filter(|entry| match since {
                Some(since) => entry
                    .get_generalized_time(attrs::MODIFY_TIMESTAMP.name())
                    .is_some_and(|modified| modified > since),
                None => true,
            })
            .collect();
        Ok(self.gal_result(domain, matches, 0, Some(new_token)))
    }

    async fn gal_candidates(
        &self,
        domain: &Domain,
        search_type: GalSearchType,
    ) -> ProvisioningResult<Vec<Entry>> {
        let mut candidates = Vec::new();
        for kind in EntryKind::ADDRESSABLE {
            if !search_type.includes(kind) {
                continue;
            }
            candidates.extend(
                self.lookup_in_domain(kind, domain.name())
                    .await?
                    .into_iter()
                    .filter(|entry| !entry.get(&attrs::HIDE_IN_GAL)),
            );
        }
        sort_entries(&mut candidates, "name", true);
        Ok(candidates)
    }

    /// Cap matches at `limit` (0 for none) and the domain's GAL maximum.
    fn gal_result(
        &self,
        domain: &Domain,
        matches: Vec<Entry>,
        limit: usize,
        token: Option<String>,
    ) -> SearchGalResult {
        let domain_max = usize::try_from(domain.gal_max_results())
            .ok()
            .filter(|max| *max > 0)
            .unwrap_or(self.config.gal_max_results);
        let cap = if limit == 0 {
            domain_max
        } else {
            limit.min(domain_max)
        };

        let has_more = matches.len() > cap;
        SearchGalResult {
            matches: matches
                .iter()
                .take(cap)
                .map(GalContact::from_entry)
                .collect(),
            has_more,
            token,
        }
    }

    pub async fn search_accounts(
        &self,
        filter: &str,
        params: &SearchParams,
    ) -> ProvisioningResult<Vec<Account>> {
        info!("Searching accounts with {}", filter);
        let filter = Filter::parse(filter)?;
        let found = self
            .run_search(&[EntryKind::Account], Some(&filter), None, false, params)
            .await?;
        views(found)
    }

    pub async fn search_calendar_resources(
        &self,
        filter: &EntrySearchFilter,
        params: &SearchParams,
    ) -> ProvisioningResult<Vec<CalendarResource>> {
        info!("Searching calendar resources with {}", filter.to_ldap_string());
        let filter = filter.to_filter();
        let found = self
            .run_search(
                &[EntryKind::CalendarResource],
                Some(&filter),
                None,
                false,
                params,
            )
            .await?;
        views(found)
    }

    /// Search any mix of entry types, optionally within one domain.
    pub async fn search_directory(&self, options: &SearchOptions) -> ProvisioningResult<Vec<Entry>> {
        info!(
            "Searching directory for {:?} in {:?} with {:?}",
            options.types, options.domain, options.filter
        );
        let filter = options
            .filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(Filter::parse)
            .transpose()?;
        let domain = options.domain.as_deref().map(str::to_lowercase);

        self.run_search(
            &options.types.kinds(),
            filter.as_ref(),
            domain.as_deref(),
            options.types.contains(EntryTypes::ALIASES),
            &options.params(),
        )
        .await
    }

    async fn run_search(
        &self,
        kinds: &[EntryKind],
        filter: Option<&Filter>,
        domain: Option<&str>,
        with_aliases: bool,
        params: &SearchParams,
    ) -> ProvisioningResult<Vec<Entry>> {
        let mut candidates = Vec::new();
        for kind in kinds {
            candidates.extend(self.lookup_all(*kind).await?);
        }
        if with_aliases {
            for kind in EntryKind::ADDRESSABLE {
                for entry in self.lookup_all(kind).await? {
                    candidates.extend(alias_entries(&entry));
                }
            }
        }

        let mut matched: Vec<Entry> = candidates
            .into_iter()
            .filter(|entry| domain.is_none_or(|domain| in_domain(entry, domain)))
            .filter(|entry| filter.is_none_or(|filter| filter.matches(entry)))
            .collect();

        if params.max_results > 0 && matched.len() > params.max_results {
            return Err(ProvisioningError::TooManySearchResults {
                limit: params.max_results,
            });
        }

        let sort_attr = params.sort_attr.as_deref().unwrap_or("name");
        sort_entries(&mut matched, sort_attr, params.sort_ascending);
        if let Some(keep) = &params.return_attrs {
            for entry in &mut matched {
                entry.retain_attrs(keep);
            }
        }
        debug!("Search matched {} entries", matched.len());
        Ok(matched)
    }
}
