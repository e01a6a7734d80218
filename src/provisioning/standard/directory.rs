//! Global entries: config, classes of service, domains, servers, zimlets,
//! UC services, share locators, rights and the mime registry.

use super::store::{domain_part, touch, view, views, CONFIG_ID};
use super::StandardProvisioning;
use crate::entry::{
    attrs, AttrChanges, Config, Cos, Domain, EntryKind, Right, Server, ShareLocator, UcService,
    Zimlet,
};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::mime::{lookup_by_extension, lookup_by_type};
use crate::provisioning::{EntryBy, MimeTypeInfo};
use crate::storage::{StorageProvider, DIRECTORY_SCOPE};
use log::{debug, info, trace};

impl<S: StorageProvider> StandardProvisioning<S> {
    pub async fn health_check(&self) -> ProvisioningResult<()> {
        let scopes = self
            .storage
            .list_scopes()
            .await
            .map_err(|e| ProvisioningError::storage("list_scopes", e))?;
        debug!("Health check: {} scopes", scopes.len());
        Ok(())
    }

    pub async fn get_config(&self) -> ProvisioningResult<Config> {
        let entry = self
            .load_existing(DIRECTORY_SCOPE, EntryKind::Config, CONFIG_ID)
            .await?;
        view(self.resolve(entry).await?)
    }

    pub async fn create_cos(&self, name: &str, attrs: AttrChanges) -> ProvisioningResult<Cos> {
        info!("Creating cos '{}'", name);
        trace!("Cos attributes: {:?}", attrs);
        let _guard = self.write_lock.lock().await;
        let entry = self.insert_named(EntryKind::Cos, name, &attrs, &[]).await?;
        view(entry)
    }

    pub async fn get_cos(&self, by: EntryBy) -> ProvisioningResult<Option<Cos>> {
        self.lookup(EntryKind::Cos, &by).await?.map(view).transpose()
    }

    pub async fn get_all_cos(&self) -> ProvisioningResult<Vec<Cos>> {
        views(self.lookup_all(EntryKind::Cos).await?)
    }

    pub async fn rename_cos(&self, cos_id: &str, new_name: &str) -> ProvisioningResult<()> {
        info!("Renaming cos {} to '{}'", cos_id, new_name);
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ProvisioningError::invalid_request("cos name cannot be empty"));
        }

        let _guard = self.write_lock.lock().await;
        let mut cos = self
            .load_existing(DIRECTORY_SCOPE, EntryKind::Cos, cos_id)
            .await?;
        if cos.name() == new_name {
            return Ok(());
        }
        if cos.name() == self.config.default_cos_name {
            return Err(ProvisioningError::invalid_request(
                "the default cos cannot be renamed",
            ));
        }
        if let Some(other) = self
            .find_by_name(DIRECTORY_SCOPE, EntryKind::Cos, new_name)
            .await?
        {
            if other.id() != cos_id {
                return Err(ProvisioningError::exists(EntryKind::Cos, new_name));
            }
        }

        cos.set_name(new_name);
        cos.attrs_mut()
            .insert(attrs::CN.name().to_string(), vec![new_name.to_string()]);
        touch(&mut cos);
        self.save(&cos).await
    }

    pub async fn delete_cos(&self, cos_id: &str) -> ProvisioningResult<()> {
        info!("Deleting cos {}", cos_id);
        let _guard = self.write_lock.lock().await;
        let cos = self
            .load_existing(DIRECTORY_SCOPE, EntryKind::Cos, cos_id)
            .await?;
        if cos.name() == self.config.default_cos_name {
            return Err(ProvisioningError::invalid_request(
                "the default cos cannot be deleted",
            ));
        }
        self.remove(&cos).await
    }

    pub async fn create_domain(&self, name: &str, attrs: AttrChanges) -> ProvisioningResult<Domain> {
        let name = name.trim().to_lowercase();
        info!("Creating domain '{}'", name);
        trace!("Domain attributes: {:?}", attrs);
        if name.contains('@') || !name.contains('.') {
            return Err(ProvisioningError::invalid_request(format!(
                "invalid domain name: {}",
                name
            )));
        }

        let _guard = self.write_lock.lock().await;
        let entry = self
            .insert_named(EntryKind::Domain, &name, &attrs, &[])
            .await?;
        view(entry)
    }

    pub async fn get_domain(&self, by: EntryBy) -> ProvisioningResult<Option<Domain>> {
        let by = match by {
            EntryBy::Name(name) => EntryBy::Name(name.trim().to_lowercase()),
            other => other,
        };
        self.lookup(EntryKind::Domain, &by).await?.map(view).transpose()
    }

    pub async fn get_all_domains(&self) -> ProvisioningResult<Vec<Domain>> {
        views(self.lookup_all(EntryKind::Domain).await?)
    }

    pub async fn delete_domain(&self, domain_id: &str) -> ProvisioningResult<()> {
        info!("Deleting domain {}", domain_id);
        let _guard = self.write_lock.lock().await;
        let domain = self
            .load_existing(DIRECTORY_SCOPE, EntryKind::Domain, domain_id)
            .await?;

        let in_domain =
            |address: &str| domain_part(address).is_some_and(|d| d.eq_ignore_ascii_case(domain.name()));
        for kind in EntryKind::ADDRESSABLE {
            let occupied = self
                .list_entries(DIRECTORY_SCOPE, kind)
                .await?
                .iter()
                .any(|entry| {
                    in_domain(entry.name())
                        || entry
                            .get_multi(attrs::MAIL_ALIAS.name())
                            .iter()
                            .any(|alias| in_domain(alias))
                });
            if occupied {
                return Err(ProvisioningError::DomainNotEmpty {
                    name: domain.name().to_string(),
                });
            }
        }
        self.remove(&domain).await
    }

    pub async fn get_mime_types(&self, mime_type: &str) -> ProvisioningResult<Vec<MimeTypeInfo>> {
        debug!("Looking up mime handlers for '{}'", mime_type);
        Ok(lookup_by_type(mime_type))
    }

    pub async fn get_mime_types_by_extension(
        &self,
        extension: &str,
    ) -> ProvisioningResult<Vec<MimeTypeInfo>> {
        debug!("Looking up mime handlers for extension '{}'", extension);
        Ok(lookup_by_extension(extension))
    }

    pub async fn create_server(&self, name: &str, attrs: AttrChanges) -> ProvisioningResult<Server> {
        info!("Creating server '{}'", name);
        trace!("Server attributes: {:?}", attrs);
        let _guard = self.write_lock.lock().await;
        let entry = self
            .insert_named(
                EntryKind::Server,
                name,
                &attrs,
                &[(attrs::SERVICE_HOSTNAME.name(), name.trim().to_string())],
            )
            .await?;
        view(entry)
    }

    pub async fn get_server(&self, by: EntryBy) -> ProvisioningResult<Option<Server>> {
        self.lookup(EntryKind::Server, &by).await?.map(view).transpose()
    }

    pub async fn get_local_server(&self) -> ProvisioningResult<Server> {
        let name = &self.config.local_server_name;
        self.lookup(EntryKind::Server, &EntryBy::name(name.as_str()))
            .await?
            .ok_or_else(|| ProvisioningError::no_such(EntryKind::Server, name.as_str()))
            .and_then(view)
    }

    pub async fn get_all_servers(&self, service: Option<&str>) -> ProvisioningResult<Vec<Server>> {
        let servers: Vec<Server> = views(self.lookup_all(EntryKind::Server).await?)?;
        Ok(match service {
            Some(service) => servers
                .into_iter()
                .filter(|server| server.has_service(service))
                .collect(),
            None => servers,
        })
    }

    pub async fn delete_server(&self, server_id: &str) -> ProvisioningResult<()> {
        info!("Deleting server {}", server_id);
        let _guard = self.write_lock.lock().await;
        let server = self
            .load_existing(DIRECTORY_SCOPE, EntryKind::Server, server_id)
            .await?;
        if server.name() == self.config.local_server_name {
            return Err(ProvisioningError::invalid_request(
                "the local server cannot be deleted",
            ));
        }
        self.remove(&server).await
    }

    pub async fn create_zimlet(&self, name: &str, attrs: AttrChanges) -> ProvisioningResult<Zimlet> {
        info!("Creating zimlet '{}'", name);
        let _guard = self.write_lock.lock().await;
        let entry = self
            .insert_named(EntryKind::Zimlet, name, &attrs, &[])
            .await?;
        view(entry)
    }

    pub async fn get_zimlet(&self, name: &str) -> ProvisioningResult<Option<Zimlet>> {
        self.lookup(EntryKind::Zimlet, &EntryBy::name(name))
            .await?
            .map(view)
            .transpose()
    }

    pub async fn list_all_zimlets(&self) -> ProvisioningResult<Vec<Zimlet>> {
        views(self.lookup_all(EntryKind::Zimlet).await?)
    }

    /// Zimlets that are enabled, in priority order.
    pub async fn get_object_types(&self) -> ProvisioningResult<Vec<Zimlet>> {
        let mut enabled: Vec<Zimlet> = self
            .list_all_zimlets()
            .await?
            .into_iter()
            .filter(Zimlet::is_enabled)
            .collect();
        enabled.sort_by_key(|zimlet| zimlet.priority());
        Ok(enabled)
    }

    pub async fn delete_zimlet(&self, name: &str) -> ProvisioningResult<()> {
        info!("Deleting zimlet '{}'", name);
        let _guard = self.write_lock.lock().await;
        let zimlet = self
            .find_by_name(DIRECTORY_SCOPE, EntryKind::Zimlet, name)
            .await?
            .ok_or_else(|| ProvisioningError::no_such(EntryKind::Zimlet, name))?;
        self.remove(&zimlet).await
    }

    pub async fn create_uc_service(
        &self,
        name: &str,
        attrs: AttrChanges,
    ) -> ProvisioningResult<UcService> {
        info!("Creating UC service '{}'", name);
        let _guard = self.write_lock.lock().await;
        let entry = self
            .insert_named(EntryKind::UcService, name, &attrs, &[])
            .await?;
        view(entry)
    }

    pub async fn get_uc_service(&self, by: EntryBy) -> ProvisioningResult<Option<UcService>> {
        self.lookup(EntryKind::UcService, &by)
            .await?
            .map(view)
            .transpose()
    }

    pub async fn get_all_uc_services(&self) -> ProvisioningResult<Vec<UcService>> {
        views(self.lookup_all(EntryKind::UcService).await?)
    }

    pub async fn delete_uc_service(&self, service_id: &str) -> ProvisioningResult<()> {
        info!("Deleting UC service {}", service_id);
        let _guard = self.write_lock.lock().await;
        self.delete_top_level(EntryKind::UcService, service_id)
            .await
            .map(|_| ())
    }

    /// Share locators are keyed by the id the caller assigns.
    pub async fn create_share_locator(
        &self,
        id: &str,
        owner_account_id: &str,
    ) -> ProvisioningResult<ShareLocator> {
        info!("Creating share locator {} owned by {}", id, owner_account_id);
        let id = id.trim();
        if id.is_empty() {
            return Err(ProvisioningError::invalid_request(
                "share locator id cannot be empty",
            ));
        }

        let _guard = self.write_lock.lock().await;
        if self
            .load(DIRECTORY_SCOPE, EntryKind::ShareLocator, id)
            .await?
            .is_some()
        {
            return Err(ProvisioningError::exists(EntryKind::ShareLocator, id));
        }
        let mut changes = AttrChanges::new();
        changes.set(&attrs::SHARE_OWNER_ACCOUNT_ID, owner_account_id);
        let base = Self::new_entry_with_id(EntryKind::ShareLocator, id, id, None);
        let entry = self.prepare_entry(base, &changes, &[]).await?;
        self.save(&entry).await?;
        view(entry)
    }

    pub async fn get_share_locator(&self, id: &str) -> ProvisioningResult<Option<ShareLocator>> {
        self.lookup(EntryKind::ShareLocator, &EntryBy::id(id))
            .await?
            .map(view)
            .transpose()
    }

    pub async fn delete_share_locator(&self, id: &str) -> ProvisioningResult<()> {
        info!("Deleting share locator {}", id);
        let _guard = self.write_lock.lock().await;
        self.delete_top_level(EntryKind::ShareLocator, id)
            .await
            .map(|_| ())
    }

    pub async fn get_right(&self, name: &str) -> ProvisioningResult<Option<Right>> {
        self.lookup(EntryKind::Right, &EntryBy::name(name))
            .await?
            .map(view)
            .transpose()
    }

    pub async fn get_all_rights(&self) -> ProvisioningResult<Vec<Right>> {
        views(self.lookup_all(EntryKind::Right).await?)
    }
}
