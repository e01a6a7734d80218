//! Attribute callbacks.
//!
//! A schema attribute may name a callback. When a change set touches that
//! attribute, the callback runs once on the resulting entry before it is
//! stored, and may adjust it or reject the change.

use crate::entry::{attrs, AccountStatus, Entry, EntryKind, MailStatus};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::schema::AttributeRegistry;
use log::debug;

const ACCOUNT_STATUS: &str = "accountStatus";
const PASSWORD_LENGTH: &str = "passwordLength";

/// Run the callbacks bound to the `changed` attributes against `entry`.
pub(super) fn run_callbacks<'a>(
    registry: &AttributeRegistry,
    changed: impl IntoIterator<Item = &'a str>,
    entry: &mut Entry,
) -> ProvisioningResult<()> {
    let mut ran: Vec<&str> = Vec::new();
    for name in changed {
        let Some(callback) = registry.get(name).and_then(|d| d.callback.as_deref()) else {
            continue;
        };
        if ran.contains(&callback) {
            continue;
        }
        ran.push(callback);

        match callback {
            ACCOUNT_STATUS => account_status(entry),
            PASSWORD_LENGTH => password_length(entry)?,
            other => debug!("No handler for attribute callback '{}'", other),
        }
    }
    Ok(())
}

/// Keep `mailStatus` in step with `accountStatus`.
fn account_status(entry: &mut Entry) {
    if !matches!(
        entry.kind(),
        EntryKind::Account | EntryKind::CalendarResource
    ) {
        return;
    }
    let Some(status) = entry.get(&attrs::ACCOUNT_STATUS) else {
        return;
    };
    let mail_status = if status == AccountStatus::Closed {
        MailStatus::Disabled
    } else {
        MailStatus::Enabled
    };
    debug!(
        "accountStatus of {} is {}, mailStatus set to {}",
        entry.name(),
        status,
        mail_status
    );
    entry.attrs_mut().insert(
        attrs::MAIL_STATUS.name().to_string(),
        vec![mail_status.as_str().to_string()],
    );
}

/// Reject a minimum password length above the maximum.
fn password_length(entry: &Entry) -> ProvisioningResult<()> {
    let min = entry.get(&attrs::PASSWORD_MIN_LENGTH);
    let max = entry.get(&attrs::PASSWORD_MAX_LENGTH);
    if min >= 0 && max > 0 && min > max {
        return Err(ProvisioningError::invalid_request(format!(
            "passwordMinLength ({}) must not exceed passwordMaxLength ({})",
            min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AttrChanges;

    fn registry() -> AttributeRegistry {
        AttributeRegistry::new().unwrap()
    }

    fn account(changes: &AttrChanges) -> Entry {
        let mut entry = Entry::new(EntryKind::Account, "a1", "a@d.test");
        entry.apply(changes);
        entry
    }

    #[test]
    fn test_closed_account_disables_mail() {
        let mut changes = AttrChanges::new();
        changes.set(&attrs::ACCOUNT_STATUS, AccountStatus::Closed);
        let mut entry = account(&changes);

        run_callbacks(&registry(), ["accountStatus"], &mut entry).unwrap();
        assert_eq!(entry.get(&attrs::MAIL_STATUS), Some(MailStatus::Disabled));

        let mut changes = AttrChanges::new();
        changes.set(&attrs::ACCOUNT_STATUS, AccountStatus::Maintenance);
        entry.apply(&changes);
        run_callbacks(&registry(), ["accountStatus"], &mut entry).unwrap();
        assert_eq!(entry.get(&attrs::MAIL_STATUS), Some(MailStatus::Enabled));
    }

    #[test]
    fn test_password_length_bounds() {
        let mut changes = AttrChanges::new();
        changes
            .set(&attrs::PASSWORD_MIN_LENGTH, 10)
            .set(&attrs::PASSWORD_MAX_LENGTH, 8);
        let mut entry = account(&changes);
        let error = run_callbacks(&registry(), ["passwordMinLength"], &mut entry).unwrap_err();
        assert!(error.to_string().contains("passwordMinLength"));

        let mut changes = AttrChanges::new();
        changes.set(&attrs::PASSWORD_MAX_LENGTH, 12);
        entry.apply(&changes);
        assert!(run_callbacks(&registry(), ["passwordMaxLength"], &mut entry).is_ok());
    }

    #[test]
    fn test_attributes_without_callback_are_ignored() {
        let mut entry = account(&AttrChanges::new());
        assert!(run_callbacks(&registry(), ["displayName", "unknownAttr"], &mut entry).is_ok());
        assert!(entry.attrs().is_empty());
    }
}
