//! String-backed attribute enums.
//!
//! Each enum reads from and writes to the exact strings declared as the
//! attribute's `enumValues`. A stored string outside that set reads back as
//! `None`.

use super::typed::{AttrType, EnumValues};
use crate::schema::AttributeType;
use std::fmt;
use std::str::FromStr;

/// Error returned when a string names no variant of an attribute enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {enum_name}")]
pub struct UnknownEnumValue {
    pub enum_name: &'static str,
    pub value: String,
}

macro_rules! attr_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownEnumValue {
                        enum_name: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl EnumValues for $name {
            const VALUES: &'static [&'static str] = &[$($text,)+];
        }

        impl AttrType for $name {
            const ATTRIBUTE_TYPE: AttributeType = AttributeType::Enum;
            type Read = Option<$name>;

            fn read(values: Option<&[String]>) -> Option<$name> {
                values
                    .and_then(|v| v.first())
                    .and_then(|v| v.parse().ok())
            }

            fn write(&self) -> Vec<String> {
                vec![self.as_str().to_string()]
            }
        }
    };
}

attr_enum! {
    /// Lifecycle state of an account.
    AccountStatus {
        Active => "active",
        Maintenance => "maintenance",
        Locked => "locked",
        Closed => "closed",
        Lockout => "lockout",
        Pending => "pending",
    }
}

attr_enum! {
    MailStatus {
        Enabled => "enabled",
        Disabled => "disabled",
    }
}

attr_enum! {
    AccountCalendarUserType {
        User => "USER",
        Resource => "RESOURCE",
    }
}

attr_enum! {
    /// Whether a calendar resource is a place or a thing.
    CalResType {
        Location => "Location",
        Equipment => "Equipment",
    }
}

attr_enum! {
    DomainStatus {
        Active => "active",
        Maintenance => "maintenance",
        Locked => "locked",
        Closed => "closed",
        Suspended => "suspended",
        Shutdown => "shutdown",
    }
}

attr_enum! {
    DomainType {
        Local => "local",
        Alias => "alias",
    }
}

attr_enum! {
    /// Where global address list searches look.
    GalMode {
        Internal => "zimbra",
        Ldap => "ldap",
        Both => "both",
    }
}

attr_enum! {
    DataSourceType {
        Pop3 => "pop3",
        Imap => "imap",
        Caldav => "caldav",
        Rss => "rss",
        Gal => "gal",
        Cal => "cal",
    }
}

attr_enum! {
    DataSourceConnectionType {
        Cleartext => "cleartext",
        Ssl => "ssl",
        Tls => "tls",
        TlsIfAvailable => "tls_if_available",
    }
}

attr_enum! {
    RightType {
        Preset => "preset",
        GetAttrs => "getAttrs",
        SetAttrs => "setAttrs",
        Combo => "combo",
    }
}

attr_enum! {
    /// Entries a right can be granted on.
    RightTargetType {
        Account => "account",
        CalResource => "calresource",
        Cos => "cos",
        DistributionList => "dl",
        Group => "group",
        Domain => "domain",
        Server => "server",
        UcService => "ucservice",
        Zimlet => "zimlet",
        Config => "config",
        Global => "global",
    }
}

attr_enum! {
    SubscriptionPolicy {
        Accept => "ACCEPT",
        Reject => "REJECT",
        Approval => "APPROVAL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("maintenance".parse::<AccountStatus>(), Ok(AccountStatus::Maintenance));
        assert_eq!(DataSourceConnectionType::TlsIfAvailable.to_string(), "tls_if_available");
        let err = "Active".parse::<AccountStatus>().unwrap_err();
        assert_eq!(err.enum_name, "AccountStatus");
    }

    #[test]
    fn test_unknown_stored_value_reads_as_none() {
        let stored = vec!["archived".to_string()];
        assert_eq!(AccountStatus::read(Some(&stored)), None);
        assert_eq!(AccountStatus::read(None), None);
        let stored = vec!["closed".to_string()];
        assert_eq!(AccountStatus::read(Some(&stored)), Some(AccountStatus::Closed));
    }
}
