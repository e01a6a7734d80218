//! Embedded attribute schema.
//!
//! The directory's attribute table ships inside the library as a JSON string so
//! that a registry can be built without any schema files on disk.

/// Returns the core attribute schema as a JSON string.
pub fn core_attribute_schema() -> &'static str {
    r#"{
  "id": "urn:dirprov:schemas:core:1.0:Attributes",
  "name": "Attributes",
  "description": "Core directory attributes",
  "attributes": [
    {"name": "id", "type": "id", "immutable": true, "description": "unique entry id", "appliesTo": ["account", "calendarResource", "config", "cos", "dataSource", "distributionList", "domain", "dynamicGroup", "identity", "right", "server", "shareLocator", "ucService", "zimlet"]},
    {"name": "cn", "type": "string", "description": "common name", "appliesTo": ["account", "calendarResource", "config", "cos", "dataSource", "distributionList", "domain", "dynamicGroup", "identity", "right", "server", "shareLocator", "ucService", "zimlet"]},
    {"name": "description", "type": "string", "description": "descriptive information", "appliesTo": ["account", "calendarResource", "config", "cos", "dataSource", "distributionList", "domain", "dynamicGroup", "identity", "right", "server", "shareLocator", "ucService", "zimlet"]},
    {"name": "createTimestamp", "type": "generalizedTime", "immutable": true, "description": "when the entry was created", "appliesTo": ["account", "calendarResource", "config", "cos", "dataSource", "distributionList", "domain", "dynamicGroup", "identity", "right", "server", "shareLocator", "ucService", "zimlet"]},
    {"name": "modifyTimestamp", "type": "generalizedTime", "immutable": true, "description": "when the entry was last modified", "appliesTo": ["account", "calendarResource", "config", "cos", "dataSource", "distributionList", "domain", "dynamicGroup", "identity", "right", "server", "shareLocator", "ucService", "zimlet"]},
    {"name": "ace", "type": "string", "multiValued": true, "description": "access control entries", "appliesTo": ["account", "calendarResource", "config", "cos", "distributionList", "domain", "dynamicGroup", "right", "server", "ucService", "zimlet"]},

    {"name": "displayName", "type": "string", "description": "name shown to users", "appliesTo": ["account", "calendarResource", "distributionList", "dynamicGroup"]},
    {"name": "givenName", "type": "string", "description": "first name", "appliesTo": ["account", "calendarResource"]},
    {"name": "sn", "type": "string", "description": "surname", "appliesTo": ["account", "calendarResource"]},
    {"name": "uid", "type": "string", "description": "local part of the primary address", "appliesTo": ["account", "calendarResource"]},
    {"name": "mail", "type": "address", "description": "primary email address", "appliesTo": ["account", "calendarResource", "distributionList", "dynamicGroup"]},
    {"name": "mailDeliveryAddress", "type": "address", "description": "address mail is delivered to", "appliesTo": ["account", "calendarResource"]},
    {"name": "mailAlias", "type": "address", "multiValued": true, "description": "alias addresses", "appliesTo": ["account", "calendarResource", "distributionList", "dynamicGroup"]},
    {"name": "userPassword", "type": "string", "description": "salted password hash", "appliesTo": ["account", "calendarResource"]},
    {"name": "passwordModifiedTime", "type": "generalizedTime", "description": "when the password last changed", "appliesTo": ["account", "calendarResource"]},
    {"name": "cosId", "type": "id", "description": "class of service the account belongs to", "appliesTo": ["account", "calendarResource"]},
    {"name": "accountStatus", "type": "enum", "enumValues": ["active", "maintenance", "locked", "closed", "lockout", "pending"], "defaultValue": ["active"], "callback": "accountStatus", "description": "account state", "appliesTo": ["account", "calendarResource"]},
    {"name": "mailStatus", "type": "enum", "enumValues": ["enabled", "disabled"], "defaultValue": ["enabled"], "description": "whether mail is accepted", "appliesTo": ["account", "calendarResource", "distributionList", "dynamicGroup"]},
    {"name": "isAdminAccount", "type": "boolean", "defaultValue": ["FALSE"], "description": "global administrator", "appliesTo": ["account", "calendarResource"]},
    {"name": "mailHost", "type": "string", "description": "server hosting the mailbox", "appliesTo": ["account", "calendarResource"]},
    {"name": "accountCalendarUserType", "type": "enum", "enumValues": ["USER", "RESOURCE"], "defaultValue": ["USER"], "description": "calendar user type", "appliesTo": ["account", "calendarResource"]},
    {"name": "locale", "type": "string", "description": "preferred locale", "appliesTo": ["account", "calendarResource", "config", "cos", "domain", "server"]},
    {"name": "hideInGal", "type": "boolean", "defaultValue": ["FALSE"], "description": "hide from the global address list", "appliesTo": ["account", "calendarResource", "distributionList", "dynamicGroup"]},
    {"name": "ucServiceId", "type": "id", "description": "unified communication service", "appliesTo": ["account", "cos", "domain"]},
    {"name": "mailQuota", "type": "long", "min": 0, "defaultValue": ["0"], "description": "mailbox quota in bytes, 0 is unlimited", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "prefBccAddress", "type": "string", "description": "bcc address for outgoing mail", "appliesTo": ["account", "identity"]},
    {"name": "prefFromAddress", "type": "address", "description": "from address for outgoing mail", "appliesTo": ["account", "identity"]},
    {"name": "prefFromDisplay", "type": "string", "description": "from display name for outgoing mail", "appliesTo": ["account", "identity"]},
    {"name": "prefReplyToAddress", "type": "address", "description": "reply-to address for outgoing mail", "appliesTo": ["account", "identity"]},
    {"name": "prefIdentityName", "type": "string", "description": "identity display name", "appliesTo": ["account", "identity"]},

    {"name": "passwordMinLength", "type": "integer", "min": 0, "defaultValue": ["6"], "callback": "passwordLength", "description": "minimum password length", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "passwordMaxLength", "type": "integer", "min": 0, "defaultValue": ["64"], "callback": "passwordLength", "description": "maximum password length", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "passwordMinUpperCaseChars", "type": "integer", "min": 0, "defaultValue": ["0"], "description": "minimum upper case characters", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "passwordMinLowerCaseChars", "type": "integer", "min": 0, "defaultValue": ["0"], "description": "minimum lower case characters", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "passwordMinNumericChars", "type": "integer", "min": 0, "defaultValue": ["0"], "description": "minimum numeric characters", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "passwordMinPunctuationChars", "type": "integer", "min": 0, "defaultValue": ["0"], "description": "minimum punctuation characters", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "passwordLocked", "type": "boolean", "defaultValue": ["FALSE"], "description": "user may not change the password", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "adminAuthTokenLifetime", "type": "duration", "defaultValue": ["12h"], "description": "lifetime of admin auth tokens", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "authTokenLifetime", "type": "duration", "defaultValue": ["2d"], "description": "lifetime of auth tokens", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "mailMessageLifetime", "type": "duration", "defaultValue": ["0"], "description": "retention of messages, 0 keeps forever", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "featureGalEnabled", "type": "boolean", "defaultValue": ["TRUE"], "description": "global address list search", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "featureGalAutoCompleteEnabled", "type": "boolean", "defaultValue": ["TRUE"], "description": "global address list auto-complete", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "allowAnyFromAddress", "type": "boolean", "defaultValue": ["FALSE"], "description": "any from address may be used", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "adminSavedSearches", "type": "string", "multiValued": true, "description": "saved admin searches", "appliesTo": ["account", "calendarResource", "cos"]},
    {"name": "lastLogonTimestampFrequency", "type": "duration", "defaultValue": ["7d"], "description": "how often the last logon time is recorded", "appliesTo": ["account", "calendarResource", "config", "cos"]},

    {"name": "calResType", "type": "enum", "enumValues": ["Location", "Equipment"], "description": "kind of calendar resource", "appliesTo": ["calendarResource"]},
    {"name": "calResCapacity", "type": "integer", "min": 0, "description": "number of seats", "appliesTo": ["calendarResource"]},
    {"name": "calResBuilding", "type": "string", "description": "building", "appliesTo": ["calendarResource"]},
    {"name": "calResFloor", "type": "string", "description": "floor", "appliesTo": ["calendarResource"]},
    {"name": "calResRoom", "type": "string", "description": "room", "appliesTo": ["calendarResource"]},
    {"name": "calResSite", "type": "string", "description": "site", "appliesTo": ["calendarResource"]},
    {"name": "calResContactName", "type": "string", "description": "contact name", "appliesTo": ["calendarResource"]},
    {"name": "calResContactEmail", "type": "address", "description": "contact email", "appliesTo": ["calendarResource"]},
    {"name": "calResContactPhone", "type": "string", "description": "contact phone", "appliesTo": ["calendarResource"]},
    {"name": "calResLocationDisplayName", "type": "string", "description": "location shown to users", "appliesTo": ["calendarResource"]},
    {"name": "calResAutoAcceptDecline", "type": "boolean", "defaultValue": ["TRUE"], "description": "answer invitations automatically", "appliesTo": ["calendarResource"]},

    {"name": "preAuthKey", "type": "string", "description": "shared key for pre-authentication", "appliesTo": ["domain"]},
    {"name": "domainStatus", "type": "enum", "enumValues": ["active", "maintenance", "locked", "closed", "suspended", "shutdown"], "defaultValue": ["active"], "description": "domain state", "appliesTo": ["domain"]},
    {"name": "domainType", "type": "enum", "enumValues": ["local", "alias"], "defaultValue": ["local"], "description": "local or alias domain", "appliesTo": ["domain"]},
    {"name": "domainDefaultCosId", "type": "id", "description": "class of service for accounts without one", "appliesTo": ["domain"]},
    {"name": "virtualHostname", "type": "string", "multiValued": true, "description": "virtual host names", "appliesTo": ["domain"]},
    {"name": "galMode", "type": "enum", "enumValues": ["zimbra", "ldap", "both"], "defaultValue": ["zimbra"], "description": "global address list source", "appliesTo": ["config", "domain"]},
    {"name": "galMaxResults", "type": "integer", "min": 1, "defaultValue": ["100"], "description": "maximum global address list results", "appliesTo": ["config", "domain"]},
    {"name": "publicServiceHostname", "type": "string", "description": "public host name", "appliesTo": ["config", "domain"]},
    {"name": "smtpHostname", "type": "string", "multiValued": true, "description": "outbound smtp hosts", "appliesTo": ["config", "domain", "server"]},

    {"name": "serviceHostname", "type": "string", "description": "host name of the server", "appliesTo": ["server"]},
    {"name": "serviceEnabled", "type": "string", "multiValued": true, "description": "services running on the server", "appliesTo": ["server"]},
    {"name": "serviceInstalled", "type": "string", "multiValued": true, "description": "services installed on the server", "appliesTo": ["server"]},
    {"name": "mailPort", "type": "integer", "min": 1, "max": 65535, "defaultValue": ["8080"], "description": "http port", "appliesTo": ["config", "server"]},
    {"name": "lmtpNumThreads", "type": "integer", "min": 1, "defaultValue": ["20"], "description": "lmtp worker threads", "appliesTo": ["config", "server"]},
    {"name": "mtaMaxMessageSize", "type": "long", "min": 0, "defaultValue": ["10240000"], "description": "largest accepted message", "appliesTo": ["config", "server"]},

    {"name": "defaultDomainName", "type": "string", "description": "domain used to qualify bare names", "appliesTo": ["config"]},

    {"name": "zimletVersion", "type": "string", "description": "zimlet version", "appliesTo": ["zimlet"]},
    {"name": "zimletEnabled", "type": "boolean", "defaultValue": ["TRUE"], "description": "zimlet is enabled", "appliesTo": ["zimlet"]},
    {"name": "zimletPriority", "type": "integer", "min": 0, "description": "zimlet priority", "appliesTo": ["zimlet"]},
    {"name": "zimletIsExtension", "type": "boolean", "defaultValue": ["FALSE"], "description": "zimlet is a server extension", "appliesTo": ["zimlet"]},
    {"name": "zimletKeyword", "type": "string", "description": "keyword that activates the zimlet", "appliesTo": ["zimlet"]},

    {"name": "member", "type": "address", "multiValued": true, "description": "member addresses", "appliesTo": ["distributionList"]},
    {"name": "distributionListSubscriptionPolicy", "type": "enum", "enumValues": ["ACCEPT", "REJECT", "APPROVAL"], "defaultValue": ["REJECT"], "description": "subscription requests", "appliesTo": ["distributionList"]},

    {"name": "memberURL", "type": "string", "description": "search url that defines membership", "appliesTo": ["dynamicGroup"]},
    {"name": "isACLGroup", "type": "boolean", "defaultValue": ["TRUE"], "description": "group may be used in grants", "appliesTo": ["dynamicGroup"]},

    {"name": "dataSourceType", "type": "enum", "enumValues": ["pop3", "imap", "caldav", "rss", "gal", "cal"], "immutable": true, "description": "protocol of the data source", "appliesTo": ["dataSource"]},
    {"name": "dataSourceEnabled", "type": "boolean", "defaultValue": ["FALSE"], "description": "data source is polled", "appliesTo": ["dataSource"]},
    {"name": "dataSourceConnectionType", "type": "enum", "enumValues": ["cleartext", "ssl", "tls", "tls_if_available"], "defaultValue": ["cleartext"], "description": "transport security", "appliesTo": ["dataSource"]},
    {"name": "dataSourceFolderId", "type": "string", "description": "folder receiving imported items", "appliesTo": ["dataSource"]},
    {"name": "dataSourceHost", "type": "string", "description": "remote host", "appliesTo": ["dataSource"]},
    {"name": "dataSourcePort", "type": "integer", "min": 1, "max": 65535, "description": "remote port", "appliesTo": ["dataSource"]},
    {"name": "dataSourceUsername", "type": "string", "description": "remote user", "appliesTo": ["dataSource"]},
    {"name": "dataSourcePassword", "type": "string", "description": "remote password", "appliesTo": ["dataSource"]},
    {"name": "dataSourceLeaveOnServer", "type": "boolean", "defaultValue": ["TRUE"], "description": "keep messages on the remote server", "appliesTo": ["dataSource"]},
    {"name": "dataSourcePollingInterval", "type": "duration", "description": "how often the source is polled", "appliesTo": ["dataSource"]},
    {"name": "dataSourceEmailAddress", "type": "address", "description": "address of the remote mailbox", "appliesTo": ["dataSource"]},

    {"name": "rightType", "type": "enum", "enumValues": ["preset", "getAttrs", "setAttrs", "combo"], "description": "kind of right", "appliesTo": ["right"]},
    {"name": "rightTargetType", "type": "enum", "multiValued": true, "enumValues": ["account", "calresource", "cos", "dl", "group", "domain", "server", "ucservice", "zimlet", "config", "global"], "description": "entries the right can be granted on", "appliesTo": ["right"]},
    {"name": "rightAttrs", "type": "string", "multiValued": true, "description": "attributes covered by an attribute right", "appliesTo": ["right"]},
    {"name": "rightRights", "type": "string", "multiValued": true, "description": "rights contained in a combo right", "appliesTo": ["right"]},

    {"name": "ucAdminUrl", "type": "string", "description": "administration url", "appliesTo": ["ucService"]},
    {"name": "ucAdminUser", "type": "string", "description": "administration user", "appliesTo": ["ucService"]},
    {"name": "ucAdminPassword", "type": "string", "description": "administration password", "appliesTo": ["ucService"]},
    {"name": "ucCallControlUrl", "type": "string", "description": "call control url", "appliesTo": ["ucService"]},
    {"name": "ucCallLogUrl", "type": "string", "description": "call log url", "appliesTo": ["ucService"]},
    {"name": "ucVideoUrl", "type": "string", "description": "video url", "appliesTo": ["ucService"]},
    {"name": "ucVoicemailUrl", "type": "string", "description": "voicemail url", "appliesTo": ["ucService"]},
    {"name": "ucProviderClass", "type": "string", "description": "provider implementation", "appliesTo": ["ucService"]},

    {"name": "shareOwnerAccountId", "type": "id", "description": "account that owns the share", "appliesTo": ["shareLocator"]}
  ]
}"#
}
