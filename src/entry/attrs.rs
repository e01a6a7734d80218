//! Typed keys for every attribute in the core schema.

use super::enums::*;
use super::typed::{attributes, Attr, AttrType, DeclaredAttr, EnumValues};
use chrono::{DateTime, Utc};
use std::time::Duration;

attributes! {
    ID: String = "id",
    CN: String = "cn",
    DESCRIPTION: String = "description",
    CREATE_TIMESTAMP: DateTime<Utc> = "createTimestamp",
    MODIFY_TIMESTAMP: DateTime<Utc> = "modifyTimestamp",
    ACE: Vec<String> = "ace",

    DISPLAY_NAME: String = "displayName",
    GIVEN_NAME: String = "givenName",
    SN: String = "sn",
    UID: String = "uid",
    MAIL: String = "mail",
    MAIL_DELIVERY_ADDRESS: String = "mailDeliveryAddress",
    MAIL_ALIAS: Vec<String> = "mailAlias",
    /// Salted password hash; see [`crate::auth::hash_password`].
    USER_PASSWORD: String = "userPassword",
    PASSWORD_MODIFIED_TIME: DateTime<Utc> = "passwordModifiedTime",
    COS_ID: String = "cosId",
    ACCOUNT_STATUS: AccountStatus = "accountStatus",
    MAIL_STATUS: MailStatus = "mailStatus",
    IS_ADMIN_ACCOUNT: bool = "isAdminAccount",
    MAIL_HOST: String = "mailHost",
    ACCOUNT_CALENDAR_USER_TYPE: AccountCalendarUserType = "accountCalendarUserType",
    LOCALE: String = "locale",
    HIDE_IN_GAL: bool = "hideInGal",
    UC_SERVICE_ID: String = "ucServiceId",
    MAIL_QUOTA: i64 = "mailQuota",
    PREF_BCC_ADDRESS: String = "prefBccAddress",
    PREF_FROM_ADDRESS: String = "prefFromAddress",
    PREF_FROM_DISPLAY: String = "prefFromDisplay",
    PREF_REPLY_TO_ADDRESS: String = "prefReplyToAddress",
    PREF_IDENTITY_NAME: String = "prefIdentityName",

    PASSWORD_MIN_LENGTH: i32 = "passwordMinLength",
    PASSWORD_MAX_LENGTH: i32 = "passwordMaxLength",
    PASSWORD_MIN_UPPER_CASE_CHARS: i32 = "passwordMinUpperCaseChars",
    PASSWORD_MIN_LOWER_CASE_CHARS: i32 = "passwordMinLowerCaseChars",
    PASSWORD_MIN_NUMERIC_CHARS: i32 = "passwordMinNumericChars",
    PASSWORD_MIN_PUNCTUATION_CHARS: i32 = "passwordMinPunctuationChars",
    PASSWORD_LOCKED: bool = "passwordLocked",
    ADMIN_AUTH_TOKEN_LIFETIME: Duration = "adminAuthTokenLifetime",
    AUTH_TOKEN_LIFETIME: Duration = "authTokenLifetime",
    MAIL_MESSAGE_LIFETIME: Duration = "mailMessageLifetime",
    FEATURE_GAL_ENABLED: bool = "featureGalEnabled",
    FEATURE_GAL_AUTO_COMPLETE_ENABLED: bool = "featureGalAutoCompleteEnabled",
    ALLOW_ANY_FROM_ADDRESS: bool = "allowAnyFromAddress",
    ADMIN_SAVED_SEARCHES: Vec<String> = "adminSavedSearches",
    LAST_LOGON_TIMESTAMP_FREQUENCY: Duration = "lastLogonTimestampFrequency",

    CAL_RES_TYPE: CalResType = "calResType",
    CAL_RES_CAPACITY: i32 = "calResCapacity",
    CAL_RES_BUILDING: String = "calResBuilding",
    CAL_RES_FLOOR: String = "calResFloor",
    CAL_RES_ROOM: String = "calResRoom",
    CAL_RES_SITE: String = "calResSite",
    CAL_RES_CONTACT_NAME: String = "calResContactName",
    CAL_RES_CONTACT_EMAIL: String = "calResContactEmail",
    CAL_RES_CONTACT_PHONE: String = "calResContactPhone",
    CAL_RES_LOCATION_DISPLAY_NAME: String = "calResLocationDisplayName",
    CAL_RES_AUTO_ACCEPT_DECLINE: bool = "calResAutoAcceptDecline",

    PRE_AUTH_KEY: String = "preAuthKey",
    DOMAIN_STATUS: DomainStatus = "domainStatus",
    DOMAIN_TYPE: DomainType = "domainType",
    DOMAIN_DEFAULT_COS_ID: String = "domainDefaultCosId",
    VIRTUAL_HOSTNAME: Vec<String> = "virtualHostname",
    GAL_MODE: GalMode = "galMode",
    GAL_MAX_RESULTS: i32 = "galMaxResults",
    PUBLIC_SERVICE_HOSTNAME: String = "publicServiceHostname",
    SMTP_HOSTNAME: Vec<String> = "smtpHostname",

    SERVICE_HOSTNAME: String = "serviceHostname",
    SERVICE_ENABLED: Vec<String> = "serviceEnabled",
    SERVICE_INSTALLED: Vec<String> = "serviceInstalled",
    MAIL_PORT: i32 = "mailPort",
    LMTP_NUM_THREADS: i32 = "lmtpNumThreads",
    MTA_MAX_MESSAGE_SIZE: i64 = "mtaMaxMessageSize",

    DEFAULT_DOMAIN_NAME: String = "defaultDomainName",

    ZIMLET_VERSION: String = "zimletVersion",
    ZIMLET_ENABLED: bool = "zimletEnabled",
    ZIMLET_PRIORITY: i32 = "zimletPriority",
    ZIMLET_IS_EXTENSION: bool = "zimletIsExtension",
    ZIMLET_KEYWORD: String = "zimletKeyword",

    MEMBER: Vec<String> = "member",
    SUBSCRIPTION_POLICY: SubscriptionPolicy = "distributionListSubscriptionPolicy",

    MEMBER_URL: String = "memberURL",
    IS_ACL_GROUP: bool = "isACLGroup",

    DATA_SOURCE_TYPE: DataSourceType = "dataSourceType",
    DATA_SOURCE_ENABLED: bool = "dataSourceEnabled",
    DATA_SOURCE_CONNECTION_TYPE: DataSourceConnectionType = "dataSourceConnectionType",
    DATA_SOURCE_FOLDER_ID: String = "dataSourceFolderId",
    DATA_SOURCE_HOST: String = "dataSourceHost",
    DATA_SOURCE_PORT: i32 = "dataSourcePort",
    DATA_SOURCE_USERNAME: String = "dataSourceUsername",
    DATA_SOURCE_PASSWORD: String = "dataSourcePassword",
    DATA_SOURCE_LEAVE_ON_SERVER: bool = "dataSourceLeaveOnServer",
    DATA_SOURCE_POLLING_INTERVAL: Duration = "dataSourcePollingInterval",
    DATA_SOURCE_EMAIL_ADDRESS: String = "dataSourceEmailAddress",

    RIGHT_TYPE: RightType = "rightType",
    RIGHT_TARGET_TYPE: Vec<String> = "rightTargetType",
    RIGHT_ATTRS: Vec<String> = "rightAttrs",
    RIGHT_RIGHTS: Vec<String> = "rightRights",

    UC_ADMIN_URL: String = "ucAdminUrl",
    UC_ADMIN_USER: String = "ucAdminUser",
    UC_ADMIN_PASSWORD: String = "ucAdminPassword",
    UC_CALL_CONTROL_URL: String = "ucCallControlUrl",
    UC_CALL_LOG_URL: String = "ucCallLogUrl",
    UC_VIDEO_URL: String = "ucVideoUrl",
    UC_VOICEMAIL_URL: String = "ucVoicemailUrl",
    UC_PROVIDER_CLASS: String = "ucProviderClass",

    SHARE_OWNER_ACCOUNT_ID: String = "shareOwnerAccountId",
}
