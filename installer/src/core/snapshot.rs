//! Configuration snapshot: the fixed catalog of n8n environment variables and
//! the values resolved for them during one wizard run.
//!
//! Keys are a closed enum generated from the catalog below, so a typo in a key
//! name is a compile error rather than a surprise at render time. Declaration
//! order is the render order.

use std::collections::BTreeMap;
use std::fmt;

/// Section headers used to group keys in the rendered `.env` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Credentials,
    Database,
    Deployment,
    BinaryData,
    UserManagement,
    Endpoints,
    ExternalHooks,
    Executions,
    Logs,
    LogStreaming,
    ExternalStorage,
    Nodes,
    QueueMode,
    Security,
    Git,
    ExternalSecrets,
    Locale,
    Workflows,
    License,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Section::Credentials => "CREDENTIALS VARIABLES",
            Section::Database => "DATABASE VARIABLES",
            Section::Deployment => "DEPLOYMENT VARIABLES",
            Section::BinaryData => "BINARY DATA",
            Section::UserManagement => "USER MANAGEMENT",
            Section::Endpoints => "ENDPOINTS",
            Section::ExternalHooks => "EXTERNAL HOOKS",
            Section::Executions => "EXECUTION",
            Section::Logs => "LOGS",
            Section::LogStreaming => "LOG STREAMING",
            Section::ExternalStorage => "EXTERNAL DATA STORAGE",
            Section::Nodes => "NODES",
            Section::QueueMode => "QUEUE MODE",
            Section::Security => "SECURITY",
            Section::Git => "GIT",
            Section::ExternalSecrets => "EXTERNAL SECRETS",
            Section::Locale => "LOCAL",
            Section::Workflows => "WORKFLOWS",
            Section::License => "LICENSE",
        }
    }

    /// Enterprise-only sections are written fully commented out.
    pub fn is_inert(self) -> bool {
        matches!(self, Section::LogStreaming | Section::ExternalStorage)
    }
}

macro_rules! env_catalog {
    (@default $default:literal) => {
        Some($default)
    };
    (@default) => {
        None
    };
    ($( $section:ident { $( $variant:ident = $name:literal $(=> $default:literal)? ),* $(,)? } )*) => {
        /// A variable from the fixed n8n environment catalog.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum EnvKey {
            $($($variant,)*)*
        }

        impl EnvKey {
            /// Every catalog key, in render order.
            pub const ALL: &'static [EnvKey] = &[$($(EnvKey::$variant,)*)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($(EnvKey::$variant => $name,)*)*
                }
            }

            pub fn section(self) -> Section {
                match self {
                    $($(EnvKey::$variant => Section::$section,)*)*
                }
            }

            /// Product default seeded into a fresh snapshot (`None` = absent).
            pub fn seeded_default(self) -> Option<&'static str> {
                match self {
                    $($(EnvKey::$variant => env_catalog!(@default $($default)?),)*)*
                }
            }
        }
    };
}

env_catalog! {
    Credentials {
        CredentialsDefaultName = "CREDENTIALS_DEFAULT_NAME" => "My credentials",
    }
    Database {
        DbType = "DB_TYPE" => "sqlite",
        DbTablePrefix = "DB_TABLE_PREFIX",
        DbSqliteVacuumOnStartup = "DB_SQLITE_VACUUM_ON_STARTUP" => "false",
    }
    Deployment {
        EditorBaseUrl = "N8N_EDITOR_BASE_URL",
        PersonalizationEnabled = "N8N_PERSONALIZATION_ENABLED" => "false",
        ConfigFiles = "N8N_CONFIG_FILES",
        DisableUi = "N8N_DISABLE_UI",
        PreviewMode = "N8N_PREVIEW_MODE",
        TemplatesEnabled = "N8N_TEMPLATES_ENABLED" => "false",
        TemplatesHost = "N8N_TEMPLATES_HOST",
        EncryptionKey = "N8N_ENCRYPTION_KEY",
        GracefulShutdownTimeout = "N8N_GRACEFUL_SHUTDOWN_TIMEOUT" => "30",
        PublicApiDisabled = "N8N_PUBLIC_API_DISABLED",
        HiringBannerEnabled = "N8N_HIRING_BANNER_ENABLED",
    }
    BinaryData {
        AvailableBinaryDataModes = "N8N_AVAILABLE_BINARY_DATA_MODES",
        BinaryDataStoragePath = "N8N_BINARY_DATA_STORAGE_PATH",
        DefaultBinaryDataMode = "N8N_DEFAULT_BINARY_DATA_MODE",
    }
    UserManagement {
        EmailMode = "N8N_EMAIL_MODE" => "smtp",
        SmtpHost = "N8N_SMTP_HOST",
        SmtpPort = "N8N_SMTP_PORT",
        SmtpUser = "N8N_SMTP_USER",
        SmtpPass = "N8N_SMTP_PASS",
        SmtpOauthServiceClient = "N8N_SMTP_OAUTH_SERVICE_CLIENT",
        SmtpOauthPrivateKey = "N8N_SMTP_OAUTH_PRIVATE_KEY",
        SmtpSender = "N8N_SMTP_SENDER",
        SmtpSsl = "N8N_SMTP_SSL" => "true",
        EmailTemplatesInvite = "N8N_UM_EMAIL_TEMPLATES_INVITE",
        EmailTemplatesPwreset = "N8N_UM_EMAIL_TEMPLATES_PWRESET",
        EmailTemplatesWorkflowShared = "N8N_UM_EMAIL_TEMPLATES_WORKFLOW_SHARED",
        EmailTemplatesCredentialsShared = "N8N_UM_EMAIL_TEMPLATES_CREDENTIALS_SHARED",
        JwtSecret = "N8N_USER_MANAGEMENT_JWT_SECRET",
        JwtDurationHours = "N8N_USER_MANAGEMENT_JWT_DURATION_HOURS",
        JwtRefreshTimeoutHours = "N8N_USER_MANAGEMENT_JWT_REFRESH_TIMEOUT_HOURS",
        MfaEnabled = "N8N_MFA_ENABLED",
    }
    Endpoints {
        PayloadSizeMax = "N8N_PAYLOAD_SIZE_MAX" => "16",
        Metrics = "N8N_METRICS" => "false",
        MetricsPrefix = "N8N_METRICS_PREFIX" => "n8n_",
        MetricsIncludeDefaultMetrics = "N8N_METRICS_INCLUDE_DEFAULT_METRICS" => "true",
        MetricsIncludeCacheMetrics = "N8N_METRICS_INCLUDE_CACHE_METRICS" => "false",
        MetricsIncludeMessageEventBusMetrics = "N8N_METRICS_INCLUDE_MESSAGE_EVENT_BUS_METRICS" => "false",
        MetricsIncludeWorkflowIdLabel = "N8N_METRICS_INCLUDE_WORKFLOW_ID_LABEL" => "false",
        MetricsIncludeNodeTypeLabel = "N8N_METRICS_INCLUDE_NODE_TYPE_LABEL" => "false",
        MetricsIncludeCredentialTypeLabel = "N8N_METRICS_INCLUDE_CREDENTIAL_TYPE_LABEL" => "false",
        MetricsIncludeApiEndpoints = "N8N_METRICS_INCLUDE_API_ENDPOINTS" => "false",
        MetricsIncludeApiPathLabel = "N8N_METRICS_INCLUDE_API_PATH_LABEL" => "false",
        MetricsIncludeApiMethodLabel = "N8N_METRICS_INCLUDE_API_METHOD_LABEL" => "false",
        MetricsIncludeApiStatusCodeLabel = "N8N_METRICS_INCLUDE_API_STATUS_CODE_LABEL" => "false",
        EndpointRest = "N8N_ENDPOINT_REST" => "rest",
        EndpointWebhook = "N8N_ENDPOINT_WEBHOOK" => "webhook",
        EndpointWebhookTest = "N8N_ENDPOINT_WEBHOOK_TEST" => "webhook-test",
        EndpointWebhookWait = "N8N_ENDPOINT_WEBHOOK_WAIT" => "webhook-waiting",
        WebhookUrl = "WEBHOOK_URL",
        DisableProductionMainProcess = "N8N_DISABLE_PRODUCTION_MAIN_PROCESS" => "false",
    }
    ExternalHooks {
        ExternalHookFiles = "EXTERNAL_HOOK_FILES",
        ExternalFrontendHooksUrls = "EXTERNAL_FRONTEND_HOOKS_URLS",
    }
    Executions {
        ExecutionsMode = "EXECUTIONS_MODE" => "regular",
        ExecutionsTimeout = "EXECUTIONS_TIMEOUT" => "-1",
        ExecutionsTimeoutMax = "EXECUTIONS_TIMEOUT_MAX" => "3600",
        ExecutionsDataSaveOnError = "EXECUTIONS_DATA_SAVE_ON_ERROR" => "all",
        ExecutionsDataSaveOnSuccess = "EXECUTIONS_DATA_SAVE_ON_SUCCESS" => "all",
        ExecutionsDataSaveOnProgress = "EXECUTIONS_DATA_SAVE_ON_PROGRESS" => "false",
        ExecutionsDataSaveManualExecutions = "EXECUTIONS_DATA_SAVE_MANUAL_EXECUTIONS" => "true",
        ExecutionsDataPrune = "EXECUTIONS_DATA_PRUNE" => "true",
        ExecutionsDataMaxAge = "EXECUTIONS_DATA_MAX_AGE" => "336",
        ExecutionsDataPruneMaxCount = "EXECUTIONS_DATA_PRUNE_MAX_COUNT" => "10000",
        ExecutionsDataHardDeleteBuffer = "EXECUTIONS_DATA_HARD_DELETE_BUFFER" => "1",
        ExecutionsDataPruneHardDeleteInterval = "EXECUTIONS_DATA_PRUNE_HARD_DELETE_INTERVAL" => "15",
        ExecutionsDataPruneSoftDeleteInterval = "EXECUTIONS_DATA_PRUNE_SOFT_DELETE_INTERVAL" => "60",
        ConcurrencyProductionLimit = "N8N_CONCURRENCY_PRODUCTION_LIMIT" => "-1",
    }
    Logs {
        LogLevel = "N8N_LOG_LEVEL" => "info",
        LogOutput = "N8N_LOG_OUTPUT" => "console",
        LogFileCountMax = "N8N_LOG_FILE_COUNT_MAX",
        LogFileSizeMax = "N8N_LOG_FILE_SIZE_MAX",
        LogFileLocation = "N8N_LOG_FILE_LOCATION",
        DbLoggingEnabled = "DB_LOGGING_ENABLED" => "false",
        DbLoggingOptions = "DB_LOGGING_OPTIONS",
        DbLoggingMaxExecutionTime = "DB_LOGGING_MAX_EXECUTION_TIME",
        CodeEnableStdout = "CODE_ENABLE_STDOUT" => "false",
    }
    LogStreaming {
        EventbusCheckUnsentInterval = "N8N_EVENTBUS_CHECKUNSENTINTERVAL" => "0",
        EventbusLogwriterSyncFileAccess = "N8N_EVENTBUS_LOGWRITER_SYNCFILEACCESS" => "false",
        EventbusLogwriterKeepLogCount = "N8N_EVENTBUS_LOGWRITER_KEEPLOGCOUNT" => "3",
        EventbusLogwriterMaxFileSizeInKb = "N8N_EVENTBUS_LOGWRITER_MAXFILESIZEINKB" => "10240",
        EventbusLogwriterLogBasename = "N8N_EVENTBUS_LOGWRITER_LOGBASENAME" => "n8nEventLog",
    }
    ExternalStorage {
        ExternalStorageS3Host = "N8N_EXTERNAL_STORAGE_S3_HOST",
        ExternalStorageS3BucketName = "N8N_EXTERNAL_STORAGE_S3_BUCKET_NAME",
        ExternalStorageS3BucketRegion = "N8N_EXTERNAL_STORAGE_S3_BUCKET_REGION",
        ExternalStorageS3AccessKey = "N8N_EXTERNAL_STORAGE_S3_ACCESS_KEY",
        ExternalStorageS3AccessSecret = "N8N_EXTERNAL_STORAGE_S3_ACCESS_SECRET",
    }
    Nodes {
        NodesInclude = "NODES_INCLUDE",
        NodesExclude = "NODES_EXCLUDE",
        NodeFunctionAllowBuiltin = "NODE_FUNCTION_ALLOW_BUILTIN",
        NodeFunctionAllowExternal = "NODE_FUNCTION_ALLOW_EXTERNAL",
        NodesErrorTriggerType = "NODES_ERROR_TRIGGER_TYPE" => "n8n-nodes-base.errorTrigger",
        CustomExtensions = "N8N_CUSTOM_EXTENSIONS",
        CommunityPackagesEnabled = "N8N_COMMUNITY_PACKAGES_ENABLED" => "true",
        CommunityPackagesRegistry = "N8N_COMMUNITY_PACKAGES_REGISTRY" => "https://registry.npmjs.org",
    }
    QueueMode {
        QueueBullPrefix = "QUEUE_BULL_PREFIX",
        QueueBullRedisDb = "QUEUE_BULL_REDIS_DB",
        QueueBullRedisHost = "QUEUE_BULL_REDIS_HOST" => "localhost",
        QueueBullRedisPort = "QUEUE_BULL_REDIS_PORT" => "6379",
        QueueBullRedisUsername = "QUEUE_BULL_REDIS_USERNAME",
        QueueBullRedisPassword = "QUEUE_BULL_REDIS_PASSWORD",
        QueueBullRedisTimeoutThreshold = "QUEUE_BULL_REDIS_TIMEOUT_THRESHOLD" => "1000",
        QueueBullRedisClusterNodes = "QUEUE_BULL_REDIS_CLUSTER_NODES",
        QueueBullRedisTls = "QUEUE_BULL_REDIS_TLS",
        QueueRecoveryInterval = "QUEUE_RECOVERY_INTERVAL",
        QueueHealthCheckActive = "QUEUE_HEALTH_CHECK_ACTIVE" => "false",
        QueueHealthCheckPort = "QUEUE_HEALTH_CHECK_PORT",
        QueueWorkerLockDuration = "QUEUE_WORKER_LOCK_DURATION" => "30000",
        QueueWorkerLockRenewTime = "QUEUE_WORKER_LOCK_RENEW_TIME" => "15000",
        QueueWorkerStalledInterval = "QUEUE_WORKER_STALLED_INTERVAL" => "30000",
        QueueWorkerMaxStalledCount = "QUEUE_WORKER_MAX_STALLED_COUNT" => "1",
    }
    Security {
        BlockEnvAccessInNode = "N8N_BLOCK_ENV_ACCESS_IN_NODE" => "false",
        RestrictFileAccessTo = "N8N_RESTRICT_FILE_ACCESS_TO",
        BlockFileAccessToN8nFiles = "N8N_BLOCK_FILE_ACCESS_TO_N8N_FILES" => "true",
        SecurityAuditDaysAbandonedWorkflow = "N8N_SECURITY_AUDIT_DAYS_ABANDONED_WORKFLOW" => "90",
        SecureCookie = "N8N_SECURE_COOKIE" => "true",
    }
    Git {
        SourceControlDefaultSshKeyType = "N8N_SOURCECONTROL_DEFAULT_SSH_KEY_TYPE" => "ed25519",
    }
    ExternalSecrets {
        ExternalSecretsUpdateInterval = "N8N_EXTERNAL_SECRETS_UPDATE_INTERVAL",
    }
    Locale {
        GenericTimezone = "GENERIC_TIMEZONE",
        DefaultLocale = "N8N_DEFAULT_LOCALE",
    }
    Workflows {
        WorkflowsDefaultName = "WORKFLOWS_DEFAULT_NAME" => "My workflow",
        OnboardingFlowDisabled = "N8N_ONBOARDING_FLOW_DISABLED" => "false",
        WorkflowTagsDisabled = "N8N_WORKFLOW_TAGS_DISABLED" => "false",
        WorkflowCallerPolicyDefaultOption = "N8N_WORKFLOW_CALLER_POLICY_DEFAULT_OPTION" => "workflowsFromSameOwner",
    }
    License {
        HideUsagePage = "N8N_HIDE_USAGE_PAGE" => "false",
        LicenseActivationKey = "N8N_LICENSE_ACTIVATION_KEY",
        LicenseAutoRenewEnabled = "N8N_LICENSE_AUTO_RENEW_ENABLED" => "true",
        LicenseAutoRenewOffset = "N8N_LICENSE_AUTO_RENEW_OFFSET",
        LicenseServerUrl = "N8N_LICENSE_SERVER_URL",
        HttpProxyLicenseServer = "HTTP_PROXY_LICENSE_SERVER",
        HttpsProxyLicenseServer = "HTTPS_PROXY_LICENSE_SERVER",
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved values for every catalog key; `None` is the absent sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    values: BTreeMap<EnvKey, Option<String>>,
}

impl ConfigSnapshot {
    /// Snapshot holding the catalog's product defaults.
    pub fn seeded() -> Self {
        let values = EnvKey::ALL
            .iter()
            .map(|key| (*key, key.seeded_default().map(str::to_string)))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: EnvKey) -> Option<&str> {
        self.values.get(&key).and_then(|value| value.as_deref())
    }

    /// Overwrite `key` unconditionally (last write wins).
    pub fn set(&mut self, key: EnvKey, value: impl Into<String>) {
        self.values.insert(key, Some(value.into()));
    }

    /// Entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (EnvKey, Option<&str>)> {
        self.values
            .iter()
            .map(|(key, value)| (*key, value.as_deref()))
    }

    /// Keys whose value differs from `baseline`, in catalog order.
    pub fn changed_since(&self, baseline: &ConfigSnapshot) -> Vec<EnvKey> {
        self.values
            .iter()
            .filter(|(key, value)| baseline.values.get(*key) != Some(*value))
            .map(|(key, _)| *key)
            .collect()
    }
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_names_are_unique() {
        let mut seen = HashSet::new();
        for key in EnvKey::ALL {
            assert!(seen.insert(key.as_str()), "duplicate key {}", key);
        }
        assert!(EnvKey::ALL.len() > 140);
    }

    #[test]
    fn catalog_is_grouped_by_section() {
        let sections: Vec<Section> = EnvKey::ALL.iter().map(|key| key.section()).collect();
        assert!(sections.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn seeded_snapshot_uses_product_defaults() {
        let snapshot = ConfigSnapshot::seeded();
        assert_eq!(snapshot.get(EnvKey::DbType), Some("sqlite"));
        assert_eq!(snapshot.get(EnvKey::PayloadSizeMax), Some("16"));
        assert_eq!(snapshot.get(EnvKey::EditorBaseUrl), None);
        assert_eq!(snapshot.iter().count(), EnvKey::ALL.len());
    }

    #[test]
    fn set_overwrites_and_reports_change() {
        let baseline = ConfigSnapshot::seeded();
        let mut snapshot = baseline.clone();
        snapshot.set(EnvKey::DbType, "postgresdb");
        snapshot.set(EnvKey::DbType, "sqlite");
        snapshot.set(EnvKey::GenericTimezone, "Europe/Berlin");
        assert_eq!(snapshot.changed_since(&baseline), vec![EnvKey::GenericTimezone]);
    }
}
