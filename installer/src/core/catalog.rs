//! The installer's question tree.
//!
//! Every prompt, guard and derived write lives here as data. Yes/no
//! questions whose wording is the opposite of the variable they control use
//! `DeriveRule::Negated`; the rest use `DeriveRule::Lowercase`.

use crate::core::flow::{DeriveRule, Node, answer_is, no, yes};
use crate::core::options::{
    BinaryMode, Complexity, Database, DbLogLevel, EmailMode, LogLevel, LogOutput, OptionTable,
    ReverseProxy, SaveMode, WorkflowCallPolicy,
};
use crate::core::question::{Question, Validator};
use crate::core::snapshot::EnvKey;
use crate::core::timezones::timezone_choices;

/// Node ids referenced by guards, the wizard, and tests.
pub mod ids {
    pub const ROOT: &str = "root";
    pub const COMPLEXITY: &str = "complexity";
    pub const DOMAIN: &str = "domain";
    pub const TIMEZONE: &str = "timezone";
    pub const REVERSE_PROXY: &str = "reverse_proxy";
    pub const CF_ACCOUNT_ID: &str = "cloudflare_account_id";
    pub const CF_TOKEN: &str = "cloudflare_token";
    pub const ADVANCED: &str = "advanced";
    pub const DB_KEEP: &str = "database_keep_default";
    pub const DB_TYPE: &str = "database_type";
    pub const CONFIG_FILE_SKIP: &str = "config_file_skip";
    pub const TEMPLATES_HOST_KEEP: &str = "templates_host_keep";
    pub const ENCRYPTION_KEEP: &str = "encryption_key_keep";
    pub const SHUTDOWN_KEEP: &str = "shutdown_timeout_keep";
    pub const BINARY_PATH_KEEP: &str = "binary_path_keep";
    pub const EMAIL_MODE: &str = "email_mode";
    pub const ENDPOINT_PATHS_KEEP: &str = "endpoint_paths_keep";
    pub const METRICS_KEEP_DISABLED: &str = "metrics_keep_disabled";
    pub const METRICS_PREFIX: &str = "metrics_prefix";
    pub const HOOKS_KEEP_DISABLED: &str = "hooks_keep_disabled";
    pub const TIMEOUT_KEEP: &str = "execution_timeout_keep";
    pub const LOGS_KEEP: &str = "logs_keep_default";
    pub const LOG_OUTPUT: &str = "log_output";
    pub const DB_LOGGING_DISABLED: &str = "db_logging_disabled";
    pub const LOG_STREAMING_KEEP: &str = "log_streaming_keep_default";
    pub const EXTERNAL_STORAGE_DISABLED: &str = "external_storage_disabled";
    pub const JS_MODULES_DISABLED: &str = "js_modules_disabled";
    pub const ERROR_TRIGGER_KEEP: &str = "error_trigger_keep";
    pub const QUEUE_KEEP_DISABLED: &str = "queue_keep_disabled";
    pub const SECURITY_KEEP: &str = "security_keep_default";
    pub const ENTERPRISE: &str = "enterprise_key";
}

const ADVANCED_BANNER: &str = "\
The following questions are the advanced setup options.

To skip an input question, just enter it empty.
For yes and no questions, yes will always be the default.

Visit https://docs.n8n.io/hosting/configuration/environment-variables/ to see more details about each option";

const POSTGRES_NOTICE: &str = "\
Postgres connection settings are not asked here. After setup, add the DB_POSTGRESDB_* \
variables to n8n/.env and n8n/docker-compose.yaml.";

const QUEUE_NOTICE: &str = "\
Queue mode is not configured by this installer. After setup, fill in the QUEUE_* \
variables in n8n/.env manually.";

/// Host facts the tree depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogContext {
    pub local_timezone: String,
}

pub fn build_catalog(ctx: &CatalogContext) -> Node {
    let complexity = Node::ask(
        ids::COMPLEXITY,
        Question::choice(
            "How customized would you like your n8n Install?:",
            Complexity::TABLE.labels(),
        ),
    )
    .child(Node::ask(
        ids::DOMAIN,
        Question::text("What's your domain?:")
            .writes(EnvKey::EditorBaseUrl)
            .writes(EnvKey::WebhookUrl)
            .validate(Validator::NoSlash)
            .prefix("https://"),
    ))
    .child(Node::ask(
        ids::TIMEZONE,
        Question::choice(
            "What is your time zone?:",
            timezone_choices(&ctx.local_timezone),
        )
        .writes(EnvKey::GenericTimezone)
        .default(ctx.local_timezone.clone()),
    ))
    .child(reverse_proxy())
    .child(
        Node::group(ids::ADVANCED)
            .when(answer_is(ids::COMPLEXITY, Complexity::Detailed.label()))
            .child(Node::notice("advanced_banner", ADVANCED_BANNER))
            .children(database())
            .children(deployment())
            .children(binary_data())
            .children(email())
            .children(endpoints())
            .children(metrics())
            .children(external_hooks())
            .children(executions())
            .children(logs())
            .children(external_storage())
            .children(nodes())
            .children(queue_mode())
            .children(security())
            .children(workflows())
            .children(license()),
    );

    Node::group(ids::ROOT).child(complexity)
}

fn reverse_proxy() -> Node {
    let cloudflare = answer_is(ids::REVERSE_PROXY, ReverseProxy::Cloudflare.label());
    Node::ask(
        ids::REVERSE_PROXY,
        Question::choice(
            "How would you like to set up your domain?:",
            ReverseProxy::TABLE.labels(),
        ),
    )
    .child(
        Node::ask(ids::CF_ACCOUNT_ID, Question::text("Cloudflare Account ID?:"))
            .when(cloudflare.clone()),
    )
    .child(
        Node::ask(
            ids::CF_TOKEN,
            Question::secret(
                "What's your CloudFlare Token? (must have Cloudflare Tunnel & DNS Scopes):",
            ),
        )
        .when(cloudflare),
    )
}

fn database() -> Vec<Node> {
    vec![
        yes_no(
            ids::DB_KEEP,
            "Would you like to keep the default database setup?",
        )
        .child(
            option(ids::DB_TYPE, "Database Type", Database::TABLE, EnvKey::DbType)
                .when(no(ids::DB_KEEP))
                .child(text("database_table_prefix", "Database Table Prefix", EnvKey::DbTablePrefix))
                .child(
                    toggle(
                        "database_vacuum",
                        "Run vacuum on startup:",
                        EnvKey::DbSqliteVacuumOnStartup,
                    )
                    .when(answer_is(ids::DB_TYPE, Database::Sqlite.label())),
                )
                .child(
                    Node::notice("database_postgres_notice", POSTGRES_NOTICE)
                        .when(answer_is(ids::DB_TYPE, Database::Postgres.label())),
                ),
        ),
    ]
}

fn deployment() -> Vec<Node> {
    vec![
        inverted(
            "usage_page_shown",
            "Show the usage and plan page? (shown by default)",
            EnvKey::HideUsagePage,
        ),
        yes_no(
            ids::CONFIG_FILE_SKIP,
            "Continue without a JSON n8n config file?",
        )
        .child(
            text(
                "config_file_path",
                "Config File Path: (example: /<path-to-config>/my-config.json)",
                EnvKey::ConfigFiles,
            )
            .when(no(ids::CONFIG_FILE_SKIP)),
        ),
        inverted(
            "ui_enabled",
            "Do you want a UI for n8n? (press n to disable the UI)",
            EnvKey::DisableUi,
        ),
        inverted(
            "preview_mode_disabled",
            "Disable preview mode?: (press y for normal mode)",
            EnvKey::PreviewMode,
        ),
        inverted(
            "templates_disabled",
            "Disable workflow templates?: (they are normally disabled by default)",
            EnvKey::TemplatesEnabled,
        ),
        yes_no(
            ids::TEMPLATES_HOST_KEEP,
            "Keep default template URL?: (Say no if you have your own template library)",
        )
        .child(
            text(
                "templates_host",
                "URL of custom template host",
                EnvKey::TemplatesHost,
            )
            .when(no(ids::TEMPLATES_HOST_KEEP)),
        ),
        yes_no(
            ids::ENCRYPTION_KEEP,
            "Do you want to keep the default n8n encryption key?:",
        )
        .child(
            Node::ask(
                "encryption_key",
                Question::secret("Custom encryption key").writes(EnvKey::EncryptionKey),
            )
            .when(no(ids::ENCRYPTION_KEEP)),
        ),
        yes_no(
            ids::SHUTDOWN_KEEP,
            "Do you want to keep the default graceful shutdown timeout?:",
        )
        .child(
            numeric(
                "shutdown_timeout",
                "Input custom shutdown time in seconds:",
                EnvKey::GracefulShutdownTimeout,
                "30",
            )
            .when(no(ids::SHUTDOWN_KEEP)),
        ),
        inverted(
            "public_api_enabled",
            "Enable the n8n API? (is enabled by default)",
            EnvKey::PublicApiDisabled,
        ),
        toggle(
            "hiring_banner",
            "Enable the n8n hiring banner?",
            EnvKey::HiringBannerEnabled,
        ),
    ]
}

fn binary_data() -> Vec<Node> {
    vec![
        yes_no(
            ids::BINARY_PATH_KEEP,
            "Do you want to keep the default binary data storage path?:",
        )
        .child(
            text(
                "binary_path",
                "Input custom binary storage path:",
                EnvKey::BinaryDataStoragePath,
            )
            .when(no(ids::BINARY_PATH_KEEP)),
        ),
        Node::ask(
            "binary_mode",
            Question::choice("Choose a binary mode:", BinaryMode::TABLE.labels())
                .default(BinaryMode::Memory.label()),
        )
        .derive(
            EnvKey::DefaultBinaryDataMode,
            DeriveRule::OptionName(BinaryMode::TABLE),
        ),
    ]
}

fn email() -> Vec<Node> {
    let smtp = answer_is(ids::EMAIL_MODE, EmailMode::Smtp.label());
    let service_account = answer_is(ids::EMAIL_MODE, EmailMode::ServiceAccount.label());
    vec![
        Node::ask(
            ids::EMAIL_MODE,
            Question::choice(
                "How would you like to set up email?",
                EmailMode::TABLE.labels(),
            ),
        )
        .child(
            Node::group("email_smtp").when(smtp).children([
                text("smtp_host", "SMTP Host (server name)", EnvKey::SmtpHost),
                numeric_no_default("smtp_port", "SMTP Port", EnvKey::SmtpPort),
                text("smtp_user", "SMTP User", EnvKey::SmtpUser),
                secret("smtp_pass", "SMTP Password", EnvKey::SmtpPass),
            ]),
        )
        .child(
            Node::group("email_service_account")
                .when(service_account)
                .children([
                    text(
                        "smtp_oauth_client",
                        "SMTP OAuth Service Client ID",
                        EnvKey::SmtpOauthServiceClient,
                    ),
                    secret(
                        "smtp_oauth_key",
                        "SMTP OAuth private key",
                        EnvKey::SmtpOauthPrivateKey,
                    ),
                    text("smtp_sender", "Sender email address", EnvKey::SmtpSender),
                ]),
        ),
        toggle(
            "mfa",
            "Enable two-factor authentication? (does not force it, just allows it)",
            EnvKey::MfaEnabled,
        ),
    ]
}

fn endpoints() -> Vec<Node> {
    vec![
        numeric(
            "payload_size_max",
            "Max endpoint payload size (in MB)",
            EnvKey::PayloadSizeMax,
            "16",
        ),
        yes_no(
            ids::ENDPOINT_PATHS_KEEP,
            "Do you want to keep default endpoint path names?",
        )
        .child(
            Node::group("endpoint_paths")
                .when(no(ids::ENDPOINT_PATHS_KEEP))
                .children([
                    text_with_default(
                        "endpoint_webhook",
                        "Path used for webhook endpoint: (Example n8n.mylink.com/webhook/)",
                        EnvKey::EndpointWebhook,
                        "webhook",
                    ),
                    text_with_default(
                        "endpoint_webhook_test",
                        "Path used for webhook test endpoint: (Example n8n.mylink.com/webhook-test/)",
                        EnvKey::EndpointWebhookTest,
                        "webhook-test",
                    ),
                    text_with_default(
                        "endpoint_webhook_wait",
                        "Path used for webhook waiting endpoint: (Example n8n.mylink.com/webhook-waiting/)",
                        EnvKey::EndpointWebhookWait,
                        "webhook-waiting",
                    ),
                ]),
        ),
    ]
}

/// Metric toggles asked once metrics are enabled.
pub const METRIC_TOGGLES: &[(&str, &str, EnvKey)] = &[
    (
        "metrics_default",
        "Include default metrics",
        EnvKey::MetricsIncludeDefaultMetrics,
    ),
    (
        "metrics_cache",
        "Include cache metrics",
        EnvKey::MetricsIncludeCacheMetrics,
    ),
    (
        "metrics_event_bus",
        "Include message event bus metrics",
        EnvKey::MetricsIncludeMessageEventBusMetrics,
    ),
    (
        "metrics_workflow_id",
        "Include workflow ID label in metrics",
        EnvKey::MetricsIncludeWorkflowIdLabel,
    ),
    (
        "metrics_node_type",
        "Include node type label in metrics",
        EnvKey::MetricsIncludeNodeTypeLabel,
    ),
    (
        "metrics_credential_type",
        "Include credential type label in metrics",
        EnvKey::MetricsIncludeCredentialTypeLabel,
    ),
    (
        "metrics_api_endpoints",
        "Include api endpoints in metrics",
        EnvKey::MetricsIncludeApiEndpoints,
    ),
    (
        "metrics_api_path",
        "Include api path label in metrics",
        EnvKey::MetricsIncludeApiPathLabel,
    ),
    (
        "metrics_api_method",
        "Include api method label in metrics",
        EnvKey::MetricsIncludeApiMethodLabel,
    ),
    (
        "metrics_api_status_code",
        "Include api status code label in metrics",
        EnvKey::MetricsIncludeApiStatusCodeLabel,
    ),
];

fn metrics() -> Vec<Node> {
    let enabled = no(ids::METRICS_KEEP_DISABLED);
    let toggles = METRIC_TOGGLES
        .iter()
        .map(|(id, prompt, key)| toggle(*id, prompt, *key).when(enabled.clone()));
    vec![
        yes_no(
            ids::METRICS_KEEP_DISABLED,
            "Do you want to keep n8n metrics disabled?",
        )
        .child(
            text_with_default(
                ids::METRICS_PREFIX,
                "n8n metrics prefix",
                EnvKey::MetricsPrefix,
                "n8n_",
            )
            .derive(EnvKey::Metrics, DeriveRule::Constant("true"))
            .when(enabled.clone()),
        )
        .children(toggles),
    ]
}

fn external_hooks() -> Vec<Node> {
    vec![
        yes_no(
            ids::HOOKS_KEEP_DISABLED,
            "Do you want to keep external hooks disabled?",
        )
        .child(
            Node::group("external_hooks")
                .when(no(ids::HOOKS_KEEP_DISABLED))
                .children([
                    text(
                        "external_hook_files",
                        "External hooks files: (Files containing backend external hooks. Provide multiple files as a colon-separated list (:))",
                        EnvKey::ExternalHookFiles,
                    ),
                    text(
                        "external_frontend_hooks",
                        "External front end hooks URLs: (URLs to files containing frontend external hooks. Provide multiple URLs as a colon-separated list (:))",
                        EnvKey::ExternalFrontendHooksUrls,
                    ),
                ]),
        ),
    ]
}

fn executions() -> Vec<Node> {
    vec![
        yes_no(
            ids::TIMEOUT_KEEP,
            "Do you want to keep the default execution timeout? (no timeout by default)",
        )
        .child(
            numeric(
                "execution_timeout",
                "Execution timeout in seconds (-1 to disable)",
                EnvKey::ExecutionsTimeout,
                "-1",
            )
            .when(no(ids::TIMEOUT_KEEP)),
        ),
        numeric(
            "execution_timeout_max",
            "Max timeout users can set in the UI (in seconds)",
            EnvKey::ExecutionsTimeoutMax,
            "3600",
        ),
        yes_no("save_on_error", "Save data on execution error?").derive(
            EnvKey::ExecutionsDataSaveOnError,
            DeriveRule::OptionName(SaveMode::TABLE),
        ),
        yes_no("save_on_success", "Save data on execution success?").derive(
            EnvKey::ExecutionsDataSaveOnSuccess,
            DeriveRule::OptionName(SaveMode::TABLE),
        ),
        inverted(
            "save_on_progress_disabled",
            "Disable save data on execution progress? (disabled by default)",
            EnvKey::ExecutionsDataSaveOnProgress,
        ),
        toggle(
            "save_manual",
            "Save data on manual executions?",
            EnvKey::ExecutionsDataSaveManualExecutions,
        ),
        toggle(
            "prune",
            "Delete old execution data (prune) (past the max age)?",
            EnvKey::ExecutionsDataPrune,
        ),
        numeric(
            "prune_max_age",
            "Execution data max age in hours",
            EnvKey::ExecutionsDataMaxAge,
            "336",
        ),
        numeric(
            "prune_max_count",
            "Maximum number of executions to keep in the database (enter 0 for unlimited)",
            EnvKey::ExecutionsDataPruneMaxCount,
            "10000",
        ),
        numeric(
            "hard_delete_buffer",
            "How old (hours) the finished execution data has to be to get hard-deleted",
            EnvKey::ExecutionsDataHardDeleteBuffer,
            "1",
        ),
        numeric(
            "hard_delete_interval",
            "How often (minutes) execution data should be hard-deleted",
            EnvKey::ExecutionsDataPruneHardDeleteInterval,
            "15",
        ),
        numeric(
            "soft_delete_interval",
            "How often (minutes) execution data should be soft-deleted",
            EnvKey::ExecutionsDataPruneSoftDeleteInterval,
            "60",
        ),
        numeric(
            "concurrency_limit",
            "Max production executions allowed to run concurrently. Add -1 for no limit",
            EnvKey::ConcurrencyProductionLimit,
            "-1",
        ),
    ]
}

fn logs() -> Vec<Node> {
    vec![
        yes_no(
            ids::LOGS_KEEP,
            "Do you want to keep the default log settings",
        )
        .child(
            Node::group("log_settings")
                .when(no(ids::LOGS_KEEP))
                .child(option(
                    "log_level",
                    "Log output level",
                    LogLevel::TABLE,
                    EnvKey::LogLevel,
                ))
                .child(
                    option(
                        ids::LOG_OUTPUT,
                        "Log output location",
                        LogOutput::TABLE,
                        EnvKey::LogOutput,
                    )
                    .child(
                        Node::group("log_file")
                            .when(answer_is(ids::LOG_OUTPUT, LogOutput::File.label()))
                            .children([
                                numeric(
                                    "log_file_count",
                                    "Max log file count",
                                    EnvKey::LogFileCountMax,
                                    "100",
                                ),
                                numeric(
                                    "log_file_size",
                                    "Max log file size (in MB)",
                                    EnvKey::LogFileSizeMax,
                                    "16",
                                ),
                                text_with_default(
                                    "log_file_location",
                                    "Log file path",
                                    EnvKey::LogFileLocation,
                                    "n8n/logs/n8n.log",
                                ),
                            ]),
                    ),
                )
                .child(
                    inverted(
                        ids::DB_LOGGING_DISABLED,
                        "Disable database logging? (disabled by default)",
                        EnvKey::DbLoggingEnabled,
                    )
                    .child(
                        option(
                            "db_log_level",
                            "Database log level (For all logs select all)",
                            DbLogLevel::TABLE,
                            EnvKey::DbLoggingOptions,
                        )
                        .when(no(ids::DB_LOGGING_DISABLED)),
                    )
                    .child(
                        numeric(
                            "db_log_max_time",
                            "Maximum execution time (in milliseconds) before n8n logs a warning. (Set to 0 to disable)",
                            EnvKey::DbLoggingMaxExecutionTime,
                            "1000",
                        )
                        .when(no(ids::DB_LOGGING_DISABLED)),
                    ),
                )
                .child(inverted(
                    "code_logging_disabled",
                    "Disable code node logging? (disabled by default)",
                    EnvKey::CodeEnableStdout,
                ))
                .child(log_streaming()),
        ),
    ]
}

fn log_streaming() -> Node {
    yes_no(
        ids::LOG_STREAMING_KEEP,
        "Keep log streaming settings at defaults? (Only available for enterprise)",
    )
    .child(
        Node::group("log_streaming")
            .when(no(ids::LOG_STREAMING_KEEP))
            .children([
                numeric(
                    "eventbus_check_unsent",
                    "How often (in milliseconds) to check for unsent event messages. Can in rare cases send message twice. (Set to 0 to disable)",
                    EnvKey::EventbusCheckUnsentInterval,
                    "0",
                ),
                inverted(
                    "eventbus_sync_file_access_disabled",
                    "Disable all file access happening synchronously within the thread? (disabled by default)",
                    EnvKey::EventbusLogwriterSyncFileAccess,
                ),
                numeric(
                    "eventbus_keep_log_count",
                    "Number of event log files to keep",
                    EnvKey::EventbusLogwriterKeepLogCount,
                    "3",
                ),
                numeric(
                    "eventbus_max_file_size",
                    "Maximum size (in KB) of an event log file before a new one starts:",
                    EnvKey::EventbusLogwriterMaxFileSizeInKb,
                    "10240",
                ),
                text_with_default(
                    "eventbus_log_basename",
                    "Basename of the event log file:",
                    EnvKey::EventbusLogwriterLogBasename,
                    "n8nEventLog",
                ),
            ]),
    )
}

fn external_storage() -> Vec<Node> {
    vec![
        yes_no(
            ids::EXTERNAL_STORAGE_DISABLED,
            "Disable external data storage (disabled by default)",
        )
        .child(
            Node::group("external_storage")
                .when(no(ids::EXTERNAL_STORAGE_DISABLED))
                .children([
                    text(
                        "s3_host",
                        "Host of the n8n bucket in S3-compatible external storage. For example, s3.us-east-1.amazonaws.com:",
                        EnvKey::ExternalStorageS3Host,
                    ),
                    text(
                        "s3_bucket_name",
                        "Name of the n8n bucket in S3-compatible external storage:",
                        EnvKey::ExternalStorageS3BucketName,
                    ),
                    text(
                        "s3_bucket_region",
                        "Region of the n8n bucket in S3-compatible external storage. For example, us-east-1",
                        EnvKey::ExternalStorageS3BucketRegion,
                    ),
                    text(
                        "s3_access_key",
                        "Access key in S3-compatible external storage",
                        EnvKey::ExternalStorageS3AccessKey,
                    ),
                    secret(
                        "s3_access_secret",
                        "Access secret in S3-compatible external storage",
                        EnvKey::ExternalStorageS3AccessSecret,
                    ),
                ]),
        ),
    ]
}

fn nodes() -> Vec<Node> {
    vec![
        yes_no(
            ids::JS_MODULES_DISABLED,
            "Disable JS modules in the code node? (disabled by default)",
        )
        .child(
            Node::group("js_modules")
                .when(no(ids::JS_MODULES_DISABLED))
                .children([
                    text_with_default(
                        "js_modules_builtin",
                        "Comma separated list of built in modules to allow (meaning modules already in n8n) (use '*' for all)",
                        EnvKey::NodeFunctionAllowBuiltin,
                        "*",
                    ),
                    text_with_default(
                        "js_modules_external",
                        "Permit users to import specific external modules (from n8n/node_modules) in the Code node. n8n disables importing modules by default",
                        EnvKey::NodeFunctionAllowExternal,
                        "*",
                    ),
                ]),
        ),
        yes_no(ids::ERROR_TRIGGER_KEEP, "Keep default error trigger node?").child(
            text_with_default(
                "error_trigger_type",
                "Specify which node type to use as Error Trigger",
                EnvKey::NodesErrorTriggerType,
                "n8n-nodes-base.errorTrigger",
            )
            .when(no(ids::ERROR_TRIGGER_KEEP)),
        ),
        toggle(
            "community_packages",
            "Enable community nodes?",
            EnvKey::CommunityPackagesEnabled,
        ),
    ]
}

fn queue_mode() -> Vec<Node> {
    vec![
        yes_no(
            ids::QUEUE_KEEP_DISABLED,
            "Do you want to keep queue mode disabled? (enter yes if you don't know what queue mode is)",
        )
        .child(Node::notice("queue_mode_notice", QUEUE_NOTICE).when(no(ids::QUEUE_KEEP_DISABLED))),
    ]
}

fn security() -> Vec<Node> {
    vec![
        yes_no(ids::SECURITY_KEEP, "Keep security settings default?").child(
            Node::group("security")
                .when(no(ids::SECURITY_KEEP))
                .children([
                    inverted(
                        "env_access_allowed",
                        "Allow users to access environment variables in expressions and the Code node? (allowed by default)",
                        EnvKey::BlockEnvAccessInNode,
                    ),
                    text(
                        "restrict_file_access",
                        "Limits access to files in these directories. Provide multiple files as a colon-separated list (':') (leave blank to skip)",
                        EnvKey::RestrictFileAccessTo,
                    ),
                    toggle(
                        "block_n8n_files",
                        "Block access to all files in the .n8n directory and user defined configuration files (blocked by default)",
                        EnvKey::BlockFileAccessToN8nFiles,
                    ),
                    numeric(
                        "audit_abandoned_days",
                        "Number of days to consider a workflow abandoned if it's not executed",
                        EnvKey::SecurityAuditDaysAbandonedWorkflow,
                        "90",
                    ),
                    toggle(
                        "secure_cookie",
                        "Require SSL to access n8n",
                        EnvKey::SecureCookie,
                    ),
                ]),
        ),
    ]
}

fn workflows() -> Vec<Node> {
    vec![
        text_with_default(
            "workflow_default_name",
            "The default name used for new workflows:",
            EnvKey::WorkflowsDefaultName,
            "My workflow",
        ),
        inverted(
            "onboarding_enabled",
            "Enable the onboarding tips when creating a new workflow",
            EnvKey::OnboardingFlowDisabled,
        ),
        inverted(
            "workflow_tags_enabled",
            "Enable tags for organizing workflows",
            EnvKey::WorkflowTagsDisabled,
        ),
    ]
}

fn license() -> Vec<Node> {
    vec![
        yes_no(ids::ENTERPRISE, "Do you have an enterprise key?").child(
            Node::group("enterprise")
                .when(yes(ids::ENTERPRISE))
                .children([
                    text(
                        "license_activation_key",
                        "Enterprise activation key:",
                        EnvKey::LicenseActivationKey,
                    ),
                    option(
                        "workflow_caller_policy",
                        "Which workflows can call another workflow:",
                        WorkflowCallPolicy::TABLE,
                        EnvKey::WorkflowCallerPolicyDefaultOption,
                    ),
                    numeric(
                        "external_secrets_interval",
                        "How often (in seconds) to check for secret updates",
                        EnvKey::ExternalSecretsUpdateInterval,
                        "300",
                    ),
                ]),
        ),
    ]
}

fn yes_no(id: &'static str, prompt: &str) -> Node {
    Node::ask(id, Question::yes_no(prompt))
}

/// Yes/no whose answer maps straight onto the variable.
fn toggle(id: &'static str, prompt: &str, key: EnvKey) -> Node {
    yes_no(id, prompt).derive(key, DeriveRule::Lowercase)
}

/// Yes/no worded as the opposite of the variable.
fn inverted(id: &'static str, prompt: &str, key: EnvKey) -> Node {
    yes_no(id, prompt).derive(key, DeriveRule::Negated)
}

fn text(id: &'static str, prompt: &str, key: EnvKey) -> Node {
    Node::ask(id, Question::text(prompt).writes(key))
}

fn text_with_default(id: &'static str, prompt: &str, key: EnvKey, default: &str) -> Node {
    Node::ask(id, Question::text(prompt).writes(key).default(default))
}

fn numeric(id: &'static str, prompt: &str, key: EnvKey, default: &str) -> Node {
    Node::ask(
        id,
        Question::text(prompt)
            .writes(key)
            .validate(Validator::NoComma)
            .default(default),
    )
}

fn numeric_no_default(id: &'static str, prompt: &str, key: EnvKey) -> Node {
    Node::ask(
        id,
        Question::text(prompt)
            .writes(key)
            .validate(Validator::NoComma),
    )
}

fn secret(id: &'static str, prompt: &str, key: EnvKey) -> Node {
    Node::ask(id, Question::secret(prompt).writes(key))
}

fn option(id: &'static str, prompt: &str, table: OptionTable, key: EnvKey) -> Node {
    let question = Question::choice(prompt, table.labels());
    let question = match table.label_for_name(current_default(key)) {
        Some(label) => question.default(label),
        None => question,
    };
    Node::ask(id, question).derive(key, DeriveRule::OptionName(table))
}

fn current_default(key: EnvKey) -> &'static str {
    key.seeded_default().unwrap_or_default()
}
