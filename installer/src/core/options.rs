//! Closed option sets shown to the operator as single-choice lists.
//!
//! Each set pairs an internal name (the value persisted into the snapshot)
//! with the human label that is shown and matched. Labels are what the
//! terminal returns, names are what n8n reads.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionEntry {
    pub name: &'static str,
    pub label: &'static str,
}

/// A named option set as data, so catalog code can map labels without
/// knowing the concrete enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionTable {
    pub id: &'static str,
    pub entries: &'static [OptionEntry],
}

impl OptionTable {
    pub fn labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.label.to_string())
            .collect()
    }

    pub fn name_for_label(&self, label: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.name)
    }

    pub fn label_for_name(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.label)
    }

    /// Labels or names that appear more than once in this table.
    pub fn duplicates(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut labels = HashSet::new();
        let mut names = HashSet::new();
        for entry in self.entries {
            if !labels.insert(entry.label) {
                errors.push(format!("{}: duplicate label {:?}", self.id, entry.label));
            }
            if !names.insert(entry.name) {
                errors.push(format!("{}: duplicate name {:?}", self.id, entry.name));
            }
        }
        errors
    }
}

macro_rules! option_set {
    ($(#[$meta:meta])* $ty:ident, $id:literal { $( $variant:ident => ($name:literal, $label:literal) ),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $ty {
            $($variant,)+
        }

        impl $ty {
            pub const TABLE: OptionTable = OptionTable {
                id: $id,
                entries: &[$(OptionEntry { name: $name, label: $label },)+],
            };

            pub const ALL: &'static [$ty] = &[$($ty::$variant,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($ty::$variant => $label,)+
                }
            }

            pub fn from_label(label: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|option| option.label() == label)
            }
        }
    };
}

option_set! {
    /// How many questions the wizard asks.
    Complexity, "complexity" {
        Simple => ("simple", "Simple and Quick"),
        Detailed => ("detailed", "Detailed and Long"),
    }
}

option_set! {
    ReverseProxy, "reverse_proxy" {
        Cloudflare => ("cloudflare", "Cloudflare Tunnel (best for beginners and dynamic IP)"),
        Nothing => ("nothing", "Nothing (Will not be able to access n8n outside of your own network)"),
    }
}

option_set! {
    Database, "database" {
        Sqlite => ("sqlite", "sqlite"),
        Postgres => ("postgresdb", "postgresdb"),
    }
}

option_set! {
    BinaryMode, "binary_mode" {
        Memory => ("default", "memory (default)"),
        Filesystem => ("filesystem", "filesystem (not available for enterprise)"),
        S3 => ("s3", "s3 remote storage"),
    }
}

option_set! {
    EmailMode, "email_mode" {
        Disabled => ("none", "No email configuration (Email password resets and user invites will not work)"),
        Smtp => ("smtp", "Manual SMTP configuration"),
        ServiceAccount => ("service_account", "Service account"),
    }
}

option_set! {
    /// Which executions n8n keeps.
    SaveMode, "save_mode" {
        All => ("all", "True"),
        None => ("none", "False"),
    }
}

option_set! {
    LogLevel, "log_level" {
        Info => ("info", "info"),
        Warn => ("warn", "warn"),
        Error => ("error", "error"),
        Verbose => ("verbose", "verbose"),
        Debug => ("debug", "debug"),
    }
}

option_set! {
    DbLogLevel, "db_log_level" {
        Query => ("query", "query"),
        Error => ("error", "error"),
        Schema => ("schema", "schema"),
        Warn => ("warn", "warn"),
        Info => ("info", "info"),
        Log => ("log", "log"),
        All => ("all", "all"),
    }
}

option_set! {
    LogOutput, "log_output" {
        Console => ("console", "console"),
        File => ("file", "file"),
    }
}

option_set! {
    WorkflowCallPolicy, "workflow_call_policy" {
        SameOwner => ("workflowsFromSameOwner", "workflowsFromSameOwner"),
        Any => ("any", "any"),
        None => ("none", "none"),
    }
}

pub const ALL_TABLES: &[OptionTable] = &[
    Complexity::TABLE,
    ReverseProxy::TABLE,
    Database::TABLE,
    BinaryMode::TABLE,
    EmailMode::TABLE,
    SaveMode::TABLE,
    LogLevel::TABLE,
    DbLogLevel::TABLE,
    LogOutput::TABLE,
    WorkflowCallPolicy::TABLE,
];

/// Uniqueness violations across every option table.
pub fn check_tables() -> Vec<String> {
    ALL_TABLES
        .iter()
        .flat_map(OptionTable::duplicates)
        .collect()
}
