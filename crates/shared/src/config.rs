//! Application configuration management.

use std::collections::HashMap;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Accounting engine configuration.
    #[serde(default)]
    pub quickbooks: QuickBooksConfig,
    /// Reference-data name table.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://qbsync-ledger.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

/// Accounting engine settings consumed by the sync engine.
#[derive(Debug, Clone, Deserialize)]
pub struct QuickBooksConfig {
    /// Tenant code to company file path.
    #[serde(default)]
    pub companies: HashMap<String, String>,
    /// Open sessions in multi-user mode.
    #[serde(default)]
    pub multi_user_mode: bool,
    /// Invoice template that must exist in the company file.
    #[serde(default = "default_template_name")]
    pub template_name: String,
    /// Payment terms referenced by invoices.
    #[serde(default = "default_terms")]
    pub terms: String,
    /// When set, invoices are sent without a reference number and the
    /// company file assigns its own.
    #[serde(default)]
    pub keep_target_ref_number: bool,
    /// Vendor the zero-rate tax item is payable to.
    #[serde(default)]
    pub tax_agency_vendor: Option<String>,
    /// Tax return line for the zero-rate tax item.
    #[serde(default)]
    pub tax_return_line: Option<String>,
    /// Ledger rows older than this many days are pruned after each batch.
    #[serde(default = "default_retention_days")]
    pub ledger_retention_days: i64,
    /// Dispatch independent reference-data creations concurrently.
    #[serde(default = "default_true")]
    pub concurrent_provisioning: bool,
    /// Request-processor bridge endpoint.
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,
}

impl Default for QuickBooksConfig {
    fn default() -> Self {
        Self {
            companies: HashMap::new(),
            multi_user_mode: false,
            template_name: default_template_name(),
            terms: default_terms(),
            keep_target_ref_number: false,
            tax_agency_vendor: None,
            tax_return_line: None,
            ledger_retention_days: default_retention_days(),
            concurrent_provisioning: true,
            bridge_url: default_bridge_url(),
        }
    }
}

impl QuickBooksConfig {
    /// Returns the company file path configured for a tenant.
    #[must_use]
    pub fn company_path(&self, tenant: &str) -> Option<&str> {
        self.companies
            .get(tenant)
            .map(String::as_str)
            .filter(|path| !path.trim().is_empty())
    }
}

fn default_template_name() -> String {
    "Intuit Service Invoice".to_string()
}

fn default_terms() -> String {
    "Net 30".to_string()
}

fn default_retention_days() -> i64 {
    365
}

fn default_true() -> bool {
    true
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:5002".to_string()
}

/// Names of the reference data the engine provisions and references.
///
/// Every entry can be overridden so an existing company file's naming
/// scheme can be reused without code changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Top-level grouping service item.
    pub group_item: String,
    /// Service item for parts lines.
    pub parts_item: String,
    /// Service item for labor lines.
    pub labor_item: String,
    /// Service item for misc-charge lines.
    pub misc_charges_item: String,
    /// Service item for disposal-fee lines.
    pub disposal_item: String,
    /// Subtotal pseudo-item.
    pub subtotal_item: String,
    /// Zero-rate sales tax item.
    pub zero_tax_item: String,
    /// Zero-rate taxable tax code.
    pub taxable_code: String,
    /// Zero-rate non-taxable tax code.
    pub non_taxable_code: String,
    /// Tax item used when labor is taxed separately.
    pub labor_tax_item: String,
    /// Income account for parts, misc charges and disposal fees.
    pub parts_income_account: String,
    /// Income account for labor.
    pub service_income_account: String,
    /// Label of the subtotal after parts.
    pub parts_subtotal_label: String,
    /// Label of the subtotal after separately taxed labor.
    pub labor_subtotal_label: String,
    /// Label of the subtotal after the labor tax line.
    pub labor_tax_subtotal_label: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            group_item: "Fixy".to_string(),
            parts_item: "Parts".to_string(),
            labor_item: "Labor".to_string(),
            misc_charges_item: "Misc Charges".to_string(),
            disposal_item: "Disposal Fee".to_string(),
            subtotal_item: "Subtotal".to_string(),
            zero_tax_item: "Zero Sales Tax".to_string(),
            taxable_code: "ZST".to_string(),
            non_taxable_code: "ZNT".to_string(),
            labor_tax_item: "Labor Tax".to_string(),
            parts_income_account: "Parts and Materials Income".to_string(),
            service_income_account: "Service Income".to_string(),
            parts_subtotal_label: "Parts Subtotal".to_string(),
            labor_subtotal_label: "Labor Subtotal".to_string(),
            labor_tax_subtotal_label: "Labor Tax Subtotal".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Full name of a child item under the grouping item (`parent:child`).
    #[must_use]
    pub fn qualified(&self, child: &str) -> String {
        format!("{}:{child}", self.group_item)
    }

    /// Label of the running subtotal that follows a declared tax line.
    #[must_use]
    pub fn tax_subtotal_label(&self, code: &str) -> String {
        format!("{code} {}", self.subtotal_item)
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("QBSYNC").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
