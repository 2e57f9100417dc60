//! Reference-data role table.
//!
//! Names come from [`CatalogConfig`]; this module only decides which items
//! exist, where they hang, and which tax code and account each one uses.

use qbsync_shared::config::CatalogConfig;

/// A service item the invoice lines reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceItemSpec {
    /// Item name.
    pub name: String,
    /// Full name, `parent:name` for children.
    pub full_name: String,
    /// Parent item, `None` for the group item.
    pub parent: Option<String>,
    /// Sales tax code.
    pub tax_code: String,
    /// Income account.
    pub account: String,
}

/// Service items to provision, group item first.
#[must_use]
pub fn service_items(catalog: &CatalogConfig) -> Vec<ServiceItemSpec> {
    let group = ServiceItemSpec {
        name: catalog.group_item.clone(),
        full_name: catalog.group_item.clone(),
        parent: None,
        tax_code: catalog.non_taxable_code.clone(),
        account: catalog.parts_income_account.clone(),
    };

    let child = |name: &str, account: &str| ServiceItemSpec {
        name: name.to_string(),
        full_name: catalog.qualified(name),
        parent: Some(catalog.group_item.clone()),
        tax_code: catalog.taxable_code.clone(),
        account: account.to_string(),
    };

    vec![
        group,
        child(&catalog.parts_item, &catalog.parts_income_account),
        child(&catalog.labor_item, &catalog.service_income_account),
        child(&catalog.misc_charges_item, &catalog.parts_income_account),
        child(&catalog.disposal_item, &catalog.parts_income_account),
    ]
}

/// Income accounts referenced by the service items, without repeats.
#[must_use]
pub fn income_accounts(catalog: &CatalogConfig) -> Vec<&str> {
    let mut accounts = vec![catalog.parts_income_account.as_str()];
    if catalog.service_income_account != catalog.parts_income_account {
        accounts.push(catalog.service_income_account.as_str());
    }
    accounts
}
