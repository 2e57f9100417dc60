//! Reference-data provisioner.
//!
//! Every check is a query followed by a create when the item is absent, so
//! the whole bootstrap can be re-run safely after a partial failure. Existing
//! items are never modified.

pub mod catalog;

use std::future::Future;

use futures::future::try_join_all;
use qbsync_shared::config::{CatalogConfig, QuickBooksConfig};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SyncError;
use crate::gateway::{RequestProcessor, Session};
use crate::protocol::requests::{
    account_add, account_query, sales_tax_code_add, sales_tax_code_query, sales_tax_item_add,
    sales_tax_item_query, service_item_add, service_item_query, subtotal_item_add,
    subtotal_item_query, template_query,
};
use crate::protocol::{AccountType, Request, Response, STATUS_ALREADY_EXISTS};
use crate::tax::{TaxRate, TaxSnapshot};
use catalog::{ServiceItemSpec, income_accounts, service_items};

/// Names of the reference data created by a bootstrap run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapReport {
    /// Created items, in creation order per step.
    pub created: Vec<String>,
}

impl BootstrapReport {
    /// True when everything already existed.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

/// Ensures reference data exists in one tenant's company file.
pub struct Provisioner<'a, P: RequestProcessor + ?Sized> {
    session: &'a Session<'a, P>,
    catalog: &'a CatalogConfig,
    settings: &'a QuickBooksConfig,
}

impl<'a, P: RequestProcessor + ?Sized> Provisioner<'a, P> {
    /// Creates a provisioner bound to an open session.
    #[must_use]
    pub const fn new(
        session: &'a Session<'a, P>,
        catalog: &'a CatalogConfig,
        settings: &'a QuickBooksConfig,
    ) -> Self {
        Self {
            session,
            catalog,
            settings,
        }
    }

    /// Ensures the zero-rate tax item, both zero-rate tax codes, the income
    /// accounts, the service item catalog and the subtotal item exist.
    ///
    /// # Errors
    ///
    /// Returns the first failure; items created before it are kept and found
    /// by the next run.
    pub async fn ensure_bootstrap(&self) -> Result<BootstrapReport, SyncError> {
        let mut report = BootstrapReport::default();

        if self.ensure_zero_tax_item().await? {
            report.created.push(self.catalog.zero_tax_item.clone());
        }
        report.created.extend(self.ensure_tax_codes().await?);
        report.created.extend(self.ensure_income_accounts().await?);
        report.created.extend(self.ensure_service_items().await?);
        if self.ensure_subtotal_item().await? {
            report.created.push(self.catalog.subtotal_item.clone());
        }

        info!(
            tenant = self.session.tenant(),
            created = report.created.len(),
            "reference data ready"
        );
        Ok(report)
    }

    /// Ensures the zero-rate sales tax item exists.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` when the item is missing and no tax
    /// agency vendor is configured.
    pub async fn ensure_zero_tax_item(&self) -> Result<bool, SyncError> {
        let name = &self.catalog.zero_tax_item;
        if exists(self.session, &sales_tax_item_query(Some(name))).await? {
            return Ok(false);
        }

        let vendor = self
            .settings
            .tax_agency_vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                SyncError::Validation(format!(
                    "a tax agency vendor must be configured to create the {name} item"
                ))
            })?;
        create(
            self.session,
            &sales_tax_item_add(name, vendor, self.settings.tax_return_line.as_deref()),
        )
        .await?;
        info!(tenant = self.session.tenant(), item = %name, "zero-rate tax item created");
        Ok(true)
    }

    /// Ensures the taxable and non-taxable zero-rate codes exist.
    ///
    /// An add answered with "already exists" counts as present.
    pub async fn ensure_tax_codes(&self) -> Result<Vec<String>, SyncError> {
        let response = self.session.send(&sales_tax_code_query()).await?;
        let known: Vec<String> = listing(&response)?
            .records("SalesTaxCodeRet")
            .filter_map(|r| r.child_text("Name"))
            .map(str::to_string)
            .collect();

        let codes = [
            (
                &self.catalog.taxable_code,
                "Zero Sales Tax Code",
                Some(self.catalog.zero_tax_item.as_str()),
            ),
            (&self.catalog.non_taxable_code, "Zero Non Sales Tax Code", None),
        ];

        let mut created = Vec::new();
        for (code, description, item) in codes {
            if known.contains(code) {
                continue;
            }
            let request = sales_tax_code_add(code, description, item);
            let response = self.session.send(&request).await?;
            match response.status_code {
                _ if response.is_success() => {
                    info!(tenant = self.session.tenant(), code = %code, "tax code created");
                    created.push(code.clone());
                }
                STATUS_ALREADY_EXISTS => debug!(code = %code, "tax code already exists"),
                status => return Err(SyncError::rejected(request.operation(), status, &response.message)),
            }
        }
        Ok(created)
    }

    /// Ensures the income accounts used by the service items exist.
    pub async fn ensure_income_accounts(&self) -> Result<Vec<String>, SyncError> {
        let accounts = income_accounts(self.catalog);
        let outcomes = self
            .each(accounts, |name| async move {
                let created = self.ensure_account(name, AccountType::Income).await?;
                Ok::<_, SyncError>(created.then(|| name.to_string()))
            })
            .await?;
        Ok(outcomes.into_iter().flatten().collect())
    }

    /// Ensures the service item catalog exists. The group item is created
    /// before any child.
    pub async fn ensure_service_items(&self) -> Result<Vec<String>, SyncError> {
        let response = self.session.send(&service_item_query()).await?;
        let known: Vec<String> = listing(&response)?
            .records("ItemServiceRet")
            .filter_map(|r| r.child_text("FullName").or_else(|| r.child_text("Name")))
            .map(str::to_string)
            .collect();

        let missing: Vec<ServiceItemSpec> = service_items(self.catalog)
            .into_iter()
            .filter(|spec| !known.contains(&spec.full_name))
            .collect();
        let (groups, children): (Vec<_>, Vec<_>) =
            missing.iter().partition(|spec| spec.parent.is_none());

        let mut created = Vec::with_capacity(missing.len());
        for spec in groups {
            self.create_service_item(spec).await?;
            created.push(spec.full_name.clone());
        }
        self.each(children.clone(), |spec| self.create_service_item(spec))
            .await?;
        created.extend(children.iter().map(|spec| spec.full_name.clone()));
        Ok(created)
    }

    /// Ensures the subtotal item exists.
    pub async fn ensure_subtotal_item(&self) -> Result<bool, SyncError> {
        let name = &self.catalog.subtotal_item;
        if exists(self.session, &subtotal_item_query(name)).await? {
            return Ok(false);
        }
        create(self.session, &subtotal_item_add(name)).await?;
        info!(tenant = self.session.tenant(), item = %name, "subtotal item created");
        Ok(true)
    }

    /// Ensures an account exists, creating it with the given type.
    ///
    /// Returns `true` when the account was created.
    pub async fn ensure_account(&self, name: &str, account_type: AccountType) -> Result<bool, SyncError> {
        if exists(self.session, &account_query(name)).await? {
            return Ok(false);
        }
        create(self.session, &account_add(name, account_type)).await?;
        info!(
            tenant = self.session.tenant(),
            account = name,
            account_type = account_type.as_str(),
            "account created"
        );
        Ok(true)
    }

    /// Checks that the configured invoice template exists.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotFound` when no template has the configured name.
    pub async fn verify_template(&self) -> Result<(), SyncError> {
        let name = &self.settings.template_name;
        let response = self.session.send(&template_query()).await?;
        let found = listing(&response)?
            .records("TemplateRet")
            .any(|r| r.child_text("Name") == Some(name.as_str()));
        if found {
            Ok(())
        } else {
            Err(SyncError::NotFound(format!(
                "invoice template '{name}' does not exist in the company file"
            )))
        }
    }

    /// Fetches every sales tax item, active or not.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotFound` when the company file has no sales tax
    /// items at all.
    pub async fn fetch_tax_snapshot(&self) -> Result<TaxSnapshot, SyncError> {
        let request = sales_tax_item_query(None);
        let response = self.session.send(&request).await?;
        if response.is_not_found() {
            return Err(SyncError::NotFound(
                "no sales tax items exist in the company file".to_string(),
            ));
        }
        if !response.is_success() {
            return Err(SyncError::rejected(
                request.operation(),
                response.status_code,
                &response.message,
            ));
        }
        let rates: Vec<TaxRate> = response
            .records("ItemSalesTaxRet")
            .filter_map(TaxRate::from_record)
            .collect();
        debug!(tenant = self.session.tenant(), rates = rates.len(), "tax snapshot fetched");
        Ok(TaxSnapshot::new(rates))
    }

    async fn create_service_item(&self, spec: &ServiceItemSpec) -> Result<(), SyncError> {
        create(
            self.session,
            &service_item_add(&spec.name, spec.parent.as_deref(), &spec.tax_code, &spec.account),
        )
        .await?;
        info!(tenant = self.session.tenant(), item = %spec.full_name, "service item created");
        Ok(())
    }

    /// Runs independent creations concurrently, or one after another when
    /// the transport does not tolerate interleaved requests.
    async fn each<T, R, F, Fut>(&self, items: Vec<T>, op: F) -> Result<Vec<R>, SyncError>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, SyncError>>,
    {
        if self.settings.concurrent_provisioning {
            return try_join_all(items.into_iter().map(op)).await;
        }
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(op(item).await?);
        }
        Ok(results)
    }
}

/// Sends a lookup and reports whether it matched.
///
/// # Errors
///
/// Returns `SyncError::ExternalRejected` for statuses other than success or
/// not found.
pub(crate) async fn exists<P: RequestProcessor + ?Sized>(
    session: &Session<'_, P>,
    request: &Request,
) -> Result<bool, SyncError> {
    let response = session.send(request).await?;
    if response.is_success() {
        Ok(true)
    } else if response.is_not_found() {
        Ok(false)
    } else {
        Err(SyncError::rejected(
            request.operation(),
            response.status_code,
            &response.message,
        ))
    }
}

/// Sends an add request that must succeed.
pub(crate) async fn create<P: RequestProcessor + ?Sized>(
    session: &Session<'_, P>,
    request: &Request,
) -> Result<Response, SyncError> {
    let response = session.send(request).await?;
    if response.is_success() {
        Ok(response)
    } else {
        Err(SyncError::rejected(
            request.operation(),
            response.status_code,
            &response.message,
        ))
    }
}

/// Accepts a list query response; "no match" is an empty list.
fn listing(response: &Response) -> Result<&Response, SyncError> {
    if response.is_success() || response.is_not_found() {
        Ok(response)
    } else {
        Err(SyncError::rejected(
            &response.operation,
            response.status_code,
            &response.message,
        ))
    }
}
