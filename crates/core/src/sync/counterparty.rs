//! Customer and vendor resolution.
//!
//! Lookup is by exact name. A missing counterparty is created with its
//! address mirrored to billing and shipping.

use tracing::info;

use crate::document::{Customer, Vendor};
use crate::error::SyncError;
use crate::gateway::{RequestProcessor, Session};
use crate::mapping::{customer_record, vendor_record};
use crate::protocol::requests::{customer_add, customer_query, vendor_add, vendor_query};
use crate::provisioning::{create, exists};

/// Ensures the customer exists. Returns `true` when it was created.
pub(super) async fn ensure_customer<P: RequestProcessor + ?Sized>(
    session: &Session<'_, P>,
    customer: &Customer,
) -> Result<bool, SyncError> {
    if exists(session, &customer_query(&customer.name)).await? {
        return Ok(false);
    }
    create(session, &customer_add(&customer_record(customer))).await?;
    info!(tenant = session.tenant(), customer = %customer.name, "customer created");
    Ok(true)
}

/// Ensures the vendor exists. Returns `true` when it was created.
pub(super) async fn ensure_vendor<P: RequestProcessor + ?Sized>(
    session: &Session<'_, P>,
    vendor: &Vendor,
) -> Result<bool, SyncError> {
    if exists(session, &vendor_query(&vendor.name)).await? {
        return Ok(false);
    }
    create(session, &vendor_add(&vendor_record(vendor))).await?;
    info!(tenant = session.tenant(), vendor = %vendor.name, "vendor created");
    Ok(true)
}
