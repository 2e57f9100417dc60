//! Request builders for every operation the engine issues.
//!
//! Child element order follows the qbXML schema, which the company file
//! enforces.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::element::Element;
use super::message::Request;
use crate::amount::{fixed2, plain};
use crate::mapping::{BillPayload, CounterpartyRecord, InvoicePayload, WireAddress};

/// Account type used when creating accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    /// Income account for catalog items.
    Income,
    /// Expense account for bill lines.
    Expense,
}

impl AccountType {
    /// qbXML enumeration value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

/// Transaction type used by `TxnDel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnType {
    /// Sales invoice.
    Invoice,
    /// Vendor bill.
    Bill,
}

impl TxnType {
    /// qbXML enumeration value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::Bill => "Bill",
        }
    }
}

// ========== Reference data ==========

/// `ItemSalesTaxQuery`, optionally restricted to one name.
#[must_use]
pub fn sales_tax_item_query(name: Option<&str>) -> Request {
    let request = Request::new("ItemSalesTaxQuery");
    match name {
        Some(name) => request.with(Element::leaf("FullName", name)),
        None => request.with(Element::leaf("ActiveStatus", "All")),
    }
}

/// `ItemSalesTaxAdd` for a zero-rate tax item.
#[must_use]
pub fn sales_tax_item_add(name: &str, vendor: &str, return_line: Option<&str>) -> Request {
    let mut item = Element::new("ItemSalesTaxAdd")
        .with_leaf("Name", name)
        .with_leaf("IsActive", "true")
        .with_leaf("ItemDesc", format!("{name} for 0 %"))
        .with_leaf("TaxRate", "0")
        .with_child(Element::full_name_ref("TaxVendorRef", vendor));
    if let Some(line) = return_line.map(str::trim).filter(|l| !l.is_empty()) {
        item = item.with_child(Element::full_name_ref("SalesTaxReturnLineRef", line));
    }
    Request::new("ItemSalesTaxAdd").with(item)
}

/// `SalesTaxCodeQuery` for all codes, inactive ones included.
#[must_use]
pub fn sales_tax_code_query() -> Request {
    Request::new("SalesTaxCodeQuery").with(Element::leaf("ActiveStatus", "All"))
}

/// `SalesTaxCodeAdd`. Taxable codes reference the zero-rate tax item.
#[must_use]
pub fn sales_tax_code_add(code: &str, description: &str, taxable_item: Option<&str>) -> Request {
    let mut add = Element::new("SalesTaxCodeAdd")
        .with_leaf("Name", code)
        .with_leaf("IsActive", "true")
        .with_leaf("Desc", description)
        .with_leaf("IsTaxable", if taxable_item.is_some() { "true" } else { "false" });
    if let Some(item) = taxable_item {
        add = add.with_child(Element::full_name_ref("ItemSalesTaxRef", item));
    }
    Request::new("SalesTaxCodeAdd").with(add)
}

/// `AccountQuery` by full name.
#[must_use]
pub fn account_query(name: &str) -> Request {
    Request::new("AccountQuery").with(Element::leaf("FullName", name))
}

/// `AccountAdd`.
#[must_use]
pub fn account_add(name: &str, account_type: AccountType) -> Request {
    Request::new("AccountAdd").with(
        Element::new("AccountAdd")
            .with_leaf("Name", name)
            .with_leaf("AccountType", account_type.as_str()),
    )
}

/// `ItemServiceQuery` for all service items, inactive ones included.
///
/// An inactive item still occupies its name, so adding it again would fail.
#[must_use]
pub fn service_item_query() -> Request {
    Request::new("ItemServiceQuery").with(Element::leaf("ActiveStatus", "All"))
}

/// `ItemServiceAdd`, optionally parented under another service item.
#[must_use]
pub fn service_item_add(name: &str, parent: Option<&str>, tax_code: &str, account: &str) -> Request {
    let mut item = Element::new("ItemServiceAdd").with_leaf("Name", name);
    if let Some(parent) = parent {
        item = item.with_child(Element::full_name_ref("ParentRef", parent));
    }
    item = item
        .with_child(Element::full_name_ref("SalesTaxCodeRef", tax_code))
        .with_child(
            Element::new("SalesOrPurchase")
                .with_leaf("Desc", "")
                .with_child(Element::full_name_ref("AccountRef", account)),
        );
    Request::new("ItemServiceAdd").with(item)
}

/// `ItemSubtotalQuery` by full name.
#[must_use]
pub fn subtotal_item_query(name: &str) -> Request {
    Request::new("ItemSubtotalQuery").with(Element::leaf("FullName", name))
}

/// `ItemSubtotalAdd`.
#[must_use]
pub fn subtotal_item_add(name: &str) -> Request {
    Request::new("ItemSubtotalAdd").with(
        Element::new("ItemSubtotalAdd")
            .with_leaf("Name", name)
            .with_leaf("IsActive", "true"),
    )
}

/// `TemplateQuery` for all templates.
#[must_use]
pub fn template_query() -> Request {
    Request::new("TemplateQuery")
}

// ========== Counterparties ==========

/// `CustomerQuery` by full name.
#[must_use]
pub fn customer_query(name: &str) -> Request {
    Request::new("CustomerQuery").with(Element::leaf("FullName", name))
}

/// `CustomerAdd` with mirrored billing and shipping addresses.
#[must_use]
pub fn customer_add(record: &CounterpartyRecord) -> Request {
    Request::new("CustomerAdd").with(
        Element::new("CustomerAdd")
            .with_leaf("Name", &record.name)
            .with_leaf("IsActive", "true")
            .with_child(address("BillAddress", &record.address))
            .with_child(address("ShipAddress", &record.address))
            .with_opt_leaf("Phone", record.phone.as_deref())
            .with_opt_leaf("Email", record.email.as_deref()),
    )
}

/// `VendorQuery` by full name.
#[must_use]
pub fn vendor_query(name: &str) -> Request {
    Request::new("VendorQuery").with(Element::leaf("FullName", name))
}

/// `VendorAdd` with mirrored vendor and shipping addresses.
#[must_use]
pub fn vendor_add(record: &CounterpartyRecord) -> Request {
    Request::new("VendorAdd").with(
        Element::new("VendorAdd")
            .with_leaf("Name", &record.name)
            .with_leaf("IsActive", "true")
            .with_leaf("CompanyName", &record.name)
            .with_child(address("VendorAddress", &record.address))
            .with_child(address("ShipAddress", &record.address))
            .with_opt_leaf("Phone", record.phone.as_deref())
            .with_opt_leaf("Email", record.email.as_deref())
            .with_leaf("IsVendorEligibleFor1099", "false"),
    )
}

// ========== Transactions ==========

/// `InvoiceAdd`.
#[must_use]
pub fn invoice_add(payload: &InvoicePayload) -> Request {
    let mut add = Element::new("InvoiceAdd")
        .with_child(Element::full_name_ref("CustomerRef", &payload.customer))
        .with_child(Element::full_name_ref("TemplateRef", &payload.template))
        .with_leaf("TxnDate", date(payload.txn_date))
        .with_opt_leaf("RefNumber", payload.ref_number.as_deref())
        .with_child(address("BillAddress", &payload.bill_address))
        .with_child(address("ShipAddress", &payload.ship_address))
        .with_leaf("IsPending", "false")
        .with_leaf("IsFinanceCharge", "false")
        .with_opt_leaf("PONumber", payload.po_number.as_deref())
        .with_child(Element::full_name_ref("TermsRef", &payload.terms))
        .with_leaf("FOB", &payload.fob)
        .with_child(Element::full_name_ref(
            "CustomerSalesTaxCodeRef",
            &payload.customer_tax_code,
        ))
        .with_opt_leaf("Other", payload.other.as_deref());

    for line in &payload.lines {
        let mut element = Element::new("InvoiceLineAdd")
            .with_child(Element::full_name_ref("ItemRef", &line.item_ref))
            .with_leaf("Desc", &line.desc);
        if let Some(quantity) = line.quantity {
            element = element.with_leaf("Quantity", plain(quantity));
        }
        if let Some(rate) = line.rate {
            element = element.with_leaf("Rate", fixed2(rate));
        }
        if let Some(amount) = line.amount {
            element = element.with_leaf("Amount", fixed2(amount));
        }
        if let Some(code) = &line.sales_tax_code {
            element = element.with_child(Element::full_name_ref("SalesTaxCodeRef", code));
        }
        add = add.with_child(element);
    }

    Request::new("InvoiceAdd").with(add)
}

/// `InvoiceQuery` by reference number.
#[must_use]
pub fn invoice_query_by_ref(ref_number: &str) -> Request {
    Request::new("InvoiceQuery").with(Element::leaf("RefNumber", ref_number))
}

/// `BillAdd`.
#[must_use]
pub fn bill_add(payload: &BillPayload) -> Request {
    let add = Element::new("BillAdd")
        .with_child(Element::full_name_ref("VendorRef", &payload.vendor))
        .with_leaf("TxnDate", date(payload.txn_date))
        .with_leaf("RefNumber", &payload.ref_number)
        .with_leaf("Memo", &payload.memo)
        .with_children(payload.lines.iter().map(|line| {
            Element::new("ExpenseLineAdd")
                .with_child(Element::full_name_ref("AccountRef", &line.account))
                .with_leaf("Amount", fixed2(line.amount))
                .with_opt_leaf("Memo", line.memo.as_deref())
        }));
    Request::new("BillAdd").with(add)
}

/// `BillQuery` by transaction id.
#[must_use]
pub fn bill_query_by_txn_id(txn_id: &str) -> Request {
    Request::new("BillQuery").with(Element::leaf("TxnID", txn_id))
}

/// `TxnDel`.
#[must_use]
pub fn txn_del(txn_type: TxnType, txn_id: &str) -> Request {
    Request::new("TxnDel")
        .with(Element::leaf("TxnDelType", txn_type.as_str()))
        .with(Element::leaf("TxnID", txn_id))
}

fn address(name: &str, address: &WireAddress) -> Element {
    Element::new(name)
        .with_opt_leaf("Addr1", Some(&address.addr1))
        .with_opt_leaf("Addr2", address.addr2.as_deref())
        .with_opt_leaf("Addr3", address.addr3.as_deref())
        .with_opt_leaf("City", Some(&address.city))
        .with_opt_leaf("State", address.state.as_deref())
        .with_opt_leaf("PostalCode", address.postal_code.as_deref())
        .with_opt_leaf("Country", address.country.as_deref())
}

fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Reads a decimal text field of a record, e.g. `AmountDue`.
#[must_use]
pub fn decimal_field(record: &Element, name: &str) -> Option<Decimal> {
    record.child_text(name).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::invoice_payload;
    use crate::protocol::codec::encode_request;
    use crate::testing::sample_invoice;
    use qbsync_shared::config::{CatalogConfig, QuickBooksConfig};

    #[test]
    fn test_invoice_add_wire_fields() {
        let payload = invoice_payload(
            &sample_invoice("WO-5"),
            &CatalogConfig::default(),
            &QuickBooksConfig::default(),
        );
        let request = invoice_add(&payload);
        let add = request.element().child("InvoiceAdd").unwrap();

        assert_eq!(add.path_text(&["CustomerRef", "FullName"]), Some("Acme Fleet"));
        assert_eq!(add.child_text("RefNumber"), Some("WO-5"));
        assert_eq!(add.child_text("FOB"), Some("WO-5"));
        assert_eq!(add.child_text("TxnDate"), Some("2024-03-01"));
        let first_line = add.child("InvoiceLineAdd").unwrap();
        assert_eq!(first_line.child_text("Quantity"), Some("2"));
        assert_eq!(first_line.child_text("Rate"), Some("12.50"));

        let xml = encode_request(&request).unwrap();
        assert!(xml.contains("<InvoiceAddRq><InvoiceAdd><CustomerRef><FullName>Acme Fleet</FullName></CustomerRef>"));
    }

    #[test]
    fn test_list_queries_include_inactive_entries() {
        for request in [service_item_query(), sales_tax_code_query(), sales_tax_item_query(None)] {
            assert_eq!(request.element().child_text("ActiveStatus"), Some("All"));
        }
        assert!(account_query("Service Income").element().child("ActiveStatus").is_none());
    }

    #[test]
    fn test_taxable_code_references_zero_item() {
        let taxable = sales_tax_code_add("ZST", "Zero Sales Tax Code", Some("Zero Sales Tax"));
        let exempt = sales_tax_code_add("ZNT", "Zero Non Sales Tax Code", None);

        let taxable = taxable.element().child("SalesTaxCodeAdd").unwrap();
        let exempt = exempt.element().child("SalesTaxCodeAdd").unwrap();
        assert_eq!(taxable.child_text("IsTaxable"), Some("true"));
        assert_eq!(taxable.path_text(&["ItemSalesTaxRef", "FullName"]), Some("Zero Sales Tax"));
        assert_eq!(exempt.child_text("IsTaxable"), Some("false"));
        assert!(exempt.child("ItemSalesTaxRef").is_none());
    }

    #[test]
    fn test_txn_del() {
        let request = txn_del(TxnType::Bill, "12-345");
        assert_eq!(request.element().child_text("TxnDelType"), Some("Bill"));
        assert_eq!(request.element().child_text("TxnID"), Some("12-345"));
    }
}
