//! Test fixtures: sample documents and an in-process company file.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use qbsync_shared::config::QuickBooksConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::document::{
    Address, Bill, BillLine, BillRecipient, BillTaxLine, Customer, DeclaredTax, DisposalFee,
    Invoice, LaborLine, MiscCharge, PartLine, Vendor, WorkLine,
};
use crate::gateway::{GatewayError, RequestProcessor, SessionTicket};
use crate::protocol::{
    Element, Response, STATUS_ALREADY_EXISTS, STATUS_NO_MATCH, STATUS_OBJECT_NOT_FOUND,
    decode_request, encode_response,
};

/// Tenant configured by [`quickbooks_settings`].
pub const TENANT: &str = "acme";

/// Settings with one configured tenant and a tax agency vendor.
pub fn quickbooks_settings() -> QuickBooksConfig {
    QuickBooksConfig {
        companies: HashMap::from([(TENANT.to_string(), r"C:\Company\acme.qbw".to_string())]),
        tax_agency_vendor: Some("State Board of Equalization".to_string()),
        ..QuickBooksConfig::default()
    }
}

fn address() -> Address {
    Address {
        line1: "100 Depot Rd".into(),
        line2: Some("Bay 4".into()),
        line3: Some("Attn: Fleet Desk".into()),
        city: "Springfield".into(),
        state: Some("IL".into()),
        zipcode: Some("62701".into()),
        country: Some("US".into()),
    }
}

/// A valid invoice: one truck with a part, a misc charge, a disposal fee and
/// labor, taxed with GST 5 %.
pub fn sample_invoice(work_order_id: &str) -> Invoice {
    Invoice {
        work_order_id: work_order_id.into(),
        existing_ref_number: None,
        invoice_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        to: Customer {
            name: "Acme Fleet".into(),
            address: address(),
            mobile_phone: Some("555-0100".into()),
            email: Some("ap@acmefleet.example".into()),
        },
        mileage: Some("120500".into()),
        vehicle_info: Some("2019 Freightliner".into()),
        parts_tax: vec![DeclaredTax {
            name: "GST".into(),
            code: "GST".into(),
            tax: dec!(5),
            tax_amount: Some(dec!(5.00)),
        }],
        labor_tax_same_as_part: true,
        labor_tax_percentage: None,
        labor_tax: None,
        lines: vec![WorkLine {
            item: "Truck".into(),
            parts: vec![PartLine {
                name: "Oil Filter".into(),
                selling_price: dec!(12.5),
                quantity: dec!(2),
                unit: "pc".into(),
            }],
            labors: vec![LaborLine {
                name: "Oil Change".into(),
                labor_per_hour: dec!(90),
                hours: dec!(1.5),
            }],
            misc_charges: vec![MiscCharge {
                name: "Shop Supplies".into(),
                total_amount: dec!(7.25),
            }],
            disposal_fees: vec![DisposalFee {
                name: "Tire".into(),
                fee_amount: dec!(3),
                quantity: dec!(4),
                unit: "ea".into(),
            }],
        }],
    }
}

/// A valid bill with two lines; the first carries a GST tax sub-line.
pub fn sample_bill(po_id: &str) -> Bill {
    Bill {
        po_id: po_id.into(),
        existing_ref_number: None,
        from: Vendor {
            name: "Parts Depot".into(),
            address: address(),
            contact_person_mobile: Some("555-0199".into()),
            contact_person_email: Some("sales@partsdepot.example".into()),
        },
        to: BillRecipient {
            contact_person_email: Some("buyer@fleet.example".into()),
        },
        lines: vec![
            BillLine {
                purchase_date: "2024-05-02T14:30:00.000Z".into(),
                amount: dec!(100.00),
                expense_account: "Repairs and Maintenance".into(),
                part_memo: Some("Brake pads".into()),
                tax_rate: Some(dec!(5)),
                tax_line: Some(BillTaxLine {
                    amount: dec!(5.00),
                    expense_account: "Sales Tax Paid".into(),
                    description: "GST".into(),
                }),
            },
            BillLine {
                purchase_date: "2024-05-03T09:00:00.000Z".into(),
                amount: dec!(40.00),
                expense_account: "Repairs and Maintenance".into(),
                part_memo: Some("Rotor machining".into()),
                tax_rate: None,
                tax_line: None,
            },
        ],
    }
}

// ========== Fake company file ==========

#[derive(Debug, Clone)]
struct TaxItem {
    name: String,
    rate: Decimal,
    active: bool,
}

#[derive(Debug, Clone)]
struct StoredInvoice {
    txn_id: String,
    ref_number: String,
    fob: String,
}

#[derive(Debug, Clone)]
struct StoredBill {
    txn_id: String,
    ref_number: String,
    amount_due: Decimal,
    is_paid: bool,
}

#[derive(Debug, Default)]
struct CompanyFile {
    tax_items: Vec<TaxItem>,
    tax_codes: Vec<String>,
    accounts: Vec<(String, String)>,
    service_items: Vec<String>,
    inactive_service_items: Vec<String>,
    subtotal_items: Vec<String>,
    templates: Vec<String>,
    customers: Vec<String>,
    vendors: Vec<String>,
    invoices: Vec<StoredInvoice>,
    bills: Vec<StoredBill>,
    next_txn: u32,
    requests: Vec<String>,
    failures: HashMap<String, (i32, String)>,
    refuse_sessions: bool,
    opened: usize,
    closed: usize,
}

impl CompanyFile {
    fn txn_id(&mut self) -> String {
        self.next_txn += 1;
        format!("{:X}-1700000000", self.next_txn)
    }
}

/// An in-process company file that answers qbXML documents.
///
/// Requests are decoded with the crate's own codec; every request is logged
/// by operation name so tests can assert which calls were made.
#[derive(Debug)]
pub struct FakeCompany {
    state: Mutex<CompanyFile>,
}

impl Default for FakeCompany {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCompany {
    /// A company file holding only the default invoice template.
    pub fn new() -> Self {
        let company = Self::without_templates();
        company
            .state()
            .templates
            .push(QuickBooksConfig::default().template_name);
        company
    }

    /// An empty company file.
    pub fn without_templates() -> Self {
        Self {
            state: Mutex::new(CompanyFile::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CompanyFile> {
        self.state.lock().unwrap()
    }

    /// Adds a sales tax item.
    pub fn seed_tax_item(&self, name: &str, rate: Decimal, active: bool) {
        self.state().tax_items.push(TaxItem {
            name: name.into(),
            rate,
            active,
        });
    }

    /// Adds a service item by full name.
    pub fn seed_service_item(&self, full_name: &str) {
        self.state().service_items.push(full_name.into());
    }

    /// Adds an inactive service item by full name.
    pub fn seed_inactive_service_item(&self, full_name: &str) {
        self.state().inactive_service_items.push(full_name.into());
    }

    /// Adds an invoice and returns its transaction id.
    pub fn seed_invoice(&self, ref_number: &str, fob: &str) -> String {
        let mut state = self.state();
        let txn_id = state.txn_id();
        state.invoices.push(StoredInvoice {
            txn_id: txn_id.clone(),
            ref_number: ref_number.into(),
            fob: fob.into(),
        });
        txn_id
    }

    /// Marks a bill as paid.
    pub fn mark_bill_paid(&self, txn_id: &str) {
        for bill in &mut self.state().bills {
            if bill.txn_id == txn_id {
                bill.is_paid = true;
            }
        }
    }

    /// Answers every request for `operation` with the given status.
    pub fn fail(&self, operation: &str, status: i32, message: &str) {
        self.state()
            .failures
            .insert(operation.into(), (status, message.into()));
    }

    /// Removes all injected failures.
    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Refuses to open sessions.
    pub fn refuse_sessions(&self) {
        self.state().refuse_sessions = true;
    }

    /// Number of requests received for an operation.
    pub fn count(&self, operation: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|op| op.as_str() == operation)
            .count()
    }

    /// Number of add requests received, of any kind.
    pub fn add_count(&self) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|op| op.ends_with("Add"))
            .count()
    }

    /// Operations received, in order.
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    /// Sessions opened and closed so far.
    pub fn sessions(&self) -> (usize, usize) {
        let state = self.state();
        (state.opened, state.closed)
    }

    /// Transaction ids of stored invoices.
    pub fn invoice_txn_ids(&self) -> Vec<String> {
        self.state().invoices.iter().map(|i| i.txn_id.clone()).collect()
    }

    /// Transaction ids of stored bills.
    pub fn bill_txn_ids(&self) -> Vec<String> {
        self.state().bills.iter().map(|b| b.txn_id.clone()).collect()
    }

    /// True when a service item with the full name exists.
    pub fn has_service_item(&self, full_name: &str) -> bool {
        self.state().service_items.iter().any(|i| i == full_name)
    }

    /// Type of an account, if it exists.
    pub fn account_type(&self, name: &str) -> Option<String> {
        self.state()
            .accounts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t.clone())
    }

    /// True when a customer with the name exists.
    pub fn has_customer(&self, name: &str) -> bool {
        self.state().customers.iter().any(|c| c == name)
    }

    /// True when a vendor with the name exists.
    pub fn has_vendor(&self, name: &str) -> bool {
        self.state().vendors.iter().any(|v| v == name)
    }

    fn handle(&self, operation: &str, rq: &Element) -> Response {
        let mut state = self.state();
        state.requests.push(operation.to_string());
        if let Some((status, message)) = state.failures.get(operation) {
            return Response::new(operation, *status, message.clone());
        }

        let full_name = rq.child_text("FullName").map(str::to_string);
        match operation {
            "ItemSalesTaxQuery" => {
                let items: Vec<Element> = state
                    .tax_items
                    .iter()
                    .filter(|i| full_name.as_ref().is_none_or(|n| &i.name == n))
                    .map(|i| {
                        Element::new("ItemSalesTaxRet")
                            .with_leaf("Name", &i.name)
                            .with_leaf("IsActive", i.active.to_string())
                            .with_leaf("TaxRate", i.rate.to_string())
                    })
                    .collect();
                listing(operation, items, full_name.is_some())
            }
            "ItemSalesTaxAdd" => {
                let add = rq.child("ItemSalesTaxAdd").cloned().unwrap_or_default();
                state.tax_items.push(TaxItem {
                    name: text(&add, "Name"),
                    rate: Decimal::from_str(&text(&add, "TaxRate")).unwrap_or_default(),
                    active: true,
                });
                Response::ok(operation)
            }
            "SalesTaxCodeQuery" => {
                let codes = state
                    .tax_codes
                    .iter()
                    .map(|c| Element::new("SalesTaxCodeRet").with_leaf("Name", c))
                    .collect();
                listing(operation, codes, false)
            }
            "SalesTaxCodeAdd" => {
                let name = text(rq.child("SalesTaxCodeAdd").unwrap_or(rq), "Name");
                if state.tax_codes.contains(&name) {
                    return Response::new(
                        operation,
                        STATUS_ALREADY_EXISTS,
                        format!("The name \"{name}\" of the list element is already in use."),
                    );
                }
                state.tax_codes.push(name);
                Response::ok(operation)
            }
            "AccountQuery" => {
                let found = state
                    .accounts
                    .iter()
                    .filter(|(n, _)| full_name.as_ref() == Some(n))
                    .map(|(n, t)| {
                        Element::new("AccountRet")
                            .with_leaf("FullName", n)
                            .with_leaf("AccountType", t)
                    })
                    .collect();
                listing(operation, found, true)
            }
            "AccountAdd" => {
                let add = rq.child("AccountAdd").cloned().unwrap_or_default();
                state
                    .accounts
                    .push((text(&add, "Name"), text(&add, "AccountType")));
                Response::ok(operation)
            }
            "ItemServiceQuery" => {
                let all = rq.child_text("ActiveStatus") == Some("All");
                let items = state
                    .service_items
                    .iter()
                    .chain(state.inactive_service_items.iter().filter(|_| all))
                    .map(|i| {
                        let name = i.rsplit(':').next().unwrap_or(i);
                        Element::new("ItemServiceRet")
                            .with_leaf("Name", name)
                            .with_leaf("FullName", i)
                    })
                    .collect();
                listing(operation, items, false)
            }
            "ItemServiceAdd" => {
                let add = rq.child("ItemServiceAdd").cloned().unwrap_or_default();
                let name = text(&add, "Name");
                let full_name = match add.path_text(&["ParentRef", "FullName"]) {
                    Some(parent)
                        if !state
                            .service_items
                            .iter()
                            .chain(&state.inactive_service_items)
                            .any(|i| i == parent) =>
                    {
                        return Response::new(
                            operation,
                            3140,
                            format!("There is an invalid reference to QuickBooks Item \"{parent}\"."),
                        );
                    }
                    Some(parent) => format!("{parent}:{name}"),
                    None => name,
                };
                if state
                    .service_items
                    .iter()
                    .chain(&state.inactive_service_items)
                    .any(|i| *i == full_name)
                {
                    return Response::new(
                        operation,
                        3100,
                        format!("The name \"{full_name}\" of the list element is already in use."),
                    );
                }
                state.service_items.push(full_name);
                Response::ok(operation)
            }
            "ItemSubtotalQuery" => {
                let found = state
                    .subtotal_items
                    .iter()
                    .filter(|n| full_name.as_ref() == Some(n))
                    .map(|n| Element::new("ItemSubtotalRet").with_leaf("Name", n))
                    .collect();
                listing(operation, found, true)
            }
            "ItemSubtotalAdd" => {
                let name = text(rq.child("ItemSubtotalAdd").unwrap_or(rq), "Name");
                state.subtotal_items.push(name);
                Response::ok(operation)
            }
            "TemplateQuery" => {
                let templates = state
                    .templates
                    .iter()
                    .map(|t| Element::new("TemplateRet").with_leaf("Name", t))
                    .collect();
                listing(operation, templates, false)
            }
            "CustomerQuery" | "VendorQuery" => {
                let names = if operation == "CustomerQuery" {
                    &state.customers
                } else {
                    &state.vendors
                };
                let ret = if operation == "CustomerQuery" {
                    "CustomerRet"
                } else {
                    "VendorRet"
                };
                let found = names
                    .iter()
                    .filter(|n| full_name.as_ref() == Some(n))
                    .map(|n| Element::new(ret).with_leaf("Name", n))
                    .collect();
                listing(operation, found, true)
            }
            "CustomerAdd" => {
                let name = text(rq.child("CustomerAdd").unwrap_or(rq), "Name");
                state.customers.push(name);
                Response::ok(operation)
            }
            "VendorAdd" => {
                let name = text(rq.child("VendorAdd").unwrap_or(rq), "Name");
                state.vendors.push(name);
                Response::ok(operation)
            }
            "InvoiceAdd" => {
                let add = rq.child("InvoiceAdd").cloned().unwrap_or_default();
                let txn_id = state.txn_id();
                let ref_number = add
                    .child_text("RefNumber")
                    .map_or_else(|| (1000 + state.next_txn).to_string(), str::to_string);
                let invoice = StoredInvoice {
                    txn_id,
                    ref_number,
                    fob: text(&add, "FOB"),
                };
                let record = invoice_ret(&invoice).with_leaf("TxnDate", text(&add, "TxnDate"));
                state.invoices.push(invoice);
                Response::ok(operation).with_record(record)
            }
            "InvoiceQuery" => {
                let reference = rq.child_text("RefNumber").unwrap_or_default();
                let found = state
                    .invoices
                    .iter()
                    .filter(|i| i.ref_number == reference)
                    .map(invoice_ret)
                    .collect();
                listing(operation, found, false)
            }
            "BillAdd" => {
                let add = rq.child("BillAdd").cloned().unwrap_or_default();
                let amount_due = add
                    .children_named("ExpenseLineAdd")
                    .filter_map(|l| l.child_text("Amount"))
                    .filter_map(|a| Decimal::from_str(a).ok())
                    .sum();
                let bill = StoredBill {
                    txn_id: state.txn_id(),
                    ref_number: text(&add, "RefNumber"),
                    amount_due,
                    is_paid: false,
                };
                let record = bill_ret(&bill).with_leaf("TxnDate", text(&add, "TxnDate"));
                state.bills.push(bill);
                Response::ok(operation).with_record(record)
            }
            "BillQuery" => {
                let txn_id = rq.child_text("TxnID").unwrap_or_default();
                let found = state
                    .bills
                    .iter()
                    .filter(|b| b.txn_id == txn_id)
                    .map(bill_ret)
                    .collect();
                listing(operation, found, true)
            }
            "TxnDel" => {
                let txn_id = rq.child_text("TxnID").unwrap_or_default().to_string();
                let removed = match rq.child_text("TxnDelType") {
                    Some("Invoice") => remove(&mut state.invoices, |i| i.txn_id == txn_id),
                    Some("Bill") => remove(&mut state.bills, |b| b.txn_id == txn_id),
                    _ => false,
                };
                if removed {
                    Response::ok(operation).with_record(Element::leaf("TxnID", txn_id))
                } else {
                    Response::new(
                        operation,
                        3120,
                        format!("Object \"{txn_id}\" specified in the request cannot be found."),
                    )
                }
            }
            other => Response::new(other, 3000, format!("unsupported request {other}")),
        }
    }
}

fn text(element: &Element, name: &str) -> String {
    element.child_text(name).unwrap_or_default().to_string()
}

fn listing(operation: &str, records: Vec<Element>, by_name: bool) -> Response {
    if records.is_empty() {
        let status = if by_name {
            STATUS_OBJECT_NOT_FOUND
        } else {
            STATUS_NO_MATCH
        };
        return Response::new(operation, status, "No matching objects were found.");
    }
    records
        .into_iter()
        .fold(Response::ok(operation), Response::with_record)
}

fn invoice_ret(invoice: &StoredInvoice) -> Element {
    Element::new("InvoiceRet")
        .with_leaf("TxnID", &invoice.txn_id)
        .with_leaf("RefNumber", &invoice.ref_number)
        .with_leaf("FOB", &invoice.fob)
}

fn bill_ret(bill: &StoredBill) -> Element {
    Element::new("BillRet")
        .with_leaf("TxnID", &bill.txn_id)
        .with_leaf("RefNumber", &bill.ref_number)
        .with_leaf("AmountDue", bill.amount_due.to_string())
        .with_leaf("IsPaid", bill.is_paid.to_string())
}

fn remove<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

#[async_trait]
impl RequestProcessor for FakeCompany {
    async fn open(&self, _company_path: &str, _multi_user: bool) -> Result<SessionTicket, GatewayError> {
        let mut state = self.state();
        if state.refuse_sessions {
            return Err(GatewayError::Transport("could not start a session".into()));
        }
        state.opened += 1;
        Ok(SessionTicket::new(format!("ticket-{}", state.opened)))
    }

    async fn exchange(&self, _ticket: &SessionTicket, request: &str) -> Result<String, GatewayError> {
        let request = decode_request(request)?;
        let response = self.handle(request.operation(), request.element());
        Ok(encode_response(&response)?)
    }

    async fn close(&self, _ticket: &SessionTicket) -> Result<(), GatewayError> {
        self.state().closed += 1;
        Ok(())
    }
}
