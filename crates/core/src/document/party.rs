//! Counterparty types shared by invoices and bills.

use serde::{Deserialize, Serialize};

/// Postal address as sent by the business application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    /// First address line.
    pub line1: String,
    /// Second address line.
    pub line2: Option<String>,
    /// Third address line.
    pub line3: Option<String>,
    /// City.
    pub city: String,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub zipcode: Option<String>,
    /// Country.
    pub country: Option<String>,
}

/// Customer an invoice is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    /// Customer name, matched exactly against the company file.
    pub name: String,
    /// Billing and shipping address.
    pub address: Address,
    /// Phone number.
    pub mobile_phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

/// Vendor a bill is payable to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vendor {
    /// Vendor name, matched exactly against the company file.
    pub name: String,
    /// Vendor and shipping address.
    pub address: Address,
    /// Contact phone number.
    pub contact_person_mobile: Option<String>,
    /// Contact email address.
    pub contact_person_email: Option<String>,
}

/// Receiving side of a purchase order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillRecipient {
    /// Contact email quoted in the bill memo.
    pub contact_person_email: Option<String>,
}
