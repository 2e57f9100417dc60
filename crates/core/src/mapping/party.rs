//! Customer and vendor records.

use crate::document::{Address, Customer, Vendor};

/// Address block as sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireAddress {
    /// `Addr1`.
    pub addr1: String,
    /// `Addr2`.
    pub addr2: Option<String>,
    /// `Addr3`.
    pub addr3: Option<String>,
    /// `City`.
    pub city: String,
    /// `State`.
    pub state: Option<String>,
    /// `PostalCode`.
    pub postal_code: Option<String>,
    /// `Country`.
    pub country: Option<String>,
}

impl WireAddress {
    /// Full address including the third line.
    #[must_use]
    pub fn from_address(address: &Address) -> Self {
        Self {
            addr1: address.line1.clone(),
            addr2: address.line2.clone(),
            addr3: address.line3.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.zipcode.clone(),
            country: address.country.clone(),
        }
    }

    /// Address without the third line, as printed on invoices.
    #[must_use]
    pub fn two_line(address: &Address) -> Self {
        Self {
            addr3: None,
            ..Self::from_address(address)
        }
    }
}

/// A customer or vendor to create.
///
/// The billing and shipping addresses are always the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterpartyRecord {
    /// Name, also used as the company name for vendors.
    pub name: String,
    /// Billing (or vendor) and shipping address.
    pub address: WireAddress,
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

/// Builds the customer record for an invoice's "to" party.
#[must_use]
pub fn customer_record(customer: &Customer) -> CounterpartyRecord {
    CounterpartyRecord {
        name: customer.name.clone(),
        address: WireAddress::from_address(&customer.address),
        phone: customer.mobile_phone.clone(),
        email: customer.email.clone(),
    }
}

/// Builds the vendor record for a bill's "from" party.
#[must_use]
pub fn vendor_record(vendor: &Vendor) -> CounterpartyRecord {
    CounterpartyRecord {
        name: vendor.name.clone(),
        address: WireAddress::from_address(&vendor.address),
        phone: vendor.contact_person_mobile.clone(),
        email: vendor.contact_person_email.clone(),
    }
}
