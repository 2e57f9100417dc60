//! Request and response messages.

use super::element::Element;

/// Operation completed.
pub const STATUS_OK: i32 = 0;
/// A list query matched nothing.
pub const STATUS_NO_MATCH: i32 = 1;
/// A query by name or id referenced an object that does not exist.
pub const STATUS_OBJECT_NOT_FOUND: i32 = 500;
/// An add request named an object that already exists.
pub const STATUS_ALREADY_EXISTS: i32 = 530;

/// A single request message, e.g. `CustomerQueryRq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    operation: String,
    element: Element,
}

impl Request {
    /// Creates an empty request for an operation such as `"CustomerQuery"`.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        let element = Element::new(format!("{operation}Rq"));
        Self { operation, element }
    }

    /// Wraps an already built `{operation}Rq` element.
    ///
    /// Returns `None` when the element name does not end in `Rq`.
    #[must_use]
    pub fn from_element(element: Element) -> Option<Self> {
        let operation = element.name.strip_suffix("Rq")?.to_string();
        Some(Self { operation, element })
    }

    /// Appends a child to the request element.
    #[must_use]
    pub fn with(mut self, child: Element) -> Self {
        self.element.children.push(child);
        self
    }

    /// Operation name without the `Rq` suffix.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The `{operation}Rq` element.
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }
}

/// A decoded `{operation}Rs` response message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Operation name without the `Rs` suffix.
    pub operation: String,
    /// Numeric status code, `0` on success.
    pub status_code: i32,
    /// Status severity (`Info`, `Warn`, `Error`).
    pub severity: String,
    /// Human-readable status message.
    pub message: String,
    /// The response element itself; its children are the `*Ret` records.
    pub body: Element,
}

impl Response {
    /// Creates a response with no records.
    #[must_use]
    pub fn new(operation: impl Into<String>, status_code: i32, message: impl Into<String>) -> Self {
        let operation = operation.into();
        let severity = if status_code == STATUS_OK || status_code == STATUS_NO_MATCH {
            "Info"
        } else {
            "Error"
        };
        let body = Element::new(format!("{operation}Rs"));
        Self {
            operation,
            status_code,
            severity: severity.to_string(),
            message: message.into(),
            body,
        }
    }

    /// Creates a successful response.
    #[must_use]
    pub fn ok(operation: impl Into<String>) -> Self {
        Self::new(operation, STATUS_OK, "Status OK")
    }

    /// Appends a record to the response body.
    #[must_use]
    pub fn with_record(mut self, record: Element) -> Self {
        self.body.children.push(record);
        self
    }

    /// True when the status code is `0`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }

    /// True when a lookup found nothing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status_code == STATUS_NO_MATCH || self.status_code == STATUS_OBJECT_NOT_FOUND
    }

    /// Iterates over records with the given name, e.g. `InvoiceRet`.
    pub fn records<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.body.children_named(name)
    }

    /// Returns the first record with the given name.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&Element> {
        self.body.child(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_names() {
        let request = Request::new("CustomerQuery").with(Element::leaf("FullName", "Acme"));
        assert_eq!(request.operation(), "CustomerQuery");
        assert_eq!(request.element().name, "CustomerQueryRq");
        assert_eq!(request.element().child_text("FullName"), Some("Acme"));
    }

    #[test]
    fn test_from_element_requires_rq_suffix() {
        assert!(Request::from_element(Element::new("InvoiceAddRq")).is_some());
        assert!(Request::from_element(Element::new("InvoiceAdd")).is_none());
    }

    #[test]
    fn test_not_found_codes() {
        assert!(Response::new("AccountQuery", STATUS_NO_MATCH, "").is_not_found());
        assert!(Response::new("BillQuery", STATUS_OBJECT_NOT_FOUND, "").is_not_found());
        assert!(!Response::new("BillQuery", 3100, "").is_not_found());
        assert!(Response::ok("BillQuery").is_success());
    }
}
