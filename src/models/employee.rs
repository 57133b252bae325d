//! Employee model as listed by the upstream provider.
//!
//! Employees are owned by the provider; the engine only keeps the fields it
//! needs to key ledger rows and label responses.

use serde::{Deserialize, Serialize};

/// An employee as reported by the time-tracking provider.
///
/// The `reference` is the tax/payroll identifier used as the per-employee
/// key for upstream totals calls and for persisted rows. Employees without
/// one cannot be fetched and are skipped by batch operations.
///
/// # Example
///
/// ```
/// use timesheet_sync::models::Employee;
///
/// let employee = Employee {
///     reference: Some("123.456.789-00".to_string()),
///     name: "Ana Souza".to_string(),
///     role: Some("Nurse".to_string()),
///     department: None,
///     unit: None,
/// };
/// assert_eq!(employee.reference(), Some("123.456.789-00"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Tax/payroll identifier, when the provider supplied one.
    pub reference: Option<String>,
    /// Display name.
    pub name: String,
    /// Job role or function.
    pub role: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Organisational unit or site.
    pub unit: Option<String>,
}

impl Employee {
    /// Returns the identifier, ignoring blank values.
    pub fn reference(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
    }
}
