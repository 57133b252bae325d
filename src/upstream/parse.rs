//! Tolerant parsing of provider payloads.
//!
//! The provider is not consistent about field names or envelope shapes
//! across versions and tenants. Every payload is normalised here, once,
//! into the engine's own types. Field names are compared after lowercasing
//! and dropping non-alphanumerics, so `"Ex50%"`, `"ex_50"` and `"EX50"` all
//! match the alias `"ex50"`.

use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};
use crate::models::{AccountRef, Employee, LedgerDuration, TotalsSnapshot};

const LIST_ENVELOPES: &[&str] = &["employees", "funcionarios", "accounts", "bancos", "banks", "data"];
const DESCRIPTION_KEYS: &[&str] = &["descricao", "description", "nome", "name"];

const ACCOUNT_ID: &[&str] = &["id", "bancoid", "bankid", "accountid"];
const ACCOUNT_NAME: &[&str] = &["nome", "name", "descricao", "description"];

const EMPLOYEE_REF: &[&str] = &["cpf", "document", "taxid", "payrollid"];
const EMPLOYEE_NAME: &[&str] = &["nome", "name"];
const EMPLOYEE_ROLE: &[&str] = &["funcao", "cargo", "role"];
const EMPLOYEE_DEPARTMENT: &[&str] = &["departamento", "department"];
const EMPLOYEE_UNIT: &[&str] = &["unidade", "empresa", "unit"];

const COLUMN_KEYS: &[&str] = &["colunas", "columns"];
const TOTAL_KEYS: &[&str] = &["totais", "totals"];

const NORMAL: &[&str] = &["normais", "normal", "normalhours", "horasnormais"];
const ABSENCE: &[&str] = &["faltas", "falta", "absence", "absences", "absencehours"];
const OVERTIME_50: &[&str] = &["ex50", "extra50", "he50", "overtime50"];
const OVERTIME_100: &[&str] = &["ex100", "extra100", "he100", "overtime100"];
const BANK_CREDIT: &[&str] = &["bcred", "bcredito", "bancocredito", "bankcredit"];
const BANK_DEBIT: &[&str] = &["bdeb", "bdebito", "bancodebito", "bankdebit"];
const BANK_BALANCE: &[&str] = &["bsaldo", "saldo", "bancosaldo", "bankbalance", "balance"];

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Looks up the first alias present in `object`.
fn field<'a>(object: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| {
        object
            .iter()
            .find(|(key, _)| normalize_key(key) == *alias)
            .map(|(_, value)| value)
    })
}

/// Reads a scalar as text. Objects contribute their description field.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(inner) => field(inner, DESCRIPTION_KEYS).and_then(text),
        _ => None,
    }
}

fn text_field(object: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    field(object, aliases).and_then(text)
}

/// Unwraps a bare array or an array under a known envelope key.
fn list_items<'a>(payload: &'a Value, what: &str) -> EngineResult<&'a Vec<Value>> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(object) => match field(object, LIST_ENVELOPES) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(EngineError::upstream(format!(
                "{what} payload has no recognizable list"
            ))),
        },
        _ => Err(EngineError::upstream(format!(
            "{what} payload is neither a list nor an object"
        ))),
    }
}

/// Parses the account listing.
///
/// Entries without an identifier are dropped.
pub fn parse_accounts(payload: &Value) -> EngineResult<Vec<AccountRef>> {
    let items = list_items(payload, "account")?;
    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|object| {
            Some(AccountRef {
                id: text_field(object, ACCOUNT_ID)?,
                name: text_field(object, ACCOUNT_NAME),
            })
        })
        .collect())
}

/// Parses the employee listing.
///
/// Employees without an identifier are kept with `reference: None`; callers
/// decide whether to skip them.
///
/// # Example
///
/// ```
/// use timesheet_sync::upstream::parse::parse_employees;
/// use serde_json::json;
///
/// let payload = json!([
///     { "Nome": "Ana", "Cpf": "111", "Funcao": { "Descricao": "Nurse" } },
///     { "name": "Bruno", "document": "222", "role": "Porter" },
/// ]);
/// let employees = parse_employees(&payload).unwrap();
/// assert_eq!(employees[0].role.as_deref(), Some("Nurse"));
/// assert_eq!(employees[1].reference(), Some("222"));
/// ```
pub fn parse_employees(payload: &Value) -> EngineResult<Vec<Employee>> {
    let items = list_items(payload, "employee")?;
    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .map(|object| Employee {
            reference: text_field(object, EMPLOYEE_REF),
            name: text_field(object, EMPLOYEE_NAME).unwrap_or_default(),
            role: text_field(object, EMPLOYEE_ROLE),
            department: text_field(object, EMPLOYEE_DEPARTMENT),
            unit: text_field(object, EMPLOYEE_UNIT),
        })
        .collect())
}

/// Parses a totals response into a [`TotalsSnapshot`].
///
/// Accepts a keyed object, an object nesting the keyed totals under
/// `totais`/`totals`, or the columnar `{colunas: [...], totais: [...]}`
/// shape. A payload carrying none of the known columns is malformed.
pub fn parse_totals(payload: &Value) -> EngineResult<TotalsSnapshot> {
    let object = payload
        .as_object()
        .ok_or_else(|| EngineError::upstream("totals payload is not an object"))?;

    let columns: Map<String, Value> = match (field(object, COLUMN_KEYS), field(object, TOTAL_KEYS))
    {
        (Some(Value::Array(names)), Some(Value::Array(values))) => names
            .iter()
            .zip(values)
            .filter_map(|(name, value)| Some((text(name)?, value.clone())))
            .collect(),
        (_, Some(Value::Object(inner))) => inner.clone(),
        _ => object.clone(),
    };

    let column = |aliases: &[&str]| text_field(&columns, aliases);
    let values = [
        column(NORMAL),
        column(ABSENCE),
        column(OVERTIME_50),
        column(OVERTIME_100),
        column(BANK_CREDIT),
        column(BANK_DEBIT),
        column(BANK_BALANCE),
    ];

    if values.iter().all(Option::is_none) {
        return Err(EngineError::upstream(
            "totals payload has none of the known columns",
        ));
    }

    let [normal, absence, overtime_50, overtime_100, bank_credit, bank_debit, bank_balance] =
        values.map(|value| value.map(LedgerDuration::parse).unwrap_or_else(LedgerDuration::empty));

    Ok(TotalsSnapshot {
        normal,
        absence,
        overtime_50,
        overtime_100,
        bank_credit,
        bank_debit,
        bank_balance,
    })
}
