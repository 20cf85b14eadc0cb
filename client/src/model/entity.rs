//! Entities shared by several responses: banks, accounts, statements.

use serde::{Deserialize, Serialize};

use crate::marshal::{FieldDescriptor, IsoDateTime, Marshal, TypeDescriptor};

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

pub static BANK: TypeDescriptor = TypeDescriptor::new(
    "Bank",
    &[FieldDescriptor::scalar("name"), FieldDescriptor::scalar("bic")],
);

pub static ACCOUNT_BALANCE: TypeDescriptor = TypeDescriptor::new(
    "AccountBalance",
    &[
        FieldDescriptor::scalar("amount"),
        FieldDescriptor::scalar("currency"),
    ],
);

pub static ACCOUNT_IDENTIFICATION: TypeDescriptor = TypeDescriptor::new(
    "AccountIdentification",
    &[
        FieldDescriptor::scalar("iban"),
        FieldDescriptor::scalar("name"),
        FieldDescriptor::scalar("productName"),
        FieldDescriptor::scalar("ownerName"),
    ],
);

pub static STATEMENT_PERIOD: TypeDescriptor = TypeDescriptor::new(
    "StatementPeriod",
    &[FieldDescriptor::date("from"), FieldDescriptor::date("to")],
);

pub static TRANSACTION: TypeDescriptor = TypeDescriptor::new(
    "Transaction",
    &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::scalar("partyInfo"),
        FieldDescriptor::scalar("partyDescription"),
        FieldDescriptor::scalar("partyIban"),
        FieldDescriptor::scalar("amount"),
        FieldDescriptor::scalar("currency"),
        FieldDescriptor::date("valueDate"),
        FieldDescriptor::scalar("description"),
        FieldDescriptor::scalar("payeeNote"),
        FieldDescriptor::scalar("payerNote"),
        FieldDescriptor::scalar("variableSymbol"),
        FieldDescriptor::scalar("constantSymbol"),
        FieldDescriptor::scalar("specificSymbol"),
    ],
);

pub static STATEMENT: TypeDescriptor = TypeDescriptor::new(
    "Statement",
    &[
        FieldDescriptor::object("account", &ACCOUNT_IDENTIFICATION),
        FieldDescriptor::object("balance", &ACCOUNT_BALANCE),
        FieldDescriptor::object("period", &STATEMENT_PERIOD),
        FieldDescriptor::array("transactions"),
        FieldDescriptor::object("transactions[]", &TRANSACTION),
    ],
);

pub static BANK_STATEMENT_EXPORT: TypeDescriptor = TypeDescriptor::new(
    "BankStatementExport",
    &[
        FieldDescriptor::object("bank", &BANK),
        FieldDescriptor::array("statements"),
        FieldDescriptor::object("statements[]", &STATEMENT),
    ],
);

pub static API_ERROR: TypeDescriptor = TypeDescriptor::new(
    "Error",
    &[
        FieldDescriptor::scalar("code"),
        FieldDescriptor::scalar("description"),
        FieldDescriptor::scalar("localizedDescription"),
    ],
);

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A bank the user can connect to.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bank {
    pub name: Option<String>,
    pub bic: Option<String>,
}

/// Balance of an account: amount and ISO 4217 currency.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountBalance {
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountIdentification {
    /// Account number in IBAN format.
    pub iban: Option<String>,
    pub name: Option<String>,
    pub product_name: Option<String>,
    pub owner_name: Option<String>,
}

/// Period covered by a statement, oldest date first.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatementPeriod {
    pub from: Option<IsoDateTime>,
    pub to: Option<IsoDateTime>,
}

/// A single booked transaction.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transaction {
    /// Identifier assigned by the bank.
    pub id: Option<String>,
    pub party_info: Option<String>,
    pub party_description: Option<String>,
    pub party_iban: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    /// Date the transaction was accounted.
    pub value_date: Option<IsoDateTime>,
    pub description: Option<String>,
    pub payee_note: Option<String>,
    pub payer_note: Option<String>,
    pub variable_symbol: Option<String>,
    pub constant_symbol: Option<String>,
    pub specific_symbol: Option<String>,
}

/// Statement of one account.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Statement {
    pub account: Option<AccountIdentification>,
    /// Balance at the end of the period.
    pub balance: Option<AccountBalance>,
    pub period: Option<StatementPeriod>,
    pub transactions: Vec<Transaction>,
}

/// All statements exported from a single bank.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BankStatementExport {
    pub bank: Option<Bank>,
    pub statements: Vec<Statement>,
}

/// One entry of a service error report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiError {
    pub code: String,
    /// English description.
    pub description: String,
    pub localized_description: String,
}

impl ApiError {
    pub const GENERIC_CODE: &'static str = "ERROR_GENERIC";
    pub const SIGNATURE_INVALID_CODE: &'static str = "ERROR_SIGNATURE_INVALID";

    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        localized_description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            localized_description: localized_description.into(),
        }
    }

    /// The entry reported when a signature does not verify.
    pub fn signature_invalid() -> Self {
        Self::new(
            Self::SIGNATURE_INVALID_CODE,
            "Invalid signature",
            "Nesprávný výsledek ověření podpisu dat.",
        )
    }
}

impl Default for ApiError {
    fn default() -> Self {
        Self::new(Self::GENERIC_CODE, "", "")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

// ---------------------------------------------------------------------------
// Marshal impls
// ---------------------------------------------------------------------------

impl Marshal for Bank {
    fn descriptor() -> &'static TypeDescriptor {
        &BANK
    }
}

impl Marshal for AccountBalance {
    fn descriptor() -> &'static TypeDescriptor {
        &ACCOUNT_BALANCE
    }
}

impl Marshal for AccountIdentification {
    fn descriptor() -> &'static TypeDescriptor {
        &ACCOUNT_IDENTIFICATION
    }
}

impl Marshal for StatementPeriod {
    fn descriptor() -> &'static TypeDescriptor {
        &STATEMENT_PERIOD
    }
}

impl Marshal for Transaction {
    fn descriptor() -> &'static TypeDescriptor {
        &TRANSACTION
    }
}

impl Marshal for Statement {
    fn descriptor() -> &'static TypeDescriptor {
        &STATEMENT
    }
}

impl Marshal for BankStatementExport {
    fn descriptor() -> &'static TypeDescriptor {
        &BANK_STATEMENT_EXPORT
    }
}

impl Marshal for ApiError {
    fn descriptor() -> &'static TypeDescriptor {
        &API_ERROR
    }
}
