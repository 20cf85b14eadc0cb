//! Response bodies returned by the service.

use serde::{Deserialize, Serialize};

use super::entity::{ApiError, Bank, BankStatementExport, API_ERROR, BANK, BANK_STATEMENT_EXPORT};
use crate::marshal::{FieldDescriptor, IsoDateTime, Marshal, TypeDescriptor};

pub static ERROR_RESPONSE: TypeDescriptor = TypeDescriptor::new(
    "ErrorResponse",
    &[
        FieldDescriptor::array("errors"),
        FieldDescriptor::object("errors[]", &API_ERROR),
    ],
);

pub static GET_LINKED_ACCOUNT_LIST_RESPONSE: TypeDescriptor = TypeDescriptor::new(
    "GetLinkedAccountListResponse",
    &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::date("expires"),
        FieldDescriptor::scalar("nonce"),
        FieldDescriptor::array("banks"),
        FieldDescriptor::object("banks[]", &BANK),
        FieldDescriptor::array("availableBanks"),
        FieldDescriptor::object("availableBanks[]", &BANK),
    ],
);

pub static GET_STATEMENT_RESPONSE: TypeDescriptor = TypeDescriptor::new(
    "GetStatementResponse",
    &[
        FieldDescriptor::scalar("id"),
        FieldDescriptor::scalar("nonce"),
        FieldDescriptor::array("data"),
        FieldDescriptor::object("data[]", &BANK_STATEMENT_EXPORT),
    ],
);

pub static DELETE_CONNECTION_RESPONSE: TypeDescriptor = TypeDescriptor::new(
    "DeleteConnectionResponse",
    &[
        FieldDescriptor::scalar("sessionId"),
        FieldDescriptor::scalar("nonce"),
    ],
);

/// Generic error body of any non-successful call.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorResponse {
    pub errors: Vec<ApiError>,
}

/// Banks already connected to a session, and those still available.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetLinkedAccountListResponse {
    /// Session ID.
    pub id: Option<String>,
    /// When the connection expires.
    pub expires: Option<IsoDateTime>,
    pub nonce: Option<String>,
    pub banks: Vec<Bank>,
    pub available_banks: Vec<Bank>,
}

/// Statements for every connected bank.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetStatementResponse {
    pub id: Option<String>,
    pub nonce: Option<String>,
    pub data: Vec<BankStatementExport>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteConnectionResponse {
    pub session_id: Option<String>,
    pub nonce: Option<String>,
}

impl Marshal for ErrorResponse {
    fn descriptor() -> &'static TypeDescriptor {
        &ERROR_RESPONSE
    }
}

impl Marshal for GetLinkedAccountListResponse {
    fn descriptor() -> &'static TypeDescriptor {
        &GET_LINKED_ACCOUNT_LIST_RESPONSE
    }
}

impl Marshal for GetStatementResponse {
    fn descriptor() -> &'static TypeDescriptor {
        &GET_STATEMENT_RESPONSE
    }
}

impl Marshal for DeleteConnectionResponse {
    fn descriptor() -> &'static TypeDescriptor {
        &DELETE_CONNECTION_RESPONSE
    }
}
