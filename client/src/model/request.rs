//! Request bodies for POST-style calls.
//!
//! Each body carries the application key, a timestamp and a fresh
//! anti-replay nonce. The serialized JSON of these structs is the canonical
//! form that gets signed.

use serde::{Deserialize, Serialize};

use crate::marshal::{FieldDescriptor, IsoDateTime, Marshal, TypeDescriptor};

pub static DELETE_BANK_CONNECTION_REQUEST: TypeDescriptor = TypeDescriptor::new(
    "DeleteBankConnectionRequest",
    &[
        FieldDescriptor::scalar("appKey"),
        FieldDescriptor::scalar("sessionId"),
        FieldDescriptor::scalar("bic"),
        FieldDescriptor::date("timestamp"),
        FieldDescriptor::scalar("nonce"),
    ],
);

pub static DELETE_ALL_CONNECTIONS_REQUEST: TypeDescriptor = TypeDescriptor::new(
    "DeleteAllConnectionsRequest",
    &[
        FieldDescriptor::scalar("appKey"),
        FieldDescriptor::scalar("sessionId"),
        FieldDescriptor::date("timestamp"),
        FieldDescriptor::scalar("nonce"),
    ],
);

/// Remove the connection between a session and one bank.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteBankConnectionRequest {
    pub app_key: Option<String>,
    pub session_id: Option<String>,
    pub bic: Option<String>,
    pub timestamp: Option<IsoDateTime>,
    /// 16 random bytes, base64.
    pub nonce: Option<String>,
}

impl DeleteBankConnectionRequest {
    /// Request stamped with the current time.
    pub fn new(
        app_key: impl Into<String>,
        session_id: impl Into<String>,
        bic: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            app_key: Some(app_key.into()),
            session_id: Some(session_id.into()),
            bic: Some(bic.into()),
            timestamp: Some(IsoDateTime::now()),
            nonce: Some(nonce.into()),
        }
    }
}

/// Remove every bank connection of a session.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteAllConnectionsRequest {
    pub app_key: Option<String>,
    pub session_id: Option<String>,
    pub timestamp: Option<IsoDateTime>,
    pub nonce: Option<String>,
}

impl DeleteAllConnectionsRequest {
    pub fn new(
        app_key: impl Into<String>,
        session_id: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            app_key: Some(app_key.into()),
            session_id: Some(session_id.into()),
            timestamp: Some(IsoDateTime::now()),
            nonce: Some(nonce.into()),
        }
    }
}

impl Marshal for DeleteBankConnectionRequest {
    fn descriptor() -> &'static TypeDescriptor {
        &DELETE_BANK_CONNECTION_REQUEST
    }
}

impl Marshal for DeleteAllConnectionsRequest {
    fn descriptor() -> &'static TypeDescriptor {
        &DELETE_ALL_CONNECTIONS_REQUEST
    }
}
