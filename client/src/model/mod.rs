//! # Service DTOs
//!
//! Request and response types of the statement service, each paired with a
//! static [`TypeDescriptor`](crate::marshal::TypeDescriptor).

pub mod entity;
pub mod request;
pub mod response;

pub use entity::{
    AccountBalance, AccountIdentification, ApiError, Bank, BankStatementExport, Statement,
    StatementPeriod, Transaction,
};
pub use request::{DeleteAllConnectionsRequest, DeleteBankConnectionRequest};
pub use response::{
    DeleteConnectionResponse, ErrorResponse, GetLinkedAccountListResponse, GetStatementResponse,
};
