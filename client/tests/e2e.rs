//! End-to-end tests for the signed client core.
//!
//! A `MockService` transport plays the server: it holds its own key pair,
//! checks the request signature the way the real service does (sorted query
//! for GET, raw body for POST) and signs every response it sends back.
//! Nothing touches the network.

use std::cell::{Cell, RefCell};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use express_statement::canonical::encode_query_for_signing;
use express_statement::config::SIGNATURE_HEADER;
use express_statement::marshal;
use express_statement::model::{
    ApiError, DeleteAllConnectionsRequest, DeleteBankConnectionRequest, DeleteConnectionResponse,
    GetLinkedAccountListResponse, GetStatementResponse,
};
use express_statement::{
    ClientConfig, ClientError, ClientKeys, IsoDateTime, KeyCodec, Method, PrivateKey, PublicKey,
    RawResponse, SignatureEngine, SignedClient, SignedRequest, Transport,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const APP_SECRET: [u8; 32] = [0x11; 32];
const SERVER_SECRET: [u8; 32] = [0x5a; 32];

/// What the mock does with the response it built.
#[derive(Clone, Copy, PartialEq)]
enum Tamper {
    None,
    DropHeader,
    GarbleHeader,
    FlipBody,
    WrongKey,
}

struct MockService {
    server_key: PrivateKey,
    app_public: PublicKey,
    status: u16,
    body: String,
    tamper: Cell<Tamper>,
    offline: bool,
    requests: RefCell<Vec<SignedRequest>>,
}

impl MockService {
    fn new(status: u16, body: &str) -> Self {
        let codec = KeyCodec::default();
        Self {
            server_key: codec.decode_private_key(&SERVER_SECRET).unwrap(),
            app_public: codec.decode_private_key(&APP_SECRET).unwrap().public_key(),
            status,
            body: body.to_string(),
            tamper: Cell::new(Tamper::None),
            offline: false,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn tampered(self, tamper: Tamper) -> Self {
        self.tamper.set(tamper);
        self
    }

    /// Server side of request authentication.
    fn request_is_authentic(&self, request: &SignedRequest) -> bool {
        let signed = match request.method {
            Method::Get => encode_query_for_signing(
                request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            )
            .unwrap()
            .into_bytes(),
            Method::Post => request.body().unwrap().to_vec(),
        };
        let header = request
            .headers()
            .into_iter()
            .find(|(name, _)| *name == SIGNATURE_HEADER)
            .map(|(_, value)| value)
            .unwrap();
        let der = BASE64.decode(header).unwrap();
        SignatureEngine::default().verify(&signed, &der, &self.app_public)
    }
}

impl Transport for MockService {
    fn execute(&self, request: &SignedRequest) -> Result<RawResponse, ClientError> {
        if self.offline {
            return Err(ClientError::NetworkError("connection refused".into()));
        }
        self.requests.borrow_mut().push(request.clone());

        if !self.request_is_authentic(request) {
            let body = r#"{"errors":[{"code":"ERROR_SIGNATURE_INVALID","description":"Invalid signature"}]}"#;
            let sig = SignatureEngine::default()
                .sign(body.as_bytes(), &self.server_key)
                .unwrap();
            return Ok(RawResponse::new(401, body, Some(sig.to_base64())));
        }

        let engine = SignatureEngine::default();
        let mut body = self.body.clone().into_bytes();
        let mut header = Some(engine.sign(&body, &self.server_key).unwrap().to_base64());

        match self.tamper.get() {
            Tamper::None => {}
            Tamper::DropHeader => header = None,
            Tamper::GarbleHeader => header = Some("!!not-base64!!".into()),
            Tamper::FlipBody => {
                if let Some(last) = body.last_mut() {
                    *last ^= 0x01;
                }
            }
            Tamper::WrongKey => {
                let other = KeyCodec::default().decode_private_key(&[0x77; 32]).unwrap();
                header = Some(engine.sign(&body, &other).unwrap().to_base64());
            }
        }

        Ok(RawResponse::new(self.status, body, header))
    }
}

fn client(service: MockService) -> SignedClient<MockService> {
    let codec = KeyCodec::default();
    let server_public = codec.decode_private_key(&SERVER_SECRET).unwrap().public_key();
    let config = ClientConfig::new(
        "app-key-1",
        BASE64.encode(APP_SECRET),
        BASE64.encode(server_public.to_bytes()),
    )
    .with_base_url("https://service.example.test");
    SignedClient::from_config(&config, service).unwrap()
}

const LINKED_ACCOUNTS: &str = r#"{
    "id": "session-1",
    "expires": "2021-07-01T12:00:00+02:00",
    "nonce": "bm9uY2U=",
    "banks": [{"name": "Fio banka", "bic": "FIOBCZPP"}],
    "availableBanks": [{"name": "Air Bank", "bic": "AIRACZPP"}]
}"#;

// ---------------------------------------------------------------------------
// Happy Paths
// ---------------------------------------------------------------------------

#[test]
fn signed_get_returns_verified_dto() {
    let client = client(MockService::new(200, LINKED_ACCOUNTS));

    let response: GetLinkedAccountListResponse = client
        .get(
            "/api/v1/linked-accounts",
            &[("sessionId", "session-1"), ("appKey", "app-key-1")],
        )
        .unwrap();

    assert_eq!(response.id.as_deref(), Some("session-1"));
    assert_eq!(response.banks[0].bic.as_deref(), Some("FIOBCZPP"));
    assert_eq!(response.available_banks[0].name.as_deref(), Some("Air Bank"));
    assert_eq!(
        response.expires.unwrap().encode(),
        "2021-07-01T12:00:00+02:00"
    );

    let requests = client.transport().requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "https://service.example.test/api/v1/linked-accounts"
    );
    assert!(requests[0].body().is_none());
}

#[test]
fn signed_post_sends_exactly_the_signed_bytes() {
    let client = client(MockService::new(
        200,
        r#"{"sessionId":"session-1","nonce":"abc="}"#,
    ));
    let request =
        DeleteBankConnectionRequest::new("app-key-1", "session-1", "FIOBCZPP", client.nonce().unwrap());

    let response: DeleteConnectionResponse =
        client.post("api/v1/delete-connection", &request).unwrap();
    assert_eq!(response.session_id.as_deref(), Some("session-1"));

    let requests = client.transport().requests.borrow();
    let sent = &requests[0];
    assert_eq!(sent.body().unwrap(), sent.envelope.canonical.as_bytes());

    let echoed: DeleteBankConnectionRequest = marshal::from_slice(sent.body().unwrap()).unwrap();
    assert_eq!(echoed, request);
}

#[test]
fn statement_graph_decodes_with_nested_dates() {
    let body = r#"{
        "id": "session-1",
        "data": [{
            "bank": {"name": "Fio banka", "bic": "FIOBCZPP"},
            "statements": [{
                "account": {"iban": "CZ6508000000192000145399"},
                "balance": {"amount": 1520.75, "currency": "CZK"},
                "period": {"from": "2021-06-01T00:00:00+02:00", "to": "2021-06-30T23:59:59+0200"},
                "transactions": [
                    {"id": "t-1", "amount": -250.0, "valueDate": "2021-06-12T00:00:00+02:00"},
                    {"id": "t-2", "amount": 1000, "variableSymbol": "1234"}
                ]
            }]
        }]
    }"#;
    let client = client(MockService::new(200, body));

    let response: GetStatementResponse = client
        .get("api/v1/statement", &[("sessionId", "session-1")])
        .unwrap();

    let statement = &response.data[0].statements[0];
    let period = statement.period.as_ref().unwrap();
    assert_eq!(
        period.to.unwrap(),
        IsoDateTime::parse("2021-06-30T23:59:59+02:00").unwrap()
    );
    assert_eq!(statement.transactions.len(), 2);
    assert_eq!(
        statement.transactions[0].value_date.unwrap().encode(),
        "2021-06-12T00:00:00+02:00"
    );
    assert_eq!(statement.transactions[1].amount, Some(1000.0));
    assert_eq!(
        statement.transactions[1].variable_symbol.as_deref(),
        Some("1234")
    );
}

#[test]
fn responses_can_be_verified_with_a_session_key() {
    let session_secret = [0x33u8; 32];
    let codec = KeyCodec::default();
    let session_private = codec.decode_private_key(&session_secret).unwrap();

    let mut service = MockService::new(200, r#"{"sessionId":"s","nonce":"n"}"#);
    service.server_key = session_private.clone();
    let client = client(service);

    let session_key = client
        .decode_session_key(&session_private.public_key().to_bytes())
        .unwrap();
    let body = DeleteAllConnectionsRequest::new("app-key-1", "s", client.nonce().unwrap());

    let ok: DeleteConnectionResponse = client
        .post_verified_with("api/v1/delete-all", &body, &session_key)
        .unwrap();
    assert_eq!(ok.session_id.as_deref(), Some("s"));

    // The long-lived server key does not match the session signer.
    let err = client
        .post::<_, DeleteConnectionResponse>("api/v1/delete-all", &body)
        .unwrap_err();
    assert!(matches!(err, ClientError::SignatureVerificationFailed));
}

// ---------------------------------------------------------------------------
// Response Authentication
// ---------------------------------------------------------------------------

#[test]
fn tampered_responses_never_produce_a_dto() {
    for tamper in [
        Tamper::DropHeader,
        Tamper::GarbleHeader,
        Tamper::FlipBody,
        Tamper::WrongKey,
    ] {
        let client = client(MockService::new(200, LINKED_ACCOUNTS).tampered(tamper));
        let result: Result<GetLinkedAccountListResponse, _> =
            client.get("api/v1/linked-accounts", &[("sessionId", "session-1")]);
        assert!(
            matches!(result, Err(ClientError::SignatureVerificationFailed)),
            "tampered response was accepted"
        );
    }
}

#[test]
fn unverified_error_body_is_not_trusted() {
    let body = r#"{"errors":[{"code":"ERROR_SESSION","description":"expired"}]}"#;
    let client = client(MockService::new(400, body).tampered(Tamper::WrongKey));
    let err = client
        .get::<GetLinkedAccountListResponse, _, _>("x", &[("a", "1")])
        .unwrap_err();
    assert!(matches!(err, ClientError::SignatureVerificationFailed));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn verified_error_report_surfaces_as_remote_error() {
    let body = r#"{"errors":[
        {"code":"ERROR_SESSION","description":"Session expired","localizedDescription":"Relace vypršela"},
        {"code":"ERROR_BANK","description":"Bank unavailable"}
    ]}"#;
    let client = client(MockService::new(400, body));

    match client.get::<GetLinkedAccountListResponse, _, _>("x", &[("sessionId", "s")]) {
        Err(ClientError::RemoteError(errors)) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].localized_description, "Relace vypršela");
            assert_eq!(errors[1].code, "ERROR_BANK");
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[test]
fn service_rejects_request_signed_with_wrong_key() {
    let codec = KeyCodec::default();
    let service = MockService::new(200, "{}");
    let server_public = service.server_key.public_key();
    let wrong_app_key = codec.decode_private_key(&[0x99; 32]).unwrap();
    let keys = ClientKeys::new("app-key-1", wrong_app_key, server_public);
    let client = SignedClient::new("https://service.example.test", keys, service);

    let err = client
        .get::<GetLinkedAccountListResponse, _, _>("x", &[("sessionId", "s")])
        .unwrap_err();
    match err {
        ClientError::RemoteError(errors) => {
            assert_eq!(errors[0].code, ApiError::SIGNATURE_INVALID_CODE);
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[test]
fn transport_failures_pass_through() {
    let mut service = MockService::new(200, "{}");
    service.offline = true;
    let client = client(service);

    let err = client
        .get::<GetLinkedAccountListResponse, _, _>("x", &[("sessionId", "s")])
        .unwrap_err();
    assert!(matches!(err, ClientError::NetworkError(_)));
}

#[test]
fn bad_date_in_verified_body_is_reported_with_field() {
    let client = client(MockService::new(
        200,
        r#"{"id":"s","expires":"2021-07-01 12:00:00"}"#,
    ));
    match client.get::<GetLinkedAccountListResponse, _, _>("x", &[("sessionId", "s")]) {
        Err(ClientError::DateParseError { field, value }) => {
            assert_eq!(field, "expires");
            assert_eq!(value, "2021-07-01 12:00:00");
        }
        other => panic!("expected date error, got {:?}", other),
    }
}

#[test]
fn bad_key_material_is_rejected_at_construction() {
    let short = ClientConfig::new("k", BASE64.encode([1u8; 31]), BASE64.encode([4u8; 65]));
    assert!(matches!(
        SignedClient::from_config(&short, MockService::new(200, "{}")),
        Err(ClientError::InvalidKeyLength {
            expected: 32,
            actual: 31
        })
    ));
}
