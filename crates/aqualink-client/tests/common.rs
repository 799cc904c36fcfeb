//! Common test utilities for AquaLink client integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aqualink_client::{AquaLinkClient, ClientOptions, ManualProbe};
use aqualink_core::AccountId;
use aqualink_store::MemoryStore;

/// Account used throughout the tests.
pub const ACCOUNT: &str = "000012345";

/// Per-attempt timeout used by the tests.
pub const TIMEOUT: Duration = Duration::from_millis(150);

/// A delay comfortably past [`TIMEOUT`].
pub const SLOW: Duration = Duration::from_millis(600);

/// Retries after the first attempt.
pub const RETRIES: u32 = 2;

/// Initial backoff.
pub const BACKOFF: Duration = Duration::from_millis(20);

/// Test harness: a primary and a backup mock server, an in-memory store and
/// a switchable reachability probe.
pub struct TestHarness {
    /// The primary API server.
    pub primary: MockServer,
    /// The backup API server.
    pub backup: MockServer,
    /// Cache and session storage.
    pub store: Arc<MemoryStore>,
    /// Reachability probe, online by default.
    pub probe: Arc<ManualProbe>,
    /// Client under test.
    pub client: AquaLinkClient,
}

impl TestHarness {
    /// Start both servers and build a client pointed at them.
    pub async fn new() -> Self {
        let primary = MockServer::start().await;
        let backup = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let probe = Arc::new(ManualProbe::new(true));

        let options = fast_options(&primary.uri()).with_backup_url(backup.uri());
        let client = AquaLinkClient::with_options(options, store.clone(), probe.clone())
            .expect("Failed to build client");

        Self {
            primary,
            backup,
            store,
            probe,
            client,
        }
    }

    /// Start only a primary server; the client has no backup configured.
    pub async fn without_backup() -> (MockServer, Arc<MemoryStore>, AquaLinkClient) {
        let primary = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let client = AquaLinkClient::with_options(
            fast_options(&primary.uri()),
            store.clone(),
            Arc::new(ManualProbe::new(true)),
        )
        .expect("Failed to build client");
        (primary, store, client)
    }
}

/// Client options with short timeouts so failure paths run quickly.
pub fn fast_options(primary_url: &str) -> ClientOptions {
    ClientOptions::new(primary_url)
        .with_timeout(TIMEOUT)
        .with_retries(RETRIES, BACKOFF)
        .with_health_timeout(Duration::from_millis(200))
}

/// The test account.
pub fn account() -> AccountId {
    AccountId::parse(ACCOUNT).expect("valid account")
}

/// Mount a health check answering `status`.
pub async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Customer data payload.
pub fn client_payload() -> Value {
    json!({
        "success": true,
        "cliente": {
            "matricula": ACCOUNT,
            "nome": "João da Silva",
            "endereco": "Rua das Flores, 123. Centro, São Paulo-SP. CEP: 01234-567",
            "documento": "123******89"
        }
    })
}

/// Open bills payload: the single open bill of the test account.
pub fn open_bills_payload() -> Value {
    json!({
        "success": true,
        "count": 1,
        "total": 10,
        "faturas": [
            {
                "id": "12345",
                "parcela": 1,
                "matricula": ACCOUNT,
                "valor": 75.50,
                "dataVencimento": "15/06/2023",
                "dataEmissao": "01/06/2023",
                "status": "aberto",
                "referencia": "06/2023"
            }
        ]
    })
}

/// Bill detail payload with PIX data.
pub fn bill_detail_payload() -> Value {
    json!({
        "success": true,
        "fatura": {
            "id": "12345",
            "parcela": 1,
            "matricula": ACCOUNT,
            "valor": 75.50,
            "dataVencimento": "15/06/2023",
            "dataEmissao": "01/06/2023",
            "status": "aberto",
            "referencia": "06/2023",
            "descricao": "Fatura de Água e Esgoto",
            "consumo": {
                "metros": 15.5,
                "leituraAnterior": 1250.5,
                "leituraAtual": 1266.0,
                "dataLeitura": "25/05/2023"
            },
            "detalhamento": {
                "valorAgua": 45.50,
                "valorEsgoto": 25.00,
                "valorServicos": 5.00
            },
            "pix": {
                "qrCode": "00020126580014br.gov.bcb.pix0136123e4567-e12b-12d1-a456-426655440000",
                "chaveCopiaCola": "00020126580014br.gov.bcb.pix0136123e4567",
                "disponivel": true
            }
        }
    })
}

/// Six months of consumption without server-side statistics.
pub fn consumption_payload() -> Value {
    json!({
        "success": true,
        "consumo": [
            { "mes": "05", "ano": "2023", "referencia": "05/2023", "consumo": 15.5 },
            { "mes": "04", "ano": "2023", "referencia": "04/2023", "consumo": 16.2 },
            { "mes": "03", "ano": "2023", "referencia": "03/2023", "consumo": 14.8 },
            { "mes": "02", "ano": "2023", "referencia": "02/2023", "consumo": 13.7 },
            { "mes": "01", "ano": "2023", "referencia": "01/2023", "consumo": 14.1 },
            { "mes": "12", "ano": "2022", "referencia": "12/2022", "consumo": 15.9 }
        ],
        "ultimaLeitura": {
            "valor": 15.5,
            "data": "25/05/2023",
            "leituraAnterior": 1250.5,
            "leituraAtual": 1266.0
        }
    })
}

/// Path of the customer data endpoint for the test account.
pub fn client_data_path() -> String {
    format!("/api/mobile/clientes/{ACCOUNT}/dados-basicos")
}

/// Path of the bill list endpoint for the test account.
pub fn bills_path() -> String {
    format!("/api/mobile/clientes/{ACCOUNT}/faturas")
}
