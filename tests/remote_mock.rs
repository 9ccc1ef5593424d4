//! Exercises the blocking HTTP path against a `wiremock` server.
//!
//! The mock server runs on its own thread; the runtime here only drives
//! server setup and inspection. Blocking requests are made outside
//! `block_on`.

use prosperity_rs::config::RemoteConfig;
use prosperity_rs::error::SourceError;
use prosperity_rs::{Client, RawSource, RemoteSource};
use std::net::TcpListener;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

const INDICATOR_PATH: &str = "/v2/country/all/indicator/NY.GDP.PCAP.CD";

const BODY: &str = r#"[{"page":1,"pages":1,"per_page":100,"total":3},[
 {"country":{"id":"1W","value":"World"},"countryiso3code":"WLD","date":"2020","value":10900.0},
 {"country":{"id":"CL","value":"Chile"},"countryiso3code":"CHL","date":"2020","value":13094.5},
 {"country":{"id":"CL","value":"Chile"},"countryiso3code":"CHL","date":"2019","value":null}
]]"#;

struct WorldBankMock {
    rt: Runtime,
    server: MockServer,
}

impl WorldBankMock {
    fn start() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self { rt, server }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn config(&self) -> RemoteConfig {
        config(format!("{}/v2", self.server.uri()))
    }

    fn request_count(&self) -> usize {
        self.rt
            .block_on(self.server.received_requests())
            .map(|r| r.len())
            .unwrap_or(0)
    }
}

fn config(base_url: String) -> RemoteConfig {
    RemoteConfig {
        base_url,
        start_year: 2019,
        end_year: 2020,
        per_page: 100,
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..RemoteConfig::default()
    }
}

fn indicator_get() -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(INDICATOR_PATH))
        .and(query_param("date", "2019:2020"))
}

#[test]
fn fetch_sends_expected_query_and_parses_rows() {
    let api = WorldBankMock::start();
    api.mount(
        indicator_get()
            .and(query_param("format", "json"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .expect(1),
    );

    let source = RemoteSource::from_config(&api.config()).unwrap();
    let batch = source.fetch().unwrap();

    assert_eq!(batch.rows.len(), 2);
    assert_eq!(batch.dropped, 1);
    assert_eq!(batch.rows[1].region_name, "Chile");
    assert_eq!(batch.rows[1].year, 2020);
}

#[test]
fn client_error_status_is_not_retried() {
    let api = WorldBankMock::start();
    api.mount(
        indicator_get()
            .respond_with(ResponseTemplate::new(404).set_body_string("{}"))
            .expect(1),
    );

    let client = Client::new(&api.config()).unwrap();
    let err = client.fetch_range("NY.GDP.PCAP.CD", 2019, 2020).unwrap_err();
    assert!(matches!(err, SourceError::HttpStatus(404)), "{err:?}");
    assert_eq!(api.request_count(), 1);
}

#[test]
fn server_errors_are_retried() {
    let api = WorldBankMock::start();
    api.mount(
        indicator_get()
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1),
    );
    api.mount(indicator_get().respond_with(ResponseTemplate::new(200).set_body_string(BODY)));

    let client = Client::new(&api.config()).unwrap();
    let batch = client.fetch_range("NY.GDP.PCAP.CD", 2019, 2020).unwrap();
    assert_eq!(batch.rows.len(), 2);
    assert_eq!(api.request_count(), 2);
}

#[test]
fn persistent_server_error_gives_up_after_three_attempts() {
    let api = WorldBankMock::start();
    api.mount(indicator_get().respond_with(ResponseTemplate::new(502)).expect(3));

    let client = Client::new(&api.config()).unwrap();
    let err = client.fetch_range("NY.GDP.PCAP.CD", 2019, 2020).unwrap_err();
    assert!(matches!(err, SourceError::HttpStatus(502)), "{err:?}");
}

#[test]
fn non_json_body_is_no_data() {
    let api = WorldBankMock::start();
    api.mount(
        indicator_get().respond_with(
            ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
        ),
    );

    let client = Client::new(&api.config()).unwrap();
    let err = client.fetch_range("NY.GDP.PCAP.CD", 2019, 2020).unwrap_err();
    assert!(matches!(err, SourceError::NoData(_)), "{err:?}");
}

#[test]
fn silent_server_times_out_without_retrying() {
    let api = WorldBankMock::start();
    api.mount(
        indicator_get().respond_with(
            ResponseTemplate::new(200)
                .set_body_string(BODY)
                .set_delay(Duration::from_secs(5)),
        ),
    );
    let cfg = RemoteConfig {
        timeout_secs: 1,
        ..api.config()
    };

    let client = Client::new(&cfg).unwrap();
    let started = Instant::now();
    let err = client.fetch_range("NY.GDP.PCAP.CD", 2019, 2020).unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, SourceError::FetchFailed(_)), "{err:?}");
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    assert_eq!(api.request_count(), 1);
}

#[test]
fn unreachable_host_fails_fast() {
    // bind then drop to get a port nobody listens on
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let client = Client::new(&config(format!("http://127.0.0.1:{port}/v2"))).unwrap();

    let started = Instant::now();
    let err = client.fetch_range("NY.GDP.PCAP.CD", 2019, 2020).unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, SourceError::FetchFailed(_)), "{err:?}");
    // two back-offs between three attempts, none after the last
    assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
}
