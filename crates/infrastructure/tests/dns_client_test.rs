use dnscore_domain::{
    ClientConfig, DnsName, DnsTransportType, DomainError, RecordData, RecordType, ResponseStatus,
};
use dnscore_infrastructure::dns::{ClientOptions, DnsClient};
use futures::future::join_all;
use std::collections::HashSet;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::{
    ClientBuilder, RequestBuilder, TestDnsServer, TestServerConfig, TEST_ADDRESS, TEST_DOMAIN,
    TEST_TTL,
};

fn assert_test_domain_answer(response: &dnscore_domain::DnsResponse) {
    assert_eq!(response.status, ResponseStatus::Ok);
    assert_eq!(response.answers.len(), 1);

    let record = &response.answers[0];
    assert_eq!(record.name, DnsName::parse(TEST_DOMAIN).unwrap());
    assert_eq!(record.record_type, RecordType::A);
    assert_eq!(record.ttl, TEST_TTL);
    assert_eq!(record.data, RecordData::Address(IpAddr::V4(TEST_ADDRESS)));
}

#[tokio::test]
async fn test_udp_query_resolves_known_domain() {
    let server = TestDnsServer::start().await;
    let client = ClientBuilder::udp(server.udp_addr()).build();

    let response = client
        .query_name(DnsName::parse(TEST_DOMAIN).unwrap(), RecordType::A)
        .await
        .unwrap();

    assert_test_domain_answer(&response);
    assert_eq!(client.pending_requests(), 0);
    client.shutdown().await;
}

#[tokio::test]
async fn test_udp_query_unknown_domain_is_name_error() {
    let server = TestDnsServer::start().await;
    let client = ClientBuilder::udp(server.udp_addr()).build();

    let response = client
        .query_name(DnsName::parse("unknown.com").unwrap(), RecordType::A)
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::NameError);
    assert!(response.is_name_error());
    assert!(response.answers.is_empty());
    client.shutdown().await;
}

#[tokio::test]
async fn test_tcp_query_resolves_known_domain() {
    let server = TestDnsServer::start().await;
    let client = ClientBuilder::tcp(server.tcp_addr()).build();
    assert_eq!(client.transport_type(), DnsTransportType::Tcp);

    let response = client.query(&RequestBuilder::a(TEST_DOMAIN)).await.unwrap();

    assert_test_domain_answer(&response);
    client.shutdown().await;
}

#[tokio::test]
async fn test_tcp_query_unknown_domain_is_name_error() {
    let server = TestDnsServer::start().await;
    let client = ClientBuilder::tcp(server.tcp_addr()).build();

    let response = client
        .query(&RequestBuilder::a("unknown.com"))
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::NameError);
    client.shutdown().await;
}

#[tokio::test]
async fn test_response_echoes_request_id_and_question() {
    let server = TestDnsServer::start().await;
    let client = ClientBuilder::udp(server.udp_addr()).build();

    let request = RequestBuilder::a_with_id(TEST_DOMAIN, 0x1234);
    let response = client.query(&request).await.unwrap();

    assert_eq!(response.id, 0x1234);
    assert_eq!(response.questions, vec![request.question.clone()]);
    assert!(response.flags.recursion_desired);
    client.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_queries_matched_out_of_order() {
    const BATCH: usize = 8;
    let server = TestDnsServer::start_with(TestServerConfig::reversed(BATCH)).await;
    let client = ClientBuilder::udp(server.udp_addr()).build();

    let requests: Vec<_> = (0..BATCH as u16)
        .map(|i| {
            let name = if i % 2 == 0 { TEST_DOMAIN } else { "unknown.com" };
            RequestBuilder::a_with_id(name, 1000 + i)
        })
        .collect();

    let responses = join_all(requests.iter().map(|request| client.query(request))).await;

    for (request, response) in requests.iter().zip(responses) {
        let response = response.unwrap();
        assert_eq!(response.id, request.id);
        assert_eq!(response.questions[0], request.question);
        if request.question.name == DnsName::parse(TEST_DOMAIN).unwrap() {
            assert_test_domain_answer(&response);
        } else {
            assert!(response.is_name_error());
        }
    }

    assert_eq!(server.requests_seen(), BATCH);
    assert_eq!(client.pending_requests(), 0);
    client.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_queries_with_random_ids() {
    let server = TestDnsServer::start().await;
    let client = ClientBuilder::udp(server.udp_addr()).build();

    let mut ids = HashSet::new();
    while ids.len() < 16 {
        ids.insert(fastrand::u16(..));
    }
    let requests: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let name = if fastrand::bool() { TEST_DOMAIN } else { "unknown.com" };
            RequestBuilder::a_with_id(name, id)
        })
        .collect();

    let responses = join_all(requests.iter().map(|request| client.query(request))).await;

    for (request, response) in requests.iter().zip(responses) {
        let response = response.unwrap();
        assert_eq!(response.id, request.id);
        assert_eq!(response.questions[0], request.question);
    }
    assert_eq!(client.pending_requests(), 0);
    client.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_tcp_queries() {
    let server = TestDnsServer::start().await;
    let client = ClientBuilder::tcp(server.tcp_addr()).build();

    let requests: Vec<_> = (0..5u16)
        .map(|i| RequestBuilder::a_with_id(TEST_DOMAIN, 500 + i))
        .collect();
    let responses = join_all(requests.iter().map(|request| client.query(request))).await;

    for (request, response) in requests.iter().zip(responses) {
        assert_eq!(response.unwrap().id, request.id);
    }
    client.shutdown().await;
}

#[tokio::test]
async fn test_unmatched_and_undecodable_replies_are_dropped() {
    let server = TestDnsServer::start_with(TestServerConfig {
        send_orphan: true,
        send_garbage: true,
        ..TestServerConfig::default()
    })
    .await;
    let client = ClientBuilder::udp(server.udp_addr()).build();

    let response = client
        .query(&RequestBuilder::a_with_id(TEST_DOMAIN, 77))
        .await
        .unwrap();
    assert_eq!(response.id, 77);
    assert_test_domain_answer(&response);

    // the receive loop survives and keeps serving later queries
    let response = client
        .query(&RequestBuilder::a_with_id("unknown.com", 78))
        .await
        .unwrap();
    assert!(response.is_name_error());
    assert_eq!(client.pending_requests(), 0);
    client.shutdown().await;
}

#[tokio::test]
async fn test_query_times_out_when_server_is_silent() {
    let server = TestDnsServer::start_with(TestServerConfig::silent()).await;
    let client = ClientBuilder::udp(server.udp_addr()).timeout_ms(200).build();

    let started = Instant::now();
    let err = client
        .query(&RequestBuilder::a(TEST_DOMAIN))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err, DomainError::QueryTimeout);
    assert!(err.is_timeout());
    assert!(elapsed >= Duration::from_millis(200), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "elapsed {:?}", elapsed);
    assert_eq!(client.pending_requests(), 0);
    assert_eq!(server.requests_seen(), 1);
    client.shutdown().await;
}

#[tokio::test]
async fn test_tcp_query_times_out_when_server_is_silent() {
    let server = TestDnsServer::start_with(TestServerConfig::silent()).await;
    let client = ClientBuilder::tcp(server.tcp_addr()).timeout_ms(200).build();

    let err = client
        .query(&RequestBuilder::a(TEST_DOMAIN))
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::QueryTimeout);
    assert_eq!(client.pending_requests(), 0);
    client.shutdown().await;
}

#[tokio::test]
async fn test_slow_reply_within_timeout_succeeds() {
    let server =
        TestDnsServer::start_with(TestServerConfig::delayed(Duration::from_millis(100))).await;
    let client = ClientBuilder::udp(server.udp_addr()).timeout_ms(1000).build();

    let response = client.query(&RequestBuilder::a(TEST_DOMAIN)).await.unwrap();
    assert_test_domain_answer(&response);
    client.shutdown().await;
}

#[tokio::test]
async fn test_cancellation_ends_query_early() {
    let server = TestDnsServer::start_with(TestServerConfig::silent()).await;
    let client = ClientBuilder::udp(server.udp_addr()).timeout_ms(5000).build();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = client
        .query_name_with_cancellation(
            DnsName::parse(TEST_DOMAIN).unwrap(),
            RecordType::A,
            &cancel,
        )
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::QueryCancelled);
    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(client.pending_requests(), 0);
    client.shutdown().await;
}

#[tokio::test]
async fn test_cancellation_wins_over_elapsed_timeout() {
    let server = TestDnsServer::start_with(TestServerConfig::silent()).await;
    let client = ClientBuilder::udp(server.udp_addr()).timeout_ms(0).build();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client
        .query_with_cancellation(&RequestBuilder::a(TEST_DOMAIN), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::QueryCancelled);
    client.shutdown().await;
}

#[tokio::test]
async fn test_dropped_query_releases_registration() {
    let server = TestDnsServer::start_with(TestServerConfig::silent()).await;
    let client = ClientBuilder::udp(server.udp_addr()).build();

    let request = RequestBuilder::a(TEST_DOMAIN);
    let abandoned = tokio::time::timeout(Duration::from_millis(50), client.query(&request)).await;

    assert!(abandoned.is_err());
    assert_eq!(client.pending_requests(), 0);
    client.shutdown().await;
}

#[tokio::test]
async fn test_client_rejects_transport_all() {
    let options = ClientOptions::new("127.0.0.1".parse().unwrap())
        .with_transport(DnsTransportType::All);

    let result = DnsClient::new(options);
    assert!(matches!(result, Err(DomainError::UnsupportedTransport(_))));
}

#[tokio::test]
async fn test_client_options_from_config() {
    let config = ClientConfig {
        server: "::1".to_string(),
        port: 5353,
        transport: DnsTransportType::Tcp,
        request_timeout_ms: 750,
    };

    let options = ClientOptions::from_config(&config).unwrap();
    assert_eq!(options.server, "[::1]:5353".parse().unwrap());
    assert_eq!(options.transport, DnsTransportType::Tcp);
    assert_eq!(options.request_timeout, Duration::from_millis(750));

    let invalid = ClientConfig {
        port: 0,
        ..config
    };
    assert!(matches!(
        ClientOptions::from_config(&invalid),
        Err(DomainError::ConfigError(_))
    ));
}

#[test]
fn test_client_options_defaults() {
    let options = ClientOptions::new("10.0.0.1".parse().unwrap());
    assert_eq!(options.server.port(), 53);
    assert_eq!(options.transport, DnsTransportType::Udp);
    assert_eq!(options.request_timeout, Duration::from_secs(5));
}

#[tokio::test]
async fn test_shutdown_completes_with_nothing_in_flight() {
    let server = TestDnsServer::start().await;
    let client = ClientBuilder::udp(server.udp_addr()).build();

    tokio::time::timeout(Duration::from_secs(1), client.shutdown())
        .await
        .expect("shutdown should not hang");
}
