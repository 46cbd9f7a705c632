use crate::{
    EntityRef, NodeKind, PrtgClient, PrtgClientBuilder, PrtgError, ValidationError,
    tests::fixtures::{
        PASSHASH, USERNAME, connect, device_xml, group_xml, mount_tree, root_xml, sensor_xml,
    },
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn local_builder(mock_server: &MockServer) -> PrtgClientBuilder {
    let address = mock_server.address();
    PrtgClient::builder()
        .host(address.ip().to_string())
        .port(address.port())
        .secure(false)
}

#[tokio::test]
async fn test_build_requires_host_and_credentials() {
    let missing_host = PrtgClient::builder()
        .credentials(USERNAME, PASSHASH)
        .build_api()
        .await;
    assert!(matches!(
        missing_host,
        Err(PrtgError::Validation(ValidationError::Field { ref field, .. })) if field == "host"
    ));

    let missing_credentials = PrtgClient::builder()
        .host("prtg.example.com")
        .build_api()
        .await;
    assert!(matches!(
        missing_credentials,
        Err(PrtgError::Validation(ValidationError::Field { ref field, .. })) if field == "username"
    ));
}

#[tokio::test]
async fn test_build_rejects_invalid_values() {
    let bad_host = PrtgClient::builder()
        .host("not a host!")
        .credentials(USERNAME, PASSHASH)
        .build_api()
        .await;
    assert!(matches!(bad_host, Err(PrtgError::Validation(_))));

    let bad_passhash = PrtgClient::builder()
        .host("prtg.example.com")
        .credentials(USERNAME, "not-a-hash")
        .build_api()
        .await;
    assert!(matches!(bad_passhash, Err(PrtgError::Validation(_))));
}

#[tokio::test]
async fn test_build_api_defaults_to_https_port() {
    let api = PrtgClient::builder()
        .host("prtg.example.com")
        .credentials(USERNAME, PASSHASH)
        .build_api()
        .await
        .unwrap();

    let connection = api.connection();
    assert!(connection.is_connection_secure());
    assert_eq!(connection.prtg_port().get(), 443);
    assert_eq!(connection.prtg_url().as_str(), "https://prtg.example.com/");
}

#[tokio::test]
async fn test_password_credentials_resolve_passhash() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/getpasshash.htm"))
        .and(query_param("username", USERNAME))
        .and(query_param("password", "prtgadmin-password"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PASSHASH))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/table.xml"))
        .and(query_param("passhash", PASSHASH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(crate::tests::fixtures::tree_document(
                &root_xml(""),
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = local_builder(&mock_server)
        .password_credentials(USERNAME, "prtgadmin-password")
        .connect()
        .await
        .unwrap();

    assert_eq!(client.api().connection().prtg_passhash().as_str(), PASSHASH);
    assert!(client.registry().is_empty());
}

#[tokio::test]
async fn test_connect_with_other_root() {
    let mock_server = MockServer::start().await;
    mount_tree(
        &mock_server,
        "10",
        &group_xml("group", "10", "Servers", &device_xml("20", "A", "")),
    )
    .await;

    let client = local_builder(&mock_server)
        .credentials(USERNAME, PASSHASH)
        .root_id("10")
        .connect()
        .await
        .unwrap();

    assert_eq!(client.root().id(), "10");
    assert_eq!(client.root().name(), "Servers");
    assert!(client.probes().is_empty());
    assert_eq!(client.devices().len(), 1);
}

#[tokio::test]
async fn test_search_by_id_finds_every_kind() {
    let mock_server = MockServer::start().await;
    let tree = root_xml(&group_xml(
        "probenode",
        "1",
        "Local Probe",
        &format!(
            "{}{}",
            group_xml("group", "10", "Servers", &device_xml("20", "A", &sensor_xml("2001", "Ping", "Up"))),
            device_xml("21", "Probe Device", &sensor_xml("2101", "CPU", "Up")),
        ),
    ));
    mount_tree(&mock_server, "0", &tree).await;
    let client = connect(&mock_server).await;

    match client.search_by_id("1") {
        Some(EntityRef::Group(probe)) => assert_eq!(probe.kind(), NodeKind::Probe),
        other => panic!("unexpected: {other:?}"),
    }
    match client.search_by_id("2001") {
        Some(EntityRef::Sensor(sensor)) => assert_eq!(sensor.device_id(), Some("20")),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(client.search_by_id("21").map(|e| e.node().name()), Some("Probe Device"));
    assert!(client.search_by_id("0").is_none());
    assert!(client.search_by_id("404").is_none());

    let mut sensor_ids: Vec<&str> = client.sensors().iter().map(|s| s.id()).collect();
    sensor_ids.sort_unstable();
    assert_eq!(sensor_ids, ["2001", "2101"]);
}

#[tokio::test]
async fn test_from_env_reads_prtg_variables() {
    // Only this test touches PRTG_* variables.
    unsafe {
        std::env::set_var("PRTG_HOST", "prtg.example.com");
        std::env::set_var("PRTG_PORT", "8443");
        std::env::set_var("PRTG_USERNAME", USERNAME);
        std::env::set_var("PRTG_PASSHASH", PASSHASH);
        std::env::set_var("PRTG_SECURE", "true");
        std::env::set_var("PRTG_ROOT_ID", "0");
    }

    let api = PrtgClientBuilder::from_env()
        .unwrap()
        .build_api()
        .await
        .unwrap();
    assert_eq!(
        api.connection().prtg_url().as_str(),
        "https://prtg.example.com:8443/"
    );

    unsafe {
        std::env::set_var("PRTG_SECURE", "maybe");
    }
    assert!(matches!(
        PrtgClientBuilder::from_env(),
        Err(PrtgError::Validation(_))
    ));

    unsafe {
        for name in [
            "PRTG_HOST",
            "PRTG_PORT",
            "PRTG_USERNAME",
            "PRTG_PASSHASH",
            "PRTG_SECURE",
            "PRTG_ROOT_ID",
        ] {
            std::env::remove_var(name);
        }
    }
}
