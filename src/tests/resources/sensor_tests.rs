use crate::{
    Device, GraphFormat, GraphOptions, GraphSize, NodeKind, PrtgError, Registry, Sensor, Status,
    tests::fixtures::{create_test_api, device_xml, mount_channels, mount_tree, sensor_xml},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const CHANNELS: &str = "<item><objid>0</objid><name>Ping Time</name>\
                        <lastvalue>12 msec</lastvalue><lastvalue_raw>12</lastvalue_raw></item>\
                        <item><objid>1</objid><name>Packet Loss</name>\
                        <lastvalue>0 %</lastvalue><lastvalue_raw>0</lastvalue_raw></item>";

#[tokio::test]
async fn test_fetch_sensor_loads_channels() {
    let mock_server = MockServer::start().await;
    mount_tree(&mock_server, "2001", &sensor_xml("2001", "Ping", "Up")).await;
    mount_channels(&mock_server, "2001", CHANNELS).await;

    let mut registry = Registry::new();
    let sensor = Sensor::fetch(create_test_api(&mock_server), "2001", &mut registry)
        .await
        .unwrap();

    assert!(registry.contains(NodeKind::Sensor, "2001"));
    assert_eq!(sensor.device_id(), None);
    assert_eq!(sensor.channels().len(), 2);

    let ping = sensor.channel("0").unwrap();
    assert_eq!(ping.sensor_id(), "2001");
    assert_eq!(ping.name(), "Ping Time");
    assert_eq!(ping.last_value_text(), Some("12 msec"));
    assert_eq!(ping.last_value_float(), Some(12.0));
    assert_eq!(ping.last_value_int(), Some(12));
    assert_eq!(ping.unit(), Some("msec"));
}

#[tokio::test]
async fn test_fetch_rejects_other_kind() {
    let mock_server = MockServer::start().await;
    mount_tree(&mock_server, "40", &device_xml("40", "Switch", "")).await;

    let mut registry = Registry::new();
    let result = Sensor::fetch(create_test_api(&mock_server), "40", &mut registry).await;
    assert!(matches!(result, Err(PrtgError::MalformedDocument(_))));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_channels_are_never_pruned() {
    let mock_server = MockServer::start().await;
    mount_tree(&mock_server, "2001", &sensor_xml("2001", "Ping", "Up")).await;
    mount_channels(&mock_server, "2001", CHANNELS).await;

    let api = create_test_api(&mock_server);
    let mut registry = Registry::new();
    let mut sensor = Sensor::fetch(api, "2001", &mut registry).await.unwrap();

    mock_server.reset().await;
    mount_tree(&mock_server, "2001", &sensor_xml("2001", "Ping", "Warning")).await;
    mount_channels(
        &mock_server,
        "2001",
        "<item><objid>0</objid><name>Ping Time</name><lastvalue>250 msec</lastvalue></item>",
    )
    .await;

    sensor.refresh(&mut registry).await.unwrap();

    assert_eq!(sensor.status(), &Status::Warning);
    // Channel 1 is absent from the second table but stays cached.
    assert_eq!(sensor.channels().len(), 2);
    assert_eq!(sensor.channel("0").unwrap().last_value_int(), Some(250));
    assert_eq!(sensor.channel("1").unwrap().name(), "Packet Loss");
}

#[tokio::test]
async fn test_duplicate_channel_ids_are_malformed() {
    let mock_server = MockServer::start().await;
    mount_tree(&mock_server, "2001", &sensor_xml("2001", "Ping", "Up")).await;
    mount_channels(
        &mock_server,
        "2001",
        "<item><objid>0</objid></item><item><objid>0</objid></item>",
    )
    .await;

    let mut registry = Registry::new();
    let result = Sensor::fetch(create_test_api(&mock_server), "2001", &mut registry).await;
    assert!(matches!(result, Err(PrtgError::MalformedDocument(_))));
}

#[tokio::test]
async fn test_acknowledge_then_reads_status() {
    let mock_server = MockServer::start().await;
    mount_tree(&mock_server, "2001", &sensor_xml("2001", "Ping", "Down")).await;
    mount_channels(&mock_server, "2001", CHANNELS).await;

    Mock::given(method("GET"))
        .and(path("/api/acknowledgealarm.htm"))
        .and(query_param("id", "2001"))
        .and(query_param("ackmsg", "investigating"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/getobjectstatus.htm"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<prtg><result>Down (Acknowledged)</result></prtg>"),
        )
        .mount(&mock_server)
        .await;

    let mut registry = Registry::new();
    let mut sensor = Sensor::fetch(create_test_api(&mock_server), "2001", &mut registry)
        .await
        .unwrap();
    let status = sensor.acknowledge("investigating").await.unwrap();

    assert_eq!(status, Status::Other("Down (Acknowledged)".to_string()));
}

#[tokio::test]
async fn test_save_graph_streams_to_file() {
    let mock_server = MockServer::start().await;
    mount_tree(&mock_server, "2001", &sensor_xml("2001", "Ping", "Up")).await;
    mount_channels(&mock_server, "2001", CHANNELS).await;

    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];
    Mock::given(method("GET"))
        .and(path("/chart.png"))
        .and(query_param("type", "graph"))
        .and(query_param("graphid", "2"))
        .and(query_param("id", "2001"))
        .and(query_param("width", "400"))
        .and(query_param("height", "300"))
        .and(query_param("hide", "1"))
        .and(query_param("plotcolor", "#ffffff"))
        .and(query_param("graphstyling", "showLegend='1' baseFontSize='9'"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut registry = Registry::new();
    let mut sensor = Sensor::fetch(create_test_api(&mock_server), "2001", &mut registry)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("ping.png");
    let options = GraphOptions {
        size: GraphSize::Small,
        format: GraphFormat::Png,
        hidden_channels: Some("1".to_string()),
    };
    let saved = sensor.save_graph(2, &target, &options).await.unwrap();

    assert_eq!(saved, target);
    assert_eq!(sensor.graph_path(), Some(target.as_path()));
    assert_eq!(std::fs::read(&target).unwrap(), png);
}

#[tokio::test]
async fn test_fetch_device_indexes_sensors_by_status() {
    let mock_server = MockServer::start().await;
    let sensors = format!(
        "{}{}{}",
        sensor_xml("2001", "Ping", "Up"),
        sensor_xml("2002", "HTTP", "Down"),
        sensor_xml("2003", "SNMP", "Unusual"),
    );
    mount_tree(&mock_server, "40", &device_xml("40", "Switch", &sensors)).await;

    let mut registry = Registry::new();
    let device = Device::fetch(create_test_api(&mock_server), "40", &mut registry)
        .await
        .unwrap();

    let index = device.sensors_by_status();
    assert_eq!(index["Up"], ["2001"]);
    assert_eq!(index["Down"], ["2002"]);
    assert!(index["Warning"].is_empty());
    assert!(index["Paused"].is_empty());
    assert_eq!(index["Unusual"], ["2003"]);
    assert_eq!(device.sensors_with_status(&Status::Down)[0].name(), "HTTP");
    assert_eq!(device.sensors()[0].device_id(), Some("40"));
    assert_eq!(registry.len(), 4);
}

#[tokio::test]
async fn test_device_set_host_and_sensor_params() {
    let mock_server = MockServer::start().await;
    mount_tree(
        &mock_server,
        "40",
        &device_xml("40", "Switch", &sensor_xml("2001", "Script", "Up")),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/setobjectproperty.htm"))
        .and(query_param("id", "40"))
        .and(query_param("name", "host"))
        .and(query_param("value", "switch.example.com"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/setobjectproperty.htm"))
        .and(query_param("id", "2001"))
        .and(query_param("name", "params"))
        .and(query_param("value", "-verbose"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut registry = Registry::new();
    let mut device = Device::fetch(create_test_api(&mock_server), "40", &mut registry)
        .await
        .unwrap();
    device.set_host("switch.example.com").await.unwrap();
    assert_eq!(device.property("host"), Some("switch.example.com"));

    let sensor = device.sensor_mut("2001").unwrap();
    sensor.set_additional_param("-verbose").await.unwrap();
    assert_eq!(sensor.property("params"), Some("-verbose"));
}
