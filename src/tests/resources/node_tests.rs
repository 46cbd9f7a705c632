use crate::{
    DeleteOutcome, EntityMut, NodeKind, PrtgClient, PrtgError, Sensor, Status,
    core::infrastructure::prompt::MockConfirmPrompt,
    tests::fixtures::{
        connect, device_xml, group_xml, mount_channels, mount_tree, mount_verb, root_xml,
        sensor_xml,
    },
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

async fn connect_with_sensor(mock_server: &MockServer) -> PrtgClient {
    let tree = root_xml(&group_xml(
        "probenode",
        "1",
        "Local Probe",
        &device_xml("40", "Core Switch", &sensor_xml("2001", "Ping", "Up")),
    ));
    mount_tree(mock_server, "0", &tree).await;
    connect(mock_server).await
}

fn sensor_mut<'a>(client: &'a mut PrtgClient, id: &str) -> &'a mut Sensor {
    match client.search_by_id_mut(id) {
        Some(EntityMut::Sensor(sensor)) => sensor,
        other => panic!("expected sensor {id}, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pause_updates_local_state() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/pause.htm"))
        .and(query_param("id", "2001"))
        .and(query_param("action", "0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sensor = sensor_mut(&mut client, "2001");
    sensor.pause(0, None).await.unwrap();

    assert_eq!(sensor.status(), &Status::Paused);
    assert!(!sensor.is_active());
    assert_eq!(sensor.status_raw(), "7");
}

#[tokio::test]
async fn test_rejected_pause_leaves_state_unchanged() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/pause.htm"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let sensor = sensor_mut(&mut client, "2001");
    let result = sensor.pause(0, None).await;

    assert!(matches!(result, Err(PrtgError::Authentication(_))));
    assert_eq!(sensor.status(), &Status::Up);
    assert!(sensor.is_active());
    assert_eq!(sensor.status_raw(), "3");
}

#[tokio::test]
async fn test_timed_pause_and_resume() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/pauseobjectfor.htm"))
        .and(query_param("id", "2001"))
        .and(query_param("duration", "60"))
        .and(query_param("pausemsg", "maintenance window"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pause.htm"))
        .and(query_param("action", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sensor = sensor_mut(&mut client, "2001");
    sensor.pause(60, Some("maintenance window")).await.unwrap();
    assert_eq!(sensor.status(), &Status::Paused);

    sensor.resume().await.unwrap();
    assert_eq!(sensor.status(), &Status::Unknown);
    assert_eq!(sensor.status_raw(), "?");
    assert!(sensor.is_active());
}

#[tokio::test]
async fn test_get_status_stores_live_status() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/getobjectstatus.htm"))
        .and(query_param("id", "2001"))
        .and(query_param("name", "status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<?xml version=\"1.0\"?><prtg><version>23.4</version><result>Down </result></prtg>"),
        )
        .mount(&mock_server)
        .await;

    let sensor = sensor_mut(&mut client, "2001");
    let status = sensor.get_status().await.unwrap();

    assert_eq!(status, Status::Down);
    assert_eq!(sensor.status(), &Status::Down);
    assert_eq!(sensor.property("status"), Some("Down"));
}

#[tokio::test]
async fn test_get_property_not_found_mutates_nothing() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;
    mount_verb(
        &mock_server,
        "getobjectproperty.htm",
        "<?xml version=\"1.0\"?><prtg><version>23.4</version><result>(Property not found)</result></prtg>",
    )
    .await;

    let sensor = sensor_mut(&mut client, "2001");
    let before = sensor.properties().clone();
    let result = sensor.get_property("nonexistent").await;

    assert!(matches!(result, Err(PrtgError::ResourceNotFound(ref m)) if m.contains("nonexistent")));
    assert_eq!(sensor.properties(), &before);
    assert_eq!(sensor.name(), "Ping");
}

#[tokio::test]
async fn test_get_and_set_property() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/getobjectproperty.htm"))
        .and(query_param("name", "interval"))
        .and(query_param("show", "text"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<prtg><result>60</result></prtg>"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/setobjectproperty.htm"))
        .and(query_param("id", "2001"))
        .and(query_param("name", "interval"))
        .and(query_param("value", "300"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sensor = sensor_mut(&mut client, "2001");
    assert_eq!(sensor.get_property("interval").await.unwrap(), "60");
    assert_eq!(sensor.property("interval"), Some("60"));

    sensor.set_interval(300).await.unwrap();
    assert_eq!(sensor.property("interval"), Some("300"));
}

#[tokio::test]
async fn test_rename_and_clone() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/rename.htm"))
        .and(query_param("id", "40"))
        .and(query_param("value", "Edge Switch"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/duplicateobject.htm"))
        .and(query_param("id", "40"))
        .and(query_param("name", "Edge Switch 2"))
        .and(query_param("targetid", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let device = &mut client.probes_mut()[0].devices_mut()[0];
    device.rename("Edge Switch").await.unwrap();
    assert_eq!(device.name(), "Edge Switch");

    device.clone_to("Edge Switch 2", "1").await.unwrap();
    assert_eq!(client.probes()[0].devices().len(), 1);
}

#[tokio::test]
async fn test_add_tags_appends_to_existing() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/getobjectproperty.htm"))
        .and(query_param("name", "tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<prtg><result>pingsensor  core</result></prtg>"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/setobjectproperty.htm"))
        .and(query_param("name", "tags"))
        .and(query_param("value", "pingsensor core backbone"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sensor = sensor_mut(&mut client, "2001");
    sensor.add_tags(&["backbone"], false).await.unwrap();
    assert_eq!(sensor.property("tags"), Some("pingsensor core backbone"));
}

#[tokio::test]
async fn test_add_tags_rejects_invalid_tag_before_any_request() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/setobjectproperty.htm"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let sensor = sensor_mut(&mut client, "2001");
    let spaced = sensor.add_tags(&["two words"], true).await;
    assert!(matches!(spaced, Err(PrtgError::Validation(_))));
    let empty = sensor.add_tags(&[""], true).await;
    assert!(matches!(empty, Err(PrtgError::Validation(_))));
}

#[tokio::test]
async fn test_delete_asks_before_sending() {
    let mock_server = MockServer::start().await;
    let client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/deleteobject.htm"))
        .and(query_param("id", "40"))
        .and(query_param("approve", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let device = &client.probes()[0].devices()[0];

    let mut declining = MockConfirmPrompt::new();
    declining
        .expect_confirm()
        .withf(|question| question.contains("continue"))
        .times(1)
        .returning(|_| Ok(false));
    assert_eq!(device.delete(Some(&declining)).await.unwrap(), DeleteOutcome::Declined);

    let mut approving = MockConfirmPrompt::new();
    approving.expect_confirm().times(1).returning(|_| Ok(true));
    assert_eq!(device.delete(Some(&approving)).await.unwrap(), DeleteOutcome::Deleted);
}

#[tokio::test]
async fn test_delete_root_is_rejected_without_request() {
    let mock_server = MockServer::start().await;
    let client = connect_with_sensor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/deleteobject.htm"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    assert_eq!(client.root().kind(), NodeKind::Root);
    let outcome = client.root().delete(None).await.unwrap();
    assert!(matches!(outcome, DeleteOutcome::Rejected(_)));
}

#[tokio::test]
async fn test_channel_operations_address_the_sensor() {
    let mock_server = MockServer::start().await;
    let mut client = connect_with_sensor(&mock_server).await;
    mount_channels(
        &mock_server,
        "2001",
        "<item><objid>2</objid><name>Packet Loss</name><lastvalue>0 %</lastvalue></item>",
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/api/setobjectproperty.htm"))
        .and(query_param("id", "2001"))
        .and(query_param("subid", "2"))
        .and(query_param("name", "name"))
        .and(query_param("value", "Loss"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pause.htm"))
        .and(query_param("id", "2001"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sensor = sensor_mut(&mut client, "2001");
    sensor.get_channels().await.unwrap();
    let channel = sensor.channel_mut("2").unwrap();

    channel.rename("Loss").await.unwrap();
    assert_eq!(channel.name(), "Loss");

    channel.pause(0, None).await.unwrap();
    assert!(channel.is_active());

    let outcome = channel.delete(None).await.unwrap();
    assert!(matches!(outcome, DeleteOutcome::Rejected(_)));
}
