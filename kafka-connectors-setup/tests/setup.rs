use std::path::Path;

use kafka_config::shared::ConnectorsFile;
use kafka_connectors_setup::setup::ConnectorsSetup;
use kafka_telemetry::tracing::init_test_tracing;
use serde_json::json;

use crate::common::{OpCall, RecordingOps};

mod common;

const ENDPOINT: &str = "http://www.sample.endpoint";

fn sample_connectors_file() -> ConnectorsFile {
    ConnectorsFile::from_yaml(
        r#"
connectors:
  sample-connector-1:
    resources:
      - http://foo.bar/resource1.zip
      - http://foo.bar/resource2.zip
    config:
      name: sample-connector-1
      config:
        connector.class: foo.bar
        tasks.max: "1"
        topics: sample_connector_1_topic
  sample-connector-2:
    resources:
      - http://foo.bar/resource3.tar.gz
    config:
      name: sample-connector-2
resources:
  - http://foo.bar/resource0.zip
"#,
    )
    .unwrap()
}

#[tokio::test]
async fn download_fetches_and_extracts_every_resource_once() {
    init_test_tracing();
    let ops = RecordingOps::new();
    let setup = ConnectorsSetup::new(ops.clone(), sample_connectors_file());
    let directory = Path::new("/tmp/connectors");

    let count = setup.download_all(directory).await.unwrap();

    assert_eq!(count, 4);
    let mut urls = ops.downloaded_urls();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "http://foo.bar/resource0.zip",
            "http://foo.bar/resource1.zip",
            "http://foo.bar/resource2.zip",
            "http://foo.bar/resource3.tar.gz",
        ]
    );

    // Each download is directly followed by the extraction of the same file.
    let calls = ops.calls();
    assert_eq!(calls.len(), 8);
    for pair in calls.chunks(2) {
        let (OpCall::Download { directory: dir, url }, OpCall::Extract { archive, destination }) =
            (&pair[0], &pair[1])
        else {
            panic!("unexpected call sequence: {pair:?}");
        };
        assert_eq!(dir, directory);
        assert_eq!(destination, directory);
        assert_eq!(
            archive,
            &directory.join(url.rsplit('/').next().unwrap())
        );
    }
}

#[tokio::test]
async fn shared_resources_are_downloaded_after_connector_resources() {
    init_test_tracing();
    let ops = RecordingOps::new();
    let setup = ConnectorsSetup::new(ops.clone(), sample_connectors_file());

    setup.download_all(Path::new("/tmp")).await.unwrap();

    assert_eq!(
        ops.downloaded_urls().last().map(String::as_str),
        Some("http://foo.bar/resource0.zip")
    );
}

#[tokio::test]
async fn download_stops_at_first_failure() {
    init_test_tracing();
    let ops = RecordingOps::failing_on("http://foo.bar/resource1.zip");
    let setup = ConnectorsSetup::new(ops.clone(), sample_connectors_file());

    let result = setup.download_all(Path::new("/tmp")).await;

    assert!(result.is_err());
    assert_eq!(ops.downloaded_urls(), vec!["http://foo.bar/resource1.zip"]);
    assert!(
        !ops.calls()
            .iter()
            .any(|call| matches!(call, OpCall::Extract { .. }))
    );
}

#[tokio::test]
async fn register_posts_one_config_per_connector() {
    init_test_tracing();
    let ops = RecordingOps::new();
    let setup = ConnectorsSetup::new(ops.clone(), sample_connectors_file());

    let count = setup.register_connectors(ENDPOINT).await.unwrap();

    assert_eq!(count, 2);
    let calls = ops.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.contains(&OpCall::Register {
        endpoint: ENDPOINT.to_string(),
        config: Some(json!({
            "name": "sample-connector-1",
            "config": {
                "connector.class": "foo.bar",
                "tasks.max": "1",
                "topics": "sample_connector_1_topic"
            }
        })),
    }));
    assert!(calls.contains(&OpCall::Register {
        endpoint: ENDPOINT.to_string(),
        config: Some(json!({"name": "sample-connector-2"})),
    }));
}

#[tokio::test]
async fn register_does_not_download() {
    init_test_tracing();
    let ops = RecordingOps::new();
    let setup = ConnectorsSetup::new(ops.clone(), sample_connectors_file());

    setup.register_connectors(ENDPOINT).await.unwrap();

    assert!(ops.downloaded_urls().is_empty());
}

#[tokio::test]
async fn empty_file_does_nothing() {
    init_test_tracing();
    let ops = RecordingOps::new();
    let setup = ConnectorsSetup::new(ops.clone(), ConnectorsFile::default());

    assert_eq!(setup.download_all(Path::new("/tmp")).await.unwrap(), 0);
    assert_eq!(setup.register_connectors(ENDPOINT).await.unwrap(), 0);
    assert!(ops.calls().is_empty());
}
