//! End-to-end aggregation flows over HTTP

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::MockServer;
use zabbix_overview::config::ClientOptions;

use crate::helpers::*;

#[tokio::test]
async fn test_single_host_problem_count() {
    let mock_server = MockServer::start().await;
    rpc_mock(
        "host.get",
        json!({"filter": {"status": 0}}),
        rpc_result(json!([{"hostid": "1", "host": "web1", "name": "web1", "status": "0",
                           "interfaces": [{"ip": "192.168.1.10"}],
                           "hostgroups": [{"name": "Linux servers"}]}])),
    )
    .mount(&mock_server)
    .await;
    rpc_mock(
        "problem.get",
        json!({"recent": false, "suppressed": false}),
        rpc_result(json!([{"objectid": "10", "severity": "4", "name": "High CPU"}])),
    )
    .mount(&mock_server)
    .await;
    rpc_mock(
        "trigger.get",
        json!({"triggerids": ["10"]}),
        rpc_result(json!([{"triggerid": "10", "hosts": [{"hostid": "1"}]}])),
    )
    .expect(1)
    .mount(&mock_server)
    .await;
    rpc_mock("item.get", json!({}), rpc_result(json!([])))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let hosts = client.list_hosts_with_metrics().await.unwrap();

    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].id, "1");
    assert_eq!(hosts[0].problem_count, 1);
    assert_eq!(hosts[0].ip.as_deref(), Some("192.168.1.10"));
    assert_eq!(hosts[0].groups, "Linux servers");
    assert!(hosts[0].metrics.as_ref().unwrap().is_empty());
}

#[tokio::test]
async fn test_cpu_resolved_through_key_fallback() {
    let mock_server = MockServer::start().await;
    rpc_mock(
        "item.get",
        json!({"search": {"key_": "cpu"}}),
        rpc_result(json!([item("42", "Load average", "system.cpu.load[all,avg1]", "23.5")])),
    )
    .with_priority(1)
    .mount(&mock_server)
    .await;
    rpc_mock(
        "item.get",
        json!({"search": {"name": "CPU utilization"}}),
        rpc_result(json!([])),
    )
    .expect(1)
    .with_priority(1)
    .mount(&mock_server)
    .await;
    rpc_mock("item.get", json!({}), rpc_result(json!([])))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let snapshot = client.resolve_metrics("10084").await;

    assert_eq!(snapshot.cpu_utilization.as_deref(), Some("23.5"));
    assert_eq!(snapshot.memory_utilization, None);
    assert_eq!(snapshot.cpu_count, None);
    assert_eq!(snapshot.total_memory_bytes, None);
    assert_eq!(snapshot.uptime_seconds, None);
}

#[tokio::test]
async fn test_empty_trigger_fetch_short_circuits() {
    let mock_server = MockServer::start().await;
    rpc_mock("trigger.get", json!({}), rpc_result(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;
    rpc_mock("problem.get", json!({}), rpc_result(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let triggers = client.correlate().await.unwrap();

    assert!(triggers.is_empty());
    assert_eq!(received_methods(&mock_server).await, vec!["trigger.get"]);
}

#[tokio::test]
async fn test_overview_snapshot() {
    let mock_server = MockServer::start().await;
    rpc_mock("host.get", json!({"countOutput": true}), rpc_result(json!("3")))
        .mount(&mock_server)
        .await;
    rpc_mock("problem.get", json!({"countOutput": true}), rpc_result(json!("2")))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    rpc_mock(
        "problem.get",
        json!({"sortorder": "DESC"}),
        rpc_result(json!([
            {"eventid": "902", "objectid": "20", "name": "Disk full", "severity": "3", "clock": "1700000100"},
            {"eventid": "901", "objectid": "21", "name": "Agent down", "severity": "5", "clock": "1700000000"}
        ])),
    )
    .mount(&mock_server)
    .await;
    rpc_mock(
        "trigger.get",
        json!({"filter": {"value": 1}, "monitored": true}),
        rpc_result(json!([
            {"triggerid": "20", "description": "Disk full", "priority": "3",
             "hosts": [{"hostid": "1", "host": "db1", "name": "Database"}],
             "items": [{"itemid": "7", "name": "Free space", "key_": "vfs.fs.size[/,pfree]", "lastvalue": "2.1"}]},
            {"triggerid": "21", "description": "Agent down", "priority": "5",
             "hosts": [{"hostid": "2", "host": "web1", "name": "web1"}], "items": []},
            {"triggerid": "22", "description": "Flapping", "priority": "1",
             "hosts": [{"hostid": "3", "host": "cache", "name": "cache"}], "items": []}
        ])),
    )
    .mount(&mock_server)
    .await;

    let client = create_test_client(&mock_server);
    let overview = client.get_overview().await.unwrap();

    assert_eq!(overview.host_count, 3);
    assert_eq!(overview.problem_count, 2);
    let triggers: Vec<_> = overview.hosts_with_problems.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(triggers, vec!["20", "21"]);
    assert_eq!(overview.hosts_with_problems[1].problems[0].severity.label(), "Disaster");

    let rows = zabbix_overview::problems::flatten_problems(&overview.hosts_with_problems);
    assert_eq!(rows[0].host_name, "Database");
    assert_eq!(rows[0].last_value, "2.1");
    assert_eq!(rows[1].last_value, "-");
}

#[tokio::test]
async fn test_bounded_enrichment_keeps_sort_order() {
    let mock_server = MockServer::start().await;
    let hosts: Vec<_> = (1..=6)
        .map(|i| json!({"hostid": i.to_string(), "host": format!("h{i}"), "name": format!("h{i}"), "status": "0"}))
        .collect();
    rpc_mock("host.get", json!({}), rpc_result(json!(hosts)))
        .mount(&mock_server)
        .await;
    rpc_mock(
        "problem.get",
        json!({}),
        rpc_result(json!([
            {"objectid": "30", "severity": "2", "name": "a"},
            {"objectid": "31", "severity": "2", "name": "b"},
            {"objectid": "31", "severity": "2", "name": "c"}
        ])),
    )
    .mount(&mock_server)
    .await;
    rpc_mock(
        "trigger.get",
        json!({}),
        rpc_result(json!([
            {"triggerid": "30", "hosts": [{"hostid": "5"}]},
            {"triggerid": "31", "hosts": [{"hostid": "4"}, {"hostid": "5"}]}
        ])),
    )
    .mount(&mock_server)
    .await;
    rpc_mock("item.get", json!({}), rpc_result(json!([])))
        .mount(&mock_server)
        .await;

    let client = create_test_client_with(
        &mock_server,
        ClientOptions {
            timeout_secs: Some(5),
            enrichment_concurrency: Some(2),
        },
    );
    let hosts = client.list_hosts_with_metrics().await.unwrap();

    let order: Vec<_> = hosts.iter().map(|h| (h.id.as_str(), h.problem_count)).collect();
    assert_eq!(
        order,
        vec![("5", 3), ("4", 2), ("1", 0), ("2", 0), ("3", 0), ("6", 0)]
    );
}
