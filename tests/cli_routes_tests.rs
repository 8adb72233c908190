//! Integration tests for `eventlens list` and `eventlens describe`

use predicates::prelude::*;

#[test]
fn test_list_decodes_query() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("eventlens");
    cmd.args(["list", "--query", "WorkflowType%3D%22Checkout%22"]);

    cmd.assert().success().stdout(
        "GET http://localhost:8233/api/v1/namespaces/default/workflows?query=WorkflowType%3D%22Checkout%22\n",
    );
}

#[test]
fn test_list_archived_with_filters() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("eventlens");
    cmd.args(["list", "-n", "billing", "--archived", "--status", "Running"]);

    cmd.assert().success().stdout(predicate::str::contains(
        "GET http://localhost:8233/api/v1/namespaces/billing/workflows/archived?query=ExecutionStatus%3D%22Running%22",
    ));
}

#[test]
fn test_list_count_without_query_is_one_request() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("eventlens");
    cmd.args(["list", "--count"]);

    cmd.assert().success().stdout(
        "GET http://localhost:8233/api/v1/namespaces/default/workflows?query=\n\
         GET http://localhost:8233/api/v1/namespaces/default/workflow-count\n",
    );
}

#[test]
fn test_list_count_with_query_adds_total() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("eventlens");
    cmd.args(["list", "--count", "--workflow-id", "order-42"]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "GET http://localhost:8233/api/v1/namespaces/default/workflow-count?query=WorkflowId%3D%22order-42%22"
    );
    assert_eq!(
        lines[2],
        "GET http://localhost:8233/api/v1/namespaces/default/workflow-count?query="
    );
}

#[test]
fn test_describe_prints_fetch_route() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("eventlens");
    cmd.args(["describe", "-n", "payments", "-w", "order 42", "-r", "run-1"]);

    cmd.assert().success().stdout(
        "GET http://localhost:8233/api/v1/namespaces/payments/workflows/order%2042/runs/run-1\n",
    );
}

#[test]
fn test_describe_requires_run_id() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("eventlens");
    cmd.args(["describe", "-w", "wf"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field: runId"));
}
