//! `/query` endpoint integration tests.
//!
//! Tests batch execution, rendering, and error handling over HTTP.

use personaldb::config::ClassifierKind;
use pretty_assertions::assert_eq;

use super::common::TestServer;

/// Scenario: single read-only statement
/// Given the body `SELECT 1 AS x`
/// Then the response is 200 with one column line and one data line
#[tokio::test]
async fn test_select_renders_columns_and_row() {
    let server = TestServer::start().await;

    let (status, body) = server.query("SELECT 1 AS x").await;

    assert_eq!(status, 200);
    assert_eq!(body, "[x]\n[1]\n");
    server.stop().await;
}

/// Scenario: trailing separator
/// Given the body `SELECT 1 AS x;`
/// Then the trailing empty statement runs as a read-only no-op
/// And the response is 200 with only the select's output
#[tokio::test]
async fn test_trailing_separator_is_ignored() {
    let server = TestServer::start().await;

    let (status, body) = server.query("SELECT 1 AS x;").await;

    assert_eq!(status, 200);
    assert_eq!(body, "[x]\n[1]\n");
    server.stop().await;
}

/// Scenario: trailing separator followed by whitespace
#[tokio::test]
async fn test_trailing_separator_with_whitespace() {
    let server = TestServer::start().await;

    let (status, body) = server.query("SELECT 1; ").await;

    assert_eq!(status, 200);
    assert_eq!(body, "[1]\n[1]\n");
    server.stop().await;
}

/// Scenario: mutation with a trailing separator
/// Then only the mutation writes a line
#[tokio::test]
async fn test_trailing_separator_after_mutation() {
    let server = TestServer::start().await;

    let (status, body) = server.query("CREATE TABLE t(a);").await;

    assert_eq!(status, 200);
    assert_eq!(body.lines().count(), 1);
    assert!(body.starts_with("MutationSummary"));
    server.stop().await;
}

/// Scenario: empty body
/// Then the single empty statement is read-only and writes nothing
#[tokio::test]
async fn test_empty_body_is_ok() {
    let server = TestServer::start().await;

    let (status, body) = server.query("").await;

    assert_eq!(status, 200);
    assert_eq!(body, "");
    server.stop().await;
}

#[tokio::test]
async fn test_create_table_returns_summary_line() {
    let server = TestServer::start().await;

    let (status, body) = server.query("CREATE TABLE t(a)").await;

    assert_eq!(status, 200);
    assert_eq!(body.lines().count(), 1);
    assert!(!body.trim().is_empty());
    assert!(body.ends_with('\n'));
    server.stop().await;
}

#[tokio::test]
async fn test_only_read_only_statements() {
    let server = TestServer::start().await;

    let (status, body) = server
        .query("SELECT 1 AS a, 2 AS b; SELECT 'x' AS c UNION ALL SELECT 'y'; SELECT 3 AS d WHERE 0")
        .await;

    assert_eq!(status, 200);
    assert_eq!(body, "[a b]\n[1 2]\n[c]\n[x]\n[y]\n[d]\n");
    server.stop().await;
}

#[tokio::test]
async fn test_mixed_batch_in_order() {
    let server = TestServer::start().await;

    let (status, body) = server
        .query(
            "CREATE TABLE people(name TEXT, nick TEXT); \
             INSERT INTO people VALUES ('ada', NULL); \
             SELECT name, nick FROM people; \
             UPDATE people SET nick = 'countess'; \
             SELECT nick FROM people",
        )
        .await;

    assert_eq!(status, 200);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[2], "[name nick]");
    assert_eq!(lines[3], "[ada \\N]");
    assert!(lines[4].contains("rows_affected: 1"));
    assert_eq!(lines[5], "[nick]");
    assert_eq!(lines[6], "[countess]");
    server.stop().await;
}

#[tokio::test]
async fn test_state_persists_across_requests() {
    let server = TestServer::start().await;

    let (status, _) = server
        .query("CREATE TABLE kv(k, v); INSERT INTO kv VALUES ('a', 1)")
        .await;
    assert_eq!(status, 200);

    let (status, body) = server.query("SELECT k, v FROM kv").await;
    assert_eq!(status, 200);
    assert_eq!(body, "[k v]\n[a 1]\n");
    server.stop().await;
}

/// Scenario: prepare failure mid-batch
/// Given a batch whose second statement is invalid
/// Then the response is 500 with a non-empty body
/// And the third statement never runs
#[tokio::test]
async fn test_prepare_failure_aborts_rest_of_batch() {
    let server = TestServer::start().await;

    let (status, body) = server
        .query("CREATE TABLE t(a); SELEC nonsense; INSERT INTO t VALUES (1)")
        .await;

    assert_eq!(status, 500);
    assert!(body.contains("syntax error"));

    let (status, body) = server.query("SELECT COUNT(*) AS n FROM t").await;
    assert_eq!(status, 200);
    assert_eq!(body, "[n]\n[0]\n");
    server.stop().await;
}

#[tokio::test]
async fn test_execution_failure_is_500() {
    let server = TestServer::start().await;

    let (status, body) = server
        .query("CREATE TABLE u(a NOT NULL); INSERT INTO u VALUES (NULL)")
        .await;

    assert_eq!(status, 500);
    assert!(body.starts_with("Query error:"));
    assert!(body.contains("NOT NULL"));
    server.stop().await;
}

#[tokio::test]
async fn test_separator_inside_literal_splits() {
    let server = TestServer::start().await;

    let (status, body) = server.query("SELECT 'a;b' AS s").await;

    assert_eq!(status, 500);
    assert!(body.contains("unrecognized token"));
    server.stop().await;
}

#[tokio::test]
async fn test_invalid_utf8_body() {
    let server = TestServer::start().await;

    let response = reqwest::Client::new()
        .post(format!("{}/query", server.base_url))
        .body(vec![0xff, 0xfe, 0x00])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    assert!(response.text().await.unwrap().contains("UTF-8"));
    server.stop().await;
}

#[tokio::test]
async fn test_keyword_classifier_server() {
    let server = TestServer::start_with(ClassifierKind::Keyword).await;

    let (status, body) = server
        .query("CREATE TABLE t(a); INSERT INTO t VALUES (5); SELECT a FROM t")
        .await;

    assert_eq!(status, 200);
    assert!(body.ends_with("[a]\n[5]\n"));
    server.stop().await;
}
