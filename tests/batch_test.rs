//! Integration tests for batch dispatch.

use aliyun_openapi::mocks::{MockResponse, MockTransport, TestFixtures};
use aliyun_openapi::{
    AcsClient, AcsError, AcsRequest, BatchOptions, ClientConfig, DispatchOptions, Payload,
    RetryConfig,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;

fn create_test_client(transport: Arc<MockTransport>) -> AcsClient {
    AcsClient::builder()
        .profile(TestFixtures::profile())
        .config(
            ClientConfig::builder()
                .retry(RetryConfig::immediate(1))
                .build()
                .unwrap(),
        )
        .transport(transport)
        .build()
        .unwrap()
}

fn pages(count: u32) -> Vec<AcsRequest> {
    (1..=count).map(TestFixtures::describe_instances).collect()
}

#[test_case(1 ; "sequential")]
#[test_case(2 ; "two workers")]
#[test_case(4 ; "four workers")]
#[test_case(16 ; "more workers than requests")]
#[tokio::test]
async fn test_every_request_reported_once(concurrency: usize) {
    let transport = Arc::new(MockTransport::with_default(MockResponse::json(200, "{}")));
    let client = create_test_client(transport.clone());
    let requests = pages(10);

    let seen = Mutex::new(Vec::new());
    let summary = client
        .dispatch_batch_with(
            &requests,
            &BatchOptions::new(concurrency),
            &seen,
            |index, _payload, seen| seen.lock().push(index),
            |index, _error, seen| seen.lock().push(index),
        )
        .await;

    let mut seen = seen.into_inner();
    seen.sort_unstable();
    assert_eq!(seen, (0..10).collect::<Vec<_>>());
    assert_eq!(summary.fulfilled, 10);
    assert_eq!(summary.rejected, 0);
    assert_eq!(transport.request_count(), 10);
}

#[tokio::test]
async fn test_failures_go_to_rejected_callback() {
    let transport = Arc::new(MockTransport::with_responses(vec![
        MockResponse::json(200, "{}"),
        MockResponse::json(
            400,
            TestFixtures::error_json("InvalidParameter", "Bad page.", "REQ-2"),
        ),
        MockResponse::json(200, "{}"),
    ]));
    let client = create_test_client(transport);
    let requests = pages(3);

    let fulfilled = Mutex::new(HashSet::new());
    let rejected = Mutex::new(Vec::new());
    let summary = client
        .dispatch_batch_with(
            &requests,
            &BatchOptions::new(1),
            &(),
            |index, _payload: Payload, _| {
                fulfilled.lock().insert(index);
            },
            |index, error: AcsError, _| {
                rejected.lock().push((index, error.error_code().map(str::to_string)));
            },
        )
        .await;

    assert_eq!(summary.fulfilled, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.total(), 3);
    assert_eq!(
        fulfilled.into_inner(),
        [0usize, 2].into_iter().collect::<HashSet<_>>()
    );
    assert_eq!(
        rejected.into_inner(),
        vec![(1, Some("InvalidParameter".to_string()))]
    );
}

#[tokio::test]
async fn test_context_is_passed_to_callbacks() {
    let transport = Arc::new(MockTransport::with_default(MockResponse::json(200, "{}")));
    let client = create_test_client(transport);
    let requests = pages(3);

    let context = ("tenant-a", Mutex::new(0usize));
    client
        .dispatch_batch_with(
            &requests,
            &BatchOptions::new(2),
            &context,
            |_, _, context| {
                assert_eq!(context.0, "tenant-a");
                *context.1.lock() += 1;
            },
            |_, _, _| panic!("no request should fail"),
        )
        .await;

    assert_eq!(*context.1.lock(), 3);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let transport = Arc::new(
        MockTransport::with_default(MockResponse::json(200, "{}"))
            .with_latency(Duration::from_millis(20)),
    );
    let client = create_test_client(transport.clone());
    let requests = pages(12);

    let outcomes = client
        .dispatch_batch(&requests, &BatchOptions::new(3))
        .await;

    assert_eq!(outcomes.len(), 12);
    assert!(outcomes.iter().all(Result::is_ok));
    assert!(transport.max_in_flight() <= 3);
    assert!(transport.max_in_flight() >= 2);
}

#[tokio::test]
async fn test_zero_concurrency_behaves_as_one() {
    let transport = Arc::new(
        MockTransport::with_default(MockResponse::json(200, "{}"))
            .with_latency(Duration::from_millis(5)),
    );
    let client = create_test_client(transport.clone());

    let outcomes = client.dispatch_batch(&pages(4), &BatchOptions::new(0)).await;

    assert_eq!(outcomes.len(), 4);
    assert_eq!(transport.max_in_flight(), 1);
}

#[tokio::test]
async fn test_batch_outcomes_in_request_order() {
    let transport = Arc::new(MockTransport::new());
    let client = create_test_client(transport.clone());

    let requests: Vec<AcsRequest> = vec![
        TestFixtures::describe_instances(1),
        AcsRequest::rpc("NoSuchProduct", "2020-01-01", "Describe"),
        TestFixtures::describe_instances(3),
    ];
    transport.queue_response(MockResponse::json(200, r#"{"RequestId":"A"}"#));
    transport.queue_response(MockResponse::json(200, r#"{"RequestId":"B"}"#));

    let outcomes = client
        .dispatch_batch(&requests, &BatchOptions::new(1))
        .await;

    assert_eq!(outcomes[0].as_ref().unwrap().request_id(), Some("A"));
    assert!(outcomes[1].as_ref().unwrap_err().is_configuration());
    assert_eq!(outcomes[2].as_ref().unwrap().request_id(), Some("B"));
}

#[tokio::test]
async fn test_batch_dispatch_options_apply_to_every_request() {
    let transport = Arc::new(MockTransport::with_default(MockResponse::json(503, "{}")));
    let client = create_test_client(transport.clone());

    let options = BatchOptions::new(2).with_dispatch(DispatchOptions::new().with_max_retries(2));
    let outcomes = client.dispatch_batch(&pages(3), &options).await;

    assert!(outcomes.iter().all(Result::is_err));
    assert_eq!(transport.request_count(), 6);
}

#[tokio::test]
async fn test_empty_batch() {
    let transport = Arc::new(MockTransport::new());
    let client = create_test_client(transport.clone());

    let summary = client
        .dispatch_batch_with(&[], &BatchOptions::new(4), &(), |_, _, _| {}, |_, _, _| {})
        .await;

    assert_eq!(summary.total(), 0);
    assert_eq!(transport.request_count(), 0);
}
