use super::*;
use crate::dispatch::collector::{CollectAll, SingleValue, SumCollector};
use crate::dispatch::request::ResultWait;
use crate::grid::{FunctionSpec, GridError, LocalGrid};
use serde_json::json;
use std::time::Duration;

fn grid_with_region() -> LocalGrid {
    let grid = LocalGrid::new(3);
    grid.create_region("measurements");
    grid
}

#[tokio::test]
async fn collects_every_member_result() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("entry-count"), |_ctx| Ok(Some(json!(5))));
    let dispatcher = FunctionDispatcher::new(grid);

    let results = dispatcher
        .execute_on_region(
            "measurements",
            DispatchRequest::new("entry-count"),
            CollectAll::new(),
        )
        .await
        .unwrap();

    assert_eq!(results, vec![json!(5), json!(5), json!(5)]);
}

#[tokio::test]
async fn sums_partial_results_across_members() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("value-sum"), |_ctx| Ok(Some(json!(2))));
    let dispatcher = FunctionDispatcher::new(grid);

    let total = dispatcher
        .execute_on_members(DispatchRequest::new("value-sum"), SumCollector::new())
        .await
        .unwrap();

    assert_eq!(total, 6);
}

#[tokio::test]
async fn null_partials_never_reach_the_aggregate() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("sparse"), |ctx| {
        if ctx.member.0 == "member-2" {
            Ok(None)
        } else {
            Ok(Some(json!("hit")))
        }
    });
    let dispatcher = FunctionDispatcher::new(grid);

    let results = dispatcher
        .execute_on_members(DispatchRequest::new("sparse"), CollectAll::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn arguments_reach_every_member() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("first-arg"), |ctx| {
        Ok(ctx.arguments.first().cloned())
    });
    let dispatcher = FunctionDispatcher::new(grid);

    let result = dispatcher
        .execute_on_cache(
            DispatchRequest::new("first-arg").with_args(vec![json!("tick")]),
            SingleValue::new(),
        )
        .await
        .unwrap();

    assert_eq!(result, Some(json!("tick")));
}

#[tokio::test]
async fn filter_restricts_execution_to_key_owners() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("count-keys"), |ctx| {
        Ok(Some(json!(ctx.keys.len())))
    });
    let dispatcher = FunctionDispatcher::new(grid);

    let total = dispatcher
        .execute_on_region(
            "measurements",
            DispatchRequest::new("count-keys").with_filter(["a", "b", "c", "d"]),
            SumCollector::new(),
        )
        .await
        .unwrap();

    assert_eq!(total, 4);
}

#[tokio::test]
async fn unbounded_wait_blocks_until_aggregation_completes() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("entry-count"), |_ctx| Ok(Some(json!(1))));
    grid.delay_results(Duration::from_millis(20));
    let dispatcher = FunctionDispatcher::new(grid);

    let results = dispatcher
        .execute_on_members(
            DispatchRequest::new("entry-count").with_timeout_millis(-1),
            CollectAll::new(),
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn bounded_wait_times_out_on_late_results() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("entry-count"), |_ctx| Ok(Some(json!(1))));
    grid.delay_results(Duration::from_millis(200));
    let dispatcher = FunctionDispatcher::new(grid);

    let result = dispatcher
        .execute_on_members(
            DispatchRequest::new("entry-count").with_timeout(Duration::from_millis(20)),
            CollectAll::new(),
        )
        .await;

    assert!(matches!(result, Err(DispatchError::Timeout(_))));
}

#[tokio::test]
async fn default_timeout_applies_when_request_sets_none() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("entry-count"), |_ctx| Ok(Some(json!(1))));
    grid.delay_results(Duration::from_millis(200));
    let dispatcher =
        FunctionDispatcher::new(grid).with_default_timeout(Duration::from_millis(20));

    let result = dispatcher
        .execute_on_members(DispatchRequest::new("entry-count"), CollectAll::new())
        .await;

    assert!(matches!(result, Err(DispatchError::Timeout(_))));
}

#[tokio::test]
async fn abandoned_stream_surfaces_interrupted() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("entry-count"), |_ctx| Ok(Some(json!(1))));
    grid.abandon_results(true);
    let dispatcher = FunctionDispatcher::new(grid);

    let result = dispatcher
        .execute_on_members(DispatchRequest::new("entry-count"), CollectAll::new())
        .await;

    assert!(matches!(result, Err(DispatchError::Interrupted)));
}

#[tokio::test]
async fn remote_failure_wraps_the_cause() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("explode"), |_ctx| {
        Err("region offline".to_string())
    });
    let dispatcher = FunctionDispatcher::new(grid);

    let result = dispatcher
        .execute_on_members(DispatchRequest::new("explode"), CollectAll::new())
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::Remote(GridError::FunctionFailed { message, .. })) if message == "region offline"
    ));
}

#[tokio::test]
async fn unknown_function_surfaces_remote_error() {
    let grid = grid_with_region();
    let dispatcher = FunctionDispatcher::new(grid);

    let result = dispatcher
        .execute_on_members(DispatchRequest::new("missing"), CollectAll::new())
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::Remote(GridError::UnknownFunction(_)))
    ));
}

#[tokio::test]
async fn single_valued_collector_reports_ambiguity() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("entry-count"), |_ctx| Ok(Some(json!(1))));
    let dispatcher = FunctionDispatcher::new(grid);

    let result = dispatcher
        .execute_on_members(DispatchRequest::new("entry-count"), SingleValue::new())
        .await;

    assert!(matches!(result, Err(DispatchError::Ambiguous(3))));
}

#[tokio::test]
async fn pool_dispatch_lands_on_one_server() {
    let grid = grid_with_region();
    let members = grid.members();
    grid.create_pool("client-pool", members);
    grid.register_function(FunctionSpec::new("entry-count"), |_ctx| Ok(Some(json!(1))));
    let dispatcher = FunctionDispatcher::new(grid);

    let results = dispatcher
        .execute_on_pool("client-pool", DispatchRequest::new("entry-count"), CollectAll::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn explicit_unbounded_wait_is_never_bounded_by_the_default() {
    let grid = grid_with_region();
    grid.register_function(FunctionSpec::new("entry-count"), |_ctx| Ok(Some(json!(1))));
    grid.delay_results(Duration::from_millis(100));
    let dispatcher =
        FunctionDispatcher::new(grid).with_default_timeout(Duration::from_millis(20));

    let results = dispatcher
        .execute_on_members(
            DispatchRequest::new("entry-count").with_timeout_millis(-1),
            CollectAll::new(),
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
}

#[test]
fn sub_millisecond_timeouts_mean_unbounded() {
    assert_eq!(
        DispatchRequest::new("f").with_timeout_millis(0).timeout,
        ResultWait::Unbounded
    );
    assert_eq!(
        DispatchRequest::new("f").with_timeout_millis(-1).timeout,
        ResultWait::Unbounded
    );
    assert_eq!(
        DispatchRequest::new("f").with_timeout_millis(250).timeout,
        ResultWait::For(Duration::from_millis(250))
    );
    assert_eq!(DispatchRequest::new("f").timeout, ResultWait::Default);
}

#[test]
fn result_wait_resolves_against_the_default_bound() {
    let default = Some(Duration::from_millis(20));

    assert_eq!(ResultWait::Default.bound(default), default);
    assert_eq!(ResultWait::Default.bound(None), None);
    assert_eq!(ResultWait::Unbounded.bound(default), None);
    assert_eq!(
        ResultWait::For(Duration::from_secs(1)).bound(default),
        Some(Duration::from_secs(1))
    );
}
