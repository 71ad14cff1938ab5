//! End-to-end criteria evaluation scenarios

use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

use codecriteria::criteria::compare_strings;
use codecriteria::models::{
    CheckOn, ComparatorOperator, CriteriaFilter, CriteriaValue, MonitorResponse, OperatorFamily,
};
use codecriteria::{evaluate, CustomCodeCriteria};

fn rule(
    check_on: CheckOn,
    operator: ComparatorOperator,
    value: Option<CriteriaValue>,
) -> CriteriaFilter {
    CriteriaFilter::new(check_on, operator, value)
}

#[test]
fn execution_time_above_threshold_fires() {
    let response = MonitorResponse {
        execution_time_in_ms: Some(150.0),
        ..MonitorResponse::default()
    };

    let violation = evaluate(
        &response,
        &rule(CheckOn::ExecutionTime, ComparatorOperator::GreaterThan, Some(100.0.into())),
    )
    .expect("rule should fire");

    assert!(violation.contains("Execution Time"));
    assert!(violation.contains("150"));
}

#[test]
fn execution_time_below_threshold_does_not_fire() {
    let response = MonitorResponse {
        execution_time_in_ms: Some(50.0),
        ..MonitorResponse::default()
    };

    assert_eq!(
        evaluate(
            &response,
            &rule(CheckOn::ExecutionTime, ComparatorOperator::GreaterThan, Some(100.0.into())),
        ),
        None
    );
}

#[test]
fn error_is_not_empty_fires_only_with_an_error() {
    let is_not_empty = rule(CheckOn::Error, ComparatorOperator::IsNotEmpty, None);

    assert_eq!(evaluate(&MonitorResponse::default(), &is_not_empty), None);

    let failed = MonitorResponse {
        script_error: Some("boom".to_string()),
        ..MonitorResponse::default()
    };
    assert!(evaluate(&failed, &is_not_empty).is_some());
}

#[test]
fn numeric_result_equals_string_threshold() {
    let response = MonitorResponse {
        result: Some(json!(5)),
        ..MonitorResponse::default()
    };

    assert_eq!(
        evaluate(
            &response,
            &rule(CheckOn::ResultValue, ComparatorOperator::Equals, Some("5".into())),
        )
        .as_deref(),
        Some("Result Value: 5 is equal to 5")
    );
}

#[test]
fn object_result_is_compared_as_json_without_mutation() {
    let response = MonitorResponse {
        result: Some(json!({"code": "err"})),
        ..MonitorResponse::default()
    };
    let before = response.clone();

    let violation = evaluate(
        &response,
        &rule(CheckOn::ResultValue, ComparatorOperator::Contains, Some("err".into())),
    );

    assert!(violation.is_some());
    assert_eq!(response, before);
    assert_eq!(response.result, Some(json!({"code": "err"})));
}

#[test]
fn absent_result_is_empty() {
    let response = MonitorResponse::default();

    assert_eq!(
        evaluate(
            &response,
            &rule(CheckOn::ResultValue, ComparatorOperator::IsEmpty, None),
        )
        .as_deref(),
        Some("Result Value: Value is empty")
    );
}

#[test]
fn rules_deserialize_from_wire_format() {
    let response: MonitorResponse = serde_json::from_value(json!({
        "executionTimeInMS": 1200,
        "scriptError": null,
        "result": {"status": "degraded", "latency": 1200}
    }))
    .unwrap();
    let rule: CriteriaFilter = serde_json::from_value(json!({
        "checkOn": "Result Value",
        "filterType": "Contains",
        "value": "degraded"
    }))
    .unwrap();

    assert!(evaluate(&response, &rule).is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_evaluations_agree() {
    let response = Arc::new(MonitorResponse {
        execution_time_in_ms: Some(320.0),
        script_error: Some("upstream timeout".to_string()),
        result: Some(json!({"ok": false})),
        log_messages: vec![],
    });
    let rules = Arc::new(vec![
        rule(CheckOn::ExecutionTime, ComparatorOperator::GreaterThan, Some(300.0.into())),
        rule(CheckOn::Error, ComparatorOperator::Contains, Some("timeout".into())),
        rule(CheckOn::ResultValue, ComparatorOperator::NotContains, Some("true".into())),
    ]);

    let expected: Vec<Option<String>> = rules.iter().map(|r| evaluate(&response, r)).collect();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let response = Arc::clone(&response);
            let rules = Arc::clone(&rules);
            tokio::spawn(async move {
                let evaluator = CustomCodeCriteria::default();
                rules
                    .iter()
                    .map(|r| evaluator.evaluate(&response, r))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), expected);
    }
    assert!(expected.iter().all(Option::is_some));
}

fn result_strategy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        any::<i32>().prop_map(|n| Some(json!(n))),
        (-1.0e6..1.0e6f64).prop_map(|n| Some(json!(n))),
        any::<bool>().prop_map(|b| Some(json!(b))),
        "[a-z0-9 ]{0,12}".prop_map(|s| Some(json!(s))),
        ("[a-z]{1,6}", "[a-z0-9]{0,6}")
            .prop_map(|(k, v)| Some(json!({ "key": k, "value": v, "nested": [1, 2] }))),
    ]
}

fn response_strategy() -> impl Strategy<Value = MonitorResponse> {
    (
        proptest::option::of(0.0..10_000.0f64),
        proptest::option::of("[a-zA-Z ]{0,16}"),
        result_strategy(),
    )
        .prop_map(|(execution_time_in_ms, script_error, result)| MonitorResponse {
            execution_time_in_ms,
            script_error,
            result,
            log_messages: vec![],
        })
}

fn value_strategy() -> impl Strategy<Value = Option<CriteriaValue>> {
    prop_oneof![
        Just(None),
        (-1.0e4..1.0e4f64).prop_map(|n| Some(CriteriaValue::Number(n))),
        "[a-z0-9. ]{0,8}".prop_map(|s| Some(CriteriaValue::Text(s))),
    ]
}

fn rule_strategy() -> impl Strategy<Value = CriteriaFilter> {
    (
        proptest::sample::select(CheckOn::ALL.to_vec()),
        proptest::sample::select(ComparatorOperator::ALL.to_vec()),
        value_strategy(),
    )
        .prop_map(|(check_on, operator, value)| CriteriaFilter::new(check_on, operator, value))
}

proptest! {
    #[test]
    fn evaluation_is_idempotent_and_pure(response in response_strategy(), rule in rule_strategy()) {
        let before = response.clone();

        let first = evaluate(&response, &rule);
        let second = evaluate(&response, &rule);

        prop_assert_eq!(first, second);
        prop_assert_eq!(&response, &before);
    }

    #[test]
    fn non_numeric_execution_time_threshold_never_fires(
        response in response_strategy(),
        operator in proptest::sample::select(ComparatorOperator::ALL.to_vec()),
        threshold in "[a-z]*x[a-z]*",
    ) {
        let rule = CriteriaFilter::new(
            CheckOn::ExecutionTime,
            operator,
            Some(CriteriaValue::Text(threshold)),
        );
        prop_assert_eq!(evaluate(&response, &rule), None);
    }

    #[test]
    fn error_presence_matches_emptiness(
        script_error in proptest::option::of("[a-z]{0,6}"),
        value in value_strategy(),
    ) {
        let response = MonitorResponse {
            script_error: script_error.clone(),
            ..MonitorResponse::default()
        };
        let is_empty = script_error.as_deref().map_or(true, str::is_empty);

        let empty_rule =
            CriteriaFilter::new(CheckOn::Error, ComparatorOperator::IsEmpty, value.clone());
        let not_empty_rule =
            CriteriaFilter::new(CheckOn::Error, ComparatorOperator::IsNotEmpty, value);

        prop_assert_eq!(evaluate(&response, &empty_rule).is_some(), is_empty);
        prop_assert_eq!(evaluate(&response, &not_empty_rule).is_some(), !is_empty);
    }

    #[test]
    fn error_string_rules_agree_with_compare_strings(
        script_error in "[a-z ]{1,12}",
        threshold in "[a-z]{1,3}",
        operator in proptest::sample::select(
            ComparatorOperator::ALL
                .into_iter()
                .filter(|op| matches!(op.family(), OperatorFamily::Text | OperatorFamily::Equality))
                .collect::<Vec<_>>()
        ),
    ) {
        let response = MonitorResponse {
            script_error: Some(script_error.clone()),
            ..MonitorResponse::default()
        };
        let rule = CriteriaFilter::new(
            CheckOn::Error,
            operator,
            Some(CriteriaValue::Text(threshold.clone())),
        );

        prop_assert_eq!(
            evaluate(&response, &rule).is_some(),
            compare_strings(&script_error, &threshold, operator).is_some()
        );
    }
}
