//! Save pipeline end to end against the mock transport: validation and
//! hooks, create/update dispatch, serialization massaging, nested cascades,
//! dynamic finders, and error propagation.

use std::sync::{Arc, Mutex};

use restive::{
    Client, Error, Hooks, Method, MockTransport, Record, Schema, TransportError, Value,
};
use serde_json::json;

/// Hooks that always reject the record.
#[derive(Clone, Copy, Default)]
struct FailingValidation;

impl Hooks for FailingValidation {
    fn validate(&self, record: &mut Record) {
        self.before_validate(record);
        record.errors_mut().add("field", "has invalid characters");
    }
}

/// Hooks that log which lifecycle methods ran.
#[derive(Clone, Default)]
struct LoggingHooks {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl LoggingHooks {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl Hooks for LoggingHooks {
    fn before_save_or_validate(&self, _record: &mut Record) {
        self.calls.lock().unwrap().push("shared");
    }

    fn after_save(&self, _record: &mut Record) {
        self.calls.lock().unwrap().push("after_save");
    }
}

#[tokio::test]
async fn save_strict_errors_when_the_service_rejects_the_record() {
    let mock = MockTransport::new();
    mock.expect_post("/test_resources.json")
        .respond(422, r#"{"errors":["Field has invalid characters"]}"#);

    let client = Client::builder(mock.clone())
        .register(Schema::builder("test_resource").build())
        .build();
    let mut record = client.resource("test_resource").unwrap().new_record();

    let err = record.save_strict().await.unwrap_err();
    assert!(matches!(err, Error::RecordNotSaved));
    assert_eq!(record.errors().on("base"), vec!["Field has invalid characters"]);
    mock.verify();
}

#[tokio::test]
async fn save_strict_errors_when_local_validation_fails() {
    let mock = MockTransport::new();
    let client = Client::builder(mock.clone())
        .register(
            Schema::builder("test_resource")
                .hooks(FailingValidation)
                .build(),
        )
        .build();
    let mut record = client.resource("test_resource").unwrap().new_record();

    let err = record.save_strict().await.unwrap_err();
    assert!(matches!(err, Error::RecordNotSaved));
    assert!(
        mock.requests().is_empty(),
        "an invalid record must not reach the service"
    );
}

#[tokio::test]
async fn save_returns_false_without_remote_traffic_when_invalid() {
    let mock = MockTransport::new();
    let client = Client::builder(mock.clone())
        .register(
            Schema::builder("test_resource")
                .hooks(FailingValidation)
                .build(),
        )
        .build();
    let mut record = client.resource("test_resource").unwrap().new_record();

    assert!(!record.save().await.unwrap());
    assert_eq!(record.errors().len(), 1);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn is_valid_clears_errors_before_each_pass() {
    let client = Client::builder(MockTransport::new())
        .register(
            Schema::builder("test_resource")
                .hooks(FailingValidation)
                .build(),
        )
        .build();
    let mut record = client.resource("test_resource").unwrap().new_record();

    assert!(!record.is_valid());
    assert_eq!(record.errors().len(), 1);
    assert!(!record.is_valid());
    assert_eq!(record.errors().len(), 1, "errors are cleared, not stacked");
}

#[tokio::test]
async fn save_runs_the_hook_chain() {
    let mock = MockTransport::new();
    mock.expect_post("/test_resources.json")
        .respond(200, r#"{"test_resource":{"id":1}}"#);

    let hooks = LoggingHooks::default();
    let client = Client::builder(mock.clone())
        .register(
            Schema::builder("test_resource")
                .hooks(hooks.clone())
                .build(),
        )
        .build();
    let mut record = client.resource("test_resource").unwrap().new_record();

    assert!(record.save().await.unwrap());
    // validation funnels through the shared hook, then before_save does,
    // then after_save runs on success
    assert_eq!(hooks.calls(), vec!["shared", "shared", "after_save"]);
}

#[tokio::test]
async fn validate_funnels_through_the_shared_pre_hook() {
    let hooks = LoggingHooks::default();
    let client = Client::builder(MockTransport::new())
        .register(
            Schema::builder("test_resource")
                .hooks(hooks.clone())
                .build(),
        )
        .build();
    let mut record = client.resource("test_resource").unwrap().new_record();

    record.validate();
    assert_eq!(hooks.calls(), vec!["shared"]);
}

#[tokio::test]
async fn create_for_new_records_and_update_for_persisted_ones() {
    let mock = MockTransport::new();
    mock.expect_post("/test_resources.json")
        .respond(200, r#"{"test_resource":{"id":1,"name":"blah"}}"#);
    mock.expect_put("/test_resources/1.json").respond(200, "");

    let client = Client::builder(mock.clone())
        .register(Schema::builder("test_resource").build())
        .build();
    let mut record = client.resource("test_resource").unwrap().new_record();

    assert!(record.save().await.unwrap());
    assert_eq!(record.id(), Some(1), "id comes from the create response");
    assert_eq!(record.get("name"), Some(&Value::Str("blah".into())));

    assert!(record.save().await.unwrap());
    assert_eq!(mock.calls(Method::Post, "/test_resources.json"), 1);
    assert_eq!(mock.calls(Method::Put, "/test_resources/1.json"), 1);
    mock.verify();
}

#[tokio::test]
async fn serialization_replaces_belongs_to_objects_with_their_id() {
    let client = Client::builder(MockTransport::new())
        .register(Schema::builder("test_resource").belongs_to("gender").build())
        .register(Schema::builder("gender").build())
        .build();

    let gender = client
        .resource("gender")
        .unwrap()
        .build(json!({ "id": 25, "name": "female" }))
        .unwrap();
    let mut record = client.resource("test_resource").unwrap().new_record();
    record.set("gender", gender.into());

    let tree: serde_json::Value = serde_json::from_slice(&record.to_wire().unwrap()).unwrap();
    assert_eq!(tree, json!({ "test_resource": { "gender_id": 25 } }));
}

#[tokio::test]
async fn serialization_drops_ids_fields_and_the_skip_list() {
    let client = Client::builder(MockTransport::new())
        .register(
            Schema::builder("test_resource")
                .has_many("races")
                .skip_serialization("secret")
                .build(),
        )
        .build();

    let mut record = client.resource("test_resource").unwrap().new_record();
    record.set("name", Value::from("x"));
    record.set("race_ids", Value::List(vec![Value::Int(1), Value::Int(2)]));
    record.set("secret", Value::from("hidden"));

    let tree: serde_json::Value = serde_json::from_slice(&record.to_wire().unwrap()).unwrap();
    assert_eq!(tree, json!({ "test_resource": { "name": "x" } }));
}

#[tokio::test]
async fn creating_a_parent_cascades_nested_saves() {
    let mock = MockTransport::new();
    mock.expect_post("/test_resources.json")
        .respond(200, r#"{"test_resource":{"id":1}}"#);
    mock.expect_post("/enrollments.json")
        .respond(200, r#"{"enrollment":{"id":7}}"#);

    let client = Client::builder(mock.clone())
        .register(
            Schema::builder("test_resource")
                .has_many("enrollments")
                .nested("enrollment")
                .build(),
        )
        .register(Schema::builder("enrollment").build())
        .build();

    let enrollments = client.resource("enrollment").unwrap();
    let mut record = client.resource("test_resource").unwrap().new_record();
    record.set(
        "enrollments",
        Value::List(vec![
            enrollments.new_record().into(),
            enrollments.new_record().into(),
        ]),
    );

    assert!(record.save().await.unwrap());
    assert_eq!(record.id(), Some(1));
    assert_eq!(
        mock.calls(Method::Post, "/enrollments.json"),
        2,
        "each child saves once"
    );

    let merged = record.get("enrollments").unwrap().as_list().unwrap();
    assert_eq!(merged.len(), 2);
    for child in merged {
        let child = child.as_record().unwrap();
        assert_eq!(
            child.get("test_resource_id"),
            Some(&Value::Int(1)),
            "children carry the server-assigned parent id"
        );
        assert_eq!(child.id(), Some(7));
    }

    let outcomes = record.nested_outcomes();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.saved && o.resource == "enrollment"));
    mock.verify();
}

#[tokio::test]
async fn updating_a_parent_cascades_nested_saves_too() {
    let mock = MockTransport::new();
    mock.expect_put("/test_resources/1.json")
        .respond(200, r#"{"test_resource":{"id":1}}"#);
    mock.expect_put("/enrollments/5.json")
        .respond(200, r#"{"enrollment":{"id":5}}"#);
    mock.expect_put("/enrollments/6.json")
        .respond(200, r#"{"enrollment":{"id":6}}"#);

    let client = Client::builder(mock.clone())
        .register(
            Schema::builder("test_resource")
                .has_many("enrollments")
                .nested("enrollment")
                .build(),
        )
        .register(Schema::builder("enrollment").build())
        .build();

    let enrollments = client.resource("enrollment").unwrap();
    let mut record = client
        .resource("test_resource")
        .unwrap()
        .build(json!({ "id": 1 }))
        .unwrap();
    record.set(
        "enrollments",
        Value::List(vec![
            enrollments.build(json!({ "id": 5 })).unwrap().into(),
            enrollments.build(json!({ "id": 6 })).unwrap().into(),
        ]),
    );

    assert!(record.save().await.unwrap());
    assert_eq!(mock.calls(Method::Put, "/enrollments/5.json"), 1);
    assert_eq!(mock.calls(Method::Put, "/enrollments/6.json"), 1);
    mock.verify();
}

#[tokio::test]
async fn a_failed_nested_save_is_excluded_but_does_not_fail_the_parent() {
    let mock = MockTransport::new();
    mock.expect_post("/test_resources.json")
        .respond(200, r#"{"test_resource":{"id":1}}"#);
    mock.expect_put("/enrollments/5.json")
        .respond(422, r#"{"errors":["expired"]}"#);
    mock.expect_post("/enrollments.json")
        .respond(200, r#"{"enrollment":{"id":9}}"#);

    let client = Client::builder(mock.clone())
        .register(
            Schema::builder("test_resource")
                .has_many("enrollments")
                .nested("enrollment")
                .build(),
        )
        .register(Schema::builder("enrollment").build())
        .build();

    let enrollments = client.resource("enrollment").unwrap();
    let mut record = client.resource("test_resource").unwrap().new_record();
    record.set(
        "enrollments",
        Value::List(vec![
            enrollments.build(json!({ "id": 5 })).unwrap().into(),
            enrollments.new_record().into(),
        ]),
    );

    assert!(record.save().await.unwrap(), "parent save still succeeds");

    let outcomes = record.nested_outcomes();
    assert_eq!(outcomes.len(), 2);
    assert!(!outcomes[0].saved);
    assert_eq!(outcomes[0].id, Some(5));
    assert!(outcomes[1].saved);
    assert_eq!(outcomes[1].id, Some(9));
    mock.verify();
}

#[tokio::test]
async fn dynamic_finders_dispatch_by_name_pattern() {
    let mock = MockTransport::new();
    mock.expect_get("/test_resources.json?something=SOMETHING")
        .respond(200, r#"{"test_resources":[{"id":1,"something":"SOMETHING"}]}"#);

    let client = Client::builder(mock.clone())
        .register(Schema::builder("test_resource").build())
        .build();
    let resource = client.resource("test_resource").unwrap();

    let found = resource
        .call("find_by_something", json!("SOMETHING"))
        .await
        .unwrap();
    assert_eq!(found.one().unwrap().id(), Some(1));

    let found = resource
        .call("find_all_by_something", json!("SOMETHING"))
        .await
        .unwrap();
    assert_eq!(found.many().len(), 1);

    let err = resource
        .call("something_that_does_not_exist", json!(null))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoSuchMethod(_)));
}

#[tokio::test]
async fn destroy_reload_and_exists() {
    let mock = MockTransport::new();
    mock.expect_get("/test_resources/1.json")
        .respond(200, r#"{"test_resource":{"id":1,"name":"fresh"}}"#);
    mock.expect_delete("/test_resources/1.json").respond(200, "");
    mock.expect_get("/test_resources/9.json").respond(404, "");

    let client = Client::builder(mock.clone())
        .register(Schema::builder("test_resource").build())
        .build();
    let resource = client.resource("test_resource").unwrap();

    let mut record = resource.build(json!({ "id": 1 })).unwrap();
    record.reload().await.unwrap();
    assert_eq!(record.get("name"), Some(&Value::Str("fresh".into())));

    record.destroy().await.unwrap();

    assert!(resource.exists(1).await.unwrap());
    assert!(!resource.exists(9).await.unwrap());
    assert!(matches!(
        resource.find(9).await.unwrap_err(),
        Error::NotFound { .. }
    ));
    mock.verify();
}

#[tokio::test]
async fn transport_failures_propagate_unmodified() {
    let mock = MockTransport::new();
    let client = Client::builder(mock.clone())
        .register(Schema::builder("test_resource").build())
        .build();
    let mut record = client.resource("test_resource").unwrap().new_record();

    let err = record.save().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::NoResponseRecorded { .. })
    ));
}

#[tokio::test]
async fn prefix_options_route_nested_resource_paths() {
    let mock = MockTransport::new();
    mock.expect_post("/countries/7/states.json")
        .respond(200, r#"{"state":{"id":3}}"#);

    let client = Client::builder(mock.clone())
        .register(
            Schema::builder("state")
                .prefix("/countries/:country_id")
                .build(),
        )
        .build();

    let mut record = client
        .resource("state")
        .unwrap()
        .build(json!({ "country_id": 7, "name": "Bavaria" }))
        .unwrap();
    assert_eq!(
        record.prefix_options().get("country_id"),
        Some(&Value::Int(7)),
        "route parameters split out of the attribute map"
    );
    assert!(record.get("country_id").is_none());

    assert!(record.save().await.unwrap());
    assert_eq!(record.id(), Some(3));
    assert_eq!(mock.calls(Method::Post, "/countries/7/states.json"), 1);
    mock.verify();
}
