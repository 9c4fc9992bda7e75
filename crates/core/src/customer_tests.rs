// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::{json, Value};

fn config(value: serde_json::Value) -> AgentConfig {
    match value {
        Value::Object(map) => AgentConfig(map),
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn merge_replaces_scalars_and_arrays() {
    let mut base = config(json!({"voice": "isla", "greetings": ["hi"]}));
    base.merge(&config(json!({"voice": "rachel", "greetings": ["hello", "hey"]})));
    assert_eq!(base, config(json!({"voice": "rachel", "greetings": ["hello", "hey"]})));
}

#[test]
fn merge_recurses_into_nested_objects() {
    let mut base = config(json!({
        "llm": {"model": "llama-4", "temperature": 0.4},
        "tts": {"voice": "isla"}
    }));
    base.merge(&config(json!({"llm": {"temperature": 0.2}})));
    assert_eq!(
        base,
        config(json!({
            "llm": {"model": "llama-4", "temperature": 0.2},
            "tts": {"voice": "isla"}
        }))
    );
}

#[test]
fn merge_inserts_new_keys() {
    let mut base = config(json!({}));
    base.merge(&config(json!({"stt": {"language": "en"}})));
    assert_eq!(base, config(json!({"stt": {"language": "en"}})));
}

#[test]
fn merge_replaces_scalar_with_object() {
    // A scalar under the same key is replaced wholesale, not merged into.
    let mut base = config(json!({"llm": "groq"}));
    base.merge(&config(json!({"llm": {"model": "gpt-4o"}})));
    assert_eq!(base, config(json!({"llm": {"model": "gpt-4o"}})));
}

#[test]
fn endpoint_requires_resolved_address() {
    let mut record = sample_record();
    assert_eq!(record.endpoint().as_deref(), Some("10.0.1.5:8000"));

    record.instance_address.clear();
    assert_eq!(record.endpoint(), None);
}

#[test]
fn record_defaults_apply_on_load() {
    // api_port and status were absent in early registry files.
    let json = r#"{
        "customer_id": "acme",
        "customer_name": "Acme Realty",
        "compute_instance_id": "i-0abc",
        "instance_address": "10.0.1.5",
        "credential_reference": "acme-prod",
        "last_updated": null
    }"#;
    let record: CustomerRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.api_port, 8000);
    assert_eq!(record.status, "inactive");
    assert!(record.agent_config.is_empty());
}

fn sample_record() -> CustomerRecord {
    CustomerRecord {
        customer_id: "acme".into(),
        customer_name: "Acme Realty".into(),
        compute_instance_id: "i-0abc".into(),
        instance_address: "10.0.1.5".into(),
        credential_reference: "acme-prod".into(),
        api_port: 8000,
        agent_config: AgentConfig::default(),
        status: "inactive".into(),
        last_updated: None,
    }
}
