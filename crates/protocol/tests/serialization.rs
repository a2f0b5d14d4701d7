use lf_protocol::*;
use serde_json;
use serde_yaml;

#[test]
fn test_lab_type_deserialization_from_yaml() {
    let yaml_str = r##"
id: crown
name: Zirconia Crown
stages:
  - key: scan
    name: Scan
    order: 1
  - key: design
    name: Design
    order: 2
    color: "#4a90e2"
    allowed_roles:
      - designer
  - key: milling
    name: Milling
    order: 3
    allowed-roles: [technician, designer]
"##;

    let lab_type: LabType = serde_yaml::from_str(yaml_str).expect("Failed to deserialize LabType");

    assert_eq!(lab_type.id, "crown");
    assert_eq!(lab_type.stages.len(), 3);
    assert!(lab_type.stages[0].allowed_roles.is_empty());
    assert_eq!(lab_type.stages[0].color, None);
    assert_eq!(lab_type.stages[1].color.as_deref(), Some("#4a90e2"));
    assert!(lab_type.stages[2].allowed_roles.contains("technician"));
    assert!(lab_type.stage("DESIGN").is_some(), "Key lookup should ignore case");
}

#[test]
fn test_template_and_case_stage_share_role_field_name() {
    let template = StageTemplate {
        key: "design".to_string(),
        name: "Design".to_string(),
        order: 1,
        color: None,
        allowed_roles: ["designer".to_string()].into_iter().collect(),
    };
    let stage = Stage {
        key: template.key.clone(),
        name: template.name.clone(),
        order: 1,
        color: None,
        allowed_roles: template.allowed_roles.clone(),
        status: StageStatus::Pending,
        started_at: None,
        completed_at: None,
    };

    let template_json = serde_json::to_value(&template).expect("Failed to serialize StageTemplate");
    let stage_json = serde_json::to_value(&stage).expect("Failed to serialize Stage");
    assert_eq!(template_json["allowed_roles"], stage_json["allowed_roles"]);
    assert!(template_json.get("allowed-roles").is_none());

    // Hand-written YAML may still use the dashed spelling.
    let parsed: StageTemplate = serde_yaml::from_str("key: design\nname: Design\norder: 1\nallowed-roles: [designer]\n")
        .expect("Dashed role field should deserialize");
    assert_eq!(parsed, template);
}

#[test]
fn test_jump_policy_names() {
    let json = serde_json::to_value(JumpPolicy::Disabled).expect("Failed to serialize JumpPolicy");
    assert_eq!(json, "none");

    let json = serde_json::to_value(JumpPolicy::ForwardWhenPreviousDone).expect("Failed to serialize JumpPolicy");
    assert_eq!(json, "forward-when-previous-done");

    for policy in JumpPolicy::ALL {
        let parsed: JumpPolicy = policy.as_str().parse().expect("Known names should parse");
        assert_eq!(parsed, policy);
    }

    let err = "sideways".parse::<JumpPolicy>().unwrap_err();
    assert_eq!(err, UnknownPolicy("sideways".to_string()));
    assert_eq!(err.to_string(), "unknown jump policy: sideways");
    assert_eq!(JumpPolicy::default(), JumpPolicy::ForwardWhenPreviousDone);
}

#[test]
fn test_stage_status_serialization() {
    let json = serde_json::to_value(StageStatus::InProgress).expect("Failed to serialize StageStatus");
    assert_eq!(json, "in_progress");

    let deserialized: DeliveryStatus = serde_json::from_str("\"delivered\"").expect("Failed to deserialize DeliveryStatus");
    assert_eq!(deserialized, DeliveryStatus::Delivered);
}

#[test]
fn test_doctor_ref_untagged() {
    let unresolved: DoctorRef = serde_json::from_str("\"doc-7\"").expect("Bare id should deserialize");
    assert_eq!(unresolved, DoctorRef::Unresolved("doc-7".to_string()));
    assert_eq!(unresolved.id(), "doc-7");

    let resolved: DoctorRef = serde_json::from_str(r#"{"id":"doc-7","name":"Dr. Okafor"}"#)
        .expect("Object should deserialize");
    assert!(matches!(resolved, DoctorRef::Resolved(ref summary) if summary.name == "Dr. Okafor"));
    assert_eq!(resolved.id(), "doc-7");
}

#[test]
fn test_case_deserialization_with_defaults() {
    use uuid::Uuid;

    let id = Uuid::new_v4();
    let json = format!(
        r#"{{
            "id": "{id}",
            "type_id": "crown",
            "doctor": "doc-1",
            "jump_policy": "next-only",
            "stages": [
                {{ "key": "scan", "name": "Scan", "order": 1, "status": "done" }},
                {{ "key": "design", "name": "Design", "order": 2 }}
            ],
            "created_at": "2026-01-05T09:00:00Z",
            "updated_at": "2026-01-05T09:00:00Z"
        }}"#
    );

    let case: Case = serde_json::from_str(&json).expect("Failed to deserialize Case");

    assert_eq!(case.id, id);
    assert_eq!(case.jump_policy, JumpPolicy::NextOnly);
    assert_eq!(case.stages[1].status, StageStatus::Pending);
    assert_eq!(case.current_stage_order, None);
    assert_eq!(case.delivery.status, DeliveryStatus::Pending);
    assert!(!case.case_approval.approved);
    assert_eq!(case.version, 0);
    assert!(!case.is_fully_done());
}

#[test]
fn test_global_config_defaults() {
    let config: GlobalConfig = serde_json::from_str("{}").expect("Empty config should deserialize");

    assert_eq!(config.default_jump_policy, JumpPolicy::ForwardWhenPreviousDone);
    assert_eq!(config.initial_stage, InitialStage::FirstInProgress);
    assert_eq!(config.superuser_roles, vec!["admin".to_string()]);
    assert_eq!(config, GlobalConfig::default());
}

#[test]
fn test_op_enum_serialization() {
    use uuid::Uuid;

    let op = Op::Transition {
        case_id: Uuid::new_v4(),
        target_order: 3,
    };

    let json = serde_json::to_value(&op).expect("Failed to serialize Op");
    assert_eq!(json["type"], "transition");
    assert_eq!(json["payload"]["target_order"], 3);

    let deserialized: Op = serde_json::from_value(json).expect("Failed to deserialize Op");
    match deserialized {
        Op::Transition { target_order, .. } => assert_eq!(target_order, 3),
        _ => panic!("Wrong variant"),
    }

    let create = Op::CreateCase {
        type_id: "crown".to_string(),
        doctor: DoctorRef::Unresolved("doc-1".to_string()),
        jump_policy: JumpPolicy::ForwardAny,
    };
    let json = serde_json::to_value(&create).expect("Failed to serialize Op::CreateCase");
    assert_eq!(json["type"], "createCase");
    assert_eq!(json["payload"]["jump_policy"], "forward-any");
    assert_eq!(create.case_id(), None);
}

#[test]
fn test_event_enum_serialization() {
    use uuid::Uuid;

    let event = Event::StageChanged {
        case_id: Uuid::new_v4(),
        from_order: Some(1),
        to_order: 2,
        progress: 50,
    };

    let json = serde_json::to_value(&event).expect("Failed to serialize Event");
    assert_eq!(json["type"], "stageChanged");
    assert!(json["payload"].is_object());

    let delivered = Event::DeliveryUpdated {
        case_id: Uuid::new_v4(),
        status: DeliveryStatus::Delivered,
    };
    let json = serde_json::to_value(&delivered).expect("Failed to serialize Event");
    assert_eq!(json["type"], "deliveryUpdated");
    assert_eq!(json["payload"]["status"], "delivered");
}
