use menukit::domain::{
    AsapOptions, Condition, ConditionOperator, ConditionValue, Item, Menu, Operation, OrderScheduling, PreorderOptions,
    PriceInfo, Rule, RuleValue, TimeBounds,
};
use menukit::{Client, ClientConfig, EntityId, Revision, SdkError};
use serde_json::json;

#[tokio::test]
async fn dinner_menu_revision_lifecycle() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let menus = client.menus();

    let created = menus.create(&Menu::named("Dinner")).await.unwrap();
    assert_eq!(serde_json::to_value(&created).unwrap()["revision"], json!("1"));

    let mut edit = created.clone();
    edit.name = "Dinner Specials".into();
    let updated = menus.update(&edit).await.unwrap();
    assert_eq!(updated.meta.revision, Some(Revision(2)));

    // Same edit again still carries revision 1.
    let err = menus.update(&edit).await.unwrap_err();
    assert!(err.is_retryable_after_refetch());
    match err {
        SdkError::Conflict { submitted, current, .. } => {
            assert_eq!(submitted, "1");
            assert_eq!(current, "2");
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    let id = created.meta.id.clone().unwrap();
    let stored = menus.get(&id).await.unwrap();
    assert_eq!(stored.name, "Dinner Specials");
    assert_eq!(stored.meta.revision, Some(Revision(2)));
}

#[tokio::test]
async fn revisions_strictly_increase() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let menus = client.menus();
    let mut m = menus.create(&Menu::named("Lunch")).await.unwrap();
    let mut seen = vec![m.meta.revision.unwrap()];
    for name in ["Lunch 2", "Lunch 3"] {
        m.name = name.into();
        m = menus.update(&m).await.unwrap();
        seen.push(m.meta.revision.unwrap());
    }
    assert!(seen.windows(2).all(|w| w[1] == w[0].next()));
    assert!(m.meta.updated_date >= m.meta.created_date);
}

#[tokio::test]
async fn create_is_validated_before_sending() {
    let (client, backend) = Client::in_memory(ClientConfig::default());
    let err = client.menus().create(&Menu::named("   ")).await.unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));

    let both = Item {
        name: "Soup".into(),
        price_info: Some(PriceInfo { price: "4.00".into() }),
        price_variants: vec![menukit::domain::PriceVariant { variant_id: "bowl".into(), price_info: None }],
        ..Item::default()
    };
    assert!(matches!(client.items().create(&both).await, Err(SdkError::Validation(_))));
    assert!(backend.is_empty("menus"));
    assert!(backend.is_empty("items"));
}

#[tokio::test]
async fn update_requires_identity() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let err = client.menus().update(&Menu::named("Brunch")).await.unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
}

#[tokio::test]
async fn patch_null_clears_field() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let menus = client.menus();
    let mut m = Menu::named("Breakfast");
    m.description = Some("Until 11".into());
    let m = menus.create(&m).await.unwrap();
    let id = m.meta.id.clone().unwrap();

    let cleared = menus.patch(&id, m.meta.revision.unwrap(), json!({"description": null})).await.unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.name, "Breakfast");
    assert_eq!(cleared.meta.revision, Some(Revision(2)));

    assert!(matches!(menus.patch(&id, Revision(2), json!("oops")).await, Err(SdkError::Validation(_))));
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let (client, backend) = Client::in_memory(ClientConfig::default());
    let menus = client.menus();
    let m = menus.create(&Menu::named("Late Night")).await.unwrap();
    let id = m.meta.id.unwrap();
    menus.delete(&id).await.unwrap();
    assert!(backend.is_empty("menus"));
    assert!(matches!(menus.get(&id).await, Err(SdkError::NotFound { .. })));
    assert!(matches!(menus.delete(&id).await, Err(SdkError::NotFound { .. })));
}

#[tokio::test]
async fn list_by_ids_in_id_order() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let menus = client.menus();
    let mut ids = Vec::new();
    for n in ["A", "B", "C"] {
        ids.push(menus.create(&Menu::named(n)).await.unwrap().meta.id.unwrap());
    }
    let wanted = [ids[2].clone(), ids[0].clone(), EntityId::from("missing")];
    let page = menus.list(Some(&wanted), Default::default()).await.unwrap();
    let mut expected = vec![ids[0].clone(), ids[2].clone()];
    expected.sort();
    let got: Vec<EntityId> = page.items.into_iter().filter_map(|m| m.meta.id).collect();
    assert_eq!(got, expected);
    assert_eq!(page.paging_metadata.count, 2);

    let all = menus.list(None, Default::default()).await.unwrap();
    assert_eq!(all.items.len(), 3);
}

#[tokio::test]
async fn rule_fee_kind_can_be_switched() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let rules = client.rules();
    let rule = Rule { name: "Service".into(), value: Some(RuleValue::Fixed("2.00".into())), ..Rule::default() };
    let mut rule = rules.create(&rule).await.unwrap();
    rule.value = Some(RuleValue::Percentage("12".into()));
    let rule = rules.update(&rule).await.unwrap();
    assert_eq!(rule.value, Some(RuleValue::Percentage("12".into())));
    let stored = rules.get(rule.meta.id.as_ref().unwrap()).await.unwrap();
    assert_eq!(stored.value, Some(RuleValue::Percentage("12".into())));
}

#[tokio::test]
async fn operation_scheduling_switches_variant() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let operations = client.operations();
    let asap = AsapOptions { preparation_time: TimeBounds { min_minutes: 10, max_minutes: 25 }, asap_preorder_allowed: true };
    let op = Operation {
        name: "Dine-in".into(),
        order_scheduling: Some(OrderScheduling::AsapOptions(asap)),
        ..Operation::default()
    };
    let mut op = operations.create(&op).await.unwrap();
    let preorder = PreorderOptions { max_days_ahead: 3, min_minutes_ahead: None };
    op.order_scheduling = Some(OrderScheduling::PreorderOptions(preorder.clone()));
    operations.update(&op).await.unwrap();

    let stored = operations.get(op.meta.id.as_ref().unwrap()).await.unwrap();
    assert_eq!(stored.order_scheduling, Some(OrderScheduling::PreorderOptions(preorder)));
    assert_eq!(stored.meta.revision, Some(Revision(2)));
}

#[tokio::test]
async fn rule_conditions_can_be_cleared() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let rules = client.rules();
    let large_orders = Condition {
        field_path: "subtotal".into(),
        operator: ConditionOperator::GreaterThan,
        value: ConditionValue::NumberValue(40_i64.into()),
    };
    let rule = Rule {
        name: "Large orders".into(),
        value: Some(RuleValue::Percentage("5".into())),
        conditions: vec![large_orders],
        ..Rule::default()
    };
    let mut rule = rules.create(&rule).await.unwrap();
    assert_eq!(rule.conditions.len(), 1);

    rule.conditions.clear();
    rules.update(&rule).await.unwrap();
    let stored = rules.get(rule.meta.id.as_ref().unwrap()).await.unwrap();
    assert!(stored.conditions.is_empty());
}
