use menukit::bulk::codes;
use menukit::domain::Menu;
use menukit::{Client, ClientConfig, EntityId, Revision};

fn codes_of<T>(res: &menukit::BulkResponse<T>) -> Vec<Option<&str>> {
    res.results.iter().map(|r| r.item_metadata.error.as_ref().map(|e| e.code.as_str())).collect()
}

#[tokio::test]
async fn create_reports_local_failures_in_place() {
    let (client, backend) = Client::in_memory(ClientConfig::default());
    let input = vec![Menu::named("Dinner"), Menu::named(""), Menu::named("Lunch"), Menu::named(" ")];
    let res = client.menus().bulk_create(&input, true).await.unwrap();

    assert_eq!(res.len(), input.len());
    for (i, r) in res.results.iter().enumerate() {
        assert_eq!(r.item_metadata.original_index, i);
    }
    assert_eq!(codes_of(&res), vec![None, Some(codes::VALIDATION_ERROR), None, Some(codes::VALIDATION_ERROR)]);
    assert_eq!(res.results[2].item.as_ref().map(|m| m.name.as_str()), Some("Lunch"));
    assert_eq!(res.bulk_action_metadata.total_successes, 2);
    assert_eq!(res.bulk_action_metadata.total_failures, 2);
    assert_eq!(backend.len("menus"), 2);
}

#[tokio::test]
async fn update_mixes_conflicts_and_missing_ids() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let menus = client.menus();
    let created = menus
        .bulk_create(&[Menu::named("A"), Menu::named("B")], true)
        .await
        .unwrap()
        .results
        .into_iter()
        .filter_map(|r| r.item)
        .collect::<Vec<_>>();
    let (mut a, mut b) = (created[0].clone(), created[1].clone());
    a.name = "A2".into();
    b.name = "B2".into();
    b.meta.revision = Some(Revision(7));
    let orphan = Menu::named("no id");

    let res = menus.bulk_update(&[a, orphan, b.clone()], false).await.unwrap();
    assert_eq!(codes_of(&res), vec![None, Some(codes::VALIDATION_ERROR), Some(codes::REVISION_MISMATCH)]);
    assert_eq!(res.results[2].item_metadata.original_index, 2);
    assert_eq!(res.results[2].item_metadata.id, b.meta.id);
    let data = res.results[2].item_metadata.error.as_ref().and_then(|e| e.data.clone()).unwrap();
    assert_eq!(data["currentRevision"], "1");
    assert!(res.results[0].item.is_none());

    let stored = menus.get(b.meta.id.as_ref().unwrap()).await.unwrap();
    assert_eq!(stored.name, "B");
}

#[tokio::test]
async fn delete_reports_missing_ids() {
    let (client, backend) = Client::in_memory(ClientConfig::default());
    let menus = client.menus();
    let m = menus.create(&Menu::named("Tasting")).await.unwrap();
    let ids = [EntityId::from("nope"), m.meta.id.unwrap()];
    let res = menus.bulk_delete(&ids).await.unwrap();
    assert_eq!(codes_of(&res), vec![Some(codes::NOT_FOUND), None]);
    assert!(backend.is_empty("menus"));
}

#[tokio::test]
async fn error_details_are_capped() {
    let cfg = ClientConfig { bulk_error_detail_limit: 1, ..ClientConfig::default() };
    let (client, _backend) = Client::in_memory(cfg);
    let input = vec![Menu::named(""), Menu::named("ok"), Menu::named(""), Menu::named("")];
    let res = client.menus().bulk_create(&input, false).await.unwrap();
    assert_eq!(res.bulk_action_metadata.total_failures, 3);
    assert_eq!(res.bulk_action_metadata.undetailed_failures, 2);
    assert!(res.results[0].item_metadata.error.is_some());
    assert!(res.results[3].item_metadata.error.is_none());
    assert!(!res.results[3].item_metadata.success);
}
