use menukit::domain::{Item, ItemField, Menu, MenuField, PriceInfo};
use menukit::query::{CursorPaging, Filter, QueryDescriptor, SortSpec, parse_filter_json};
use menukit::{Backend, Client, ClientConfig, CursorToken, EntityId, Order, SdkError};
use std::collections::HashSet;

async fn seed_menus(client: &Client, n: usize) {
    let menus: Vec<Menu> = (0..n)
        .map(|i| {
            let mut m = Menu::named(format!("Menu {i}"));
            m.visible = Some(i % 2 == 0);
            m
        })
        .collect();
    let res = client.menus().bulk_create(&menus, false).await.unwrap();
    assert_eq!(res.bulk_action_metadata.total_successes, n);
}

fn ids(items: &[Menu]) -> Vec<EntityId> {
    items.iter().filter_map(|m| m.meta.id.clone()).collect()
}

#[tokio::test]
async fn next_then_prev_returns_first_page() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    seed_menus(&client, 7).await;

    let first = client.menus().query().ascending([MenuField::Name]).limit(3).find().await.unwrap();
    assert_eq!(first.len(), 3);
    assert!(first.has_next());
    assert!(!first.has_prev());
    assert_eq!(first.items()[0].name, "Menu 0");

    let second = first.next().await.unwrap();
    assert_eq!(second.items()[0].name, "Menu 3");
    let back = second.prev().await.unwrap();
    assert_eq!(ids(back.items()), ids(first.items()));

    let third = second.next().await.unwrap();
    assert_eq!(third.len(), 1);
    assert!(!third.has_next());
    assert!(matches!(third.next().await, Err(SdkError::Validation(_))));
}

#[tokio::test]
async fn cursor_ignores_filter_and_sort() {
    let (client, backend) = Client::in_memory(ClientConfig::default());
    seed_menus(&client, 6).await;

    let first = backend
        .query(
            "menus",
            &QueryDescriptor {
                filter: Filter::True,
                sort: vec![SortSpec::asc("name")],
                cursor_paging: CursorPaging { limit: Some(2), cursor: None },
            },
        )
        .await
        .unwrap();
    let cursor = first.paging_metadata.cursors.next.clone().unwrap();

    let plain = QueryDescriptor {
        cursor_paging: CursorPaging { limit: None, cursor: Some(cursor.clone()) },
        ..QueryDescriptor::default()
    };
    let noisy = QueryDescriptor {
        filter: parse_filter_json(r#"{"visible": false, "name": {"$startsWith": "Nope"}}"#).unwrap(),
        sort: vec![SortSpec::desc("name")],
        cursor_paging: CursorPaging { limit: None, cursor: Some(cursor.clone()) },
    };
    let a = backend.query("menus", &plain).await.unwrap();
    let b = backend.query("menus", &noisy).await.unwrap();
    assert_eq!(a.items, b.items);
    assert_eq!(a.paging_metadata.count, 2);
    assert_eq!(a.paging_metadata.has_next, b.paging_metadata.has_next);

    // Same through the builder: skip_to drops accumulated predicates.
    let typed = client.menus().query().eq(MenuField::Visible, false).skip_to(cursor).find().await.unwrap();
    let typed_ids: Vec<_> = typed.items().iter().map(|m| serde_json::to_value(m).unwrap()["_id"].clone()).collect();
    let raw_ids: Vec<_> = a.items.iter().map(|d| d["_id"].clone()).collect();
    assert_eq!(typed_ids, raw_ids);
}

#[tokio::test]
async fn count_matches_exhaustive_paging() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    seed_menus(&client, 11).await;
    let menus = client.menus();

    let query = menus.query().eq(MenuField::Visible, true).descending([MenuField::Name]).limit(2);
    let mut total = 0;
    let mut page = query.find().await.unwrap();
    loop {
        total += page.len();
        if !page.has_next() {
            break;
        }
        page = page.next().await.unwrap();
    }
    assert_eq!(menus.count_matching(&query).await.unwrap(), total as u64);
    assert_eq!(total, 6);

    let filter = query.filter().unwrap();
    assert_eq!(menus.count(Some(&filter)).await.unwrap(), 6);
    assert_eq!(menus.count(None).await.unwrap(), 11);
}

#[tokio::test]
async fn ties_page_deterministically() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let same: Vec<Menu> = (0..5).map(|_| Menu::named("Same")).collect();
    client.menus().bulk_create(&same, false).await.unwrap();

    let mut seen = Vec::new();
    let mut page = client.menus().query().ascending([MenuField::Name]).limit(1).find().await.unwrap();
    loop {
        seen.extend(ids(page.items()));
        if !page.has_next() {
            break;
        }
        page = page.next().await.unwrap();
    }
    assert_eq!(seen.len(), 5);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 5);
    let mut sorted = seen.clone();
    sorted.sort();
    assert_eq!(seen, sorted);
}

#[tokio::test]
async fn empty_result_has_no_cursors() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    seed_menus(&client, 3).await;
    let page = client.menus().query().starts_with(MenuField::Name, "Brunch").find().await.unwrap();
    assert!(page.is_empty());
    assert!(!page.has_next());
    assert!(!page.has_prev());
    assert_eq!(page.paging_metadata().count, 0);
}

#[tokio::test]
async fn default_page_size_comes_from_config() {
    let cfg = ClientConfig::from_toml_str("[default_limits]\nmenus = 2\n").unwrap();
    let (client, _backend) = Client::in_memory(cfg);
    seed_menus(&client, 3).await;
    let page = client.menus().query().find().await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.page_size(), 2);
    assert_eq!(client.items().query().page_size(), 100);
    assert_eq!(client.operations().query().page_size(), 50);
}

#[tokio::test]
async fn bad_cursors_require_restart() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    seed_menus(&client, 4).await;

    let forged = CursorToken::from_wire("eyJzIjoie30iLCJjIjoiMDAifQ".into());
    let err = client.menus().query().skip_to(forged).find().await.unwrap_err();
    assert!(err.requires_restart());

    // A menus cursor cannot resume an items query.
    let page = client.menus().query().limit(1).find().await.unwrap();
    let cursor = page.cursors().next.clone().unwrap();
    let err = client.items().query().skip_to(cursor).find().await.unwrap_err();
    assert!(matches!(err, SdkError::InvalidCursor(_)));
}

#[tokio::test]
async fn unknown_fields_and_operators_fail_fast() {
    let (client, backend) = Client::in_memory(ClientConfig::default());
    seed_menus(&client, 2).await;
    let menus = client.menus();

    let unknown = menus.query().filter_json(&serde_json::json!({"color": "red"}));
    assert!(matches!(unknown.find().await, Err(SdkError::Validation(_))));
    assert!(matches!(menus.count_matching(&unknown).await, Err(SdkError::Validation(_))));

    let bad_sort = menus.query().sort_by("color", Order::Asc);
    assert!(matches!(bad_sort.find().await, Err(SdkError::Validation(_))));

    // visible is not a text field; sectionIds has no ordering.
    let wrong_cap = menus.query().starts_with(MenuField::Visible, "t");
    assert!(matches!(wrong_cap.find().await, Err(SdkError::Validation(_))));
    let no_range = menus.query().gt(MenuField::SectionIds, 3);
    assert!(matches!(no_range.find().await, Err(SdkError::Validation(_))));

    let bad_limit = menus.query().limit(0);
    assert!(matches!(bad_limit.find().await, Err(SdkError::Validation(_))));

    // The backend checks the same field sets for untyped callers.
    let raw = QueryDescriptor { filter: parse_filter_json(r#"{"color": "red"}"#).unwrap(), ..Default::default() };
    assert!(matches!(backend.query("menus", &raw).await, Err(SdkError::Validation(_))));
}

#[tokio::test]
async fn nested_price_sort_and_stock_filter() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    let items: Vec<Item> = [("Soup", "4.00", true), ("Steak", "9.50", true), ("Salad", "6.25", false)]
        .into_iter()
        .map(|(name, price, in_stock)| Item {
            name: name.into(),
            price_info: Some(PriceInfo { price: price.into() }),
            order_settings: Some(menukit::domain::OrderSettings { in_stock, ..Default::default() }),
            ..Item::default()
        })
        .collect();
    client.items().bulk_create(&items, false).await.unwrap();

    let page = client
        .items()
        .query()
        .eq(ItemField::InStock, true)
        .descending([ItemField::Price])
        .find()
        .await
        .unwrap();
    let names: Vec<&str> = page.items().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Steak", "Soup"]);

    let found = client.items().query().contains(ItemField::Name, "ALA").find().await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn resumed_page_reports_cursor_page_size() {
    let (client, _backend) = Client::in_memory(ClientConfig::default());
    seed_menus(&client, 7).await;

    let first = client.menus().query().limit(3).find().await.unwrap();
    assert_eq!(first.page_size(), 3);
    let cursor = first.cursors().next.clone().unwrap();

    let resumed = client.menus().query().skip_to(cursor.clone()).find().await.unwrap();
    assert_eq!(resumed.len(), 3);
    assert_eq!(resumed.page_size(), 3);
    assert_eq!(resumed.paging_metadata().page_size, Some(3));

    let wider = client.menus().query().limit(4).skip_to(cursor.clone()).find().await.unwrap();
    assert_eq!(wider.len(), 4);
    assert_eq!(wider.page_size(), 4);

    // Range on a field without range support would fail a fresh query, not a resumed one.
    let resumed = client.menus().query().skip_to(cursor).gt(MenuField::Name, "Menu 3").find().await.unwrap();
    assert_eq!(resumed.len(), 3);
    let tail = resumed.next().await.unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail.page_size(), 3);
}
