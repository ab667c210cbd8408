use menukit::domain::{Item, ItemField, PriceInfo};
use menukit::{Client, ClientConfig, EntityId};
use proptest::prelude::*;

async fn walk(client: &Client, in_stock: bool, limit: usize) -> (Vec<(String, EntityId)>, u64) {
    let query = client
        .items()
        .query()
        .eq(ItemField::InStock, in_stock)
        .ascending([ItemField::Price])
        .limit(limit);
    let mut seen = Vec::new();
    let mut page = query.find().await.unwrap();
    loop {
        assert!(page.len() <= limit);
        seen.extend(page.items().iter().map(|i| {
            (i.price_info.as_ref().map(|p| p.price.clone()).unwrap_or_default(), i.meta.id.clone().unwrap())
        }));
        if !page.has_next() {
            break;
        }
        page = page.next().await.unwrap();
    }
    let counted = client.items().count_matching(&query).await.unwrap();
    (seen, counted)
}

proptest! {
    #[test]
    fn prop_pages_cover_count_in_order(
        stock in proptest::collection::vec((any::<bool>(), 0u8..10), 0..40),
        limit in 1usize..7,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let (client, _backend) = Client::in_memory(ClientConfig::default());
        let items: Vec<Item> = stock
            .iter()
            .enumerate()
            .map(|(i, (in_stock, price))| Item {
                name: format!("Item {i}"),
                // Few distinct prices so ties are common.
                price_info: Some(PriceInfo { price: format!("{price}.00") }),
                order_settings: Some(menukit::domain::OrderSettings { in_stock: *in_stock, ..Default::default() }),
                ..Item::default()
            })
            .collect();
        let expected = stock.iter().filter(|(s, _)| *s).count();

        let (seen, counted) = rt.block_on(async {
            client.items().bulk_create(&items, false).await.unwrap();
            walk(&client, true, limit).await
        });
        prop_assert_eq!(seen.len(), expected);
        prop_assert_eq!(counted, expected as u64);
        // Non-decreasing by (price, id): no gaps or repeats across page boundaries.
        for w in seen.windows(2) {
            prop_assert!(w[0] < w[1]);
        }
    }
}
