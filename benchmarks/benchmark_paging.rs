// Run with: cargo run --release --bin benchmark_paging
// Results saved to benchmarks/results/benchmark_paging_{datetime}.csv

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use menukit::domain::{Item, ItemField, PriceInfo};
use menukit::{Client, ClientConfig};

#[tokio::main]
async fn main() {
	let n = 5000usize;
	let (client, backend) = Client::in_memory(ClientConfig::default());
	let items: Vec<Item> = (0..n)
		.map(|i| Item {
			name: format!("Item {i}"),
			price_info: Some(PriceInfo { price: format!("{}.{:02}", i % 40, i % 100) }),
			..Item::default()
		})
		.collect();

	let start_insert = Instant::now();
	for chunk in items.chunks(500) {
		let res = client.items().bulk_create(chunk, false).await.unwrap();
		assert_eq!(res.bulk_action_metadata.total_failures, 0);
	}
	let insert_ns = start_insert.elapsed().as_nanos();
	assert_eq!(backend.len("items"), n);

	let mut rows = Vec::new();
	for limit in [10usize, 100, 500] {
		let start = Instant::now();
		let mut pages = 1usize;
		let mut seen = 0usize;
		let mut page = client.items().query().descending([ItemField::Price]).limit(limit).find().await.unwrap();
		loop {
			seen += page.len();
			if !page.has_next() {
				break;
			}
			page = page.next().await.unwrap();
			pages += 1;
		}
		assert_eq!(seen, n);
		rows.push((limit, pages, start.elapsed().as_nanos()));
	}

	let mut root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	root.push("benchmarks/results");
	create_dir_all(&root).unwrap();
	let datetime = chrono::Utc::now().format("%Y%m%d_%H%M%S");
	let mut f = File::create(root.join(format!("benchmark_paging_{datetime}.csv"))).unwrap();
	writeln!(f, "op,limit,pages,ns").unwrap();
	writeln!(f, "bulk_create,500,{},{insert_ns}", n / 500).unwrap();
	for (limit, pages, ns) in rows {
		writeln!(f, "walk,{limit},{pages},{ns}").unwrap();
		println!("limit={limit} pages={pages} total_ms={}", ns / 1_000_000);
	}
}
