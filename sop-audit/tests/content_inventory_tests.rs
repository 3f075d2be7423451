//! Content inventory analyzer tests

use sop_audit::export::INVENTORY_HEADERS;
use sop_audit::parsing::parse_csv_line;
use sop_audit::{ContentInventory, InventoryAnalyzer, PageRecord};

fn scenario_pages() -> Vec<PageRecord> {
    vec![
        PageRecord::new("https://a.test/none", "No traffic", 0, 0),
        PageRecord::new("https://a.test/small", "Small", 5, 10),
        PageRecord::new("https://a.test/medium", "Medium", 5, 100),
        PageRecord::new("https://a.test/large", "Large", 5, 1000),
    ]
}

#[test]
fn test_zero_traffic_page_is_worst() {
    let inventory = ContentInventory::from_pages(&scenario_pages());
    let none = inventory
        .items()
        .iter()
        .find(|i| i.url.ends_with("/none"))
        .unwrap();

    assert_eq!(none.traffic_quartile, 1);
    assert_eq!(none.rd_per_visit_quartile, 1);
    assert_eq!(none.rd_quartile, 1);
    assert_eq!(none.referring_domains_per_visit, 0.0);
    assert_eq!(none.composite_score, 2.0);
}

#[test]
fn test_classification_and_ranking() {
    let inventory = ContentInventory::from_pages(&scenario_pages());
    let summary: Vec<(&str, u8, u8, u8, f64)> = inventory
        .items()
        .iter()
        .map(|i| {
            (
                i.page_title.as_str(),
                i.rd_quartile,
                i.traffic_quartile,
                i.rd_per_visit_quartile,
                i.composite_score,
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("Large", 2, 4, 2, 6.0),
            ("Medium", 2, 3, 3, 5.0),
            ("Small", 2, 2, 4, 4.0),
            ("No traffic", 1, 1, 1, 2.0),
        ]
    );
    assert_eq!(inventory.items()[2].referring_domains_per_visit, 0.5);
}

#[test]
fn test_traffic_without_referring_domains_is_efficient() {
    let pages = vec![
        PageRecord::new("https://a.test/free", "Free traffic", 0, 500),
        PageRecord::new("https://a.test/paid", "Linked", 50, 500),
    ];
    let inventory = ContentInventory::from_pages(&pages);
    let free = inventory.items().iter().find(|i| i.url.ends_with("/free")).unwrap();

    assert_eq!(free.rd_per_visit_quartile, 4);
    assert_eq!(free.referring_domains_per_visit, 0.0);
}

#[test]
fn test_ties_broken_by_newest_publish_date() {
    let pages = vec![
        PageRecord::new("https://a.test/old", "Old", 5, 50).with_publish_date("2022-01-01"),
        PageRecord::new("https://a.test/undated", "Undated", 5, 50),
        PageRecord::new("https://a.test/new", "New", 5, 50).with_publish_date("2024-01-01"),
    ];

    let inventory = ContentInventory::from_pages(&pages);
    let order: Vec<&str> = inventory.items().iter().map(|i| i.page_title.as_str()).collect();
    assert_eq!(order, vec!["New", "Old", "Undated"]);
}

#[test]
fn test_weights_change_score() {
    let analyzer = InventoryAnalyzer::new()
        .with_rd_weight(2.0)
        .unwrap()
        .with_traffic_weight(0.5)
        .unwrap();
    let inventory = analyzer.run(&scenario_pages());

    let large = &inventory.items()[0];
    assert_eq!(large.page_title, "Large");
    assert_eq!(large.composite_score, 2.0 * 2.0 + 4.0 * 0.5);
}

#[test]
fn test_by_quartile_matches_either_metric() {
    let inventory = ContentInventory::from_pages(&scenario_pages());

    let q4: Vec<&str> = inventory.by_quartile(4).iter().map(|i| i.page_title.as_str()).collect();
    assert_eq!(q4, vec!["Large"]);

    let q2: Vec<&str> = inventory.by_quartile(2).iter().map(|i| i.page_title.as_str()).collect();
    assert_eq!(q2, vec!["Large", "Medium", "Small"]);

    assert!(inventory.by_quartile(7).is_empty());
}

#[test]
fn test_top_performers() {
    let inventory = ContentInventory::from_pages(&scenario_pages());
    let top: Vec<&str> = inventory.top_performers(2).iter().map(|i| i.page_title.as_str()).collect();
    assert_eq!(top, vec!["Large", "Medium"]);
    assert_eq!(inventory.top_performers(0).len(), 0);
}

#[test]
fn test_rerun_is_identical() {
    let pages = scenario_pages();
    assert_eq!(ContentInventory::from_pages(&pages), ContentInventory::from_pages(&pages));
}

#[test]
fn test_export_shape_and_formatting() {
    let inventory = ContentInventory::from_pages(&scenario_pages());
    let csv = inventory.to_csv();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), inventory.len() + 1);
    assert_eq!(parse_csv_line(lines[0]), INVENTORY_HEADERS);
    for line in &lines[1..] {
        assert_eq!(parse_csv_line(line).len(), INVENTORY_HEADERS.len());
    }

    assert_eq!(
        lines[3],
        "\"https://a.test/small\",\"\",\"Small\",\"4.0\",\"5\",\"2\",\"0.5000\",\"4\",\"10\",\"2\""
    );
}
