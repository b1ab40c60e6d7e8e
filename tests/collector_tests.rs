//! Collector runs against catalog pages on disk with an in-memory fetcher

mod common;

use brand_image_pipeline_lib::application::Collector;
use common::{FakeFetcher, catalog_page, config_for, product_block};

#[tokio::test]
async fn collects_images_into_brand_directory() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(
        root.path().join("brandx_page.html"),
        catalog_page(&[
            product_block("Galaxy S24 Ultra", "https://cdn.example.com/img/s24-ultra.png"),
            product_block("Galaxy A55 5G", "https://cdn.example.com/img/a55"),
        ]),
    )
    .unwrap();

    let config = config_for(root.path());
    let collector = Collector::new(&config, FakeFetcher::default()).unwrap();
    let report = collector.run_catalogs(&["brandx_page.html".to_string()]).await;

    let brand_dir = root.path().join("Brandx");
    assert!(brand_dir.join("galaxy-s24-ultra.png").is_file());
    assert!(brand_dir.join("galaxy-a55-5g.webp").is_file());
    assert_eq!(
        std::fs::read_to_string(brand_dir.join("galaxy-s24-ultra.png")).unwrap(),
        "https://cdn.example.com/img/s24-ultra.png"
    );

    let brandx = report.brand("Brandx").unwrap();
    assert_eq!(brandx.found, 2);
    assert_eq!(brandx.downloaded, 2);
    assert_eq!(brandx.failed, 0);
    assert!(report.skipped_catalogs.is_empty());
}

#[tokio::test]
async fn missing_and_misnamed_catalogs_do_not_stop_later_brands() {
    let root = tempfile::tempdir().unwrap();
    for brand in ["brandx", "brandz"] {
        std::fs::write(
            root.path().join(format!("{brand}_page.html")),
            catalog_page(&[product_block(
                &format!("{brand} One"),
                &format!("https://cdn.example.com/{brand}/one.jpg"),
            )]),
        )
        .unwrap();
    }

    let catalogs: Vec<String> = ["brandx_page.html", "brandy_page.html", "notes.html", "brandz_page.html"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let config = config_for(root.path());
    let collector = Collector::new(&config, FakeFetcher::default()).unwrap();
    let report = collector.run_catalogs(&catalogs).await;

    assert!(root.path().join("Brandx").join("brandx-one.jpg").is_file());
    assert!(root.path().join("Brandz").join("brandz-one.jpg").is_file());

    let skipped: Vec<&str> = report
        .skipped_catalogs
        .iter()
        .map(|s| s.catalog.as_str())
        .collect();
    assert_eq!(skipped, vec!["brandy_page.html", "notes.html"]);
    assert!(report.skipped_catalogs[0].reason.contains("could not be read"));
    assert_eq!(report.total_downloaded(), 2);
}

#[tokio::test]
async fn failed_and_incomplete_entries_are_skipped_individually() {
    let root = tempfile::tempdir().unwrap();
    let page = catalog_page(&[
        product_block("Broken Link", "https://cdn.example.com/gone.png"),
        r#"<div class="select_product_list_blk"><img class="product-image" src="https://cdn.example.com/noname.png"></div>"#.to_string(),
        product_block("Relative Path", "images/relative.png"),
        product_block("Pixel 8 Pro", "https://cdn.example.com/pixel8pro.avif?v=3"),
    ]);
    std::fs::write(root.path().join("google_page.html"), page).unwrap();

    let fetcher = FakeFetcher::failing(&["https://cdn.example.com/gone.png"]);
    let config = config_for(root.path());
    let collector = Collector::new(&config, fetcher).unwrap();
    let report = collector.run_catalogs(&["google_page.html".to_string()]).await;

    let google = report.brand("Google").unwrap();
    assert_eq!(google.found, 4);
    assert_eq!(google.skipped_entries, 1);
    assert_eq!(google.failed, 2);
    assert_eq!(google.downloaded, 1);

    let brand_dir = root.path().join("Google");
    assert!(brand_dir.join("pixel-8-pro.avif").is_file());
    assert!(!brand_dir.join("broken-link.png").exists());
    assert_eq!(std::fs::read_dir(&brand_dir).unwrap().count(), 1);
}

#[tokio::test]
async fn relative_locators_resolve_against_base_url() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(
        root.path().join("nokia_page.html"),
        catalog_page(&[product_block("Nokia G42", "/media/g42.png")]),
    )
    .unwrap();

    let mut config = config_for(root.path());
    config.collector.base_url = Some("https://shop.example.com/phones/".to_string());

    let collector = Collector::new(&config, FakeFetcher::default()).unwrap();
    let report = collector.run_catalogs(&["nokia_page.html".to_string()]).await;

    assert_eq!(report.total_downloaded(), 1);
    assert_eq!(
        std::fs::read_to_string(root.path().join("Nokia").join("nokia-g42.png")).unwrap(),
        "https://shop.example.com/media/g42.png"
    );
}

#[tokio::test]
async fn page_without_product_blocks_is_reported() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(
        root.path().join("honor_page.html"),
        "<html><body><div class=\"product\">Not the expected layout</div></body></html>",
    )
    .unwrap();

    let config = config_for(root.path());
    let fetcher = FakeFetcher::default();
    let collector = Collector::new(&config, fetcher).unwrap();
    let report = collector.run_catalogs(&["honor_page.html".to_string()]).await;

    assert!(report.brands.is_empty());
    assert_eq!(report.skipped_catalogs.len(), 1);
    assert!(report.skipped_catalogs[0].reason.contains("No product blocks"));
    // the brand directory is prepared before the page is read
    assert!(root.path().join("Honor").is_dir());
}

#[tokio::test]
async fn existing_files_are_overwritten() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("Asus")).unwrap();
    std::fs::write(root.path().join("Asus").join("rog-phone-8.png"), "old bytes").unwrap();
    std::fs::write(
        root.path().join("asus_page.html"),
        catalog_page(&[product_block("ROG Phone 8", "https://cdn.example.com/rog8.png")]),
    )
    .unwrap();

    let config = config_for(root.path());
    let collector = Collector::new(&config, FakeFetcher::default()).unwrap();
    collector.run_catalogs(&["asus_page.html".to_string()]).await;

    assert_eq!(
        std::fs::read_to_string(root.path().join("Asus").join("rog-phone-8.png")).unwrap(),
        "https://cdn.example.com/rog8.png"
    );
}
