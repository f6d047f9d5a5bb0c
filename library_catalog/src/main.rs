use anyhow::Context;
use chrono::{Days, Local};
use serde_json::json;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use library_catalog::api::{Author, Book, CopyFilter, ReaderDetails};
use library_catalog::{Library, LibraryConfig};

fn init_telemetry() -> anyhow::Result<()> {
    let app_name = "library_demo";

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install `tracing` subscriber.")
}

fn main() -> anyhow::Result<()> {
    init_telemetry()?;

    let config = LibraryConfig::load().context("Failed to load library configuration")?;
    let mut library = Library::with_config(config);

    let sommerville = library.add_author(Author {
        name: "Sommerville".to_string(),
        birth_year: 1951,
    });
    let title = |year: i32, edition: &str, language: &str| Book {
        name: "Software Engineering".to_string(),
        author: sommerville,
        year,
        edition: Some(edition.to_string()),
        language: Some(language.to_string()),
    };

    let se10_es = library.add_book(title(2025, "10th", "ES"))?;
    let se9_en = library.add_book(title(2023, "9th", "EN"))?;
    let se9_es = library.add_book(title(2022, "9th", "ES"))?;
    let se8_en = library.add_book(title(2020, "8th", "EN"))?;
    for (book_id, copies) in [(se9_en, 3), (se9_es, 4), (se8_en, 4)] {
        for _ in 0..copies {
            library.add_copy(book_id)?;
        }
    }

    let ana = library.add_reader(ReaderDetails {
        name: "Ana".to_string(),
        email: "ana@uni.edu".to_string(),
    });
    let bob = library.add_reader(ReaderDetails {
        name: "Bob".to_string(),
        email: "bob@uni.edu".to_string(),
    });

    let today = Local::now().date_naive();
    let lent_on = today
        .checked_sub_days(Days::new(u64::from(library.config().loan_period_days) + 10))
        .context("Loan start date is out of range")?;
    let lent_copy = library.lend_book(se9_en, ana, lent_on)?.id;

    if let Err(err) = library.lend_book(se10_es, bob, today) {
        tracing::info!("Bob could not borrow the 10th edition: {}", err);
    }
    library.subscribe_bioalert(bob, se9_en)?;

    let overdue_readers = library.validate_copies_on_loan(today);
    let receipt = library.return_book(lent_copy)?;

    let summary = json!({
        "books_by_author": library.count_books_by_author("Sommerville"),
        "books_by_name": library.count_books_by_name("Software Engineering"),
        "copies": library.count_copies_by_name("Software Engineering", &CopyFilter::default()),
        "available_9th": library.count_available_copies_by_name(
            "Software Engineering",
            &CopyFilter {
                edition: Some("9th".to_string()),
                ..CopyFilter::default()
            },
        ),
        "overdue_readers": overdue_readers,
        "return": receipt,
        "ana": library.reader(ana),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
