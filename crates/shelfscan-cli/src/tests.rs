use super::*;

#[test]
fn parses_minimal_search() {
    let cli = Cli::try_parse_from(["shelfscan", "search", "wireless mouse"])
        .expect("expected valid cli args");

    let Commands::Search(args) = cli.command else {
        panic!("expected search command");
    };
    assert_eq!(args.query, "wireless mouse");
    assert!(args.max_price.is_none());
    assert!(args.max_results.is_none());
    assert!(!args.cheapest);
    assert!(!args.no_cache);
    assert!(!args.json);
}

#[test]
fn parses_all_search_flags() {
    let cli = Cli::try_parse_from([
        "shelfscan",
        "search",
        "usb hub",
        "--max-price",
        "1500.50",
        "--max-results",
        "3",
        "--page-limit",
        "2",
        "--category",
        "computer-accessories",
        "--cheapest",
        "--no-cache",
        "--timeout-secs",
        "30",
        "--json",
    ])
    .expect("expected valid cli args");

    let Commands::Search(args) = cli.command else {
        panic!("expected search command");
    };
    assert_eq!(args.max_price, Some(Decimal::new(150_050, 2)));
    assert_eq!(args.max_results, Some(3));
    assert_eq!(args.page_limit, Some(2));
    assert_eq!(args.category.as_deref(), Some("computer-accessories"));
    assert!(args.cheapest && args.no_cache && args.json);
    assert_eq!(args.timeout_secs, Some(30));
}

#[test]
fn rejects_non_numeric_price() {
    assert!(Cli::try_parse_from(["shelfscan", "search", "mouse", "--max-price", "cheap"]).is_err());
}

#[test]
fn parses_cache_purge() {
    let cli = Cli::try_parse_from(["shelfscan", "cache", "purge"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Cache {
            command: CacheCommands::Purge
        }
    ));
}

#[test]
fn command_is_required() {
    assert!(Cli::try_parse_from(["shelfscan"]).is_err());
}
