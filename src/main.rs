use std::error::Error;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use sankey_tree::cli::commands::execute_command;
use sankey_tree::cli::output;
use sankey_tree::cli::Cli;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    if let Err(e) = execute_command(&cli) {
        output::error(&e);
        let mut cause = e.source();
        while let Some(inner) = cause {
            eprintln!("  caused by: {inner}");
            cause = inner.source();
        }
        std::process::exit(e.exit_code());
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    // Only our own spans and events; dependencies stay quiet
    let module_filter = filter_fn(|metadata| metadata.target().starts_with("sankey_tree"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sankey_tree::util::testing;

    #[ctor::ctor]
    fn init() {
        testing::init_test_setup();
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn given_action_flags_when_parsing_then_keeps_order() {
        let cli = Cli::try_parse_from([
            "sankey-tree",
            "view",
            "data.json",
            "-a",
            "expand:Traces",
            "--action",
            "collapse:Traces",
        ])
        .expect("valid arguments");
        match cli.command {
            Some(sankey_tree::cli::Commands::View { actions, .. }) => {
                let rendered: Vec<String> = actions.iter().map(ToString::to_string).collect();
                assert_eq!(rendered, ["expand:Traces", "collapse:Traces"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_malformed_action_when_parsing_then_rejects() {
        let result = Cli::try_parse_from(["sankey-tree", "view", "-a", "explode:Traces"]);
        assert!(result.is_err());
    }
}
