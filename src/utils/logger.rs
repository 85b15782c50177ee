use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins over the built-in default directive.
fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_cli_logger(verbose: bool) {
    let filter = filter_or(if verbose {
        "tastematch=debug,info"
    } else {
        "tastematch=warn"
    });

    // 日誌寫到 stderr，stdout 留給 JSON 輸出與對話內容
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry().with(filter).with(layer).init();
}

/// JSON events without timestamps for CloudWatch.
pub fn init_lambda_logger() {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .without_time()
        .json();

    tracing_subscriber::registry()
        .with(filter_or("tastematch=info"))
        .with(layer)
        .init();
}
