use tracing_subscriber::EnvFilter;

/// 診断ログを初期化（stderr）
///
/// `RUST_LOG` があればそれを優先する。無ければ `--verbose` で debug、通常は warn。
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // テストなどで既に初期化済みなら何もしない
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
