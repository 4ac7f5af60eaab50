use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Without `RUST_LOG`, this crate logs at `info` (or `debug` when `verbose`)
/// and everything else at `warn`.
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "warn,ckpt_keeper=debug"
    } else {
        "warn,ckpt_keeper=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
