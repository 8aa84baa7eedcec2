pub mod extractor;
pub mod store;

/// `RUST_LOG` overrides the default `warn` filter. Logs go to stderr so
/// command output on stdout stays clean.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}
