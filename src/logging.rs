use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

static INIT: OnceCell<()> = OnceCell::new();

/// Initializes the global tracing subscriber once. `RUST_LOG` wins over the
/// configured level; repeated calls are no-ops so embedding applications
/// that install their own subscriber are left alone.
pub fn init_tracing(config: &AppConfig) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
        if config.log_json {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .try_init();
        } else {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = AppConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
