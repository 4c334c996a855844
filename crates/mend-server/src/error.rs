use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: set {env_var}")]
    MissingEnvVar { env_var: String },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Map a dotted settings path like `provider.api_key` to the environment
/// variable the loader reads, e.g. `MEND_PROVIDER__API_KEY`.
pub fn to_env_var(field: &str) -> String {
    format!("MEND_{}", field.replace('.', "__").to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("provider.api_key"), "MEND_PROVIDER__API_KEY");
        assert_eq!(to_env_var("port"), "MEND_PORT");
    }
}
