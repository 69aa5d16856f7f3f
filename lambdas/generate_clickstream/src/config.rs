use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Config {
    pub s3_bucket_name: Option<String>,
    /// Name of the SSM parameter holding the bucket, used when `s3_bucket_name` is unset.
    pub ssm_parameter: String,
    pub events_per_execution: i64,
}

// Bucket and parameter names are used verbatim; figment's Env provider would
// otherwise parse values such as `12345` or `true` into numbers and booleans.
#[derive(Debug, Serialize)]
struct VerbatimEnv {
    #[serde(skip_serializing_if = "Option::is_none")]
    s3_bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssm_parameter: Option<String>,
}

impl VerbatimEnv {
    fn read() -> Self {
        Self {
            s3_bucket_name: std::env::var("S3_BUCKET_NAME").ok(),
            ssm_parameter: std::env::var("SSM_PARAMETER").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            s3_bucket_name: None,
            ssm_parameter: "clickstream_bucket".to_string(),
            events_per_execution: 20,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&["EVENTS_PER_EXECUTION"]))
            .merge(Serialized::defaults(VerbatimEnv::read()))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn when_nothing_is_set_should_use_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load()?;

            assert_eq!(config.s3_bucket_name, None);
            assert_eq!(config.ssm_parameter, "clickstream_bucket");
            assert_eq!(config.events_per_execution, 20);

            Ok(())
        });
    }

    #[test]
    fn when_environment_is_set_should_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("S3_BUCKET_NAME", "clickstream-test-bucket");
            jail.set_env("SSM_PARAMETER", "/clickstream/bucket");
            jail.set_env("EVENTS_PER_EXECUTION", "5");

            let config = Config::load()?;

            assert_eq!(
                config.s3_bucket_name.as_deref(),
                Some("clickstream-test-bucket")
            );
            assert_eq!(config.ssm_parameter, "/clickstream/bucket");
            assert_eq!(config.events_per_execution, 5);

            Ok(())
        });
    }

    #[test]
    fn when_names_look_like_numbers_or_booleans_should_keep_them_as_strings() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("S3_BUCKET_NAME", "12345");
            jail.set_env("SSM_PARAMETER", "true");

            let config = Config::load()?;

            assert_eq!(config.s3_bucket_name.as_deref(), Some("12345"));
            assert_eq!(config.ssm_parameter, "true");

            Ok(())
        });
    }

    #[test]
    fn when_bucket_has_leading_zeros_should_keep_them() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("S3_BUCKET_NAME", "0020240601");

            let config = Config::load()?;

            assert_eq!(config.s3_bucket_name.as_deref(), Some("0020240601"));

            Ok(())
        });
    }

    #[test]
    fn when_event_count_is_negative_should_load_it() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("EVENTS_PER_EXECUTION", "-1");

            let config = Config::load()?;

            assert_eq!(config.events_per_execution, -1);

            Ok(())
        });
    }

    #[test]
    fn when_event_count_is_not_a_number_should_fail() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("EVENTS_PER_EXECUTION", "lots");

            assert!(Config::load().is_err());

            Ok(())
        });
    }
}
