use tsa_core::config::AppConfig;

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 读取可选的 `config/default.{toml,yaml,json}`。
/// 2. 叠加 `TSA__` 前缀的环境变量，例如 `TSA__DATA__SYMBOL=AAPL`。
/// 3. 未出现的字段取 `AppConfig` 的默认值。
pub fn load_config() -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(
            config::Environment::with_prefix("TSA")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
