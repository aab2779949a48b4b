mod logging;
mod report;
mod settings;

use tracing::info;
use tsa_core::common::Stock;
use tsa_core::market::port::PriceSource;
use tsa_feed::json::JsonFileSource;
use tsa_stationarity::DefaultAnalyzer;

/// # Summary
/// 命令行入口：读取缓存行情，输出平稳性分析报告。
///
/// # Logic
/// 1. 加载配置，命令行第一个参数可覆盖标的代码。
/// 2. 初始化全局日志。
/// 3. 实例化数据源与分析器。
/// 4. 生成报告并以 JSON 打印到 stdout。
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 加载配置
    let mut config = settings::load_config()?;
    if let Some(symbol) = std::env::args().nth(1) {
        config.data.symbol = symbol;
    }

    // 2. 初始化日志
    let _guard = logging::init_tracing(config.report.log_dir.as_deref());
    info!("Stationarity analysis starting for {}", config.data.symbol);

    // 3. 实例化数据源与分析器
    let source = JsonFileSource::new(&config.data.data_dir);
    let analyzer = DefaultAnalyzer::new(config.analysis.clone())?;

    let candles = source.load(&Stock::new(config.data.symbol.as_str()))?;
    let report = report::build_report(&config, &candles, &analyzer)?;

    // 4. 输出报告
    println!("{}", serde_json::to_string_pretty(&report)?);
    info!("Analysis finished for {}", config.data.symbol);
    Ok(())
}
