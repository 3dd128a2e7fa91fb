use anyhow::Result;
use clap::Parser;

use sigmaforge_cli::cli::Cli;
use sigmaforge_cli::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 로그는 stderr로 보낸다 -- stdout은 변환 리포트 전용
    let log_level = cli.log_level.clone().unwrap_or_else(|| "info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(config = %cli.config.display(), "sigmaforge-cli starting");

    if let Err(e) = commands::execute(cli).await {
        // 원본 동작: 에러 객체를 stderr에 JSON으로 남기고 비정상 종료
        eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        std::process::exit(e.exit_code());
    }

    Ok(())
}
