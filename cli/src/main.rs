mod commands;
mod render;

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use rd_core::domain::error::ErrorCode;
use rd_core::infra::completion::HttpProviderRegistry;
use rd_core::infra::storage::SettingsStore;
use rd_core::usecase::app_service::{AppService, EventOutcome};

use crate::commands::{Action, SETTINGS_HELP};

/// 設定ファイルの場所を差し替える環境変数
const SETTINGS_ENV: &str = "REDACTUM_SETTINGS";

fn open_settings() -> SettingsStore {
    match std::env::var(SETTINGS_ENV) {
        Ok(path) if !path.trim().is_empty() => SettingsStore::open(path),
        _ => SettingsStore::open_default(),
    }
}

fn show(service: &AppService) {
    print!("\n{}> ", render::render(&service.state(), &service.settings()));
    let _ = std::io::stdout().flush();
}

/// Ctrl-C で終了したら false
async fn run_refinement(service: &AppService) -> bool {
    print!("\n{}", render::render(&service.state(), &service.settings()));
    let _ = std::io::stdout().flush();

    tokio::select! {
        result = service.refine_current() => {
            if let Err(e) = result {
                log::error!("リライト結果の反映に失敗: {e}");
            }
            true
        }
        _ = tokio::signal::ctrl_c() => false,
    }
}

fn apply(service: &AppService, action: Action) {
    match action {
        Action::Help => println!("{SETTINGS_HELP}"),
        Action::Edit(edit) => {
            if let Err(e) = service.apply_settings_edit(edit) {
                println!("{}", e.message);
            }
        }
        Action::Events(events) => {
            for event in events {
                if let EventOutcome::Ignored(e) = service.handle(event) {
                    if e.code == ErrorCode::EmptyInput {
                        println!("{}", e.message);
                    }
                    break;
                }
                if service.is_generating() {
                    break;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Arc::new(open_settings());
    log::info!("設定ファイル: {}", settings.path().display());

    let service = AppService::new(settings, Arc::new(HttpProviderRegistry::new()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        show(&service);

        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => break,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("標準入力の読み込みに失敗: {e}");
                break;
            }
        };

        match commands::parse_line(&service.state(), &line) {
            Ok(action) => apply(&service, action),
            Err(e) => println!("{e}"),
        }

        if service.is_generating() && !run_refinement(&service).await {
            break;
        }
    }

    println!();
}
