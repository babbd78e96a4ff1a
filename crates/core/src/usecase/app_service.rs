use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::error::AppError;
use crate::domain::interaction::{InteractionMachine, InteractionState, StateTransition};
use crate::domain::provider::ProviderKind;
use crate::domain::settings::{HumanizeLevel, Settings};
use crate::domain::types::THEMES;
use crate::infra::completion::ProviderRegistry;
use crate::infra::storage::SettingsStore;
use crate::usecase::refine::Refiner;

/// UI から届く操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Submit(String),
    MoveSelection(isize),
    Select(usize),
    Confirm,
    Cancel,
    NewText,
    Acknowledge,
    CloseSettings,
}

/// settings 状態で受け付ける設定変更
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEdit {
    ActiveProvider(String),
    ApiKey { provider: String, api_key: String },
    Model { provider: String, model: String },
    BaseUrl { provider: String, base_url: String },
    Humanize(HumanizeLevel),
    Debug(bool),
}

/// イベント処理の結果
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Transitioned(StateTransition),
    SelectionChanged(usize),
    /// 現在の状態では受け付けない操作（状態は変わらない）
    Ignored(AppError),
}

/// 対話ドライバー: ステートマシンに副作用（リライト・設定保存）を結び付ける
pub struct AppService {
    machine: Mutex<InteractionMachine>,
    settings: Arc<SettingsStore>,
    refiner: Refiner,
    /// 補完リクエストの実行中フラグ（machine のロック下で取得する）
    refining: AtomicBool,
}

/// 実行中フラグの解放（キャンセルで future が破棄された場合も含む）
struct RefineSlot<'a>(&'a AtomicBool);

impl Drop for RefineSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AppService {
    /// 設定済みプロバイダーが無ければ settings 状態から始める
    pub fn new(settings: Arc<SettingsStore>, registry: Arc<dyn ProviderRegistry>) -> Self {
        let machine = InteractionMachine::for_startup(settings.has_any_provider_configured());
        log::info!("対話開始: state={}", machine.state().as_str());
        Self {
            machine: Mutex::new(machine),
            refiner: Refiner::new(settings.clone(), registry),
            settings,
            refining: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.machine.lock().state().clone()
    }

    pub fn is_generating(&self) -> bool {
        self.machine.lock().is_generating()
    }

    pub fn settings(&self) -> Settings {
        self.settings.current()
    }

    // ==================== Events ====================

    /// 同期的な遷移だけを行う。generating に入った場合は refine_current を呼ぶこと。
    pub fn handle(&self, event: UserEvent) -> EventOutcome {
        let mut machine = self.machine.lock();

        if machine.is_generating() {
            log::debug!("generating 中のイベントを無視: {event:?}");
            return EventOutcome::Ignored(AppError::invalid_state(
                "generating 状態では操作できません",
            ));
        }

        let prev_state = machine.state().as_str().to_string();
        let result = match event {
            UserEvent::Submit(text) => machine.submit(&text).map(|transition| {
                if matches!(transition.new_state, InteractionState::ThemeSelect { .. }) {
                    let current = self.settings.current().theme;
                    if let Some(index) = THEMES.iter().position(|t| *t == current) {
                        let _ = machine.set_selection(index);
                    }
                    return Self::snapshot(&machine, transition.prev_state);
                }
                EventOutcome::Transitioned(transition)
            }),
            UserEvent::MoveSelection(delta) => machine
                .move_selection(delta)
                .map(|()| Self::selection(&machine)),
            UserEvent::Select(index) => machine
                .select(index)
                .map(|()| Self::selection(&machine)),
            UserEvent::Confirm => self.confirm(&mut machine),
            UserEvent::Cancel => machine.cancel().map(|transition| {
                if transition.prev_state == "settings" {
                    self.settings.load();
                }
                EventOutcome::Transitioned(transition)
            }),
            UserEvent::NewText => machine.new_text().map(EventOutcome::Transitioned),
            UserEvent::Acknowledge => machine.acknowledge().map(EventOutcome::Transitioned),
            UserEvent::CloseSettings => machine.close_settings().map(|transition| {
                self.settings.load();
                EventOutcome::Transitioned(transition)
            }),
        };

        match result {
            Ok(outcome) => {
                if let EventOutcome::Transitioned(t) = &outcome {
                    log::debug!("状態遷移: {} -> {}", t.prev_state, t.new_state.as_str());
                }
                outcome
            }
            Err(e) => {
                log::debug!("イベントを無視: state={prev_state}: {e}");
                EventOutcome::Ignored(e)
            }
        }
    }

    fn confirm(&self, machine: &mut InteractionMachine) -> Result<EventOutcome, AppError> {
        let index = machine
            .selected_index()
            .ok_or_else(|| AppError::invalid_state(format!(
                "confirm は {} 状態では実行できません",
                machine.state().as_str()
            )))?;

        if matches!(machine.state(), InteractionState::ThemeSelect { .. }) {
            let (transition, theme) = machine.confirm_theme(index)?;
            self.settings.update(|s| s.theme = theme.to_string());
            log::info!("テーマを保存: {theme}");
            return Ok(EventOutcome::Transitioned(transition));
        }

        machine.confirm_tone(index).map(EventOutcome::Transitioned)
    }

    fn selection(machine: &InteractionMachine) -> EventOutcome {
        EventOutcome::SelectionChanged(machine.selected_index().unwrap_or_default())
    }

    fn snapshot(machine: &InteractionMachine, prev_state: String) -> EventOutcome {
        EventOutcome::Transitioned(StateTransition {
            prev_state,
            new_state: machine.state().clone(),
        })
    }

    /// generating 中のリライトを実行し、output / error へ遷移する。
    /// 同時に実行できるのは1件だけ。補完の待機中はロックを保持しない。
    pub async fn refine_current(&self) -> Result<StateTransition, AppError> {
        let (slot, text, tone) = {
            let machine = self.machine.lock();
            let InteractionState::Generating { text, tone } = machine.state() else {
                return Err(AppError::invalid_state(format!(
                    "refine_current は {} 状態では実行できません",
                    machine.state().as_str()
                )));
            };
            if self.refining.swap(true, Ordering::AcqRel) {
                return Err(AppError::invalid_state("リライトは既に実行中です"));
            }
            (RefineSlot(&self.refining), text.clone(), tone.clone())
        };

        let outcome = self.refiner.refine(&text, &tone.id).await;
        if let Err(e) = &outcome {
            log::warn!("リライト失敗 ({}): {e}", e.code().as_str());
        }

        let transition = self.machine.lock().on_refine_done(outcome);
        drop(slot);
        transition
    }

    /// handle の後、このイベントで generating に入った場合だけリライトまで進める
    pub async fn dispatch(&self, event: UserEvent) -> EventOutcome {
        let outcome = self.handle(event);
        let entered_generating = matches!(
            &outcome,
            EventOutcome::Transitioned(t) if matches!(t.new_state, InteractionState::Generating { .. })
        );
        if !entered_generating {
            return outcome;
        }

        match self.refine_current().await {
            Ok(transition) => EventOutcome::Transitioned(transition),
            Err(e) => EventOutcome::Ignored(e),
        }
    }

    // ==================== Settings ====================

    /// settings 状態でのみ設定を変更して保存する
    pub fn apply_settings_edit(&self, edit: SettingsEdit) -> Result<Settings, AppError> {
        let machine = self.machine.lock();
        if !matches!(machine.state(), InteractionState::Settings) {
            return Err(AppError::invalid_state(format!(
                "設定変更は {} 状態では実行できません",
                machine.state().as_str()
            )));
        }

        let settings = match edit {
            SettingsEdit::ActiveProvider(provider) => {
                let id = canonical_id(&provider)?;
                self.settings.update(|s| s.set_active_provider(id))
            }
            SettingsEdit::ApiKey { provider, api_key } => {
                let id = canonical_id(&provider)?;
                self.settings.update(|s| s.set_api_key(id, api_key.trim()))
            }
            SettingsEdit::Model { provider, model } => {
                let id = canonical_id(&provider)?;
                self.settings.update(|s| s.set_model(id, &model))
            }
            SettingsEdit::BaseUrl { provider, base_url } => {
                let id = canonical_id(&provider)?;
                self.settings.update(|s| s.set_base_url(id, &base_url))
            }
            SettingsEdit::Humanize(level) => self.settings.update(|s| s.humanize_level = level),
            SettingsEdit::Debug(debug) => self.settings.update(|s| s.debug = debug),
        };

        log::info!("設定を更新: activeProvider={}", settings.active_provider);
        Ok(settings)
    }
}

fn canonical_id(provider: &str) -> Result<&'static str, AppError> {
    Ok(provider.parse::<ProviderKind>()?.id())
}
