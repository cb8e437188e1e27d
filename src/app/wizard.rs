// ==========================================
// 文件编码管理 - 导入向导状态机
// ==========================================
// 状态: Idle → Parsed → Confirming → Applying → Done(summary) | Failed(message)
// 约束:
// - 转换函数为纯函数：旧状态 + 事件 → 新状态 / 错误，不修改旧状态
// - Applying 期间只接受 ApplyFinished / ApplyFailed（禁止重复提交，不支持中途取消）
// ==========================================

use crate::domain::document_code::ParentCode;
use crate::domain::import::ImportSummary;
use serde::Serialize;
use thiserror::Error;

/// 向导状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardState {
    /// 未选择文件
    #[default]
    Idle,
    /// 已解析，展示预览
    Parsed {
        file_name: String,
        parents: Vec<ParentCode>,
    },
    /// 等待用户确认
    Confirming {
        file_name: String,
        parents: Vec<ParentCode>,
    },
    /// 批量执行中
    Applying {
        file_name: String,
        parents: Vec<ParentCode>,
    },
    /// 执行完成
    Done { summary: ImportSummary },
    /// 执行未能进行（远程快照读取失败等）
    Failed { message: String },
}

/// 向导事件
#[derive(Debug, Clone)]
pub enum WizardEvent {
    /// 文件解析完成
    FileParsed {
        file_name: String,
        parents: Vec<ParentCode>,
    },
    /// 用户点击导入，进入确认
    RequestConfirm,
    /// 用户确认
    Confirm,
    /// 取消（确认 → 预览，预览 → 空闲）
    Cancel,
    /// 批量执行结束
    ApplyFinished(ImportSummary),
    /// 批量执行未能完成
    ApplyFailed(String),
    /// 重置
    Reset,
}

impl WizardEvent {
    fn name(&self) -> &'static str {
        match self {
            WizardEvent::FileParsed { .. } => "FILE_PARSED",
            WizardEvent::RequestConfirm => "REQUEST_CONFIRM",
            WizardEvent::Confirm => "CONFIRM",
            WizardEvent::Cancel => "CANCEL",
            WizardEvent::ApplyFinished(_) => "APPLY_FINISHED",
            WizardEvent::ApplyFailed(_) => "APPLY_FAILED",
            WizardEvent::Reset => "RESET",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("无效的状态转换: state={state}, event={event}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error("未找到有效的编码")]
    NoValidCodes,
}

impl WizardState {
    pub fn name(&self) -> &'static str {
        match self {
            WizardState::Idle => "IDLE",
            WizardState::Parsed { .. } => "PARSED",
            WizardState::Confirming { .. } => "CONFIRMING",
            WizardState::Applying { .. } => "APPLYING",
            WizardState::Done { .. } => "DONE",
            WizardState::Failed { .. } => "FAILED",
        }
    }

    /// 状态转换
    pub fn transition(&self, event: WizardEvent) -> Result<WizardState, WizardError> {
        use WizardEvent as E;
        use WizardState as S;

        let invalid = |event: &WizardEvent| WizardError::InvalidTransition {
            state: self.name(),
            event: event.name(),
        };

        match (self, event) {
            // 选择文件：执行中以外均可
            (S::Applying { .. }, event @ E::FileParsed { .. }) => Err(invalid(&event)),
            (_, E::FileParsed { parents, .. }) if parents.is_empty() => {
                Err(WizardError::NoValidCodes)
            }
            (_, E::FileParsed { file_name, parents }) => Ok(S::Parsed { file_name, parents }),

            (S::Parsed { file_name, parents }, E::RequestConfirm) => Ok(S::Confirming {
                file_name: file_name.clone(),
                parents: parents.clone(),
            }),

            (S::Confirming { file_name, parents }, E::Confirm) => Ok(S::Applying {
                file_name: file_name.clone(),
                parents: parents.clone(),
            }),

            (S::Confirming { file_name, parents }, E::Cancel) => Ok(S::Parsed {
                file_name: file_name.clone(),
                parents: parents.clone(),
            }),
            (S::Parsed { .. }, E::Cancel) => Ok(S::Idle),

            (S::Applying { .. }, E::ApplyFinished(summary)) => Ok(S::Done { summary }),
            (S::Applying { .. }, E::ApplyFailed(message)) => Ok(S::Failed { message }),

            (S::Applying { .. }, event @ E::Reset) => Err(invalid(&event)),
            (_, E::Reset) => Ok(S::Idle),

            (_, event) => Err(invalid(&event)),
        }
    }

    /// 是否可提交导入（确认按钮可用）
    pub fn can_submit(&self) -> bool {
        matches!(self, WizardState::Confirming { .. })
    }

    /// 是否执行中（界面应禁用重复提交）
    pub fn is_busy(&self) -> bool {
        matches!(self, WizardState::Applying { .. })
    }

    /// 当前预览中的父编码
    pub fn parents(&self) -> Option<&[ParentCode]> {
        match self {
            WizardState::Parsed { parents, .. }
            | WizardState::Confirming { parents, .. }
            | WizardState::Applying { parents, .. } => Some(parents),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            WizardState::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&ImportSummary> {
        match self {
            WizardState::Done { summary } => Some(summary),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::ImportErrorLog;
    use crate::domain::types::CodeStatus;

    fn parent(code: &str) -> ParentCode {
        ParentCode {
            id: 0,
            code: code.to_string(),
            document_type: "PMV".to_string(),
            document_name: "Plan".to_string(),
            department_code: "RRHH".to_string(),
            approval_date: String::new(),
            version: 1,
            status: CodeStatus::Vigente,
            children: Vec::new(),
        }
    }

    fn parsed() -> WizardEvent {
        WizardEvent::FileParsed {
            file_name: "codigos.xlsx".to_string(),
            parents: vec![parent("VAL-001")],
        }
    }

    fn summary() -> ImportSummary {
        ImportSummary {
            batch_id: "b-1".to_string(),
            total_parents: 1,
            success_count: 1,
            failure_count: 0,
            created_parents: 1,
            created_children: 0,
            skipped_children: 0,
            parents: Vec::new(),
            errors: ImportErrorLog::new(),
        }
    }

    #[test]
    fn test_happy_path() {
        let state = WizardState::Idle;
        let state = state.transition(parsed()).unwrap();
        assert_eq!(state.name(), "PARSED");
        assert!(!state.can_submit());

        let state = state.transition(WizardEvent::RequestConfirm).unwrap();
        assert!(state.can_submit());

        let state = state.transition(WizardEvent::Confirm).unwrap();
        assert!(state.is_busy());
        assert_eq!(state.parents().map(|p| p.len()), Some(1));

        let state = state.transition(WizardEvent::ApplyFinished(summary())).unwrap();
        assert_eq!(state.summary().map(|s| s.success_count), Some(1));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_empty_parse_is_rejected() {
        let err = WizardState::Idle
            .transition(WizardEvent::FileParsed {
                file_name: "vacio.xlsx".to_string(),
                parents: Vec::new(),
            })
            .unwrap_err();
        assert_eq!(err, WizardError::NoValidCodes);
    }

    #[test]
    fn test_applying_rejects_resubmission_and_reset() {
        let applying = WizardState::Idle
            .transition(parsed())
            .and_then(|s| s.transition(WizardEvent::RequestConfirm))
            .and_then(|s| s.transition(WizardEvent::Confirm))
            .unwrap();

        for event in [WizardEvent::Confirm, WizardEvent::Reset, WizardEvent::Cancel, parsed()] {
            let err = applying.transition(event).unwrap_err();
            assert!(matches!(err, WizardError::InvalidTransition { state: "APPLYING", .. }));
        }
    }

    #[test]
    fn test_cancel_steps_back() {
        let confirming = WizardState::Idle
            .transition(parsed())
            .and_then(|s| s.transition(WizardEvent::RequestConfirm))
            .unwrap();

        let parsed_state = confirming.transition(WizardEvent::Cancel).unwrap();
        assert_eq!(parsed_state.name(), "PARSED");
        assert_eq!(parsed_state.transition(WizardEvent::Cancel).unwrap(), WizardState::Idle);
    }

    #[test]
    fn test_transition_does_not_mutate_source_state() {
        let state = WizardState::Idle.transition(parsed()).unwrap();
        let _next = state.transition(WizardEvent::RequestConfirm).unwrap();
        assert_eq!(state.name(), "PARSED");
    }

    #[test]
    fn test_invalid_events_from_idle() {
        assert!(WizardState::Idle.transition(WizardEvent::Confirm).is_err());
        assert!(WizardState::Idle
            .transition(WizardEvent::ApplyFinished(summary()))
            .is_err());
        assert_eq!(
            WizardState::Idle.transition(WizardEvent::Reset).unwrap(),
            WizardState::Idle
        );
    }

    #[test]
    fn test_done_can_load_new_file() {
        let done = WizardState::Done { summary: summary() };
        assert_eq!(done.transition(parsed()).unwrap().name(), "PARSED");
    }

    #[test]
    fn test_apply_failure_leaves_applying() {
        let applying = WizardState::Idle
            .transition(parsed())
            .and_then(|s| s.transition(WizardEvent::RequestConfirm))
            .and_then(|s| s.transition(WizardEvent::Confirm))
            .unwrap();

        let failed = applying
            .transition(WizardEvent::ApplyFailed("connection refused".to_string()))
            .unwrap();
        assert_eq!(failed.name(), "FAILED");
        assert!(!failed.is_busy());
        assert_eq!(failed.failure_message(), Some("connection refused"));

        // 失败后可重置或重新选择文件
        assert_eq!(failed.transition(WizardEvent::Reset).unwrap(), WizardState::Idle);
        assert_eq!(failed.transition(parsed()).unwrap().name(), "PARSED");
    }

    #[test]
    fn test_apply_failed_outside_applying_is_rejected() {
        let err = WizardState::Idle
            .transition(WizardEvent::ApplyFailed("x".to_string()))
            .unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { event: "APPLY_FAILED", .. }));
    }
}
