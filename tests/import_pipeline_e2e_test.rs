// ==========================================
// 编码导入端到端测试
// ==========================================
// 流程: 工作簿 → 预览 → 对账 → 批量执行 → 报告 / 失败明细 / 审计 → 刷新

use doc_codes::api::ApiError;
use doc_codes::app::AppState;
use doc_codes::config::ConfigManager;
use doc_codes::domain::{ChildCode, CodeStatus, ParentApplyStatus, ParentCode};
use doc_codes::importer::{ImportError, ImportNotification, SpreadsheetSource};
use std::sync::Arc;
use tempfile::TempDir;

mod test_helpers;
use test_helpers::{
    build_import_api, create_test_db, text_row, write_test_workbook, Cell, MockCodeRepository,
};

fn sample_rows() -> Vec<Vec<Cell>> {
    vec![
        text_row([
            "RRHH", "VAL-001", "PMV", "Plan A", "1", "2024-01-10", "H-1", "Doc H1", "1",
            "2024-01-11", "VIGENTE",
        ]),
        text_row([
            "RRHH", "VAL-001", "PMV", "Plan A", "1", "2024-01-10", "H-2", "Doc H2", "1",
            "2024-01-12", "VIGENTE",
        ]),
        text_row([
            "CAL", "VAL-002", "PRO", "Procedimiento B", "2", "2024-02-01", "H-3", "Doc H3", "1",
            "", "PROCESO",
        ]),
        text_row([
            "LOG", "VAL-003", "INS", "Instructivo C", "1", "", "", "", "", "", "OBSOLETO",
        ]),
    ]
}

fn app_state(repo: Arc<MockCodeRepository>, db_path: &str, log_dir: &TempDir) -> AppState {
    let api = build_import_api(repo, db_path, log_dir.path());
    let config = ConfigManager::new(db_path).unwrap();
    AppState::with_components(db_path.to_string(), Arc::new(api), Arc::new(config))
}

fn existing_parent(id: i64, code: &str, children: &[(i64, &str)]) -> ParentCode {
    ParentCode {
        id,
        code: code.to_string(),
        document_type: "PMV".to_string(),
        document_name: "Plan A".to_string(),
        department_code: "RRHH".to_string(),
        approval_date: "2024-01-10".to_string(),
        version: 1,
        status: CodeStatus::Vigente,
        children: children
            .iter()
            .map(|(child_id, c)| ChildCode {
                id: *child_id,
                code: c.to_string(),
                document_name: format!("Doc {}", c),
                approval_date: String::new(),
                version: 1,
                status: CodeStatus::Vigente,
                parent_id: id,
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_full_import_then_reimport_is_noop() {
    let (_db_file, db_path) = create_test_db();
    let work = TempDir::new().unwrap();
    let file = write_test_workbook(&work, "codigos.xlsx", &sample_rows());

    let repo = Arc::new(MockCodeRepository::new());
    let state = app_state(repo.clone(), &db_path, &work);

    // 步骤 1: 预览
    let preview = state
        .import_api
        .preview(&SpreadsheetSource::from_path(&file))
        .unwrap();
    assert_eq!(preview.parent_count, 3);
    assert_eq!(preview.child_count, 3);
    assert_eq!(preview.file_name, "codigos.xlsx");

    // 步骤 2: 首次导入
    state.refresh_known_parents().await.unwrap();
    let (outcome, refreshed) = state
        .run_import(preview.parents.clone(), Some(preview.file_name.clone()))
        .await;

    assert!(refreshed);
    assert_eq!(outcome.summary.success_count, 3);
    assert_eq!(outcome.summary.failure_count, 0);
    assert_eq!(outcome.summary.created_parents, 3);
    assert_eq!(outcome.summary.created_children, 3);
    assert_eq!(
        outcome.report.notification,
        ImportNotification::Success { processed: 3 }
    );
    assert!(outcome.error_log_path.is_none());
    assert_eq!(repo.calls().len(), 6);

    // 刷新后已知集合与远程一致
    let known = state.known_parents().await;
    assert_eq!(known.len(), 3);
    assert_eq!(known[0].children.len(), 2);

    // 步骤 3: 同一文件再次导入 → 无新增、无远程调用
    let (outcome, _) = state
        .run_import(preview.parents, Some(preview.file_name))
        .await;
    assert_eq!(outcome.report.notification, ImportNotification::NothingNew);
    assert_eq!(outcome.summary.skipped_children, 3);
    assert_eq!(repo.calls().len(), 6);

    // 步骤 4: 审计历史
    let history = state.import_api.recent_batches(10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history
        .iter()
        .all(|b| b.file_name.as_deref() == Some("codigos.xlsx")));
}

#[tokio::test]
async fn test_partial_failure_writes_error_log() {
    let (_db_file, db_path) = create_test_db();
    let work = TempDir::new().unwrap();
    let file = write_test_workbook(&work, "codigos.xlsx", &sample_rows());

    let repo = Arc::new(MockCodeRepository::new());
    repo.fail_on("VAL-002");
    let state = app_state(repo.clone(), &db_path, &work);

    let preview = state
        .import_api
        .preview(&SpreadsheetSource::from_path(&file))
        .unwrap();
    let (outcome, _) = state.run_import(preview.parents, None).await;

    assert_eq!(outcome.summary.success_count, 2);
    assert_eq!(outcome.summary.failure_count, 1);
    assert_eq!(
        outcome.report.notification,
        ImportNotification::PartialFailure {
            succeeded: 2,
            failed: 1
        }
    );
    assert_eq!(outcome.summary.parents[1].status, ParentApplyStatus::Failed);

    // VAL-002 的子编码 H-3 从未尝试
    assert!(!repo.calls().iter().any(|c| c.starts_with("child:H-3")));
    assert!(repo.calls().contains(&"parent:VAL-003".to_string()));

    // 失败明细: 恰好一行，包含父编码
    let path = outcome.error_log_path.expect("error log should be written");
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("VAL-002"));
    assert!(lines[0].contains("no es válido"));

    // 审计记录保存了失败明细
    let batch = state
        .import_api
        .get_batch(&outcome.summary.batch_id)
        .await
        .unwrap();
    assert_eq!(batch.failure_count, 1);
    assert_eq!(batch.error_lines.len(), 1);
    assert!(batch.file_name.is_none());
}

#[tokio::test]
async fn test_unwritable_error_log_keeps_summary_and_audit() {
    let (_db_file, db_path) = create_test_db();
    let work = TempDir::new().unwrap();
    let file = write_test_workbook(&work, "codigos.xlsx", &sample_rows());

    // 输出目录实际是一个普通文件，明细无法写出
    let blocked_dir = work.path().join("no_es_directorio");
    std::fs::write(&blocked_dir, b"x").unwrap();

    let repo = Arc::new(MockCodeRepository::new());
    repo.fail_on("VAL-002");
    let api = build_import_api(repo.clone(), &db_path, &blocked_dir);
    let config = ConfigManager::new(&db_path).unwrap();
    let state = AppState::with_components(db_path.clone(), Arc::new(api), Arc::new(config));

    let preview = state
        .import_api
        .preview(&SpreadsheetSource::from_path(&file))
        .unwrap();
    let (outcome, refreshed) = state
        .run_import(preview.parents, Some("codigos.xlsx".to_string()))
        .await;

    assert!(refreshed);
    assert_eq!(outcome.summary.success_count, 2);
    assert_eq!(outcome.summary.failure_count, 1);
    assert!(outcome.error_log_path.is_none());
    assert!(outcome.error_log_write_error.is_some());
    assert_eq!(outcome.report.error_log.as_ref().map(|l| l.len()), Some(1));

    // 已创建的远程记录可见，审计记录照常写入
    assert!(state.known_parents().await.iter().any(|p| p.code == "VAL-001"));
    let history = state.import_api.recent_batches(10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].batch_id, outcome.summary.batch_id);
    assert_eq!(history[0].success_count, 2);
    assert_eq!(history[0].failure_count, 1);
    assert_eq!(history[0].error_lines.len(), 1);
}

#[tokio::test]
async fn test_reuse_existing_parent_creates_only_missing_child() {
    let (_db_file, db_path) = create_test_db();
    let work = TempDir::new().unwrap();
    let file = write_test_workbook(&work, "codigos.xlsx", &sample_rows()[..2]);

    let repo = Arc::new(MockCodeRepository::with_parents(vec![existing_parent(
        42,
        "VAL-001",
        &[(43, "H-1")],
    )]));
    let state = app_state(repo.clone(), &db_path, &work);
    state.refresh_known_parents().await.unwrap();

    let preview = state
        .import_api
        .preview(&SpreadsheetSource::from_path(&file))
        .unwrap();
    let (outcome, _) = state.run_import(preview.parents, None).await;

    assert_eq!(repo.calls(), vec!["child:H-2@42".to_string()]);
    assert_eq!(outcome.summary.success_count, 1);
    assert_eq!(outcome.summary.created_parents, 0);
    assert_eq!(outcome.summary.skipped_children, 1);
    assert_eq!(state.known_parents().await[0].children.len(), 2);
}

#[tokio::test]
async fn test_fatal_errors_stop_before_remote_calls() {
    let (_db_file, db_path) = create_test_db();
    let work = TempDir::new().unwrap();
    let repo = Arc::new(MockCodeRepository::new());
    let state = app_state(repo.clone(), &db_path, &work);

    // CSV
    let csv = SpreadsheetSource::from_bytes("codigos.csv", None, b"a,b,c\n".to_vec());
    let err = state.import_api.preview(&csv).unwrap_err();
    assert!(matches!(err, ApiError::Import(ImportError::CsvRejected(_))));

    // 全部父编码为空
    let file = write_test_workbook(
        &work,
        "vacio.xlsx",
        &[text_row([
            "RRHH", "", "PMV", "Plan A", "1", "", "H-1", "Doc H1", "1", "", "VIGENTE",
        ])],
    );
    let err = state
        .import_api
        .preview(&SpreadsheetSource::from_path(&file))
        .unwrap_err();
    assert!(matches!(err, ApiError::Import(ImportError::NoValidCodes)));

    assert!(repo.calls().is_empty());
}

#[tokio::test]
async fn test_native_and_numeric_dates_are_normalized() {
    let (_db_file, db_path) = create_test_db();
    let work = TempDir::new().unwrap();
    let file = write_test_workbook(
        &work,
        "fechas.xlsx",
        &[vec![
            Cell::Text("RRHH"),
            Cell::Text("VAL-010"),
            Cell::Text("PMV"),
            Cell::Text("Plan"),
            Cell::Number(3.0),
            Cell::Date(45000.0),
            Cell::Text("H-1"),
            Cell::Text("Doc"),
            Cell::Number(0.0),
            Cell::Text("not a date"),
            Cell::Text("vencido"),
        ]],
    );

    let repo = Arc::new(MockCodeRepository::new());
    let state = app_state(repo, &db_path, &work);
    let preview = state
        .import_api
        .preview(&SpreadsheetSource::from_path(&file))
        .unwrap();

    let parent = &preview.parents[0];
    assert_eq!(parent.approval_date, "2023-03-15");
    assert_eq!(parent.version, 3);
    assert_eq!(parent.status, CodeStatus::Vencido);
    assert_eq!(parent.children[0].approval_date, "");
    assert_eq!(parent.children[0].version, 1);
}
