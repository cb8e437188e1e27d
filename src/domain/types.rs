// ==========================================
// 文件编码管理 - 领域类型定义
// ==========================================
// 职责: 编码状态枚举
// 序列化格式: 全大写西语（与远程 API 一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 编码状态 (Code Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeStatus {
    #[default]
    Vigente,  // 有效
    Proceso,  // 流程中
    Obsoleto, // 作废
    Vencido,  // 过期
}

impl CodeStatus {
    /// 全部状态（导出下拉/校验用）
    pub const ALL: [CodeStatus; 4] = [
        CodeStatus::Vigente,
        CodeStatus::Proceso,
        CodeStatus::Obsoleto,
        CodeStatus::Vencido,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeStatus::Vigente => "VIGENTE",
            CodeStatus::Proceso => "PROCESO",
            CodeStatus::Obsoleto => "OBSOLETO",
            CodeStatus::Vencido => "VENCIDO",
        }
    }

    /// 解析单元格文本（不区分大小写，去首尾空白）
    ///
    /// # 返回
    /// - Some(CodeStatus): 可识别
    /// - None: 空值或未知值
    pub fn parse(value: &str) -> Option<CodeStatus> {
        match value.trim().to_uppercase().as_str() {
            "VIGENTE" => Some(CodeStatus::Vigente),
            "PROCESO" | "EN PROCESO" => Some(CodeStatus::Proceso),
            "OBSOLETO" => Some(CodeStatus::Obsoleto),
            "VENCIDO" => Some(CodeStatus::Vencido),
            _ => None,
        }
    }

    /// 解析单元格文本，无法识别时回落为默认值 VIGENTE
    pub fn from_cell(value: &str) -> CodeStatus {
        Self::parse(value).unwrap_or_default()
    }
}

impl fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
