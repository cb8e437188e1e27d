// ==========================================
// 文件编码管理 - 数据清洗器实现
// ==========================================
// 职责: 单元格 → 文本 / 版本号 / ISO 日期 标准化
// 日期三种来源: 原生日期单元格 / 数值天数（1899-12-30 纪元）/ 自由文本
// ==========================================

use crate::importer::code_importer_trait::DataCleaner as DataCleanerTrait;
use calamine::Data;
use chrono::{Days, NaiveDate, NaiveDateTime};

/// 表格日期纪元（Excel 1900 日期系统，含 1900-02-29 偏差修正）
const SHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// 输出日期格式
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// 文本日期可接受格式（按优先级；日/月/年优先于月/日/年）
const TEXT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%m/%d/%Y",
];

/// 文本日期时间可接受格式
const TEXT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// 文本形式天数的可接受范围（5 位整数部分: 1927-05-18 至 2173-10-13）
/// 4 位以内的数字多为年份或序号，不按天数解释
const TEXT_SERIAL_RANGE: std::ops::Range<f64> = 10_000.0..100_000.0;

/// 缺省版本号
pub const DEFAULT_VERSION: i32 = 1;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn cell_text(&self, cell: Option<&Data>) -> String {
        match cell {
            Some(Data::String(s)) => s.trim().to_string(),
            Some(Data::Float(f)) => {
                if f.fract() == 0.0 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Some(Data::Int(i)) => i.to_string(),
            Some(Data::Bool(b)) => b.to_string(),
            Some(Data::DateTime(dt)) => self.serial_to_iso(dt.as_f64()),
            Some(Data::DateTimeIso(s)) => s.trim().to_string(),
            _ => String::new(),
        }
    }

    fn cell_version(&self, cell: Option<&Data>) -> i32 {
        let raw = match cell {
            Some(Data::Int(i)) => Some(*i as f64),
            Some(Data::Float(f)) => Some(*f),
            Some(Data::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match raw {
            Some(v) if v.is_finite() && v >= 1.0 && v <= i32::MAX as f64 => v.trunc() as i32,
            _ => DEFAULT_VERSION,
        }
    }

    fn cell_date(&self, cell: Option<&Data>) -> String {
        match cell {
            Some(Data::DateTime(dt)) => self.serial_to_iso(dt.as_f64()),
            Some(Data::Float(f)) => self.serial_to_iso(*f),
            Some(Data::Int(i)) => self.serial_to_iso(*i as f64),
            Some(Data::String(s)) | Some(Data::DateTimeIso(s)) => self.text_to_iso(s),
            _ => String::new(),
        }
    }
}

impl DataCleaner {
    /// 数值天数 → ISO 日期
    ///
    /// # 规则
    /// - <= 1 视为非日期（空字符串）
    /// - 小数部分（时间）舍弃
    pub fn serial_to_iso(&self, serial: f64) -> String {
        if !serial.is_finite() || serial <= 1.0 {
            return String::new();
        }

        let (y, m, d) = SHEET_EPOCH;
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|epoch| epoch.checked_add_days(Days::new(serial.floor() as u64)))
            .map(|date| date.format(ISO_DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// 自由文本 → ISO 日期（无法识别返回空字符串）
    pub fn text_to_iso(&self, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        // 8 位纯数字: YYYYMMDD
        if trimmed.len() == 8 && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y%m%d") {
                return date.format(ISO_DATE_FORMAT).to_string();
            }
        }

        // 文本形式的天数
        if let Ok(serial) = trimmed.parse::<f64>() {
            if TEXT_SERIAL_RANGE.contains(&serial) {
                return self.serial_to_iso(serial);
            }
            return String::new();
        }

        if let Some(date) = parse_text_date(trimmed) {
            return date.format(ISO_DATE_FORMAT).to_string();
        }

        // 带时区的 RFC 3339
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
            return dt.date_naive().format(ISO_DATE_FORMAT).to_string();
        }

        String::new()
    }
}

fn parse_text_date(value: &str) -> Option<NaiveDate> {
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            TEXT_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}
