//! # 散射截面 CSV 解析器
//!
//! 读取弹性电子散射测量表。
//!
//! ## 格式说明
//! ```text
//! theta (degree),cross-section (mb/sr),error (mb/sr)
//! 16,1.23e2,6.1
//! 18,7.45e1,3.7
//! ...
//! ```
//! 角度以度存储，加载时换算为弧度。以 `#` 开头的行视为注释。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/measurement.rs`
//! - 使用 `csv` + `serde` 反序列化

use crate::error::{NucradError, Result};
use crate::models::{Measurement, ScatteringData};

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// CSV 中的一行
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "theta (degree)")]
    theta_deg: f64,
    #[serde(rename = "cross-section (mb/sr)")]
    cross_section: f64,
    #[serde(rename = "error (mb/sr)")]
    error: f64,
}

/// 从文件加载测量数据
pub fn load_scattering_csv(path: &Path) -> Result<ScatteringData> {
    if !path.exists() {
        return Err(NucradError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let file = File::open(path).map_err(|e| NucradError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");

    let data = parse_scattering_csv(file, name)?;
    debug!(
        path = %path.display(),
        points = data.len(),
        "Loaded scattering data"
    );
    Ok(data)
}

/// 从任意 reader 解析测量数据
pub fn parse_scattering_csv<R: Read>(reader: R, name: &str) -> Result<ScatteringData> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in rdr.deserialize::<Row>().enumerate() {
        // 表头占第 1 行
        let line = index + 2;
        let row = row.map_err(|e| NucradError::ParseError {
            format: "scattering csv".to_string(),
            path: name.to_string(),
            reason: format!("row {}: {}", line, e),
        })?;

        let measurement = Measurement::new(row.theta_deg.to_radians(), row.cross_section, row.error)
            .map_err(|e| NucradError::InvalidData(format!("{} row {}: {}", name, line, e)))?;
        records.push(measurement);
    }

    ScatteringData::new(name, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
theta (degree),cross-section (mb/sr),error (mb/sr)
# 250 MeV, Ca-40
16, 1.20e2, 6.0
20, 3.5e1, 1.75
24, 9.8, 0.49
";

    #[test]
    fn test_parse_sample() {
        let data = parse_scattering_csv(SAMPLE.as_bytes(), "ca40").unwrap();
        assert_eq!(data.name, "ca40");
        assert_eq!(data.len(), 3);

        let first = data.records()[0];
        assert!((first.theta - 16f64.to_radians()).abs() < 1e-15);
        assert!((first.theta_degrees() - 16.0).abs() < 1e-12);
        assert_eq!(first.cross_section, 120.0);
        assert_eq!(first.error, 6.0);
    }

    #[test]
    fn test_rejects_non_positive_error() {
        let content = "theta (degree),cross-section (mb/sr),error (mb/sr)\n16,1.0,0.0\n";
        let err = parse_scattering_csv(content.as_bytes(), "bad").unwrap_err();
        assert!(matches!(err, NucradError::InvalidData(_)));
    }

    #[test]
    fn test_rejects_zero_angle() {
        let content = "theta (degree),cross-section (mb/sr),error (mb/sr)\n0,1.0,0.1\n";
        assert!(parse_scattering_csv(content.as_bytes(), "bad").is_err());
    }

    #[test]
    fn test_rejects_malformed_row() {
        let content = "theta (degree),cross-section (mb/sr),error (mb/sr)\n16,abc,0.1\n";
        let err = parse_scattering_csv(content.as_bytes(), "bad").unwrap_err();
        assert!(matches!(err, NucradError::ParseError { .. }));
    }

    #[test]
    fn test_rejects_empty_table() {
        let content = "theta (degree),cross-section (mb/sr),error (mb/sr)\n";
        assert!(parse_scattering_csv(content.as_bytes(), "empty").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calcium.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        drop(file);

        let data = load_scattering_csv(&path).unwrap();
        assert_eq!(data.name, "calcium");
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_scattering_csv(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, NucradError::FileNotFound { .. }));
    }
}
