//! Output formatting.

use crate::analysis::{Analyses, Analysis};
use std::fmt::Write;

const HEADERS: [&str; 4] =
    ["Blob Length(bytes)", "Zero Bytes", "Used Percentage", "Wasted Percentage"];

/// One table per blob, headed by the blob origin. Transaction requests start with the
/// transaction's blob versioned hashes.
pub fn text(analyses: &Analyses) -> String {
    let mut out = String::new();
    // writing to a String does not fail
    if let Some(hashes) = &analyses.blob_versioned_hashes {
        let _ = writeln!(out, "Blob Versioned Hashes (Count: {})", hashes.len());
        for (index, hash) in hashes.iter().enumerate() {
            let _ = writeln!(out, "  #{index} {hash}");
        }
        out.push('\n');
    }

    for (i, analysis) in analyses.reports.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let report = &analysis.report;
        let values = [
            report.blob_length_bytes.to_string(),
            report.zero_bytes.to_string(),
            format!("{:.2}", report.used_percentage),
            format!("{:.2}", report.wasted_percentage),
        ];

        let _ = writeln!(out, "{}", analysis.origin);
        let _ = writeln!(out, "{}", row(&HEADERS.map(str::to_string)));
        let _ = writeln!(out, "{}", row(&values));
    }
    out
}

/// All reports as a pretty printed JSON array.
pub fn json(analyses: &[Analysis]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(analyses)
}

fn row(cells: &[String; 4]) -> String {
    cells
        .iter()
        .zip(HEADERS)
        .map(|(cell, header)| format!("{cell:<width$}", width = header.len()))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::B256;
    use blobspace_calc::{compute, CalcOptions, PrefixMode};
    use blobspace_source::BlobOrigin;

    fn analysis(origin: BlobOrigin, data: &str) -> Analysis {
        let options = CalcOptions { prefix_mode: PrefixMode::Corrected, ..Default::default() };
        Analysis { origin, report: blobspace_calc::compute_with(data, options).unwrap() }
    }

    #[test]
    fn text_table() {
        let analyses = Analyses {
            blob_versioned_hashes: None,
            reports: vec![analysis(BlobOrigin::Pasted, "0x00000000")],
        };
        let out = text(&analyses);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "pasted blob data");
        assert_eq!(lines[1], "Blob Length(bytes)  Zero Bytes  Used Percentage  Wasted Percentage");
        assert_eq!(lines[2], "4                   4           0.00             100.00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn text_separates_blobs() {
        let tx_hash = B256::repeat_byte(0xaa);
        let analyses = [0, 1].map(|index| {
            let origin =
                BlobOrigin::Transaction { tx_hash, index, versioned_hash: B256::repeat_byte(1) };
            analysis(origin, "0xff00")
        });
        let analyses = Analyses { blob_versioned_hashes: None, reports: analyses.to_vec() };
        let out = text(&analyses);
        assert_eq!(out.lines().count(), 7);
        assert_eq!(out.lines().nth(3), Some(""));
        assert!(out.lines().nth(4).unwrap().starts_with("blob #1"));
    }

    #[test]
    fn text_lists_transaction_hashes() {
        let tx_hash = B256::repeat_byte(0xaa);
        let hashes = vec![B256::repeat_byte(1), B256::repeat_byte(2), B256::repeat_byte(3)];
        let origin = BlobOrigin::Transaction { tx_hash, index: 2, versioned_hash: hashes[2] };
        let analyses = Analyses {
            blob_versioned_hashes: Some(hashes.clone()),
            reports: vec![analysis(origin, "0xff00")],
        };

        let out = text(&analyses);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "Blob Versioned Hashes (Count: 3)");
        assert_eq!(lines[1], format!("  #0 {}", hashes[0]));
        assert_eq!(lines[3], format!("  #2 {}", hashes[2]));
        assert_eq!(lines[4], "");
        assert!(lines[5].starts_with("blob #2"));
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn all_zero_blob_has_no_negative_zero() {
        let data = format!("0x{}", "0".repeat(2 * 131_072));
        let report = compute(&data).unwrap();
        let analyses = Analyses {
            blob_versioned_hashes: None,
            reports: vec![Analysis { origin: BlobOrigin::Pasted, report }],
        };

        let out = text(&analyses);
        assert!(!out.contains("-0.00"), "{out}");
        assert!(out.lines().nth(2).unwrap().contains(" 0.00 "), "{out}");
        assert!(!json(&analyses.reports).unwrap().contains("-0.0"));
    }

    #[test]
    fn json_flattens_report() {
        let report = compute("0xff00ff00").unwrap();
        let analyses = vec![Analysis { origin: BlobOrigin::Pasted, report }];
        let value: serde_json::Value = serde_json::from_str(&json(&analyses).unwrap()).unwrap();
        assert_eq!(value[0]["origin"]["source"], "pasted");
        assert_eq!(value[0]["blob_length_bytes"], 4);
        assert_eq!(value[0]["zero_bytes"], 2);
        assert_eq!(value[0]["used_percentage"], 37.5);
        assert_eq!(value[0]["wasted_percentage"], 62.5);
    }
}
