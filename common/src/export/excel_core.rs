//! Excel生成（共通ライブラリ）
//!
//! 違反一覧を1シートの表形式で出力する

use crate::error::{Error, Result};
use crate::records::Violation;
use rust_xlsxwriter::*;

/// 列定義（見出し, 列幅）
const COLUMNS: [(&str, f64); 7] = [
    ("ID", 6.0),
    ("Type", 18.0),
    ("Location", 16.0),
    ("Date", 12.0),
    ("Time", 8.0),
    ("Worker", 18.0),
    ("Status", 10.0),
];

/// "#RRGGBB" を Color に変換
fn hex_color(hex: &str) -> Color {
    u32::from_str_radix(hex.trim_start_matches('#'), 16)
        .map(Color::RGB)
        .unwrap_or(Color::Black)
}

fn export_err(context: &str, e: XlsxError) -> Error {
    Error::Export(format!("{}: {}", context, e))
}

/// 違反一覧のExcelをバッファに生成
///
/// # Arguments
/// * `violations` - 出力する違反記録（絞り込み済みでもよい）
/// * `title` - 1行目に書くタイトル
pub fn generate_violations_buffer(violations: &[&Violation], title: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let title_format = Format::new().set_bold().set_font_size(14.0);

    let header_format = Format::new()
        .set_bold()
        .set_font_size(10.0)
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x14141E))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_font_size(11.0)
        .set_align(FormatAlign::Left)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Violations")
        .map_err(|e| export_err("シート名設定エラー", e))?;

    worksheet
        .write_string_with_format(0, 0, title, &title_format)
        .map_err(|e| export_err("タイトル書き込みエラー", e))?;

    for (col, (label, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .set_column_width(col, *width)
            .map_err(|e| export_err("列幅設定エラー", e))?;
        worksheet
            .write_string_with_format(2, col, *label, &header_format)
            .map_err(|e| export_err("見出し書き込みエラー", e))?;
    }

    for (i, v) in violations.iter().enumerate() {
        let row = 3 + i as u32;
        let status_format = value_format
            .clone()
            .set_bold()
            .set_font_color(hex_color(v.status.color()));

        let cells = [
            v.kind.as_str(),
            v.location.as_str(),
            v.date.as_str(),
            v.time.as_str(),
            v.worker.as_str(),
        ];

        worksheet
            .write_number_with_format(row, 0, v.id as f64, &value_format)
            .map_err(|e| export_err("値書き込みエラー", e))?;
        for (offset, value) in cells.iter().enumerate() {
            worksheet
                .write_string_with_format(row, 1 + offset as u16, *value, &value_format)
                .map_err(|e| export_err("値書き込みエラー", e))?;
        }
        worksheet
            .write_string_with_format(row, 6, v.status.to_string(), &status_format)
            .map_err(|e| export_err("値書き込みエラー", e))?;
    }

    // バッファに書き出し
    workbook
        .save_to_buffer()
        .map_err(|e| export_err("Excel保存エラー", e))
}
