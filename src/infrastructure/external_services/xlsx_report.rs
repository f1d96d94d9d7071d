use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};

use crate::application::ports::{ReportRenderError, ReportRenderer, TransacoesReport};

const SHEET_NAME: &str = "Transacoes";
const HEADER_ROW: u32 = 4;
const MAX_COLUMN_WIDTH: usize = 50;
const HEADER_COLOR: u32 = 0x4472C4;
const COLUMNS: [&str; 8] = [
    "Data",
    "Descricao",
    "Valor",
    "Pagador",
    "Beneficiario",
    "Categoria",
    "Confianca",
    "Revisado",
];

/// Renders reports as Excel workbooks.
#[derive(Debug, Default)]
pub struct XlsxReportRenderer;

impl XlsxReportRenderer {
    pub fn new() -> Self {
        Self
    }

    fn build_transacoes(report: &TransacoesReport) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        let title_format = Format::new()
            .set_bold()
            .set_font_size(14)
            .set_align(FormatAlign::Center);
        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_COLOR))
            .set_align(FormatAlign::Center);
        let money_format = Format::new().set_num_format("#,##0.00");
        let bold_money_format = Format::new().set_bold().set_num_format("#,##0.00");
        let bold_format = Format::new().set_bold();

        sheet.merge_range(
            0,
            0,
            0,
            COLUMNS.len() as u16 - 1,
            &format!("Relatorio de Transacoes - {}", report.processo_title),
            &title_format,
        )?;
        sheet.write_string(
            1,
            0,
            format!("Gerado em: {}", report.generated_at.format("%d/%m/%Y %H:%M")),
        )?;
        sheet.write_string(
            2,
            0,
            format!(
                "Periodo: {} a {}",
                report
                    .date_from
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "Inicio".to_string()),
                report
                    .date_to
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "Fim".to_string()),
            ),
        )?;

        let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
        for (col, name) in COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(HEADER_ROW, col as u16, *name, &header_format)?;
        }

        let mut row = HEADER_ROW + 1;
        for transacao in &report.transacoes {
            let cells = [
                transacao.date.map(|d| d.to_string()).unwrap_or_default(),
                transacao.description.clone(),
                String::new(),
                transacao.payer.clone().unwrap_or_default(),
                transacao.payee.clone().unwrap_or_default(),
                transacao
                    .category
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default(),
                transacao
                    .confidence
                    .map(|c| format!("{:.0}%", c * 100.0))
                    .unwrap_or_default(),
                if transacao.reviewed { "Sim" } else { "Nao" }.to_string(),
            ];
            for (col, value) in cells.iter().enumerate() {
                if col == 2 {
                    continue;
                }
                sheet.write_string(row, col as u16, value)?;
                widths[col] = widths[col].max(value.chars().count());
            }

            let amount = cents_to_reais(transacao.amount_cents.unwrap_or(0));
            sheet.write_number_with_format(row, 2, amount, &money_format)?;
            widths[2] = widths[2].max(format!("{:.2}", amount).len());
            row += 1;
        }

        let total_row = row + 1;
        sheet.write_string_with_format(total_row, 0, "TOTAL", &bold_format)?;
        sheet.write_number_with_format(
            total_row,
            2,
            cents_to_reais(report.total_cents()),
            &bold_money_format,
        )?;

        set_widths(sheet, &widths)?;
        workbook.save_to_buffer()
    }
}

fn cents_to_reais(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn set_widths(sheet: &mut Worksheet, widths: &[usize]) -> Result<(), XlsxError> {
    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, ((*width + 2).min(MAX_COLUMN_WIDTH)) as f64)?;
    }
    Ok(())
}

impl ReportRenderer for XlsxReportRenderer {
    fn render_transacoes(&self, report: &TransacoesReport) -> Result<Vec<u8>, ReportRenderError> {
        Self::build_transacoes(report).map_err(|e| ReportRenderError(e.to_string()))
    }

    fn content_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }
}
