// src/services/document_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{SettingsRepository, UserRepository},
    middleware::auth::AuthContext,
    models::{auth::Company, sales::SaleDetail, settings::CompanySettings},
    services::sales_service::SalesService,
};

const FONT_FAMILY: &str = "Roboto";

/// "R$ 1234,50": duas casas, vírgula decimal.
pub fn format_brl(value: Decimal) -> String {
    format!("R$ {:.2}", value).replace('.', ",")
}

fn render_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Falha ao gerar o recibo: {}", e))
}

// Tudo o que o recibo precisa, já carregado (a renderização roda fora do runtime)
struct ReceiptData {
    company: Company,
    settings: CompanySettings,
    detail: SaleDetail,
}

#[derive(Clone)]
pub struct DocumentService {
    sales_service: SalesService,
    user_repo: UserRepository,
    settings_repo: SettingsRepository,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(
        sales_service: SalesService,
        user_repo: UserRepository,
        settings_repo: SettingsRepository,
        fonts_dir: PathBuf,
    ) -> Self {
        Self { sales_service, user_repo, settings_repo, fonts_dir }
    }

    /// PDF do recibo. A regra de visibilidade é a mesma do GET /api/sales/{id}.
    pub async fn generate_receipt(&self, ctx: AuthContext, sale_id: Uuid) -> Result<Vec<u8>, AppError> {
        // 1. Busca os dados
        let detail = self.sales_service.get_sale(ctx, sale_id).await?;
        let company = self
            .user_repo
            .find_company(ctx.company_id)
            .await?
            .ok_or(AppError::NotFound("entity.company"))?;
        let settings = self.settings_repo.get_settings(ctx.company_id).await?;

        // 2. Renderiza (CPU-bound)
        let fonts_dir = self.fonts_dir.clone();
        let data = ReceiptData { company, settings, detail };
        let buffer = tokio::task::spawn_blocking(move || render_receipt(&fonts_dir, data))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de renderização: {}", e))??;

        tracing::info!(sale_id = %sale_id, bytes = buffer.len(), "Recibo gerado");
        Ok(buffer)
    }
}

fn render_receipt(fonts_dir: &std::path::Path, data: ReceiptData) -> Result<Vec<u8>, AppError> {
    let ReceiptData { company, settings, detail } = data;
    let sale = &detail.sale;

    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None).map_err(|e| {
        tracing::error!(dir = %fonts_dir.display(), "Fonte {} não encontrada: {}", FONT_FAMILY, e);
        render_error(e)
    })?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Recibo {}", sale.id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO ---
    doc.push(elements::Paragraph::new(company.name).styled(style::Style::new().bold().with_font_size(18)));
    if let Some(tax_id) = company.tax_id {
        doc.push(elements::Paragraph::new(format!("CNPJ/CPF: {}", tax_id)).styled(style::Style::new().with_font_size(10)));
    }
    if let Some(address) = company.address {
        doc.push(elements::Paragraph::new(address).styled(style::Style::new().with_font_size(10)));
    }

    doc.push(elements::Break::new(1.5));

    doc.push(elements::Paragraph::new("RECIBO DE VENDA").styled(style::Style::new().bold().with_font_size(14)));
    doc.push(elements::Paragraph::new(format!("Venda: {}", sale.id)).styled(style::Style::new().with_font_size(8)));
    doc.push(elements::Paragraph::new(format!("Data: {}", sale.created_at.format("%d/%m/%Y %H:%M"))));
    doc.push(elements::Paragraph::new(format!("Cliente: {}", sale.client_name)));
    doc.push(elements::Paragraph::new(format!("Vendedor: {}", detail.seller.name)));
    doc.push(elements::Paragraph::new(format!("Pagamento: {}", sale.payment_method.label())));

    doc.push(elements::Break::new(2));

    // --- TABELA DE ITENS ---
    // Pesos das colunas: Item (4), Qtd (1), Unitário (2), Total (2)
    let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Item").styled(style_bold))
        .element(elements::Paragraph::new("Qtd").styled(style_bold))
        .element(elements::Paragraph::new("Unitário").styled(style_bold))
        .element(elements::Paragraph::new("Total").styled(style_bold))
        .push()
        .map_err(render_error)?;

    for item in &detail.items {
        table
            .row()
            .element(elements::Paragraph::new(item.item_name.clone()))
            .element(elements::Paragraph::new(item.quantity.to_string()))
            .element(elements::Paragraph::new(format_brl(item.unit_price)))
            .element(elements::Paragraph::new(format_brl(item.total_price)))
            .push()
            .map_err(render_error)?;
    }

    doc.push(table);
    doc.push(elements::Break::new(2));

    // --- TOTAIS ---
    if !sale.discount.is_zero() {
        let mut subtotal = elements::Paragraph::new(format!("Subtotal: {}", format_brl(sale.total)));
        subtotal.set_alignment(genpdf::Alignment::Right);
        doc.push(subtotal);

        let mut discount = elements::Paragraph::new(format!("Desconto: -{}", format_brl(sale.discount)));
        discount.set_alignment(genpdf::Alignment::Right);
        doc.push(discount);
    }

    let mut total = elements::Paragraph::new(format!("TOTAL: {}", format_brl(sale.final_total)));
    total.set_alignment(genpdf::Alignment::Right);
    doc.push(total.styled(style::Style::new().bold().with_font_size(12)));

    // --- PIX (QR CODE) ---
    // QR com o texto da chave, não o payload EMV "copia e cola"
    if let Some(key) = settings.pix_key {
        doc.push(elements::Break::new(2));
        doc.push(elements::Paragraph::new("PAGAMENTO VIA PIX").styled(style::Style::new().bold().with_font_size(12)));
        doc.push(elements::Paragraph::new(format!("Chave: {}", key)));
        doc.push(elements::Break::new(1));

        let code = QrCode::new(key.as_bytes()).map_err(render_error)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(render_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(pdf_image);
    }

    // --- RODAPÉ ---
    if let Some(footer) = settings.receipt_footer {
        doc.push(elements::Break::new(2));
        doc.push(elements::Paragraph::new(footer).styled(style::Style::new().italic().with_font_size(8)));
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(render_error)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl_uses_comma_and_two_places() {
        assert_eq!(format_brl(Decimal::new(1050, 2)), "R$ 10,50");
        assert_eq!(format_brl(Decimal::from(7)), "R$ 7,00");
        assert_eq!(format_brl(Decimal::new(12345, 1)), "R$ 1234,50");
    }
}
