// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    #[schema(ignore)] // O token já define a empresa
    pub company_id: Uuid,

    // Categoria usada na receita gerada por cada venda
    pub default_sales_category_id: Option<Uuid>,

    #[schema(example = "12.345.678/0001-99")]
    pub pix_key: Option<String>,

    #[schema(example = "Obrigado pela preferência!")]
    pub receipt_footer: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub default_sales_category_id: Option<Uuid>,

    #[schema(example = "chave@pix.com.br")]
    pub pix_key: Option<String>,

    pub receipt_footer: Option<String>,
}
