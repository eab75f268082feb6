// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,

    #[schema(example = "João da Silva")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    // Pessoa física ou jurídica. Únicos por empresa quando preenchidos.
    #[schema(example = "123.456.789-00")]
    pub cpf: Option<String>,
    pub cnpj: Option<String>,

    pub address: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Usado tanto no POST quanto no PUT (substituição completa)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,

    #[validate(length(min = 11, max = 14, message = "CPF inválido."))]
    pub cpf: Option<String>,
    #[validate(length(min = 14, max = 18, message = "CNPJ inválido."))]
    pub cnpj: Option<String>,

    pub address: Option<String>,
    pub notes: Option<String>,
}

impl ClientPayload {
    /// Strings vazias viram NULL, senão o índice único trataria "" como documento.
    pub fn normalized(mut self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        self.name = self.name.trim().to_string();
        self.email = clean(self.email);
        self.phone = clean(self.phone);
        self.cpf = clean(self.cpf);
        self.cnpj = clean(self.cnpj);
        self.address = clean(self.address);
        self.notes = clean(self.notes);
        self
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ClientQuery {
    /// Busca por nome, e-mail, CPF ou CNPJ
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ClientPayload {
        ClientPayload {
            name: "  Ana  ".into(),
            email: Some("".into()),
            phone: None,
            cpf: Some(" 123.456.789-00 ".into()),
            cnpj: Some("   ".into()),
            address: None,
            notes: None,
        }
    }

    #[test]
    fn test_normalized_drops_blank_documents() {
        let p = payload().normalized();
        assert_eq!(p.name, "Ana");
        assert_eq!(p.email, None);
        assert_eq!(p.cpf.as_deref(), Some("123.456.789-00"));
        assert_eq!(p.cnpj, None);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut p = payload().normalized();
        p.name = String::new();
        assert!(p.validate().unwrap_err().field_errors().contains_key("name"));
    }
}
