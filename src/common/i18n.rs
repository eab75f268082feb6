// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_LANG: &str = "pt";

/// Uma tradução registrada em tempo de compilação via `inventory::submit!`.
pub struct Translation {
    pub key: &'static str,
    pub lang: &'static str,
    pub text: &'static str,
}

impl Translation {
    pub const fn new(key: &'static str, lang: &'static str, text: &'static str) -> Self {
        Self { key, lang, text }
    }
}

inventory::collect!(Translation);

#[derive(Clone)]
pub struct I18nStore {
    // idioma -> chave -> texto
    messages: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
    // Fora de produção o corpo do erro 500 carrega o detalhe interno
    pub include_internal_details: bool,
}

impl I18nStore {
    pub fn from_registry(include_internal_details: bool) -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        for t in inventory::iter::<Translation> {
            messages.entry(t.lang).or_default().insert(t.key, t.text);
        }

        Self {
            messages: Arc::new(messages),
            include_internal_details,
        }
    }

    /// Busca no idioma pedido, depois no padrão, e por fim devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let lookup = |lang: &str| self.messages.get(lang).and_then(|m| m.get(key)).copied();
        let template = lookup(lang).or_else(|| lookup(DEFAULT_LANG)).unwrap_or(key);

        params.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
    }
}

// --- Mensagens de erro ---

inventory::submit! { Translation::new("error.validation", "pt", "Um ou mais campos são inválidos.") }
inventory::submit! { Translation::new("error.validation", "en", "One or more fields are invalid.") }
inventory::submit! { Translation::new("error.invalid_body", "pt", "O corpo da requisição é inválido.") }
inventory::submit! { Translation::new("error.invalid_body", "en", "The request body is invalid.") }
inventory::submit! { Translation::new("error.email_exists", "pt", "Este e-mail já está em uso.") }
inventory::submit! { Translation::new("error.email_exists", "en", "This e-mail is already in use.") }
inventory::submit! { Translation::new("error.invalid_credentials", "pt", "E-mail ou senha inválidos.") }
inventory::submit! { Translation::new("error.invalid_credentials", "en", "Invalid e-mail or password.") }
inventory::submit! { Translation::new("error.missing_token", "pt", "Token de autenticação ausente.") }
inventory::submit! { Translation::new("error.missing_token", "en", "Missing authentication token.") }
inventory::submit! { Translation::new("error.invalid_token", "pt", "Token de autenticação inválido ou expirado.") }
inventory::submit! { Translation::new("error.invalid_token", "en", "Invalid or expired authentication token.") }
inventory::submit! { Translation::new("error.forbidden", "pt", "Você não tem permissão para realizar esta ação.") }
inventory::submit! { Translation::new("error.forbidden", "en", "You are not allowed to perform this action.") }
inventory::submit! { Translation::new("error.inactive_user", "pt", "Usuário desativado. Procure o responsável pela empresa.") }
inventory::submit! { Translation::new("error.inactive_user", "en", "This user has been deactivated. Contact the company owner.") }
inventory::submit! { Translation::new("error.user_not_found", "pt", "Usuário não encontrado.") }
inventory::submit! { Translation::new("error.user_not_found", "en", "User not found.") }
inventory::submit! { Translation::new("error.not_found", "pt", "{entity} não encontrado(a).") }
inventory::submit! { Translation::new("error.not_found", "en", "{entity} not found.") }
inventory::submit! { Translation::new("error.reference_not_found", "pt", "{entity} não encontrado(a).") }
inventory::submit! { Translation::new("error.reference_not_found", "en", "{entity} not found.") }
inventory::submit! { Translation::new("error.insufficient_stock", "pt", "Estoque insuficiente para '{item}'. Disponível: {available}.") }
inventory::submit! { Translation::new("error.insufficient_stock", "en", "Insufficient stock for '{item}'. Available: {available}.") }
inventory::submit! { Translation::new("error.negative_stock", "pt", "A operação deixaria o estoque negativo ({resulting}).") }
inventory::submit! { Translation::new("error.negative_stock", "en", "The operation would make stock negative ({resulting}).") }
inventory::submit! { Translation::new("error.discount_exceeds_total", "pt", "O desconto não pode ser maior que o total da venda.") }
inventory::submit! { Translation::new("error.discount_exceeds_total", "en", "The discount cannot exceed the sale total.") }
inventory::submit! { Translation::new("error.has_dependents", "pt", "{entity} possui registros vinculados e não pode ser excluído(a).") }
inventory::submit! { Translation::new("error.has_dependents", "en", "{entity} has linked records and cannot be deleted.") }
inventory::submit! { Translation::new("error.duplicate_document", "pt", "Já existe um cliente com o documento '{document}'.") }
inventory::submit! { Translation::new("error.duplicate_document", "en", "A client with document '{document}' already exists.") }
inventory::submit! { Translation::new("error.category_exists", "pt", "A categoria '{name}' já existe.") }
inventory::submit! { Translation::new("error.category_exists", "en", "Category '{name}' already exists.") }
inventory::submit! { Translation::new("error.incompatible_category", "pt", "O tipo da categoria não é compatível com este lançamento.") }
inventory::submit! { Translation::new("error.incompatible_category", "en", "The category type is not compatible with this entry.") }
inventory::submit! { Translation::new("error.sale_entry_locked", "pt", "Receitas geradas por vendas não podem ser alteradas nem excluídas.") }
inventory::submit! { Translation::new("error.sale_entry_locked", "en", "Revenues generated by sales cannot be changed or deleted.") }
inventory::submit! { Translation::new("error.invalid_transition", "pt", "Não é permitido mudar a tarefa de {from} para {to}.") }
inventory::submit! { Translation::new("error.invalid_transition", "en", "Task cannot move from {from} to {to}.") }
inventory::submit! { Translation::new("error.invalid_period", "pt", "Período inválido: o mês deve estar entre 1 e 12.") }
inventory::submit! { Translation::new("error.invalid_period", "en", "Invalid period: month must be between 1 and 12.") }
inventory::submit! { Translation::new("error.owner_role_immutable", "pt", "O papel OWNER não pode ser concedido nem removido.") }
inventory::submit! { Translation::new("error.owner_role_immutable", "en", "The OWNER role cannot be granted or removed.") }
inventory::submit! { Translation::new("error.internal", "pt", "Ocorreu um erro inesperado.") }
inventory::submit! { Translation::new("error.internal", "en", "An unexpected error occurred.") }

// --- Nomes de entidades ---

inventory::submit! { Translation::new("entity.client", "pt", "Cliente") }
inventory::submit! { Translation::new("entity.client", "en", "Client") }
inventory::submit! { Translation::new("entity.product", "pt", "Produto") }
inventory::submit! { Translation::new("entity.product", "en", "Product") }
inventory::submit! { Translation::new("entity.category", "pt", "Categoria") }
inventory::submit! { Translation::new("entity.category", "en", "Category") }
inventory::submit! { Translation::new("entity.sale", "pt", "Venda") }
inventory::submit! { Translation::new("entity.sale", "en", "Sale") }
inventory::submit! { Translation::new("entity.revenue", "pt", "Receita") }
inventory::submit! { Translation::new("entity.revenue", "en", "Revenue") }
inventory::submit! { Translation::new("entity.expense", "pt", "Despesa") }
inventory::submit! { Translation::new("entity.expense", "en", "Expense") }
inventory::submit! { Translation::new("entity.task", "pt", "Tarefa") }
inventory::submit! { Translation::new("entity.task", "en", "Task") }
inventory::submit! { Translation::new("entity.user", "pt", "Usuário") }
inventory::submit! { Translation::new("entity.user", "en", "User") }
inventory::submit! { Translation::new("entity.company", "pt", "Empresa") }
inventory::submit! { Translation::new("entity.company", "en", "Company") }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_with_params() {
        let store = I18nStore::from_registry(false);
        let text = store.translate(
            "en",
            "error.insufficient_stock",
            &[("item", "Pen".to_string()), ("available", "2".to_string())],
        );
        assert_eq!(text, "Insufficient stock for 'Pen'. Available: 2.");
    }

    #[test]
    fn test_unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::from_registry(false);
        assert_eq!(
            store.translate("de", "error.forbidden", &[]),
            "Você não tem permissão para realizar esta ação."
        );
    }

    #[test]
    fn test_unknown_key_returns_key() {
        let store = I18nStore::from_registry(false);
        assert_eq!(store.translate("pt", "error.nope", &[]), "error.nope");
    }
}
