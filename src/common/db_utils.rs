// src/common/db_utils.rs

// ---
// Helpers para interpretar erros do Postgres
// ---

/// Retorna o nome da constraint quando o erro é uma violação de unicidade.
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

/// Violação de chave estrangeira (ex: DELETE de uma categoria ainda referenciada).
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}
