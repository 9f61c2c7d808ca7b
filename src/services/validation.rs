// src/services/validation.rs

/// Quantidade exata de dígitos de um telefone válido.
pub const PHONE_DIGITS: usize = 11;

/// Normaliza o telefone: remove espaços, hífens e sinais de `+` em qualquer
/// posição. Só aceita se sobrarem exatamente 11 dígitos ASCII; qualquer outro
/// caractere rejeita a entrada inteira.
pub fn validate_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+'))
        .collect();

    if cleaned.len() == PHONE_DIGITS && cleaned.chars().all(|c| c.is_ascii_digit()) {
        Some(cleaned)
    } else {
        None
    }
}

/// Noites: só dígitos (sem sinal, sem espaços) e valor estritamente positivo.
pub fn validate_nights(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i32>().ok().filter(|nights| *nights > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_separators_are_stripped() {
        assert_eq!(validate_phone("15550001122").as_deref(), Some("15550001122"));
        assert_eq!(validate_phone("+1 555-000-1122").as_deref(), Some("15550001122"));
        assert_eq!(validate_phone("+1-555-000-11-22").as_deref(), Some("15550001122"));
        assert_eq!(validate_phone("  155 5000 1122 ").as_deref(), Some("15550001122"));
        assert_eq!(validate_phone("++15550001122").as_deref(), Some("15550001122"));
    }

    #[test]
    fn phone_with_wrong_length_is_rejected() {
        assert_eq!(validate_phone("+1-555-000-11"), None); // 9 dígitos
        assert_eq!(validate_phone("155500011223"), None); // 12 dígitos
        assert_eq!(validate_phone(""), None);
        assert_eq!(validate_phone(" - + "), None);
    }

    #[test]
    fn phone_with_other_characters_is_rejected_not_cleaned() {
        assert_eq!(validate_phone("(155)50001122"), None);
        assert_eq!(validate_phone("1555000112a"), None);
        assert_eq!(validate_phone("1555.000.1122"), None);
        // dígitos não ASCII não contam como dígito
        assert_eq!(validate_phone("1555000112٣"), None);
    }

    #[test]
    fn nights_must_be_a_positive_integer() {
        assert_eq!(validate_nights("2"), Some(2));
        assert_eq!(validate_nights("014"), Some(14));
        assert_eq!(validate_nights("0"), None);
        assert_eq!(validate_nights("-1"), None);
        assert_eq!(validate_nights("+3"), None);
        assert_eq!(validate_nights("2.5"), None);
        assert_eq!(validate_nights(" 2"), None);
        assert_eq!(validate_nights(""), None);
        assert_eq!(validate_nights("two"), None);
    }

    #[test]
    fn nights_beyond_i32_are_rejected() {
        assert_eq!(validate_nights("99999999999"), None);
    }
}
