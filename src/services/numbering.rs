// src/services/numbering.rs

// Numeração sequencial dos documentos. Devis e faturas têm contadores
// independentes: devis "N°001", "N°002"...; faturas "001", "002"...

pub const QUOTE_PREFIX: &str = "N°";
pub const FIRST_SEQUENCE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Quote,
    Invoice,
}

impl DocumentKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Quote => QUOTE_PREFIX,
            DocumentKind::Invoice => "",
        }
    }
}

pub fn format_number(kind: DocumentKind, sequence: u32) -> String {
    format!("{}{:03}", kind.prefix(), sequence)
}

/// Extrai a parte numérica de um número já emitido.
pub fn parse_sequence(kind: DocumentKind, number: &str) -> Option<u32> {
    let digits = match kind {
        DocumentKind::Quote => number.replace(QUOTE_PREFIX, ""),
        DocumentKind::Invoice => number.to_string(),
    };
    digits.trim().parse::<u32>().ok()
}

/// Próximo número a partir do último documento criado do mesmo tipo.
///
/// Sem documento anterior, ou se o número anterior não for legível,
/// a sequência recomeça em 001 (sem erro).
pub fn next_number(kind: DocumentKind, previous: Option<&str>) -> String {
    let next = previous
        .and_then(|number| parse_sequence(kind, number))
        .and_then(|sequence| sequence.checked_add(1))
        .unwrap_or(FIRST_SEQUENCE);

    format_number(kind, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_numbers() {
        assert_eq!(next_number(DocumentKind::Quote, None), "N°001");
        assert_eq!(next_number(DocumentKind::Invoice, None), "001");
    }

    #[test]
    fn increments_the_previous_number() {
        assert_eq!(next_number(DocumentKind::Quote, Some("N°007")), "N°008");
        assert_eq!(next_number(DocumentKind::Invoice, Some("041")), "042");
        assert_eq!(next_number(DocumentKind::Quote, Some("N°999")), "N°1000");
    }

    #[test]
    fn unparseable_numbers_restart_the_sequence() {
        assert_eq!(next_number(DocumentKind::Quote, Some("N°ABC")), "N°001");
        assert_eq!(next_number(DocumentKind::Invoice, Some("F-2024-01")), "001");
        assert_eq!(next_number(DocumentKind::Invoice, Some("")), "001");
        // Prefixo de devis não é aceito na numeração de faturas
        assert_eq!(next_number(DocumentKind::Invoice, Some("N°004")), "001");
    }

    #[test]
    fn numbering_is_strictly_increasing() {
        for kind in [DocumentKind::Quote, DocumentKind::Invoice] {
            let mut current = next_number(kind, None);
            for _ in 0..1200 {
                let next = next_number(kind, Some(&current));
                let a = parse_sequence(kind, &current).unwrap();
                let b = parse_sequence(kind, &next).unwrap();
                assert!(b > a, "{} -> {}", current, next);
                current = next;
            }
        }
    }
}
