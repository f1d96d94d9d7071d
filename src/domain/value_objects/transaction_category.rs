use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    Educacao,
    Saude,
    Moradia,
    Alimentacao,
    Transporte,
    Lazer,
    Vestuario,
    Servicos,
    Impostos,
    Outros,
}

impl TransactionCategory {
    pub const ALL: [TransactionCategory; 10] = [
        TransactionCategory::Educacao,
        TransactionCategory::Saude,
        TransactionCategory::Moradia,
        TransactionCategory::Alimentacao,
        TransactionCategory::Transporte,
        TransactionCategory::Lazer,
        TransactionCategory::Vestuario,
        TransactionCategory::Servicos,
        TransactionCategory::Impostos,
        TransactionCategory::Outros,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::Educacao => "educacao",
            TransactionCategory::Saude => "saude",
            TransactionCategory::Moradia => "moradia",
            TransactionCategory::Alimentacao => "alimentacao",
            TransactionCategory::Transporte => "transporte",
            TransactionCategory::Lazer => "lazer",
            TransactionCategory::Vestuario => "vestuario",
            TransactionCategory::Servicos => "servicos",
            TransactionCategory::Impostos => "impostos",
            TransactionCategory::Outros => "outros",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == needle)
    }

    /// Model output outside the closed list falls back to `outros`.
    pub fn normalize(s: Option<&str>) -> Self {
        s.and_then(Self::parse).unwrap_or(TransactionCategory::Outros)
    }

    pub fn joined() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known() {
        assert_eq!(TransactionCategory::parse("saude"), Some(TransactionCategory::Saude));
        assert_eq!(TransactionCategory::parse(" Educacao "), Some(TransactionCategory::Educacao));
        assert_eq!(TransactionCategory::parse("academia"), None);
    }

    #[test]
    fn test_normalize_falls_back_to_outros() {
        assert_eq!(TransactionCategory::normalize(Some("academia")), TransactionCategory::Outros);
        assert_eq!(TransactionCategory::normalize(None), TransactionCategory::Outros);
        assert_eq!(TransactionCategory::normalize(Some("lazer")), TransactionCategory::Lazer);
    }

    #[test]
    fn test_joined_lists_all() {
        let joined = TransactionCategory::joined();
        assert!(joined.starts_with("educacao, saude"));
        assert!(joined.ends_with("outros"));
    }
}
