//! Order status reported by the backend.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The backend owns order state transitions; the client only displays them.
/// Statuses the client does not know about deserialize as [`Self::Unknown`]
/// rather than failing the whole order fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Human-readable label for the confirmation view.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Confirmed => "Confirmado",
            Self::Processing => "Processando",
            Self::Shipped => "Enviado",
            Self::Delivered => "Entregue",
            Self::Cancelled => "Cancelado",
            Self::Unknown => "Desconhecido",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format_is_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
    }

    #[test]
    fn test_unknown_status_falls_back() {
        let status: OrderStatus = serde_json::from_str("\"backordered\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
        assert_eq!(status.label(), "Desconhecido");
    }

    #[test]
    fn test_round_trip_all_known_statuses() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: OrderStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }
}
