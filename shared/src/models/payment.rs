//! Payment method shared by sales and expenses

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    #[serde(alias = "efectivo")]
    Cash,
    #[serde(alias = "tarjeta")]
    Card,
    #[serde(alias = "transferencia")]
    Transfer,
    #[serde(alias = "otro")]
    Other,
}
