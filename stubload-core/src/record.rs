//! The motor customer record published to the submission topic.
//!
//! Records only exist fully built; see [crate::materializer] for how they are made. Field names
//! on the wire are camelCase and match the source columns, decimals are written as JSON strings
//! so no precision is lost in transit.
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorCustomer {
    pub reference: String,
    pub web_reference: String,
    pub email: String,
    pub title: Option<String>,
    pub first_name: String,
    pub surname: String,
    pub address: Address,
    pub phone: Option<String>,
    pub brand: Brand,
    pub active: bool,
    pub payment_type: PaymentType,
    pub premium: Premium,
    pub finance: Finance,
    pub vehicle: Vehicle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub house_number: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub address_line4: Option<String>,
    pub postcode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Premium {
    pub total_selling_price: Decimal,
    pub nett_premium: Decimal,
    pub gross_premium: Decimal,
    pub outstanding_balance: Decimal,
    pub card_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finance {
    pub deposit: Decimal,
    pub interest: Decimal,
    pub apr: Decimal,
    pub total_number_of_installments: i32,
    pub monthly_installment_amount: Decimal,
    pub total_installment_amount: Decimal,
    pub finance_provider: Option<String>,
    pub bank_sort_code: Option<String>,
    pub bank_account_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub vehicle_registration: String,
    pub make: String,
    pub model: String,
}

/// How the policy is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    Annual,
    Monthly,
}

impl PaymentType {
    /// Case-insensitive match on the variant name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "annual" => Some(PaymentType::Annual),
            "monthly" => Some(PaymentType::Monthly),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentType::Annual => write!(f, "Annual"),
            PaymentType::Monthly => write!(f, "Monthly"),
        }
    }
}

/// Trading brand the customer bought through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Brand {
    Core,
    Plus,
    Premier,
    Essentials,
}

impl Brand {
    /// Case-insensitive match on the variant name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "core" => Some(Brand::Core),
            "plus" => Some(Brand::Plus),
            "premier" => Some(Brand::Premier),
            "essentials" => Some(Brand::Essentials),
            _ => None,
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Brand::Core => write!(f, "Core"),
            Brand::Plus => write!(f, "Plus"),
            Brand::Premier => write!(f, "Premier"),
            Brand::Essentials => write!(f, "Essentials"),
        }
    }
}
