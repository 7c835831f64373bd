use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::checkout::{BuyerInfo, CheckoutStatus, Item, LineItem, LineItemInput, Message, SessionState};

/// Only line items seed a session; everything else arrives through updates.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub line_items: Vec<LineItemInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemView {
    pub id: String,
    pub item: Item,
    pub quantity: u32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[schema(value_type = f64)]
    pub total: Decimal,
}

impl From<&LineItem> for LineItemView {
    fn from(line: &LineItem) -> Self {
        Self {
            id: line.id.clone(),
            item: line.item.clone(),
            quantity: line.quantity,
            total: line.total(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Totals {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[schema(value_type = f64)]
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSessionView {
    pub id: String,
    pub status: CheckoutStatus,
    pub currency: String,
    pub line_items: Vec<LineItemView>,
    pub buyer_info: Option<BuyerInfo>,
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub payment_method: Option<Value>,
    pub totals: Totals,
    pub order_id: Option<String>,
    /// Merchant page the buyer is sent to once the session is completed.
    pub continue_url: Option<String>,
    pub messages: Vec<Message>,
}

impl CheckoutSessionView {
    pub fn new(session_id: &str, state: &SessionState) -> Self {
        let subtotal = state.subtotal();
        let status = state.status();
        Self {
            id: session_id.to_string(),
            status,
            currency: state.currency(),
            line_items: state.line_items.iter().map(LineItemView::from).collect(),
            buyer_info: state.buyer_info.clone(),
            shipping_address: state.shipping_address.clone(),
            payment_method: state.payment_method.clone(),
            totals: Totals {
                subtotal,
                total: subtotal,
            },
            order_id: state.order_id.clone(),
            continue_url: match status {
                CheckoutStatus::Completed => state.continue_url().map(str::to_string),
                _ => None,
            },
            messages: state.messages(),
        }
    }
}
