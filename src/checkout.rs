//! Checkout negotiation rules.
//!
//! A session's status is never stored as truth. [`compute_status`] derives it
//! from which fields are populated, and `completed` is only reachable through
//! [`SessionState::complete`], after which every mutation is refused.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::ingest::{DEFAULT_CURRENCY, validate::max_price};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    Incomplete,
    ReadyForComplete,
    Completed,
}

impl CheckoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStatus::Incomplete => "incomplete",
            CheckoutStatus::ReadyForComplete => "ready_for_complete",
            CheckoutStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The agent can usually fill the gap itself.
    Recoverable,
    /// Only the buyer can provide this.
    RequiresBuyerInput,
    Unrecoverable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
    pub path: String,
    pub content: String,
    pub severity: Severity,
}

impl Message {
    pub fn error(
        code: &str,
        path: impl Into<String>,
        content: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            kind: "error".to_string(),
            code: code.to_string(),
            path: path.into(),
            content: content.into(),
            severity,
        }
    }
}

/// Price and title snapshot of a product at the moment it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Merchant page where the purchase is finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub id: String,
    pub item: Item,
    pub quantity: u32,
}

impl LineItem {
    pub fn total(&self) -> Decimal {
        self.item.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ItemInput {
    pub id: Option<String>,
    pub title: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LineItemInput {
    #[serde(default)]
    pub item: ItemInput,
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BuyerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl BuyerInfo {
    fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// Partial update. Absent and `null` fields both mean "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SessionPatch {
    pub line_items: Option<Vec<LineItemInput>>,
    pub buyer_info: Option<BuyerInfo>,
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub payment_method: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub line_items: Vec<LineItem>,
    pub buyer_info: Option<BuyerInfo>,
    pub shipping_address: Option<Value>,
    pub payment_method: Option<Value>,
    pub order_id: Option<String>,
}

impl SessionState {
    /// Seed a new session from line items alone.
    pub fn create(line_items: &[LineItemInput]) -> Result<Self, Vec<Message>> {
        Ok(Self {
            line_items: validate_line_items(line_items)?,
            buyer_info: None,
            shipping_address: None,
            payment_method: None,
            order_id: None,
        })
    }

    pub fn status(&self) -> CheckoutStatus {
        compute_status(self)
    }

    pub fn currency(&self) -> String {
        self.line_items
            .first()
            .and_then(|li| li.item.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
    }

    pub fn subtotal(&self) -> Decimal {
        self.line_items.iter().map(LineItem::total).sum()
    }

    /// Messages describing what still blocks completion.
    pub fn messages(&self) -> Vec<Message> {
        if self.order_id.is_some() {
            return Vec::new();
        }
        missing_fields(self)
    }

    pub fn apply(&mut self, patch: SessionPatch) -> Result<(), Vec<Message>> {
        if self.order_id.is_some() {
            return Err(vec![completed_message()]);
        }
        // Validate before touching anything so a rejected patch leaves no trace.
        let line_items = match &patch.line_items {
            Some(inputs) => Some(validate_line_items(inputs)?),
            None => None,
        };
        if let Some(line_items) = line_items {
            self.line_items = line_items;
        }
        if let Some(buyer_info) = patch.buyer_info {
            self.buyer_info = Some(buyer_info);
        }
        if let Some(address) = patch.shipping_address.filter(is_present) {
            self.shipping_address = Some(address);
        }
        if let Some(method) = patch.payment_method.filter(is_present) {
            self.payment_method = Some(method);
        }
        Ok(())
    }

    /// Assign an order id. Returns it on success.
    pub fn complete(&mut self) -> Result<String, Vec<Message>> {
        match self.status() {
            CheckoutStatus::Completed => Err(vec![completed_message()]),
            CheckoutStatus::Incomplete => Err(missing_fields(self)),
            CheckoutStatus::ReadyForComplete => {
                let order_id = build_order_number(Uuid::new_v4());
                self.order_id = Some(order_id.clone());
                Ok(order_id)
            }
        }
    }

    /// Where the agent sends the buyer to finish on the merchant's storefront.
    pub fn continue_url(&self) -> Option<&str> {
        self.line_items
            .iter()
            .find_map(|li| li.item.url.as_deref())
    }
}

pub fn compute_status(state: &SessionState) -> CheckoutStatus {
    if state.order_id.is_some() {
        return CheckoutStatus::Completed;
    }
    if missing_fields(state).is_empty() {
        CheckoutStatus::ReadyForComplete
    } else {
        CheckoutStatus::Incomplete
    }
}

fn missing_fields(state: &SessionState) -> Vec<Message> {
    let mut messages = Vec::new();
    if state.buyer_info.as_ref().and_then(BuyerInfo::email).is_none() {
        messages.push(Message::error(
            "missing",
            "$.buyer_info.email",
            "Buyer email is required",
            Severity::Recoverable,
        ));
    }
    if state.shipping_address.is_none() {
        messages.push(Message::error(
            "missing",
            "$.shipping_address",
            "Shipping address is required",
            Severity::RequiresBuyerInput,
        ));
    }
    if state.payment_method.is_none() {
        messages.push(Message::error(
            "missing",
            "$.payment_method",
            "Payment method is required",
            Severity::RequiresBuyerInput,
        ));
    }
    messages
}

/// The refusal every mutation of a completed session gets.
pub fn completed_message() -> Message {
    Message::error(
        "session_completed",
        "$",
        "Checkout session is already completed",
        Severity::Unrecoverable,
    )
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => map.values().any(|v| !v.is_null()),
        Value::Array(items) => !items.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

pub fn validate_line_items(inputs: &[LineItemInput]) -> Result<Vec<LineItem>, Vec<Message>> {
    if inputs.is_empty() {
        return Err(vec![Message::error(
            "invalid",
            "$.line_items",
            "At least one line item is required",
            Severity::Recoverable,
        )]);
    }

    let mut messages = Vec::new();
    let mut line_items = Vec::with_capacity(inputs.len());
    let mut session_currency: Option<String> = None;

    for (index, input) in inputs.iter().enumerate() {
        let path = format!("$.line_items[{index}]");
        let before = messages.len();
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let id = text(&input.item.id);
        if id.is_none() {
            messages.push(invalid(&path, "item.id", "Item id is required"));
        }
        let title = text(&input.item.title);
        if title.is_none() {
            messages.push(invalid(&path, "item.title", "Item title is required"));
        }
        match input.item.price {
            None => messages.push(invalid(&path, "item.price", "Item price is required")),
            Some(price) if price.is_sign_negative() && !price.is_zero() => messages.push(invalid(
                &path,
                "item.price",
                "Item price must be non-negative",
            )),
            Some(price) if price.round_dp(2) >= max_price() => messages.push(invalid(
                &path,
                "item.price",
                format!("Item price must be below {}", max_price()),
            )),
            Some(_) => {}
        }
        let quantity = match input.quantity {
            Some(q) if q >= 1 && q <= i64::from(u32::MAX) => Some(q as u32),
            _ => {
                messages.push(invalid(
                    &path,
                    "quantity",
                    "Quantity must be a positive integer",
                ));
                None
            }
        };
        let currency = text(&input.item.currency).map(|c| c.to_ascii_uppercase());
        if let Some(currency) = &currency {
            match &session_currency {
                Some(existing) if existing != currency => messages.push(invalid(
                    &path,
                    "item.currency",
                    format!("All line items must use {existing}"),
                )),
                Some(_) => {}
                None => session_currency = Some(currency.clone()),
            }
        }

        if messages.len() > before {
            continue;
        }
        if let (Some(id), Some(title), Some(price), Some(quantity)) =
            (id, title, input.item.price, quantity)
        {
            line_items.push(LineItem {
                id: format!("li_{}", index + 1),
                item: Item {
                    id,
                    title,
                    price: price.round_dp(2),
                    currency,
                    image_url: text(&input.item.image_url),
                    url: text(&input.item.url),
                },
                quantity,
            });
        }
    }

    if messages.is_empty() {
        Ok(line_items)
    } else {
        Err(messages)
    }
}

fn invalid(path: &str, field: &str, content: impl Into<String>) -> Message {
    Message::error(
        "invalid",
        format!("{path}.{field}"),
        content,
        Severity::Recoverable,
    )
}

fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    let short = suffix.get(..8).unwrap_or(&suffix);
    format!("ORD-{}-{}", date, short.to_uppercase())
}
