use anyhow::Context;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::checkout::SessionState;
use crate::entity::checkout_sessions::{
    ActiveModel, Column, Entity as CheckoutSessions, Model as SessionModel,
};

pub struct SessionStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SessionStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, session_id: &str, state: &SessionState) -> Result<SessionModel, DbErr> {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            session_id: Set(session_id.to_string()),
            status: Set(state.status().as_str().to_string()),
            currency: Set(state.currency()),
            line_items: Set(to_json(&state.line_items)?),
            buyer_info: Set(optional_json(state.buyer_info.as_ref())?),
            shipping_address: Set(state.shipping_address.clone()),
            payment_method: Set(state.payment_method.clone()),
            order_id: Set(state.order_id.clone()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(self.conn)
        .await
    }

    pub async fn find(&self, session_id: &str) -> Result<Option<SessionModel>, DbErr> {
        CheckoutSessions::find()
            .filter(Column::SessionId.eq(session_id))
            .one(self.conn)
            .await
    }

    /// Overwrite the mutable columns of a session that has no order yet.
    ///
    /// Zero rows affected means the session is unknown or was completed after
    /// `state` was loaded; a completed row is never rewritten.
    pub async fn save(&self, session_id: &str, state: &SessionState) -> Result<u64, DbErr> {
        let result = CheckoutSessions::update_many()
            .col_expr(Column::Status, Expr::value(state.status().as_str()))
            .col_expr(Column::Currency, Expr::value(state.currency()))
            .col_expr(Column::LineItems, Expr::value(to_json(&state.line_items)?))
            .col_expr(
                Column::BuyerInfo,
                Expr::value(optional_json(state.buyer_info.as_ref())?),
            )
            .col_expr(
                Column::ShippingAddress,
                Expr::value(state.shipping_address.clone()),
            )
            .col_expr(Column::PaymentMethod, Expr::value(state.payment_method.clone()))
            .col_expr(Column::OrderId, Expr::value(state.order_id.clone()))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::OrderId.is_null())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, DbErr> {
    serde_json::to_value(value).map_err(|e| DbErr::Custom(e.to_string()))
}

fn optional_json<T: serde::Serialize>(value: Option<&T>) -> Result<Option<Value>, DbErr> {
    value.map(to_json).transpose()
}

/// Rebuild the domain state from a stored row.
///
/// A row that no longer deserializes is a defect, not a storage outage.
pub fn state_from_model(model: &SessionModel) -> anyhow::Result<SessionState> {
    let line_items = serde_json::from_value(model.line_items.clone())
        .with_context(|| format!("corrupt line_items in session {}", model.session_id))?;
    let buyer_info = model
        .buyer_info
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .with_context(|| format!("corrupt buyer_info in session {}", model.session_id))?;
    Ok(SessionState {
        line_items,
        buyer_info,
        shipping_address: model.shipping_address.clone(),
        payment_method: model.payment_method.clone(),
        order_id: model.order_id.clone(),
    })
}
