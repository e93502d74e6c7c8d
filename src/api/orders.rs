use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{parse_space, parse_user, AppState};
use crate::domain::{
    GroupId, MaterialId, Order, OrderItem, OrderStatus, RecipeId, Recipient,
};
use crate::engine::OrderDraft;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub user: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub space: String,
    pub recipient: RecipientDto,
    pub items: Vec<OrderItemDto>,
    pub total_amount: String,
    pub status: String,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecipientDto {
    Group { id: String, name: String },
    Person { name: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderItemDto {
    #[serde(rename_all = "camelCase")]
    Recipe {
        recipe_id: String,
        recipe_name: String,
        requested_qty: i64,
        batch_size: i64,
        crafts_needed: i64,
        actual_production: i64,
        surplus: i64,
        unit_price: String,
        total_price: String,
        materials: Vec<OrderItemMaterialDto>,
    },
    #[serde(rename_all = "camelCase")]
    Material {
        material_id: String,
        material_name: String,
        requested_qty: i64,
        unit_price: String,
        total_price: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemMaterialDto {
    pub material_id: String,
    pub material_name: String,
    pub quantity: i64,
}

impl OrderDto {
    fn from_order(order: &Order) -> Self {
        let recipient = match &order.recipient {
            Recipient::Group { id, name } => RecipientDto::Group {
                id: id.as_str().to_string(),
                name: name.clone(),
            },
            Recipient::Person { name } => RecipientDto::Person { name: name.clone() },
        };
        let items = order
            .items
            .iter()
            .map(|item| match item {
                OrderItem::Recipe {
                    recipe_id,
                    recipe_name,
                    requested_qty,
                    batch_size,
                    crafts_needed,
                    actual_production,
                    surplus,
                    unit_price,
                    total_price,
                    materials,
                } => OrderItemDto::Recipe {
                    recipe_id: recipe_id.as_str().to_string(),
                    recipe_name: recipe_name.clone(),
                    requested_qty: *requested_qty,
                    batch_size: *batch_size,
                    crafts_needed: *crafts_needed,
                    actual_production: *actual_production,
                    surplus: *surplus,
                    unit_price: unit_price.to_string(),
                    total_price: total_price.to_string(),
                    materials: materials
                        .iter()
                        .map(|m| OrderItemMaterialDto {
                            material_id: m.material_id.as_str().to_string(),
                            material_name: m.material_name.clone(),
                            quantity: m.quantity,
                        })
                        .collect(),
                },
                OrderItem::Material {
                    material_id,
                    material_name,
                    requested_qty,
                    unit_price,
                    total_price,
                } => OrderItemDto::Material {
                    material_id: material_id.as_str().to_string(),
                    material_name: material_name.clone(),
                    requested_qty: *requested_qty,
                    unit_price: unit_price.to_string(),
                    total_price: total_price.to_string(),
                },
            })
            .collect();

        OrderDto {
            id: order.id.clone(),
            space: order.space.as_str().to_string(),
            recipient,
            items,
            total_amount: order.total_amount.to_string(),
            status: order.status.as_str().to_string(),
            created_at: order.created_at.as_i64(),
            completed_at: order.completed_at.map(|t| t.as_i64()),
        }
    }
}

pub async fn get_orders(
    Query(params): Query<OrdersQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderDto>>, AppError> {
    let user = parse_user(&params.user)?;
    let status = match params.status.as_deref() {
        Some("") | None => None,
        Some(s) => Some(
            OrderStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("unknown status: {s}")))?,
        ),
    };
    let orders = state.repo.list_orders(&user, status).await?;
    Ok(Json(orders.iter().map(OrderDto::from_order).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecipientInput {
    Group { id: String },
    Person { name: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderItemInput {
    #[serde(rename_all = "camelCase")]
    Recipe {
        recipe_id: String,
        requested_qty: i64,
        /// Overrides the catalog unit price for this line when present.
        unit_price: Option<Decimal>,
    },
    #[serde(rename_all = "camelCase")]
    Material {
        material_id: String,
        requested_qty: i64,
        unit_price: Decimal,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOrderBody {
    pub user: String,
    pub space: String,
    pub recipient: RecipientInput,
    pub items: Vec<OrderItemInput>,
}

pub async fn post_order(
    State(state): State<AppState>,
    Json(body): Json<PostOrderBody>,
) -> Result<(StatusCode, Json<OrderDto>), AppError> {
    let user = parse_user(&body.user)?;
    let space = parse_space(&body.space)?;

    let recipient = match body.recipient {
        RecipientInput::Group { id } => {
            let group_id = GroupId::new(id);
            let group = state
                .repo
                .get_group(&group_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("group {}", group_id)))?;
            Recipient::Group {
                id: group.id,
                name: group.name,
            }
        }
        RecipientInput::Person { name } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::BadRequest(
                    "recipient name must not be empty".into(),
                ));
            }
            Recipient::Person { name }
        }
    };

    let mut draft = OrderDraft::new();
    for item in body.items {
        match item {
            OrderItemInput::Recipe {
                recipe_id,
                requested_qty,
                unit_price,
            } => {
                let recipe_id = RecipeId::new(recipe_id);
                let recipe = state
                    .repo
                    .get_recipe(&recipe_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("recipe {}", recipe_id)))?;
                let materials = state.repo.list_materials(recipe.space).await?;
                let names = move |id: &MaterialId| {
                    materials
                        .iter()
                        .find(|m| &m.id == id)
                        .map(|m| m.name.clone())
                        .unwrap_or_else(|| id.as_str().to_string())
                };
                draft.add_recipe_item(&recipe, requested_qty, &names)?;
                if let Some(price) = unit_price {
                    draft.update_item_price(draft.items().len() - 1, price)?;
                }
            }
            OrderItemInput::Material {
                material_id,
                requested_qty,
                unit_price,
            } => {
                let material_id = MaterialId::new(material_id);
                let material = state
                    .repo
                    .get_material(&material_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("material {}", material_id)))?;
                draft.add_material_item(&material, requested_qty, unit_price)?;
            }
        }
    }

    let order = draft.into_order(&user, space, recipient, state.now())?;
    state.repo.insert_order(&order).await?;
    Ok((StatusCode::CREATED, Json(OrderDto::from_order(&order))))
}

pub async fn complete_order(
    Path(order_id): Path<String>,
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<Json<OrderDto>, AppError> {
    let user = parse_user(&params.user)?;
    // The status guard makes a repeated completion a no-op.
    state.repo.complete_order(&user, &order_id, state.now()).await?;
    let order = state
        .repo
        .get_order(&user, &order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;
    Ok(Json(OrderDto::from_order(&order)))
}

pub async fn delete_order(
    Path(order_id): Path<String>,
    Query(params): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = parse_user(&params.user)?;
    if state.repo.delete_order(&user, &order_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("order {}", order_id)))
    }
}
