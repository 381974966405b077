use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{entity::enums::RefundStatus, models::Refund, routes::params::Pagination};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateRefundRequest {
    pub order_id: Uuid,
    #[validate(length(min = 5, max = 2000))]
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRefundRequest {
    pub status: RefundStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefundListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<RefundStatus>,
}

impl RefundListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefundList {
    pub items: Vec<Refund>,
}
