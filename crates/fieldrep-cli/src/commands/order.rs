use std::path::Path;

use fieldrep_core::models::{Order, OrderItem, Product, StockDiscountReason};
use fieldrep_core::services::FieldDataService;
use fieldrep_core::RecordId;

use crate::commands::common::{normalize_identifier, open_service, parse_order_line};
use crate::error::CliError;

/// How an order's total is derived from its lines.
#[derive(Debug, Clone, PartialEq)]
pub enum Pricing {
    Standard,
    Discount { percentage: f64, reason_id: RecordId },
    FreeStock,
}

impl Pricing {
    /// Build from the `--discount`, `--reason` and `--free-stock` flags.
    pub fn from_args(
        discount: Option<f64>,
        reason: Option<&str>,
        free_stock: bool,
    ) -> Result<Self, CliError> {
        if free_stock {
            return Ok(Self::FreeStock);
        }
        match (discount, reason) {
            (Some(percentage), Some(reason)) => Ok(Self::Discount {
                percentage,
                reason_id: normalize_identifier(reason, "Discount reason ID")?,
            }),
            (Some(_), None) => Err(CliError::EmptyArgument("Discount reason ID")),
            (None, _) => Ok(Self::Standard),
        }
    }
}

pub async fn run_order(
    rep: &str,
    client: &str,
    visit: Option<&str>,
    lines: &[String],
    pricing: Pricing,
    db_path: &Path,
) -> Result<(), CliError> {
    let rep_id = normalize_identifier(rep, "Representative ID")?;
    let client_id = normalize_identifier(client, "Client ID")?;
    let visit_id = visit
        .map(|visit| normalize_identifier(visit, "Visit ID"))
        .transpose()?;

    let service = open_service(db_path).await?;
    let order = place_order(&service, rep_id, client_id, visit_id, lines, pricing).await?;
    if order.is_free_stock {
        println!("{} (free stock)", order.id);
    } else {
        println!("{} ({:.2})", order.id, order.total_amount);
    }
    Ok(())
}

/// Price each line from the local catalog and store the order with its lines.
///
/// A discount must name a locally stored reason whose ceiling covers it.
pub async fn place_order(
    service: &FieldDataService,
    rep_id: RecordId,
    client_id: RecordId,
    visit_id: Option<RecordId>,
    lines: &[String],
    pricing: Pricing,
) -> Result<Order, CliError> {
    if let Pricing::Discount {
        percentage,
        reason_id,
    } = &pricing
    {
        let Some(reason) = service.get::<StockDiscountReason>(reason_id).await? else {
            return Err(CliError::DiscountReasonNotFound(reason_id.to_string()));
        };
        if !reason.allows(*percentage) {
            return Err(CliError::DiscountNotAllowed {
                percentage: *percentage,
                reason: reason.reason,
                max: reason.max_discount_percentage,
            });
        }
    }

    let order_id = RecordId::new();
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let (product_id, quantity) = parse_order_line(line)?;
        let Some(product) = service.get::<Product>(&product_id).await? else {
            return Err(CliError::ProductNotFound(product_id.to_string()));
        };
        items.push(OrderItem::new(
            order_id.clone(),
            product.id,
            quantity,
            product.unit_price,
        ));
    }

    let mut order = Order::new(rep_id, client_id, visit_id, &items);
    order.id = order_id;
    order = match pricing {
        Pricing::Standard => order,
        Pricing::Discount {
            percentage,
            reason_id,
        } => order.with_discount(percentage, reason_id),
        Pricing::FreeStock => order.as_free_stock(),
    };
    service.save_order(&order, &items).await?;
    Ok(order)
}
