//! CreateOrderHandler - Issues a gateway order for a course purchase.
//!
//! Nothing is written until the gateway accepts the order. The discount is
//! consumed next, then the pending enrollment is opened. Enrollment is
//! granted later by reconciliation, never here.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::checkout::{CheckoutError, PriceQuote};
use crate::domain::coupon::CouponCode;
use crate::domain::enrollment::{Enrollment, PendingOrder};
use crate::domain::foundation::{CourseId, UserId};
use crate::domain::payment::note_keys;
use crate::domain::referral::ReferralCode;
use crate::ports::{
    CourseCatalog, CreateOrderRequest, EnrollmentRepository, GatewayOrder, OpenPendingOutcome,
    PaymentGateway,
};

use super::DiscountResolver;

#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub coupon_code: Option<CouponCode>,
    pub referral_code: Option<ReferralCode>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderResult {
    pub order: GatewayOrder,

    /// Publishable key the checkout widget needs.
    pub key_id: String,

    pub course_title: String,
    pub quote: PriceQuote,
    pub enrollment: Enrollment,
}

pub struct CreateOrderHandler {
    catalog: Arc<dyn CourseCatalog>,
    enrollments: Arc<dyn EnrollmentRepository>,
    discounts: Arc<DiscountResolver>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CreateOrderHandler {
    pub fn new(
        catalog: Arc<dyn CourseCatalog>,
        enrollments: Arc<dyn EnrollmentRepository>,
        discounts: Arc<DiscountResolver>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            catalog,
            enrollments,
            discounts,
            gateway,
        }
    }

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<CreateOrderResult, CheckoutError> {
        // 1. Stacked discounts are a malformed request
        if cmd.coupon_code.is_some() && cmd.referral_code.is_some() {
            return Err(CheckoutError::validation(
                "discount",
                "coupon and referral discounts cannot be combined",
            ));
        }

        // 2. Course must exist and be on sale
        let course = self
            .catalog
            .find_course(&cmd.course_id)
            .await?
            .filter(|c| c.is_purchasable())
            .ok_or_else(|| CheckoutError::course_not_found(cmd.course_id))?;

        // 3. No second purchase of a paid course
        if let Some(existing) = self
            .enrollments
            .find_by_user_and_course(&cmd.user_id, &cmd.course_id)
            .await?
        {
            if existing.is_enrolled() {
                return Err(CheckoutError::already_enrolled(cmd.course_id));
            }
        }

        // 4. Price it
        let quote = self
            .discounts
            .quote(
                &course,
                &cmd.user_id,
                cmd.coupon_code.as_ref(),
                cmd.referral_code.as_ref(),
            )
            .await?;

        // 5. Ask the gateway for an order; nothing is persisted on failure
        let order = self
            .gateway
            .create_order(CreateOrderRequest {
                amount: quote.price.clone(),
                receipt: receipt(),
                notes: order_notes(&cmd.user_id, &cmd.course_id, &quote),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %cmd.user_id,
                    course_id = %cmd.course_id,
                    error = %e,
                    "Gateway order creation failed"
                );
                CheckoutError::gateway(e.message)
            })?;

        // 6. Consume the discount
        self.discounts.commit(&quote, &cmd.user_id).await?;

        // 7. Record the pending enrollment
        let pending = PendingOrder {
            gateway_order_id: order.id.clone(),
            amount: quote.price.clone(),
        };
        let enrollment = match self
            .enrollments
            .open_pending(&cmd.user_id, &cmd.course_id, pending)
            .await?
        {
            OpenPendingOutcome::Opened(enrollment) => enrollment,
            OpenPendingOutcome::AlreadyEnrolled(existing) if existing.belongs_to_order(&order.id) => {
                existing
            }
            OpenPendingOutcome::AlreadyEnrolled(_) => {
                tracing::warn!(
                    user_id = %cmd.user_id,
                    course_id = %cmd.course_id,
                    order_id = %order.id,
                    "Enrollment activated by a concurrent payment while issuing order"
                );
                return Err(CheckoutError::already_enrolled(cmd.course_id));
            }
        };

        tracing::info!(
            user_id = %cmd.user_id,
            course_id = %cmd.course_id,
            order_id = %order.id,
            amount = quote.price.amount_minor(),
            currency = %quote.price.currency().as_str(),
            discount_percent = quote.discount_percent(),
            "Checkout order issued"
        );

        Ok(CreateOrderResult {
            order,
            key_id: self.gateway.public_key_id(),
            course_title: course.title,
            quote,
            enrollment,
        })
    }
}

/// Gateway receipts are limited to 40 characters.
fn receipt() -> String {
    format!("rcpt_{}", uuid::Uuid::new_v4().simple())
}

fn order_notes(user_id: &UserId, course_id: &CourseId, quote: &PriceQuote) -> BTreeMap<String, String> {
    let mut notes = BTreeMap::new();
    notes.insert(note_keys::USER_ID.to_string(), user_id.to_string());
    notes.insert(note_keys::COURSE_ID.to_string(), course_id.to_string());
    if let Some(code) = quote.applied_coupon() {
        notes.insert(note_keys::COUPON_CODE.to_string(), code.to_string());
    }
    if let Some(referrer) = quote.referrer() {
        notes.insert(note_keys::REFERRER_ID.to_string(), referrer.to_string());
    }
    notes
}
