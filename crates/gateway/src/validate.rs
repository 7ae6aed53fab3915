//! Precondition checks for each action.
//!
//! Checks run in a fixed order and stop at the first failure, so the message a
//! caller sees is always the earliest problem. Submission is checked in two
//! steps because the recipient is looked up by the order's phone number:
//!
//! 1. order exists
//! 2. order has items
//! 3. order has a phone number
//! 4. order has not been submitted
//! 5. recipient has name, city and district
//! 6. order has an address

use shipgate_core::{Customer, Order, ShipmentLabel};
use thiserror::Error;

/// A failed precondition. The display text is what callers see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Order not found!")]
    OrderNotFound,
    #[error("Order Empty!")]
    EmptyOrder,
    #[error("Phone Empty!")]
    MissingPhone,
    #[error("Already Submit!")]
    AlreadySubmitted,
    #[error("Name Empty!")]
    MissingName,
    #[error("City Empty!")]
    MissingCity,
    #[error("District Empty!")]
    MissingDistrict,
    #[error("Address Empty!")]
    MissingAddress,
    #[error("Order Not Submit!")]
    NotSubmitted,
}

/// Step 1: the order lookup found something.
///
/// # Errors
///
/// Returns `OrderNotFound` for `None`.
pub fn order_found(order: Option<Order>) -> Result<Order, ValidationError> {
    order.ok_or(ValidationError::OrderNotFound)
}

/// Steps 2-4.
///
/// # Errors
///
/// Returns the first failing check.
pub fn check_submittable(order: &Order) -> Result<(), ValidationError> {
    if order.items.is_empty() {
        return Err(ValidationError::EmptyOrder);
    }
    if order.phone.is_empty() {
        return Err(ValidationError::MissingPhone);
    }
    if order.is_submitted() {
        return Err(ValidationError::AlreadySubmitted);
    }
    Ok(())
}

/// Steps 5-6. The ward is not required.
///
/// # Errors
///
/// Returns the first failing check.
pub fn check_recipient(customer: &Customer, order: &Order) -> Result<(), ValidationError> {
    if customer.name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if customer.city.is_empty() {
        return Err(ValidationError::MissingCity);
    }
    if customer.district.is_empty() {
        return Err(ValidationError::MissingDistrict);
    }
    if order.address.is_empty() {
        return Err(ValidationError::MissingAddress);
    }
    Ok(())
}

/// Print and cancel need a carrier label.
///
/// # Errors
///
/// Returns `NotSubmitted` if the order has no shipment code.
pub fn check_submitted(order: &Order) -> Result<&ShipmentLabel, ValidationError> {
    if order.is_submitted() {
        Ok(&order.shipment_code)
    } else {
        Err(ValidationError::NotSubmitted)
    }
}

/// Fee quotes only need items and a destination; nothing is mutated.
///
/// # Errors
///
/// Returns the first failing check.
pub fn check_quotable(order: &Order) -> Result<(), ValidationError> {
    if order.items.is_empty() {
        return Err(ValidationError::EmptyOrder);
    }
    if order.city.is_empty() {
        return Err(ValidationError::MissingCity);
    }
    if order.district.is_empty() {
        return Err(ValidationError::MissingDistrict);
    }
    Ok(())
}
