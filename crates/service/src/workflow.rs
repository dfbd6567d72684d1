//! Status transition rules for orders, service requests, job sheets and ratings.
//!
//! Everything here is pure so handlers, the technician dashboard and the admin
//! surface share one set of gates and one set of error messages.

use chrono::NaiveTime;
use models::{ApprovalStatus, OrderStatus, ServiceStatus};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Flat fee charged for a service request that is not covered by an AMC plan.
pub const SERVICE_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// A service request may be completed only once its job sheet is approved.
pub fn ensure_service_completable(
    status: ServiceStatus,
    job_sheet: Option<ApprovalStatus>,
) -> Result<(), ServiceError> {
    match status {
        ServiceStatus::Completed => {
            return Err(ServiceError::invalid_state("Service already marked as completed"))
        }
        ServiceStatus::Cancelled => {
            return Err(ServiceError::invalid_state("Cancelled service requests cannot be completed"))
        }
        _ => {}
    }
    match job_sheet {
        None => Err(ServiceError::invalid_state(
            "Cannot complete service. Please create a job sheet first.",
        )),
        Some(ApprovalStatus::Pending) => Err(ServiceError::invalid_state(
            "Cannot complete service. Job sheet is pending customer approval.",
        )),
        Some(ApprovalStatus::Declined) => Err(ServiceError::invalid_state(
            "Cannot complete service. Job sheet was declined by customer.",
        )),
        Some(ApprovalStatus::Approved) => Ok(()),
    }
}

/// Approve and decline only act on a sheet still awaiting the customer.
pub fn ensure_job_sheet_pending(status: ApprovalStatus) -> Result<(), ServiceError> {
    if status != ApprovalStatus::Pending {
        return Err(ServiceError::invalid_state(format!(
            "Job sheet already {}",
            status.as_str().to_lowercase()
        )));
    }
    Ok(())
}

/// Only PENDING and PROCESSING orders can be cancelled.
pub fn ensure_order_cancellable(status: OrderStatus) -> Result<(), ServiceError> {
    match status {
        OrderStatus::Pending | OrderStatus::Processing => Ok(()),
        _ => Err(ServiceError::invalid_state("Order cannot be cancelled")),
    }
}

/// Confirmation takes stock once; it is refused after cancellation or shipping.
pub fn ensure_order_confirmable(status: OrderStatus, stock_reserved: bool) -> Result<(), ServiceError> {
    if stock_reserved {
        return Err(ServiceError::invalid_state("Order already confirmed"));
    }
    match status {
        OrderStatus::Pending | OrderStatus::Processing => Ok(()),
        _ => Err(ServiceError::invalid_state(format!(
            "Order cannot be confirmed while {}",
            status.as_str().to_lowercase()
        ))),
    }
}

pub fn ensure_order_deliverable(status: OrderStatus) -> Result<(), ServiceError> {
    match status {
        OrderStatus::Delivered => Err(ServiceError::invalid_state("Order already marked as delivered")),
        OrderStatus::Cancelled => Err(ServiceError::invalid_state("Cancelled orders cannot be delivered")),
        _ => Ok(()),
    }
}

/// DELIVERED and CANCELLED are final; staff cannot move an order out of them.
pub fn ensure_order_status_editable(status: OrderStatus) -> Result<(), ServiceError> {
    match status {
        OrderStatus::Delivered => Err(ServiceError::invalid_state("Delivered orders cannot change status")),
        OrderStatus::Cancelled => Err(ServiceError::invalid_state("Cancelled orders cannot change status")),
        _ => Ok(()),
    }
}

pub fn status_after_order_assignment(status: OrderStatus) -> OrderStatus {
    match status {
        OrderStatus::Pending => OrderStatus::Processing,
        other => other,
    }
}

pub fn status_after_service_assignment(status: ServiceStatus) -> ServiceStatus {
    match status {
        ServiceStatus::Submitted => ServiceStatus::Assigned,
        other => other,
    }
}

/// Which job a rating is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTarget {
    Order(Uuid),
    ServiceRequest(Uuid),
}

pub fn ensure_rating_value(rating: Option<i64>) -> Result<i16, ServiceError> {
    match rating {
        Some(r @ 1..=5) => Ok(r as i16),
        _ => Err(ServiceError::validation("Valid rating (1-5) is required")),
    }
}

pub fn resolve_rating_target(
    order_id: Option<Uuid>,
    service_request_id: Option<Uuid>,
) -> Result<RatingTarget, ServiceError> {
    match (order_id, service_request_id) {
        (None, None) => Err(ServiceError::validation(
            "Either order_id or service_request_id is required",
        )),
        (Some(_), Some(_)) => Err(ServiceError::validation(
            "Cannot rate both order and service request at the same time",
        )),
        (Some(id), None) => Ok(RatingTarget::Order(id)),
        (None, Some(id)) => Ok(RatingTarget::ServiceRequest(id)),
    }
}

/// Returns the technician the rating will be credited to.
pub fn ensure_order_rateable(
    status: OrderStatus,
    technician_id: Option<Uuid>,
    already_rated: bool,
) -> Result<Uuid, ServiceError> {
    let technician_id = technician_id
        .ok_or_else(|| ServiceError::validation("No technician assigned to this order"))?;
    if status != OrderStatus::Delivered {
        return Err(ServiceError::validation("Can only rate delivered orders"));
    }
    if already_rated {
        return Err(ServiceError::validation("You have already rated this order"));
    }
    Ok(technician_id)
}

pub fn ensure_service_rateable(
    status: ServiceStatus,
    technician_id: Option<Uuid>,
    already_rated: bool,
) -> Result<Uuid, ServiceError> {
    let technician_id = technician_id
        .ok_or_else(|| ServiceError::validation("No technician assigned to this service request"))?;
    if status != ServiceStatus::Completed {
        return Err(ServiceError::validation("Can only rate completed service requests"));
    }
    if already_rated {
        return Err(ServiceError::validation("You have already rated this service request"));
    }
    Ok(technician_id)
}

pub fn can_rate_order(status: OrderStatus, technician_id: Option<Uuid>, already_rated: bool) -> bool {
    ensure_order_rateable(status, technician_id, already_rated).is_ok()
}

pub fn can_rate_service(status: ServiceStatus, technician_id: Option<Uuid>, already_rated: bool) -> bool {
    ensure_service_rateable(status, technician_id, already_rated).is_ok()
}

/// Minutes between start and finish on the day of service.
pub fn total_time_minutes(start: NaiveTime, finish: NaiveTime) -> Result<i32, ServiceError> {
    if finish <= start {
        return Err(ServiceError::validation("Finish time must be after start time"));
    }
    Ok((finish - start).num_minutes() as i32)
}

pub fn material_total(quantity: Decimal, unit_cost: Decimal) -> Decimal {
    (quantity * unit_cost).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn msg(r: Result<(), ServiceError>) -> String {
        r.unwrap_err().to_string()
    }

    #[test]
    fn completion_requires_approved_job_sheet() {
        assert_eq!(
            msg(ensure_service_completable(ServiceStatus::Assigned, None)),
            "Cannot complete service. Please create a job sheet first."
        );
        assert_eq!(
            msg(ensure_service_completable(ServiceStatus::InProgress, Some(ApprovalStatus::Pending))),
            "Cannot complete service. Job sheet is pending customer approval."
        );
        assert_eq!(
            msg(ensure_service_completable(ServiceStatus::Assigned, Some(ApprovalStatus::Declined))),
            "Cannot complete service. Job sheet was declined by customer."
        );
        assert!(ensure_service_completable(ServiceStatus::Assigned, Some(ApprovalStatus::Approved)).is_ok());
    }

    #[test]
    fn completion_rejects_terminal_states_first() {
        assert_eq!(
            msg(ensure_service_completable(ServiceStatus::Completed, Some(ApprovalStatus::Approved))),
            "Service already marked as completed"
        );
        assert!(ensure_service_completable(ServiceStatus::Cancelled, Some(ApprovalStatus::Approved)).is_err());
    }

    #[test]
    fn job_sheet_decision_is_one_shot() {
        assert!(ensure_job_sheet_pending(ApprovalStatus::Pending).is_ok());
        assert_eq!(msg(ensure_job_sheet_pending(ApprovalStatus::Approved)), "Job sheet already approved");
        assert_eq!(msg(ensure_job_sheet_pending(ApprovalStatus::Declined)), "Job sheet already declined");
    }

    #[test]
    fn cancellation_window() {
        assert!(ensure_order_cancellable(OrderStatus::Pending).is_ok());
        assert!(ensure_order_cancellable(OrderStatus::Processing).is_ok());
        for s in [OrderStatus::Shipped, OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert_eq!(msg(ensure_order_cancellable(s)), "Order cannot be cancelled");
        }
    }

    #[test]
    fn confirmation_only_once() {
        assert!(ensure_order_confirmable(OrderStatus::Pending, false).is_ok());
        assert!(ensure_order_confirmable(OrderStatus::Processing, false).is_ok());
        assert!(ensure_order_confirmable(OrderStatus::Processing, true).is_err());
        assert!(ensure_order_confirmable(OrderStatus::Cancelled, false).is_err());
    }

    #[test]
    fn final_order_statuses_are_locked() {
        assert!(ensure_order_status_editable(OrderStatus::Pending).is_ok());
        assert!(ensure_order_status_editable(OrderStatus::Shipped).is_ok());
        assert_eq!(msg(ensure_order_status_editable(OrderStatus::Delivered)), "Delivered orders cannot change status");
        assert_eq!(msg(ensure_order_status_editable(OrderStatus::Cancelled)), "Cancelled orders cannot change status");
    }

    #[test]
    fn assignment_nudges_status_forward() {
        assert_eq!(status_after_order_assignment(OrderStatus::Pending), OrderStatus::Processing);
        assert_eq!(status_after_order_assignment(OrderStatus::Shipped), OrderStatus::Shipped);
        assert_eq!(status_after_service_assignment(ServiceStatus::Submitted), ServiceStatus::Assigned);
        assert_eq!(status_after_service_assignment(ServiceStatus::InProgress), ServiceStatus::InProgress);
    }

    #[test]
    fn delivery_gate() {
        assert!(ensure_order_deliverable(OrderStatus::Shipped).is_ok());
        assert_eq!(msg(ensure_order_deliverable(OrderStatus::Delivered)), "Order already marked as delivered");
        assert!(ensure_order_deliverable(OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn rating_value_bounds() {
        assert_eq!(ensure_rating_value(Some(5)).unwrap(), 5);
        assert_eq!(ensure_rating_value(Some(1)).unwrap(), 1);
        for bad in [None, Some(0), Some(6), Some(-1)] {
            assert_eq!(ensure_rating_value(bad).unwrap_err().to_string(), "Valid rating (1-5) is required");
        }
    }

    #[test]
    fn rating_target_exactly_one() {
        let id = Uuid::new_v4();
        assert_eq!(resolve_rating_target(Some(id), None).unwrap(), RatingTarget::Order(id));
        assert_eq!(resolve_rating_target(None, Some(id)).unwrap(), RatingTarget::ServiceRequest(id));
        assert!(resolve_rating_target(None, None).is_err());
        assert_eq!(
            resolve_rating_target(Some(id), Some(id)).unwrap_err().to_string(),
            "Cannot rate both order and service request at the same time"
        );
    }

    #[test]
    fn order_rating_checks_in_order() {
        let tech = Some(Uuid::new_v4());
        assert_eq!(
            ensure_order_rateable(OrderStatus::Delivered, None, false).unwrap_err().to_string(),
            "No technician assigned to this order"
        );
        assert_eq!(
            ensure_order_rateable(OrderStatus::Shipped, tech, false).unwrap_err().to_string(),
            "Can only rate delivered orders"
        );
        assert_eq!(
            ensure_order_rateable(OrderStatus::Delivered, tech, true).unwrap_err().to_string(),
            "You have already rated this order"
        );
        assert_eq!(ensure_order_rateable(OrderStatus::Delivered, tech, false).unwrap(), tech.unwrap());
        assert!(can_rate_order(OrderStatus::Delivered, tech, false));
        assert!(!can_rate_service(ServiceStatus::Assigned, tech, false));
    }

    #[test]
    fn time_and_material_maths() {
        let start = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let finish = NaiveTime::from_hms_opt(11, 45, 0).unwrap();
        assert_eq!(total_time_minutes(start, finish).unwrap(), 135);
        assert!(total_time_minutes(finish, start).is_err());
        assert_eq!(material_total(dec!(2.5), dec!(120.40)), dec!(301.00));
        assert_eq!(SERVICE_FEE, dec!(500));
    }
}
