pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_body_shape() {
        let m = types::Message::new("Order marked as delivered");
        assert_eq!(m.message, "Order marked as delivered");
        assert_eq!(types::Health { status: "ok" }.status, "ok");
    }
}
