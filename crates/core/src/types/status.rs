//! Carrier status identifiers and their display text.
//!
//! The table is built once on first use and is read-only afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

static STATUS_TEXT: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("-1", "Hủy đơn hàng"),
        ("1", "Chưa tiếp nhận"),
        ("2", "Đã tiếp nhận"),
        ("3", "Đã lấy hàng/Đã nhập kho"),
        ("4", "Đã điều phối giao hàng/Đang giao hàng"),
        ("5", "Đã giao hàng/Chưa đối soát"),
        ("6", "Đã đối soát"),
        ("7", "Không lấy được hàng"),
        ("8", "Hoãn lấy hàng"),
        ("9", "Không giao được hàng"),
        ("10", "Delay giao hàng"),
        ("11", "Đã đối soát công nợ trả hàng"),
        ("12", "Đã điều phối lấy hàng/Đang lấy hàng"),
        ("13", "Đơn hàng bồi hoàn"),
        ("20", "Đang trả hàng (COD cầm hàng đi trả)"),
        ("21", "Đã trả hàng (COD đã trả xong hàng)"),
        ("45", "Shipper báo đã giao hàng"),
        ("49", "Shipper báo không giao được giao hàng"),
        ("123", "Shipper báo đã lấy hàng"),
        ("127", "Shipper báo không lấy được hàng"),
        ("128", "Shipper báo delay lấy hàng"),
        ("410", "Shipper báo delay giao hàng"),
    ])
});

/// Display text for a carrier status id, if the id is known.
#[must_use]
pub fn status_text(status_id: &str) -> Option<&'static str> {
    STATUS_TEXT.get(status_id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_received_status() {
        assert_eq!(status_text("2"), Some("Đã tiếp nhận"));
    }

    #[test]
    fn test_cancelled_status() {
        assert_eq!(status_text("-1"), Some("Hủy đơn hàng"));
    }

    #[test]
    fn test_unknown_status() {
        assert_eq!(status_text("999"), None);
        assert_eq!(status_text(""), None);
    }

    #[test]
    fn test_concurrent_reads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| status_text("5")))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().ok().flatten(), Some("Đã giao hàng/Chưa đối soát"));
        }
    }
}
